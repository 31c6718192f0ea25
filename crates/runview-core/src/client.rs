//! HTTP client for the external data endpoint.

use std::future::Future;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::oneshot;
use tracing::debug;

use crate::error::{ViewerError, ViewerResult};
use crate::types::RunPayload;

/// Resource the client fetches; the row cap is its only query parameter.
const DATA_ENDPOINT: &str = "external/data";

/// User agent for viewer requests.
const USER_AGENT_VALUE: &str = concat!("runview/", env!("CARGO_PKG_VERSION"));

/// Client configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL of the host application's API.
    #[serde(default = "default_url")]
    pub url: String,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_url() -> String {
    "http://127.0.0.1:43800/api".to_string()
}

fn default_timeout() -> u64 {
    30
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            timeout_secs: default_timeout(),
        }
    }
}

impl ClientConfig {
    /// Create config from environment variables.
    ///
    /// | Variable | Description |
    /// |----------|-------------|
    /// | `RUNVIEW_URL` | Base URL of the host API |
    /// | `RUNVIEW_TIMEOUT` | Request timeout in seconds |
    pub fn from_env() -> Self {
        Self {
            url: std::env::var("RUNVIEW_URL").unwrap_or_else(|_| default_url()),
            timeout_secs: std::env::var("RUNVIEW_TIMEOUT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or_else(default_timeout),
        }
    }

    /// Set the base URL.
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }
}

/// Abort handle for one in-flight fetch.
///
/// Cancelling resolves the paired future to [`ViewerError::Cancelled`]; the
/// underlying request becomes a no-op with respect to caller-visible state.
/// Dropping the handle without calling [`cancel`](Self::cancel) aborts too,
/// which ties the request's lifetime to whoever retains the handle.
#[derive(Debug)]
pub struct FetchHandle {
    cancel: Option<oneshot::Sender<()>>,
}

impl FetchHandle {
    /// Abort the in-flight request. Idempotent; a no-op once the request
    /// has already resolved.
    pub fn cancel(&mut self) {
        if let Some(tx) = self.cancel.take() {
            // Send fails when the future already completed; nothing to abort then.
            let _ = tx.send(());
        }
    }
}

/// Client for fetching run payloads.
#[derive(Debug, Clone)]
pub struct ArtifactClient {
    /// HTTP client.
    client: reqwest::Client,

    /// Base URL for the host API.
    base_url: String,
}

impl ArtifactClient {
    /// Create a new artifact client.
    pub fn new(config: ClientConfig) -> ViewerResult<Self> {
        let mut default_headers = HeaderMap::new();
        default_headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_VALUE));

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers(default_headers)
            .build()
            .map_err(|e| ViewerError::Transport {
                message: format!("failed to create HTTP client: {}", e),
            })?;

        // Normalize base URL (remove trailing slash)
        let base_url = config.url.trim_end_matches('/').to_string();

        Ok(Self { client, base_url })
    }

    /// Create a client from environment variables.
    pub fn from_env() -> ViewerResult<Self> {
        Self::new(ClientConfig::from_env())
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Issue exactly one cancellable request for the run payload.
    ///
    /// Returns the abort handle together with the future that resolves to
    /// the payload. The optional row cap is forwarded as the only query
    /// parameter; `None` means the server default.
    pub fn fetch(
        &self,
        max_prediction_rows: Option<u32>,
    ) -> (
        FetchHandle,
        impl Future<Output = ViewerResult<RunPayload>> + Send + 'static,
    ) {
        let (tx, rx) = oneshot::channel::<()>();
        let client = self.clone();

        let fut = async move {
            tokio::select! {
                // Either an explicit cancel() or the handle being dropped.
                _ = rx => Err(ViewerError::Cancelled),
                outcome = client.fetch_once(max_prediction_rows) => outcome,
            }
        };

        (FetchHandle { cancel: Some(tx) }, fut)
    }

    /// Make the single request without cancellation plumbing.
    async fn fetch_once(&self, max_prediction_rows: Option<u32>) -> ViewerResult<RunPayload> {
        let url = format!("{}/{}", self.base_url, DATA_ENDPOINT);
        debug!(url = %url, max_prediction_rows = ?max_prediction_rows, "fetching run payload");

        let mut request = self.client.get(&url);
        if let Some(cap) = max_prediction_rows {
            request = request.query(&[("max_prediction_rows", cap)]);
        }

        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            let detail = read_error_detail(response).await;
            return Err(ViewerError::Server {
                status: status.as_u16(),
                detail,
            });
        }

        response
            .json()
            .await
            .map_err(|e| ViewerError::InvalidResponse {
                message: format!("failed to parse run payload: {}", e),
            })
    }
}

/// Extract a human-readable message from an error response.
///
/// The server sends a JSON document with a `detail` field; fall back to the
/// raw body, then to the status line, so some message always surfaces.
async fn read_error_detail(response: reqwest::Response) -> String {
    let status = response.status();

    match response.text().await {
        Ok(body) if !body.trim().is_empty() => match serde_json::from_str::<Value>(&body) {
            Ok(doc) => doc
                .get("detail")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or(body),
            Err(_) => body,
        },
        _ => status.to_string(),
    }
}
