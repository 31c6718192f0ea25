//! Error types for the run-artifact viewer.

/// Viewer errors.
#[derive(Debug, thiserror::Error)]
pub enum ViewerError {
    /// Network-level failure (DNS, connect, timeout, broken body).
    #[error("network error: {message}")]
    Transport { message: String },

    /// Non-2xx response from the external data endpoint.
    #[error("server error (HTTP {status}): {detail}")]
    Server { status: u16, detail: String },

    /// The endpoint resolved successfully but the payload carried nothing.
    #[error("received empty response from external data endpoint")]
    EmptyResponse,

    /// The request was deliberately aborted. Never user-visible.
    #[error("request cancelled")]
    Cancelled,

    /// 2xx response whose body could not be decoded as a run payload.
    #[error("invalid response: {message}")]
    InvalidResponse { message: String },

    /// Local artifact directory could not be read or parsed.
    #[error("artifact source error: {message}")]
    Source { message: String },
}

impl ViewerError {
    /// Whether this error signals a deliberate abort rather than a failure.
    ///
    /// A session must not report an error for a request it tore down itself.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

impl From<reqwest::Error> for ViewerError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport {
            message: err.to_string(),
        }
    }
}

/// Result type for viewer operations.
pub type ViewerResult<T> = Result<T, ViewerError>;
