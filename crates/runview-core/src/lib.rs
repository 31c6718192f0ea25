//! Viewer core for externally-produced ML run artifacts.
//!
//! This crate implements the fetch-cancel-render lifecycle and the projection
//! logic behind the run-artifact preview, providing:
//!
//! - Cancellable HTTP client for the external data endpoint
//! - Single-shot session owning load/data/error state with teardown-safe
//!   cancellation
//! - Pure, total projections from the raw payload into display-ready views
//! - Local artifact-directory loader mirroring the server's file layout
//!
//! # Quick Start
//!
//! ```no_run
//! use runview_core::{ArtifactClient, ClientConfig, RunSession};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let client = ArtifactClient::new(ClientConfig::from_env())?;
//!
//! let mut session = RunSession::new();
//! session.start(&client, None);
//! session.join().await;
//!
//! let snapshot = session.snapshot();
//! if let Some(payload) = snapshot.data {
//!     let epochs = runview_core::projection::validation_view(&payload);
//!     println!("{} validation epochs", epochs.len());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration
//!
//! | Environment Variable | Description |
//! |---------------------|-------------|
//! | `RUNVIEW_URL` | Base URL of the host API (default: `http://127.0.0.1:43800/api`) |
//! | `RUNVIEW_TIMEOUT` | Request timeout in seconds (default: 30) |

pub mod client;
pub mod error;
pub mod projection;
pub mod session;
pub mod source;
pub mod types;

// Re-export main types
pub use client::{ArtifactClient, ClientConfig, FetchHandle};
pub use error::{ViewerError, ViewerResult};
pub use projection::{
    format_scalar, prediction_preview, resolved_configured_path, training_view, validation_view,
    PredictionPreview, MISSING_VALUE, PREVIEW_ROWS,
};
pub use session::{RunSession, SessionSnapshot};
pub use source::{
    ArtifactDir, DEFAULT_MAX_PREDICTION_ROWS, MAX_PREDICTION_ROWS, METRICS_FILE, PREDICTIONS_FILE,
    PROBE_FILE,
};
pub use types::{
    FilePresence, MetricEvent, PredictionTable, Row, RunPayload, TRAINING_EVENT, VALIDATION_EVENT,
};
