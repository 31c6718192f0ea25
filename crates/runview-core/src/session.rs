//! Single-shot fetch session: `Idle → Loading → {Loaded, Failed}`.
//!
//! A session issues exactly one request over its lifetime, retains the abort
//! handle while the request is in flight, and guarantees that teardown stops
//! every later state update. Updating a stopped session is a correctness
//! violation, so the resolution task re-checks the stop flag under the same
//! lock it writes state through.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::client::{ArtifactClient, FetchHandle};
use crate::error::ViewerError;
use crate::types::RunPayload;

/// Where the session is in its lifecycle.
#[derive(Debug, Clone, Default)]
enum Phase {
    #[default]
    Idle,
    Loading,
    Loaded(Arc<RunPayload>),
    Failed(String),
}

#[derive(Debug, Default)]
struct Inner {
    phase: Phase,
    stopped: bool,
}

/// What the presentation layer sees.
#[derive(Debug, Clone)]
pub struct SessionSnapshot {
    pub is_loading: bool,
    pub data: Option<Arc<RunPayload>>,
    pub error: Option<String>,
}

/// One fetch-state-teardown lifecycle.
///
/// `Loaded` and `Failed` are terminal; the session never re-fetches on its
/// own. Dropping the session tears it down.
#[derive(Debug, Default)]
pub struct RunSession {
    inner: Arc<Mutex<Inner>>,
    handle: Option<FetchHandle>,
    task: Option<JoinHandle<()>>,
}

impl RunSession {
    /// Create an idle session.
    pub fn new() -> Self {
        Self::default()
    }

    /// Transition `Idle → Loading` and issue the single request.
    ///
    /// Sessions are single-shot: calling `start` again is a logged no-op.
    pub fn start(&mut self, client: &ArtifactClient, max_prediction_rows: Option<u32>) {
        {
            let mut inner = lock(&self.inner);
            if !matches!(inner.phase, Phase::Idle) {
                warn!("session already started; ignoring start()");
                return;
            }
            inner.phase = Phase::Loading;
        }

        let (handle, fut) = client.fetch(max_prediction_rows);
        self.handle = Some(handle);

        let shared = Arc::clone(&self.inner);
        self.task = Some(tokio::spawn(async move {
            let outcome = fut.await;

            let mut inner = lock(&shared);
            if inner.stopped {
                // The session was torn down while the request was in flight.
                debug!("session stopped before resolution; dropping outcome");
                return;
            }

            inner.phase = match outcome {
                Ok(payload) if payload.is_empty() => {
                    Phase::Failed(ViewerError::EmptyResponse.to_string())
                }
                Ok(payload) => Phase::Loaded(Arc::new(payload)),
                Err(e) if e.is_cancelled() => return,
                Err(e) => Phase::Failed(e.to_string()),
            };
        }));
    }

    /// Tear the session down, aborting the request if still in flight.
    ///
    /// Idempotent and safe after resolution: a terminal snapshot stays
    /// observable, but no further transition can occur.
    pub fn stop(&mut self) {
        lock(&self.inner).stopped = true;
        if let Some(mut handle) = self.handle.take() {
            handle.cancel();
        }
    }

    /// Wait for the outstanding request to settle (or to observe its abort).
    pub async fn join(&mut self) {
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }

    /// Current `{is_loading, data, error}` surface.
    pub fn snapshot(&self) -> SessionSnapshot {
        let inner = lock(&self.inner);
        match &inner.phase {
            Phase::Idle | Phase::Loading => SessionSnapshot {
                is_loading: matches!(inner.phase, Phase::Loading),
                data: None,
                error: None,
            },
            Phase::Loaded(payload) => SessionSnapshot {
                is_loading: false,
                data: Some(Arc::clone(payload)),
                error: None,
            },
            Phase::Failed(message) => SessionSnapshot {
                is_loading: false,
                data: None,
                error: Some(message.clone()),
            },
        }
    }
}

impl Drop for RunSession {
    fn drop(&mut self) {
        self.stop();
    }
}

fn lock(inner: &Mutex<Inner>) -> MutexGuard<'_, Inner> {
    // A panicked writer cannot leave the state machine half-applied; every
    // transition is a single assignment. Recover the guard.
    inner.lock().unwrap_or_else(PoisonError::into_inner)
}
