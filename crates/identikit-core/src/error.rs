//! Error types for the identity studio core.

use std::time::Duration;
use thiserror::Error;

/// Failure of a single backend round trip.
#[derive(Error, Debug)]
pub enum ClientError {
    /// Structured `{"detail": ...}` payload from a non-2xx response.
    #[error("{0}")]
    Backend(String),

    /// Network failure, unreadable body, or a non-2xx response without a
    /// structured error payload.
    #[error("{0}")]
    Transport(String),
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        ClientError::Transport(err.to_string())
    }
}

/// Terminal outcome of one generation attempt.
#[derive(Error, Debug)]
pub enum GenerationError {
    /// The backend reported a terminal `failed` status while polling.
    #[error("{0}")]
    Failed(String),

    /// No terminal status arrived within the polling ceiling.
    #[error("generation timed out after {}s", .0.as_secs())]
    TimedOut(Duration),

    /// A generation was already in flight on this engine.
    #[error("a generation is already in flight")]
    Busy,

    /// `reset()` was called before the attempt finished.
    #[error("generation was reset before it finished")]
    Cancelled,

    /// Transport or backend error from the underlying call.
    #[error(transparent)]
    Client(#[from] ClientError),
}

/// Errors surfaced by the operation wrappers.
#[derive(Error, Debug)]
pub enum OpsError {
    #[error("profile name must not be empty")]
    EmptyProfileName,

    #[error(transparent)]
    Client(#[from] ClientError),
}
