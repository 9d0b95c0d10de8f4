use serde_json::Value;
use thiserror::Error;

/// Failure taxonomy for the document store and its configuration.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Store file unreadable or not valid JSON.
    #[error("read failure: {0}")]
    Read(String),
    /// Optimistic concurrency check failed. Carries the full stored document
    /// so the client can merge and retry.
    #[error("version conflict: store was modified since the base version")]
    Conflict { server_data: Value },
    /// Could not persist the document.
    #[error("write failure: {0}")]
    Write(String),
    /// Bad reconfiguration input, or the store could not be initialized at a
    /// newly configured path.
    #[error("config failure: {0}")]
    Config(String),
}
