use thiserror::Error;

/// Failures of the sync layer. None of them are fatal; the last known mirror is kept.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SyncError {
    /// The authority could not be reached or the connection dropped.
    #[error("connectivity failure: {0}")]
    Connectivity(String),

    /// A snapshot or push payload that does not describe a valid game.
    #[error("invalid remote state: {0}")]
    InvalidRemoteState(String),

    /// A request went unanswered for too long.
    #[error("request {seq} timed out")]
    Timeout { seq: u64 },
}

impl From<std::io::Error> for SyncError {
    fn from(e: std::io::Error) -> Self {
        SyncError::Connectivity(e.to_string())
    }
}
