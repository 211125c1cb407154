//! Ledger error types.

/// Errors produced by ledger persistence and parsing.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid playtime: {0:?}")]
    InvalidPlaytime(String),

    #[error("invalid timestamp: {0:?}")]
    InvalidTimestamp(String),
}
