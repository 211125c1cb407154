//! Launcher error types.

/// Errors surfaced by the launcher facade.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// The requested game is not in the current scan generation.
    #[error("unknown game: {0}")]
    UnknownGame(String),

    #[error(transparent)]
    Launch(#[from] gamedock_session::LaunchError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
