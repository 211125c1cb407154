//! Session error types.

use std::path::PathBuf;

/// Errors produced by a launch attempt.
///
/// Every variant aborts only the one launch it describes; the tracker
/// never takes the host down with it.
#[derive(Debug, thiserror::Error)]
pub enum LaunchError {
    /// The game already has an open session being monitored.
    #[error("game is already running: {0}")]
    AlreadyRunning(String),

    /// The shortcut could not be read or resolved.
    #[error(transparent)]
    Shortcut(#[from] gamedock_library::LibraryError),

    /// The resolved target no longer exists on disk.
    #[error("target missing: {}", .0.display())]
    TargetMissing(PathBuf),

    /// The host failed to start the target process.
    #[error("failed to start process: {0}")]
    Spawn(String),

    /// The ledger rejected the session bookkeeping.
    #[error(transparent)]
    Ledger(#[from] gamedock_ledger::LedgerError),
}
