//! Library error types.

use std::path::PathBuf;

/// Errors produced while resolving shortcut files.
#[derive(Debug, thiserror::Error)]
pub enum LibraryError {
    /// The shortcut file is missing, malformed, or records no target.
    #[error("shortcut unreadable: {}: {}", .path.display(), .reason)]
    ShortcutUnreadable { path: PathBuf, reason: String },

    /// The path does not carry a recognized shortcut extension.
    #[error("not a recognized shortcut: {}", .0.display())]
    UnrecognizedShortcut(PathBuf),
}
