//! Launcher engine facade.
//!
//! Composes the scanner, session tracker, and playtime ledger behind the
//! one surface a presentation shell consumes, and provides the system
//! implementations of the session host capabilities.

mod error;
mod host;
mod service;
mod settings;

pub use error::ServiceError;
pub use host::{DetachedSpawner, SystemProcessProbe};
pub use service::LibraryService;
pub use settings::{
    DEFAULT_COVERS_DIR, DEFAULT_LEDGER_FILE, DEFAULT_ONLINE_DIR, DEFAULT_SETTINGS_FILE,
    LauncherSettings,
};
