//! System implementations of the session host capabilities.

use std::path::Path;
use std::process::{Command, Stdio};
use std::sync::Mutex;

use gamedock_session::{GameSpawner, ProcessProbe};
use sysinfo::{ProcessesToUpdate, System};

/// Process liveness by name, via the system process table.
///
/// Matching is case-insensitive on the process name and system-wide;
/// any process carrying the signature counts, whoever started it.
pub struct SystemProcessProbe {
    system: Mutex<System>,
}

impl SystemProcessProbe {
    pub fn new() -> Self {
        Self {
            system: Mutex::new(System::new()),
        }
    }
}

impl Default for SystemProcessProbe {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessProbe for SystemProcessProbe {
    fn is_running(&self, signature: &str) -> Result<bool, String> {
        let mut system = match self.system.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        system.refresh_processes(ProcessesToUpdate::All, true);

        let needle = signature.to_lowercase();
        Ok(system
            .processes()
            .values()
            .any(|process| process.name().to_string_lossy().to_lowercase() == needle))
    }
}

/// Starts executables detached from the launcher's lifetime.
pub struct DetachedSpawner;

impl GameSpawner for DetachedSpawner {
    fn spawn_detached(&self, target: &Path) -> Result<(), String> {
        let mut command = Command::new(target);
        if let Some(dir) = target.parent() {
            command.current_dir(dir);
        }
        command
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());

        // The child is never waited on; the game outlives the launcher.
        command
            .spawn()
            .map(|_| ())
            .map_err(|e| format!("failed to start {}: {e}", target.display()))
    }
}
