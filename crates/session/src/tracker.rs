//! The launch → monitor → record session state machine.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use chrono::Local;
use gamedock_ledger::{Playtime, PlaytimeStore};
use gamedock_library::{GameEntry, resolve_target};
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

use crate::LaunchError;

/// How often a running game's process is checked for liveness.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Host capability: system-wide process liveness by name.
///
/// Liveness is coarse, by executable name rather than PID: shortcut
/// targets commonly re-exec or spawn helpers under the same name.
pub trait ProcessProbe: Send + Sync {
    /// Returns `true` if any process matching `signature` is running.
    fn is_running(&self, signature: &str) -> Result<bool, String>;
}

/// Host capability: start an executable detached from the launcher's own
/// lifetime. The spawned process is user-owned, never a child the engine
/// must reap or kill.
pub trait GameSpawner: Send + Sync {
    fn spawn_detached(&self, target: &Path) -> Result<(), String>;
}

/// Event emitted when a monitored session finishes.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// The game's process disappeared and its playtime was recorded.
    Completed { game: String, duration: Playtime },
}

/// Callback invoked with session events.
pub type EventFn = Box<dyn Fn(SessionEvent) + Send + Sync + 'static>;

/// Tracks play sessions: launches shortcut targets, watches their
/// processes, and records playtime in the ledger.
///
/// Each running game gets its own monitor task. Different games track
/// independently; a single game holds at most one open session at a time.
pub struct SessionTracker {
    ledger: Arc<PlaytimeStore>,
    probe: Arc<dyn ProcessProbe>,
    spawner: Arc<dyn GameSpawner>,
    poll_interval: Duration,
    events: Option<Arc<dyn Fn(SessionEvent) + Send + Sync>>,
    active: Arc<Mutex<HashMap<String, CancellationToken>>>,
}

impl SessionTracker {
    pub fn new(
        ledger: Arc<PlaytimeStore>,
        probe: Arc<dyn ProcessProbe>,
        spawner: Arc<dyn GameSpawner>,
    ) -> Self {
        Self {
            ledger,
            probe,
            spawner,
            poll_interval: DEFAULT_POLL_INTERVAL,
            events: None,
            active: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Overrides the default 5 s liveness poll interval.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Installs the session event callback.
    pub fn with_events(mut self, events: EventFn) -> Self {
        self.events = Some(Arc::from(events));
        self
    }

    /// Launches a game and begins monitoring its process.
    ///
    /// The open-session marker is durably persisted before the monitor
    /// task starts polling, so a launcher crash cannot lose the start
    /// time. On any failure the ledger is left untouched and the game
    /// stays idle.
    pub async fn launch(&self, entry: &GameEntry) -> Result<(), LaunchError> {
        // The lock is held across the whole launch sequence, so two
        // concurrent requests for the same game cannot both pass the
        // duplicate check.
        let mut active = self.active.lock().await;
        if active.contains_key(&entry.name) {
            tracing::warn!(game = %entry.name, "rejecting duplicate launch");
            return Err(LaunchError::AlreadyRunning(entry.name.clone()));
        }

        let target = resolve_target(&entry.shortcut_path)?;
        if !target.exists() {
            return Err(LaunchError::TargetMissing(target));
        }

        let Some(signature) = target.file_name().map(|n| n.to_string_lossy().into_owned())
        else {
            return Err(LaunchError::TargetMissing(target));
        };

        self.spawner
            .spawn_detached(&target)
            .map_err(LaunchError::Spawn)?;

        self.ledger
            .begin_session(&entry.name, Local::now().naive_local())?;

        let cancel = CancellationToken::new();
        active.insert(entry.name.clone(), cancel.clone());
        drop(active);

        tracing::info!(game = %entry.name, signature = %signature, "session started");

        let game = entry.name.clone();
        let ledger = Arc::clone(&self.ledger);
        let probe = Arc::clone(&self.probe);
        let events = self.events.clone();
        let registry = Arc::clone(&self.active);
        let interval = self.poll_interval;
        tokio::spawn(async move {
            monitor_loop(game, signature, ledger, probe, events, registry, interval, cancel).await;
        });

        Ok(())
    }

    /// `true` while a monitor task is active for the game.
    pub async fn is_tracking(&self, game: &str) -> bool {
        self.active.lock().await.contains_key(game)
    }

    /// Names of all games currently being monitored.
    pub async fn tracked_games(&self) -> Vec<String> {
        self.active.lock().await.keys().cloned().collect()
    }

    /// Stops all monitor tasks without touching the launched processes.
    ///
    /// Their open sessions stay marked in the ledger; the games are
    /// user-owned and keep running.
    pub async fn shutdown(&self) {
        let active = self.active.lock().await;
        for (game, cancel) in active.iter() {
            tracing::info!(game = %game, "stopping monitor, leaving session open");
            cancel.cancel();
        }
    }
}

/// Polls for the process signature until it disappears, then records the
/// session. A probe failure or cancellation abandons the monitor and
/// leaves the open-session marker in the ledger as evidence.
#[allow(clippy::too_many_arguments)]
async fn monitor_loop(
    game: String,
    signature: String,
    ledger: Arc<PlaytimeStore>,
    probe: Arc<dyn ProcessProbe>,
    events: Option<Arc<dyn Fn(SessionEvent) + Send + Sync>>,
    registry: Arc<Mutex<HashMap<String, CancellationToken>>>,
    poll_interval: Duration,
    cancel: CancellationToken,
) {
    let mut ticker = tokio::time::interval(poll_interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    // The first tick fires immediately; skipping it gives the spawned
    // process one full period to appear in the process table.
    ticker.tick().await;

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!(game = %game, "monitor cancelled, session left open");
                break;
            }
            _ = ticker.tick() => {
                match probe.is_running(&signature) {
                    Ok(true) => {}
                    Ok(false) => {
                        record_session_end(&game, &ledger, events.as_deref());
                        break;
                    }
                    Err(e) => {
                        tracing::error!(
                            game = %game,
                            error = %e,
                            "process liveness check unavailable, abandoning monitor"
                        );
                        break;
                    }
                }
            }
        }
    }

    registry.lock().await.remove(&game);
}

fn record_session_end(
    game: &str,
    ledger: &PlaytimeStore,
    events: Option<&(dyn Fn(SessionEvent) + Send + Sync)>,
) {
    let end = Local::now().naive_local();
    match ledger.end_session(game, end) {
        Ok(Some(duration)) => {
            tracing::info!(game = %game, duration = %duration, "session completed");
            if let Some(emit) = events {
                emit(SessionEvent::Completed {
                    game: game.to_string(),
                    duration,
                });
            }
        }
        Ok(None) => {
            tracing::warn!(game = %game, "session ended but no open marker was found");
        }
        Err(e) => {
            tracing::error!(game = %game, error = %e, "failed to record session end");
        }
    }
}
