//! Library service facade.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use gamedock_ledger::{PlaytimeStore, SessionRecord};
use gamedock_library::{GameEntry, ScanConfig, filter_games, scan_library};
use gamedock_session::{EventFn, GameSpawner, ProcessProbe, SessionTracker};
use tokio::sync::Mutex;

use crate::host::{DetachedSpawner, SystemProcessProbe};
use crate::{ServiceError, settings};

/// Facade over the scanner, session tracker, and playtime ledger — the
/// only surface the presentation shell consumes.
pub struct LibraryService {
    online_dir: PathBuf,
    covers_dir: PathBuf,
    ledger: Arc<PlaytimeStore>,
    tracker: SessionTracker,
    games: Mutex<Vec<GameEntry>>,
}

impl LibraryService {
    /// Creates a service rooted at `base_dir`, using the conventional
    /// launcher layout: online games, covers, and the tracker file live
    /// under the base.
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        let base = base_dir.into();
        Self::with_parts(
            base.join(settings::DEFAULT_ONLINE_DIR),
            base.join(settings::DEFAULT_COVERS_DIR),
            Arc::new(PlaytimeStore::new(base.join(settings::DEFAULT_LEDGER_FILE))),
            Arc::new(SystemProcessProbe::new()),
            Arc::new(DetachedSpawner),
        )
    }

    /// Creates a service from explicit collaborators.
    pub fn with_parts(
        online_dir: PathBuf,
        covers_dir: PathBuf,
        ledger: Arc<PlaytimeStore>,
        probe: Arc<dyn ProcessProbe>,
        spawner: Arc<dyn GameSpawner>,
    ) -> Self {
        let tracker = SessionTracker::new(Arc::clone(&ledger), probe, spawner);
        Self {
            online_dir,
            covers_dir,
            ledger,
            tracker,
            games: Mutex::new(Vec::new()),
        }
    }

    /// Installs the session event callback.
    pub fn with_events(mut self, events: EventFn) -> Self {
        self.tracker = self.tracker.with_events(events);
        self
    }

    /// Overrides the liveness poll interval.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.tracker = self.tracker.with_poll_interval(interval);
        self
    }

    /// Rebuilds the game list from the given directory set and returns it.
    ///
    /// The previous list is replaced wholesale; a rescan is the only
    /// refresh mechanism.
    pub async fn refresh(&self, directories: &[PathBuf], include_online: bool) -> Vec<GameEntry> {
        let config = ScanConfig {
            directories: directories.to_vec(),
            include_online,
            online_dir: self.online_dir.clone(),
            covers_dir: self.covers_dir.clone(),
        };
        let games = scan_library(&config);
        tracing::info!(count = games.len(), "game list refreshed");
        *self.games.lock().await = games.clone();
        games
    }

    /// The current scan generation.
    pub async fn games(&self) -> Vec<GameEntry> {
        self.games.lock().await.clone()
    }

    pub async fn game_count(&self) -> usize {
        self.games.lock().await.len()
    }

    /// Case-insensitive substring filter over the current list, preserving
    /// scan order.
    pub async fn filter(&self, query: &str) -> Vec<GameEntry> {
        filter_games(&self.games.lock().await, query)
    }

    /// Launches a game from the current list by name and starts tracking
    /// its session.
    pub async fn launch(&self, name: &str) -> Result<(), ServiceError> {
        let entry = {
            let games = self.games.lock().await;
            games.iter().find(|g| g.name == name).cloned()
        };
        let Some(entry) = entry else {
            return Err(ServiceError::UnknownGame(name.to_string()));
        };
        self.tracker.launch(&entry).await?;
        Ok(())
    }

    /// Session statistics for the info view: last played, total playtime.
    pub fn record(&self, name: &str) -> SessionRecord {
        self.ledger.record(name)
    }

    /// `true` while the game's session is being monitored.
    pub async fn is_tracking(&self, name: &str) -> bool {
        self.tracker.is_tracking(name).await
    }

    /// Stops all monitors without killing launched games; their sessions
    /// stay open in the ledger.
    pub async fn shutdown(&self) {
        self.tracker.shutdown().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gamedock_session::SessionEvent;
    use std::fs;
    use std::path::Path;
    use std::sync::Mutex as StdMutex;
    use std::sync::atomic::{AtomicBool, Ordering};
    use tempfile::TempDir;

    const TEST_POLL: Duration = Duration::from_millis(20);

    struct FakeProbe {
        running: Arc<AtomicBool>,
    }

    impl ProcessProbe for FakeProbe {
        fn is_running(&self, _signature: &str) -> Result<bool, String> {
            Ok(self.running.load(Ordering::SeqCst))
        }
    }

    struct FakeSpawner;

    impl GameSpawner for FakeSpawner {
        fn spawn_detached(&self, _target: &Path) -> Result<(), String> {
            Ok(())
        }
    }

    fn install_game(dir: &Path, name: &str) {
        let target = dir.join(format!("{name}.bin"));
        fs::write(&target, b"binary").unwrap();
        fs::write(
            dir.join(format!("{name}.url")),
            format!("[InternetShortcut]\nURL=file://{}\n", target.display()),
        )
        .unwrap();
    }

    fn service(dir: &TempDir, running: &Arc<AtomicBool>) -> LibraryService {
        LibraryService::with_parts(
            dir.path().join("Online Games"),
            dir.path().join("photos"),
            Arc::new(PlaytimeStore::new(dir.path().join("game_tracker.json"))),
            Arc::new(FakeProbe {
                running: Arc::clone(running),
            }),
            Arc::new(FakeSpawner),
        )
        .with_poll_interval(TEST_POLL)
    }

    #[tokio::test]
    async fn refresh_builds_and_replaces_the_list() {
        let dir = TempDir::new().unwrap();
        install_game(dir.path(), "Chess");
        install_game(dir.path(), "Doom");

        let running = Arc::new(AtomicBool::new(true));
        let svc = service(&dir, &running);

        let games = svc.refresh(&[dir.path().to_path_buf()], false).await;
        assert_eq!(games.len(), 2);
        assert_eq!(svc.game_count().await, 2);

        // A rescan of an emptied directory replaces the list wholesale.
        fs::remove_file(dir.path().join("Chess.url")).unwrap();
        fs::remove_file(dir.path().join("Doom.url")).unwrap();
        let games = svc.refresh(&[dir.path().to_path_buf()], false).await;
        assert!(games.is_empty());
        assert_eq!(svc.game_count().await, 0);
    }

    #[tokio::test]
    async fn filter_narrows_the_current_list() {
        let dir = TempDir::new().unwrap();
        install_game(dir.path(), "Farm Simulator");
        install_game(dir.path(), "Chess");

        let running = Arc::new(AtomicBool::new(true));
        let svc = service(&dir, &running);
        svc.refresh(&[dir.path().to_path_buf()], false).await;

        let matched = svc.filter("sim").await;
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].name, "Farm Simulator");

        assert_eq!(svc.filter("").await.len(), 2);
    }

    #[tokio::test]
    async fn launch_unknown_game_is_rejected() {
        let dir = TempDir::new().unwrap();
        let running = Arc::new(AtomicBool::new(true));
        let svc = service(&dir, &running);

        let err = svc.launch("Ghost").await.unwrap_err();
        assert!(matches!(err, ServiceError::UnknownGame(_)));
    }

    #[tokio::test]
    async fn launch_tracks_and_records_through_the_facade() {
        let dir = TempDir::new().unwrap();
        install_game(dir.path(), "Chess");

        let running = Arc::new(AtomicBool::new(true));
        let completed = Arc::new(StdMutex::new(Vec::new()));
        let sink = Arc::clone(&completed);

        let svc = service(&dir, &running).with_events(Box::new(move |event| {
            sink.lock().unwrap().push(event);
        }));
        svc.refresh(&[dir.path().to_path_buf()], false).await;

        svc.launch("Chess").await.unwrap();
        assert!(svc.is_tracking("Chess").await);
        assert!(svc.record("Chess").session_open());

        running.store(false, Ordering::SeqCst);
        for _ in 0..200 {
            if !svc.is_tracking("Chess").await {
                break;
            }
            tokio::time::sleep(TEST_POLL).await;
        }

        let record = svc.record("Chess");
        assert!(!record.session_open());
        assert!(record.last_played.is_some());

        let events = completed.lock().unwrap();
        assert!(matches!(
            &events[..],
            [SessionEvent::Completed { game, .. }] if game == "Chess"
        ));
    }

    #[tokio::test]
    async fn online_games_appear_only_when_requested() {
        let dir = TempDir::new().unwrap();
        let online = dir.path().join("Online Games");
        fs::create_dir(&online).unwrap();
        install_game(dir.path(), "Chess");
        install_game(&online, "Fortress");

        let running = Arc::new(AtomicBool::new(true));
        let svc = service(&dir, &running);

        let games = svc.refresh(&[dir.path().to_path_buf()], false).await;
        assert_eq!(games.len(), 1);

        let games = svc.refresh(&[dir.path().to_path_buf()], true).await;
        let names: Vec<_> = games.iter().map(|g| g.name.as_str()).collect();
        assert_eq!(names, vec!["Chess", "Fortress"]);
    }
}
