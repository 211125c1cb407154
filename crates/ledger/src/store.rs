//! Ledger persistence: whole-file JSON snapshots with single-writer access.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::record::{NOT_AVAILABLE, format_timestamp, parse_timestamp};
use crate::{LedgerError, Playtime, SessionRecord};

/// In-memory mapping from game name to its session record.
///
/// Keys are kept sorted so the persisted snapshot stays diff-friendly for
/// human inspection.
#[derive(Debug, Clone, Default)]
pub struct Ledger {
    records: BTreeMap<String, SessionRecord>,
}

impl Ledger {
    /// Returns the record for a game, or the zero-value default when the
    /// game has never been launched.
    pub fn record(&self, game: &str) -> SessionRecord {
        self.records.get(game).cloned().unwrap_or_default()
    }

    /// Names of all games with any recorded history, sorted.
    pub fn games(&self) -> Vec<String> {
        self.records.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn record_mut(&mut self, game: &str) -> &mut SessionRecord {
        self.records.entry(game.to_string()).or_default()
    }
}

/// Wire form of one record, exactly as the tracker file stores it.
#[derive(Debug, Serialize, Deserialize)]
struct RecordEntry {
    #[serde(default = "not_available")]
    last_played: String,
    #[serde(default = "zero")]
    total_played: String,
    #[serde(default = "not_available")]
    start_time: String,
}

fn not_available() -> String {
    NOT_AVAILABLE.to_string()
}

fn zero() -> String {
    "0".to_string()
}

impl From<&SessionRecord> for RecordEntry {
    fn from(record: &SessionRecord) -> Self {
        RecordEntry {
            last_played: record
                .last_played
                .map(format_timestamp)
                .unwrap_or_else(not_available),
            total_played: record.total_played.to_string(),
            start_time: record
                .pending_start
                .map(format_timestamp)
                .unwrap_or_else(not_available),
        }
    }
}

impl RecordEntry {
    /// Tolerant conversion: unparseable fields degrade to their zero
    /// values instead of poisoning the whole record.
    fn into_record(self, game: &str) -> SessionRecord {
        SessionRecord {
            last_played: parse_optional_timestamp(game, "last_played", &self.last_played),
            total_played: parse_total(game, &self.total_played),
            pending_start: parse_optional_timestamp(game, "start_time", &self.start_time),
        }
    }
}

fn parse_optional_timestamp(game: &str, field: &str, value: &str) -> Option<NaiveDateTime> {
    if value == NOT_AVAILABLE {
        return None;
    }
    match parse_timestamp(value) {
        Ok(ts) => Some(ts),
        Err(_) => {
            tracing::warn!(game, field, value, "unparseable timestamp, treating as N/A");
            None
        }
    }
}

fn parse_total(game: &str, value: &str) -> Playtime {
    match value.parse::<Playtime>() {
        Ok(total) => total,
        Err(_) => {
            tracing::warn!(game, value, "unparseable total_played, treating as zero");
            Playtime::ZERO
        }
    }
}

/// Durable store for the playtime ledger.
///
/// The snapshot is loaded lazily on first access and cached for the life
/// of the process. Every mutation happens under one lock and rewrites the
/// whole file, so concurrent monitor tasks never interleave partial
/// updates. `pending_start` keeps full second precision in memory; the
/// persisted form is minute-resolution, so a marker reloaded after a
/// crash rounds down to the minute.
pub struct PlaytimeStore {
    path: PathBuf,
    cache: Mutex<Option<Ledger>>,
}

impl PlaytimeStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            cache: Mutex::new(None),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the record for a game (zero-value default when absent).
    pub fn record(&self, game: &str) -> SessionRecord {
        let mut cache = self.lock_cache();
        self.loaded(&mut cache).record(game)
    }

    /// Names of all games with any recorded history.
    pub fn games(&self) -> Vec<String> {
        let mut cache = self.lock_cache();
        self.loaded(&mut cache).games()
    }

    /// Opens a session: sets the start marker and persists it before
    /// returning, so a crash after launch cannot lose the start time.
    pub fn begin_session(&self, game: &str, start: NaiveDateTime) -> Result<(), LedgerError> {
        let mut cache = self.lock_cache();
        let ledger = self.loaded(&mut cache);

        let record = ledger.record_mut(game);
        if record.pending_start.is_some() {
            tracing::warn!(game, "replacing an existing open-session marker");
        }
        record.pending_start = Some(start);

        persist(&self.path, ledger)?;
        tracing::debug!(game, start = %format_timestamp(start), "session opened in ledger");
        Ok(())
    }

    /// Closes a session: adds the elapsed time to the running total, stamps
    /// `last_played`, clears the marker, and persists.
    ///
    /// Returns the session duration, or `None` when no session was open
    /// (logged as a warning, no state change).
    pub fn end_session(
        &self,
        game: &str,
        end: NaiveDateTime,
    ) -> Result<Option<Playtime>, LedgerError> {
        let mut cache = self.lock_cache();
        let ledger = self.loaded(&mut cache);

        let record = ledger.record_mut(game);
        let Some(start) = record.pending_start else {
            tracing::warn!(game, "no open session to close, ignoring");
            return Ok(None);
        };

        // A clock that ran backwards credits nothing rather than underflowing.
        let secs = end.signed_duration_since(start).num_seconds().max(0) as u64;
        let duration = Playtime::from_secs(secs);

        record.total_played = record.total_played.saturating_add(duration);
        record.last_played = Some(end);
        record.pending_start = None;

        persist(&self.path, ledger)?;
        tracing::debug!(game, duration = %duration, "session closed in ledger");
        Ok(Some(duration))
    }

    fn lock_cache(&self) -> MutexGuard<'_, Option<Ledger>> {
        match self.cache.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn loaded<'a>(&self, cache: &'a mut Option<Ledger>) -> &'a mut Ledger {
        cache.get_or_insert_with(|| load_snapshot(&self.path))
    }
}

/// Reads the persisted snapshot. A missing file is an empty ledger; a
/// corrupt one is logged loudly and discarded, trading lost history for a
/// launcher that still starts.
fn load_snapshot(path: &Path) -> Ledger {
    let data = match fs::read_to_string(path) {
        Ok(data) => data,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ledger::default(),
        Err(e) => {
            tracing::error!(
                path = %path.display(),
                error = %e,
                "failed to read playtime ledger, starting empty"
            );
            return Ledger::default();
        }
    };

    match serde_json::from_str::<BTreeMap<String, RecordEntry>>(&data) {
        Ok(entries) => {
            let records = entries
                .into_iter()
                .map(|(game, entry)| {
                    let record = entry.into_record(&game);
                    (game, record)
                })
                .collect();
            Ledger { records }
        }
        Err(e) => {
            tracing::error!(
                path = %path.display(),
                error = %e,
                "playtime ledger is corrupt, discarding history and starting empty"
            );
            Ledger::default()
        }
    }
}

/// Rewrites the whole snapshot: serialize, write a temp sibling, rename it
/// over the old file. A crash mid-write leaves the previous snapshot
/// intact, never a truncated one.
fn persist(path: &Path, ledger: &Ledger) -> Result<(), LedgerError> {
    let entries: BTreeMap<&String, RecordEntry> = ledger
        .records
        .iter()
        .map(|(game, record)| (game, RecordEntry::from(record)))
        .collect();
    let json = serde_json::to_string_pretty(&entries)?;

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }

    let tmp = tmp_path(path);
    fs::write(&tmp, json)?;
    if fs::rename(&tmp, path).is_err() {
        // Windows refuses to rename over an existing file.
        fs::remove_file(path).ok();
        fs::rename(&tmp, path)?;
    }
    Ok(())
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "ledger".into());
    name.push(".tmp");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};
    use tempfile::TempDir;

    fn ts(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 8, 6)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    fn store(dir: &TempDir) -> PlaytimeStore {
        PlaytimeStore::new(dir.path().join("game_tracker.json"))
    }

    #[test]
    fn absent_file_is_empty_ledger() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        assert!(store.games().is_empty());
        assert_eq!(store.record("Chess"), SessionRecord::default());
    }

    #[test]
    fn session_round_trip_accounts_exactly() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);

        let t0 = ts(20, 0, 0);
        store.begin_session("Chess", t0).unwrap();
        let duration = store
            .end_session("Chess", t0 + Duration::seconds(90))
            .unwrap()
            .unwrap();

        assert_eq!(duration.to_string(), "0:01:30");
        let record = store.record("Chess");
        assert_eq!(record.total_played.to_string(), "0:01:30");
        assert_eq!(record.last_played, Some(t0 + Duration::seconds(90)));
        assert!(!record.session_open());
    }

    #[test]
    fn session_adds_onto_prior_total() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("game_tracker.json");
        fs::write(
            &path,
            r#"{ "Chess": { "last_played": "2026-08-01 10:00 AM", "total_played": "1:00:00", "start_time": "N/A" } }"#,
        )
        .unwrap();

        let store = PlaytimeStore::new(&path);
        let t0 = ts(20, 0, 0);
        store.begin_session("Chess", t0).unwrap();
        store
            .end_session("Chess", t0 + Duration::seconds(90))
            .unwrap();

        assert_eq!(store.record("Chess").total_played.to_string(), "1:01:30");
    }

    #[test]
    fn begin_persists_open_marker_before_returning() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);

        store.begin_session("Chess", ts(20, 0, 0)).unwrap();

        // Read the raw file, as a recovery pass after a crash would.
        let raw = fs::read_to_string(store.path()).unwrap();
        let parsed: BTreeMap<String, RecordEntry> = serde_json::from_str(&raw).unwrap();
        assert_eq!(parsed["Chess"].start_time, "2026-08-06 08:00 PM");
        assert_ne!(parsed["Chess"].start_time, NOT_AVAILABLE);
    }

    #[test]
    fn end_without_begin_is_a_logged_no_op() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);

        assert_eq!(store.end_session("Chess", ts(20, 0, 0)).unwrap(), None);
        assert!(store.games().is_empty() || store.record("Chess").total_played.is_zero());
    }

    #[test]
    fn corrupt_file_falls_back_to_empty_and_stays_usable() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("game_tracker.json");
        fs::write(&path, "{ not json at all").unwrap();

        let store = PlaytimeStore::new(&path);
        assert!(store.games().is_empty());

        // A fresh session works normally afterwards.
        store.begin_session("Chess", ts(20, 0, 0)).unwrap();
        assert!(store.record("Chess").session_open());
    }

    #[test]
    fn unparseable_fields_degrade_to_zero_values() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("game_tracker.json");
        fs::write(
            &path,
            r#"{ "Chess": { "last_played": "yesterday", "total_played": "lots", "start_time": "N/A" } }"#,
        )
        .unwrap();

        let record = PlaytimeStore::new(&path).record("Chess");
        assert!(record.last_played.is_none());
        assert!(record.total_played.is_zero());
    }

    #[test]
    fn missing_fields_default_like_old_tracker_files() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("game_tracker.json");
        fs::write(&path, r#"{ "Chess": {} }"#).unwrap();

        let record = PlaytimeStore::new(&path).record("Chess");
        assert_eq!(record, SessionRecord::default());
    }

    #[test]
    fn backwards_clock_credits_nothing() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);

        store.begin_session("Chess", ts(20, 0, 0)).unwrap();
        let duration = store.end_session("Chess", ts(19, 0, 0)).unwrap().unwrap();
        assert!(duration.is_zero());
        assert!(store.record("Chess").total_played.is_zero());
    }

    #[test]
    fn snapshot_is_pretty_printed_with_sorted_keys() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);

        store.begin_session("Zelda", ts(20, 0, 0)).unwrap();
        store.begin_session("Asteroids", ts(20, 1, 0)).unwrap();

        let raw = fs::read_to_string(store.path()).unwrap();
        assert!(raw.contains('\n'));
        let zelda = raw.find("Zelda").unwrap();
        let asteroids = raw.find("Asteroids").unwrap();
        assert!(asteroids < zelda);
    }

    #[test]
    fn no_temp_file_left_behind() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        store.begin_session("Chess", ts(20, 0, 0)).unwrap();
        store.end_session("Chess", ts(21, 0, 0)).unwrap();

        let leftovers: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.path().extension().is_some_and(|ext| ext == "tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn two_games_do_not_interfere() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);

        store.begin_session("Chess", ts(20, 0, 0)).unwrap();
        store.begin_session("Doom", ts(20, 5, 0)).unwrap();
        store.end_session("Chess", ts(20, 30, 0)).unwrap();

        assert!(!store.record("Chess").session_open());
        assert!(store.record("Doom").session_open());
        assert_eq!(store.record("Chess").total_played.to_string(), "0:30:00");
    }
}
