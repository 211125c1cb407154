//! Per-game session records and the tracker file's text formats.

use chrono::NaiveDateTime;

use crate::{LedgerError, Playtime};

/// Timestamp format used throughout the tracker file: `2026-08-06 09:41 PM`.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %I:%M %p";

/// Placeholder for a missing timestamp.
pub const NOT_AVAILABLE: &str = "N/A";

/// Formats a timestamp the way the tracker file stores it.
pub fn format_timestamp(ts: NaiveDateTime) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

/// Parses a tracker-file timestamp.
///
/// The format carries no seconds, so reloaded timestamps round down to
/// the minute.
pub fn parse_timestamp(s: &str) -> Result<NaiveDateTime, LedgerError> {
    NaiveDateTime::parse_from_str(s, TIMESTAMP_FORMAT)
        .map_err(|_| LedgerError::InvalidTimestamp(s.to_string()))
}

/// Session statistics for one game.
///
/// `pending_start` is `Some` while a session is open (process launched,
/// exit not yet confirmed). It is the only crash-sensitive field: a marker
/// left behind by a crashed launcher stays in the file as evidence of the
/// unclosed session.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionRecord {
    pub last_played: Option<NaiveDateTime>,
    pub total_played: Playtime,
    pub pending_start: Option<NaiveDateTime>,
}

impl SessionRecord {
    /// `true` while a session is open for this game.
    pub fn session_open(&self) -> bool {
        self.pending_start.is_some()
    }
}
