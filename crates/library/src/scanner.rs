//! Directory scanning: builds the canonical game list.

use std::path::{Path, PathBuf};

use crate::GameEntry;

/// Input configuration for one library scan.
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Directories walked in order; earlier directories win dedup ties.
    pub directories: Vec<PathBuf>,
    /// Whether the online-games pseudo-directory participates.
    pub include_online: bool,
    /// Location of the online-games directory.
    pub online_dir: PathBuf,
    /// Directory cover image paths are derived from.
    pub covers_dir: PathBuf,
}

/// Scans the configured directories and returns the canonical game list:
/// deduplicated by derived name (first seen wins) and sorted
/// lexicographically.
///
/// Missing or unreadable directories are skipped and logged, never fatal.
/// An empty directory set yields an empty list. The result replaces any
/// previous list wholesale; rescanning is the only refresh mechanism.
pub fn scan_library(config: &ScanConfig) -> Vec<GameEntry> {
    let mut games: Vec<GameEntry> = Vec::new();

    for dir in &config.directories {
        collect_shortcuts(dir, &config.covers_dir, &mut games);
    }
    if config.include_online {
        collect_shortcuts(&config.online_dir, &config.covers_dir, &mut games);
    }

    games.sort_by(|a, b| a.name.cmp(&b.name));
    games
}

/// Appends the shortcut entries of one directory, skipping names already
/// collected.
fn collect_shortcuts(dir: &Path, covers_dir: &Path, games: &mut Vec<GameEntry>) {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::warn!(dir = %dir.display(), error = %e, "skipping unavailable directory");
            return;
        }
    };

    for entry in entries {
        let Ok(entry) = entry else { continue };
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let Some(game) = GameEntry::from_shortcut(path, covers_dir) else {
            continue;
        };
        if games.iter().any(|g| g.name == game.name) {
            tracing::debug!(game = %game.name, "duplicate shortcut name, keeping first seen");
            continue;
        }
        games.push(game);
    }
}

/// Filters a game list by case-insensitive substring match on the name,
/// preserving relative order. An empty query returns the list unchanged.
pub fn filter_games(games: &[GameEntry], query: &str) -> Vec<GameEntry> {
    if query.is_empty() {
        return games.to_vec();
    }
    let needle = query.to_lowercase();
    games
        .iter()
        .filter(|g| g.name.to_lowercase().contains(&needle))
        .cloned()
        .collect()
}
