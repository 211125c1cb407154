//! Game entries and shortcut kinds.

use std::path::{Path, PathBuf};

/// Shortcut file kinds the scanner recognizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShortcutKind {
    /// Windows shell link (`.lnk`).
    Link,
    /// Internet shortcut (`.url`).
    Url,
}

impl ShortcutKind {
    /// Classifies a path by its extension, ASCII case-insensitively.
    pub fn from_path(path: &Path) -> Option<ShortcutKind> {
        let ext = path.extension()?.to_str()?;
        if ext.eq_ignore_ascii_case("lnk") {
            Some(ShortcutKind::Link)
        } else if ext.eq_ignore_ascii_case("url") {
            Some(ShortcutKind::Url)
        } else {
            None
        }
    }
}

/// One game in the library.
///
/// Identity is `name` — the shortcut filename without its extension. The
/// list is rebuilt wholesale on every rescan; entries are never mutated.
#[derive(Debug, Clone, PartialEq)]
pub struct GameEntry {
    pub name: String,
    pub shortcut_path: PathBuf,
    /// Derived cover image location; the file may not exist.
    pub cover_path: PathBuf,
}

impl GameEntry {
    /// Builds an entry from a shortcut path, deriving the display name
    /// from the file stem. Returns `None` for non-shortcut paths.
    pub fn from_shortcut(shortcut_path: PathBuf, covers_dir: &Path) -> Option<GameEntry> {
        ShortcutKind::from_path(&shortcut_path)?;
        let name = shortcut_path.file_stem()?.to_str()?.to_string();
        let cover_path = covers_dir.join(format!("{name}.jpg"));
        Some(GameEntry {
            name,
            shortcut_path,
            cover_path,
        })
    }
}
