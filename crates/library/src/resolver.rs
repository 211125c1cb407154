//! Shortcut target resolution.
//!
//! Resolves a shortcut file to the filesystem path it points at. A stale
//! target (recorded path no longer on disk) still resolves successfully;
//! existence is the caller's concern.

use std::fs;
use std::path::{MAIN_SEPARATOR_STR, Path, PathBuf};

use crate::LibraryError;
use crate::entry::ShortcutKind;
use crate::lnk::{self, LnkTarget};

/// Resolves a shortcut file to its recorded target path.
pub fn resolve_target(path: &Path) -> Result<PathBuf, LibraryError> {
    match ShortcutKind::from_path(path) {
        Some(ShortcutKind::Link) => resolve_link(path),
        Some(ShortcutKind::Url) => resolve_url(path),
        None => Err(LibraryError::UnrecognizedShortcut(path.to_path_buf())),
    }
}

fn resolve_link(path: &Path) -> Result<PathBuf, LibraryError> {
    let data = fs::read(path).map_err(|e| unreadable(path, format!("read failed: {e}")))?;

    match lnk::read_target(&data).map_err(|reason| unreadable(path, reason))? {
        LnkTarget::Absolute(base) => Ok(PathBuf::from(base)),
        LnkTarget::Relative(rel) => {
            let dir = path.parent().unwrap_or_else(|| Path::new("."));
            Ok(dir.join(rel.replace('\\', MAIN_SEPARATOR_STR)))
        }
    }
}

/// Internet shortcuts are INI text; the `URL=` value is the target.
/// `file://` URLs become local paths; anything else (web, steam) passes
/// through verbatim and fails the launch-time existence check instead.
fn resolve_url(path: &Path) -> Result<PathBuf, LibraryError> {
    let text =
        fs::read_to_string(path).map_err(|e| unreadable(path, format!("read failed: {e}")))?;

    for line in text.lines() {
        if let Some(value) = line.trim().strip_prefix("URL=") {
            let value = value.trim();
            if value.is_empty() {
                break;
            }
            return Ok(url_to_path(value));
        }
    }

    Err(unreadable(path, "no URL entry".into()))
}

fn url_to_path(url: &str) -> PathBuf {
    let Some(rest) = url.strip_prefix("file://") else {
        return PathBuf::from(url);
    };
    let decoded = percent_decode(rest);
    // file:///C:/... carries a spurious leading slash before the drive.
    let trimmed = decoded
        .strip_prefix('/')
        .filter(|r| r.as_bytes().get(1) == Some(&b':'))
        .unwrap_or(&decoded);
    PathBuf::from(trimmed)
}

fn percent_decode(s: &str) -> String {
    let bytes = s.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%'
            && i + 2 < bytes.len()
            && let (Some(hi), Some(lo)) = (hex_val(bytes[i + 1]), hex_val(bytes[i + 2]))
        {
            out.push(hi << 4 | lo);
            i += 3;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }
    String::from_utf8_lossy(&out).into_owned()
}

fn hex_val(b: u8) -> Option<u8> {
    (b as char).to_digit(16).map(|v| v as u8)
}

fn unreadable(path: &Path, reason: String) -> LibraryError {
    LibraryError::ShortcutUnreadable {
        path: path.to_path_buf(),
        reason,
    }
}
