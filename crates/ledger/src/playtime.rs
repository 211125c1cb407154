//! Cumulative playtime in `H:MM:SS` text form.

use std::fmt;
use std::str::FromStr;

use crate::LedgerError;
use crate::record::NOT_AVAILABLE;

/// Whole-second playtime counter.
///
/// Rendered as `H:MM:SS` with an unpadded hour field that widens past 99
/// instead of wrapping. Addition saturates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Playtime {
    secs: u64,
}

impl Playtime {
    pub const ZERO: Playtime = Playtime { secs: 0 };

    pub fn from_secs(secs: u64) -> Self {
        Self { secs }
    }

    pub fn as_secs(&self) -> u64 {
        self.secs
    }

    pub fn is_zero(&self) -> bool {
        self.secs == 0
    }

    /// Adds a session's duration to the running total.
    pub fn saturating_add(self, other: Playtime) -> Playtime {
        Playtime {
            secs: self.secs.saturating_add(other.secs),
        }
    }
}

impl fmt::Display for Playtime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hours = self.secs / 3600;
        let minutes = (self.secs % 3600) / 60;
        let seconds = self.secs % 60;
        write!(f, "{hours}:{minutes:02}:{seconds:02}")
    }
}

impl FromStr for Playtime {
    type Err = LedgerError;

    /// Parses `H:MM:SS` (hours may exceed two digits). `"0"`, `"N/A"`, and
    /// the empty string mean zero, matching what older tracker files contain.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() || s == "0" || s == NOT_AVAILABLE {
            return Ok(Playtime::ZERO);
        }

        let mut parts = s.split(':');
        let (Some(h), Some(m), Some(sec), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(LedgerError::InvalidPlaytime(s.to_string()));
        };

        let invalid = || LedgerError::InvalidPlaytime(s.to_string());
        let hours: u64 = h.parse().map_err(|_| invalid())?;
        let minutes: u64 = m.parse().map_err(|_| invalid())?;
        let seconds: u64 = sec.parse().map_err(|_| invalid())?;
        if minutes > 59 || seconds > 59 {
            return Err(invalid());
        }

        Ok(Playtime {
            secs: hours * 3600 + minutes * 60 + seconds,
        })
    }
}
