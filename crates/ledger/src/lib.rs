//! Durable playtime ledger for the game library.
//!
//! One record per game that has ever been launched: last-played timestamp,
//! cumulative playtime, and the open-session marker. The whole ledger is
//! rewritten as a single pretty-printed JSON snapshot after every mutation,
//! so readers never observe a partial write.

mod error;
mod playtime;
mod record;
mod store;

pub use error::LedgerError;
pub use playtime::Playtime;
pub use record::{
    NOT_AVAILABLE, SessionRecord, TIMESTAMP_FORMAT, format_timestamp, parse_timestamp,
};
pub use store::{Ledger, PlaytimeStore};
