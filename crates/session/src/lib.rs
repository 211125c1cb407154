//! Session tracking: launch a game, watch its process, record playtime.
//!
//! The tracker drives each game through launch → running → recorded. One
//! monitor task per running game polls for process liveness; when the
//! process disappears, the session's duration lands in the playtime
//! ledger. Host capabilities (process liveness, detached spawn) are
//! traits the embedding application implements.

mod error;
mod tracker;

pub use error::LaunchError;
pub use tracker::{
    DEFAULT_POLL_INTERVAL, EventFn, GameSpawner, ProcessProbe, SessionEvent, SessionTracker,
};
