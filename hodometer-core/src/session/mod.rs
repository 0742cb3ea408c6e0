//! Session lifecycle
//!
//! A session is one contiguous unit of activity with a ledger id that is
//! never reused. The engine owns the live counters and decides when they
//! are persisted and when a session is closed.

pub mod clock;
pub mod engine;
pub mod state;

pub use clock::WallClock;
pub use engine::{LiveCounters, PersistOutcome, PersistReason, SessionEngine, BOOT_LOG_LIMIT};
pub use state::{SessionEvent, SessionState};
