//! Wear-leveled record store
//!
//! One record per flash sector; the sector is `write_index % slots`.
//! Readers resolve duplicates of a session id by keeping the copy with
//! the highest write index.

pub mod critical;
pub mod store;

#[cfg(test)]
pub(crate) mod mock;

pub use critical::CriticalSection;
pub use store::{RecordStore, StoreError, WriteOutcome, MAX_SLOTS, WRITE_ATTEMPTS};
