//! Persistent session records
//!
//! A record is the unit of persistence: one per flash slot, framed with a
//! magic word, a format version and an XOR checksum.

pub mod codec;
pub mod types;

pub use codec::{decode_slot, encode, DecodeError, SlotContents};
pub use types::SessionRecord;
