//! Session record type

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use hodometer_protocol::SessionSummary;

/// One persisted session snapshot
///
/// Timestamps are Unix seconds, 0 when unknown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SessionRecord {
    /// Strictly increasing, never reused
    pub session_id: u32,
    /// Global write counter; `write_index % slots` selects the slot
    pub write_index: u32,
    pub session_rotation_count: u32,
    pub session_active_time_s: u32,
    pub session_start_unix: u32,
    pub session_end_unix: u32,
    /// Lifetime totals at the moment of writing
    pub lifetime_rotation_count: u32,
    pub lifetime_time_s: u32,
    /// Acknowledged by the companion app
    pub reported: bool,
}

impl SessionRecord {
    /// Records without motion are never written
    pub fn has_motion(&self) -> bool {
        self.session_rotation_count > 0
    }

    /// Summary as listed to the companion app
    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            session_id: self.session_id,
            rotation_count: self.session_rotation_count,
            active_time_s: self.session_active_time_s,
            start_unix: self.session_start_unix,
            end_unix: self.session_end_unix,
        }
    }
}
