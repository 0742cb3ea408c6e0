//! Reports read by the companion app
//!
//! ```text
//! Live report (37 bytes)
//! ┌────────┬────────┬────────┬────────┬───────┬───────┬────────┬────────┬────┐
//! │ s_rot  │ t_rot  │ s_time │ t_time │ run   │ avg   │ mv     │ id     │ m  │
//! │ u32    │ u32    │ u32    │ u32    │ f32   │ f32   │ u32    │ u32    │ u8 │
//! └────────┴────────┴────────┴────────┴───────┴───────┴────────┴────────┴────┘
//!
//! Session summary (20 bytes)
//! ┌────────┬────────┬────────┬────────┬────────┐
//! │ id     │ rot    │ active │ start  │ end    │
//! └────────┴────────┴────────┴────────┴────────┘
//! ```

use heapless::Vec;

/// Encoded size of a [`LiveReport`]
pub const LIVE_REPORT_SIZE: usize = 37;

/// Encoded size of one [`SessionSummary`]
pub const SESSION_SUMMARY_SIZE: usize = 20;

/// Maximum number of sessions in one list (one per storage slot)
pub const MAX_LISTED_SESSIONS: usize = 64;

/// Snapshot of the live counters
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LiveReport {
    pub session_rotations: u32,
    pub total_rotations: u32,
    pub session_time_s: u32,
    pub total_time_s: u32,
    /// Rolling-window speed (mph or km/h)
    pub running_avg_speed: f32,
    /// Session distance over session active time (mph or km/h)
    pub session_avg_speed: f32,
    pub voltage_mv: u32,
    /// 0 while no session id has been assigned this boot
    pub session_id: u32,
    pub metric: bool,
}

impl LiveReport {
    /// Encode to the characteristic body
    pub fn encode(&self) -> [u8; LIVE_REPORT_SIZE] {
        let mut out = [0u8; LIVE_REPORT_SIZE];
        let words = [
            self.session_rotations,
            self.total_rotations,
            self.session_time_s,
            self.total_time_s,
            self.running_avg_speed.to_bits(),
            self.session_avg_speed.to_bits(),
            self.voltage_mv,
            self.session_id,
        ];
        for (chunk, word) in out.chunks_exact_mut(4).zip(words) {
            chunk.copy_from_slice(&word.to_le_bytes());
        }
        out[LIVE_REPORT_SIZE - 1] = self.metric as u8;
        out
    }

    /// Decode a characteristic body
    pub fn decode(bytes: &[u8]) -> Option<Self> {
        if bytes.len() != LIVE_REPORT_SIZE {
            return None;
        }
        let word = |i: usize| {
            let at = i * 4;
            u32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
        };
        Some(Self {
            session_rotations: word(0),
            total_rotations: word(1),
            session_time_s: word(2),
            total_time_s: word(3),
            running_avg_speed: f32::from_bits(word(4)),
            session_avg_speed: f32::from_bits(word(5)),
            voltage_mv: word(6),
            session_id: word(7),
            metric: bytes[LIVE_REPORT_SIZE - 1] != 0,
        })
    }
}

/// One historical session as listed to the app
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SessionSummary {
    pub session_id: u32,
    pub rotation_count: u32,
    pub active_time_s: u32,
    /// 0 if unknown
    pub start_unix: u32,
    /// 0 if unknown
    pub end_unix: u32,
}

impl SessionSummary {
    pub fn encode(&self) -> [u8; SESSION_SUMMARY_SIZE] {
        let mut out = [0u8; SESSION_SUMMARY_SIZE];
        let words = [
            self.session_id,
            self.rotation_count,
            self.active_time_s,
            self.start_unix,
            self.end_unix,
        ];
        for (chunk, word) in out.chunks_exact_mut(4).zip(words) {
            chunk.copy_from_slice(&word.to_le_bytes());
        }
        out
    }
}

/// Unreported sessions, serialized back to back
///
/// The transport may read the list in chunks smaller than the whole body,
/// so it is exposed as a byte blob addressed by offset.
#[derive(Debug, Clone, Default)]
pub struct SessionList {
    entries: Vec<SessionSummary, MAX_LISTED_SESSIONS>,
}

impl SessionList {
    /// Create a new empty list
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Append a session; returns false once the list is full
    pub fn push(&mut self, summary: SessionSummary) -> bool {
        self.entries.push(summary).is_ok()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[SessionSummary] {
        &self.entries
    }

    /// Total encoded length in bytes
    pub fn encoded_len(&self) -> usize {
        self.entries.len() * SESSION_SUMMARY_SIZE
    }

    /// Copy encoded bytes starting at `offset` into `buf`
    ///
    /// Returns the number of bytes copied; 0 once `offset` is past the end.
    pub fn read_blob(&self, offset: usize, buf: &mut [u8]) -> usize {
        let total = self.encoded_len();
        if offset >= total {
            return 0;
        }

        let mut copied = 0;
        let mut pos = offset;
        while copied < buf.len() && pos < total {
            let index = pos / SESSION_SUMMARY_SIZE;
            let within = pos % SESSION_SUMMARY_SIZE;
            let encoded = self.entries[index].encode();
            let n = (SESSION_SUMMARY_SIZE - within).min(buf.len() - copied);
            buf[copied..copied + n].copy_from_slice(&encoded[within..within + n]);
            copied += n;
            pos += n;
        }
        copied
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn summary(id: u32) -> SessionSummary {
        SessionSummary {
            session_id: id,
            rotation_count: id * 100,
            active_time_s: id * 10,
            start_unix: 1_750_000_000 + id,
            end_unix: 1_750_000_600 + id,
        }
    }

    #[test]
    fn test_live_report_layout() {
        let report = LiveReport {
            session_rotations: 1,
            total_rotations: 2,
            session_time_s: 3,
            total_time_s: 4,
            running_avg_speed: 1.5,
            session_avg_speed: 2.5,
            voltage_mv: 3300,
            session_id: 7,
            metric: true,
        };
        let bytes = report.encode();
        assert_eq!(bytes.len(), 37);
        assert_eq!(&bytes[0..4], &[1, 0, 0, 0]);
        assert_eq!(&bytes[16..20], &1.5f32.to_le_bytes());
        assert_eq!(&bytes[24..28], &3300u32.to_le_bytes());
        assert_eq!(&bytes[28..32], &[7, 0, 0, 0]);
        assert_eq!(bytes[36], 1);
        assert_eq!(LiveReport::decode(&bytes), Some(report));
    }

    #[test]
    fn test_live_report_wrong_length() {
        assert_eq!(LiveReport::decode(&[0u8; 36]), None);
    }

    #[test]
    fn test_summary_layout() {
        let bytes = summary(3).encode();
        assert_eq!(&bytes[0..4], &[3, 0, 0, 0]);
        assert_eq!(&bytes[4..8], &300u32.to_le_bytes());
        assert_eq!(&bytes[16..20], &1_750_000_603u32.to_le_bytes());
    }

    #[test]
    fn test_list_capacity() {
        let mut list = SessionList::new();
        for id in 0..MAX_LISTED_SESSIONS as u32 {
            assert!(list.push(summary(id)));
        }
        assert!(!list.push(summary(999)));
        assert_eq!(list.encoded_len(), MAX_LISTED_SESSIONS * SESSION_SUMMARY_SIZE);
    }

    #[test]
    fn test_read_blob_past_end() {
        let mut list = SessionList::new();
        list.push(summary(1));
        let mut buf = [0u8; 8];
        assert_eq!(list.read_blob(20, &mut buf), 0);
        assert_eq!(list.read_blob(500, &mut buf), 0);
    }

    #[test]
    fn test_empty_list() {
        let list = SessionList::new();
        let mut buf = [0u8; 4];
        assert!(list.is_empty());
        assert_eq!(list.read_blob(0, &mut buf), 0);
    }

    proptest! {
        #[test]
        fn test_chunked_read_matches_whole(count in 1usize..8, chunk in 1usize..50) {
            let mut list = SessionList::new();
            for id in 1..=count as u32 {
                list.push(summary(id));
            }

            let mut whole = [0u8; 8 * SESSION_SUMMARY_SIZE];
            let total = list.read_blob(0, &mut whole);
            prop_assert_eq!(total, count * SESSION_SUMMARY_SIZE);

            let mut assembled = [0u8; 8 * SESSION_SUMMARY_SIZE];
            let mut offset = 0;
            loop {
                let end = (offset + chunk).min(assembled.len());
                let n = list.read_blob(offset, &mut assembled[offset..end]);
                if n == 0 {
                    break;
                }
                offset += n;
            }
            prop_assert_eq!(offset, total);
            prop_assert_eq!(&assembled[..total], &whole[..total]);
        }
    }
}
