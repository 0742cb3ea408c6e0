//! Characteristic identifiers
//!
//! The service uses 128-bit UUIDs `12345678-1234-5678-1234-56789abcdefX`;
//! only the final byte differs between characteristics, so that byte is
//! used as the identifier here.

/// Characteristics exposed by the odometer service
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Characteristic {
    /// Live counters (read/notify)
    LiveReport,
    /// Unreported session list (read)
    UnreportedSessions,
    /// Acknowledge a session (write)
    MarkReported,
    /// Wall-clock reference (write)
    TimeSync,
    /// Display units (write)
    Units,
    /// Administrative lifetime override (write)
    LifetimeTotals,
}

// Wire format values
const ID_LIVE_REPORT: u8 = 0xF1;
const ID_UNREPORTED_SESSIONS: u8 = 0xF2;
const ID_MARK_REPORTED: u8 = 0xF3;
const ID_TIME_SYNC: u8 = 0xF4;
const ID_UNITS: u8 = 0xF5;
const ID_LIFETIME_TOTALS: u8 = 0xF7;

/// Service UUID, little-endian byte order as advertised
pub const SERVICE_UUID: [u8; 16] = [
    0xF0, 0xDE, 0xBC, 0x9A, 0x78, 0x56, 0x34, 0x12, 0x78, 0x56, 0x34, 0x12, 0x78, 0x56, 0x34, 0x12,
];

impl Characteristic {
    /// Parse a characteristic from the final UUID byte
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            ID_LIVE_REPORT => Some(Characteristic::LiveReport),
            ID_UNREPORTED_SESSIONS => Some(Characteristic::UnreportedSessions),
            ID_MARK_REPORTED => Some(Characteristic::MarkReported),
            ID_TIME_SYNC => Some(Characteristic::TimeSync),
            ID_UNITS => Some(Characteristic::Units),
            ID_LIFETIME_TOTALS => Some(Characteristic::LifetimeTotals),
            _ => None,
        }
    }

    /// Convert to the final UUID byte
    pub fn to_byte(self) -> u8 {
        match self {
            Characteristic::LiveReport => ID_LIVE_REPORT,
            Characteristic::UnreportedSessions => ID_UNREPORTED_SESSIONS,
            Characteristic::MarkReported => ID_MARK_REPORTED,
            Characteristic::TimeSync => ID_TIME_SYNC,
            Characteristic::Units => ID_UNITS,
            Characteristic::LifetimeTotals => ID_LIFETIME_TOTALS,
        }
    }

    /// Full 128-bit UUID in little-endian byte order
    pub fn uuid(self) -> [u8; 16] {
        let mut uuid = SERVICE_UUID;
        uuid[0] = self.to_byte();
        uuid
    }

    /// Returns true if the companion app writes to this characteristic
    pub fn is_writable(&self) -> bool {
        matches!(
            self,
            Characteristic::MarkReported
                | Characteristic::TimeSync
                | Characteristic::Units
                | Characteristic::LifetimeTotals
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_byte_roundtrip() {
        for byte in 0u8..=255 {
            if let Some(c) = Characteristic::from_byte(byte) {
                assert_eq!(c.to_byte(), byte);
            }
        }
    }

    #[test]
    fn test_uuid_differs_in_last_byte_only() {
        let uuid = Characteristic::MarkReported.uuid();
        assert_eq!(uuid[0], 0xF3);
        assert_eq!(&uuid[1..], &SERVICE_UUID[1..]);
    }

    #[test]
    fn test_writable() {
        assert!(Characteristic::MarkReported.is_writable());
        assert!(Characteristic::LifetimeTotals.is_writable());
        assert!(!Characteristic::LiveReport.is_writable());
        assert!(!Characteristic::UnreportedSessions.is_writable());
    }
}
