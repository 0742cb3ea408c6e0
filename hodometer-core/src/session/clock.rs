//! Wall-clock time derived from a one-shot reference
//!
//! The device has no RTC. Once the companion app (or NTP) supplies a Unix
//! timestamp, later instants are `reference + elapsed uptime`.

use core::ops::Range;

/// Timestamps outside this range are accepted but logged as suspicious
pub const PLAUSIBLE_UNIX: Range<u32> = 1_700_000_000..2_000_000_000;

#[derive(Debug, Clone, Copy)]
struct TimeReference {
    unix: u32,
    uptime_ms: u32,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct WallClock {
    reference: Option<TimeReference>,
    tz_offset_s: i32,
}

impl WallClock {
    /// Create a new clock with no time reference
    pub const fn new() -> Self {
        Self {
            reference: None,
            tz_offset_s: 0,
        }
    }

    pub fn is_plausible(unix: u32) -> bool {
        PLAUSIBLE_UNIX.contains(&unix)
    }

    /// Set the reference; 0 is rejected
    pub fn set(&mut self, unix: u32, now_ms: u32) -> bool {
        if unix == 0 {
            warn!("time reference 0 rejected");
            return false;
        }
        if !Self::is_plausible(unix) {
            warn!("time reference {} looks implausible", unix);
        }

        self.reference = Some(TimeReference {
            unix,
            uptime_ms: now_ms,
        });
        info!("time reference set: {} at uptime {} ms", unix, now_ms);
        true
    }

    pub fn has_time(&self) -> bool {
        self.reference.is_some()
    }

    /// Current Unix time, 0 if unknown
    pub fn now_unix(&self, now_ms: u32) -> u32 {
        self.reference.map_or(0, |r| {
            r.unix
                .wrapping_add(now_ms.wrapping_sub(r.uptime_ms) / 1000)
        })
    }

    /// Phone timezone offset; only for display, stored times stay UTC
    pub fn tz_offset_s(&self) -> i32 {
        self.tz_offset_s
    }

    pub fn set_tz_offset(&mut self, offset_s: i32) {
        self.tz_offset_s = offset_s;
    }

    /// Current local time, 0 if unknown
    pub fn now_local(&self, now_ms: u32) -> u32 {
        match self.now_unix(now_ms) {
            0 => 0,
            utc => utc.wrapping_add_signed(self.tz_offset_s),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_until_set() {
        let clock = WallClock::new();
        assert!(!clock.has_time());
        assert_eq!(clock.now_unix(5_000), 0);
    }

    #[test]
    fn test_advances_with_uptime() {
        let mut clock = WallClock::new();
        assert!(clock.set(1_750_000_000, 10_000));
        assert_eq!(clock.now_unix(10_999), 1_750_000_000);
        assert_eq!(clock.now_unix(12_000), 1_750_000_002);
    }

    #[test]
    fn test_zero_rejected() {
        let mut clock = WallClock::new();
        assert!(!clock.set(0, 1_000));
        assert!(!clock.has_time());
    }

    #[test]
    fn test_implausible_still_accepted() {
        let mut clock = WallClock::new();
        assert!(!WallClock::is_plausible(1_000));
        assert!(clock.set(1_000, 0));
        assert_eq!(clock.now_unix(3_000), 1_003);
    }

    #[test]
    fn test_local_time_uses_offset() {
        let mut clock = WallClock::new();
        clock.set(1_750_000_000, 0);
        clock.set_tz_offset(-3_600);
        assert_eq!(clock.now_unix(0), 1_750_000_000);
        assert_eq!(clock.now_local(0), 1_749_996_400);
    }
}
