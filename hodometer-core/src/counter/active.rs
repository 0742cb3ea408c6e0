//! Active-time accounting
//!
//! An active period opens on the first rotation after idleness and closes
//! once the idle timeout passes without another rotation. A closed period
//! contributes `last_rotation - start`, so the trailing idle wait is not
//! counted. Queries during a period include the time up to the latest
//! rotation without closing it, which is exactly what the close will
//! credit. Reported totals therefore never go down.
//!
//! All timestamps are milliseconds of uptime and may wrap.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ActivePeriod {
    start_ms: u32,
    last_rotation_ms: u32,
}

impl ActivePeriod {
    fn elapsed_s(&self) -> u32 {
        self.last_rotation_ms.wrapping_sub(self.start_ms) / 1000
    }

    /// Credit nothing so far and continue from `now_ms`
    fn restart(&mut self, now_ms: u32) {
        self.start_ms = now_ms;
        self.last_rotation_ms = now_ms;
    }
}

/// Lifetime and session active seconds
#[derive(Debug, Clone)]
pub struct ActiveTimeTracker {
    idle_timeout_ms: u32,
    lifetime_s: u32,
    session_s: u32,
    period: Option<ActivePeriod>,
}

impl ActiveTimeTracker {
    /// Create a new tracker starting from persisted lifetime seconds
    pub fn new(idle_timeout_ms: u32, lifetime_s: u32) -> Self {
        Self {
            idle_timeout_ms,
            lifetime_s,
            session_s: 0,
            period: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.period.is_some()
    }

    /// A rotation happened at `now_ms`
    pub fn record_rotation(&mut self, now_ms: u32) {
        match &mut self.period {
            Some(period) => period.last_rotation_ms = now_ms,
            None => {
                self.period = Some(ActivePeriod {
                    start_ms: now_ms,
                    last_rotation_ms: now_ms,
                })
            }
        }
    }

    /// Close the active period if the idle timeout has passed
    pub fn tick(&mut self, now_ms: u32) {
        if let Some(period) = self.period {
            if now_ms.wrapping_sub(period.last_rotation_ms) >= self.idle_timeout_ms {
                let elapsed = period.elapsed_s();
                self.lifetime_s = self.lifetime_s.saturating_add(elapsed);
                self.session_s = self.session_s.saturating_add(elapsed);
                self.period = None;
            }
        }
    }

    fn running_s(&self) -> u32 {
        self.period.map_or(0, |p| p.elapsed_s())
    }

    /// All-time active seconds, including the open period
    pub fn lifetime_seconds(&self) -> u32 {
        self.lifetime_s.saturating_add(self.running_s())
    }

    /// Session active seconds, including the open period
    pub fn session_seconds(&self) -> u32 {
        self.session_s.saturating_add(self.running_s())
    }

    /// Start a new session at `now_ms`
    ///
    /// Time already spent in an open period is credited to the lifetime
    /// total and the period restarts, so none of it leaks into the new
    /// session.
    pub fn reset_session(&mut self, now_ms: u32) {
        if let Some(period) = &mut self.period {
            self.lifetime_s = self.lifetime_s.saturating_add(period.elapsed_s());
            period.restart(now_ms);
        }
        self.session_s = 0;
    }

    /// Overwrite the lifetime total
    ///
    /// An open period restarts at `now_ms`; what it had accumulated stays
    /// with the session.
    pub fn set_lifetime(&mut self, lifetime_s: u32, now_ms: u32) {
        if let Some(period) = &mut self.period {
            self.session_s = self.session_s.saturating_add(period.elapsed_s());
            period.restart(now_ms);
        }
        self.lifetime_s = lifetime_s;
    }
}
