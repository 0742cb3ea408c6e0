//! Session engine
//!
//! Owns the record store and every live counter. All calls come from the
//! main loop; the interrupt side only feeds a
//! [`RotationCounter`](crate::counter::RotationCounter) whose batches are
//! handed to [`SessionEngine::tick`].
//!
//! # Persist triggers
//!
//! - Lifetime rotations advanced by the save interval since the last save
//! - Supply voltage at or below the low threshold (with spacing)
//! - Administrative lifetime override
//!
//! Triggers are gated until a wall-clock reference arrives or the grace
//! period after boot expires. A request made while gated is remembered
//! and carried out on the first tick after the gate opens.

use heapless::Vec;

use hodometer_hal::{InterruptControl, SectorFlash};
use hodometer_protocol::{Command, LiveReport, SessionList};

use super::clock::WallClock;
use super::state::{SessionEvent, SessionState};
use crate::config::{DistanceUnit, OdometerConfig};
use crate::counter::{ActiveTimeTracker, SpeedWindow};
use crate::record::SessionRecord;
use crate::storage::{RecordStore, StoreError, WriteOutcome, MAX_SLOTS};

/// Sessions listed in the boot log
pub const BOOT_LOG_LIMIT: usize = 10;

const SECONDS_PER_HOUR: f32 = 3_600.0;

/// Why a persist was requested
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PersistReason {
    RotationInterval,
    LowVoltage,
    AdminOverride,
    /// Final save before the session is marked reported
    Acknowledge,
}

/// Result of a persist request that did not fail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PersistOutcome {
    Written { session_id: u32, write_index: u32 },
    /// No session rotations yet; nothing worth an erase cycle
    Skipped,
    /// Waiting for time sync or the grace period
    Deferred,
}

/// Counter snapshot for the transport
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LiveCounters {
    pub session_rotations: u32,
    pub session_active_s: u32,
    pub lifetime_rotations: u32,
    pub lifetime_active_s: u32,
    /// 0 while undecided
    pub session_id: u32,
}

/// Single owner of the session ledger
pub struct SessionEngine<F: SectorFlash, I: InterruptControl> {
    store: RecordStore<F, I>,
    config: OdometerConfig,
    state: SessionState,
    /// Highest session id assigned so far
    last_known_id: u32,
    next_write_index: u32,
    lifetime_rotations: u32,
    session_rotations: u32,
    tracker: ActiveTimeTracker,
    speed: SpeedWindow,
    clock: WallClock,
    session_start_unix: u32,
    boot_ms: u32,
    last_saved_rotations: u32,
    last_save_ms: Option<u32>,
    deferred: Option<PersistReason>,
    metric: bool,
    voltage_mv: u32,
}

impl<F: SectorFlash, I: InterruptControl> SessionEngine<F, I> {
    /// Rebuild state from flash
    ///
    /// Lifetime totals come from the record with the highest session id;
    /// the next write index follows the highest one on flash.
    pub fn boot(mut store: RecordStore<F, I>, config: OdometerConfig, now_ms: u32) -> Self {
        let mut records = store.scan_all();

        let next_write_index = records
            .iter()
            .map(|r| r.write_index)
            .max()
            .map_or(0, |w| w.wrapping_add(1));

        records.sort_unstable_by(|a, b| b.session_id.cmp(&a.session_id));
        let latest = records.first().copied();

        match latest {
            Some(latest) => {
                info!(
                    "{} valid session(s) on flash, last id {}, lifetime {} rot / {} s",
                    records.len(),
                    latest.session_id,
                    latest.lifetime_rotation_count,
                    latest.lifetime_time_s
                );
            }
            None => info!("no valid session on flash, starting fresh"),
        }
        for (i, r) in records.iter().take(BOOT_LOG_LIMIT).enumerate() {
            info!(
                "  [{}] sector {}: id={} wr_idx={} rot={}/{} time={}/{}s start={} end={} reported={}",
                i + 1,
                store.slot_for(r.write_index),
                r.session_id,
                r.write_index,
                r.session_rotation_count,
                r.lifetime_rotation_count,
                r.session_active_time_s,
                r.lifetime_time_s,
                r.session_start_unix,
                r.session_end_unix,
                r.reported
            );
        }

        let (last_known_id, lifetime_rotations, lifetime_s) = latest.map_or((0, 0, 0), |r| {
            (r.session_id, r.lifetime_rotation_count, r.lifetime_time_s)
        });

        Self {
            store,
            state: SessionState::Undecided,
            last_known_id,
            next_write_index,
            lifetime_rotations,
            session_rotations: 0,
            tracker: ActiveTimeTracker::new(config.sensor.idle_timeout_ms, lifetime_s),
            speed: SpeedWindow::new(),
            clock: WallClock::new(),
            session_start_unix: 0,
            boot_ms: now_ms,
            last_saved_rotations: lifetime_rotations,
            last_save_ms: None,
            deferred: None,
            metric: config.units.metric,
            voltage_mv: 0,
            config,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Id shown to the transport; 0 while undecided
    pub fn session_id(&self) -> u32 {
        self.state.live_id()
    }

    pub fn next_write_index(&self) -> u32 {
        self.next_write_index
    }

    pub fn clock(&self) -> &WallClock {
        &self.clock
    }

    pub fn store(&self) -> &RecordStore<F, I> {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut RecordStore<F, I> {
        &mut self.store
    }

    pub fn is_metric(&self) -> bool {
        self.metric
    }

    pub fn set_metric(&mut self, metric: bool) {
        if metric != self.metric {
            info!("units: {}", if metric { "km" } else { "miles" });
        }
        self.metric = metric;
    }

    /// Account for a batch of rotations and run the rotation trigger
    ///
    /// Call once per poll interval with whatever the rotation counter
    /// yielded (possibly 0).
    pub fn tick(&mut self, rotations: u32, now_ms: u32) -> Result<(), StoreError> {
        if rotations > 0 {
            self.lifetime_rotations = self.lifetime_rotations.saturating_add(rotations);
            self.session_rotations = self.session_rotations.saturating_add(rotations);
            self.tracker.record_rotation(now_ms);
        }
        self.tracker.tick(now_ms);

        if let Some(reason) = self.deferred {
            if self.time_gate_open(now_ms) {
                info!("running deferred persist ({})", reason);
                self.deferred = None;
                self.persist_now(reason, now_ms)?;
                return Ok(());
            }
        }

        let since_save = self.lifetime_rotations.wrapping_sub(self.last_saved_rotations);
        if rotations > 0 && since_save >= self.config.session.rotation_save_interval {
            self.persist(PersistReason::RotationInterval, now_ms)?;
        }

        Ok(())
    }

    /// Latest VSYS reading; may trigger an emergency save
    pub fn on_voltage(&mut self, mv: u32, now_ms: u32) -> Result<(), StoreError> {
        self.voltage_mv = mv;

        let power = &self.config.power;
        if !power.voltage_save || mv > power.low_voltage_mv {
            return Ok(());
        }
        if self.lifetime_rotations == self.last_saved_rotations {
            return Ok(());
        }
        if let Some(last) = self.last_save_ms {
            if now_ms.wrapping_sub(last) < power.min_save_spacing_ms {
                return Ok(());
            }
        }

        warn!("VSYS {} mV at or below {} mV, saving", mv, power.low_voltage_mv);
        self.persist(PersistReason::LowVoltage, now_ms)?;
        Ok(())
    }

    fn time_gate_open(&self, now_ms: u32) -> bool {
        self.clock.has_time()
            || now_ms.wrapping_sub(self.boot_ms) >= self.config.session.time_sync_grace_ms
    }

    /// Persist the live counters, subject to the time gate
    pub fn persist(
        &mut self,
        reason: PersistReason,
        now_ms: u32,
    ) -> Result<PersistOutcome, StoreError> {
        if !self.time_gate_open(now_ms) {
            if self.deferred.is_none() {
                info!("persist ({}) deferred until time sync", reason);
            }
            self.deferred = Some(reason);
            return Ok(PersistOutcome::Deferred);
        }
        self.persist_now(reason, now_ms)
    }

    fn persist_now(
        &mut self,
        reason: PersistReason,
        now_ms: u32,
    ) -> Result<PersistOutcome, StoreError> {
        let previous = self.state;
        self.state = self
            .state
            .transition(SessionEvent::PersistRequested, self.last_known_id);

        let Some(session_id) = self.state.current_id() else {
            return Ok(PersistOutcome::Skipped);
        };
        if previous == SessionState::Undecided {
            info!("session {} opened", session_id);
            self.last_known_id = session_id;
        }

        let end_unix = self.clock.now_unix(now_ms);
        let session_active_s = self.tracker.session_seconds();
        if end_unix != 0 && self.session_start_unix == 0 {
            self.session_start_unix = end_unix.saturating_sub(session_active_s);
            debug!(
                "session start estimated as {} - {} = {}",
                end_unix,
                session_active_s,
                self.session_start_unix
            );
        }

        let write_index = self.next_write_index;
        let record = SessionRecord {
            session_id,
            write_index,
            session_rotation_count: self.session_rotations,
            session_active_time_s: session_active_s,
            session_start_unix: self.session_start_unix,
            session_end_unix: end_unix,
            lifetime_rotation_count: self.lifetime_rotations,
            lifetime_time_s: self.tracker.lifetime_seconds(),
            reported: false,
        };

        debug!("persist ({}) session {}", reason, session_id);
        let result = self.store.write(&record);

        // Also on failure, so a bad sector is not hammered every tick
        self.last_saved_rotations = self.lifetime_rotations;
        self.last_save_ms = Some(now_ms);

        match result {
            Ok(WriteOutcome::Written { .. }) => {
                self.next_write_index = write_index.wrapping_add(1);
                Ok(PersistOutcome::Written {
                    session_id,
                    write_index,
                })
            }
            Ok(WriteOutcome::Skipped) => Ok(PersistOutcome::Skipped),
            Err(e) => {
                self.next_write_index = write_index.wrapping_add(1);
                error!(
                    "session {} not persisted, counters held in RAM",
                    session_id
                );
                Err(e)
            }
        }
    }

    /// Acknowledge a session
    ///
    /// For the current session this saves the latest counts, flags the
    /// record and opens the next session. For an older session only its
    /// flag is rewritten in place. Returns `Ok(false)` if no slot holds the
    /// session.
    ///
    /// If the final save of the current session fails, the error is
    /// returned and the session stays open with its counters intact.
    pub fn mark_reported(&mut self, session_id: u32, now_ms: u32) -> Result<bool, StoreError> {
        let is_current = self.state.current_id() == Some(session_id);

        if is_current {
            info!("marking current session {} reported", session_id);
            // Not gated: the counts must be captured before the session closes
            if let Err(e) = self.persist_now(PersistReason::Acknowledge, now_ms) {
                warn!("final save of session {} failed, keeping it open", session_id);
                return Err(e);
            }
        }

        let Some(mut record) = self.store.find(session_id) else {
            warn!("session {} not found on flash", session_id);
            return Ok(false);
        };

        let result = if record.reported {
            debug!("session {} already reported", session_id);
            Ok(())
        } else {
            record.reported = true;
            self.store.write(&record).map(|_| ())
        };

        if is_current {
            self.close_and_reopen(now_ms);
        }

        result.map(|()| true)
    }

    fn close_and_reopen(&mut self, now_ms: u32) {
        self.state = self
            .state
            .transition(SessionEvent::Reported, self.last_known_id);
        self.state = self
            .state
            .transition(SessionEvent::Reopened, self.last_known_id);

        if let Some(id) = self.state.current_id() {
            self.last_known_id = id;
            info!("session {} opened", id);
        }

        self.session_rotations = 0;
        self.tracker.reset_session(now_ms);
        self.speed.reset();
        self.session_start_unix = self.clock.now_unix(now_ms);
    }

    /// Unreported sessions on flash, oldest first, excluding the live one
    pub fn unreported_sessions(&mut self) -> Vec<SessionRecord, MAX_SLOTS> {
        let current = self.state.current_id();
        let mut sessions = self.store.scan_all();
        sessions.retain(|r| !r.reported && Some(r.session_id) != current);
        sessions.sort_unstable_by_key(|r| r.session_id);
        sessions
    }

    /// Unreported sessions in wire form
    pub fn session_list(&mut self) -> SessionList {
        let mut list = SessionList::new();
        for record in self.unreported_sessions() {
            list.push(record.summary());
        }
        list
    }

    /// Accept a wall-clock reference (and optional timezone offset)
    pub fn set_time_reference(&mut self, unix: u32, tz_offset_s: Option<i32>, now_ms: u32) -> bool {
        if !self.clock.set(unix, now_ms) {
            return false;
        }
        if let Some(offset) = tz_offset_s {
            self.clock.set_tz_offset(offset);
        }
        true
    }

    /// Overwrite lifetime totals (moving progress to a new device)
    ///
    /// `distance` is in the currently selected unit. The new totals are
    /// persisted like any other save.
    pub fn set_lifetime_totals(
        &mut self,
        hours: f32,
        distance: f32,
        now_ms: u32,
    ) -> Result<PersistOutcome, StoreError> {
        let unit = DistanceUnit::from_metric(self.metric);
        let rotations = unit.rotations_for(distance, self.config.sensor.circumference_cm());
        // Saturating cast: negative and NaN become 0
        let seconds = (hours * SECONDS_PER_HOUR) as u32;

        info!(
            "lifetime override: {} rot / {} s (was {} rot / {} s)",
            rotations,
            seconds,
            self.lifetime_rotations,
            self.tracker.lifetime_seconds()
        );

        self.lifetime_rotations = rotations;
        self.tracker.set_lifetime(seconds, now_ms);
        self.persist(PersistReason::AdminOverride, now_ms)
    }

    /// Apply a decoded companion-app command
    pub fn apply(&mut self, command: Command, now_ms: u32) -> Result<(), StoreError> {
        match command {
            Command::MarkReported { session_id } => {
                self.mark_reported(session_id, now_ms)?;
            }
            Command::SyncTime { unix, tz_offset_s } => {
                self.set_time_reference(unix, tz_offset_s, now_ms);
            }
            Command::SetUnits { metric } => self.set_metric(metric),
            Command::SetLifetimeTotals { hours, distance } => {
                self.set_lifetime_totals(hours, distance, now_ms)?;
            }
        }
        Ok(())
    }

    /// Add a speed sample; call once a second
    pub fn sample_speed(&mut self, now_ms: u32) {
        self.speed.sample(self.session_rotations, now_ms);
    }

    pub fn counters(&self) -> LiveCounters {
        LiveCounters {
            session_rotations: self.session_rotations,
            session_active_s: self.tracker.session_seconds(),
            lifetime_rotations: self.lifetime_rotations,
            lifetime_active_s: self.tracker.lifetime_seconds(),
            session_id: self.state.live_id(),
        }
    }

    /// Snapshot for the live-report characteristic
    pub fn live_report(&self) -> LiveReport {
        let counters = self.counters();
        let unit = DistanceUnit::from_metric(self.metric);
        let circumference_cm = self.config.sensor.circumference_cm();

        let session_avg = if counters.session_active_s == 0 {
            0.0
        } else {
            let per_hour = counters.session_rotations as f32 * SECONDS_PER_HOUR
                / counters.session_active_s as f32;
            unit.speed(per_hour, circumference_cm)
        };

        LiveReport {
            session_rotations: counters.session_rotations,
            total_rotations: counters.lifetime_rotations,
            session_time_s: counters.session_active_s,
            total_time_s: counters.lifetime_active_s,
            running_avg_speed: unit.speed(self.speed.rotations_per_hour(), circumference_cm),
            session_avg_speed: session_avg,
            voltage_mv: self.voltage_mv,
            session_id: counters.session_id,
            metric: self.metric,
        }
    }
}
