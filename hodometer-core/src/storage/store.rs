//! Record store over raw sector flash
//!
//! Write path:
//!
//! ```text
//!  encode ─► [ mask irq ─► erase ─► program ─► unmask ] ─► read back ─► verify
//!                 ▲                                                      │
//!                 └──────────────── one retry on mismatch ───────────────┘
//! ```
//!
//! The store is not reentrant. Exactly one owner (the session engine,
//! running in the main loop) calls into it.

use heapless::Vec;

use hodometer_hal::{FlashError, InterruptControl, SectorFlash, PAGE_SIZE};

use super::critical::CriticalSection;
use crate::record::codec::{
    computed_checksum, current_words, reported_word, stored_checksum, CURRENT_FIELD_NAMES,
};
use crate::record::{decode_slot, encode, SessionRecord, SlotContents};

/// Upper bound on the number of slots (and thus distinct records)
pub const MAX_SLOTS: usize = 64;

/// Erase+program+verify cycles before a write is abandoned
pub const WRITE_ATTEMPTS: u32 = 2;

/// Errors from the record store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StoreError {
    /// Every attempt failed to program or verify; the data exists only
    /// in RAM until a later write succeeds
    PersistentWriteFailure { sector: u32 },
}

/// Result of a write that did not fail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum WriteOutcome {
    /// Record is on flash and verified
    Written { sector: u32, attempts: u32 },
    /// Record had no rotations; nothing was erased
    Skipped,
}

/// Fixed-cardinality record store
pub struct RecordStore<F: SectorFlash, I: InterruptControl> {
    flash: F,
    irq: I,
    slots: u32,
}

impl<F: SectorFlash, I: InterruptControl> RecordStore<F, I> {
    /// Create a new store over the first `slots` sectors of `flash`
    ///
    /// The slot count is clamped to what the flash provides and to
    /// [`MAX_SLOTS`].
    pub fn new(flash: F, irq: I, slots: u32) -> Self {
        let slots = slots
            .min(flash.sector_count())
            .min(MAX_SLOTS as u32)
            .max(1);
        Self { flash, irq, slots }
    }

    pub fn slot_count(&self) -> u32 {
        self.slots
    }

    /// Sector a record with this write index lands in
    pub fn slot_for(&self, write_index: u32) -> u32 {
        write_index % self.slots
    }

    /// Get the underlying flash
    pub fn flash(&self) -> &F {
        &self.flash
    }

    /// Get the underlying flash mutably
    pub fn flash_mut(&mut self) -> &mut F {
        &mut self.flash
    }

    /// Write a record to its slot, verifying the result
    ///
    /// Records without rotations are skipped without touching flash.
    pub fn write(&mut self, record: &SessionRecord) -> Result<WriteOutcome, StoreError> {
        if !record.has_motion() {
            debug!(
                "session {}: no rotations, write skipped",
                record.session_id
            );
            return Ok(WriteOutcome::Skipped);
        }

        let sector = self.slot_for(record.write_index);
        let page = encode(record);

        info!(
            "flash write sector {}: id={} wr_idx={} rot={}/{} time={}/{}s start={} end={} reported={} checksum={:#x}",
            sector,
            record.session_id,
            record.write_index,
            record.session_rotation_count,
            record.lifetime_rotation_count,
            record.session_active_time_s,
            record.lifetime_time_s,
            record.session_start_unix,
            record.session_end_unix,
            record.reported,
            stored_checksum(&page)
        );

        for attempt in 1..=WRITE_ATTEMPTS {
            if attempt > 1 {
                warn!(
                    "retrying write to sector {} (attempt {}/{})",
                    sector,
                    attempt,
                    WRITE_ATTEMPTS
                );
            }

            if let Err(e) = self.erase_and_program(sector, &page) {
                warn!("sector {}: flash error {}", sector, e);
                continue;
            }

            if self.verify(sector, &page) {
                if attempt > 1 {
                    info!("sector {}: verified after retry", sector);
                }
                return Ok(WriteOutcome::Written {
                    sector,
                    attempts: attempt,
                });
            }
        }

        error!(
            "sector {}: write failed verification after {} attempts",
            sector,
            WRITE_ATTEMPTS
        );
        Err(StoreError::PersistentWriteFailure { sector })
    }

    /// Read every slot once and return one record per session id
    ///
    /// For each id the copy with the highest write index wins. Unreadable,
    /// corrupt and empty slots are skipped; future-format slots are erased.
    pub fn scan_all(&mut self) -> Vec<SessionRecord, MAX_SLOTS> {
        let mut records: Vec<SessionRecord, MAX_SLOTS> = Vec::new();

        for sector in 0..self.slots {
            let Some(record) = self.read_slot(sector) else {
                continue;
            };

            match records
                .iter_mut()
                .find(|r| r.session_id == record.session_id)
            {
                Some(existing) => {
                    if record.write_index > existing.write_index {
                        *existing = record;
                    }
                }
                None => {
                    // At most one record per slot, so this cannot overflow
                    let _ = records.push(record);
                }
            }
        }

        records
    }

    /// Authoritative copy of one session, if any slot holds it
    pub fn find(&mut self, session_id: u32) -> Option<SessionRecord> {
        let mut best: Option<SessionRecord> = None;

        for sector in 0..self.slots {
            match self.read_slot(sector) {
                Some(record) if record.session_id == session_id => {
                    if best.map_or(true, |b| record.write_index > b.write_index) {
                        best = Some(record);
                    }
                }
                _ => {}
            }
        }

        best
    }

    fn erase_and_program(&mut self, sector: u32, page: &[u8; PAGE_SIZE]) -> Result<(), FlashError> {
        let _cs = CriticalSection::enter(&mut self.irq);
        self.flash.erase_sector(sector)?;
        self.flash.program_page(sector, page)
    }

    /// Compare the programmed page against the intended one
    fn verify(&mut self, sector: u32, expected: &[u8; PAGE_SIZE]) -> bool {
        let mut actual = [0u8; PAGE_SIZE];
        if let Err(e) = self.flash.read_page(sector, &mut actual) {
            warn!("sector {}: read-back failed: {}", sector, e);
            return false;
        }

        let mut ok = true;

        let wanted = current_words(expected);
        let found = current_words(&actual);
        for ((name, want), got) in CURRENT_FIELD_NAMES.iter().zip(wanted).zip(found) {
            if want != got {
                warn!(
                    "sector {}: {} mismatch, expected {} got {}",
                    sector,
                    name,
                    want,
                    got
                );
                ok = false;
            }
        }

        // Pads are outside the checksum, so compare the word as written
        let want = reported_word(expected);
        let got = reported_word(&actual);
        if want != got {
            warn!(
                "sector {}: reported word mismatch, expected {:#x} got {:#x}",
                sector,
                want,
                got
            );
            ok = false;
        }

        let stored = stored_checksum(&actual);
        let intended = stored_checksum(expected);
        if stored != intended {
            warn!(
                "sector {}: checksum mismatch, expected {:#x} got {:#x}",
                sector,
                intended,
                stored
            );
            ok = false;
        }

        let recomputed = computed_checksum(&actual);
        if recomputed != stored {
            warn!(
                "sector {}: checksum invalid, stored {:#x} computed {:#x}",
                sector,
                stored,
                recomputed
            );
            ok = false;
        }

        ok
    }

    fn read_slot(&mut self, sector: u32) -> Option<SessionRecord> {
        let mut page = [0u8; PAGE_SIZE];
        if let Err(e) = self.flash.read_page(sector, &mut page) {
            warn!("sector {}: read failed: {}", sector, e);
            return None;
        }

        match decode_slot(&page) {
            SlotContents::Empty => None,
            SlotContents::Current(record) => Some(record),
            SlotContents::Legacy(record) => {
                trace!(
                    "sector {}: legacy record for session {}",
                    sector,
                    record.session_id
                );
                Some(record)
            }
            SlotContents::Corrupt(reason) => {
                debug!("sector {}: skipped ({})", sector, reason);
                None
            }
            SlotContents::Future { version } => {
                warn!(
                    "sector {}: format version {} is newer than this firmware, erasing",
                    sector,
                    version
                );
                self.reclaim(sector);
                None
            }
        }
    }

    fn reclaim(&mut self, sector: u32) {
        let result = {
            let _cs = CriticalSection::enter(&mut self.irq);
            self.flash.erase_sector(sector)
        };
        match result {
            Ok(()) => info!("sector {}: erased", sector),
            Err(e) => warn!("sector {}: erase failed: {}", sector, e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::codec::encode_legacy;
    use crate::storage::mock::{mock_pair, MockFlash, MockIrq, MOCK_SECTORS};
    use proptest::prelude::*;

    fn store() -> RecordStore<MockFlash, MockIrq> {
        let (flash, irq) = mock_pair();
        RecordStore::new(flash, irq, 64)
    }

    fn record(session_id: u32, write_index: u32, rotations: u32) -> SessionRecord {
        SessionRecord {
            session_id,
            write_index,
            session_rotation_count: rotations,
            session_active_time_s: rotations / 10,
            session_start_unix: 0,
            session_end_unix: 0,
            lifetime_rotation_count: 10_000 + rotations,
            lifetime_time_s: 5_000 + rotations / 10,
            reported: false,
        }
    }

    #[test]
    fn test_write_then_find() {
        let mut store = store();
        let rec = SessionRecord {
            session_start_unix: 1_750_000_000,
            session_end_unix: 1_750_000_300,
            reported: true,
            ..record(3, 9, 2500)
        };

        let outcome = store.write(&rec).unwrap();
        assert_eq!(
            outcome,
            WriteOutcome::Written {
                sector: 9,
                attempts: 1
            }
        );
        assert_eq!(store.find(3), Some(rec));
        assert_eq!(store.scan_all().as_slice(), &[rec]);
    }

    #[test]
    fn test_zero_rotations_never_touch_flash() {
        let mut store = store();
        let outcome = store.write(&record(1, 0, 0)).unwrap();
        assert_eq!(outcome, WriteOutcome::Skipped);
        assert_eq!(store.flash().erases, 0);
        assert_eq!(store.flash().programs, 0);
        assert!(store.scan_all().is_empty());
    }

    #[test]
    fn test_slot_wraps_by_write_index() {
        let mut store = store();
        store.write(&record(1, 70, 10)).unwrap();
        assert!(!store.flash().is_erased(6));
        assert_eq!(store.slot_for(64), 0);
    }

    #[test]
    fn test_erase_and_program_run_masked() {
        let mut store = store();
        store.write(&record(1, 0, 10)).unwrap();
        store.write(&record(1, 1, 20)).unwrap();
        assert_eq!(store.flash().unmasked_writes, 0);
        assert_eq!(store.flash().erases, 2);
    }

    #[test]
    fn test_single_bit_error_is_retried() {
        let mut store = store();
        store.flash_mut().corrupt_next_programs = 1;

        let outcome = store.write(&record(2, 4, 100)).unwrap();
        assert_eq!(
            outcome,
            WriteOutcome::Written {
                sector: 4,
                attempts: 2
            }
        );
        assert_eq!(store.flash().programs, 2);
        assert_eq!(store.find(2), Some(record(2, 4, 100)));
    }

    #[test]
    fn test_two_failures_are_fatal() {
        let mut store = store();
        store.flash_mut().corrupt_next_programs = 5;

        let result = store.write(&record(2, 4, 100));
        assert_eq!(result, Err(StoreError::PersistentWriteFailure { sector: 4 }));
        // Exactly one retry
        assert_eq!(store.flash().programs, 2);
        // The corrupted copy is not readable
        assert_eq!(store.find(2), None);
    }

    #[test]
    fn test_corrupted_checksum_word_is_retried() {
        let mut store = store();
        store.flash_mut().corrupt_offset = 45;
        store.flash_mut().corrupt_next_programs = 1;

        let outcome = store.write(&record(2, 4, 100)).unwrap();
        assert!(matches!(outcome, WriteOutcome::Written { attempts: 2, .. }));
    }

    #[test]
    fn test_corrupted_pad_byte_is_retried() {
        let mut store = store();
        store.flash_mut().corrupt_offset = 42;
        store.flash_mut().corrupt_next_programs = 1;

        let outcome = store.write(&record(2, 4, 100)).unwrap();
        assert!(matches!(outcome, WriteOutcome::Written { attempts: 2, .. }));
        assert_eq!(store.flash().programs, 2);
    }

    #[test]
    fn test_erase_failure_is_retried() {
        let mut store = store();
        store.flash_mut().fail_next_erases = 1;

        let outcome = store.write(&record(1, 0, 10)).unwrap();
        assert!(matches!(outcome, WriteOutcome::Written { attempts: 2, .. }));
        assert_eq!(store.flash().programs, 1);
    }

    #[test]
    fn test_highest_write_index_wins() {
        let mut store = store();
        store.write(&record(1, 0, 10)).unwrap();
        store.write(&record(1, 1, 20)).unwrap();
        store.write(&record(1, 2, 30)).unwrap();

        let all = store.scan_all();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].write_index, 2);
        assert_eq!(all[0].session_rotation_count, 30);
    }

    #[test]
    fn test_dedup_across_wraparound() {
        let mut store = store();
        for write_index in 0..70 {
            store.write(&record(5, write_index, write_index + 1)).unwrap();
        }

        let found = store.find(5).unwrap();
        assert_eq!(found.write_index, 69);
        assert_eq!(found.session_rotation_count, 70);
        assert_eq!(store.scan_all().len(), 1);
    }

    #[test]
    fn test_corrupt_slot_same_as_empty() {
        let mut damaged = store();
        let mut clean = store();

        for (id, write_index) in [(1, 0), (2, 1), (3, 2)] {
            damaged.write(&record(id, write_index, 50)).unwrap();
            if id != 2 {
                clean.write(&record(id, write_index, 50)).unwrap();
            }
        }

        // Flip a bit in the checksum word of sector 1
        damaged.flash_mut().sectors[1][44] ^= 0x80;

        assert_eq!(damaged.scan_all(), clean.scan_all());
        assert_eq!(damaged.find(2), None);
    }

    #[test]
    fn test_future_format_excluded_and_reclaimed() {
        let mut store = store();
        store.write(&record(1, 0, 10)).unwrap();

        // A checksum-valid record from newer firmware in sector 5
        let mut page = encode(&record(9, 5, 10));
        page[4] = 3;
        let checksum = computed_checksum(&page);
        page[44..48].copy_from_slice(&checksum.to_le_bytes());
        store.flash_mut().sectors[5] = page;

        let all = store.scan_all();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].session_id, 1);
        assert!(store.flash().is_erased(5));
        assert_eq!(store.flash().unmasked_writes, 0);
    }

    #[test]
    fn test_legacy_records_are_read() {
        let mut store = store();
        let legacy = record(4, 4, 200);
        store.flash_mut().sectors[4] = encode_legacy(&legacy);

        let found = store.find(4).unwrap();
        assert_eq!(found.write_index, 4);
        assert_eq!(found.session_rotation_count, 200);
    }

    #[test]
    fn test_current_copy_shadows_legacy_copy() {
        let mut store = store();
        store.flash_mut().sectors[4] = encode_legacy(&record(4, 4, 200));
        store.write(&record(4, 10, 300)).unwrap();

        let all = store.scan_all();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].write_index, 10);
        assert_eq!(all[0].session_rotation_count, 300);
    }

    #[test]
    fn test_find_missing() {
        let mut store = store();
        store.write(&record(1, 0, 10)).unwrap();
        assert_eq!(store.find(2), None);
    }

    #[test]
    fn test_slot_count_clamped_to_flash() {
        let (flash, irq) = mock_pair();
        let store = RecordStore::new(flash, irq, 500);
        assert_eq!(store.slot_count(), MOCK_SECTORS as u32);
    }

    proptest! {
        #[test]
        fn test_find_matches_slot_model(ids in proptest::collection::vec(1u32..6, 1..200)) {
            let mut store = store();
            let mut model: [Option<SessionRecord>; MOCK_SECTORS] = [None; MOCK_SECTORS];

            for (write_index, id) in ids.iter().enumerate() {
                let rec = record(*id, write_index as u32, write_index as u32 + 1);
                store.write(&rec).unwrap();
                model[write_index % MOCK_SECTORS] = Some(rec);
            }

            for id in 1u32..6 {
                let expected = model
                    .iter()
                    .flatten()
                    .filter(|r| r.session_id == id)
                    .max_by_key(|r| r.write_index)
                    .copied();
                prop_assert_eq!(store.find(id), expected);
            }

            let all = store.scan_all();
            for (i, a) in all.iter().enumerate() {
                for b in &all[i + 1..] {
                    prop_assert_ne!(a.session_id, b.session_id);
                }
            }
        }

        #[test]
        fn test_lifetime_non_decreasing(steps in proptest::collection::vec(1u32..500, 1..40)) {
            let mut store = store();
            let mut lifetime = 0u32;
            let mut previous: Option<SessionRecord> = None;

            for (write_index, step) in steps.iter().enumerate() {
                lifetime += step;
                let rec = SessionRecord {
                    lifetime_rotation_count: lifetime,
                    ..record(1, write_index as u32, lifetime)
                };
                store.write(&rec).unwrap();

                let found = store.find(1).unwrap();
                if let Some(prev) = previous {
                    prop_assert!(found.lifetime_rotation_count >= prev.lifetime_rotation_count);
                }
                previous = Some(found);
            }
        }
    }
}
