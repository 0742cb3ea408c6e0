//! On-flash record layout
//!
//! Every slot starts at a page boundary. The whole page is programmed; bytes
//! past the record are zero. All words are little-endian.
//!
//! ```text
//! Current (version 2, 48 bytes)
//! ┌───────┬─────────┬────┬─────────┬─────┬────────┬───────┬─────┬──────────┬───────────┬─────────┬──────────┐
//! │ magic │ version │ id │ wr_idx  │ rot │ active │ start │ end │ life_rot │ life_time │ rep+pad │ checksum │
//! └───────┴─────────┴────┴─────────┴─────┴────────┴───────┴─────┴──────────┴───────────┴─────────┴──────────┘
//!
//! Legacy (version 1, 44 bytes): same without wr_idx
//! ```
//!
//! The checksum is the XOR of every word before it, with the reported flag
//! taken from its single byte (the three pad bytes never participate).
//! Legacy records carry no write index; their session id stands in for it.

use hodometer_hal::PAGE_SIZE;

use super::types::SessionRecord;

/// "ODOS"
pub const MAGIC: u32 = 0x4F44_4F53;

pub const VERSION_LEGACY: u32 = 1;
pub const VERSION_CURRENT: u32 = 2;

pub const LEGACY_SIZE: usize = 44;
pub const CURRENT_SIZE: usize = 48;

const ERASED: u32 = 0xFFFF_FFFF;

/// Reported flag byte of a current-format record; pads follow
const REPORTED_OFFSET: usize = 40;

const LEGACY_FIELDS: usize = 10;
pub const CURRENT_FIELDS: usize = 11;

/// Names of the checksummed words of a current-format record, in order
pub const CURRENT_FIELD_NAMES: [&str; CURRENT_FIELDS] = [
    "magic",
    "format_version",
    "session_id",
    "write_index",
    "session_rotation_count",
    "session_active_time_s",
    "session_start_unix",
    "session_end_unix",
    "lifetime_rotation_count",
    "lifetime_time_s",
    "reported",
];

/// Why a slot did not yield a usable record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DecodeError {
    /// Slot holds erased flash
    Erased,
    /// First word is neither the magic nor erased flash
    BadMagic(u32),
    /// Version that no firmware ever wrote (0)
    UnknownVersion(u32),
    /// Stored checksum disagrees with the recomputed one
    BadChecksum { stored: u32, computed: u32 },
    /// Checksum-valid record from newer firmware
    FutureVersion(u32),
}

/// Classification of one slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SlotContents {
    Empty,
    Corrupt(DecodeError),
    /// Current-format record
    Current(SessionRecord),
    /// Legacy record, upgraded (write index = session id)
    Legacy(SessionRecord),
    /// Written by newer firmware; must not be interpreted
    Future { version: u32 },
}

impl SlotContents {
    /// The record, if this slot holds one the reader understands
    pub fn record(&self) -> Option<SessionRecord> {
        match self {
            SlotContents::Current(record) | SlotContents::Legacy(record) => Some(*record),
            _ => None,
        }
    }
}

fn word(page: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([
        page[offset],
        page[offset + 1],
        page[offset + 2],
        page[offset + 3],
    ])
}

fn put_word(page: &mut [u8], offset: usize, value: u32) {
    page[offset..offset + 4].copy_from_slice(&value.to_le_bytes());
}

fn xor(words: &[u32]) -> u32 {
    words.iter().fold(0, |acc, w| acc ^ w)
}

/// Version 1 layout
struct RecordV1 {
    session_id: u32,
    session_rotation_count: u32,
    session_active_time_s: u32,
    session_start_unix: u32,
    session_end_unix: u32,
    lifetime_rotation_count: u32,
    lifetime_time_s: u32,
    reported: u8,
    checksum: u32,
}

impl RecordV1 {
    fn read(page: &[u8]) -> Self {
        Self {
            session_id: word(page, 8),
            session_rotation_count: word(page, 12),
            session_active_time_s: word(page, 16),
            session_start_unix: word(page, 20),
            session_end_unix: word(page, 24),
            lifetime_rotation_count: word(page, 28),
            lifetime_time_s: word(page, 32),
            reported: page[36],
            checksum: word(page, 40),
        }
    }

    fn words(&self) -> [u32; LEGACY_FIELDS] {
        [
            MAGIC,
            VERSION_LEGACY,
            self.session_id,
            self.session_rotation_count,
            self.session_active_time_s,
            self.session_start_unix,
            self.session_end_unix,
            self.lifetime_rotation_count,
            self.lifetime_time_s,
            self.reported as u32,
        ]
    }

    fn upgrade(self) -> SessionRecord {
        SessionRecord {
            session_id: self.session_id,
            write_index: self.session_id,
            session_rotation_count: self.session_rotation_count,
            session_active_time_s: self.session_active_time_s,
            session_start_unix: self.session_start_unix,
            session_end_unix: self.session_end_unix,
            lifetime_rotation_count: self.lifetime_rotation_count,
            lifetime_time_s: self.lifetime_time_s,
            reported: self.reported != 0,
        }
    }
}

/// Version 2 layout (also used to validate newer versions)
struct RecordV2 {
    version: u32,
    session_id: u32,
    write_index: u32,
    session_rotation_count: u32,
    session_active_time_s: u32,
    session_start_unix: u32,
    session_end_unix: u32,
    lifetime_rotation_count: u32,
    lifetime_time_s: u32,
    reported: u8,
    checksum: u32,
}

impl RecordV2 {
    fn read(page: &[u8]) -> Self {
        Self {
            version: word(page, 4),
            session_id: word(page, 8),
            write_index: word(page, 12),
            session_rotation_count: word(page, 16),
            session_active_time_s: word(page, 20),
            session_start_unix: word(page, 24),
            session_end_unix: word(page, 28),
            lifetime_rotation_count: word(page, 32),
            lifetime_time_s: word(page, 36),
            reported: page[REPORTED_OFFSET],
            checksum: word(page, 44),
        }
    }

    fn from_record(record: &SessionRecord) -> Self {
        let mut raw = Self {
            version: VERSION_CURRENT,
            session_id: record.session_id,
            write_index: record.write_index,
            session_rotation_count: record.session_rotation_count,
            session_active_time_s: record.session_active_time_s,
            session_start_unix: record.session_start_unix,
            session_end_unix: record.session_end_unix,
            lifetime_rotation_count: record.lifetime_rotation_count,
            lifetime_time_s: record.lifetime_time_s,
            reported: record.reported as u8,
            checksum: 0,
        };
        raw.checksum = xor(&raw.words());
        raw
    }

    fn words(&self) -> [u32; CURRENT_FIELDS] {
        [
            MAGIC,
            self.version,
            self.session_id,
            self.write_index,
            self.session_rotation_count,
            self.session_active_time_s,
            self.session_start_unix,
            self.session_end_unix,
            self.lifetime_rotation_count,
            self.lifetime_time_s,
            self.reported as u32,
        ]
    }

    fn write(&self, page: &mut [u8]) {
        // The reported word is the flag byte followed by a zero pad
        for (i, value) in self.words().iter().enumerate() {
            put_word(page, i * 4, *value);
        }
        put_word(page, 44, self.checksum);
    }

    fn into_record(self) -> SessionRecord {
        SessionRecord {
            session_id: self.session_id,
            write_index: self.write_index,
            session_rotation_count: self.session_rotation_count,
            session_active_time_s: self.session_active_time_s,
            session_start_unix: self.session_start_unix,
            session_end_unix: self.session_end_unix,
            lifetime_rotation_count: self.lifetime_rotation_count,
            lifetime_time_s: self.lifetime_time_s,
            reported: self.reported != 0,
        }
    }
}

/// A successfully framed record, before conversion to the canonical type
enum RawRecord {
    V1(RecordV1),
    V2(RecordV2),
}

fn check(stored: u32, computed: u32) -> Result<(), DecodeError> {
    if stored == computed {
        Ok(())
    } else {
        Err(DecodeError::BadChecksum { stored, computed })
    }
}

fn parse(page: &[u8]) -> Result<RawRecord, DecodeError> {
    let magic = word(page, 0);
    if magic == ERASED {
        return Err(DecodeError::Erased);
    }
    if magic != MAGIC {
        return Err(DecodeError::BadMagic(magic));
    }

    match word(page, 4) {
        VERSION_LEGACY => {
            let raw = RecordV1::read(page);
            check(raw.checksum, xor(&raw.words()))?;
            Ok(RawRecord::V1(raw))
        }
        VERSION_CURRENT => {
            let raw = RecordV2::read(page);
            check(raw.checksum, xor(&raw.words()))?;
            Ok(RawRecord::V2(raw))
        }
        version if version > VERSION_CURRENT => {
            let raw = RecordV2::read(page);
            check(raw.checksum, xor(&raw.words()))?;
            Err(DecodeError::FutureVersion(version))
        }
        version => Err(DecodeError::UnknownVersion(version)),
    }
}

/// Classify one slot
pub fn decode_slot(page: &[u8; PAGE_SIZE]) -> SlotContents {
    match parse(page) {
        Ok(RawRecord::V1(raw)) => SlotContents::Legacy(raw.upgrade()),
        Ok(RawRecord::V2(raw)) => SlotContents::Current(raw.into_record()),
        Err(DecodeError::Erased) => SlotContents::Empty,
        Err(DecodeError::FutureVersion(version)) => SlotContents::Future { version },
        Err(e) => SlotContents::Corrupt(e),
    }
}

/// Serialize a record in the current format into a zero-padded page
pub fn encode(record: &SessionRecord) -> [u8; PAGE_SIZE] {
    let mut page = [0u8; PAGE_SIZE];
    RecordV2::from_record(record).write(&mut page);
    page
}

/// Checksummed words of a current-format page, in layout order
pub fn current_words(page: &[u8; PAGE_SIZE]) -> [u32; CURRENT_FIELDS] {
    RecordV2::read(page).words()
}

/// Whole reported word of a current-format page, flag byte and pad
pub fn reported_word(page: &[u8; PAGE_SIZE]) -> u32 {
    word(page, REPORTED_OFFSET)
}

/// Checksum stored in a current-format page
pub fn stored_checksum(page: &[u8; PAGE_SIZE]) -> u32 {
    word(page, CURRENT_SIZE - 4)
}

/// Checksum recomputed from the words of a current-format page
pub fn computed_checksum(page: &[u8; PAGE_SIZE]) -> u32 {
    xor(&current_words(page))
}

/// Serialize a record in the legacy format
#[cfg(test)]
pub(crate) fn encode_legacy(record: &SessionRecord) -> [u8; PAGE_SIZE] {
    let raw = RecordV1 {
        session_id: record.session_id,
        session_rotation_count: record.session_rotation_count,
        session_active_time_s: record.session_active_time_s,
        session_start_unix: record.session_start_unix,
        session_end_unix: record.session_end_unix,
        lifetime_rotation_count: record.lifetime_rotation_count,
        lifetime_time_s: record.lifetime_time_s,
        reported: record.reported as u8,
        checksum: 0,
    };
    let checksum = xor(&raw.words());

    let mut page = [0u8; PAGE_SIZE];
    for (i, value) in raw.words().iter().enumerate() {
        put_word(&mut page, i * 4, *value);
    }
    put_word(&mut page, 40, checksum);
    page
}
