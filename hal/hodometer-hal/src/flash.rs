//! Flash storage abstractions
//!
//! Provides a trait for raw sector flash: the storage region is divided
//! into `sector_count()` erasable sectors, each of which is written as a
//! single program page. There is no filesystem and no key-value layer;
//! framing, integrity and wear leveling belong to the caller.

/// Flash program page size in bytes
///
/// One record is always programmed as exactly one page.
pub const PAGE_SIZE: usize = 256;

/// Flash erase sector size in bytes
pub const SECTOR_SIZE: usize = 4096;

/// Errors from flash operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FlashError {
    /// Sector erase failed
    Erase,
    /// Page program failed
    Program,
    /// Read-back failed
    Read,
    /// Sector index outside the storage region
    OutOfBounds,
}

/// Sector-addressed flash
///
/// Implementations map sector indices onto a reserved region at the end of
/// the chip's flash. Erase and program are only ever called with
/// interrupts suppressed; `read_page` may be called at any time and should
/// read the memory-mapped contents directly where the chip allows it.
pub trait SectorFlash {
    /// Number of sectors in the storage region
    fn sector_count(&self) -> u32;

    /// Erase one sector (all bytes become `0xFF`)
    fn erase_sector(&mut self, sector: u32) -> Result<(), FlashError>;

    /// Program the first page of an erased sector
    fn program_page(&mut self, sector: u32, page: &[u8; PAGE_SIZE]) -> Result<(), FlashError>;

    /// Read the first page of a sector
    fn read_page(&mut self, sector: u32, page: &mut [u8; PAGE_SIZE]) -> Result<(), FlashError>;
}
