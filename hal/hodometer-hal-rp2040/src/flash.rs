//! Sector flash driver for RP2040
//!
//! The record store owns the last 64 erase sectors of the 2 MiB chip. The
//! linker script keeps program code below [`STORAGE_START`].
//!
//! ```text
//! 0x000000                                  0x1C0000           0x200000
//! ├──────────── firmware (1792 KiB) ────────┼── records (256 KiB) ──┤
//!                                            sector 0 ... sector 63
//! ```

use embassy_rp::flash::{Blocking, Flash, ERASE_SIZE};
use embassy_rp::peripherals::FLASH;
use embassy_rp::Peri;

use hodometer_hal::{FlashError, SectorFlash, PAGE_SIZE, SECTOR_SIZE};

/// Flash size on the Pico
pub const FLASH_SIZE: usize = 2 * 1024 * 1024;

/// Sectors reserved for session records
pub const STORAGE_SECTORS: u32 = 64;

/// Offset of sector 0 from the start of flash
pub const STORAGE_START: u32 = (FLASH_SIZE - STORAGE_SECTORS as usize * SECTOR_SIZE) as u32;

const _: () = assert!(SECTOR_SIZE == ERASE_SIZE);

/// RP2040 implementation of [`SectorFlash`]
///
/// Uses the blocking driver: reads come straight from the XIP window and
/// erase/program run from RAM.
pub struct Rp2040SectorFlash<'d> {
    flash: Flash<'d, FLASH, Blocking, FLASH_SIZE>,
}

impl<'d> Rp2040SectorFlash<'d> {
    /// Create a new sector flash over the FLASH peripheral
    pub fn new(flash: Peri<'d, FLASH>) -> Self {
        Self {
            flash: Flash::new_blocking(flash),
        }
    }

    fn offset(&self, sector: u32) -> Result<u32, FlashError> {
        if sector < STORAGE_SECTORS {
            Ok(STORAGE_START + sector * SECTOR_SIZE as u32)
        } else {
            Err(FlashError::OutOfBounds)
        }
    }
}

impl SectorFlash for Rp2040SectorFlash<'_> {
    fn sector_count(&self) -> u32 {
        STORAGE_SECTORS
    }

    fn erase_sector(&mut self, sector: u32) -> Result<(), FlashError> {
        let start = self.offset(sector)?;
        self.flash
            .blocking_erase(start, start + SECTOR_SIZE as u32)
            .map_err(|_| FlashError::Erase)
    }

    fn program_page(&mut self, sector: u32, page: &[u8; PAGE_SIZE]) -> Result<(), FlashError> {
        let start = self.offset(sector)?;
        self.flash
            .blocking_write(start, page)
            .map_err(|_| FlashError::Program)
    }

    fn read_page(&mut self, sector: u32, page: &mut [u8; PAGE_SIZE]) -> Result<(), FlashError> {
        let start = self.offset(sector)?;
        self.flash
            .blocking_read(start, page)
            .map_err(|_| FlashError::Read)
    }
}
