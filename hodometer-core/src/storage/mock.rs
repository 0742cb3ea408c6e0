//! RAM-backed flash and interrupt mask for host tests

extern crate std;

use core::cell::Cell;
use std::rc::Rc;

use hodometer_hal::{FlashError, InterruptControl, SectorFlash, PAGE_SIZE};

pub const MOCK_SECTORS: usize = 64;

/// Interrupt mask shared with the flash so it can tell when it is held
pub struct MockIrq {
    masked: Rc<Cell<bool>>,
}

impl InterruptControl for MockIrq {
    type State = bool;

    fn disable(&mut self) -> bool {
        self.masked.replace(true)
    }

    fn restore(&mut self, state: bool) {
        self.masked.set(state);
    }
}

/// NOR-style flash: erase sets 0xFF, program can only clear bits
pub struct MockFlash {
    pub sectors: [[u8; PAGE_SIZE]; MOCK_SECTORS],
    pub erases: u32,
    pub programs: u32,
    /// Erase or program issued while interrupts were enabled
    pub unmasked_writes: u32,
    /// Upcoming programs that land with one bit flipped
    pub corrupt_next_programs: u32,
    /// Byte offset the injected bit flip hits
    pub corrupt_offset: usize,
    /// Upcoming erases that report failure
    pub fail_next_erases: u32,
    masked: Rc<Cell<bool>>,
}

impl MockFlash {
    pub fn is_erased(&self, sector: usize) -> bool {
        self.sectors[sector].iter().all(|&b| b == 0xFF)
    }

    fn check_mask(&mut self) {
        if !self.masked.get() {
            self.unmasked_writes += 1;
        }
    }

    fn sector(&self, sector: u32) -> Result<usize, FlashError> {
        let index = sector as usize;
        if index < MOCK_SECTORS {
            Ok(index)
        } else {
            Err(FlashError::OutOfBounds)
        }
    }
}

impl SectorFlash for MockFlash {
    fn sector_count(&self) -> u32 {
        MOCK_SECTORS as u32
    }

    fn erase_sector(&mut self, sector: u32) -> Result<(), FlashError> {
        let index = self.sector(sector)?;
        self.check_mask();
        if self.fail_next_erases > 0 {
            self.fail_next_erases -= 1;
            return Err(FlashError::Erase);
        }
        self.erases += 1;
        self.sectors[index] = [0xFF; PAGE_SIZE];
        Ok(())
    }

    fn program_page(&mut self, sector: u32, page: &[u8; PAGE_SIZE]) -> Result<(), FlashError> {
        let index = self.sector(sector)?;
        self.check_mask();
        self.programs += 1;
        for (cell, byte) in self.sectors[index].iter_mut().zip(page.iter()) {
            *cell &= *byte;
        }
        if self.corrupt_next_programs > 0 {
            self.corrupt_next_programs -= 1;
            self.sectors[index][self.corrupt_offset] ^= 0x04;
        }
        Ok(())
    }

    fn read_page(&mut self, sector: u32, page: &mut [u8; PAGE_SIZE]) -> Result<(), FlashError> {
        let index = self.sector(sector)?;
        page.copy_from_slice(&self.sectors[index]);
        Ok(())
    }
}

/// Erased flash plus its interrupt mask
pub fn mock_pair() -> (MockFlash, MockIrq) {
    let masked = Rc::new(Cell::new(false));
    let flash = MockFlash {
        sectors: [[0xFF; PAGE_SIZE]; MOCK_SECTORS],
        erases: 0,
        programs: 0,
        unmasked_writes: 0,
        corrupt_next_programs: 0,
        corrupt_offset: 16,
        fail_next_erases: 0,
        masked: masked.clone(),
    };
    (flash, MockIrq { masked })
}
