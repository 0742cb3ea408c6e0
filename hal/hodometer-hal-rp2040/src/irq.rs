//! Interrupt masking for flash programming
//!
//! The embassy-rp critical-section implementation masks interrupts on the
//! calling core and takes the inter-core spinlock, so the XIP window is
//! quiet on both cores while a sector is erased or programmed.

use critical_section::RestoreState;
use hodometer_hal::InterruptControl;

/// Global interrupt mask via `critical-section`
#[derive(Debug, Default)]
pub struct Rp2040Interrupts;

impl Rp2040Interrupts {
    /// Create a new interrupt controller handle
    pub fn new() -> Self {
        Self
    }
}

impl InterruptControl for Rp2040Interrupts {
    type State = RestoreState;

    fn disable(&mut self) -> RestoreState {
        // SAFETY: every acquire is paired with exactly one release by the
        // store's CriticalSection guard, in reverse order.
        unsafe { critical_section::acquire() }
    }

    fn restore(&mut self, state: RestoreState) {
        // SAFETY: `state` came from the matching `disable` above.
        unsafe { critical_section::release(state) }
    }
}
