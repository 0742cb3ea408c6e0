//! Interrupt masking
//!
//! On chips that execute from the same flash they program (XIP), nothing
//! may run from flash while an erase or program is in progress. The
//! storage layer suppresses interrupts for exactly that window.

/// Global interrupt control
///
/// `disable` returns whatever state is needed to put the interrupt mask
/// back the way it was, so nested use is safe.
pub trait InterruptControl {
    /// Saved interrupt state
    type State: Copy;

    /// Disable interrupts, returning the previous state
    fn disable(&mut self) -> Self::State;

    /// Restore interrupts to a previously saved state
    fn restore(&mut self, state: Self::State);
}
