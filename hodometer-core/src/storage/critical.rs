//! Scoped interrupt masking

use hodometer_hal::InterruptControl;

/// Interrupts stay masked while this guard is alive
///
/// The previous mask state is restored on drop, so early returns through
/// `?` cannot leave interrupts disabled.
pub struct CriticalSection<'a, I: InterruptControl> {
    irq: &'a mut I,
    saved: I::State,
}

impl<'a, I: InterruptControl> CriticalSection<'a, I> {
    /// Mask interrupts until the returned guard is dropped
    pub fn enter(irq: &'a mut I) -> Self {
        let saved = irq.disable();
        Self { irq, saved }
    }
}

impl<I: InterruptControl> Drop for CriticalSection<'_, I> {
    fn drop(&mut self) {
        self.irq.restore(self.saved);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct MockIrq {
        enabled: bool,
        disables: u32,
    }

    impl InterruptControl for MockIrq {
        type State = bool;

        fn disable(&mut self) -> bool {
            self.disables += 1;
            core::mem::replace(&mut self.enabled, false)
        }

        fn restore(&mut self, state: bool) {
            self.enabled = state;
        }
    }

    #[test]
    fn test_restores_on_drop() {
        let mut irq = MockIrq {
            enabled: true,
            disables: 0,
        };
        {
            let _cs = CriticalSection::enter(&mut irq);
        }
        assert!(irq.enabled);
        assert_eq!(irq.disables, 1);
    }

    #[test]
    fn test_nested_keeps_outer_state() {
        let mut irq = MockIrq {
            enabled: false,
            disables: 0,
        };
        {
            let _cs = CriticalSection::enter(&mut irq);
        }
        // Already masked before entering, so still masked after
        assert!(!irq.enabled);
    }

    fn failing_erase() -> Result<(), hodometer_hal::FlashError> {
        Err(hodometer_hal::FlashError::Erase)
    }

    fn fails_inside(irq: &mut MockIrq) -> Result<(), hodometer_hal::FlashError> {
        let _cs = CriticalSection::enter(irq);
        failing_erase()?;
        Ok(())
    }

    #[test]
    fn test_restores_on_early_return() {
        let mut irq = MockIrq {
            enabled: true,
            disables: 0,
        };
        assert!(fails_inside(&mut irq).is_err());
        assert!(irq.enabled);
    }
}
