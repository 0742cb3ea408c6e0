//! VSYS supply voltage monitor
//!
//! VSYS reaches the ADC through a 3:1 divider, so full scale on the 12-bit
//! converter (3.3 V reference) is 9.9 V.
//!
//! ```text
//! VSYS ──┬── R ──┬── 2R ── GND
//!        │       │
//!               ADC
//! ```
//!
//! The ADC pin is shared with other functions on some boards and the odd
//! conversion comes back near zero. Readings under the glitch floor are
//! replaced with the last good one.

use hodometer_hal::{AdcError, AdcReader};

/// Millivolts at ADC full scale (3.3 V reference times the divider ratio)
pub const VSYS_FULL_SCALE_MV: u32 = 9_900;

const ADC_MAX: u32 = 4_095;

/// Supply voltage monitor with glitch rejection
pub struct VsysMonitor<A: AdcReader> {
    adc: A,
    glitch_floor_mv: u32,
    last_valid_mv: Option<u32>,
}

impl<A: AdcReader> VsysMonitor<A> {
    /// Create a new monitor
    ///
    /// Readings below `glitch_floor_mv` are treated as glitches.
    pub fn new(adc: A, glitch_floor_mv: u32) -> Self {
        Self {
            adc,
            glitch_floor_mv,
            last_valid_mv: None,
        }
    }

    /// Convert a raw 12-bit sample to VSYS millivolts
    pub fn raw_to_mv(raw: u16) -> u32 {
        u32::from(raw) * VSYS_FULL_SCALE_MV / ADC_MAX
    }

    /// Read VSYS in millivolts
    ///
    /// A glitch returns the last valid reading, or the glitched value
    /// itself if there has not been a valid one yet.
    pub fn read_mv(&mut self) -> Result<u32, AdcError> {
        let raw = self.adc.read_raw()?;
        let mv = Self::raw_to_mv(raw);

        if mv >= self.glitch_floor_mv {
            self.last_valid_mv = Some(mv);
            return Ok(mv);
        }

        match self.last_valid_mv {
            Some(last) => {
                #[cfg(feature = "defmt")]
                defmt::warn!(
                    "VSYS glitch: {} mV (raw {}), using last valid {} mV",
                    mv,
                    raw,
                    last
                );
                Ok(last)
            }
            None => Ok(mv),
        }
    }

    /// Last reading at or above the glitch floor
    pub fn last_valid_mv(&self) -> Option<u32> {
        self.last_valid_mv
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    /// ADC that returns queued samples in order
    struct ScriptedAdc<'a> {
        samples: &'a [Result<u16, AdcError>],
        next: usize,
    }

    impl<'a> ScriptedAdc<'a> {
        fn new(samples: &'a [Result<u16, AdcError>]) -> Self {
            Self { samples, next: 0 }
        }
    }

    impl AdcReader for ScriptedAdc<'_> {
        fn read_raw(&mut self) -> Result<u16, AdcError> {
            let sample = self
                .samples
                .get(self.next)
                .copied()
                .unwrap_or(Err(AdcError::Conversion));
            self.next += 1;
            sample
        }
    }

    #[test]
    fn test_conversion() {
        assert_eq!(VsysMonitor::<ScriptedAdc>::raw_to_mv(0), 0);
        assert_eq!(VsysMonitor::<ScriptedAdc>::raw_to_mv(4095), 9_900);
        // 5 V USB supply reads ~2068
        assert_eq!(VsysMonitor::<ScriptedAdc>::raw_to_mv(2068), 4_999);
    }

    #[test]
    fn test_glitch_uses_last_valid() {
        let samples = [Ok(1_700), Ok(100), Ok(1_650)];
        let mut vsys = VsysMonitor::new(ScriptedAdc::new(&samples), 1_500);

        assert_eq!(vsys.read_mv(), Ok(4_109));
        assert_eq!(vsys.read_mv(), Ok(4_109));
        assert_eq!(vsys.read_mv(), Ok(3_989));
        assert_eq!(vsys.last_valid_mv(), Some(3_989));
    }

    #[test]
    fn test_glitch_before_any_valid_reading() {
        let samples = [Ok(200)];
        let mut vsys = VsysMonitor::new(ScriptedAdc::new(&samples), 1_500);
        assert_eq!(vsys.read_mv(), Ok(483));
        assert_eq!(vsys.last_valid_mv(), None);
    }

    #[test]
    fn test_adc_error_propagates() {
        let samples = [Ok(1_700), Err(AdcError::ChannelBusy)];
        let mut vsys = VsysMonitor::new(ScriptedAdc::new(&samples), 1_500);
        vsys.read_mv().unwrap();
        assert_eq!(vsys.read_mv(), Err(AdcError::ChannelBusy));
        assert_eq!(vsys.last_valid_mv(), Some(4_109));
    }

    proptest! {
        #[test]
        fn test_conversion_is_monotonic(a in 0u16..=4095, b in 0u16..=4095) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            let lo_mv = VsysMonitor::<ScriptedAdc>::raw_to_mv(lo);
            let hi_mv = VsysMonitor::<ScriptedAdc>::raw_to_mv(hi);
            prop_assert!(lo_mv <= hi_mv);
            prop_assert!(hi_mv <= VSYS_FULL_SCALE_MV);
        }
    }
}
