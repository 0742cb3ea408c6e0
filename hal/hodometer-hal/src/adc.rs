//! ADC abstractions

/// Errors from an ADC conversion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AdcError {
    /// Conversion did not complete
    Conversion,
    /// Channel could not be claimed (shared pin busy)
    ChannelBusy,
}

/// Single-channel ADC
pub trait AdcReader {
    /// Read a raw 12-bit sample (0-4095)
    fn read_raw(&mut self) -> Result<u16, AdcError>;
}
