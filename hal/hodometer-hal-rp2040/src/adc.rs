//! VSYS measurement
//!
//! On the Pico, VSYS/3 is wired to GPIO29 (ADC3). On the Pico W the same
//! pin doubles as the wireless SPI clock, which is where the occasional
//! near-zero conversion comes from.

use embassy_rp::adc::{Adc, Blocking, Channel, Config};
use embassy_rp::gpio::Pull;
use embassy_rp::peripherals::{ADC, PIN_29};
use embassy_rp::Peri;

use hodometer_hal::{AdcError, AdcReader};

/// GPIO carrying VSYS/3
pub const VSYS_GPIO: u8 = 29;

/// ADC channel on the VSYS divider
pub struct VsysAdc<'d> {
    adc: Adc<'d, Blocking>,
    channel: Channel<'d>,
}

impl<'d> VsysAdc<'d> {
    /// Create a new VSYS reader on ADC3
    pub fn new(adc: Peri<'d, ADC>, pin: Peri<'d, PIN_29>) -> Self {
        Self {
            adc: Adc::new_blocking(adc, Config::default()),
            channel: Channel::new_pin(pin, Pull::None),
        }
    }
}

impl AdcReader for VsysAdc<'_> {
    fn read_raw(&mut self) -> Result<u16, AdcError> {
        self.adc
            .blocking_read(&mut self.channel)
            .map_err(|_| AdcError::Conversion)
    }
}
