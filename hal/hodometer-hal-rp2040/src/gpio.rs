//! Hall sensor input
//!
//! The sensor is open-drain and active-low, so the pin gets the internal
//! pull-up and a magnet pass shows up as a falling edge.

use embassy_rp::gpio::{Input, Pin, Pull};
use embassy_rp::Peri;

use hodometer_hal::InputPin;

/// Hall sensor line
pub struct HallInput<'d> {
    input: Input<'d>,
}

impl<'d> HallInput<'d> {
    /// Create a new sensor input with the pull-up enabled
    pub fn new(pin: Peri<'d, impl Pin>) -> Self {
        Self {
            input: Input::new(pin, Pull::Up),
        }
    }

    /// Wait for the next magnet pass
    pub async fn wait_for_rotation(&mut self) {
        self.input.wait_for_falling_edge().await;
    }
}

impl InputPin for HallInput<'_> {
    fn is_high(&self) -> bool {
        self.input.is_high()
    }
}
