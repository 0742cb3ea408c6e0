//! Polled hall-effect rotation sensor
//!
//! Fallback for boards where the sensor line cannot raise an edge
//! interrupt. The pin is sampled on a fixed interval and every falling
//! edge is pushed into the same [`RotationCounter`] the interrupt path
//! uses, so the session loop does not care which one is wired up.

use hodometer_core::counter::{EdgeDetector, RotationCounter};
use hodometer_hal::InputPin;

/// Active-low hall sensor read by polling
pub struct PolledHallSensor<P: InputPin> {
    pin: P,
    edges: EdgeDetector,
}

impl<P: InputPin> PolledHallSensor<P> {
    /// Create a new sensor; the first poll only records the line level
    pub fn new(pin: P) -> Self {
        Self {
            pin,
            edges: EdgeDetector::new(),
        }
    }

    /// Sample the line once, recording a rotation on a falling edge
    pub fn poll(&mut self, counter: &RotationCounter) -> bool {
        let rotated = self.edges.update(self.pin.is_high());
        if rotated {
            counter.record_edge();
        }
        rotated
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::cell::Cell;

    /// Pin that plays back a fixed sequence of levels, then stays high
    struct ScriptedPin<'a> {
        levels: &'a [bool],
        next: Cell<usize>,
    }

    impl<'a> ScriptedPin<'a> {
        fn new(levels: &'a [bool]) -> Self {
            Self {
                levels,
                next: Cell::new(0),
            }
        }
    }

    impl InputPin for ScriptedPin<'_> {
        fn is_high(&self) -> bool {
            let i = self.next.get();
            self.next.set(i + 1);
            self.levels.get(i).copied().unwrap_or(true)
        }
    }

    #[test]
    fn test_counts_magnet_passes() {
        let levels = [true, false, false, true, true, false, true, false];
        let mut sensor = PolledHallSensor::new(ScriptedPin::new(&levels));
        let counter = RotationCounter::new();

        for _ in 0..levels.len() {
            sensor.poll(&counter);
        }
        assert_eq!(counter.take(), 3);
    }

    #[test]
    fn test_low_at_boot_is_not_a_rotation() {
        let levels = [false, false, true];
        let mut sensor = PolledHallSensor::new(ScriptedPin::new(&levels));
        let counter = RotationCounter::new();

        assert!(!sensor.poll(&counter));
        assert!(!sensor.poll(&counter));
        assert!(!sensor.poll(&counter));
        assert_eq!(counter.peek(), 0);
    }

    #[test]
    fn test_counts_accumulate_until_taken() {
        let levels = [true, false, true, false, true, false];
        let mut sensor = PolledHallSensor::new(ScriptedPin::new(&levels));
        let counter = RotationCounter::new();

        for _ in 0..4 {
            sensor.poll(&counter);
        }
        assert_eq!(counter.take(), 2);
        for _ in 0..2 {
            sensor.poll(&counter);
        }
        assert_eq!(counter.take(), 1);
    }
}
