//! Polled edge detection
//!
//! Sampling the sensor line every few tens of milliseconds is enough for a
//! wheel: at 8 mph a 34.56 cm wheel turns about 10 times a second.

/// Counts high→low transitions of a sampled digital line
///
/// The hall sensor is active-low with a pull-up, so the falling edge marks
/// the magnet arriving.
#[derive(Debug, Clone, Copy, Default)]
pub struct EdgeDetector {
    last_high: Option<bool>,
}

impl EdgeDetector {
    /// Create a new detector; the first sample only sets the baseline
    pub const fn new() -> Self {
        Self { last_high: None }
    }

    /// Feed one sample, returning true on a falling edge
    pub fn update(&mut self, high: bool) -> bool {
        let falling = self.last_high == Some(true) && !high;
        self.last_high = Some(high);
        falling
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_sample_is_baseline() {
        let mut edge = EdgeDetector::new();
        assert!(!edge.update(false));
    }

    #[test]
    fn test_counts_falling_edges_only() {
        let mut edge = EdgeDetector::new();
        let samples = [true, true, false, false, true, false, true, true];
        let edges = samples.iter().filter(|&&s| edge.update(s)).count();
        assert_eq!(edges, 2);
    }
}
