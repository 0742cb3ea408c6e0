//! Rolling speed estimate
//!
//! Sampled once a second with the session rotation count. The speed is
//! the rotation delta between the oldest and newest sample over their
//! time delta, so it settles within a few seconds of a change in pace.

use heapless::Deque;

/// Samples kept in the window
pub const SPEED_WINDOW_SAMPLES: usize = 5;

const MS_PER_HOUR: f32 = 3_600_000.0;

#[derive(Debug, Clone, Copy)]
struct Sample {
    rotations: u32,
    at_ms: u32,
}

/// Five-sample rotation-rate window
#[derive(Debug, Clone, Default)]
pub struct SpeedWindow {
    samples: Deque<Sample, SPEED_WINDOW_SAMPLES>,
}

impl SpeedWindow {
    /// Create a new empty window
    pub fn new() -> Self {
        Self {
            samples: Deque::new(),
        }
    }

    /// Add a sample, dropping the oldest once full
    pub fn sample(&mut self, session_rotations: u32, now_ms: u32) {
        if self.samples.is_full() {
            self.samples.pop_front();
        }
        // Room was made above
        let _ = self.samples.push_back(Sample {
            rotations: session_rotations,
            at_ms: now_ms,
        });
    }

    /// Rotations per hour across the window; 0 until two samples exist
    pub fn rotations_per_hour(&self) -> f32 {
        let (Some(oldest), Some(newest)) = (self.samples.front(), self.samples.back()) else {
            return 0.0;
        };

        let elapsed_ms = newest.at_ms.wrapping_sub(oldest.at_ms);
        if self.samples.len() < 2 || elapsed_ms == 0 {
            return 0.0;
        }

        let rotations = newest.rotations.saturating_sub(oldest.rotations);
        rotations as f32 * MS_PER_HOUR / elapsed_ms as f32
    }

    /// Forget all samples (new session)
    pub fn reset(&mut self) {
        self.samples.clear();
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}
