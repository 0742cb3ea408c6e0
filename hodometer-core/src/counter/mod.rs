//! Rotation counting and derived statistics
//!
//! - [`RotationCounter`]: lock-free handoff from the edge interrupt
//! - [`EdgeDetector`]: polled alternative to the interrupt
//! - [`ActiveTimeTracker`]: seconds of actual use
//! - [`SpeedWindow`]: short rolling speed estimate

pub mod active;
pub mod edge;
pub mod rotation;
pub mod speed;

pub use active::ActiveTimeTracker;
pub use edge::EdgeDetector;
pub use rotation::RotationCounter;
pub use speed::{SpeedWindow, SPEED_WINDOW_SAMPLES};
