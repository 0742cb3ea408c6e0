//! Embassy async tasks
//!
//! Each task runs independently and communicates via channels/signals.

pub mod rotation;
pub mod session;
pub mod voltage;

#[cfg(feature = "polled-sensor")]
pub use rotation::rotation_poll_task;
#[cfg(not(feature = "polled-sensor"))]
pub use rotation::rotation_irq_task;
pub use session::{session_task, Engine};
pub use voltage::voltage_task;

use embassy_time::Instant;

/// Milliseconds since boot, wrapping after ~49 days
pub fn uptime_ms() -> u32 {
    Instant::now().as_millis() as u32
}
