//! Sensor drivers

pub mod hall;
pub mod vsys;

pub use hall::PolledHallSensor;
pub use vsys::{VsysMonitor, VSYS_FULL_SCALE_MV};
