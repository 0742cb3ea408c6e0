//! Configuration
//!
//! All tunables grouped by concern, with defaults matching the reference
//! hardware (34.56 cm wheel, RP2040 with 64 storage sectors, VSYS
//! measured through a 3:1 divider).

pub mod parse;
pub mod types;
pub mod units;

pub use parse::{parse_config, ParseError};
pub use types::*;
pub use units::DistanceUnit;
