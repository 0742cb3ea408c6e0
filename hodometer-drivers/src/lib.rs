//! Hardware driver implementations
//!
//! Concrete sensors built on the `hodometer-hal` traits:
//!
//! - Polled hall-effect rotation sensor
//! - VSYS supply voltage monitor

#![no_std]
#![deny(unsafe_code)]

pub mod sensor;
