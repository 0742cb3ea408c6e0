//! RP2040-specific HAL for the odometer firmware
//!
//! Implements the shared `hodometer-hal` traits on embassy-rp:
//!
//! - Raw sector flash in the top 256 KiB (implements `SectorFlash`)
//! - Global interrupt masking through `critical-section`
//! - Hall sensor input with falling-edge wait
//! - VSYS ADC channel

#![no_std]

pub mod adc;
pub mod flash;
pub mod gpio;
pub mod irq;

pub use adc::VsysAdc;
pub use flash::Rp2040SectorFlash;
pub use gpio::HallInput;
pub use irq::Rp2040Interrupts;
