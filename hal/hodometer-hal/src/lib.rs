//! Hodometer Hardware Abstraction Layer
//!
//! This crate defines hardware abstraction traits that can be implemented
//! by chip-specific HALs. The session ledger in `hodometer-core` only ever
//! talks to flash, interrupts and sensors through these traits, which is
//! what lets it run unchanged against a RAM-backed flash in host tests.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  Application (hodometer-firmware)       │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  hodometer-core / hodometer-drivers     │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  hodometer-hal (this crate - traits)    │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//!             ┌───────────────┐
//!             │ hodometer-hal-│
//!             │    rp2040     │
//!             └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`flash::SectorFlash`] - Raw erase/program/read of fixed-size sectors
//! - [`irq::InterruptControl`] - Masking interrupts around flash programming
//! - [`gpio::InputPin`] - Digital input
//! - [`adc::AdcReader`] - Raw analog samples

#![no_std]
#![deny(unsafe_code)]

pub mod adc;
pub mod flash;
pub mod gpio;
pub mod irq;

// Re-export key traits at crate root for convenience
pub use adc::{AdcError, AdcReader};
pub use flash::{FlashError, SectorFlash, PAGE_SIZE, SECTOR_SIZE};
pub use gpio::InputPin;
pub use irq::InterruptControl;
