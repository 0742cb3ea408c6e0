//! Board-agnostic core logic for the rotation odometer
//!
//! This crate contains everything that does not touch hardware registers:
//!
//! - On-flash record format (versioned, checksummed)
//! - Record store with wear-leveled slots and write verification
//! - Rotation counting and active-time accounting
//! - Rolling speed window
//! - Session lifecycle engine
//! - Configuration type definitions and text parser
//!
//! ```text
//!  sensor edges ──► RotationCounter ──► SessionEngine ──► RecordStore ──► SectorFlash
//!                                          │    ▲
//!                     ActiveTimeTracker ◄──┘    └── boot scan
//! ```

#![no_std]
#![deny(unsafe_code)]

// Must come first so the logging macros are visible to every module
#[macro_use]
mod fmt;

pub mod config;
pub mod counter;
pub mod record;
pub mod session;
pub mod storage;
