//! Hodometer Companion Protocol
//!
//! This crate defines the byte layouts exchanged with the companion app over
//! a characteristic-based transport (BLE GATT on the reference board). The
//! transport itself only moves opaque characteristic values; this crate
//! turns those values into typed commands and typed reports.
//!
//! # Characteristics
//!
//! ```text
//! ┌──────┬──────────────────┬───────┬────────────────────────────────┐
//! │ ID   │ Name             │ Dir   │ Body                           │
//! ├──────┼──────────────────┼───────┼────────────────────────────────┤
//! │ 0xF1 │ Live report      │ read  │ 37 B, see LiveReport           │
//! │ 0xF2 │ Unreported list  │ read  │ N × 20 B, see SessionSummary   │
//! │ 0xF3 │ Mark reported    │ write │ u32 session id                 │
//! │ 0xF4 │ Time sync        │ write │ u32 unix [+ i32 tz offset]     │
//! │ 0xF5 │ Units            │ write │ u8 metric flag                 │
//! │ 0xF7 │ Lifetime totals  │ write │ f32 hours + f32 distance       │
//! └──────┴──────────────────┴───────┴────────────────────────────────┘
//! ```
//!
//! All multi-byte values are little-endian.

#![no_std]
#![deny(unsafe_code)]

pub mod characteristic;
pub mod commands;
pub mod telemetry;

pub use characteristic::Characteristic;
pub use commands::{Command, CommandError};
pub use telemetry::{
    LiveReport, SessionList, SessionSummary, LIVE_REPORT_SIZE, MAX_LISTED_SESSIONS,
    SESSION_SUMMARY_SIZE,
};
