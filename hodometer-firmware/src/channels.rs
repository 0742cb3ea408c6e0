//! Inter-task communication channels
//!
//! The session task is the only owner of the record store. Everything
//! else talks to it through the statics here.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use embassy_sync::signal::Signal;

use hodometer_core::counter::RotationCounter;
use hodometer_protocol::{Command, LiveReport, SessionList};

/// Channel capacity for session requests
const SESSION_REQUEST_CHANNEL_SIZE: usize = 8;

/// Requests for the session task
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SessionRequest {
    /// Decoded characteristic write from the companion app
    Command(Command),
    /// Republish the unreported-session list
    ListSessions,
}

/// Rotations recorded by the sensor task, drained every session tick
pub static ROTATIONS: RotationCounter = RotationCounter::new();

/// Requests from the transport (commands, list refreshes)
pub static SESSION_REQUESTS: Channel<
    CriticalSectionRawMutex,
    SessionRequest,
    SESSION_REQUEST_CHANNEL_SIZE,
> = Channel::new();

/// Latest VSYS reading in mV (updated by voltage task)
pub static VOLTAGE_READING: Signal<CriticalSectionRawMutex, u32> = Signal::new();

/// Live counters, republished once a second (read by the transport)
pub static LIVE_REPORT: Signal<CriticalSectionRawMutex, LiveReport> = Signal::new();

/// Unreported sessions, published after each `ListSessions` request
pub static SESSION_LIST: Signal<CriticalSectionRawMutex, SessionList> = Signal::new();
