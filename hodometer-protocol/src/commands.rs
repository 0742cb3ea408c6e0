//! Commands written by the companion app
//!
//! Each writable characteristic carries one fixed-size body. Bodies of the
//! wrong length are rejected rather than padded or truncated.

use heapless::Vec;

use crate::characteristic::Characteristic;

/// Largest command body in bytes
pub const MAX_COMMAND_SIZE: usize = 8;

/// Errors from decoding a characteristic write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CommandError {
    /// Body length does not match any accepted layout
    InvalidLength {
        characteristic: Characteristic,
        len: usize,
    },
    /// Characteristic is read-only
    NotWritable,
}

/// A decoded companion-app command
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Command {
    /// The app has consumed this session
    MarkReported { session_id: u32 },
    /// Current UTC time, optionally with the phone's timezone offset
    SyncTime {
        unix: u32,
        tz_offset_s: Option<i32>,
    },
    /// Display units; `true` = kilometres
    SetUnits { metric: bool },
    /// Overwrite lifetime totals (device migration)
    ///
    /// `distance` is in the unit currently selected on the device.
    SetLifetimeTotals { hours: f32, distance: f32 },
}

fn read_u32(bytes: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
}

impl Command {
    /// Decode a write to `characteristic`
    pub fn decode(characteristic: Characteristic, body: &[u8]) -> Result<Self, CommandError> {
        let invalid = CommandError::InvalidLength {
            characteristic,
            len: body.len(),
        };

        match characteristic {
            Characteristic::MarkReported => match body.len() {
                4 => Ok(Command::MarkReported {
                    session_id: read_u32(body, 0),
                }),
                _ => Err(invalid),
            },
            Characteristic::TimeSync => match body.len() {
                // Older apps send the timestamp only (UTC assumed)
                4 => Ok(Command::SyncTime {
                    unix: read_u32(body, 0),
                    tz_offset_s: None,
                }),
                8 => Ok(Command::SyncTime {
                    unix: read_u32(body, 0),
                    tz_offset_s: Some(read_u32(body, 4) as i32),
                }),
                _ => Err(invalid),
            },
            Characteristic::Units => match body.len() {
                1 => Ok(Command::SetUnits {
                    metric: body[0] != 0,
                }),
                _ => Err(invalid),
            },
            Characteristic::LifetimeTotals => match body.len() {
                8 => Ok(Command::SetLifetimeTotals {
                    hours: f32::from_bits(read_u32(body, 0)),
                    distance: f32::from_bits(read_u32(body, 4)),
                }),
                _ => Err(invalid),
            },
            Characteristic::LiveReport | Characteristic::UnreportedSessions => {
                Err(CommandError::NotWritable)
            }
        }
    }

    /// Characteristic this command is written to
    pub fn characteristic(&self) -> Characteristic {
        match self {
            Command::MarkReported { .. } => Characteristic::MarkReported,
            Command::SyncTime { .. } => Characteristic::TimeSync,
            Command::SetUnits { .. } => Characteristic::Units,
            Command::SetLifetimeTotals { .. } => Characteristic::LifetimeTotals,
        }
    }

    /// Encode this command's body (for testing or simulation)
    pub fn encode(&self) -> Vec<u8, MAX_COMMAND_SIZE> {
        let mut body = Vec::new();
        // Capacity covers the largest body, so these cannot fail
        match *self {
            Command::MarkReported { session_id } => {
                let _ = body.extend_from_slice(&session_id.to_le_bytes());
            }
            Command::SyncTime { unix, tz_offset_s } => {
                let _ = body.extend_from_slice(&unix.to_le_bytes());
                if let Some(offset) = tz_offset_s {
                    let _ = body.extend_from_slice(&offset.to_le_bytes());
                }
            }
            Command::SetUnits { metric } => {
                let _ = body.push(metric as u8);
            }
            Command::SetLifetimeTotals { hours, distance } => {
                let _ = body.extend_from_slice(&hours.to_bits().to_le_bytes());
                let _ = body.extend_from_slice(&distance.to_bits().to_le_bytes());
            }
        }
        body
    }
}
