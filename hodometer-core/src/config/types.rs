//! Configuration type definitions
//!
//! The firmware embeds `odometer.toml` and parses it at boot with
//! [`parse_config`](super::parse_config). With the `serde` feature the
//! same structure can also be stored as postcard binary.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Rotation sensor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SensorConfig {
    /// Main loop period (ms)
    pub poll_interval_ms: u32,
    /// Idle time that closes an active period (ms)
    pub idle_timeout_ms: u32,
    /// Distance per rotation (micrometres)
    pub circumference_um: u32,
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 30,
            idle_timeout_ms: 3_000,
            circumference_um: 345_600,
        }
    }
}

impl SensorConfig {
    /// Circumference in centimetres
    pub fn circumference_cm(&self) -> f32 {
        self.circumference_um as f32 / 10_000.0
    }
}

/// Record storage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct StorageConfig {
    /// Flash sectors used for records (at most 64)
    pub slot_count: u32,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self { slot_count: 64 }
    }
}

/// Session persistence policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SessionConfig {
    /// Lifetime rotations between saves (~0.5 mi at 2500)
    pub rotation_save_interval: u32,
    /// How long to wait for a time sync before saving without one (ms)
    pub time_sync_grace_ms: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            rotation_save_interval: 2_500,
            time_sync_grace_ms: 60_000,
        }
    }
}

/// Supply monitoring
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PowerConfig {
    /// Save when VSYS sags to the threshold
    pub voltage_save: bool,
    /// Emergency save threshold (mV)
    pub low_voltage_mv: u32,
    /// Minimum gap between voltage-triggered saves (ms)
    pub min_save_spacing_ms: u32,
    /// VSYS sampling period (ms)
    pub poll_interval_ms: u32,
    /// Readings below this are ADC glitches (mV)
    pub glitch_floor_mv: u32,
}

impl Default for PowerConfig {
    fn default() -> Self {
        Self {
            voltage_save: true,
            low_voltage_mv: 3_300,
            min_save_spacing_ms: 60_000,
            poll_interval_ms: 1_000,
            glitch_floor_mv: 1_500,
        }
    }
}

/// Display units
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct UnitsConfig {
    /// Kilometres instead of miles
    pub metric: bool,
}

/// Complete device configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct OdometerConfig {
    pub sensor: SensorConfig,
    pub storage: StorageConfig,
    pub session: SessionConfig,
    pub power: PowerConfig,
    pub units: UnitsConfig,
}

impl OdometerConfig {
    /// Create a configuration with default values
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg(feature = "serde")]
impl OdometerConfig {
    /// Serialize as postcard into `buf`
    pub fn to_postcard<'a>(&self, buf: &'a mut [u8]) -> Result<&'a mut [u8], postcard::Error> {
        postcard::to_slice(self, buf)
    }

    /// Deserialize from postcard bytes
    pub fn from_postcard(bytes: &[u8]) -> Result<Self, postcard::Error> {
        postcard::from_bytes(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = OdometerConfig::default();
        assert_eq!(config.sensor.poll_interval_ms, 30);
        assert_eq!(config.sensor.idle_timeout_ms, 3_000);
        assert_eq!(config.storage.slot_count, 64);
        assert_eq!(config.session.rotation_save_interval, 2_500);
        assert_eq!(config.session.time_sync_grace_ms, 60_000);
        assert!(config.power.voltage_save);
        assert_eq!(config.power.low_voltage_mv, 3_300);
        assert!(!config.units.metric);
    }

    #[test]
    fn test_circumference_cm() {
        let sensor = SensorConfig::default();
        assert!((sensor.circumference_cm() - 34.56).abs() < 1e-4);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_postcard_roundtrip() {
        let mut config = OdometerConfig::default();
        config.units.metric = true;
        config.power.low_voltage_mv = 3_100;

        let mut buf = [0u8; 64];
        let bytes = config.to_postcard(&mut buf).unwrap();
        assert_eq!(OdometerConfig::from_postcard(bytes).unwrap(), config);
    }
}
