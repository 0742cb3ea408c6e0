//! Configuration loading
//!
//! `odometer.toml` is embedded at compile time (and validated by
//! `build.rs`), then parsed here with the core's no_std parser.

use defmt::*;

use hodometer_core::config::{parse_config, OdometerConfig};

/// Embedded configuration; edit odometer.toml and rebuild to customize
const EMBEDDED_CONFIG: &str = include_str!("../odometer.toml");

/// Upper bound on the postcard form of [`OdometerConfig`]
const MAX_ENCODED_CONFIG: usize = 64;

/// Parse the embedded configuration, falling back to defaults
pub fn load_config() -> OdometerConfig {
    let config = match parse_config(EMBEDDED_CONFIG) {
        Ok(config) => {
            info!("Parsed embedded configuration");
            config
        }
        Err(e) => {
            // build.rs rejects bad files, so only a parser/validator mismatch gets here
            error!("Failed to parse embedded config: {}", e);
            error!("Using default configuration");
            OdometerConfig::default()
        }
    };

    log_config(&config);
    config
}

fn log_config(config: &OdometerConfig) {
    info!(
        "sensor: poll {} ms, idle {} ms, wheel {} um",
        config.sensor.poll_interval_ms,
        config.sensor.idle_timeout_ms,
        config.sensor.circumference_um
    );
    info!(
        "session: {} slots, save every {} rot, time sync grace {} ms",
        config.storage.slot_count,
        config.session.rotation_save_interval,
        config.session.time_sync_grace_ms
    );
    info!(
        "power: save={} at {} mV (spacing {} ms), glitch floor {} mV",
        config.power.voltage_save,
        config.power.low_voltage_mv,
        config.power.min_save_spacing_ms,
        config.power.glitch_floor_mv
    );

    // Compact fingerprint to match field logs against a build
    let mut buf = [0u8; MAX_ENCODED_CONFIG];
    match config.to_postcard(&mut buf) {
        Ok(bytes) => info!("config fingerprint: {=[u8]:x}", bytes),
        Err(_) => warn!("config fingerprint unavailable"),
    }
}
