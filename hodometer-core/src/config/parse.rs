//! Minimal TOML parser for `odometer.toml`
//!
//! Handles only the subset the configuration needs and never allocates:
//! - `[section]` headers
//! - `key = value` with integers (underscores allowed) and booleans
//! - Comments (`# ...`), whole-line or trailing
//!
//! Unknown sections and keys are errors rather than being ignored, so a
//! typo cannot silently fall back to a default.

use super::types::OdometerConfig;
use crate::storage::MAX_SLOTS;

/// Parse error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParseError {
    /// Header names no known section
    InvalidSection,
    /// Key not valid in the current section
    UnknownKey,
    /// Value has the wrong type or does not fit
    InvalidValue,
    /// Value parsed but is outside the accepted range
    OutOfRange,
    /// Line is neither a header, a key/value pair nor a comment
    MalformedLine,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Root,
    Sensor,
    Storage,
    Session,
    Power,
    Units,
}

/// Parse configuration text, starting from defaults
pub fn parse_config(input: &str) -> Result<OdometerConfig, ParseError> {
    let mut config = OdometerConfig::default();
    let mut section = Section::Root;

    for line in input.lines() {
        let line = strip_comment(line).trim();
        if line.is_empty() {
            continue;
        }

        if line.starts_with('[') && line.ends_with(']') {
            section = parse_section_header(&line[1..line.len() - 1])?;
            continue;
        }

        let (key, value) = parse_key_value(line).ok_or(ParseError::MalformedLine)?;
        apply_value(&mut config, section, key, value)?;
    }

    validate(&config)?;
    Ok(config)
}

fn strip_comment(line: &str) -> &str {
    match line.find('#') {
        Some(pos) => &line[..pos],
        None => line,
    }
}

fn parse_section_header(header: &str) -> Result<Section, ParseError> {
    match header.trim() {
        "sensor" => Ok(Section::Sensor),
        "storage" => Ok(Section::Storage),
        "session" => Ok(Section::Session),
        "power" => Ok(Section::Power),
        "units" => Ok(Section::Units),
        _ => Err(ParseError::InvalidSection),
    }
}

fn parse_key_value(line: &str) -> Option<(&str, &str)> {
    let eq_pos = line.find('=')?;
    let key = line[..eq_pos].trim();
    let value = line[eq_pos + 1..].trim();

    if key.is_empty() || value.is_empty() {
        return None;
    }

    Some((key, value))
}

/// Parse an unsigned integer, allowing `_` separators
fn parse_u32(value: &str) -> Result<u32, ParseError> {
    let mut result: u32 = 0;
    let mut digits = 0;

    for c in value.chars() {
        if c == '_' {
            continue;
        }
        let digit = c.to_digit(10).ok_or(ParseError::InvalidValue)?;
        result = result
            .checked_mul(10)
            .and_then(|r| r.checked_add(digit))
            .ok_or(ParseError::InvalidValue)?;
        digits += 1;
    }

    if digits == 0 {
        return Err(ParseError::InvalidValue);
    }
    Ok(result)
}

fn parse_bool(value: &str) -> Result<bool, ParseError> {
    match value {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(ParseError::InvalidValue),
    }
}

fn apply_value(
    config: &mut OdometerConfig,
    section: Section,
    key: &str,
    value: &str,
) -> Result<(), ParseError> {
    match (section, key) {
        (Section::Sensor, "poll_interval_ms") => config.sensor.poll_interval_ms = parse_u32(value)?,
        (Section::Sensor, "idle_timeout_ms") => config.sensor.idle_timeout_ms = parse_u32(value)?,
        (Section::Sensor, "circumference_um") => config.sensor.circumference_um = parse_u32(value)?,

        (Section::Storage, "slot_count") => config.storage.slot_count = parse_u32(value)?,

        (Section::Session, "rotation_save_interval") => {
            config.session.rotation_save_interval = parse_u32(value)?
        }
        (Section::Session, "time_sync_grace_ms") => {
            config.session.time_sync_grace_ms = parse_u32(value)?
        }

        (Section::Power, "voltage_save") => config.power.voltage_save = parse_bool(value)?,
        (Section::Power, "low_voltage_mv") => config.power.low_voltage_mv = parse_u32(value)?,
        (Section::Power, "min_save_spacing_ms") => {
            config.power.min_save_spacing_ms = parse_u32(value)?
        }
        (Section::Power, "poll_interval_ms") => config.power.poll_interval_ms = parse_u32(value)?,
        (Section::Power, "glitch_floor_mv") => config.power.glitch_floor_mv = parse_u32(value)?,

        (Section::Units, "metric") => config.units.metric = parse_bool(value)?,

        _ => return Err(ParseError::UnknownKey),
    }
    Ok(())
}

fn validate(config: &OdometerConfig) -> Result<(), ParseError> {
    let slots = config.storage.slot_count;
    if slots == 0 || slots as usize > MAX_SLOTS {
        return Err(ParseError::OutOfRange);
    }
    if config.sensor.poll_interval_ms == 0
        || config.sensor.circumference_um == 0
        || config.power.poll_interval_ms == 0
        || config.session.rotation_save_interval == 0
    {
        return Err(ParseError::OutOfRange);
    }
    Ok(())
}
