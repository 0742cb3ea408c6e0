//! Build script for hodometer-firmware
//!
//! - Sets up linker search paths for memory.x
//! - Validates odometer.toml at compile time

use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Accepted value shape for one key
#[derive(Clone, Copy)]
enum Kind {
    /// Non-negative integer in an inclusive range
    Int { min: i64, max: i64 },
    Bool,
}

const U32_MAX: i64 = u32::MAX as i64;

/// Every section and key the firmware's parser understands
const SCHEMA: &[(&str, &[(&str, Kind)])] = &[
    (
        "sensor",
        &[
            ("poll_interval_ms", Kind::Int { min: 1, max: U32_MAX }),
            ("idle_timeout_ms", Kind::Int { min: 0, max: U32_MAX }),
            ("circumference_um", Kind::Int { min: 1, max: U32_MAX }),
        ],
    ),
    ("storage", &[("slot_count", Kind::Int { min: 1, max: 64 })]),
    (
        "session",
        &[
            ("rotation_save_interval", Kind::Int { min: 1, max: U32_MAX }),
            ("time_sync_grace_ms", Kind::Int { min: 0, max: U32_MAX }),
        ],
    ),
    (
        "power",
        &[
            ("voltage_save", Kind::Bool),
            ("low_voltage_mv", Kind::Int { min: 0, max: U32_MAX }),
            ("min_save_spacing_ms", Kind::Int { min: 0, max: U32_MAX }),
            ("poll_interval_ms", Kind::Int { min: 1, max: U32_MAX }),
            ("glitch_floor_mv", Kind::Int { min: 0, max: U32_MAX }),
        ],
    ),
    ("units", &[("metric", Kind::Bool)]),
];

fn main() {
    setup_linker();
    validate_config();
}

/// Set up linker search paths for memory.x
fn setup_linker() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").expect("OUT_DIR not set"));

    // Copy memory.x to the output directory
    let memory_x = include_bytes!("memory.x");
    let mut f = File::create(out_dir.join("memory.x")).expect("cannot create memory.x");
    f.write_all(memory_x).expect("cannot write memory.x");

    // Tell rustc where to find memory.x
    println!("cargo:rustc-link-search={}", out_dir.display());

    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// Validate odometer.toml at compile time
fn validate_config() {
    println!("cargo:rerun-if-changed=odometer.toml");

    let config_path = Path::new("odometer.toml");

    if !config_path.exists() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: odometer.toml not found!                                 ║\n\
            ║                                                                  ║\n\
            ║  The firmware embeds odometer.toml from the hodometer-firmware   ║\n\
            ║  directory. Restore it or create one (all keys are optional).    ║\n\
            ╚══════════════════════════════════════════════════════════════════╝\n"
        );
    }

    let config_content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => {
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Failed to read odometer.toml                             ║\n\
                ║                                                                  ║\n\
                ║  Error: {:<56} ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                e
            );
        }
    };

    let config: toml::Value = match toml::from_str(&config_content) {
        Ok(value) => value,
        Err(e) => {
            let error_msg = e.to_string();
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Invalid TOML syntax in odometer.toml                     ║\n\
                ╠══════════════════════════════════════════════════════════════════╣\n\
                {}\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                format_error_lines(&error_msg)
            );
        }
    };

    let errors = check_against_schema(&config);
    if !errors.is_empty() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: Invalid configuration in odometer.toml                   ║\n\
            ╠══════════════════════════════════════════════════════════════════╣\n\
            {}\n\
            ╚══════════════════════════════════════════════════════════════════╝\n",
            errors
                .iter()
                .map(|e| format!("║  • {:<62} ║", e))
                .collect::<Vec<_>>()
                .join("\n")
        );
    }

    println!("cargo:warning=odometer.toml validated successfully");
}

/// Format error message lines with box drawing
fn format_error_lines(msg: &str) -> String {
    msg.lines()
        .map(|line| {
            let truncated = if line.len() > 64 {
                format!("{}...", &line[..61])
            } else {
                line.to_string()
            };
            format!("║  {:<64} ║", truncated)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Check sections, keys and value types against [`SCHEMA`]
fn check_against_schema(config: &toml::Value) -> Vec<String> {
    let mut errors = Vec::new();

    let Some(root) = config.as_table() else {
        errors.push("top level must be a table".to_string());
        return errors;
    };

    for (section, body) in root {
        let Some((_, keys)) = SCHEMA.iter().find(|(name, _)| name == section) else {
            errors.push(format!("unknown section [{}]", section));
            continue;
        };

        let Some(body) = body.as_table() else {
            errors.push(format!("[{}] must be a table", section));
            continue;
        };

        for (key, value) in body {
            let Some((_, kind)) = keys.iter().find(|(name, _)| name == key) else {
                errors.push(format!("[{}] unknown key '{}'", section, key));
                continue;
            };

            match (*kind, value) {
                (Kind::Bool, toml::Value::Boolean(_)) => {}
                (Kind::Bool, _) => {
                    errors.push(format!("[{}] {} must be true or false", section, key));
                }
                (Kind::Int { min, max }, toml::Value::Integer(n)) => {
                    if *n < min || *n > max {
                        errors.push(format!("[{}] {} must be {}-{}", section, key, min, max));
                    }
                }
                (Kind::Int { .. }, _) => {
                    errors.push(format!("[{}] {} must be an integer", section, key));
                }
            }
        }
    }

    errors
}
