//! Build script for autoregulator-firmware
//!
//! - Sets up linker search paths for memory.x
//! - Validates regulator.toml at compile time

use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Keys accepted in each section, with their expected kind
const MOTOR_KEYS: &[(&str, Kind)] = &[
    ("min_position", Kind::Integer),
    ("max_position", Kind::Integer),
    ("neg_overdrive", Kind::Integer),
    ("homing_steps", Kind::Integer),
];
const STEPPER_KEYS: &[(&str, Kind)] = &[("steps_per_rev", Kind::Integer), ("rpm", Kind::Integer)];
const SCHEDULE_KEYS: &[(&str, Kind)] = &[
    ("period_ms", Kind::Integer),
    ("cold_boot_settle_ms", Kind::Integer),
    ("align_to_period", Kind::Boolean),
    ("retains_position", Kind::Boolean),
];

#[derive(Clone, Copy)]
enum Kind {
    Integer,
    Boolean,
}

fn main() {
    setup_linker();
    validate_config();
}

/// Set up linker search paths for memory.x
fn setup_linker() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    // Copy memory.x to the output directory
    let memory_x = include_bytes!("memory.x");
    let mut f = File::create(out_dir.join("memory.x")).unwrap();
    f.write_all(memory_x).unwrap();

    println!("cargo:rustc-link-search={}", out_dir.display());

    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// Validate regulator.toml configuration at compile time
fn validate_config() {
    println!("cargo:rerun-if-changed=regulator.toml");

    let config_path = Path::new("regulator.toml");
    let content = fs::read_to_string(config_path)
        .unwrap_or_else(|e| fail("Failed to read regulator.toml", &[e.to_string()]));

    let config: toml::Value = toml::from_str(&content)
        .unwrap_or_else(|e| fail("Invalid TOML syntax in regulator.toml", &[e.to_string()]));

    let mut errors = Vec::new();

    match config.get("version").and_then(|v| v.as_integer()) {
        Some(1) => {}
        Some(v) => errors.push(format!("version must be 1, found {}", v)),
        None => errors.push("missing 'version'".to_string()),
    }

    for (name, value) in config.as_table().into_iter().flatten() {
        if !matches!(name.as_str(), "version" | "motor" | "stepper" | "schedule") {
            errors.push(format!("unknown key or section '{}'", name));
        } else if name != "version" && !value.is_table() {
            errors.push(format!("'{}' must be a section", name));
        }
    }

    check_section(&config, "motor", MOTOR_KEYS, &mut errors);
    check_section(&config, "stepper", STEPPER_KEYS, &mut errors);
    check_section(&config, "schedule", SCHEDULE_KEYS, &mut errors);

    validate_motor(&config, &mut errors);
    validate_stepper(&config, &mut errors);
    validate_schedule(&config, &mut errors);

    if !errors.is_empty() {
        fail("Invalid configuration in regulator.toml", &errors);
    }

    println!("cargo:warning=regulator.toml validated successfully");
}

/// Check key names and value kinds of one section
fn check_section(config: &toml::Value, section: &str, keys: &[(&str, Kind)], errors: &mut Vec<String>) {
    let Some(table) = config.get(section).and_then(|s| s.as_table()) else {
        return;
    };

    for (key, value) in table {
        match keys.iter().find(|(name, _)| *name == key.as_str()) {
            None => errors.push(format!("[{}] unknown key '{}'", section, key)),
            Some((_, Kind::Integer)) if !value.is_integer() => {
                errors.push(format!("[{}] '{}' must be an integer", section, key))
            }
            Some((_, Kind::Boolean)) if !value.is_bool() => {
                errors.push(format!("[{}] '{}' must be true or false", section, key))
            }
            Some(_) => {}
        }
    }
}

fn integer(config: &toml::Value, section: &str, key: &str, default: i64) -> i64 {
    config
        .get(section)
        .and_then(|s| s.get(key))
        .and_then(|v| v.as_integer())
        .unwrap_or(default)
}

fn validate_motor(config: &toml::Value, errors: &mut Vec<String>) {
    let min = integer(config, "motor", "min_position", 0);
    let max = integer(config, "motor", "max_position", 1400);
    let overdrive = integer(config, "motor", "neg_overdrive", 10);
    let homing = integer(config, "motor", "homing_steps", 1600);

    if min >= max {
        errors.push(format!(
            "[motor] min_position ({}) must be below max_position ({})",
            min, max
        ));
    }
    if i32::try_from(min).is_err() || i32::try_from(max).is_err() {
        errors.push("[motor] positions must fit in 32 bits".to_string());
    }
    if !(0..=u16::MAX as i64).contains(&overdrive) {
        errors.push("[motor] neg_overdrive must be 0-65535".to_string());
    }
    if homing < max - min {
        errors.push(format!(
            "[motor] homing_steps ({}) must cover the travel ({})",
            homing,
            max - min
        ));
    }
}

fn validate_stepper(config: &toml::Value, errors: &mut Vec<String>) {
    for key in ["steps_per_rev", "rpm"] {
        let value = integer(config, "stepper", key, 1);
        if !(1..=u16::MAX as i64).contains(&value) {
            errors.push(format!("[stepper] {} must be 1-65535", key));
        }
    }
}

fn validate_schedule(config: &toml::Value, errors: &mut Vec<String>) {
    let period = integer(config, "schedule", "period_ms", 3_600_000);
    let settle = integer(config, "schedule", "cold_boot_settle_ms", 30_000);

    if !(1..=u32::MAX as i64).contains(&period) {
        errors.push("[schedule] period_ms must be a positive 32-bit value".to_string());
    }
    if settle < 1 || settle > period {
        errors.push(format!(
            "[schedule] cold_boot_settle_ms ({}) must be 1..=period_ms ({})",
            settle, period
        ));
    }
}

/// Abort the build with a boxed error report
fn fail(title: &str, lines: &[String]) -> ! {
    panic!(
        "\n\
        ╔══════════════════════════════════════════════════════════════════╗\n\
        ║  ERROR: {:<57}║\n\
        ╠══════════════════════════════════════════════════════════════════╣\n\
        {}\n\
        ╚══════════════════════════════════════════════════════════════════╝\n",
        title,
        lines
            .iter()
            .flat_map(|l| l.lines())
            .map(|l| format!("║  • {:<62} ║", l))
            .collect::<Vec<_>>()
            .join("\n")
    );
}
