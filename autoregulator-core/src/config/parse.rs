//! Simple TOML parser for device configuration
//!
//! This is a minimal TOML parser that handles only the subset needed for
//! the regulator configuration. It does NOT support the whole TOML language and
//! needs no allocator.
//!
//! Supported features:
//! - Key = value pairs (integer, boolean)
//! - Integers with `_` digit separators (`3_600_000`)
//! - [section] headers
//! - Comments (# ...), including trailing comments
//!
//! Example:
//!
//! ```toml
//! version = 1
//!
//! [motor]
//! min_position = 0
//! max_position = 1400
//! neg_overdrive = 10
//! homing_steps = 1600
//!
//! [stepper]
//! steps_per_rev = 20
//! rpm = 60
//!
//! [schedule]
//! period_ms = 3_600_000
//! cold_boot_settle_ms = 30_000
//! align_to_period = true
//! retains_position = false
//! ```

use super::types::{ConfigError, RegulatorConfig, TravelBounds};

/// Parse error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParseError {
    /// Unknown or malformed section header (line number)
    InvalidSection(usize),
    /// Key not valid in its section (line number)
    UnknownKey(usize),
    /// Value has the wrong type or range (line number)
    InvalidValue(usize),
    /// Line is neither a header nor `key = value` (line number)
    InvalidLine(usize),
    /// Parsed configuration failed validation
    Invalid(ConfigError),
}

impl From<ConfigError> for ParseError {
    fn from(e: ConfigError) -> Self {
        ParseError::Invalid(e)
    }
}

/// Current parsing context
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Root,
    Motor,
    Stepper,
    Schedule,
}

/// Parse TOML configuration text into a validated [`RegulatorConfig`]
///
/// Keys that are absent keep their default values.
pub fn parse_config(input: &str) -> Result<RegulatorConfig, ParseError> {
    let mut config = RegulatorConfig::new();
    let mut section = Section::Root;

    // Bounds are validated as a pair once both ends are known
    let mut min_position = config.motor.bounds.min();
    let mut max_position = config.motor.bounds.max();

    for (index, raw) in input.lines().enumerate() {
        let line_no = index + 1;
        let line = strip_comment(raw).trim();

        if line.is_empty() {
            continue;
        }

        if line.starts_with('[') {
            if !line.ends_with(']') {
                return Err(ParseError::InvalidSection(line_no));
            }
            section = parse_section_header(&line[1..line.len() - 1])
                .ok_or(ParseError::InvalidSection(line_no))?;
            continue;
        }

        let (key, value) = parse_key_value(line).ok_or(ParseError::InvalidLine(line_no))?;
        let invalid = ParseError::InvalidValue(line_no);

        match (section, key) {
            (Section::Root, "version") => config.version = parse_int(value).ok_or(invalid)?,

            (Section::Motor, "min_position") => min_position = parse_int(value).ok_or(invalid)?,
            (Section::Motor, "max_position") => max_position = parse_int(value).ok_or(invalid)?,
            (Section::Motor, "neg_overdrive") => {
                config.motor.neg_overdrive = parse_int(value).ok_or(invalid)?
            }
            (Section::Motor, "homing_steps") => {
                config.motor.homing_steps = parse_int(value).ok_or(invalid)?
            }

            (Section::Stepper, "steps_per_rev") => {
                config.stepper.steps_per_rev = parse_int(value).ok_or(invalid)?
            }
            (Section::Stepper, "rpm") => config.stepper.rpm = parse_int(value).ok_or(invalid)?,

            (Section::Schedule, "period_ms") => {
                config.schedule.period_ms = parse_int(value).ok_or(invalid)?
            }
            (Section::Schedule, "cold_boot_settle_ms") => {
                config.schedule.cold_boot_settle_ms = parse_int(value).ok_or(invalid)?
            }
            (Section::Schedule, "align_to_period") => {
                config.schedule.align_to_period = parse_bool(value).ok_or(invalid)?
            }
            (Section::Schedule, "retains_position") => {
                config.schedule.retains_position = parse_bool(value).ok_or(invalid)?
            }

            _ => return Err(ParseError::UnknownKey(line_no)),
        }
    }

    config.motor.bounds = TravelBounds::new(min_position, max_position)?;
    config.validate()?;

    Ok(config)
}

/// Parse section header like "motor" or "schedule"
fn parse_section_header(header: &str) -> Option<Section> {
    match header.trim() {
        "motor" => Some(Section::Motor),
        "stepper" => Some(Section::Stepper),
        "schedule" => Some(Section::Schedule),
        _ => None,
    }
}

/// Remove a trailing `# comment`, ignoring `#` inside quotes
fn strip_comment(line: &str) -> &str {
    let mut in_string = false;
    for (i, c) in line.char_indices() {
        match c {
            '"' => in_string = !in_string,
            '#' if !in_string => return &line[..i],
            _ => {}
        }
    }
    line
}

/// Parse "key = value" line
fn parse_key_value(line: &str) -> Option<(&str, &str)> {
    let eq_pos = line.find('=')?;
    let key = line[..eq_pos].trim();
    let value = line[eq_pos + 1..].trim();

    if key.is_empty() || value.is_empty() {
        return None;
    }

    Some((key, value))
}

/// Parse an integer value, allowing `_` separators between digits
fn parse_int<T: TryFrom<i64>>(value: &str) -> Option<T> {
    let (negative, digits) = match value.as_bytes().first()? {
        b'-' => (true, &value[1..]),
        b'+' => (false, &value[1..]),
        _ => (false, value),
    };

    if digits.is_empty() || digits.starts_with('_') || digits.ends_with('_') {
        return None;
    }

    let mut magnitude: i64 = 0;
    for c in digits.chars() {
        if c == '_' {
            continue;
        }
        let digit = c.to_digit(10)? as i64;
        magnitude = magnitude.checked_mul(10)?.checked_add(digit)?;
    }

    let signed = if negative { -magnitude } else { magnitude };
    T::try_from(signed).ok()
}

/// Parse a boolean value
fn parse_bool(value: &str) -> Option<bool> {
    match value {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    }
}
