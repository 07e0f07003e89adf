//! Configuration type definitions
//!
//! These types represent the device configuration. Configuration is loaded
//! once at boot from TOML text or postcard binary data and is never
//! computed by the core.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Current configuration format version
pub const CONFIG_VERSION: u8 = 1;

/// Configuration validation errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Travel bounds are empty or inverted
    InvalidBounds,
    /// Homing budget cannot cover the full travel
    HomingBudgetTooSmall,
    /// Wake period or settle delay is zero or inconsistent
    InvalidSchedule,
    /// Stepper speed settings are zero
    InvalidStepper,
    /// Stored configuration has a different format version
    VersionMismatch,
}

/// Safe travel range in steps relative to the homing reference
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TravelBounds {
    min: i32,
    max: i32,
}

impl TravelBounds {
    /// Create bounds, requiring `min < max`
    pub const fn new(min: i32, max: i32) -> Result<Self, ConfigError> {
        if min >= max {
            return Err(ConfigError::InvalidBounds);
        }
        Ok(Self { min, max })
    }

    /// Lowest allowed position (`MIN_POS`)
    pub const fn min(&self) -> i32 {
        self.min
    }

    /// Highest allowed position (`MAX_POS`)
    pub const fn max(&self) -> i32 {
        self.max
    }

    /// Number of steps between the bounds
    ///
    /// Zero for bounds that bypassed [`TravelBounds::new`] inverted.
    pub fn span(&self) -> u32 {
        (self.max as i64 - self.min as i64).max(0) as u32
    }

    /// Check if a position is within bounds (inclusive)
    pub fn contains(&self, position: i32) -> bool {
        position >= self.min && position <= self.max
    }
}

impl Default for TravelBounds {
    fn default() -> Self {
        Self { min: 0, max: 1400 }
    }
}

/// Motor travel and compensation settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MotorConfig {
    /// Safe travel range
    pub bounds: TravelBounds,
    /// Extra steps issued on a direction reversal to take up backlash
    pub neg_overdrive: u16,
    /// Maximum steps driven backward while homing
    pub homing_steps: u32,
}

impl Default for MotorConfig {
    fn default() -> Self {
        Self {
            bounds: TravelBounds::default(),
            neg_overdrive: 10,
            // Full travel plus margin so a hard-stop home always bottoms out
            homing_steps: 1600,
        }
    }
}

/// Stepper motor hardware settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct StepperHwConfig {
    /// Full steps per motor revolution
    pub steps_per_rev: u16,
    /// Rotation speed in RPM
    pub rpm: u16,
}

impl Default for StepperHwConfig {
    fn default() -> Self {
        Self {
            steps_per_rev: 20,
            rpm: 60,
        }
    }
}

impl StepperHwConfig {
    /// Time between step pulses in microseconds
    pub fn step_interval_us(&self) -> u32 {
        let steps_per_min = self.steps_per_rev as u32 * self.rpm as u32;
        if steps_per_min == 0 {
            return 0;
        }
        60_000_000 / steps_per_min
    }
}

/// Wake cycle timing policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ScheduleConfig {
    /// Time between regulation passes
    pub period_ms: u32,
    /// Shorter first sleep after a cold boot, while time sync settles
    pub cold_boot_settle_ms: u32,
    /// Wake on period boundaries of the day instead of a fixed delay
    pub align_to_period: bool,
    /// Motor state survives the low-power sleep in RAM
    ///
    /// Off by default so a board that powers RAM down homes every wake.
    pub retains_position: bool,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            period_ms: 3_600_000,
            cold_boot_settle_ms: 30_000,
            align_to_period: true,
            retains_position: false,
        }
    }
}

/// Complete device configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RegulatorConfig {
    /// Format version
    pub version: u8,
    /// Motor travel settings
    pub motor: MotorConfig,
    /// Stepper hardware settings
    pub stepper: StepperHwConfig,
    /// Wake schedule
    pub schedule: ScheduleConfig,
}

impl Default for RegulatorConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl RegulatorConfig {
    /// Create a configuration with device defaults
    pub fn new() -> Self {
        Self {
            version: CONFIG_VERSION,
            motor: MotorConfig::default(),
            stepper: StepperHwConfig::default(),
            schedule: ScheduleConfig::default(),
        }
    }

    /// Check the configuration before any move is made
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.version != CONFIG_VERSION {
            return Err(ConfigError::VersionMismatch);
        }

        let bounds = self.motor.bounds;
        if bounds.min() >= bounds.max() {
            return Err(ConfigError::InvalidBounds);
        }

        if self.motor.homing_steps < bounds.span() {
            return Err(ConfigError::HomingBudgetTooSmall);
        }

        if self.stepper.steps_per_rev == 0 || self.stepper.rpm == 0 {
            return Err(ConfigError::InvalidStepper);
        }

        let schedule = &self.schedule;
        if schedule.period_ms == 0
            || schedule.cold_boot_settle_ms == 0
            || schedule.cold_boot_settle_ms > schedule.period_ms
        {
            return Err(ConfigError::InvalidSchedule);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = RegulatorConfig::default();
        assert_eq!(config.validate(), Ok(()));
        assert_eq!(config.motor.bounds.min(), 0);
        assert_eq!(config.motor.bounds.max(), 1400);
        assert_eq!(config.motor.neg_overdrive, 10);
        assert_eq!(config.schedule.period_ms, 3_600_000);
    }

    #[test]
    fn test_bounds() {
        assert_eq!(TravelBounds::new(10, 10), Err(ConfigError::InvalidBounds));
        assert_eq!(TravelBounds::new(10, 5), Err(ConfigError::InvalidBounds));

        let bounds = TravelBounds::new(-50, 200).unwrap();
        assert_eq!(bounds.span(), 250);
        assert!(bounds.contains(-50));
        assert!(bounds.contains(200));
        assert!(!bounds.contains(-51));
        assert!(!bounds.contains(201));
    }

    #[test]
    fn test_homing_budget_must_cover_travel() {
        let mut config = RegulatorConfig::default();
        config.motor.homing_steps = 1399;
        assert_eq!(config.validate(), Err(ConfigError::HomingBudgetTooSmall));

        config.motor.homing_steps = 1400;
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn test_schedule_validation() {
        let mut config = RegulatorConfig::default();
        config.schedule.period_ms = 0;
        assert_eq!(config.validate(), Err(ConfigError::InvalidSchedule));

        let mut config = RegulatorConfig::default();
        config.schedule.cold_boot_settle_ms = config.schedule.period_ms + 1;
        assert_eq!(config.validate(), Err(ConfigError::InvalidSchedule));
    }

    #[test]
    fn test_stepper_validation() {
        let mut config = RegulatorConfig::default();
        config.stepper.rpm = 0;
        assert_eq!(config.validate(), Err(ConfigError::InvalidStepper));
    }

    #[test]
    fn test_version_mismatch() {
        let mut config = RegulatorConfig::default();
        config.version = CONFIG_VERSION + 1;
        assert_eq!(config.validate(), Err(ConfigError::VersionMismatch));
    }

    #[test]
    fn test_step_interval() {
        let stepper = StepperHwConfig::default();
        // 20 steps/rev at 60 RPM = 1200 steps/min
        assert_eq!(stepper.step_interval_us(), 50_000);

        let stopped = StepperHwConfig {
            steps_per_rev: 20,
            rpm: 0,
        };
        assert_eq!(stopped.step_interval_us(), 0);
    }
}
