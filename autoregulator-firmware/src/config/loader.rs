//! Configuration persistence
//!
//! Loads the regulator configuration from flash storage, falling back to
//! the configuration compiled into the firmware.

use core::str;
use defmt::*;

use autoregulator_core::config::{parse_config, ConfigError as CoreConfigError, RegulatorConfig};
use autoregulator_hal_rp2040::{FlashError, FlashStorageTrait, StorageKey};

/// Maximum serialized config size (binary)
const MAX_CONFIG_SIZE: usize = 64;

/// Maximum TOML config size
const MAX_TOML_SIZE: usize = 2048;

/// Configuration persistence errors
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Flash operation failed
    Flash(FlashError),
    /// Deserialization failed
    Deserialize,
    /// TOML parsing failed
    TomlParse,
    /// Invalid UTF-8 in TOML data
    InvalidUtf8,
    /// Stored configuration failed validation
    Invalid(CoreConfigError),
}

impl From<FlashError> for ConfigError {
    fn from(e: FlashError) -> Self {
        ConfigError::Flash(e)
    }
}

impl From<CoreConfigError> for ConfigError {
    fn from(e: CoreConfigError) -> Self {
        ConfigError::Invalid(e)
    }
}

/// Configuration persistence manager
pub struct ConfigPersistence<S> {
    storage: S,
}

impl<S: FlashStorageTrait> ConfigPersistence<S> {
    /// Create a new config persistence manager
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    /// Consume this persistence manager and return the underlying storage
    ///
    /// The retained state store shares the same partition.
    pub fn into_storage(self) -> S {
        self.storage
    }

    /// Load configuration, falling back to `embedded` and then to defaults
    ///
    /// Never fails: the device must still regulate with a broken flash.
    pub async fn load_or(&mut self, embedded: &str) -> RegulatorConfig {
        match self.load().await {
            Ok(config) => return config,
            Err(ConfigError::Flash(FlashError::NotFound)) => {
                info!("No configuration in flash, using embedded configuration");
            }
            Err(e) => {
                warn!("Stored configuration unusable ({:?}), using embedded configuration", e);
            }
        }

        match parse_config(embedded) {
            Ok(config) => {
                log_config_summary(&config);
                config
            }
            Err(e) => {
                // build.rs validates regulator.toml, so this is a parser mismatch
                error!("Failed to parse embedded config: {:?}", e);
                error!("Using built-in defaults");
                RegulatorConfig::default()
            }
        }
    }

    /// Load configuration from flash
    ///
    /// Tries to load TOML config first, falls back to binary postcard format.
    pub async fn load(&mut self) -> Result<RegulatorConfig, ConfigError> {
        info!("Loading configuration from flash...");

        match self.load_toml().await {
            Ok(config) => {
                info!("Loaded configuration from TOML");
                return Ok(config);
            }
            Err(ConfigError::Flash(FlashError::NotFound)) => {
                debug!("No TOML config found, trying binary format");
            }
            Err(e) => {
                warn!("Failed to load TOML config: {:?}, trying binary", e);
            }
        }

        self.load_binary().await
    }

    /// Load configuration from TOML format
    async fn load_toml(&mut self) -> Result<RegulatorConfig, ConfigError> {
        let mut buffer = [0u8; MAX_TOML_SIZE];
        let len = self
            .storage
            .read(StorageKey::RegulatorConfigToml, &mut buffer)
            .await?;

        debug!("Read {} bytes of TOML from flash", len);

        let toml_str = str::from_utf8(&buffer[..len]).map_err(|_| ConfigError::InvalidUtf8)?;

        let config = parse_config(toml_str).map_err(|e| {
            warn!("TOML parse error: {:?}", e);
            ConfigError::TomlParse
        })?;

        log_config_summary(&config);
        Ok(config)
    }

    /// Load configuration from binary postcard format
    async fn load_binary(&mut self) -> Result<RegulatorConfig, ConfigError> {
        let mut buffer = [0u8; MAX_CONFIG_SIZE];
        let len = self
            .storage
            .read(StorageKey::RegulatorConfig, &mut buffer)
            .await?;

        debug!("Read {} bytes of binary config from flash", len);

        let config: RegulatorConfig =
            postcard::from_bytes(&buffer[..len]).map_err(|_| ConfigError::Deserialize)?;

        // Version check happens here too
        if let Err(e) = config.validate() {
            warn!("Binary config rejected: {:?}", e);
            return Err(e.into());
        }

        log_config_summary(&config);
        Ok(config)
    }
}

/// Log a summary of the loaded configuration
fn log_config_summary(config: &RegulatorConfig) {
    info!("Configuration loaded successfully");
    debug!(
        "  travel {}..{}, overdrive {}, homing budget {}",
        config.motor.bounds.min(),
        config.motor.bounds.max(),
        config.motor.neg_overdrive,
        config.motor.homing_steps
    );
    debug!(
        "  stepper {} steps/rev at {} rpm",
        config.stepper.steps_per_rev, config.stepper.rpm
    );
    debug!(
        "  wake every {} ms, settle {} ms, align={}, retains={}",
        config.schedule.period_ms,
        config.schedule.cold_boot_settle_ms,
        config.schedule.align_to_period,
        config.schedule.retains_position
    );
}
