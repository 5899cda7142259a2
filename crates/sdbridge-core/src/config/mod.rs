//! Application configuration schemas.
//!
//! All configuration structs are deserialized via the `config` crate from an
//! optional TOML file merged with `SDBRIDGE__`-prefixed environment
//! variables. Every field has a default, so a missing file yields a usable
//! configuration pointing at the device's access-point address.

pub mod device;
pub mod logging;
pub mod polling;

use serde::{Deserialize, Serialize};
use validator::Validate;

pub use self::device::DeviceConfig;
pub use self::logging::LoggingConfig;
pub use self::polling::{DebugLogConfig, PollingConfig};

use crate::error::AppError;

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct AppConfig {
    /// Device connection settings.
    #[serde(default)]
    #[validate(nested)]
    pub device: DeviceConfig,
    /// Status polling settings.
    #[serde(default)]
    #[validate(nested)]
    pub polling: PollingConfig,
    /// Debug panel settings.
    #[serde(default)]
    #[validate(nested)]
    pub debug_log: DebugLogConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from a TOML file (optional) and the environment.
    ///
    /// Environment variables use the `SDBRIDGE` prefix and `__` as the
    /// section separator, e.g. `SDBRIDGE__DEVICE__BASE_URL`.
    pub fn load(path: &str) -> Result<Self, AppError> {
        Self::load_layers(&[path])
    }

    /// Load configuration from several files, later files overriding
    /// earlier ones, followed by the environment.
    pub fn load_layers(paths: &[&str]) -> Result<Self, AppError> {
        let mut builder = config::Config::builder();
        for path in paths {
            builder = builder.add_source(config::File::with_name(path).required(false));
        }

        let config = builder
            .add_source(
                config::Environment::with_prefix("SDBRIDGE")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        let config: Self = config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))?;

        config.validate()?;
        Ok(config)
    }

    /// Replace the device base URL, e.g. from a command-line flag.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Result<Self, AppError> {
        self.device.base_url = base_url.into();
        self.validate()?;
        Ok(self)
    }
}
