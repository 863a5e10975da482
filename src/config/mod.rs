//! Configuration management
//!
//! Layered as: built-in defaults, then an optional TOML file, then
//! `RINGBRIDGE__*` environment variables (`__` separates nested keys).

use crate::application::BridgeSettings;
use crate::domain::call::ports::InCallSettings;
use crate::domain::shared::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Environment variable prefix
pub const ENV_PREFIX: &str = "RINGBRIDGE";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub provider: ProviderConfig,
    pub missed_call: MissedCallConfig,
    pub in_call: InCallSettings,
    pub logging: LoggingConfig,
}

/// Native call-UI provider configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub localized_name: String,
    pub ringtone: String,
    pub includes_calls_in_recents: bool,
    pub supports_video: bool,
    pub icon_template: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissedCallConfig {
    pub enabled: bool,
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            provider: ProviderConfig {
                localized_name: "RingBridge Call".to_string(),
                ringtone: "ringtone.caf".to_string(),
                includes_calls_in_recents: false,
                supports_video: false,
                icon_template: Some("callkit-icon".to_string()),
            },
            missed_call: MissedCallConfig {
                enabled: true,
                body: "Missed call".to_string(),
            },
            in_call: InCallSettings::default(),
            logging: LoggingConfig {
                level: "info".to_string(),
            },
        }
    }
}

impl Config {
    /// Load configuration from defaults, an optional file and the environment
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = ::config::Config::builder()
            .add_source(::config::Config::try_from(&Config::default())?);

        if let Some(path) = path {
            builder = builder.add_source(
                ::config::File::from(path)
                    .format(::config::FileFormat::Toml)
                    .required(false),
            );
        }

        let config = builder
            .add_source(
                ::config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Render the effective configuration as TOML
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn bridge_settings(&self) -> BridgeSettings {
        BridgeSettings {
            missed_call_enabled: self.missed_call.enabled,
            missed_call_body: self.missed_call.body.clone(),
            in_call: self.in_call.clone(),
        }
    }
}
