//! Configuration loading using Figment.
//!
//! Configuration is loaded from:
//! 1. `config/scpi_control.toml` (base configuration, optional)
//! 2. Environment variables prefixed with `SCPI_CONTROL_`, nested keys separated
//!    by `__` (`SCPI_CONTROL_CONNECTION__TIMEOUT_MS=2000`)
//!
//! Every field has a default, so an absent file yields a usable configuration.
//!
//! # Example
//! ```no_run
//! use scpi_control::config::Settings;
//!
//! let settings = Settings::load()?;
//! println!("Application: {}", settings.application.name);
//! # Ok::<(), scpi_control::ScpiError>(())
//! ```

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::capability::DeviceFamily;
use crate::error::{Result, ScpiError};
use crate::transport::{ConnectionSettings, Resource};
use crate::validation::{is_not_empty, is_valid_port};

/// Default configuration file, relative to the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "config/scpi_control.toml";
/// Environment variable prefix.
pub const ENV_PREFIX: &str = "SCPI_CONTROL_";

/// Top-level configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Settings {
    /// Application settings
    #[serde(default)]
    pub application: ApplicationConfig,
    /// Transport timing and default ports
    #[serde(default)]
    pub connection: ConnectionConfig,
    /// Instrument definitions
    #[serde(default)]
    pub instruments: Vec<InstrumentDefinition>,
}

/// Application-level configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Application name
    #[serde(default = "default_name")]
    pub name: String,
    /// Logging level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            log_level: default_log_level(),
        }
    }
}

/// Transport configuration shared by every instrument
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectionConfig {
    /// Connect/read/write timeout in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// Pause between query write and read in milliseconds
    #[serde(default = "default_settle_delay_ms")]
    pub settle_delay_ms: u64,
    /// Idle gap ending an unsized binary read, in milliseconds
    #[serde(default = "default_raw_drain_timeout_ms")]
    pub raw_drain_timeout_ms: u64,
    /// Default port for oscilloscopes, generators and supplies
    #[serde(default = "default_scope_port")]
    pub scope_port: u16,
    /// Default port for data loggers
    #[serde(default = "default_daq_port")]
    pub daq_port: u16,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            timeout_ms: default_timeout_ms(),
            settle_delay_ms: default_settle_delay_ms(),
            raw_drain_timeout_ms: default_raw_drain_timeout_ms(),
            scope_port: default_scope_port(),
            daq_port: default_daq_port(),
        }
    }
}

impl ConnectionConfig {
    /// Default port for `family`.
    pub fn port_for(&self, family: DeviceFamily) -> u16 {
        match family {
            DeviceFamily::DataLogger => self.daq_port,
            _ => self.scope_port,
        }
    }
}

/// Instrument definition in configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstrumentDefinition {
    /// Unique instrument identifier
    pub id: String,
    /// Device family (oscilloscope, function_generator, power_supply, data_logger)
    pub family: DeviceFamily,
    /// Resource string (`TCPIP0::192.168.1.50::5025::SOCKET`, `host:port`, `mock://`)
    pub resource: String,
    /// Whether this instrument is enabled
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

// Default value functions
fn default_name() -> String {
    "scpi-control".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_timeout_ms() -> u64 {
    5000
}

fn default_settle_delay_ms() -> u64 {
    10
}

fn default_raw_drain_timeout_ms() -> u64 {
    500
}

fn default_scope_port() -> u16 {
    5024
}

fn default_daq_port() -> u16 {
    5025
}

fn default_enabled() -> bool {
    true
}

impl Settings {
    /// Load configuration from `config/scpi_control.toml` and environment variables
    pub fn load() -> Result<Self> {
        Self::load_from(DEFAULT_CONFIG_PATH)
    }

    /// Load configuration from a specific file path
    ///
    /// A missing file is not an error; defaults and environment still apply.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self> {
        let settings: Settings = Self::figment(path.as_ref()).extract()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Layered provider: defaults, then file, then environment.
    pub fn figment(path: &Path) -> Figment {
        Figment::from(Serialized::defaults(Settings::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Validate configuration after loading
    pub fn validate(&self) -> Result<()> {
        let fail = |message: String| Err(ScpiError::Configuration(message));

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.application.log_level.to_lowercase().as_str()) {
            return fail(format!(
                "Invalid log_level '{}'. Must be one of: {}",
                self.application.log_level,
                valid_levels.join(", ")
            ));
        }

        let connection = &self.connection;
        for (name, value) in [
            ("timeout_ms", connection.timeout_ms),
            ("raw_drain_timeout_ms", connection.raw_drain_timeout_ms),
        ] {
            if value == 0 {
                return fail(format!("{name} must be greater than 0"));
            }
        }
        for (name, port) in [
            ("scope_port", connection.scope_port),
            ("daq_port", connection.daq_port),
        ] {
            is_valid_port(port).or_else(|e| fail(format!("{name}: {e}")))?;
        }

        let mut ids = std::collections::HashSet::new();
        for instrument in &self.instruments {
            is_not_empty(&instrument.id).or_else(|e| fail(format!("instrument id: {e}")))?;
            if !ids.insert(&instrument.id) {
                return fail(format!("Duplicate instrument ID: {}", instrument.id));
            }
            Resource::parse(&instrument.resource, connection.port_for(instrument.family))
                .map_err(|e| {
                    ScpiError::Configuration(format!("instrument '{}': {e}", instrument.id))
                })?;
        }

        Ok(())
    }

    /// Get all enabled instruments
    pub fn enabled_instruments(&self) -> Vec<&InstrumentDefinition> {
        self.instruments
            .iter()
            .filter(|inst| inst.enabled)
            .collect()
    }

    /// Look up an instrument by id.
    pub fn instrument(&self, id: &str) -> Option<&InstrumentDefinition> {
        self.instruments.iter().find(|inst| inst.id == id)
    }

    /// Connection settings for `family`, with the family's default port.
    pub fn connection_settings(&self, family: DeviceFamily) -> ConnectionSettings {
        ConnectionSettings {
            port: self.connection.port_for(family),
            ..ConnectionSettings::from(&self.connection)
        }
    }
}

impl From<&ConnectionConfig> for ConnectionSettings {
    fn from(config: &ConnectionConfig) -> Self {
        ConnectionSettings {
            port: config.scope_port,
            timeout: Duration::from_millis(config.timeout_ms),
            settle_delay: Duration::from_millis(config.settle_delay_ms),
            drain_timeout: Duration::from_millis(config.raw_drain_timeout_ms),
            ..ConnectionSettings::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn instrument(id: &str, resource: &str) -> InstrumentDefinition {
        InstrumentDefinition {
            id: id.to_string(),
            family: DeviceFamily::DataLogger,
            resource: resource.to_string(),
            enabled: true,
        }
    }

    #[test]
    fn test_default_config_is_valid() {
        let settings = Settings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.connection.timeout_ms, 5000);
        assert_eq!(settings.connection.settle_delay_ms, 10);
        assert_eq!(settings.connection.raw_drain_timeout_ms, 500);
    }

    #[test]
    fn test_invalid_log_level() {
        let mut settings = Settings::default();
        settings.application.log_level = "verbose".to_string();
        let err = settings.validate().unwrap_err();
        assert!(err.to_string().contains("verbose"));
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let mut settings = Settings::default();
        settings.connection.timeout_ms = 0;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_duplicate_instrument_ids() {
        let settings = Settings {
            instruments: vec![
                instrument("daq", "TCPIP0::10.0.0.5::5025::SOCKET"),
                instrument("daq", "10.0.0.6"),
            ],
            ..Settings::default()
        };
        let err = settings.validate().unwrap_err();
        assert!(err.to_string().contains("Duplicate instrument ID"));
    }

    #[test]
    fn test_unparseable_resource_rejected() {
        let settings = Settings {
            instruments: vec![instrument("usb", "USB0::0x0957::0x2007::MY1::INSTR")],
            ..Settings::default()
        };
        let err = settings.validate().unwrap_err();
        assert!(err.to_string().contains("instrument 'usb'"));
    }

    #[test]
    fn test_enabled_instruments() {
        let mut disabled = instrument("b", "mock://");
        disabled.enabled = false;
        let settings = Settings {
            instruments: vec![instrument("a", "mock://"), disabled],
            ..Settings::default()
        };
        let enabled = settings.enabled_instruments();
        assert_eq!(enabled.len(), 1);
        assert_eq!(enabled[0].id, "a");
        assert!(settings.instrument("b").is_some());
    }

    #[test]
    fn test_connection_settings_use_family_port() {
        let settings = Settings::default();
        let daq = settings.connection_settings(DeviceFamily::DataLogger);
        let scope = settings.connection_settings(DeviceFamily::Oscilloscope);
        assert_eq!(daq.port, 5025);
        assert_eq!(scope.port, 5024);
        assert_eq!(daq.timeout, Duration::from_secs(5));
        assert_eq!(daq.drain_timeout, Duration::from_millis(500));
    }
}
