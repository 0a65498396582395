//! # Configuration Module
//!
//! Handles loading and validating configuration from TOML files.

use serde::de::Error;
use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::error::{PsxError, Result};
use crate::line::PinAssignment;

/// Highest BCM GPIO number on the Raspberry Pi header
const MAX_GPIO: u8 = 27;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub pins: PinConfig,
    pub controller: ControllerConfig,
    pub polling: PollingConfig,
    pub telemetry: TelemetryConfig,
    pub logging: LoggingConfig,
}

/// GPIO line assignment (BCM numbering)
#[derive(Debug, Deserialize, Clone)]
pub struct PinConfig {
    #[serde(default = "default_data_pin")]
    pub data: u8,

    #[serde(default = "default_command_pin")]
    pub command: u8,

    #[serde(default = "default_attention_pin")]
    pub attention: u8,

    #[serde(default = "default_clock_pin")]
    pub clock: u8,
}

/// Controller session configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ControllerConfig {
    #[serde(default = "default_deadzone")]
    pub deadzone: f64,

    #[serde(default = "default_half_period_us")]
    pub half_period_us: u32,

    #[serde(default = "default_settle_us")]
    pub settle_us: u32,

    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

/// Poll loop configuration
#[derive(Debug, Deserialize, Clone)]
pub struct PollingConfig {
    #[serde(default = "default_rate_hz")]
    pub rate_hz: u32,

    #[serde(default = "default_log_interval_polls")]
    pub log_interval_polls: u64,
}

/// Telemetry configuration
#[derive(Debug, Deserialize, Clone)]
pub struct TelemetryConfig {
    #[serde(default)]
    pub enabled: bool,

    #[serde(default = "default_log_dir")]
    pub log_dir: String,

    #[serde(default = "default_max_records_per_file")]
    pub max_records_per_file: usize,

    #[serde(default = "default_max_files_to_keep")]
    pub max_files_to_keep: usize,
}

/// Diagnostic logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Directory for a daily rolling log file; empty disables file output
    #[serde(default)]
    pub file_dir: String,
}

// Default value functions
fn default_data_pin() -> u8 { 9 }
fn default_command_pin() -> u8 { 10 }
fn default_attention_pin() -> u8 { 8 }
fn default_clock_pin() -> u8 { 11 }

fn default_deadzone() -> f64 { 0.0 }
fn default_half_period_us() -> u32 { 10 }
fn default_settle_us() -> u32 { 100 }
fn default_max_retries() -> u32 { 3 }

fn default_rate_hz() -> u32 { 60 }
fn default_log_interval_polls() -> u64 { 600 }

fn default_log_dir() -> String { "./logs".to_string() }
fn default_max_records_per_file() -> usize { 10000 }
fn default_max_files_to_keep() -> usize { 10 }

fn default_log_level() -> String { "info".to_string() }

fn invalid(msg: impl std::fmt::Display) -> PsxError {
    PsxError::Config(toml::de::Error::custom(msg))
}

impl PinConfig {
    /// Line identifiers for the controller session
    #[must_use]
    pub fn assignment(&self) -> PinAssignment {
        PinAssignment {
            data: self.data,
            command: self.command,
            attention: self.attention,
            clock: self.clock,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the configuration file
    ///
    /// # Returns
    ///
    /// * `Result<Config>` - Loaded and validated configuration
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - File cannot be read
    /// - TOML parsing fails
    /// - Validation fails
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use psx_pad::config::Config;
    ///
    /// let config = Config::load("config/default.toml")?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns error if any configuration value is out of valid range
    fn validate(&self) -> Result<()> {
        // Validate pins
        for (name, pin) in [
            ("data", self.pins.data),
            ("command", self.pins.command),
            ("attention", self.pins.attention),
            ("clock", self.pins.clock),
        ] {
            if pin > MAX_GPIO {
                return Err(invalid(format!("{} pin must be between 0 and {}", name, MAX_GPIO)));
            }
        }

        self.pins
            .assignment()
            .validate()
            .map_err(|e| invalid(e.to_string()))?;

        // Validate controller session
        if !(0.0..=1.0).contains(&self.controller.deadzone) {
            return Err(invalid("deadzone must be between 0.0 and 1.0"));
        }

        if self.controller.half_period_us == 0 || self.controller.half_period_us > 100 {
            return Err(invalid("half_period_us must be between 1 and 100"));
        }

        if self.controller.settle_us == 0 || self.controller.settle_us > 100_000 {
            return Err(invalid("settle_us must be between 1 and 100000"));
        }

        if self.controller.max_retries > 32 {
            return Err(invalid("max_retries must be between 0 and 32"));
        }

        // Validate polling
        if self.polling.rate_hz == 0 || self.polling.rate_hz > 500 {
            return Err(invalid("rate_hz must be between 1 and 500"));
        }

        if self.polling.log_interval_polls == 0 {
            return Err(invalid("log_interval_polls must be greater than 0"));
        }

        // Validate telemetry configuration
        if self.telemetry.enabled && self.telemetry.log_dir.is_empty() {
            return Err(invalid("telemetry log_dir cannot be empty when enabled"));
        }

        if self.telemetry.max_records_per_file == 0 {
            return Err(invalid("max_records_per_file must be greater than 0"));
        }

        if self.telemetry.max_files_to_keep == 0 {
            return Err(invalid("max_files_to_keep must be greater than 0"));
        }

        // Validate log level
        if !["trace", "debug", "info", "warn", "error"].contains(&self.logging.level.as_str()) {
            return Err(invalid("log level must be one of: trace, debug, info, warn, error"));
        }

        Ok(())
    }
}
