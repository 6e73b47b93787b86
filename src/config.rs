//! # Configuration Module
//!
//! Handles loading and validating configuration from TOML files.

use serde::de::Error;
use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::bus::{BusSettings, SpiMode};
use crate::error::{PadError, Result};
use crate::pad::MAX_PADS;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub bus: BusConfig,
    #[serde(default)]
    pub pads: PadsConfig,
    #[serde(default)]
    pub poll: PollConfig,
}

/// SPI bus configuration
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct BusConfig {
    #[serde(default = "default_bus")]
    pub bus: u8,

    #[serde(default = "default_slave_selects")]
    pub slave_selects: Vec<u8>,

    #[serde(default = "default_mode")]
    pub mode: SpiMode,

    #[serde(default = "default_bits_per_word")]
    pub bits_per_word: u8,

    #[serde(default = "default_clock_hz")]
    pub clock_hz: u32,

    #[serde(default = "default_delay_us")]
    pub delay_us: u16,
}

/// Pad configuration applied at startup
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct PadsConfig {
    #[serde(default = "default_pad_count")]
    pub count: usize,

    #[serde(default = "default_analog")]
    pub analog: bool,

    #[serde(default = "default_lock")]
    pub lock: bool,

    #[serde(default)]
    pub motor1: bool,

    #[serde(default)]
    pub motor2: bool,
}

/// Polling loop configuration
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct PollConfig {
    #[serde(default = "default_interval_us")]
    pub interval_us: u64,

    #[serde(default = "default_status_interval_polls")]
    pub status_interval_polls: u64,

    #[serde(default)]
    pub dump_raw: bool,
}

// Default value functions
fn default_bus() -> u8 { 0 }
fn default_slave_selects() -> Vec<u8> { vec![0] }
fn default_mode() -> SpiMode { SpiMode::Mode3 }
fn default_bits_per_word() -> u8 { 8 }
fn default_clock_hz() -> u32 { 125_000 }
fn default_delay_us() -> u16 { 100 }

fn default_pad_count() -> usize { 1 }
fn default_analog() -> bool { true }
fn default_lock() -> bool { true }

fn default_interval_us() -> u64 { 16_666 }
fn default_status_interval_polls() -> u64 { 600 }

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            bus: default_bus(),
            slave_selects: default_slave_selects(),
            mode: default_mode(),
            bits_per_word: default_bits_per_word(),
            clock_hz: default_clock_hz(),
            delay_us: default_delay_us(),
        }
    }
}

impl Default for PadsConfig {
    fn default() -> Self {
        Self {
            count: default_pad_count(),
            analog: default_analog(),
            lock: default_lock(),
            motor1: false,
            motor2: false,
        }
    }
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval_us: default_interval_us(),
            status_interval_polls: default_status_interval_polls(),
            dump_raw: false,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bus: BusConfig::default(),
            pads: PadsConfig::default(),
            poll: PollConfig::default(),
        }
    }
}

impl BusConfig {
    /// Settings handed to the transport at startup
    pub fn settings(&self) -> BusSettings {
        BusSettings {
            mode: self.mode,
            bits_per_word: self.bits_per_word,
            clock_hz: self.clock_hz,
            delay_us: self.delay_us,
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
    /// use psxpad::config::Config;
    ///
    /// let config = Config::load("config/default.toml")?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    /// Parse and validate configuration from a TOML string
    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns error if any configuration value is out of valid range
    pub fn validate(&self) -> Result<()> {
        if self.bus.bus > 6 {
            return Err(invalid("bus must be between 0 and 6"));
        }

        if self.bus.bits_per_word != 8 {
            return Err(invalid("bits_per_word must be 8"));
        }

        if self.bus.clock_hz < 1_000 || self.bus.clock_hz > 1_000_000 {
            return Err(invalid("clock_hz must be between 1000 and 1000000"));
        }

        if self.pads.count == 0 || self.pads.count > MAX_PADS {
            return Err(invalid(format!("pads.count must be between 1 and {}", MAX_PADS)));
        }

        // One slave-select line per pad
        if self.bus.slave_selects.len() != self.pads.count {
            return Err(invalid(format!(
                "slave_selects lists {} line(s) but pads.count is {}",
                self.bus.slave_selects.len(),
                self.pads.count
            )));
        }

        for (i, ss) in self.bus.slave_selects.iter().enumerate() {
            if self.bus.slave_selects[..i].contains(ss) {
                return Err(invalid(format!("slave select {} is listed twice", ss)));
            }
        }

        if self.poll.interval_us == 0 || self.poll.interval_us > 1_000_000 {
            return Err(invalid("interval_us must be between 1 and 1000000"));
        }

        if self.poll.status_interval_polls == 0 {
            return Err(invalid("status_interval_polls must be greater than 0"));
        }

        Ok(())
    }
}

fn invalid(msg: impl std::fmt::Display) -> PadError {
    PadError::Config(toml::de::Error::custom(msg))
}
