//! Configuration loading traits and types.
//!
//! The pod is configured from a single TOML file (`pod.toml`) plus the
//! tab-delimited abort-range table it points at (see [`crate::abort`]).
//!
//! # Usage
//!
//! ```rust,no_run
//! use pod_common::config::{ConfigLoader, ConfigError, PodConfig};
//! use std::path::Path;
//!
//! fn main() -> Result<(), ConfigError> {
//!     let config = PodConfig::load(Path::new("config/pod.toml"))?;
//!     config.validate()?;
//!     println!("BBP: {} ft", config.flight.begin_braking_distance);
//!     Ok(())
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::command::CommandVector;
use crate::consts::{
    DEFAULT_ABORT_TABLE, DEFAULT_BRAKE_READY_PRESSURE, DEFAULT_BRAKING_STOP_SPEED,
    DEFAULT_CRAWL_SPEED, DEFAULT_FINAL_STOP_SPEED, DEFAULT_LOG_DIR, DEFAULT_LOG_RATE_HZ,
    DEFAULT_POLL_INTERVAL_MS, DEFAULT_REPRESSURIZE_TIMEOUT_S, DEFAULT_TEAM_ID,
    DEFAULT_TELEMETRY_ENDPOINT, DEFAULT_TELEMETRY_RATE_HZ,
};

/// Error type for configuration loading operations.
///
/// Every variant is fatal at startup: the pod never enters the cycle loop
/// with a configuration that failed to load.
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    /// Configuration file not found at specified path.
    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    /// TOML parsing failed.
    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    /// Semantic validation failed.
    #[error("Configuration validation failed: {0}")]
    ValidationError(String),

    /// Malformed row in the abort-range table.
    #[error("Abort table line {line}: {reason}")]
    AbortTable {
        /// 1-based line number in the table file.
        line: usize,
        /// What was wrong with it.
        reason: String,
    },
}

/// Trait for loading configuration from TOML files.
///
/// Blanket-implemented for every `DeserializeOwned` type.
///
/// # Contract
///
/// - Returns `ConfigError::FileNotFound` if the file does not exist
/// - Returns `ConfigError::ParseError` if TOML syntax is invalid
pub trait ConfigLoader: Sized + serde::de::DeserializeOwned {
    /// Load configuration from a TOML file.
    fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = read_config_file(path)?;
        toml::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }
}

impl<T: serde::de::DeserializeOwned> ConfigLoader for T {}

/// Read a configuration file, mapping a missing file to `FileNotFound`.
pub fn read_config_file(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            ConfigError::FileNotFound(path.display().to_string())
        } else {
            ConfigError::ParseError(format!("{}: {e}", path.display()))
        }
    })
}

// ─── Top-Level Config ───────────────────────────────────────────────

/// Complete pod configuration (`pod.toml`).
///
/// # TOML Example
///
/// ```toml
/// abort_ranges = "abortranges.dat"
///
/// [flight]
/// begin_braking_distance = 3228.0
/// max_accel = 1.0
/// max_speed = 396.0
/// max_time = 15.0
///
/// [telemetry]
/// team_id = 69
/// endpoint = "192.168.0.1:3000"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PodConfig {
    /// Path to the abort-range table, relative to the config file.
    #[serde(default = "default_abort_ranges")]
    pub abort_ranges: PathBuf,

    #[serde(default)]
    pub flight: FlightParameters,

    #[serde(default)]
    pub thresholds: Thresholds,

    #[serde(default)]
    pub telemetry: TelemetryConfig,

    #[serde(default)]
    pub log: LogConfig,

    #[serde(default)]
    pub cycle: CycleConfig,

    /// Initial command vector (the command table).
    #[serde(default)]
    pub commands: CommandVector,
}

fn default_abort_ranges() -> PathBuf {
    PathBuf::from(DEFAULT_ABORT_TABLE)
}

impl Default for PodConfig {
    fn default() -> Self {
        Self {
            abort_ranges: default_abort_ranges(),
            flight: FlightParameters::default(),
            thresholds: Thresholds::default(),
            telemetry: TelemetryConfig::default(),
            log: LogConfig::default(),
            cycle: CycleConfig::default(),
            commands: CommandVector::default(),
        }
    }
}

impl PodConfig {
    /// Validate parameter bounds.
    ///
    /// Flight parameters may be zero (the pod then never reports ready to
    /// launch) but must not be negative or non-finite.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.flight.validate()?;
        self.thresholds.validate()?;
        require_positive("telemetry.rate_hz", self.telemetry.rate_hz)?;
        require_positive("log.rate_hz", self.log.rate_hz)?;
        require_duration("telemetry.rate_hz period", 1.0 / self.telemetry.rate_hz)?;
        require_duration("log.rate_hz period", 1.0 / self.log.rate_hz)?;
        if self.telemetry.endpoint.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "telemetry.endpoint cannot be empty".to_string(),
            ));
        }
        if self.cycle.poll_interval_ms == 0 {
            return Err(ConfigError::ValidationError(
                "cycle.poll_interval_ms must be > 0".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.commands.throttle) {
            return Err(ConfigError::ValidationError(format!(
                "commands.throttle {} out of range [0, 1]",
                self.commands.throttle
            )));
        }
        Ok(())
    }

    /// Resolve the abort table path against the directory of `config_path`.
    pub fn abort_table_path(&self, config_path: &Path) -> PathBuf {
        if self.abort_ranges.is_absolute() {
            return self.abort_ranges.clone();
        }
        match config_path.parent() {
            Some(dir) => dir.join(&self.abort_ranges),
            None => self.abort_ranges.clone(),
        }
    }
}

fn require_non_negative(name: &str, value: f64) -> Result<(), ConfigError> {
    if !value.is_finite() || value < 0.0 {
        return Err(ConfigError::ValidationError(format!(
            "{name} must be a finite value >= 0, got {value}"
        )));
    }
    Ok(())
}

/// `seconds` must be representable as a `Duration`.
fn require_duration(name: &str, seconds: f64) -> Result<(), ConfigError> {
    Duration::try_from_secs_f64(seconds)
        .map(|_| ())
        .map_err(|e| ConfigError::ValidationError(format!("{name} of {seconds} s: {e}")))
}

fn require_positive(name: &str, value: f64) -> Result<(), ConfigError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(ConfigError::ValidationError(format!(
            "{name} must be a finite value > 0, got {value}"
        )));
    }
    Ok(())
}

// ─── Flight Parameters ──────────────────────────────────────────────

/// Pre-flight parameters entered by the operator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FlightParameters {
    /// Begin-braking point [ft].
    #[serde(default)]
    pub begin_braking_distance: f64,
    /// Target launch acceleration [G].
    #[serde(default)]
    pub max_accel: f64,
    /// Launch speed limit [ft/s].
    #[serde(default)]
    pub max_speed: f64,
    /// Launch duration limit [s].
    #[serde(default)]
    pub max_time: f64,
    /// Crawl speed target [ft/s].
    #[serde(default = "default_crawl_speed")]
    pub crawl_speed: f64,
}

fn default_crawl_speed() -> f64 {
    DEFAULT_CRAWL_SPEED
}

impl Default for FlightParameters {
    fn default() -> Self {
        Self {
            begin_braking_distance: 0.0,
            max_accel: 0.0,
            max_speed: 0.0,
            max_time: 0.0,
            crawl_speed: DEFAULT_CRAWL_SPEED,
        }
    }
}

impl FlightParameters {
    /// True when every launch parameter has been set to a positive value.
    #[inline]
    pub fn all_set(&self) -> bool {
        self.begin_braking_distance > 0.0
            && self.max_accel > 0.0
            && self.max_speed > 0.0
            && self.max_time > 0.0
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        require_non_negative("flight.begin_braking_distance", self.begin_braking_distance)?;
        require_non_negative("flight.max_accel", self.max_accel)?;
        require_non_negative("flight.max_speed", self.max_speed)?;
        require_non_negative("flight.max_time", self.max_time)?;
        require_non_negative("flight.crawl_speed", self.crawl_speed)?;
        Ok(())
    }
}

// ─── Thresholds ─────────────────────────────────────────────────────

/// State exit thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Thresholds {
    /// Brake pressure at which brakes are released / re-pressurized [psi].
    #[serde(default = "default_brake_ready_pressure")]
    pub brake_ready_pressure: f64,
    /// BrakingHigh is considered stopped below this speed [ft/s].
    #[serde(default = "default_braking_stop_speed")]
    pub braking_stop_speed: f64,
    /// BrakingLow is considered stopped below this speed [ft/s].
    #[serde(default = "default_final_stop_speed")]
    pub final_stop_speed: f64,
    /// Re-pressurization wait limit [s].
    #[serde(default = "default_repressurize_timeout")]
    pub repressurize_timeout: f64,
}

fn default_brake_ready_pressure() -> f64 {
    DEFAULT_BRAKE_READY_PRESSURE
}
fn default_braking_stop_speed() -> f64 {
    DEFAULT_BRAKING_STOP_SPEED
}
fn default_final_stop_speed() -> f64 {
    DEFAULT_FINAL_STOP_SPEED
}
fn default_repressurize_timeout() -> f64 {
    DEFAULT_REPRESSURIZE_TIMEOUT_S
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            brake_ready_pressure: DEFAULT_BRAKE_READY_PRESSURE,
            braking_stop_speed: DEFAULT_BRAKING_STOP_SPEED,
            final_stop_speed: DEFAULT_FINAL_STOP_SPEED,
            repressurize_timeout: DEFAULT_REPRESSURIZE_TIMEOUT_S,
        }
    }
}

impl Thresholds {
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_positive("thresholds.brake_ready_pressure", self.brake_ready_pressure)?;
        require_positive("thresholds.braking_stop_speed", self.braking_stop_speed)?;
        require_positive("thresholds.final_stop_speed", self.final_stop_speed)?;
        require_positive("thresholds.repressurize_timeout", self.repressurize_timeout)?;
        require_duration("thresholds.repressurize_timeout", self.repressurize_timeout)?;
        Ok(())
    }

    /// Re-pressurization wait limit as a `Duration`.
    #[inline]
    pub fn repressurize_timeout(&self) -> Duration {
        Duration::from_secs_f64(self.repressurize_timeout)
    }
}

// ─── Telemetry / Log ────────────────────────────────────────────────

/// Telemetry datagram settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TelemetryConfig {
    #[serde(default = "default_team_id")]
    pub team_id: u8,
    /// `host:port` of the telemetry receiver.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// Send rate [Hz].
    #[serde(default = "default_telemetry_rate")]
    pub rate_hz: f64,
}

fn default_team_id() -> u8 {
    DEFAULT_TEAM_ID
}
fn default_endpoint() -> String {
    DEFAULT_TELEMETRY_ENDPOINT.to_string()
}
fn default_telemetry_rate() -> f64 {
    DEFAULT_TELEMETRY_RATE_HZ
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            team_id: DEFAULT_TEAM_ID,
            endpoint: default_endpoint(),
            rate_hz: DEFAULT_TELEMETRY_RATE_HZ,
        }
    }
}

/// Data log settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LogConfig {
    /// Directory receiving one log file per session.
    #[serde(default = "default_log_dir")]
    pub directory: PathBuf,
    /// Write rate [Hz].
    #[serde(default = "default_log_rate")]
    pub rate_hz: f64,
}

fn default_log_dir() -> PathBuf {
    PathBuf::from(DEFAULT_LOG_DIR)
}
fn default_log_rate() -> f64 {
    DEFAULT_LOG_RATE_HZ
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            directory: default_log_dir(),
            rate_hz: DEFAULT_LOG_RATE_HZ,
        }
    }
}

/// Cycle pacing.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CycleConfig {
    /// Sleep between cycles [ms].
    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u64,
}

fn default_poll_interval() -> u64 {
    DEFAULT_POLL_INTERVAL_MS
}

impl Default for CycleConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }
}

impl CycleConfig {
    #[inline]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}
