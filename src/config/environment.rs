// ABOUTME: Environment configuration management for tracking, reminders, and runtime mode
// ABOUTME: Handles environment variables, .env loading, and typed parsing with validation
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Environment-based configuration
//!
//! | Variable | Default |
//! |----------|---------|
//! | `FITTRACK_DATABASE_URL` | `sqlite:./data/fittrack.db` |
//! | `FITTRACK_HR_MIN_INTERVAL_MS` | `1000` |
//! | `FITTRACK_SIGNIFICANT_MOVEMENT_METERS` | `10` |
//! | `FITTRACK_ACTIVE_MINUTE_MS` | `60000` |
//! | `FITTRACK_HR_RETENTION_DAYS` | `30` |
//! | `FITTRACK_SENSORS` | `heart_rate,step_counter,location` |
//! | `FITTRACK_REMINDER_INTERVAL_SECS` | `7200` |
//! | `FITTRACK_ACTIVE_HOURS` | `8-20` |
//! | `FITTRACK_INACTIVITY_THRESHOLD_SECS` | unset (disabled) |
//! | `ENVIRONMENT` | `development` |
//! | `RUST_LOG` | `info` |

use super::database::DatabaseConfig;
use crate::constants::{reminders, tracking, windows};
use crate::errors::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt::{self, Display};
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info};

/// Strongly typed log level configuration
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Errors only
    Error,
    /// Warnings and errors
    Warn,
    /// Informational (default)
    #[default]
    Info,
    /// Debug output
    Debug,
    /// Everything
    Trace,
}

impl LogLevel {
    /// Convert to `tracing::Level`
    #[must_use]
    pub const fn to_tracing_level(self) -> tracing::Level {
        match self {
            Self::Error => tracing::Level::ERROR,
            Self::Warn => tracing::Level::WARN,
            Self::Info => tracing::Level::INFO,
            Self::Debug => tracing::Level::DEBUG,
            Self::Trace => tracing::Level::TRACE,
        }
    }

    /// Parse from string with fallback
    #[must_use]
    pub fn from_str_or_default(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "error" => Self::Error,
            "warn" => Self::Warn,
            "debug" => Self::Debug,
            "trace" => Self::Trace,
            _ => Self::Info,
        }
    }
}

impl Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Error => write!(f, "error"),
            Self::Warn => write!(f, "warn"),
            Self::Info => write!(f, "info"),
            Self::Debug => write!(f, "debug"),
            Self::Trace => write!(f, "trace"),
        }
    }
}

/// Deployment environment
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Local development
    #[default]
    Development,
    /// Production deployment
    Production,
    /// Test runs
    Testing,
}

impl Environment {
    /// Parse from string with fallback
    #[must_use]
    pub fn from_str_or_default(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            "testing" | "test" => Self::Testing,
            _ => Self::Development,
        }
    }

    /// Check if this is a production environment
    #[must_use]
    pub const fn is_production(self) -> bool {
        matches!(self, Self::Production)
    }
}

impl Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Development => write!(f, "development"),
            Self::Production => write!(f, "production"),
            Self::Testing => write!(f, "testing"),
        }
    }
}

/// Sensors present on the device the engine runs against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SensorCapabilities {
    /// Heart-rate sensor
    pub heart_rate: bool,
    /// Cumulative step counter
    pub step_counter: bool,
    /// Location provider
    pub location: bool,
}

impl SensorCapabilities {
    /// Every sensor available
    #[must_use]
    pub const fn all() -> Self {
        Self {
            heart_rate: true,
            step_counter: true,
            location: true,
        }
    }

    /// No sensors available
    #[must_use]
    pub const fn none() -> Self {
        Self {
            heart_rate: false,
            step_counter: false,
            location: false,
        }
    }

    /// Parse a comma-separated list such as `heart_rate,step_counter`
    ///
    /// # Errors
    ///
    /// Returns an error naming the first unknown sensor
    pub fn parse(list: &str) -> AppResult<Self> {
        let mut caps = Self::none();
        for name in list.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            match name.to_lowercase().as_str() {
                "heart_rate" | "heartrate" | "hr" => caps.heart_rate = true,
                "step_counter" | "steps" => caps.step_counter = true,
                "location" | "gps" => caps.location = true,
                "none" => {}
                other => {
                    return Err(AppError::config_invalid(
                        "FITTRACK_SENSORS",
                        list,
                        format!("unknown sensor '{other}'"),
                    ))
                }
            }
        }
        Ok(caps)
    }
}

impl Default for SensorCapabilities {
    fn default() -> Self {
        Self::all()
    }
}

/// Inclusive hour-of-day window in which inactivity reminders may fire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveHours {
    /// First hour (0-23)
    pub start: u32,
    /// Last hour (0-23), inclusive
    pub end: u32,
}

impl ActiveHours {
    /// Whether `hour` lies inside the window
    #[must_use]
    pub const fn contains(&self, hour: u32) -> bool {
        hour >= self.start && hour <= self.end
    }
}

impl Default for ActiveHours {
    fn default() -> Self {
        Self {
            start: reminders::ACTIVE_HOURS_START,
            end: reminders::ACTIVE_HOURS_END,
        }
    }
}

impl FromStr for ActiveHours {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: &str| AppError::config_invalid("FITTRACK_ACTIVE_HOURS", s, reason);
        let (start, end) = s
            .split_once('-')
            .ok_or_else(|| invalid("expected START-END, e.g. 8-20"))?;
        let start: u32 = start
            .trim()
            .parse()
            .map_err(|_| invalid("start hour is not a number"))?;
        let end: u32 = end
            .trim()
            .parse()
            .map_err(|_| invalid("end hour is not a number"))?;
        if start > 23 || end > 23 {
            return Err(invalid("hours must be between 0 and 23"));
        }
        if start > end {
            return Err(invalid("start hour must not be after end hour"));
        }
        Ok(Self { start, end })
    }
}

impl Display for ActiveHours {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

/// Sensor ingestion thresholds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackingConfig {
    /// Readings closer together than this are debounced
    pub min_heart_rate_interval: Duration,
    /// Location changes below this many meters are ignored
    pub significant_movement_meters: f64,
    /// Elapsed time that counts as one active minute
    pub active_minute_window: Duration,
    /// How long heart-rate samples are kept
    pub heart_rate_retention: Duration,
    /// Sensors present on this device
    pub sensors: SensorCapabilities,
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            min_heart_rate_interval: Duration::from_millis(
                tracking::MIN_HEART_RATE_INTERVAL_MS.unsigned_abs(),
            ),
            significant_movement_meters: tracking::SIGNIFICANT_MOVEMENT_METERS,
            active_minute_window: Duration::from_millis(
                tracking::ACTIVE_MINUTE_WINDOW_MS.unsigned_abs(),
            ),
            heart_rate_retention: retention_days(windows::DEFAULT_HEART_RATE_RETENTION_DAYS),
            sensors: SensorCapabilities::all(),
        }
    }
}

impl TrackingConfig {
    /// Load tracking thresholds from environment
    ///
    /// # Errors
    ///
    /// Returns an error if any threshold fails to parse or is out of range
    pub fn from_env() -> AppResult<Self> {
        let min_interval_ms: u64 = parse_env(
            "FITTRACK_HR_MIN_INTERVAL_MS",
            tracking::MIN_HEART_RATE_INTERVAL_MS.unsigned_abs(),
        )?;
        let movement: f64 = parse_env(
            "FITTRACK_SIGNIFICANT_MOVEMENT_METERS",
            tracking::SIGNIFICANT_MOVEMENT_METERS,
        )?;
        if !movement.is_finite() || movement < 0.0 {
            return Err(AppError::config_invalid(
                "FITTRACK_SIGNIFICANT_MOVEMENT_METERS",
                &movement.to_string(),
                "must be a non-negative number",
            ));
        }
        let active_minute_ms: u64 = parse_env(
            "FITTRACK_ACTIVE_MINUTE_MS",
            tracking::ACTIVE_MINUTE_WINDOW_MS.unsigned_abs(),
        )?;
        if active_minute_ms == 0 {
            return Err(AppError::config_invalid(
                "FITTRACK_ACTIVE_MINUTE_MS",
                "0",
                "must be greater than zero",
            ));
        }
        let retention: u32 = parse_env(
            "FITTRACK_HR_RETENTION_DAYS",
            windows::DEFAULT_HEART_RATE_RETENTION_DAYS,
        )?;
        if retention == 0 {
            return Err(AppError::config_invalid(
                "FITTRACK_HR_RETENTION_DAYS",
                "0",
                "must keep at least one day",
            ));
        }
        let sensors = SensorCapabilities::parse(&env_var_or(
            "FITTRACK_SENSORS",
            "heart_rate,step_counter,location",
        ))?;

        Ok(Self {
            min_heart_rate_interval: Duration::from_millis(min_interval_ms),
            significant_movement_meters: movement,
            active_minute_window: Duration::from_millis(active_minute_ms),
            heart_rate_retention: retention_days(retention),
            sensors,
        })
    }
}

/// Reminder loop settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReminderConfig {
    /// Period between checks
    pub interval: Duration,
    /// Hours in which inactivity reminders may fire
    pub active_hours: ActiveHours,
    /// Minimum time since the last step activity before reminding; disabled when `None`
    pub inactivity_threshold: Option<Duration>,
}

impl Default for ReminderConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(reminders::REMINDER_INTERVAL_SECS),
            active_hours: ActiveHours::default(),
            inactivity_threshold: None,
        }
    }
}

impl ReminderConfig {
    /// Load reminder settings from environment
    ///
    /// # Errors
    ///
    /// Returns an error if the interval, hours, or threshold are invalid
    pub fn from_env() -> AppResult<Self> {
        let interval_secs: u64 = parse_env(
            "FITTRACK_REMINDER_INTERVAL_SECS",
            reminders::REMINDER_INTERVAL_SECS,
        )?;
        if interval_secs == 0 {
            return Err(AppError::config_invalid(
                "FITTRACK_REMINDER_INTERVAL_SECS",
                "0",
                "must be greater than zero",
            ));
        }
        let active_hours: ActiveHours = env_var_or("FITTRACK_ACTIVE_HOURS", "8-20").parse()?;
        let inactivity_threshold = match env::var("FITTRACK_INACTIVITY_THRESHOLD_SECS") {
            Ok(raw) if !raw.trim().is_empty() => {
                let secs: u64 = raw.trim().parse().map_err(|e| {
                    AppError::config_invalid("FITTRACK_INACTIVITY_THRESHOLD_SECS", &raw, e)
                })?;
                Some(Duration::from_secs(secs))
            }
            _ => None,
        };

        Ok(Self {
            interval: Duration::from_secs(interval_secs),
            active_hours,
            inactivity_threshold,
        })
    }
}

/// Complete application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Deployment environment
    pub environment: Environment,
    /// Log level
    pub log_level: LogLevel,
    /// Record store location
    pub database: DatabaseConfig,
    /// Sensor ingestion thresholds
    pub tracking: TrackingConfig,
    /// Reminder loop settings
    pub reminders: ReminderConfig,
}

impl AppConfig {
    /// Load `.env` if present, then read configuration from environment
    ///
    /// # Errors
    ///
    /// Returns an error if any variable is invalid
    pub fn load() -> AppResult<Self> {
        info!("Loading configuration from environment variables");

        // Load .env file if it exists
        if let Err(e) = dotenvy::dotenv() {
            debug!("No .env file loaded: {}", e);
        }

        Self::from_env()
    }

    /// Read configuration from the current process environment
    ///
    /// # Errors
    ///
    /// Returns an error if any variable is invalid
    pub fn from_env() -> AppResult<Self> {
        let config = Self {
            environment: Environment::from_str_or_default(&env_var_or(
                "ENVIRONMENT",
                "development",
            )),
            log_level: LogLevel::from_str_or_default(&env_var_or("RUST_LOG", "info")),
            database: DatabaseConfig::from_env()?,
            tracking: TrackingConfig::from_env()?,
            reminders: ReminderConfig::from_env()?,
        };

        debug!(
            database = %config.database.url,
            reminder_interval_secs = config.reminders.interval.as_secs(),
            active_hours = %config.reminders.active_hours,
            "Configuration loaded"
        );

        Ok(config)
    }

    /// One-line summary for startup logs
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "env={} db={} sensors[hr={},steps={},location={}] reminders[every {}s, hours {}, inactivity {}]",
            self.environment,
            self.database.url,
            self.tracking.sensors.heart_rate,
            self.tracking.sensors.step_counter,
            self.tracking.sensors.location,
            self.reminders.interval.as_secs(),
            self.reminders.active_hours,
            self.reminders
                .inactivity_threshold
                .map_or_else(|| "off".to_owned(), |d| format!("{}s", d.as_secs())),
        )
    }
}

fn retention_days(days: u32) -> Duration {
    Duration::from_secs(u64::from(days) * 24 * 60 * 60)
}

/// Get environment variable or default value when unset or blank
fn env_var_or(key: &str, default: &str) -> String {
    env::var(key)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .unwrap_or_else(|| default.to_owned())
}

/// Parse an environment variable, falling back to `default` when unset
fn parse_env<T>(key: &str, default: T) -> AppResult<T>
where
    T: FromStr,
    T::Err: Display,
{
    match env::var(key) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map_err(|e| AppError::config_invalid(key, &raw, e)),
        _ => Ok(default),
    }
}
