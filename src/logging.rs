// ABOUTME: Structured logging setup for the daemon and CLI commands
// ABOUTME: Builds the tracing subscriber from RUST_LOG, LOG_FORMAT, and the deployment environment
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Structured logging configuration
//!
//! All output goes to stderr so command results on stdout stay
//! machine-readable.

use crate::config::{Environment, LogLevel};
use crate::constants::service_names;
use anyhow::Result;
use std::env;
use std::io;
use tracing::{debug, info};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Dependencies whose logs are capped at `warn`
const QUIET_TARGETS: [&str; 2] = ["sqlx", "sqlx::query"];

/// Log output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// One `JSON` object per line
    Json,
    /// Multi-field human output
    Pretty,
    /// Single-line terminal output
    Compact,
}

impl LogFormat {
    /// Parse `json`, `pretty` or `compact`, defaulting to pretty
    #[must_use]
    pub fn from_str_or_default(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "json" => Self::Json,
            "compact" => Self::Compact,
            _ => Self::Pretty,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Level for fittrack targets
    pub level: LogLevel,
    /// Output format
    pub format: LogFormat,
    /// Include source file and line numbers
    pub include_location: bool,
    /// Include thread ids and names
    pub include_thread: bool,
    /// Deployment environment
    pub environment: Environment,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            format: LogFormat::Pretty,
            include_location: false,
            include_thread: false,
            environment: Environment::Development,
        }
    }
}

impl LoggingConfig {
    /// Read `RUST_LOG`, `LOG_FORMAT`, `LOG_INCLUDE_LOCATION`, `LOG_INCLUDE_THREAD`, and `ENVIRONMENT`
    ///
    /// Production defaults to `JSON` output with locations and threads.
    #[must_use]
    pub fn from_env() -> Self {
        let environment = env::var("ENVIRONMENT")
            .map(|value| Environment::from_str_or_default(&value))
            .unwrap_or_default();
        let production = environment.is_production();
        let format = env::var("LOG_FORMAT").map_or(
            if production {
                LogFormat::Json
            } else {
                LogFormat::Pretty
            },
            |value| LogFormat::from_str_or_default(&value),
        );

        Self {
            level: env::var("RUST_LOG")
                .map(|value| LogLevel::from_str_or_default(&value))
                .unwrap_or_default(),
            format,
            include_location: production || env::var("LOG_INCLUDE_LOCATION").is_ok(),
            include_thread: production || env::var("LOG_INCLUDE_THREAD").is_ok(),
            environment,
        }
    }

    /// Same configuration with another level
    #[must_use]
    pub const fn with_level(mut self, level: LogLevel) -> Self {
        self.level = level;
        self
    }

    /// Filter from `RUST_LOG` (or the configured level) with noisy dependencies capped
    #[must_use]
    pub fn env_filter(&self) -> EnvFilter {
        let mut filter = env::var("RUST_LOG").map_or_else(
            |_| EnvFilter::new(self.level.to_string()),
            |directive| EnvFilter::new(&directive),
        );

        for target in QUIET_TARGETS {
            filter = filter.add_directive(
                format!("{target}=warn")
                    .parse()
                    .unwrap_or_else(|_| tracing::Level::WARN.into()),
            );
        }

        filter.add_directive(
            format!("{}={}", service_names::FITTRACK, self.level)
                .parse()
                .unwrap_or_else(|_| self.level.to_tracing_level().into()),
        )
    }

    /// Install the global tracing subscriber
    ///
    /// # Errors
    ///
    /// Returns an error if a global subscriber is already installed
    pub fn init(&self) -> Result<()> {
        let registry = tracing_subscriber::registry().with(self.env_filter());

        match self.format {
            LogFormat::Json => registry
                .with(
                    fmt::layer()
                        .json()
                        .with_file(self.include_location)
                        .with_line_number(self.include_location)
                        .with_thread_ids(self.include_thread)
                        .with_thread_names(self.include_thread)
                        .with_writer(io::stderr),
                )
                .try_init()?,
            LogFormat::Pretty => registry
                .with(
                    fmt::layer()
                        .with_file(self.include_location)
                        .with_line_number(self.include_location)
                        .with_thread_ids(self.include_thread)
                        .with_thread_names(self.include_thread)
                        .with_writer(io::stderr),
                )
                .try_init()?,
            LogFormat::Compact => registry
                .with(
                    fmt::layer()
                        .compact()
                        .with_target(false)
                        .with_writer(io::stderr),
                )
                .try_init()?,
        }

        info!(
            service = service_names::FITTRACK,
            version = env!("CARGO_PKG_VERSION"),
            environment = %self.environment,
            level = %self.level,
            "Logging initialized"
        );
        debug!(format = ?self.format, location = self.include_location, "Log output configured");

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_format_parsing() {
        assert_eq!(LogFormat::from_str_or_default("JSON"), LogFormat::Json);
        assert_eq!(LogFormat::from_str_or_default("compact"), LogFormat::Compact);
        assert_eq!(LogFormat::from_str_or_default("fancy"), LogFormat::Pretty);
    }

    #[test]
    fn test_with_level_overrides() {
        let config = LoggingConfig::default().with_level(LogLevel::Debug);
        assert_eq!(config.level, LogLevel::Debug);
        assert_eq!(config.environment, Environment::Development);
    }
}
