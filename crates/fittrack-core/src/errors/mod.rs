// ABOUTME: Unified error handling for the fittrack engine
// ABOUTME: Defines error codes, the AppError type, and convenience constructors
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Unified Error Handling System
//!
//! Every fallible operation in the workspace returns [`AppResult`]. Store
//! failures originate as [`DatabaseError`] and are folded into [`AppError`]
//! with [`ErrorCode::DatabaseError`] at the repository boundary.

/// Store-level error types
#[cfg(feature = "database-errors")]
pub mod database;

#[cfg(feature = "database-errors")]
pub use database::DatabaseError;

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt;

/// Standard error codes used throughout the application
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorCode {
    // Validation (3000-3999)
    /// Input failed validation
    #[serde(rename = "INVALID_INPUT")]
    InvalidInput = 3000,
    /// A numeric value was outside its accepted range
    #[serde(rename = "VALUE_OUT_OF_RANGE")]
    ValueOutOfRange = 3003,

    // Resource Management (4000-4999)
    /// A device resource (sensor) is not available
    #[serde(rename = "RESOURCE_UNAVAILABLE")]
    ResourceUnavailable = 4003,

    // Configuration (6000-6999)
    /// Configuration value is invalid
    #[serde(rename = "CONFIG_INVALID")]
    ConfigInvalid = 6002,

    // Internal Errors (9000-9999)
    /// Unexpected internal failure
    #[serde(rename = "INTERNAL_ERROR")]
    InternalError = 9000,
    /// Record store operation failed
    #[serde(rename = "DATABASE_ERROR")]
    DatabaseError = 9001,
    /// Serialization or deserialization failed
    #[serde(rename = "SERIALIZATION_ERROR")]
    SerializationError = 9003,
}

impl ErrorCode {
    /// Get a user-friendly description of this error
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::InvalidInput => "The provided input is invalid",
            Self::ValueOutOfRange => "The provided value is outside the acceptable range",
            Self::ResourceUnavailable => "The resource is not available on this device",
            Self::ConfigInvalid => "Configuration is invalid",
            Self::InternalError => "An internal error occurred",
            Self::DatabaseError => "Database operation failed",
            Self::SerializationError => "Data serialization/deserialization failed",
        }
    }

    /// Numeric code, stable across releases
    #[must_use]
    pub const fn as_u16(self) -> u16 {
        self as u16
    }

    /// Whether the error was caused by caller input rather than the system
    #[must_use]
    pub const fn is_client_error(self) -> bool {
        matches!(self, Self::InvalidInput | Self::ValueOutOfRange)
    }
}

/// Unified error type for the application
#[derive(Debug)]
pub struct AppError {
    /// Error code
    pub code: ErrorCode,
    /// Human-readable error message
    pub message: String,
    /// Source error for error chaining
    source: Option<Box<dyn Error + Send + Sync>>,
}

impl AppError {
    /// Create a new `AppError` with the given code and message
    #[must_use]
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            source: None,
        }
    }

    /// Add a source error for error chaining
    #[must_use]
    pub fn with_source(mut self, source: impl Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Invalid input
    #[must_use]
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidInput, message)
    }

    /// Value outside of an accepted range
    #[must_use]
    pub fn value_out_of_range(field: &str, value: impl fmt::Display, min: i64, max: i64) -> Self {
        Self::new(
            ErrorCode::ValueOutOfRange,
            format!("{field}={value} is outside [{min}, {max}]"),
        )
    }

    /// Sensor missing on this device
    #[must_use]
    pub fn sensor_unavailable(sensor: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::ResourceUnavailable,
            format!("{} sensor not available on this device", sensor.into()),
        )
    }

    /// Internal error
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }

    /// Invalid configuration value
    #[must_use]
    pub fn config_invalid(key: &str, value: &str, reason: impl fmt::Display) -> Self {
        Self::new(
            ErrorCode::ConfigInvalid,
            format!("Invalid {key} value '{value}': {reason}"),
        )
    }

    /// Serialization error
    #[must_use]
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::SerializationError, message)
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.description(), self.message)
    }
}

impl Error for AppError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.source
            .as_deref()
            .map(|e| e as &(dyn Error + 'static))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(error: serde_json::Error) -> Self {
        Self::serialization(error.to_string()).with_source(error)
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::internal(format!("I/O error: {error}")).with_source(error)
    }
}

/// Result type alias for convenience
pub type AppResult<T> = Result<T, AppError>;
