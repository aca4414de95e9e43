// ABOUTME: Sensor events as tagged JSON objects, one per line on the daemon's input
// ABOUTME: Covers heart-rate readings, step counter values, location fixes, and accuracy changes
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! ```json
//! {"type":"heart_rate","bpm":72,"accuracy":3}
//! {"type":"step_counter","value":10450}
//! {"type":"location","latitude":48.8566,"longitude":2.3522}
//! {"type":"accuracy_changed","sensor":"heart_rate","accuracy":1}
//! ```

use crate::constants::heart_rate::MAX_ACCURACY;
use crate::errors::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Sensor a callback came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SensorKind {
    /// Heart-rate sensor
    HeartRate,
    /// Cumulative step counter
    StepCounter,
    /// Location provider
    Location,
}

impl SensorKind {
    /// Name used in logs and analytics
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::HeartRate => "heart_rate",
            Self::StepCounter => "step_counter",
            Self::Location => "location",
        }
    }
}

impl fmt::Display for SensorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

const fn default_accuracy() -> i32 {
    MAX_ACCURACY
}

/// One sensor callback
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SensorEvent {
    /// Heart-rate reading
    HeartRate {
        /// Beats per minute
        bpm: i32,
        /// Accuracy tier, high when omitted
        #[serde(default = "default_accuracy")]
        accuracy: i32,
        /// Reading time in epoch milliseconds, now when omitted
        #[serde(default)]
        timestamp: Option<i64>,
    },
    /// Cumulative step counter value since sensor boot
    StepCounter {
        /// Counter value
        value: i64,
    },
    /// Location fix
    Location {
        /// Latitude, degrees
        latitude: f64,
        /// Longitude, degrees
        longitude: f64,
    },
    /// Sensor accuracy changed
    AccuracyChanged {
        /// Sensor concerned
        sensor: SensorKind,
        /// New accuracy tier
        accuracy: i32,
    },
}

impl SensorEvent {
    /// Parse one input line; blank lines and `#` comments yield `None`
    ///
    /// # Errors
    ///
    /// Returns an error if the line is not a valid event
    pub fn parse_line(line: &str) -> AppResult<Option<Self>> {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            return Ok(None);
        }
        serde_json::from_str(trimmed)
            .map(Some)
            .map_err(|e| AppError::invalid_input(format!("invalid sensor event: {e}")))
    }

    /// Sensor the event belongs to
    #[must_use]
    pub const fn sensor(&self) -> SensorKind {
        match self {
            Self::HeartRate { .. } => SensorKind::HeartRate,
            Self::StepCounter { .. } => SensorKind::StepCounter,
            Self::Location { .. } => SensorKind::Location,
            Self::AccuracyChanged { sensor, .. } => *sensor,
        }
    }
}
