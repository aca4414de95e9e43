// ABOUTME: Heart-rate sample model with range and accuracy validation
// ABOUTME: Maps the heart_rate_records table and the sensor accuracy tiers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use crate::constants::heart_rate::{MAX_ACCURACY, MAX_HEART_RATE, MIN_ACCURACY, MIN_HEART_RATE};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single heart-rate measurement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx-types", derive(sqlx::FromRow))]
pub struct HeartRateSample {
    /// Row id assigned by the store (0 before insertion)
    pub id: i64,
    /// Measurement time, epoch milliseconds
    pub timestamp: i64,
    /// Beats per minute
    pub heart_rate: i32,
    /// Sensor confidence tier, see [`SensorAccuracy`]
    pub accuracy: i32,
    /// Optional note or label
    pub note: Option<String>,
}

impl HeartRateSample {
    /// Build an unsaved sample
    #[must_use]
    pub fn new(timestamp: i64, heart_rate: i32, accuracy: i32, note: Option<String>) -> Self {
        Self {
            id: 0,
            timestamp,
            heart_rate,
            accuracy,
            note,
        }
    }

    /// Heart rate lies within the plausible human range
    #[must_use]
    pub const fn is_valid_heart_rate(&self) -> bool {
        is_valid_heart_rate(self.heart_rate)
    }

    /// Accuracy is one of the known tiers
    #[must_use]
    pub const fn is_valid_accuracy(&self) -> bool {
        is_valid_accuracy(self.accuracy)
    }

    /// Both fields are storable
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        self.is_valid_heart_rate() && self.is_valid_accuracy()
    }

    /// Accuracy as a typed tier, if valid
    #[must_use]
    pub const fn accuracy_tier(&self) -> Option<SensorAccuracy> {
        SensorAccuracy::from_raw(self.accuracy)
    }
}

/// `40 ≤ bpm ≤ 220`
#[must_use]
pub const fn is_valid_heart_rate(bpm: i32) -> bool {
    bpm >= MIN_HEART_RATE && bpm <= MAX_HEART_RATE
}

/// `0 ≤ accuracy ≤ 3`
#[must_use]
pub const fn is_valid_accuracy(accuracy: i32) -> bool {
    accuracy >= MIN_ACCURACY && accuracy <= MAX_ACCURACY
}

/// Sensor-reported confidence attached to a measurement
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SensorAccuracy {
    /// Reading should not be trusted
    Unreliable = 0,
    /// Low confidence
    Low = 1,
    /// Medium confidence
    Medium = 2,
    /// High confidence
    High = 3,
}

impl SensorAccuracy {
    /// Map the raw sensor value
    #[must_use]
    pub const fn from_raw(raw: i32) -> Option<Self> {
        match raw {
            0 => Some(Self::Unreliable),
            1 => Some(Self::Low),
            2 => Some(Self::Medium),
            3 => Some(Self::High),
            _ => None,
        }
    }

    /// Raw integer stored in the table
    #[must_use]
    pub const fn as_raw(self) -> i32 {
        self as i32
    }
}

impl fmt::Display for SensorAccuracy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unreliable => write!(f, "unreliable"),
            Self::Low => write!(f, "low"),
            Self::Medium => write!(f, "medium"),
            Self::High => write!(f, "high"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heart_rate_range_boundaries() {
        assert!(!is_valid_heart_rate(39));
        assert!(is_valid_heart_rate(40));
        assert!(is_valid_heart_rate(72));
        assert!(is_valid_heart_rate(220));
        assert!(!is_valid_heart_rate(221));
        assert!(!is_valid_heart_rate(250));
    }

    #[test]
    fn test_accuracy_tiers() {
        assert!(!is_valid_accuracy(-1));
        assert!(is_valid_accuracy(0));
        assert!(is_valid_accuracy(3));
        assert!(!is_valid_accuracy(4));
        assert_eq!(SensorAccuracy::from_raw(2), Some(SensorAccuracy::Medium));
        assert_eq!(SensorAccuracy::High.as_raw(), 3);
    }

    #[test]
    fn test_sample_validation_requires_both_fields() {
        assert!(HeartRateSample::new(0, 72, 2, None).is_valid());
        assert!(!HeartRateSample::new(0, 72, 5, None).is_valid());
        assert!(!HeartRateSample::new(0, 250, 2, None).is_valid());
    }
}
