// ABOUTME: Constants module with domain-separated organization
// ABOUTME: Validation ranges, tracking thresholds, reminder timings, and time windows
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Constants module
//!
//! Constants are grouped by domain rather than being kept in a single flat list.

/// Heart-rate sample validation
pub mod heart_rate {
    /// Lowest plausible heart rate (BPM)
    pub const MIN_HEART_RATE: i32 = 40;
    /// Highest plausible heart rate (BPM)
    pub const MAX_HEART_RATE: i32 = 220;
    /// Lowest sensor accuracy tier (unreliable)
    pub const MIN_ACCURACY: i32 = 0;
    /// Highest sensor accuracy tier (high)
    pub const MAX_ACCURACY: i32 = 3;
}

/// Daily walking record rules
pub mod walking {
    /// Step goal assigned to new records
    pub const DEFAULT_DAILY_GOAL: i64 = 10_000;
    /// Smallest accepted daily goal
    pub const MIN_DAILY_GOAL: i64 = 1_000;
    /// Largest accepted daily goal
    pub const MAX_DAILY_GOAL: i64 = 100_000;
    /// Upper bound for a plausible daily step count
    pub const MAX_DAILY_STEPS: i64 = 100_000;
    /// Average stride length in meters (about 30 inches)
    pub const DEFAULT_STRIDE_LENGTH_METERS: f64 = 0.762;
    /// Rough calories burned per step
    pub const CALORIES_PER_STEP: f64 = 0.04;
    /// Step counts that trigger a milestone event when first crossed in a day
    pub const STEP_MILESTONES: [i64; 5] = [1_000, 5_000, 10_000, 20_000, 50_000];
}

/// Sensor ingestion thresholds
pub mod tracking {
    /// Minimum time between two accepted heart-rate readings
    pub const MIN_HEART_RATE_INTERVAL_MS: i64 = 1_000;
    /// Location changes below this distance are ignored
    pub const SIGNIFICANT_MOVEMENT_METERS: f64 = 10.0;
    /// Length of the window that counts as one active minute
    pub const ACTIVE_MINUTE_WINDOW_MS: i64 = 60_000;
    /// Mean Earth radius used for great-circle distances
    pub const EARTH_RADIUS_METERS: f64 = 6_371_008.8;
}

/// Reminder loop timing and notification identifiers
pub mod reminders {
    /// Period between two reminder checks (2 hours)
    pub const REMINDER_INTERVAL_SECS: u64 = 2 * 60 * 60;
    /// First hour of the day (inclusive) in which inactivity reminders fire
    pub const ACTIVE_HOURS_START: u32 = 8;
    /// Last hour of the day (inclusive) in which inactivity reminders fire
    pub const ACTIVE_HOURS_END: u32 = 20;
    /// Notification channel shared by all reminders
    pub const NOTIFICATION_CHANNEL_ID: &str = "fitness_reminders";
    /// Single notification slot reused by every reminder
    pub const NOTIFICATION_ID: i32 = 1001;
}

/// Rolling windows and retention
pub mod windows {
    /// One day in milliseconds
    pub const ONE_DAY_MS: i64 = 24 * 60 * 60 * 1000;
    /// One week in milliseconds
    pub const ONE_WEEK_MS: i64 = 7 * ONE_DAY_MS;
    /// Thirty days in milliseconds
    pub const ONE_MONTH_MS: i64 = 30 * ONE_DAY_MS;
    /// Default heart-rate retention in days
    pub const DEFAULT_HEART_RATE_RETENTION_DAYS: u32 = 30;
}

/// Service names used in structured logs
pub mod service_names {
    /// Default service name
    pub const FITTRACK: &str = "fittrack";
}
