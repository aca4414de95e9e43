// ABOUTME: Millisecond timestamp helpers, inclusive time ranges, and calendar-day bounds
// ABOUTME: Provides the Clock abstraction so trackers and reminders can run on simulated time
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Timestamps throughout the workspace are Unix epoch milliseconds (`i64`),
//! matching the representation stored in the record tables. Calendar-day
//! boundaries and hour-of-day are evaluated in the local time zone.

use crate::constants::windows::{ONE_DAY_MS, ONE_MONTH_MS, ONE_WEEK_MS};
use chrono::{DateTime, Days, Local, LocalResult, NaiveTime, TimeZone, Timelike, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

/// Source of the current time
pub trait Clock: Send + Sync {
    /// Current time as epoch milliseconds
    fn now_millis(&self) -> i64;
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        Utc::now().timestamp_millis()
    }
}

/// Manually driven clock, shared between clones
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Arc<AtomicI64>,
}

impl ManualClock {
    /// Create a clock frozen at `now_millis`
    #[must_use]
    pub fn new(now_millis: i64) -> Self {
        Self {
            now: Arc::new(AtomicI64::new(now_millis)),
        }
    }

    /// Jump to an absolute time
    pub fn set(&self, now_millis: i64) {
        self.now.store(now_millis, Ordering::SeqCst);
    }

    /// Move forward by `millis`
    pub fn advance(&self, millis: i64) {
        self.now.fetch_add(millis, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_millis(&self) -> i64 {
        self.now.load(Ordering::SeqCst)
    }
}

/// Inclusive `[start, end]` range of epoch milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    /// First included millisecond
    pub start_ms: i64,
    /// Last included millisecond
    pub end_ms: i64,
}

impl TimeRange {
    /// Range between two timestamps
    #[must_use]
    pub const fn new(start_ms: i64, end_ms: i64) -> Self {
        Self { start_ms, end_ms }
    }

    /// Range from `start_ms` up to the clock's current time
    #[must_use]
    pub fn until_now(start_ms: i64, clock: &dyn Clock) -> Self {
        Self::new(start_ms, clock.now_millis())
    }

    /// Whether `timestamp_ms` lies inside the range
    #[must_use]
    pub const fn contains(&self, timestamp_ms: i64) -> bool {
        timestamp_ms >= self.start_ms && timestamp_ms <= self.end_ms
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.start_ms, self.end_ms)
    }
}

/// Rolling look-back windows used by history and statistics queries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Window {
    /// Last 24 hours
    Day,
    /// Last 7 days
    Week,
    /// Last 30 days
    Month,
}

impl Window {
    /// Window length in milliseconds
    #[must_use]
    pub const fn duration_ms(self) -> i64 {
        match self {
            Self::Day => ONE_DAY_MS,
            Self::Week => ONE_WEEK_MS,
            Self::Month => ONE_MONTH_MS,
        }
    }

    /// Range covering this window and ending at `now_ms`
    #[must_use]
    pub const fn ending_at(self, now_ms: i64) -> TimeRange {
        TimeRange::new(now_ms - self.duration_ms(), now_ms)
    }

    /// Parse `day`, `week` or `month`
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "day" | "today" | "24h" => Some(Self::Day),
            "week" | "7d" => Some(Self::Week),
            "month" | "30d" => Some(Self::Month),
            _ => None,
        }
    }
}

fn local_datetime(timestamp_ms: i64) -> DateTime<Local> {
    match Local.timestamp_millis_opt(timestamp_ms) {
        LocalResult::Single(dt) | LocalResult::Ambiguous(dt, _) => dt,
        LocalResult::None => DateTime::<Utc>::UNIX_EPOCH.with_timezone(&Local),
    }
}

fn local_midnight_millis(date: chrono::NaiveDate) -> i64 {
    local_naive_millis(date.and_time(NaiveTime::MIN))
}

fn local_naive_millis(naive: chrono::NaiveDateTime) -> i64 {
    match Local.from_local_datetime(&naive) {
        LocalResult::Single(dt) | LocalResult::Ambiguous(dt, _) => dt.timestamp_millis(),
        // Midnight skipped by a DST transition; fall back to the UTC reading
        LocalResult::None => naive.and_utc().timestamp_millis(),
    }
}

/// Local calendar day containing `timestamp_ms`, as `[00:00:00.000, 23:59:59.999]`
#[must_use]
pub fn day_bounds(timestamp_ms: i64) -> TimeRange {
    let date = local_datetime(timestamp_ms).date_naive();
    let start = local_midnight_millis(date);
    let end = date
        .checked_add_days(Days::new(1))
        .map_or(start + ONE_DAY_MS, local_midnight_millis)
        - 1;
    TimeRange::new(start, end)
}

/// Start of the local calendar day containing `timestamp_ms`
#[must_use]
pub fn start_of_day(timestamp_ms: i64) -> i64 {
    day_bounds(timestamp_ms).start_ms
}

/// Local hour of day (0-23)
#[must_use]
pub fn local_hour(timestamp_ms: i64) -> u32 {
    local_datetime(timestamp_ms).hour()
}

/// Whether both timestamps fall on the same local calendar day
#[must_use]
pub fn same_local_day(a_ms: i64, b_ms: i64) -> bool {
    local_datetime(a_ms).date_naive() == local_datetime(b_ms).date_naive()
}

/// Local timestamp for `hour:00` on the day containing `timestamp_ms`
#[must_use]
pub fn at_local_hour(timestamp_ms: i64, hour: u32) -> i64 {
    let date = local_datetime(timestamp_ms).date_naive();
    date.and_hms_opt(hour, 0, 0)
        .map_or_else(|| start_of_day(timestamp_ms), local_naive_millis)
}

/// RFC 3339 rendering of a timestamp in local time
#[must_use]
pub fn format_local(timestamp_ms: i64) -> String {
    local_datetime(timestamp_ms).to_rfc3339()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_day_bounds_contain_timestamp() {
        let now = Utc::now().timestamp_millis();
        let bounds = day_bounds(now);
        assert!(bounds.contains(now));
        assert!(bounds.start_ms <= bounds.end_ms);
        assert!(same_local_day(bounds.start_ms, bounds.end_ms));
        assert!(!same_local_day(bounds.end_ms, bounds.end_ms + 1));
    }

    #[test]
    fn test_window_ranges() {
        let range = Window::Week.ending_at(10 * ONE_WEEK_MS);
        assert_eq!(range.end_ms - range.start_ms, ONE_WEEK_MS);
        assert_eq!(Window::parse("MONTH"), Some(Window::Month));
        assert_eq!(Window::parse("year"), None);
    }

    #[test]
    fn test_manual_clock_is_shared() {
        let clock = ManualClock::new(1_000);
        let view = clock.clone();
        clock.advance(500);
        assert_eq!(view.now_millis(), 1_500);
        view.set(42);
        assert_eq!(clock.now_millis(), 42);
    }

    #[test]
    fn test_local_hour_matches_offset_from_midnight() {
        let now = Utc::now().timestamp_millis();
        let noon = at_local_hour(now, 12);
        assert_eq!(local_hour(noon), 12);
    }
}
