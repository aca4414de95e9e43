// ABOUTME: Heart-rate repository: validated inserts, latest/history watches, and window aggregates
// ABOUTME: Invalid samples are logged and not stored; store failures on insert are re-raised
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::{or_default_logged, watch, RecordStream};
use crate::database::{Database, HeartRateStats, Table};
use crate::errors::AppResult;
use crate::models::{is_valid_accuracy, is_valid_heart_rate, HeartRateSample};
use crate::time::{TimeRange, Window};
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Access to stored heart-rate samples
#[async_trait]
pub trait HeartRateRepository: Send + Sync {
    /// Store a reading taken now; `Ok(None)` when the values are out of range
    ///
    /// # Errors
    ///
    /// Returns the store error when the insert itself fails
    async fn insert_heart_rate(
        &self,
        heart_rate: i32,
        accuracy: i32,
        note: Option<String>,
    ) -> AppResult<Option<HeartRateSample>>;

    /// Store a reading taken at `timestamp`; `Ok(None)` when the values are out of range
    ///
    /// # Errors
    ///
    /// Returns the store error when the insert itself fails
    async fn insert_heart_rate_at(
        &self,
        timestamp: i64,
        heart_rate: i32,
        accuracy: i32,
        note: Option<String>,
    ) -> AppResult<Option<HeartRateSample>>;

    /// Most recent sample
    async fn latest_heart_rate(&self) -> Option<HeartRateSample>;

    /// Samples in `range`, newest first
    async fn heart_rates_in(&self, range: TimeRange) -> Vec<HeartRateSample>;

    /// Every sample, newest first
    fn all_heart_rates(&self) -> RecordStream<HeartRateSample>;

    /// Samples from the last 24 hours
    fn today_heart_rates(&self) -> RecordStream<HeartRateSample>;

    /// Samples from the last 7 days
    fn weekly_heart_rates(&self) -> RecordStream<HeartRateSample>;

    /// Samples from the last 30 days
    fn monthly_heart_rates(&self) -> RecordStream<HeartRateSample>;

    /// Mean BPM over `range`
    async fn average_heart_rate(&self, range: TimeRange) -> f64;

    /// Highest BPM over `range`
    async fn max_heart_rate(&self, range: TimeRange) -> i32;

    /// Lowest BPM over `range`
    async fn min_heart_rate(&self, range: TimeRange) -> i32;

    /// Number of samples in `range`
    async fn heart_rate_count(&self, range: TimeRange) -> i64;

    /// All aggregates over `range` in one query
    async fn heart_rate_stats(&self, range: TimeRange) -> HeartRateStats;

    /// Delete samples older than `keep`, returning how many were removed
    async fn cleanup_old_data(&self, keep: Duration) -> u64;
}

/// `SQLite` implementation of `HeartRateRepository`
#[derive(Clone)]
pub struct HeartRateRepositoryImpl {
    db: Database,
}

impl HeartRateRepositoryImpl {
    /// Create a new `HeartRateRepository` with the given database connection
    #[must_use]
    pub const fn new(db: Database) -> Self {
        Self { db }
    }

    fn watch_window(&self, window: Option<Window>) -> RecordStream<HeartRateSample> {
        let db = self.db.clone();
        watch(&self.db, Table::HeartRate, "watch heart rates", move || {
            let db = db.clone();
            async move {
                let range = window.map(|w| w.ending_at(db.now_millis()));
                db.list_heart_rate_samples(range).await
            }
        })
    }
}

#[async_trait]
impl HeartRateRepository for HeartRateRepositoryImpl {
    async fn insert_heart_rate(
        &self,
        heart_rate: i32,
        accuracy: i32,
        note: Option<String>,
    ) -> AppResult<Option<HeartRateSample>> {
        self.insert_heart_rate_at(self.db.now_millis(), heart_rate, accuracy, note)
            .await
    }

    async fn insert_heart_rate_at(
        &self,
        timestamp: i64,
        heart_rate: i32,
        accuracy: i32,
        note: Option<String>,
    ) -> AppResult<Option<HeartRateSample>> {
        if !is_valid_heart_rate(heart_rate) || !is_valid_accuracy(accuracy) {
            warn!(heart_rate, accuracy, "Invalid heart rate sample, not stored");
            return Ok(None);
        }

        let sample = HeartRateSample::new(timestamp, heart_rate, accuracy, note);
        match self.db.insert_heart_rate_sample(&sample).await {
            Ok(stored) => {
                debug!(id = stored.id, heart_rate, accuracy, "Heart rate stored");
                Ok(Some(stored))
            }
            Err(e) => {
                error!(error = %e, heart_rate, "Failed to store heart rate");
                Err(e)
            }
        }
    }

    async fn latest_heart_rate(&self) -> Option<HeartRateSample> {
        or_default_logged(
            self.db.latest_heart_rate_sample().await,
            None,
            "latest heart rate",
        )
    }

    async fn heart_rates_in(&self, range: TimeRange) -> Vec<HeartRateSample> {
        or_default_logged(
            self.db.list_heart_rate_samples(Some(range)).await,
            Vec::new(),
            "heart rates in range",
        )
    }

    fn all_heart_rates(&self) -> RecordStream<HeartRateSample> {
        self.watch_window(None)
    }

    fn today_heart_rates(&self) -> RecordStream<HeartRateSample> {
        self.watch_window(Some(Window::Day))
    }

    fn weekly_heart_rates(&self) -> RecordStream<HeartRateSample> {
        self.watch_window(Some(Window::Week))
    }

    fn monthly_heart_rates(&self) -> RecordStream<HeartRateSample> {
        self.watch_window(Some(Window::Month))
    }

    async fn average_heart_rate(&self, range: TimeRange) -> f64 {
        self.heart_rate_stats(range).await.average
    }

    async fn max_heart_rate(&self, range: TimeRange) -> i32 {
        self.heart_rate_stats(range).await.max
    }

    async fn min_heart_rate(&self, range: TimeRange) -> i32 {
        self.heart_rate_stats(range).await.min
    }

    async fn heart_rate_count(&self, range: TimeRange) -> i64 {
        self.heart_rate_stats(range).await.count
    }

    async fn heart_rate_stats(&self, range: TimeRange) -> HeartRateStats {
        or_default_logged(
            self.db.heart_rate_stats(range).await,
            HeartRateStats::default(),
            "heart rate stats",
        )
    }

    async fn cleanup_old_data(&self, keep: Duration) -> u64 {
        let keep_ms = i64::try_from(keep.as_millis()).unwrap_or(i64::MAX);
        let cutoff = self.db.now_millis().saturating_sub(keep_ms);
        match self.db.delete_heart_rate_samples_before(cutoff).await {
            Ok(removed) => {
                info!(removed, cutoff, "Old heart rate samples cleaned up");
                removed
            }
            Err(e) => {
                error!(error = %e, "Failed to clean up old heart rate samples");
                0
            }
        }
    }
}
