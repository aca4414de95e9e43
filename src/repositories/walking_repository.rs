// ABOUTME: Walking repository: validated step and goal updates, history watches, and aggregates
// ABOUTME: Out-of-range input is logged and ignored; store failures on mutations are re-raised
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::{or_default_logged, watch, RecordStream};
use crate::constants::walking::MAX_DAILY_STEPS;
use crate::database::{Database, Table, WalkingStats};
use crate::errors::AppResult;
use crate::models::{is_valid_goal, WalkingRecord};
use crate::time::{TimeRange, Window};
use async_trait::async_trait;
use tracing::{debug, error, info, warn};

/// Access to daily walking records
#[async_trait]
pub trait WalkingRepository: Send + Sync {
    /// Write today's totals; `Ok(false)` when the input is out of range
    ///
    /// # Errors
    ///
    /// Returns the store error when the upsert fails
    async fn update_steps(&self, steps: i64, distance: f64, active_minutes: i64)
        -> AppResult<bool>;

    /// Apply a new goal from today onward; `Ok(false)` when outside the accepted range
    ///
    /// # Errors
    ///
    /// Returns the store error when the update fails
    async fn update_daily_goal(&self, daily_goal: i64) -> AppResult<bool>;

    /// Record for the current local day
    async fn today_walking_record(&self) -> Option<WalkingRecord>;

    /// Records in `range`, newest first
    async fn walking_records_in(&self, range: TimeRange) -> Vec<WalkingRecord>;

    /// Records from the last 7 days
    fn weekly_walking_records(&self) -> RecordStream<WalkingRecord>;

    /// Records from the last 30 days
    fn monthly_walking_records(&self) -> RecordStream<WalkingRecord>;

    /// Records in `range` whose goal was reached
    fn goal_achieved_days(&self, range: TimeRange) -> RecordStream<WalkingRecord>;

    /// Sum of steps over `range`
    async fn total_steps(&self, range: TimeRange) -> i64;

    /// Sum of distance over `range`, meters
    async fn total_distance(&self, range: TimeRange) -> f64;

    /// Mean steps per day over `range`
    async fn average_steps(&self, range: TimeRange) -> f64;

    /// Best day in `range`
    async fn max_steps(&self, range: TimeRange) -> i64;

    /// Days in `range` that reached their goal
    async fn goal_achieved_count(&self, range: TimeRange) -> i64;

    /// All aggregates over `range` in one query
    async fn walking_stats(&self, range: TimeRange) -> WalkingStats;

    /// Today's progress in percent, 0.0 without a record
    async fn daily_goal_progress(&self) -> f64 {
        self.today_walking_record()
            .await
            .map_or(0.0, |record| record.goal_progress())
    }

    /// Whether today's goal is reached, false without a record
    async fn is_today_goal_achieved(&self) -> bool {
        self.today_walking_record()
            .await
            .is_some_and(|record| record.is_goal_achieved())
    }
}

/// `SQLite` implementation of `WalkingRepository`
#[derive(Clone)]
pub struct WalkingRepositoryImpl {
    db: Database,
}

impl WalkingRepositoryImpl {
    /// Create a new `WalkingRepository` with the given database connection
    #[must_use]
    pub const fn new(db: Database) -> Self {
        Self { db }
    }

    fn watch_window(&self, window: Window) -> RecordStream<WalkingRecord> {
        let db = self.db.clone();
        watch(&self.db, Table::Walking, "watch walking records", move || {
            let db = db.clone();
            async move {
                let range = window.ending_at(db.now_millis());
                db.list_walking_records(Some(range)).await
            }
        })
    }
}

#[async_trait]
impl WalkingRepository for WalkingRepositoryImpl {
    async fn update_steps(
        &self,
        steps: i64,
        distance: f64,
        active_minutes: i64,
    ) -> AppResult<bool> {
        if steps < 0 || !distance.is_finite() || distance < 0.0 || active_minutes < 0 {
            warn!(steps, distance, active_minutes, "Negative walking data, not stored");
            return Ok(false);
        }
        if steps > MAX_DAILY_STEPS {
            warn!(steps, max = MAX_DAILY_STEPS, "Step count exceeds daily maximum, not stored");
            return Ok(false);
        }

        match self
            .db
            .upsert_today_activity(steps, distance, active_minutes)
            .await
        {
            Ok(record) => {
                debug!(
                    id = record.id,
                    steps,
                    distance,
                    active_minutes,
                    "Today's walking record updated"
                );
                Ok(true)
            }
            Err(e) => {
                error!(error = %e, steps, "Failed to update today's steps");
                Err(e)
            }
        }
    }

    async fn update_daily_goal(&self, daily_goal: i64) -> AppResult<bool> {
        if !is_valid_goal(daily_goal) {
            warn!(daily_goal, "Daily goal outside accepted range, not stored");
            return Ok(false);
        }

        match self.db.set_daily_goal_from_today(daily_goal).await {
            Ok(touched) => {
                info!(daily_goal, records = touched, "Daily goal updated");
                Ok(true)
            }
            Err(e) => {
                error!(error = %e, daily_goal, "Failed to update daily goal");
                Err(e)
            }
        }
    }

    async fn today_walking_record(&self) -> Option<WalkingRecord> {
        or_default_logged(
            self.db.today_walking_record().await,
            None,
            "today's walking record",
        )
    }

    async fn walking_records_in(&self, range: TimeRange) -> Vec<WalkingRecord> {
        or_default_logged(
            self.db.list_walking_records(Some(range)).await,
            Vec::new(),
            "walking records in range",
        )
    }

    fn weekly_walking_records(&self) -> RecordStream<WalkingRecord> {
        self.watch_window(Window::Week)
    }

    fn monthly_walking_records(&self) -> RecordStream<WalkingRecord> {
        self.watch_window(Window::Month)
    }

    fn goal_achieved_days(&self, range: TimeRange) -> RecordStream<WalkingRecord> {
        let db = self.db.clone();
        watch(&self.db, Table::Walking, "watch goal achieved days", move || {
            let db = db.clone();
            async move { db.goal_achieved_records(range).await }
        })
    }

    async fn total_steps(&self, range: TimeRange) -> i64 {
        self.walking_stats(range).await.total_steps
    }

    async fn total_distance(&self, range: TimeRange) -> f64 {
        self.walking_stats(range).await.total_distance
    }

    async fn average_steps(&self, range: TimeRange) -> f64 {
        self.walking_stats(range).await.average_steps
    }

    async fn max_steps(&self, range: TimeRange) -> i64 {
        self.walking_stats(range).await.max_steps
    }

    async fn goal_achieved_count(&self, range: TimeRange) -> i64 {
        self.walking_stats(range).await.goal_achieved_count
    }

    async fn walking_stats(&self, range: TimeRange) -> WalkingStats {
        or_default_logged(
            self.db.walking_stats(range).await,
            WalkingStats::default(),
            "walking stats",
        )
    }
}
