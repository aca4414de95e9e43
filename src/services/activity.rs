// ABOUTME: Activity service for daily walking updates, goal changes, and the weekly summary
// ABOUTME: Detects goal achievement and step milestones and reports them to analytics
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::milestones::crossed_milestones;
use crate::analytics::{AnalyticsEvent, AnalyticsSink, ErrorCategory};
use crate::constants::walking::{DEFAULT_DAILY_GOAL, MAX_DAILY_GOAL, MIN_DAILY_GOAL};
use crate::errors::{AppError, AppResult};
use crate::models::{goal_progress, is_valid_goal, WalkingRecord};
use crate::repositories::WalkingRepository;
use crate::time::{Clock, Window};
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info};

/// Outcome of a walking update
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WalkingUpdate {
    /// Whether the totals were written
    pub stored: bool,
    /// Progress against today's goal, percent
    pub goal_progress: f64,
    /// Progress reached 100%
    pub goal_achieved: bool,
    /// Milestones crossed by this update
    pub milestones: Vec<i64>,
}

/// What the walking screen shows
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct WalkingSummary {
    /// Today's record
    pub today: Option<WalkingRecord>,
    /// Today's progress, percent
    pub goal_progress: f64,
    /// Records from the last 7 days, newest first
    pub weekly_history: Vec<WalkingRecord>,
    /// Mean steps per day over the last 7 days
    pub weekly_average: Option<f64>,
    /// Days in the last 7 that reached their goal
    pub goal_achieved_count: Option<i64>,
}

/// Walking operations for a front end
pub struct ActivityService {
    repository: Arc<dyn WalkingRepository>,
    analytics: Arc<dyn AnalyticsSink>,
    clock: Arc<dyn Clock>,
}

impl ActivityService {
    /// Create the service
    #[must_use]
    pub fn new(
        repository: Arc<dyn WalkingRepository>,
        analytics: Arc<dyn AnalyticsSink>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            repository,
            analytics,
            clock,
        }
    }

    /// Write today's totals and report goal and milestone events
    ///
    /// Milestones are measured against the steps stored before this update,
    /// so each one is reported once per day.
    ///
    /// # Errors
    ///
    /// Returns the store error when the update fails
    pub async fn update_walking_data(
        &self,
        steps: i64,
        distance: f64,
        active_minutes: i64,
    ) -> AppResult<WalkingUpdate> {
        let before = self.repository.today_walking_record().await;
        let previous_steps = before.as_ref().map_or(0, |record| record.steps);

        let stored = match self
            .repository
            .update_steps(steps, distance, active_minutes)
            .await
        {
            Ok(stored) => stored,
            Err(e) => {
                error!(error = %e, steps, "Error updating walking data");
                self.analytics.log_event(&AnalyticsEvent::app_error(
                    ErrorCategory::WalkingUpdate,
                    e.to_string(),
                ));
                return Err(e);
            }
        };

        if !stored {
            return Ok(WalkingUpdate {
                stored,
                goal_progress: goal_progress(previous_steps, daily_goal_of(before.as_ref())),
                goal_achieved: false,
                milestones: Vec::new(),
            });
        }

        // A record created by this update inherits the latest stored goal
        let written = self.repository.today_walking_record().await;
        let goal = daily_goal_of(written.as_ref().or(before.as_ref()));
        let progress = goal_progress(steps, goal);
        let goal_achieved = progress >= 100.0;
        if goal_achieved {
            self.analytics
                .log_event(&AnalyticsEvent::daily_goal_achieved(steps, distance));
        }

        let milestones = crossed_milestones(previous_steps, steps);
        for &milestone in &milestones {
            info!(milestone, "Walking milestone reached");
            self.analytics
                .log_event(&AnalyticsEvent::walking_milestone(milestone));
        }

        Ok(WalkingUpdate {
            stored,
            goal_progress: progress,
            goal_achieved,
            milestones,
        })
    }

    /// Change the daily goal from today onward
    ///
    /// # Errors
    ///
    /// Returns `ValueOutOfRange` for a goal outside the accepted range, or the
    /// store error when the update fails
    pub async fn update_daily_goal(&self, goal: i64) -> AppResult<()> {
        if !is_valid_goal(goal) {
            return Err(AppError::value_out_of_range(
                "daily_goal",
                goal,
                MIN_DAILY_GOAL,
                MAX_DAILY_GOAL,
            ));
        }

        if let Err(e) = self.repository.update_daily_goal(goal).await {
            error!(error = %e, goal, "Error updating daily goal");
            self.analytics.log_event(&AnalyticsEvent::app_error(
                ErrorCategory::GoalUpdate,
                e.to_string(),
            ));
            return Err(e);
        }

        self.analytics
            .log_event(&AnalyticsEvent::daily_goal_updated(goal));
        self.analytics
            .set_user_property("daily_goal", &goal.to_string());
        Ok(())
    }

    /// Today's record plus the last 7 days with their statistics
    ///
    /// Statistics stay `None` when there is no weekly history.
    pub async fn summary(&self) -> WalkingSummary {
        let today = self.repository.today_walking_record().await;
        let goal_progress = today.as_ref().map_or(0.0, WalkingRecord::goal_progress);

        let range = Window::Week.ending_at(self.clock.now_millis());
        let weekly_history = self.repository.walking_records_in(range).await;
        if weekly_history.is_empty() {
            return WalkingSummary {
                today,
                goal_progress,
                ..WalkingSummary::default()
            };
        }

        let stats = self.repository.walking_stats(range).await;
        WalkingSummary {
            today,
            goal_progress,
            weekly_history,
            weekly_average: Some(stats.average_steps),
            goal_achieved_count: Some(stats.goal_achieved_count),
        }
    }
}

fn daily_goal_of(record: Option<&WalkingRecord>) -> i64 {
    record.map_or(DEFAULT_DAILY_GOAL, |record| record.daily_goal)
}
