// ABOUTME: Heart-rate service recording readings and building the last-24-hours summary
// ABOUTME: Emits heart_rate_measured on success and app_error on store failures
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use crate::analytics::{AnalyticsEvent, AnalyticsSink, ErrorCategory};
use crate::errors::AppResult;
use crate::models::HeartRateSample;
use crate::repositories::HeartRateRepository;
use crate::time::{Clock, Window};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

/// What the heart-rate screen shows
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct HeartRateSummary {
    /// Latest stored BPM
    pub current: Option<i32>,
    /// Samples from the last 24 hours, newest first
    pub history: Vec<HeartRateSample>,
    /// Mean BPM over the history window
    pub average: Option<f64>,
    /// Highest BPM over the history window
    pub max: Option<i32>,
    /// Lowest BPM over the history window
    pub min: Option<i32>,
}

/// Heart-rate operations for a front end
pub struct HeartRateService {
    repository: Arc<dyn HeartRateRepository>,
    analytics: Arc<dyn AnalyticsSink>,
    clock: Arc<dyn Clock>,
    retention: Duration,
}

impl HeartRateService {
    /// Create the service; `retention` is how long samples are kept by cleanup
    #[must_use]
    pub fn new(
        repository: Arc<dyn HeartRateRepository>,
        analytics: Arc<dyn AnalyticsSink>,
        clock: Arc<dyn Clock>,
        retention: Duration,
    ) -> Self {
        Self {
            repository,
            analytics,
            clock,
            retention,
        }
    }

    /// Store a reading taken now
    ///
    /// `Ok(None)` means the values were out of range and nothing was stored.
    ///
    /// # Errors
    ///
    /// Returns the store error when the insert fails
    pub async fn record_reading(
        &self,
        heart_rate: i32,
        accuracy: i32,
    ) -> AppResult<Option<HeartRateSample>> {
        match self
            .repository
            .insert_heart_rate(heart_rate, accuracy, None)
            .await
        {
            Ok(Some(sample)) => {
                self.analytics
                    .log_event(&AnalyticsEvent::heart_rate_measured(heart_rate, accuracy));
                Ok(Some(sample))
            }
            Ok(None) => Ok(None),
            Err(e) => {
                error!(error = %e, heart_rate, "Error updating heart rate");
                self.analytics.log_event(&AnalyticsEvent::app_error(
                    ErrorCategory::HeartRateUpdate,
                    e.to_string(),
                ));
                Err(e)
            }
        }
    }

    /// Latest reading plus the last 24 hours with their statistics
    ///
    /// Statistics stay `None` when there is no history.
    pub async fn summary(&self) -> HeartRateSummary {
        let range = Window::Day.ending_at(self.clock.now_millis());
        let history = self.repository.heart_rates_in(range).await;
        let current = self
            .repository
            .latest_heart_rate()
            .await
            .map(|sample| sample.heart_rate);

        if history.is_empty() {
            return HeartRateSummary {
                current,
                ..HeartRateSummary::default()
            };
        }

        let stats = self.repository.heart_rate_stats(range).await;
        HeartRateSummary {
            current,
            history,
            average: Some(stats.average),
            max: Some(stats.max),
            min: Some(stats.min),
        }
    }

    /// Delete samples older than the retention period
    pub async fn cleanup_old_data(&self) -> u64 {
        let deleted = self.repository.cleanup_old_data(self.retention).await;
        info!(deleted, retention_secs = self.retention.as_secs(), "Heart rate cleanup finished");
        deleted
    }
}
