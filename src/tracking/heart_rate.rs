// ABOUTME: Heart-rate monitor that debounces, validates, and persists sensor readings
// ABOUTME: Accepted readings are written on a background task and reported to a callback
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::{SensorKind, Writer};
use crate::analytics::{AnalyticsEvent, AnalyticsSink, ErrorCategory};
use crate::config::TrackingConfig;
use crate::constants::tracking::MIN_HEART_RATE_INTERVAL_MS;
use crate::models::is_valid_heart_rate;
use crate::repositories::HeartRateRepository;
use crate::time::Clock;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, error, info, warn};

/// Receives the BPM of every accepted reading
pub type HeartRateCallback = Arc<dyn Fn(i32) + Send + Sync>;

/// What happened to a reading
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadingOutcome {
    /// Stored and reported to the callback
    Accepted,
    /// Arrived within the minimum interval of the previous reading
    Debounced,
    /// Outside the plausible range
    Rejected,
    /// The monitor is not running
    NotMonitoring,
}

/// Monitor settings
#[derive(Debug, Clone, Copy)]
pub struct HeartRateMonitorConfig {
    /// Minimum spacing between accepted readings
    pub min_interval_ms: i64,
    /// Whether the device has a heart-rate sensor
    pub sensor_available: bool,
}

impl Default for HeartRateMonitorConfig {
    fn default() -> Self {
        Self {
            min_interval_ms: MIN_HEART_RATE_INTERVAL_MS,
            sensor_available: true,
        }
    }
}

impl From<&TrackingConfig> for HeartRateMonitorConfig {
    fn from(config: &TrackingConfig) -> Self {
        Self {
            min_interval_ms: i64::try_from(config.min_heart_rate_interval.as_millis())
                .unwrap_or(MIN_HEART_RATE_INTERVAL_MS),
            sensor_available: config.sensors.heart_rate,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct PendingSample {
    timestamp: i64,
    heart_rate: i32,
    accuracy: i32,
}

#[derive(Default)]
struct MonitorState {
    monitoring: bool,
    last_reading_ms: Option<i64>,
    callback: Option<HeartRateCallback>,
    writer: Option<Writer<PendingSample>>,
}

/// Heart-rate sensor consumer
pub struct HeartRateMonitor {
    repository: Arc<dyn HeartRateRepository>,
    analytics: Arc<dyn AnalyticsSink>,
    clock: Arc<dyn Clock>,
    config: HeartRateMonitorConfig,
    state: Mutex<MonitorState>,
}

impl HeartRateMonitor {
    /// Create an idle monitor
    #[must_use]
    pub fn new(
        repository: Arc<dyn HeartRateRepository>,
        analytics: Arc<dyn AnalyticsSink>,
        clock: Arc<dyn Clock>,
        config: HeartRateMonitorConfig,
    ) -> Self {
        Self {
            repository,
            analytics,
            clock,
            config,
            state: Mutex::new(MonitorState::default()),
        }
    }

    fn state(&self) -> MutexGuard<'_, MonitorState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Whether the device has a heart-rate sensor
    #[must_use]
    pub const fn is_available(&self) -> bool {
        self.config.sensor_available
    }

    /// Whether readings are currently accepted
    #[must_use]
    pub fn is_monitoring(&self) -> bool {
        self.state().monitoring
    }

    /// Start accepting readings, reporting each accepted BPM to `callback`
    ///
    /// Returns false when the device has no heart-rate sensor. Calling it
    /// again while running only replaces the callback.
    pub fn start<F>(&self, callback: F) -> bool
    where
        F: Fn(i32) + Send + Sync + 'static,
    {
        if !self.config.sensor_available {
            warn!("Heart rate sensor not available on this device");
            self.analytics.log_event(&AnalyticsEvent::sensor_error(
                SensorKind::HeartRate.as_str(),
                "Sensor not available",
            ));
            return false;
        }

        let mut state = self.state();
        state.callback = Some(Arc::new(callback));
        if !state.monitoring {
            let repository = Arc::clone(&self.repository);
            let analytics = Arc::clone(&self.analytics);
            state.writer = Some(Writer::spawn("heart_rate", move |sample: PendingSample| {
                let repository = Arc::clone(&repository);
                let analytics = Arc::clone(&analytics);
                async move {
                    if let Err(e) = repository
                        .insert_heart_rate_at(sample.timestamp, sample.heart_rate, sample.accuracy, None)
                        .await
                    {
                        error!(error = %e, heart_rate = sample.heart_rate, "Error storing heart rate");
                        analytics.log_event(&AnalyticsEvent::app_error(
                            ErrorCategory::HeartRateUpdate,
                            e.to_string(),
                        ));
                    }
                }
            }));
            state.monitoring = true;
            info!("Started heart rate monitoring");
        }
        true
    }

    /// Reading taken now
    pub fn handle_reading(&self, heart_rate: i32, accuracy: i32) -> ReadingOutcome {
        self.handle_reading_at(self.clock.now_millis(), heart_rate, accuracy)
    }

    /// Reading taken at `timestamp`
    ///
    /// The debounce window restarts on every reading that passes it, even one
    /// that is then rejected as implausible.
    pub fn handle_reading_at(&self, timestamp: i64, heart_rate: i32, accuracy: i32) -> ReadingOutcome {
        let callback = {
            let mut state = self.state();
            if !state.monitoring {
                return ReadingOutcome::NotMonitoring;
            }

            if let Some(last) = state.last_reading_ms {
                if timestamp - last < self.config.min_interval_ms {
                    return ReadingOutcome::Debounced;
                }
            }
            state.last_reading_ms = Some(timestamp);

            if !is_valid_heart_rate(heart_rate) {
                warn!(heart_rate, "Invalid heart rate reading");
                return ReadingOutcome::Rejected;
            }

            let pending = PendingSample {
                timestamp,
                heart_rate,
                accuracy,
            };
            if !state.writer.as_ref().is_some_and(|w| w.submit(pending)) {
                error!(heart_rate, "Heart rate writer unavailable, reading dropped");
            }
            state.callback.clone()
        };

        if let Some(callback) = callback {
            callback(heart_rate);
        }
        ReadingOutcome::Accepted
    }

    /// Sensor accuracy changed
    pub fn handle_accuracy_changed(&self, accuracy: i32) {
        debug!(accuracy, "Heart rate sensor accuracy changed");
    }

    /// Stop accepting readings and wait for queued writes to finish
    pub async fn stop(&self) {
        let writer = {
            let mut state = self.state();
            if !state.monitoring {
                return;
            }
            state.monitoring = false;
            state.callback = None;
            state.writer.take()
        };

        if let Some(writer) = writer {
            writer.close().await;
        }
        info!("Stopped heart rate monitoring");
    }
}
