// ABOUTME: Walking tracker that turns cumulative step counts and location fixes into daily totals
// ABOUTME: Keeps the step baseline, active minutes, and distance, persisting each change in order
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::{GeoPoint, SensorKind, Writer};
use crate::analytics::{AnalyticsEvent, AnalyticsSink, ErrorCategory};
use crate::config::TrackingConfig;
use crate::constants::tracking::{ACTIVE_MINUTE_WINDOW_MS, SIGNIFICANT_MOVEMENT_METERS};
use crate::repositories::WalkingRepository;
use crate::time::{same_local_day, Clock};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, error, info, warn};

/// Daily totals reported after every persisted change
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct WalkingSnapshot {
    /// Steps since the baseline was captured
    pub steps: i64,
    /// Accumulated distance, meters
    pub distance: f64,
    /// Active minutes
    pub active_minutes: i64,
}

/// Receives every persisted snapshot
pub type WalkingCallback = Arc<dyn Fn(WalkingSnapshot) + Send + Sync>;

/// Tracker settings
#[derive(Debug, Clone, Copy)]
pub struct WalkingTrackerConfig {
    /// Location changes shorter than this are ignored
    pub significant_movement_meters: f64,
    /// Time between two active-minute increments
    pub active_minute_window_ms: i64,
    /// Whether the device has a step counter
    pub step_counter_available: bool,
    /// Whether location fixes can be requested
    pub location_available: bool,
}

impl Default for WalkingTrackerConfig {
    fn default() -> Self {
        Self {
            significant_movement_meters: SIGNIFICANT_MOVEMENT_METERS,
            active_minute_window_ms: ACTIVE_MINUTE_WINDOW_MS,
            step_counter_available: true,
            location_available: true,
        }
    }
}

impl From<&TrackingConfig> for WalkingTrackerConfig {
    fn from(config: &TrackingConfig) -> Self {
        Self {
            significant_movement_meters: config.significant_movement_meters,
            active_minute_window_ms: i64::try_from(config.active_minute_window.as_millis())
                .unwrap_or(ACTIVE_MINUTE_WINDOW_MS),
            step_counter_available: config.sensors.step_counter,
            location_available: config.sensors.location,
        }
    }
}

#[derive(Default)]
struct TrackerState {
    tracking: bool,
    baseline: Option<i64>,
    snapshot: WalkingSnapshot,
    last_location: Option<GeoPoint>,
    last_active_ms: i64,
    tracking_day_ms: i64,
    writer: Option<Writer<WalkingSnapshot>>,
}

impl TrackerState {
    fn reset_day(&mut self, now_ms: i64) {
        self.baseline = None;
        self.snapshot = WalkingSnapshot::default();
        self.last_location = None;
        self.last_active_ms = now_ms;
        self.tracking_day_ms = now_ms;
    }
}

/// Step counter and location consumer
pub struct WalkingTracker {
    repository: Arc<dyn WalkingRepository>,
    analytics: Arc<dyn AnalyticsSink>,
    clock: Arc<dyn Clock>,
    config: WalkingTrackerConfig,
    state: Mutex<TrackerState>,
    callback: Arc<Mutex<Option<WalkingCallback>>>,
    last_step_activity: Arc<AtomicI64>,
}

impl WalkingTracker {
    /// Create an idle tracker
    #[must_use]
    pub fn new(
        repository: Arc<dyn WalkingRepository>,
        analytics: Arc<dyn AnalyticsSink>,
        clock: Arc<dyn Clock>,
        config: WalkingTrackerConfig,
    ) -> Self {
        Self {
            repository,
            analytics,
            clock,
            config,
            state: Mutex::new(TrackerState::default()),
            callback: Arc::new(Mutex::new(None)),
            last_step_activity: Arc::new(AtomicI64::new(0)),
        }
    }

    fn state(&self) -> MutexGuard<'_, TrackerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn set_callback(&self, callback: Option<WalkingCallback>) {
        *self.callback.lock().unwrap_or_else(PoisonError::into_inner) = callback;
    }

    /// Whether the device has a step counter
    #[must_use]
    pub const fn is_step_counting_available(&self) -> bool {
        self.config.step_counter_available
    }

    /// Whether callbacks are currently consumed
    #[must_use]
    pub fn is_tracking(&self) -> bool {
        self.state().tracking
    }

    /// Current totals
    #[must_use]
    pub fn snapshot(&self) -> WalkingSnapshot {
        self.state().snapshot
    }

    /// Epoch milliseconds of the last step callback, 0 before any
    #[must_use]
    pub fn last_step_activity(&self) -> i64 {
        self.last_step_activity.load(Ordering::SeqCst)
    }

    /// Shared handle on the last step activity timestamp
    #[must_use]
    pub fn step_activity_handle(&self) -> Arc<AtomicI64> {
        Arc::clone(&self.last_step_activity)
    }

    fn spawn_writer(&self) -> Writer<WalkingSnapshot> {
        let repository = Arc::clone(&self.repository);
        let analytics = Arc::clone(&self.analytics);
        let callback = Arc::clone(&self.callback);
        Writer::spawn("walking", move |snapshot: WalkingSnapshot| {
            let repository = Arc::clone(&repository);
            let analytics = Arc::clone(&analytics);
            let callback = Arc::clone(&callback);
            async move {
                match repository
                    .update_steps(snapshot.steps, snapshot.distance, snapshot.active_minutes)
                    .await
                {
                    Ok(_) => {
                        let callback = callback
                            .lock()
                            .unwrap_or_else(PoisonError::into_inner)
                            .clone();
                        if let Some(callback) = callback {
                            callback(snapshot);
                        }
                    }
                    Err(e) => {
                        error!(error = %e, steps = snapshot.steps, "Error updating walking data");
                        analytics.log_event(&AnalyticsEvent::app_error(
                            ErrorCategory::WalkingUpdate,
                            e.to_string(),
                        ));
                    }
                }
            }
        })
    }

    /// Start consuming step and location callbacks
    ///
    /// Returns false when the device has no step counter. A missing location
    /// provider only disables distance tracking.
    pub fn start<F>(&self, callback: F) -> bool
    where
        F: Fn(WalkingSnapshot) + Send + Sync + 'static,
    {
        if !self.config.step_counter_available {
            warn!("Step counter sensor not available on this device");
            self.analytics.log_event(&AnalyticsEvent::sensor_error(
                SensorKind::StepCounter.as_str(),
                "Sensor not available",
            ));
            return false;
        }

        self.set_callback(Some(Arc::new(callback)));
        let mut state = self.state();
        if !state.tracking {
            if !self.config.location_available {
                warn!("Location updates unavailable, distance will not be tracked");
            }
            let now = self.clock.now_millis();
            state.last_active_ms = now;
            if state.tracking_day_ms == 0 {
                state.tracking_day_ms = now;
            }
            state.writer = Some(self.spawn_writer());
            state.tracking = true;
            info!("Started walking tracking");
        }
        true
    }

    fn persist(state: &TrackerState) {
        let Some(writer) = state.writer.as_ref() else {
            return;
        };
        if !writer.submit(state.snapshot) {
            error!(steps = state.snapshot.steps, "Walking writer unavailable, update dropped");
        }
    }

    fn roll_over_if_new_day(state: &mut TrackerState, now_ms: i64) {
        if state.tracking_day_ms != 0 && !same_local_day(state.tracking_day_ms, now_ms) {
            info!(
                steps = state.snapshot.steps,
                "New day started, resetting walking totals"
            );
            state.reset_day(now_ms);
        }
    }

    /// Cumulative step counter callback
    pub fn handle_step_counter(&self, counter: i64) {
        let now = self.clock.now_millis();
        let mut state = self.state();
        if !state.tracking {
            debug!(counter, "Step counter event ignored, not tracking");
            return;
        }
        Self::roll_over_if_new_day(&mut state, now);

        let baseline = match state.baseline {
            Some(baseline) if counter >= baseline => baseline,
            Some(_) => {
                let rebased = counter - state.snapshot.steps;
                warn!(counter, rebased, "Step counter went backwards, re-deriving baseline");
                rebased
            }
            None => counter,
        };
        state.baseline = Some(baseline);
        state.snapshot.steps = counter - baseline;

        if now - state.last_active_ms >= self.config.active_minute_window_ms {
            state.snapshot.active_minutes += 1;
            state.last_active_ms = now;
        }
        self.last_step_activity.store(now, Ordering::SeqCst);

        Self::persist(&state);
    }

    /// Location fix callback
    pub fn handle_location(&self, location: GeoPoint) {
        if !self.config.location_available {
            return;
        }
        if !location.is_valid() {
            warn!(
                latitude = location.latitude,
                longitude = location.longitude,
                "Invalid location fix ignored"
            );
            return;
        }

        let now = self.clock.now_millis();
        let mut state = self.state();
        if !state.tracking {
            return;
        }
        Self::roll_over_if_new_day(&mut state, now);

        if let Some(last) = state.last_location {
            let moved = last.distance_to(&location);
            if moved >= self.config.significant_movement_meters {
                state.snapshot.distance += moved;
                Self::persist(&state);
            }
        }
        state.last_location = Some(location);
    }

    /// Sensor accuracy changed
    pub fn handle_accuracy_changed(&self, sensor: SensorKind, accuracy: i32) {
        debug!(%sensor, accuracy, "Walking sensor accuracy changed");
    }

    /// Zero today's totals and persist them
    ///
    /// # Errors
    ///
    /// Returns the store error when the tracker is idle and the direct write fails
    pub async fn reset_daily_data(&self) -> crate::errors::AppResult<()> {
        let snapshot = {
            let mut state = self.state();
            state.reset_day(self.clock.now_millis());
            if state.tracking {
                Self::persist(&state);
                return Ok(());
            }
            state.snapshot
        };
        self.repository
            .update_steps(snapshot.steps, snapshot.distance, snapshot.active_minutes)
            .await
            .map(|_| ())
    }

    /// Stop consuming callbacks, save the final totals, and wait for the writer
    pub async fn stop(&self) {
        let writer = {
            let mut state = self.state();
            if !state.tracking {
                return;
            }
            state.tracking = false;
            self.set_callback(None);
            Self::persist(&state);
            state.writer.take()
        };

        if let Some(writer) = writer {
            writer.close().await;
        }
        info!("Stopped walking tracking");
    }
}
