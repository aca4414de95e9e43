// ABOUTME: Sensor ingestion for heart rate, cumulative step counts, and location fixes
// ABOUTME: Each tracker validates callbacks inline and persists on its own ordered writer task
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Sensor Ingestion
//!
//! [`HeartRateMonitor`] and [`WalkingTracker`] receive sensor callbacks
//! synchronously, apply debouncing and thresholds, and hand accepted data to a
//! background writer task. One writer per tracker keeps writes ordered.

/// Sensor event wire format for line-delimited JSON input
pub mod events;
/// Great-circle distance between location fixes
pub mod geo;
mod heart_rate;
mod walking;

pub use events::{SensorEvent, SensorKind};
pub use geo::GeoPoint;
pub use heart_rate::{HeartRateCallback, HeartRateMonitor, HeartRateMonitorConfig, ReadingOutcome};
pub use walking::{WalkingCallback, WalkingSnapshot, WalkingTracker, WalkingTrackerConfig};

use std::future::Future;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error};

/// Ordered background writer fed by an unbounded channel
pub(crate) struct Writer<T> {
    tx: mpsc::UnboundedSender<T>,
    handle: JoinHandle<()>,
}

impl<T: Send + 'static> Writer<T> {
    /// Spawn the writer task; `handler` runs once per job, in submission order
    pub(crate) fn spawn<F, Fut>(name: &'static str, mut handler: F) -> Self
    where
        F: FnMut(T) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send,
    {
        let (tx, mut rx) = mpsc::unbounded_channel::<T>();
        let handle = tokio::spawn(async move {
            while let Some(job) = rx.recv().await {
                handler(job).await;
            }
            debug!(writer = name, "Writer drained");
        });
        Self { tx, handle }
    }

    /// Queue a job; false once the task has gone away
    pub(crate) fn submit(&self, job: T) -> bool {
        self.tx.send(job).is_ok()
    }

    /// Close the queue and wait for every queued job to finish
    pub(crate) async fn close(self) {
        drop(self.tx);
        if let Err(e) = self.handle.await {
            error!(error = %e, "Writer task ended abnormally");
        }
    }
}

/// Route one sensor event to the tracker that owns it
pub fn dispatch(event: &SensorEvent, heart_rate: &HeartRateMonitor, walking: &WalkingTracker) {
    match *event {
        SensorEvent::HeartRate {
            bpm,
            accuracy,
            timestamp,
        } => {
            let outcome = timestamp.map_or_else(
                || heart_rate.handle_reading(bpm, accuracy),
                |ts| heart_rate.handle_reading_at(ts, bpm, accuracy),
            );
            debug!(bpm, ?outcome, "Heart rate event handled");
        }
        SensorEvent::StepCounter { value } => walking.handle_step_counter(value),
        SensorEvent::Location {
            latitude,
            longitude,
        } => walking.handle_location(GeoPoint::new(latitude, longitude)),
        SensorEvent::AccuracyChanged { sensor, accuracy } => match sensor {
            SensorKind::HeartRate => heart_rate.handle_accuracy_changed(accuracy),
            SensorKind::StepCounter | SensorKind::Location => {
                walking.handle_accuracy_changed(sensor, accuracy);
            }
        },
    }
}
