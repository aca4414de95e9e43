// ABOUTME: Component adapters for the record store, sensor trackers, and reminder loop
// ABOUTME: Sensor trackers are optional so a device without a sensor still runs the daemon
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Daemon component adapters
//!
//! - Record store (priority 10, required)
//! - Heart-rate monitor and walking tracker (priority 20, optional)
//! - Reminder loop (priority 30, required)

use super::Component;
use crate::database::Database;
use crate::errors::{AppError, AppResult};
use crate::reminders::{ReminderHandle, ReminderService};
use crate::tracking::{HeartRateCallback, HeartRateMonitor, WalkingCallback, WalkingTracker};
use async_trait::async_trait;
use std::sync::Arc;

/// Record store; re-checks the schema on start and closes the pool on stop
pub struct DatabaseComponent {
    database: Database,
}

impl DatabaseComponent {
    /// Wrap an open store
    #[must_use]
    pub const fn new(database: Database) -> Self {
        Self { database }
    }
}

#[async_trait]
impl Component for DatabaseComponent {
    fn name(&self) -> &'static str {
        "database"
    }

    fn priority(&self) -> u8 {
        10
    }

    async fn start(&mut self) -> AppResult<()> {
        self.database.migrate().await
    }

    async fn is_running(&self) -> bool {
        !self.database.pool().is_closed() && self.database.schema_version().await.is_ok()
    }

    async fn stop(&mut self) {
        self.database.pool().close().await;
    }
}

/// Heart-rate monitor
pub struct HeartRateComponent {
    monitor: Arc<HeartRateMonitor>,
    callback: HeartRateCallback,
}

impl HeartRateComponent {
    /// Wrap a monitor; `callback` receives every accepted BPM
    #[must_use]
    pub fn new(monitor: Arc<HeartRateMonitor>, callback: HeartRateCallback) -> Self {
        Self { monitor, callback }
    }
}

#[async_trait]
impl Component for HeartRateComponent {
    fn name(&self) -> &'static str {
        "heart_rate_monitor"
    }

    fn priority(&self) -> u8 {
        20
    }

    fn is_required(&self) -> bool {
        false
    }

    async fn start(&mut self) -> AppResult<()> {
        let callback = Arc::clone(&self.callback);
        if self.monitor.start(move |bpm| callback(bpm)) {
            Ok(())
        } else {
            Err(AppError::sensor_unavailable("Heart rate"))
        }
    }

    async fn is_running(&self) -> bool {
        self.monitor.is_monitoring()
    }

    async fn stop(&mut self) {
        self.monitor.stop().await;
    }
}

/// Walking tracker
pub struct WalkingComponent {
    tracker: Arc<WalkingTracker>,
    callback: WalkingCallback,
}

impl WalkingComponent {
    /// Wrap a tracker; `callback` receives every persisted snapshot
    #[must_use]
    pub fn new(tracker: Arc<WalkingTracker>, callback: WalkingCallback) -> Self {
        Self { tracker, callback }
    }
}

#[async_trait]
impl Component for WalkingComponent {
    fn name(&self) -> &'static str {
        "walking_tracker"
    }

    fn priority(&self) -> u8 {
        20
    }

    fn is_required(&self) -> bool {
        false
    }

    async fn start(&mut self) -> AppResult<()> {
        let callback = Arc::clone(&self.callback);
        if self.tracker.start(move |snapshot| callback(snapshot)) {
            Ok(())
        } else {
            Err(AppError::sensor_unavailable("Step counter"))
        }
    }

    async fn is_running(&self) -> bool {
        self.tracker.is_tracking()
    }

    async fn stop(&mut self) {
        self.tracker.stop().await;
    }
}

/// Reminder loop; spawned on start
pub struct ReminderComponent {
    service: Option<ReminderService>,
    handle: Option<ReminderHandle>,
}

impl ReminderComponent {
    /// Wrap a configured, not yet spawned, reminder service
    #[must_use]
    pub const fn new(service: ReminderService) -> Self {
        Self {
            service: Some(service),
            handle: None,
        }
    }
}

#[async_trait]
impl Component for ReminderComponent {
    fn name(&self) -> &'static str {
        "reminders"
    }

    fn priority(&self) -> u8 {
        30
    }

    async fn start(&mut self) -> AppResult<()> {
        let service = self
            .service
            .take()
            .ok_or_else(|| AppError::internal("Reminder loop already started"))?;
        self.handle = Some(service.spawn());
        Ok(())
    }

    async fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(ReminderHandle::is_running)
    }

    async fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.shutdown().await;
        }
    }
}
