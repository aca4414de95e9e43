// ABOUTME: Periodic reminder loop deciding between goal-achieved and inactivity notifications
// ABOUTME: Runs on a tokio interval with an mpsc shutdown signal, first check at start
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Reminders
//!
//! Every tick reads today's walking record. A reached goal posts the
//! goal-achieved notification at any hour; otherwise an inactivity reminder is
//! posted while the local hour is inside the active window. When an
//! inactivity threshold is configured the reminder additionally requires that
//! no step activity was seen for at least that long.

mod notifier;

pub use notifier::{
    MemoryNotifier, Notification, NotificationAction, Notifier, NotifierCall, ReminderKind,
    TracingNotifier,
};

use crate::analytics::{AnalyticsEvent, AnalyticsSink};
use crate::config::{ActiveHours, ReminderConfig};
use crate::constants::reminders::NOTIFICATION_ID;
use crate::models::WalkingRecord;
use crate::repositories::WalkingRepository;
use crate::time::{local_hour, Clock};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

/// Pure reminder decision
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReminderPolicy {
    /// Hours in which inactivity reminders may fire
    pub active_hours: ActiveHours,
    /// Minimum idle time before an inactivity reminder, if enforced
    pub inactivity_threshold: Option<Duration>,
}

impl From<&ReminderConfig> for ReminderPolicy {
    fn from(config: &ReminderConfig) -> Self {
        Self {
            active_hours: config.active_hours,
            inactivity_threshold: config.inactivity_threshold,
        }
    }
}

impl ReminderPolicy {
    /// Decide which reminder, if any, to post
    ///
    /// `idle_for` is the time since the last step activity, `None` when no
    /// activity has been seen.
    #[must_use]
    pub fn decide(
        &self,
        today: Option<&WalkingRecord>,
        hour: u32,
        idle_for: Option<Duration>,
    ) -> Option<ReminderKind> {
        let record = today?;
        if record.is_goal_achieved() {
            return Some(ReminderKind::GoalAchieved);
        }
        if !self.active_hours.contains(hour) {
            return None;
        }
        match (self.inactivity_threshold, idle_for) {
            (Some(threshold), Some(idle)) if idle < threshold => None,
            _ => Some(ReminderKind::Inactivity),
        }
    }
}

/// One reminder check, shared by the loop and on-demand callers
struct ReminderChecker {
    repository: Arc<dyn WalkingRepository>,
    notifier: Arc<dyn Notifier>,
    analytics: Arc<dyn AnalyticsSink>,
    clock: Arc<dyn Clock>,
    policy: ReminderPolicy,
    step_activity: Option<Arc<AtomicI64>>,
    last_posted: Mutex<Option<ReminderKind>>,
}

impl ReminderChecker {
    fn idle_for(&self, now_ms: i64) -> Option<Duration> {
        let last = self.step_activity.as_ref()?.load(Ordering::SeqCst);
        if last <= 0 {
            return None;
        }
        u64::try_from(now_ms - last).ok().map(Duration::from_millis)
    }

    async fn check(&self) -> Option<ReminderKind> {
        let today = self.repository.today_walking_record().await;
        let now = self.clock.now_millis();
        let kind = self
            .policy
            .decide(today.as_ref(), local_hour(now), self.idle_for(now))?;

        let notification = Notification::for_kind(kind);
        if let Err(e) = self.notifier.notify(&notification) {
            error!(error = %e, %kind, "Error posting reminder notification");
            return None;
        }
        *self
            .last_posted
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(kind);
        info!(%kind, "Reminder posted");
        Some(kind)
    }

    fn handle_action(&self, action: NotificationAction) {
        if action == NotificationAction::OpenApp {
            self.notifier.open_app();
        }
        self.notifier.cancel(NOTIFICATION_ID);

        let kind = self
            .last_posted
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        let notification_type = kind.map_or("reminder", ReminderKind::as_str);
        self.analytics.log_event(&AnalyticsEvent::notification_interaction(
            notification_type,
            action.as_str(),
        ));
    }
}

/// Builder for the reminder loop
pub struct ReminderService {
    checker: ReminderChecker,
    interval: Duration,
}

impl ReminderService {
    /// Service reading `repository` and posting through `notifier`
    #[must_use]
    pub fn new(
        repository: Arc<dyn WalkingRepository>,
        notifier: Arc<dyn Notifier>,
        analytics: Arc<dyn AnalyticsSink>,
        clock: Arc<dyn Clock>,
        config: &ReminderConfig,
    ) -> Self {
        Self {
            checker: ReminderChecker {
                repository,
                notifier,
                analytics,
                clock,
                policy: ReminderPolicy::from(config),
                step_activity: None,
                last_posted: Mutex::new(None),
            },
            interval: config.interval,
        }
    }

    /// Use the walking tracker's last step activity for the inactivity threshold
    #[must_use]
    pub fn with_step_activity(mut self, step_activity: Arc<AtomicI64>) -> Self {
        self.checker.step_activity = Some(step_activity);
        self
    }

    /// Start the loop; the first check runs immediately
    #[must_use]
    pub fn spawn(self) -> ReminderHandle {
        let checker = Arc::new(self.checker);
        let (shutdown_tx, mut shutdown_rx) = mpsc::channel::<()>(1);
        let loop_checker = Arc::clone(&checker);
        let period = self.interval;

        let task = tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            loop {
                tokio::select! {
                    _ = interval.tick() => {
                        let outcome = loop_checker.check().await;
                        debug!(?outcome, "Reminder check completed");
                    }
                    _ = shutdown_rx.recv() => {
                        debug!("Reminder loop received shutdown signal");
                        break;
                    }
                }
            }
        });

        info!(interval_secs = period.as_secs(), "Reminder loop started");
        ReminderHandle {
            checker,
            shutdown_tx,
            task,
        }
    }
}

/// Running reminder loop; dropping it stops the loop
pub struct ReminderHandle {
    checker: Arc<ReminderChecker>,
    shutdown_tx: mpsc::Sender<()>,
    task: JoinHandle<()>,
}

impl ReminderHandle {
    /// Run a check outside the schedule
    pub async fn check_now(&self) -> Option<ReminderKind> {
        self.checker.check().await
    }

    /// React to a notification action
    pub fn handle_action(&self, action: NotificationAction) {
        self.checker.handle_action(action);
    }

    /// Whether the loop task is still running
    #[must_use]
    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }

    /// Stop the loop and wait for it to exit
    pub async fn shutdown(self) {
        if let Err(e) = self.shutdown_tx.send(()).await {
            debug!(error = ?e, "Reminder shutdown signal send failed (loop already stopped)");
        }
        if let Err(e) = self.task.await {
            error!(error = %e, "Reminder loop ended abnormally");
        }
        info!("Reminder loop stopped");
    }
}
