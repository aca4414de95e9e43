// ABOUTME: Reminder notifications and the delivery trait the reminder loop posts through
// ABOUTME: Default notifier logs; the in-memory notifier records posts for embedders and tests
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use crate::constants::reminders::{NOTIFICATION_CHANNEL_ID, NOTIFICATION_ID};
use crate::errors::AppResult;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::{Mutex, PoisonError};
use tracing::info;

/// Which reminder fired
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReminderKind {
    /// Today's step goal is reached
    GoalAchieved,
    /// Goal not reached during active hours
    Inactivity,
}

impl ReminderKind {
    /// Name used in logs and analytics
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::GoalAchieved => "goal_achieved",
            Self::Inactivity => "inactivity_reminder",
        }
    }
}

impl fmt::Display for ReminderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Action button on a notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationAction {
    /// Close the notification
    Dismiss,
    /// Close the notification and bring the app forward
    OpenApp,
}

impl NotificationAction {
    /// Name used in logs and analytics
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Dismiss => "dismiss",
            Self::OpenApp => "open_app",
        }
    }
}

impl fmt::Display for NotificationAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A posted reminder
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    /// Slot id; every reminder reuses the same one
    pub id: i32,
    /// Delivery channel
    pub channel: String,
    /// Reminder that produced it
    pub kind: ReminderKind,
    /// Title line
    pub title: String,
    /// Body text
    pub body: String,
    /// Action buttons
    pub actions: Vec<NotificationAction>,
}

impl Notification {
    /// Notification for `kind` with its fixed text and actions
    #[must_use]
    pub fn for_kind(kind: ReminderKind) -> Self {
        let (title, body, actions) = match kind {
            ReminderKind::GoalAchieved => (
                "Daily goal achieved!",
                "Great job, you reached your step goal for today.",
                Vec::new(),
            ),
            ReminderKind::Inactivity => (
                "Time to move",
                "You haven't reached your step goal yet. A short walk will get you closer.",
                vec![NotificationAction::Dismiss, NotificationAction::OpenApp],
            ),
        };
        Self {
            id: NOTIFICATION_ID,
            channel: NOTIFICATION_CHANNEL_ID.to_owned(),
            kind,
            title: title.to_owned(),
            body: body.to_owned(),
            actions,
        }
    }
}

/// Notification delivery
pub trait Notifier: Send + Sync {
    /// Post or replace the notification in its slot
    ///
    /// # Errors
    ///
    /// Returns an error when delivery fails
    fn notify(&self, notification: &Notification) -> AppResult<()>;

    /// Remove the notification in slot `id`
    fn cancel(&self, id: i32);

    /// Bring the app to the foreground
    fn open_app(&self);
}

/// Notifier that logs each post
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notification: &Notification) -> AppResult<()> {
        info!(
            id = notification.id,
            channel = %notification.channel,
            kind = %notification.kind,
            title = %notification.title,
            "{}",
            notification.body
        );
        Ok(())
    }

    fn cancel(&self, id: i32) {
        info!(id, "Notification cancelled");
    }

    fn open_app(&self) {
        info!("Open app requested from notification");
    }
}

/// What happened to the notification slot
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotifierCall {
    /// A notification was posted
    Posted(Notification),
    /// The slot was cleared
    Cancelled(i32),
    /// The app was asked to come forward
    OpenedApp,
}

/// Notifier that records every call
#[derive(Debug, Default)]
pub struct MemoryNotifier {
    calls: Mutex<Vec<NotifierCall>>,
}

impl MemoryNotifier {
    /// Empty notifier
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Calls in order
    #[must_use]
    pub fn calls(&self) -> Vec<NotifierCall> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Posted notifications in order
    #[must_use]
    pub fn posted(&self) -> Vec<Notification> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                NotifierCall::Posted(notification) => Some(notification),
                NotifierCall::Cancelled(_) | NotifierCall::OpenedApp => None,
            })
            .collect()
    }

    fn record(&self, call: NotifierCall) {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(call);
    }
}

impl Notifier for MemoryNotifier {
    fn notify(&self, notification: &Notification) -> AppResult<()> {
        self.record(NotifierCall::Posted(notification.clone()));
        Ok(())
    }

    fn cancel(&self, id: i32) {
        self.record(NotifierCall::Cancelled(id));
    }

    fn open_app(&self) {
        self.record(NotifierCall::OpenedApp);
    }
}
