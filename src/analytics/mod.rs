// ABOUTME: Fire-and-forget analytics events with flat key/value parameters
// ABOUTME: Events go to a pluggable sink; the default sink emits structured tracing events
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Analytics
//!
//! Schema-free usage events. Sinks must never fail the caller: delivery
//! problems are swallowed by the sink.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::sync::{Mutex, PoisonError};
use tracing::info;

/// Event names
pub mod events {
    /// A heart-rate reading was stored
    pub const HEART_RATE_MEASURED: &str = "heart_rate_measured";
    /// Today's step goal was reached
    pub const DAILY_GOAL_ACHIEVED: &str = "daily_goal_achieved";
    /// The daily goal was changed
    pub const DAILY_GOAL_UPDATED: &str = "daily_goal_updated";
    /// A step milestone was crossed
    pub const WALKING_MILESTONE: &str = "walking_milestone";
    /// An operation failed
    pub const APP_ERROR: &str = "app_error";
    /// A sensor was missing or misbehaved
    pub const SENSOR_ERROR: &str = "sensor_error";
    /// A feature was used
    pub const FEATURE_USED: &str = "feature_used";
    /// The user acted on a notification
    pub const NOTIFICATION_INTERACTION: &str = "notification_interaction";
}

/// Parameter names
pub mod params {
    /// BPM of a reading
    pub const HEART_RATE_VALUE: &str = "heart_rate_value";
    /// Accuracy tier of a reading
    pub const HEART_RATE_ACCURACY: &str = "heart_rate_accuracy";
    /// Step count
    pub const STEPS_COUNT: &str = "steps_count";
    /// Distance in meters
    pub const DISTANCE: &str = "distance";
    /// Goal in steps
    pub const GOAL_VALUE: &str = "goal_value";
    /// Error category or sensor name
    pub const ERROR_TYPE: &str = "error_type";
    /// Error text
    pub const ERROR_MESSAGE: &str = "error_message";
    /// Feature identifier
    pub const FEATURE_NAME: &str = "feature_name";
    /// Notification kind
    pub const NOTIFICATION_TYPE: &str = "notification_type";
    /// Action taken on a notification
    pub const INTERACTION_TYPE: &str = "interaction_type";
    /// Milestone family, e.g. `steps`
    pub const MILESTONE_TYPE: &str = "milestone_type";
    /// Milestone threshold
    pub const MILESTONE_VALUE: &str = "milestone_value";
}

/// Error tags attached to `app_error` events
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Loading heart-rate history failed
    HeartRateLoad,
    /// Computing heart-rate statistics failed
    HeartRateStats,
    /// Storing a heart-rate reading failed
    HeartRateUpdate,
    /// Heart-rate retention cleanup failed
    HeartRateCleanup,
    /// Loading walking history failed
    WalkingLoad,
    /// Computing walking statistics failed
    WalkingStats,
    /// Storing walking totals failed
    WalkingUpdate,
    /// Changing the daily goal failed
    GoalUpdate,
    /// A background service failed to start
    ServiceStart,
}

impl ErrorCategory {
    /// Tag sent as `error_type`
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::HeartRateLoad => "heart_rate_load",
            Self::HeartRateStats => "heart_rate_stats",
            Self::HeartRateUpdate => "heart_rate_update",
            Self::HeartRateCleanup => "heart_rate_cleanup",
            Self::WalkingLoad => "walking_load",
            Self::WalkingStats => "walking_stats",
            Self::WalkingUpdate => "walking_update",
            Self::GoalUpdate => "goal_update",
            Self::ServiceStart => "service_start",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One analytics event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsEvent {
    /// Event name, see [`events`]
    pub name: String,
    /// Flat parameter object
    pub params: Map<String, Value>,
}

impl AnalyticsEvent {
    /// Event without parameters
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            params: Map::new(),
        }
    }

    /// Add a parameter
    #[must_use]
    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.params.insert(key.to_owned(), value.into());
        self
    }

    /// Parameter by name
    #[must_use]
    pub fn param(&self, key: &str) -> Option<&Value> {
        self.params.get(key)
    }

    /// `heart_rate_measured`
    #[must_use]
    pub fn heart_rate_measured(heart_rate: i32, accuracy: i32) -> Self {
        Self::new(events::HEART_RATE_MEASURED)
            .with(params::HEART_RATE_VALUE, heart_rate)
            .with(params::HEART_RATE_ACCURACY, accuracy)
    }

    /// `daily_goal_achieved`
    #[must_use]
    pub fn daily_goal_achieved(steps: i64, distance: f64) -> Self {
        Self::new(events::DAILY_GOAL_ACHIEVED)
            .with(params::STEPS_COUNT, steps)
            .with(params::DISTANCE, distance)
    }

    /// `daily_goal_updated`
    #[must_use]
    pub fn daily_goal_updated(goal: i64) -> Self {
        Self::new(events::DAILY_GOAL_UPDATED).with(params::GOAL_VALUE, goal)
    }

    /// `walking_milestone` for a step threshold
    #[must_use]
    pub fn walking_milestone(milestone: i64) -> Self {
        Self::new(events::WALKING_MILESTONE)
            .with(params::MILESTONE_TYPE, "steps")
            .with(params::MILESTONE_VALUE, milestone)
    }

    /// `app_error`
    #[must_use]
    pub fn app_error(category: ErrorCategory, message: impl Into<String>) -> Self {
        Self::new(events::APP_ERROR)
            .with(params::ERROR_TYPE, category.as_str())
            .with(params::ERROR_MESSAGE, message.into())
    }

    /// `sensor_error`
    #[must_use]
    pub fn sensor_error(sensor: &str, message: impl Into<String>) -> Self {
        Self::new(events::SENSOR_ERROR)
            .with(params::ERROR_TYPE, sensor)
            .with(params::ERROR_MESSAGE, message.into())
    }

    /// `feature_used`
    #[must_use]
    pub fn feature_used(feature: &str) -> Self {
        Self::new(events::FEATURE_USED).with(params::FEATURE_NAME, feature)
    }

    /// `notification_interaction`
    #[must_use]
    pub fn notification_interaction(notification_type: &str, interaction: &str) -> Self {
        Self::new(events::NOTIFICATION_INTERACTION)
            .with(params::NOTIFICATION_TYPE, notification_type)
            .with(params::INTERACTION_TYPE, interaction)
    }
}

/// Destination for analytics events
pub trait AnalyticsSink: Send + Sync {
    /// Deliver an event; must not fail the caller
    fn log_event(&self, event: &AnalyticsEvent);

    /// Attach a property to the current user
    fn set_user_property(&self, name: &str, value: &str);
}

/// Sink that writes events as structured `tracing` records
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingAnalytics;

impl AnalyticsSink for TracingAnalytics {
    fn log_event(&self, event: &AnalyticsEvent) {
        info!(
            target: "fittrack::analytics",
            event = %event.name,
            params = %serde_json::Value::Object(event.params.clone()),
            "Analytics event"
        );
    }

    fn set_user_property(&self, name: &str, value: &str) {
        info!(target: "fittrack::analytics", property = name, value, "User property set");
    }
}

/// Sink that keeps events in memory, for inspection by embedders and tests
#[derive(Debug, Default)]
pub struct MemoryAnalytics {
    events: Mutex<Vec<AnalyticsEvent>>,
    properties: Mutex<Vec<(String, String)>>,
}

impl MemoryAnalytics {
    /// Empty sink
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Every event received so far
    #[must_use]
    pub fn events(&self) -> Vec<AnalyticsEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Events with the given name
    #[must_use]
    pub fn events_named(&self, name: &str) -> Vec<AnalyticsEvent> {
        self.events()
            .into_iter()
            .filter(|event| event.name == name)
            .collect()
    }

    /// User properties in the order they were set
    #[must_use]
    pub fn properties(&self) -> Vec<(String, String)> {
        self.properties
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl AnalyticsSink for MemoryAnalytics {
    fn log_event(&self, event: &AnalyticsEvent) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event.clone());
    }

    fn set_user_property(&self, name: &str, value: &str) {
        self.properties
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((name.to_owned(), value.to_owned()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_parameters() {
        let event = AnalyticsEvent::heart_rate_measured(72, 2);
        assert_eq!(event.name, "heart_rate_measured");
        assert_eq!(event.param(params::HEART_RATE_VALUE), Some(&Value::from(72)));
        assert_eq!(event.param(params::HEART_RATE_ACCURACY), Some(&Value::from(2)));

        let error = AnalyticsEvent::app_error(ErrorCategory::WalkingUpdate, "boom");
        assert_eq!(
            error.param(params::ERROR_TYPE),
            Some(&Value::from("walking_update"))
        );
    }

    #[test]
    fn test_memory_sink_records_in_order() {
        let sink = MemoryAnalytics::new();
        sink.log_event(&AnalyticsEvent::feature_used("heart_rate_monitor"));
        sink.log_event(&AnalyticsEvent::walking_milestone(5_000));
        sink.set_user_property("daily_goal", "12000");

        assert_eq!(sink.events().len(), 2);
        assert_eq!(sink.events_named(events::WALKING_MILESTONE).len(), 1);
        assert_eq!(
            sink.properties(),
            vec![("daily_goal".to_owned(), "12000".to_owned())]
        );
    }
}
