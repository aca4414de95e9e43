// ABOUTME: Component lifecycle for the tracking daemon: ordered start, health, and reverse stop
// ABOUTME: Optional sensor components may be unavailable without stopping the daemon
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Daemon component lifecycle
//!
//! The daemon runs a record store, the sensor trackers, and the reminder loop.
//! Each is wrapped as a [`Component`]. The [`ComponentManager`] starts them by
//! priority and remembers which optional sensors could not start. It stops
//! them in reverse order.

/// Adapters for the record store, trackers, and reminder loop
pub mod components;

use crate::errors::{AppError, AppResult};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error, info, warn};

const DEFAULT_START_TIMEOUT: Duration = Duration::from_secs(30);

/// Where a component is in the daemon's lifetime
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComponentState {
    /// Registered, not started
    Registered,
    /// Started and serving
    Ready,
    /// Start failed or timed out
    Failed,
    /// Stopped after running
    Stopped,
}

/// One line of the daemon health report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentHealth {
    /// Component name
    pub name: String,
    /// Whether the daemon refuses to run without it
    pub required: bool,
    /// Lifecycle state
    pub state: ComponentState,
    /// Ready and still running
    pub healthy: bool,
    /// Why the component failed to start
    pub message: Option<String>,
}

/// A long-running part of the daemon
#[async_trait]
pub trait Component: Send + Sync {
    /// Name used in logs and health reports
    fn name(&self) -> &'static str;

    /// Start order, lower first
    fn priority(&self) -> u8;

    /// Optional components (sensors) may fail to start
    fn is_required(&self) -> bool {
        true
    }

    /// Start the component
    ///
    /// # Errors
    ///
    /// Returns an error when the component cannot run, e.g. its sensor is missing
    async fn start(&mut self) -> AppResult<()>;

    /// Whether the underlying store, sensor, or task is still live
    async fn is_running(&self) -> bool;

    /// Stop the component and flush pending writes
    async fn stop(&mut self);
}

struct Slot {
    component: Box<dyn Component>,
    state: ComponentState,
    failure: Option<String>,
}

/// Starts, reports on, and stops the daemon's components
pub struct ComponentManager {
    slots: Vec<Slot>,
    start_timeout: Duration,
}

impl ComponentManager {
    /// Create an empty manager with a 30 s start timeout per component
    #[must_use]
    pub const fn new() -> Self {
        Self::with_start_timeout(DEFAULT_START_TIMEOUT)
    }

    /// Create an empty manager with a custom start timeout per component
    #[must_use]
    pub const fn with_start_timeout(start_timeout: Duration) -> Self {
        Self {
            slots: Vec::new(),
            start_timeout,
        }
    }

    /// Add a component
    pub fn register(&mut self, component: Box<dyn Component>) {
        debug!(
            component = component.name(),
            priority = component.priority(),
            "Component registered"
        );
        self.slots.push(Slot {
            component,
            state: ComponentState::Registered,
            failure: None,
        });
    }

    /// Number of registered components
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// No components registered
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Start every component by priority
    ///
    /// An optional component that fails is marked `Failed` and skipped.
    ///
    /// # Errors
    ///
    /// Returns the first error from a required component; components already
    /// started stay running until [`Self::stop_all`]
    pub async fn start_all(&mut self) -> AppResult<()> {
        self.slots.sort_by_key(|slot| slot.component.priority());
        let timeout = self.start_timeout;

        for slot in &mut self.slots {
            let name = slot.component.name();
            let started = tokio::time::timeout(timeout, slot.component.start())
                .await
                .unwrap_or_else(|_| {
                    Err(AppError::internal(format!(
                        "{name} did not start within {timeout:?}"
                    )))
                });

            match started {
                Ok(()) => {
                    slot.state = ComponentState::Ready;
                    debug!(component = name, "Component started");
                }
                Err(e) => {
                    slot.state = ComponentState::Failed;
                    slot.failure = Some(e.to_string());
                    if slot.component.is_required() {
                        error!(component = name, error = %e, "Required component failed to start");
                        return Err(e);
                    }
                    warn!(component = name, error = %e, "Continuing without optional component");
                }
            }
        }

        let unavailable: Vec<&str> = self
            .slots
            .iter()
            .filter(|slot| slot.state == ComponentState::Failed)
            .map(|slot| slot.component.name())
            .collect();
        info!(
            components = self.slots.len(),
            unavailable = ?unavailable,
            "Daemon components started"
        );
        Ok(())
    }

    /// Health of every component, in start order
    pub async fn health(&self) -> Vec<ComponentHealth> {
        let mut report = Vec::with_capacity(self.slots.len());
        for slot in &self.slots {
            let healthy =
                slot.state == ComponentState::Ready && slot.component.is_running().await;
            report.push(ComponentHealth {
                name: slot.component.name().to_owned(),
                required: slot.component.is_required(),
                state: slot.state,
                healthy,
                message: slot.failure.clone(),
            });
        }
        report
    }

    /// Every required component is healthy
    pub async fn is_healthy(&self) -> bool {
        self.health()
            .await
            .iter()
            .all(|component| component.healthy || !component.required)
    }

    /// Stop started components in reverse start order
    pub async fn stop_all(&mut self) {
        for slot in self.slots.iter_mut().rev() {
            if slot.state == ComponentState::Ready {
                slot.component.stop().await;
                slot.state = ComponentState::Stopped;
                debug!(component = slot.component.name(), "Component stopped");
            }
        }
        info!("Daemon components stopped");
    }
}

impl Default for ComponentManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    type Journal = Arc<Mutex<Vec<String>>>;

    struct Fake {
        name: &'static str,
        priority: u8,
        required: bool,
        start_delay: Option<Duration>,
        fails: bool,
        running: bool,
        journal: Journal,
    }

    impl Fake {
        fn new(name: &'static str, priority: u8, journal: &Journal) -> Self {
            Self {
                name,
                priority,
                required: true,
                start_delay: None,
                fails: false,
                running: false,
                journal: Arc::clone(journal),
            }
        }

        const fn optional(mut self) -> Self {
            self.required = false;
            self
        }

        const fn failing(mut self) -> Self {
            self.fails = true;
            self
        }

        const fn slow(mut self, delay: Duration) -> Self {
            self.start_delay = Some(delay);
            self
        }
    }

    #[async_trait]
    impl Component for Fake {
        fn name(&self) -> &'static str {
            self.name
        }

        fn priority(&self) -> u8 {
            self.priority
        }

        fn is_required(&self) -> bool {
            self.required
        }

        async fn start(&mut self) -> AppResult<()> {
            self.journal.lock().unwrap().push(format!("start:{}", self.name));
            if let Some(delay) = self.start_delay {
                tokio::time::sleep(delay).await;
            }
            if self.fails {
                return Err(AppError::sensor_unavailable("Heart rate"));
            }
            self.running = true;
            Ok(())
        }

        async fn is_running(&self) -> bool {
            self.running
        }

        async fn stop(&mut self) {
            self.journal.lock().unwrap().push(format!("stop:{}", self.name));
            self.running = false;
        }
    }

    #[tokio::test]
    async fn test_priority_order_and_reverse_stop() {
        let journal = Journal::default();
        let mut manager = ComponentManager::new();
        manager.register(Box::new(Fake::new("reminders", 30, &journal)));
        manager.register(Box::new(Fake::new("database", 10, &journal)));

        manager.start_all().await.unwrap();
        assert!(manager.is_healthy().await);
        manager.stop_all().await;

        assert_eq!(
            *journal.lock().unwrap(),
            vec!["start:database", "start:reminders", "stop:reminders", "stop:database"]
        );
        let health = manager.health().await;
        assert!(health.iter().all(|h| h.state == ComponentState::Stopped && !h.healthy));
    }

    #[tokio::test]
    async fn test_missing_sensor_is_reported_not_fatal() {
        let journal = Journal::default();
        let mut manager = ComponentManager::new();
        manager.register(Box::new(
            Fake::new("heart_rate_monitor", 20, &journal)
                .optional()
                .failing(),
        ));
        manager.register(Box::new(Fake::new("walking_tracker", 20, &journal).optional()));

        manager.start_all().await.unwrap();
        assert!(manager.is_healthy().await);

        let health = manager.health().await;
        let heart_rate = health.iter().find(|h| h.name == "heart_rate_monitor").unwrap();
        assert_eq!(heart_rate.state, ComponentState::Failed);
        assert!(!heart_rate.required);
        assert!(heart_rate.message.as_deref().unwrap().contains("Heart rate"));

        manager.stop_all().await;
        assert!(!journal.lock().unwrap().contains(&"stop:heart_rate_monitor".to_owned()));
    }

    #[tokio::test]
    async fn test_required_failure_stops_startup() {
        let journal = Journal::default();
        let mut manager = ComponentManager::new();
        manager.register(Box::new(Fake::new("database", 10, &journal).failing()));
        manager.register(Box::new(Fake::new("reminders", 30, &journal)));

        assert!(manager.start_all().await.is_err());
        assert!(!manager.is_healthy().await);
        assert_eq!(*journal.lock().unwrap(), vec!["start:database"]);
    }

    #[tokio::test]
    async fn test_slow_optional_component_times_out() {
        let journal = Journal::default();
        let mut manager = ComponentManager::with_start_timeout(Duration::from_millis(50));
        manager.register(Box::new(
            Fake::new("walking_tracker", 20, &journal)
                .optional()
                .slow(Duration::from_secs(5)),
        ));
        manager.register(Box::new(Fake::new("reminders", 30, &journal)));

        manager.start_all().await.unwrap();

        let health = manager.health().await;
        assert_eq!(health[0].state, ComponentState::Failed);
        assert!(health[0].message.as_deref().unwrap().contains("did not start"));
        assert_eq!(health[1].state, ComponentState::Ready);
    }
}
