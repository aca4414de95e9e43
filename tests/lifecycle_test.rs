// ABOUTME: End-to-end tests for the component lifecycle used by the tracking daemon
// ABOUTME: Starts store, trackers, and reminders, feeds sensor events, and checks persisted state
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use common::{init_test_logging, noon};
use fittrack::{
    analytics::{events, MemoryAnalytics},
    config::ReminderConfig,
    database::Database,
    lifecycle::{
        components::{DatabaseComponent, HeartRateComponent, ReminderComponent, WalkingComponent},
        ComponentManager, ComponentState,
    },
    reminders::{MemoryNotifier, ReminderService},
    repositories::{HeartRateRepositoryImpl, WalkingRepositoryImpl},
    time::{Clock, ManualClock},
    tracking::{
        dispatch, HeartRateCallback, HeartRateMonitor, HeartRateMonitorConfig, SensorEvent,
        WalkingCallback, WalkingSnapshot, WalkingTracker, WalkingTrackerConfig,
    },
};
use std::sync::Arc;

struct Daemon {
    manager: ComponentManager,
    monitor: Arc<HeartRateMonitor>,
    tracker: Arc<WalkingTracker>,
    analytics: Arc<MemoryAnalytics>,
    notifier: Arc<MemoryNotifier>,
}

fn build(database: &Database, clock: &Arc<dyn Clock>, heart_rate_sensor: bool) -> Daemon {
    let analytics = Arc::new(MemoryAnalytics::new());
    let notifier = Arc::new(MemoryNotifier::new());

    let monitor = Arc::new(HeartRateMonitor::new(
        Arc::new(HeartRateRepositoryImpl::new(database.clone())),
        analytics.clone(),
        Arc::clone(clock),
        HeartRateMonitorConfig {
            sensor_available: heart_rate_sensor,
            ..HeartRateMonitorConfig::default()
        },
    ));
    let walking_repository = Arc::new(WalkingRepositoryImpl::new(database.clone()));
    let tracker = Arc::new(WalkingTracker::new(
        walking_repository.clone(),
        analytics.clone(),
        Arc::clone(clock),
        WalkingTrackerConfig::default(),
    ));
    let reminders = ReminderService::new(
        walking_repository,
        notifier.clone(),
        analytics.clone(),
        Arc::clone(clock),
        &ReminderConfig::default(),
    )
    .with_step_activity(tracker.step_activity_handle());

    let on_heart_rate: HeartRateCallback = Arc::new(|_: i32| {});
    let on_walking: WalkingCallback = Arc::new(|_: WalkingSnapshot| {});
    let mut manager = ComponentManager::new();
    manager.register(Box::new(ReminderComponent::new(reminders)));
    manager.register(Box::new(WalkingComponent::new(
        Arc::clone(&tracker),
        on_walking,
    )));
    manager.register(Box::new(HeartRateComponent::new(
        Arc::clone(&monitor),
        on_heart_rate,
    )));
    manager.register(Box::new(DatabaseComponent::new(database.clone())));

    Daemon {
        manager,
        monitor,
        tracker,
        analytics,
        notifier,
    }
}

#[tokio::test]
async fn test_daemon_session_persists_across_restart() {
    init_test_logging();
    let dir = tempfile::tempdir().unwrap();
    let url = format!("sqlite:{}", dir.path().join("fittrack.db").display());
    let clock: Arc<dyn Clock> = Arc::new(ManualClock::new(noon()));

    let database = Database::with_clock(&url, Arc::clone(&clock)).await.unwrap();
    let mut daemon = build(&database, &clock, true);
    assert_eq!(daemon.manager.len(), 4);

    daemon.manager.start_all().await.unwrap();
    assert!(daemon.manager.is_healthy().await);
    assert!(daemon.monitor.is_monitoring());
    assert!(daemon.tracker.is_tracking());

    let lines = [
        r#"{"type":"heart_rate","bpm":64}"#,
        r#"{"type":"step_counter","value":12000}"#,
        r#"{"type":"step_counter","value":12750}"#,
        r#"{"type":"location","latitude":51.5007,"longitude":-0.1246}"#,
        r#"{"type":"location","latitude":51.5017,"longitude":-0.1246}"#,
    ];
    for line in lines {
        let event = SensorEvent::parse_line(line).unwrap().unwrap();
        dispatch(&event, &daemon.monitor, &daemon.tracker);
    }

    let health = daemon.manager.health().await;
    assert!(health.iter().all(|h| h.healthy && h.state == ComponentState::Ready));

    daemon.manager.stop_all().await;
    assert!(!daemon.monitor.is_monitoring());
    assert!(!daemon.tracker.is_tracking());
    assert!(daemon
        .notifier
        .posted()
        .iter()
        .all(|n| n.id == 1001));
    assert!(daemon.analytics.events_named(events::APP_ERROR).is_empty());

    let reopened = Database::with_clock(&url, clock).await.unwrap();
    let today = reopened.today_walking_record().await.unwrap().unwrap();
    assert_eq!(today.steps, 750);
    assert!((today.distance - 111.2).abs() < 1.0);
    let latest = reopened.latest_heart_rate_sample().await.unwrap().unwrap();
    assert_eq!(latest.heart_rate, 64);
}

#[tokio::test]
async fn test_missing_heart_rate_sensor_is_optional() {
    init_test_logging();
    let clock: Arc<dyn Clock> = Arc::new(ManualClock::new(noon()));
    let database = Database::with_clock("sqlite::memory:", Arc::clone(&clock))
        .await
        .unwrap();
    let mut daemon = build(&database, &clock, false);

    daemon.manager.start_all().await.unwrap();

    let health = daemon.manager.health().await;
    let heart_rate = health
        .iter()
        .find(|h| h.name == "heart_rate_monitor")
        .unwrap();
    assert!(!heart_rate.healthy);
    assert!(!heart_rate.required);
    assert_eq!(heart_rate.state, ComponentState::Failed);
    assert!(heart_rate.message.is_some());
    // Optional components do not affect overall health
    assert!(daemon.manager.is_healthy().await);
    assert_eq!(
        daemon.analytics.events_named(events::SENSOR_ERROR).len(),
        1
    );

    daemon.manager.stop_all().await;
}
