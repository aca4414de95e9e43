// ABOUTME: Tracking daemon: starts components, feeds stdin sensor events to the trackers
// ABOUTME: Stops on end of input or Ctrl-C, then shuts components down in reverse order
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use fittrack::{
    analytics::{AnalyticsEvent, ErrorCategory},
    errors::AppResult,
    lifecycle::{
        components::{DatabaseComponent, HeartRateComponent, ReminderComponent, WalkingComponent},
        ComponentManager,
    },
    reminders::{ReminderService, TracingNotifier},
    tracking::{
        dispatch, HeartRateCallback, HeartRateMonitor, HeartRateMonitorConfig, SensorEvent,
        WalkingCallback, WalkingSnapshot, WalkingTracker, WalkingTrackerConfig,
    },
};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

use super::Context;
use crate::helpers::display::{display_component_health, display_walking_snapshot};

/// Run until stdin closes or Ctrl-C
pub async fn run(ctx: &Context, no_reminders: bool) -> AppResult<()> {
    let monitor = Arc::new(HeartRateMonitor::new(
        ctx.heart_rate_repository(),
        Arc::clone(&ctx.analytics),
        Arc::clone(&ctx.clock),
        HeartRateMonitorConfig::from(&ctx.config.tracking),
    ));
    let tracker = Arc::new(WalkingTracker::new(
        ctx.walking_repository(),
        Arc::clone(&ctx.analytics),
        Arc::clone(&ctx.clock),
        WalkingTrackerConfig::from(&ctx.config.tracking),
    ));

    let on_heart_rate: HeartRateCallback = Arc::new(|bpm: i32| info!(bpm, "Heart rate"));
    let on_walking: WalkingCallback = Arc::new(|snapshot: WalkingSnapshot| {
        info!(
            steps = snapshot.steps,
            distance = snapshot.distance,
            active_minutes = snapshot.active_minutes,
            "Walking totals"
        );
    });

    let mut manager = ComponentManager::new();
    manager.register(Box::new(DatabaseComponent::new(ctx.database.clone())));
    manager.register(Box::new(HeartRateComponent::new(
        Arc::clone(&monitor),
        on_heart_rate,
    )));
    manager.register(Box::new(WalkingComponent::new(
        Arc::clone(&tracker),
        on_walking,
    )));
    if !no_reminders {
        let reminders = ReminderService::new(
            ctx.walking_repository(),
            Arc::new(TracingNotifier),
            Arc::clone(&ctx.analytics),
            Arc::clone(&ctx.clock),
            &ctx.config.reminders,
        )
        .with_step_activity(tracker.step_activity_handle());
        manager.register(Box::new(ReminderComponent::new(reminders)));
    }

    if let Err(e) = manager.start_all().await {
        ctx.analytics.log_event(&AnalyticsEvent::app_error(
            ErrorCategory::ServiceStart,
            e.to_string(),
        ));
        manager.stop_all().await;
        return Err(e);
    }
    ctx.analytics
        .log_event(&AnalyticsEvent::feature_used("heart_rate_monitor"));

    info!("Reading sensor events from stdin");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut processed: u64 = 0;
    let mut malformed: u64 = 0;

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    info!("End of sensor input");
                    break;
                };
                match SensorEvent::parse_line(&line) {
                    Ok(Some(event)) => {
                        dispatch(&event, &monitor, &tracker);
                        processed += 1;
                    }
                    Ok(None) => {}
                    Err(e) => {
                        malformed += 1;
                        warn!(error = %e, "Skipping malformed sensor event");
                    }
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupt received, shutting down");
                break;
            }
        }
    }

    let health = manager.health().await;
    manager.stop_all().await;

    info!(processed, malformed, "Tracking daemon stopped");
    let snapshot = tracker.snapshot();
    let report = serde_json::json!({
        "processed": processed,
        "malformed": malformed,
        "components": health,
        "walking": snapshot,
    });
    if !ctx.emit_json(&report)? {
        display_component_health(&health);
        println!("Processed {processed} sensor events ({malformed} malformed)");
        display_walking_snapshot(&snapshot);
    }
    Ok(())
}
