// ABOUTME: Walking commands for the fittrack CLI
// ABOUTME: Handles today, update, goal, stats, history, and summary
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use fittrack::{
    analytics::AnalyticsEvent,
    errors::AppResult,
    models::estimated_distance,
    time::Window,
};
use futures_util::StreamExt;

use super::Context;
use crate::helpers::display::{
    display_walking_history, display_walking_record, display_walking_stats,
    display_walking_summary, display_walking_update,
};

const FEATURE: &str = "walking_screen";

/// Show today's record
pub async fn today(ctx: &Context) -> AppResult<()> {
    ctx.analytics.log_event(&AnalyticsEvent::feature_used(FEATURE));

    let today = ctx.walking_repository().today_walking_record().await;
    if ctx.emit_json(&today)? {
        return Ok(());
    }
    match today {
        Some(record) => display_walking_record(&record),
        None => println!("No walking record for today"),
    }
    Ok(())
}

/// Write today's totals
pub async fn update(
    ctx: &Context,
    steps: i64,
    distance: Option<f64>,
    active_minutes: i64,
) -> AppResult<()> {
    let distance = distance.unwrap_or_else(|| estimated_distance(steps));
    let outcome = ctx
        .activity_service()
        .update_walking_data(steps, distance, active_minutes)
        .await?;

    if !ctx.emit_json(&outcome)? {
        display_walking_update(&outcome);
    }
    Ok(())
}

/// Change the daily goal
pub async fn goal(ctx: &Context, goal: i64) -> AppResult<()> {
    ctx.activity_service().update_daily_goal(goal).await?;
    if !ctx.emit_json(&serde_json::json!({ "daily_goal": goal }))? {
        println!("Daily goal set to {goal} steps");
    }
    Ok(())
}

/// Aggregates over a window ending now
pub async fn stats(ctx: &Context, window: Window) -> AppResult<()> {
    ctx.analytics.log_event(&AnalyticsEvent::feature_used(FEATURE));

    let range = window.ending_at(ctx.clock.now_millis());
    let stats = ctx.walking_repository().walking_stats(range).await;
    if !ctx.emit_json(&stats)? {
        display_walking_stats(window, &stats);
    }
    Ok(())
}

/// Daily records over a window, newest first
pub async fn history(ctx: &Context, window: Window, achieved: bool) -> AppResult<()> {
    ctx.analytics.log_event(&AnalyticsEvent::feature_used(FEATURE));

    let repository = ctx.walking_repository();
    let range = window.ending_at(ctx.clock.now_millis());
    let records = if achieved {
        // First emission of the watch is the current result
        repository
            .goal_achieved_days(range)
            .next()
            .await
            .unwrap_or_default()
    } else {
        repository.walking_records_in(range).await
    };

    if !ctx.emit_json(&records)? {
        display_walking_history(&records);
    }
    Ok(())
}

/// Today's progress plus the last 7 days
pub async fn summary(ctx: &Context) -> AppResult<()> {
    ctx.analytics.log_event(&AnalyticsEvent::feature_used(FEATURE));

    let summary = ctx.activity_service().summary().await;
    if !ctx.emit_json(&summary)? {
        display_walking_summary(&summary);
    }
    Ok(())
}
