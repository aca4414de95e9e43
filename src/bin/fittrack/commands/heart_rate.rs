// ABOUTME: Heart-rate commands for the fittrack CLI
// ABOUTME: Handles record, latest, stats, summary, and retention cleanup
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use fittrack::{
    analytics::AnalyticsEvent,
    constants::windows::ONE_DAY_MS,
    errors::{AppError, AppResult},
    time::Window,
};
use std::time::Duration;
use tracing::{info, warn};

use super::Context;
use crate::helpers::display::{
    display_heart_rate_sample, display_heart_rate_stats, display_heart_rate_summary,
};

const FEATURE: &str = "heart_rate_screen";

/// Store a reading taken now
pub async fn record(ctx: &Context, bpm: i32, accuracy: i32, note: Option<String>) -> AppResult<()> {
    ctx.analytics.log_event(&AnalyticsEvent::feature_used(FEATURE));

    let stored = if note.is_some() {
        ctx.heart_rate_repository()
            .insert_heart_rate(bpm, accuracy, note)
            .await?
    } else {
        ctx.heart_rate_service().record_reading(bpm, accuracy).await?
    };

    let Some(sample) = stored else {
        warn!(bpm, accuracy, "Reading rejected");
        return Err(AppError::invalid_input(format!(
            "reading bpm={bpm} accuracy={accuracy} is out of range and was not stored"
        )));
    };

    if !ctx.emit_json(&sample)? {
        println!("Stored heart rate reading");
        display_heart_rate_sample(&sample);
    }
    Ok(())
}

/// Show the latest reading
pub async fn latest(ctx: &Context) -> AppResult<()> {
    ctx.analytics.log_event(&AnalyticsEvent::feature_used(FEATURE));

    let latest = ctx.heart_rate_repository().latest_heart_rate().await;
    if ctx.emit_json(&latest)? {
        return Ok(());
    }
    match latest {
        Some(sample) => display_heart_rate_sample(&sample),
        None => println!("No heart rate readings stored"),
    }
    Ok(())
}

/// Aggregates over a window ending now
pub async fn stats(ctx: &Context, window: Window) -> AppResult<()> {
    ctx.analytics.log_event(&AnalyticsEvent::feature_used(FEATURE));

    let range = window.ending_at(ctx.clock.now_millis());
    let stats = ctx.heart_rate_repository().heart_rate_stats(range).await;
    if !ctx.emit_json(&stats)? {
        display_heart_rate_stats(window, &stats);
    }
    Ok(())
}

/// Latest reading plus the last 24 hours
pub async fn summary(ctx: &Context) -> AppResult<()> {
    ctx.analytics.log_event(&AnalyticsEvent::feature_used(FEATURE));

    let summary = ctx.heart_rate_service().summary().await;
    if !ctx.emit_json(&summary)? {
        display_heart_rate_summary(&summary);
    }
    Ok(())
}

/// Retention cleanup
pub async fn cleanup(ctx: &Context, keep_days: Option<u32>) -> AppResult<()> {
    let deleted = match keep_days {
        Some(days) => {
            let keep = Duration::from_millis(u64::from(days) * ONE_DAY_MS.unsigned_abs());
            ctx.heart_rate_repository().cleanup_old_data(keep).await
        }
        None => ctx.heart_rate_service().cleanup_old_data().await,
    };

    info!(deleted, "Heart rate cleanup complete");
    if !ctx.emit_json(&serde_json::json!({ "deleted": deleted }))? {
        println!("Deleted {deleted} old heart rate readings");
    }
    Ok(())
}
