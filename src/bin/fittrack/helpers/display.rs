// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence
// ABOUTME: Output formatting helpers for the fittrack CLI
// ABOUTME: Consistent plain-text rendering of samples, records, statistics, and summaries

use fittrack::{
    database::{HeartRateStats, WalkingStats},
    lifecycle::ComponentHealth,
    models::{HeartRateSample, WalkingRecord},
    services::{HeartRateSummary, WalkingSummary, WalkingUpdate},
    time::{format_local, Window},
    tracking::WalkingSnapshot,
};

fn window_label(window: Window) -> &'static str {
    match window {
        Window::Day => "last 24 hours",
        Window::Week => "last 7 days",
        Window::Month => "last 30 days",
    }
}

fn accuracy_label(sample: &HeartRateSample) -> String {
    sample
        .accuracy_tier()
        .map_or_else(|| sample.accuracy.to_string(), |tier| tier.to_string())
}

/// One heart-rate sample
pub fn display_heart_rate_sample(sample: &HeartRateSample) {
    println!("{} bpm", sample.heart_rate);
    println!("   Time: {}", format_local(sample.timestamp));
    println!("   Accuracy: {}", accuracy_label(sample));
    if let Some(note) = &sample.note {
        println!("   Note: {note}");
    }
}

/// Heart-rate aggregates
pub fn display_heart_rate_stats(window: Window, stats: &HeartRateStats) {
    println!("Heart rate, {}", window_label(window));
    println!("{}", "=".repeat(40));
    if stats.count == 0 {
        println!("   No readings");
        return;
    }
    println!("   Readings: {}", stats.count);
    println!("   Average: {:.1} bpm", stats.average);
    println!("   Max: {} bpm", stats.max);
    println!("   Min: {} bpm", stats.min);
}

/// Heart-rate screen summary
pub fn display_heart_rate_summary(summary: &HeartRateSummary) {
    match summary.current {
        Some(bpm) => println!("Current: {bpm} bpm"),
        None => println!("Current: --"),
    }
    println!("{}", "=".repeat(40));
    if let (Some(average), Some(max), Some(min)) = (summary.average, summary.max, summary.min) {
        println!("   Average: {average:.1} bpm");
        println!("   Max: {max} bpm");
        println!("   Min: {min} bpm");
    }
    println!("   Readings (24h): {}", summary.history.len());
    for sample in summary.history.iter().take(10) {
        println!(
            "   {}  {} bpm ({})",
            format_local(sample.timestamp),
            sample.heart_rate,
            accuracy_label(sample)
        );
    }
}

/// One daily walking record
pub fn display_walking_record(record: &WalkingRecord) {
    println!(
        "{} / {} steps ({:.1}%)",
        record.steps,
        record.daily_goal,
        record.goal_progress()
    );
    println!("   Date: {}", format_local(record.date));
    println!("   Distance: {:.0} m", record.distance);
    println!("   Active minutes: {}", record.active_minutes);
    println!("   Calories: {}", record.calories_burned);
    println!("   Average speed: {:.2} m/s", record.average_speed);
    if record.is_goal_achieved() {
        println!("   Goal achieved");
    } else {
        println!("   Remaining: {} steps", record.remaining_steps());
    }
}

/// Result of a walking update
pub fn display_walking_update(update: &WalkingUpdate) {
    if !update.stored {
        println!("Walking data rejected (out of range), nothing stored");
        return;
    }
    println!("Walking data stored ({:.1}% of goal)", update.goal_progress);
    if update.goal_achieved {
        println!("   Daily goal achieved!");
    }
    for milestone in &update.milestones {
        println!("   Milestone reached: {milestone} steps");
    }
}

/// Walking aggregates
pub fn display_walking_stats(window: Window, stats: &WalkingStats) {
    println!("Walking, {}", window_label(window));
    println!("{}", "=".repeat(40));
    if stats.days == 0 {
        println!("   No records");
        return;
    }
    println!("   Days: {}", stats.days);
    println!("   Total steps: {}", stats.total_steps);
    println!("   Total distance: {:.0} m", stats.total_distance);
    println!("   Average steps: {:.0}", stats.average_steps);
    println!("   Best day: {} steps", stats.max_steps);
    println!("   Goal reached: {} days", stats.goal_achieved_count);
}

/// Daily records as a table
pub fn display_walking_history(records: &[WalkingRecord]) {
    if records.is_empty() {
        println!("No walking records");
        return;
    }
    println!(
        "{:<27} {:>8} {:>8} {:>10} {:>7}",
        "Date", "Steps", "Goal", "Distance", "Active"
    );
    for record in records {
        println!(
            "{:<27} {:>8} {:>8} {:>9.0}m {:>6}m{}",
            format_local(record.date),
            record.steps,
            record.daily_goal,
            record.distance,
            record.active_minutes,
            if record.is_goal_achieved() { "  *" } else { "" }
        );
    }
}

/// Walking screen summary
pub fn display_walking_summary(summary: &WalkingSummary) {
    match &summary.today {
        Some(record) => display_walking_record(record),
        None => println!("No walking record for today"),
    }
    println!("{}", "=".repeat(40));
    if let Some(average) = summary.weekly_average {
        println!("   Weekly average: {average:.0} steps");
    }
    if let Some(count) = summary.goal_achieved_count {
        println!("   Goal reached this week: {count} days");
    }
    println!("   Days recorded this week: {}", summary.weekly_history.len());
}

/// Tracker totals at shutdown
pub fn display_walking_snapshot(snapshot: &WalkingSnapshot) {
    println!(
        "Session: {} steps, {:.0} m, {} active minutes",
        snapshot.steps, snapshot.distance, snapshot.active_minutes
    );
}

/// Component health table
pub fn display_component_health(health: &[ComponentHealth]) {
    for component in health {
        let status = match (component.healthy, component.required) {
            (true, _) => "healthy",
            (false, true) => "unhealthy",
            (false, false) => "unavailable",
        };
        println!(
            "   {:<20} {:<10} {:<12} {}",
            component.name,
            format!("{:?}", component.state),
            status,
            component.message.as_deref().unwrap_or_default()
        );
    }
}
