// ABOUTME: Integration tests for the heart-rate and walking repositories
// ABOUTME: Validates input rejection, aggregates, retention cleanup, and watch stream re-emission
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use common::{create_test_store, create_test_store_at, noon};
use fittrack::{
    constants::windows::ONE_DAY_MS,
    models::WalkingRecord,
    repositories::{HeartRateRepository, WalkingRepository},
    time::{at_local_hour, Window},
};
use futures_util::StreamExt;
use std::time::Duration;

#[tokio::test]
async fn test_heart_rate_range_validation() {
    let store = create_test_store().await.unwrap();
    let repo = store.heart_rate_repository();

    for (bpm, accuracy) in [(39, 3), (221, 3), (72, -1), (72, 4)] {
        let stored = repo.insert_heart_rate(bpm, accuracy, None).await.unwrap();
        assert!(stored.is_none(), "bpm={bpm} accuracy={accuracy} must be rejected");
    }
    assert!(repo.latest_heart_rate().await.is_none());

    for (bpm, accuracy) in [(40, 0), (220, 3)] {
        let stored = repo.insert_heart_rate(bpm, accuracy, None).await.unwrap();
        assert!(stored.is_some_and(|s| s.id > 0 && s.timestamp == noon()));
    }
}

#[tokio::test]
async fn test_heart_rate_note_is_kept() {
    let store = create_test_store().await.unwrap();
    let repo = store.heart_rate_repository();

    repo.insert_heart_rate(88, 2, Some("after stairs".to_owned()))
        .await
        .unwrap();

    let latest = repo.latest_heart_rate().await.unwrap();
    assert_eq!(latest.heart_rate, 88);
    assert_eq!(latest.note.as_deref(), Some("after stairs"));
}

#[tokio::test]
async fn test_heart_rate_aggregates() {
    let store = create_test_store().await.unwrap();
    let repo = store.heart_rate_repository();
    for (offset, bpm) in [(3, 60), (2, 90), (1, 75)] {
        repo.insert_heart_rate_at(noon() - offset * 60_000, bpm, 3, None)
            .await
            .unwrap();
    }
    // Outside the daily window
    repo.insert_heart_rate_at(noon() - 2 * ONE_DAY_MS, 180, 3, None)
        .await
        .unwrap();

    let day = Window::Day.ending_at(noon());
    assert_eq!(repo.heart_rate_count(day).await, 3);
    assert!((repo.average_heart_rate(day).await - 75.0).abs() < 1e-9);
    assert_eq!(repo.max_heart_rate(day).await, 90);
    assert_eq!(repo.min_heart_rate(day).await, 60);

    let history = repo.heart_rates_in(day).await;
    assert_eq!(
        history.iter().map(|s| s.heart_rate).collect::<Vec<_>>(),
        vec![75, 90, 60]
    );

    let week = Window::Week.ending_at(noon());
    assert_eq!(repo.heart_rate_stats(week).await.max, 180);
}

#[tokio::test]
async fn test_heart_rate_retention_cleanup() {
    let store = create_test_store().await.unwrap();
    let repo = store.heart_rate_repository();
    repo.insert_heart_rate_at(noon() - 31 * ONE_DAY_MS, 70, 3, None)
        .await
        .unwrap();
    repo.insert_heart_rate_at(noon() - 40 * ONE_DAY_MS, 71, 3, None)
        .await
        .unwrap();
    repo.insert_heart_rate_at(noon() - ONE_DAY_MS, 72, 3, None)
        .await
        .unwrap();

    let removed = repo
        .cleanup_old_data(Duration::from_secs(30 * 24 * 3600))
        .await;

    assert_eq!(removed, 2);
    assert_eq!(repo.latest_heart_rate().await.unwrap().heart_rate, 72);
    assert_eq!(
        repo.cleanup_old_data(Duration::from_secs(30 * 24 * 3600)).await,
        0
    );
}

#[tokio::test]
async fn test_walking_update_validation() {
    let store = create_test_store().await.unwrap();
    let repo = store.walking_repository();

    assert!(!repo.update_steps(-1, 0.0, 0).await.unwrap());
    assert!(!repo.update_steps(10, -5.0, 0).await.unwrap());
    assert!(!repo.update_steps(10, f64::NAN, 0).await.unwrap());
    assert!(!repo.update_steps(10, 5.0, -1).await.unwrap());
    assert!(!repo.update_steps(100_001, 0.0, 0).await.unwrap());
    assert_eq!(repo.today_walking_record().await.unwrap().steps, 0);

    assert!(repo.update_steps(100_000, 70_000.0, 600).await.unwrap());
    assert_eq!(repo.today_walking_record().await.unwrap().steps, 100_000);
}

#[tokio::test]
async fn test_goal_validation_and_progress() {
    let store = create_test_store().await.unwrap();
    let repo = store.walking_repository();

    assert!(!repo.update_daily_goal(999).await.unwrap());
    assert!(!repo.update_daily_goal(100_001).await.unwrap());
    assert!(repo.update_daily_goal(8_000).await.unwrap());

    repo.update_steps(6_000, 4_500.0, 45).await.unwrap();
    assert!((repo.daily_goal_progress().await - 75.0).abs() < 1e-9);
    assert!(!repo.is_today_goal_achieved().await);

    repo.update_steps(8_000, 6_000.0, 60).await.unwrap();
    assert!(repo.is_today_goal_achieved().await);
}

#[tokio::test]
async fn test_progress_without_record_is_zero() {
    let store = create_test_store().await.unwrap();
    store.database.delete_all_walking_records().await.unwrap();
    let repo = store.walking_repository();

    assert!(repo.today_walking_record().await.is_none());
    assert!(repo.daily_goal_progress().await.abs() < f64::EPSILON);
    assert!(!repo.is_today_goal_achieved().await);
}

#[tokio::test]
async fn test_walking_aggregates() {
    let store = create_test_store().await.unwrap();
    let repo = store.walking_repository();
    for (days_ago, steps) in [(1, 12_000), (2, 4_000), (3, 10_000)] {
        let mut record = WalkingRecord::new(noon() - days_ago * ONE_DAY_MS);
        record.apply_activity(steps, steps as f64 * 0.75, 30);
        store.database.insert_walking_record(&record).await.unwrap();
    }
    repo.update_steps(2_000, 1_500.0, 20).await.unwrap();

    let week = Window::Week.ending_at(noon());
    assert_eq!(repo.total_steps(week).await, 28_000);
    assert!((repo.total_distance(week).await - 21_000.0).abs() < 1e-6);
    assert!((repo.average_steps(week).await - 7_000.0).abs() < 1e-9);
    assert_eq!(repo.max_steps(week).await, 12_000);
    assert_eq!(repo.goal_achieved_count(week).await, 2);

    let records = repo.walking_records_in(week).await;
    assert_eq!(records.len(), 4);
    assert_eq!(records[0].steps, 2_000, "newest first");
}

#[tokio::test]
async fn test_heart_rate_watch_re_emits_on_insert() {
    let store = create_test_store().await.unwrap();
    let repo = store.heart_rate_repository();
    let mut today = repo.today_heart_rates();

    assert!(today.next().await.unwrap().is_empty());

    repo.insert_heart_rate(70, 3, None).await.unwrap();
    let after = tokio::time::timeout(Duration::from_secs(2), today.next())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(after.len(), 1);
    assert_eq!(after[0].heart_rate, 70);
}

#[tokio::test]
async fn test_today_heart_rates_span_last_24_hours() {
    let just_after_midnight = at_local_hour(noon(), 1);
    let store = create_test_store_at(just_after_midnight).await.unwrap();
    let repo = store.heart_rate_repository();

    // Yesterday evening, still inside the rolling day
    repo.insert_heart_rate_at(just_after_midnight - 13 * 3_600_000, 66, 3, None)
        .await
        .unwrap();
    repo.insert_heart_rate_at(just_after_midnight - ONE_DAY_MS - 60_000, 99, 3, None)
        .await
        .unwrap();

    let today = repo.today_heart_rates().next().await.unwrap();
    assert_eq!(today.len(), 1);
    assert_eq!(today[0].heart_rate, 66);
}

#[tokio::test]
async fn test_watch_ignores_other_table() {
    let store = create_test_store().await.unwrap();
    let walking = store.walking_repository();
    let heart_rate = store.heart_rate_repository();
    let mut weekly = walking.weekly_walking_records();

    assert_eq!(weekly.next().await.unwrap().len(), 1);

    heart_rate.insert_heart_rate(70, 3, None).await.unwrap();
    let quiet = tokio::time::timeout(Duration::from_millis(200), weekly.next()).await;
    assert!(quiet.is_err(), "heart-rate writes must not wake walking watchers");

    walking.update_steps(500, 300.0, 5).await.unwrap();
    let updated = tokio::time::timeout(Duration::from_secs(2), weekly.next())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated[0].steps, 500);
}

#[tokio::test]
async fn test_goal_achieved_days_stream() {
    let store = create_test_store().await.unwrap();
    let repo = store.walking_repository();
    let mut achieved = repo.goal_achieved_days(Window::Month.ending_at(noon()));

    assert!(achieved.next().await.unwrap().is_empty());

    repo.update_steps(10_000, 7_500.0, 90).await.unwrap();
    let days = tokio::time::timeout(Duration::from_secs(2), achieved.next())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(days.len(), 1);
    assert!(days[0].is_goal_achieved());
}

#[tokio::test]
async fn test_monthly_streams_cover_thirty_days() {
    let store = create_test_store().await.unwrap();
    let heart_rate = store.heart_rate_repository();
    heart_rate
        .insert_heart_rate_at(noon() - 20 * ONE_DAY_MS, 65, 3, None)
        .await
        .unwrap();
    heart_rate
        .insert_heart_rate_at(noon() - 40 * ONE_DAY_MS, 66, 3, None)
        .await
        .unwrap();

    assert_eq!(heart_rate.monthly_heart_rates().next().await.unwrap().len(), 1);
    assert_eq!(heart_rate.weekly_heart_rates().next().await.unwrap().len(), 0);
    assert_eq!(heart_rate.all_heart_rates().next().await.unwrap().len(), 2);
    assert_eq!(
        store
            .walking_repository()
            .monthly_walking_records()
            .next()
            .await
            .unwrap()
            .len(),
        1
    );
}
