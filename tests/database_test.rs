// ABOUTME: Integration tests for the SQLite record store
// ABOUTME: Covers schema versioning, default seeding, today's upsert, goal propagation, and change feed
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use common::{create_test_store, init_test_logging, noon};
use fittrack::{
    constants::windows::ONE_DAY_MS,
    database::{ChangeKind, Database, Table, TableChange, SCHEMA_VERSION},
    models::{HeartRateSample, WalkingRecord},
    time::{day_bounds, ManualClock, Window},
};
use std::sync::Arc;

#[tokio::test]
async fn test_fresh_store_is_seeded_with_default_record() {
    let store = create_test_store().await.unwrap();

    assert_eq!(store.database.schema_version().await.unwrap(), SCHEMA_VERSION);

    let records = store.database.list_walking_records(None).await.unwrap();
    assert_eq!(records.len(), 1);
    let seeded = &records[0];
    assert_eq!(seeded.steps, 0);
    assert_eq!(seeded.daily_goal, 10_000);
    assert_eq!(seeded.date, noon());

    let today = store.database.today_walking_record().await.unwrap();
    assert_eq!(today.as_ref().map(|r| r.id), Some(seeded.id));
}

#[tokio::test]
async fn test_migrate_is_idempotent() {
    let store = create_test_store().await.unwrap();
    store
        .database
        .insert_heart_rate_sample(&HeartRateSample::new(noon(), 72, 3, None))
        .await
        .unwrap();

    store.database.migrate().await.unwrap();

    assert_eq!(
        store.database.list_heart_rate_samples(None).await.unwrap().len(),
        1
    );
    assert_eq!(
        store.database.list_walking_records(None).await.unwrap().len(),
        1
    );
}

#[tokio::test]
async fn test_schema_version_change_recreates_tables() {
    let store = create_test_store().await.unwrap();
    store
        .database
        .insert_heart_rate_sample(&HeartRateSample::new(noon(), 72, 3, None))
        .await
        .unwrap();
    store.database.upsert_today_activity(4_000, 3_000.0, 30).await.unwrap();

    sqlx::query("PRAGMA user_version = 99")
        .execute(store.database.pool())
        .await
        .unwrap();
    store.database.migrate().await.unwrap();

    assert_eq!(store.database.schema_version().await.unwrap(), SCHEMA_VERSION);
    assert!(store
        .database
        .list_heart_rate_samples(None)
        .await
        .unwrap()
        .is_empty());
    let walking = store.database.list_walking_records(None).await.unwrap();
    assert_eq!(walking.len(), 1);
    assert_eq!(walking[0].steps, 0);
}

#[tokio::test]
async fn test_file_store_persists_between_opens() {
    init_test_logging();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("fittrack.db");
    let url = format!("sqlite:{}", path.display());
    let clock = ManualClock::new(noon());

    {
        let db = Database::with_clock(&url, Arc::new(clock.clone()))
            .await
            .unwrap();
        db.upsert_today_activity(1_234, 900.0, 12).await.unwrap();
        db.pool().close().await;
    }

    let reopened = Database::with_clock(&url, Arc::new(clock)).await.unwrap();
    let records = reopened.list_walking_records(None).await.unwrap();
    assert_eq!(records.len(), 1, "reopening must not seed a second record");
    assert_eq!(records[0].steps, 1_234);
    assert!(path.exists());
}

#[tokio::test]
async fn test_concurrent_writers_on_file_store() {
    init_test_logging();
    let dir = tempfile::tempdir().unwrap();
    let url = format!("sqlite:{}", dir.path().join("fittrack.db").display());
    let db = Database::with_clock(&url, Arc::new(ManualClock::new(noon())))
        .await
        .unwrap();

    let mut handles = Vec::new();
    for i in 1..=20_u32 {
        let db = db.clone();
        let n = i64::from(i);
        handles.push(tokio::spawn(async move {
            if i % 5 == 0 {
                db.set_daily_goal_from_today(5_000 + n).await.map(|_| ())
            } else {
                db.upsert_today_activity(n * 100, 75.0 * f64::from(i), n)
                    .await
                    .map(|_| ())
            }
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let records = db.list_walking_records(None).await.unwrap();
    assert_eq!(records.len(), 1, "writers must share today's record");
}

#[tokio::test]
async fn test_upsert_updates_first_record_of_the_day() {
    let store = create_test_store().await.unwrap();
    let seeded_id = store.database.today_walking_record().await.unwrap().unwrap().id;

    store.clock.advance(60 * 60 * 1000);
    let record = store
        .database
        .upsert_today_activity(6_000, 4_500.0, 50)
        .await
        .unwrap();

    assert_eq!(record.id, seeded_id);
    assert_eq!(record.steps, 6_000);
    assert_eq!(record.calories_burned, 240);
    assert!((record.average_speed - 1.5).abs() < 1e-9);
    assert_eq!(
        store.database.list_walking_records(None).await.unwrap().len(),
        1
    );
}

#[tokio::test]
async fn test_new_day_inherits_latest_goal() {
    let store = create_test_store().await.unwrap();
    store.database.set_daily_goal_from_today(12_000).await.unwrap();

    store.clock.advance(ONE_DAY_MS);
    let record = store
        .database
        .upsert_today_activity(100, 80.0, 1)
        .await
        .unwrap();

    assert_ne!(record.date, noon());
    assert_eq!(record.daily_goal, 12_000);
    assert_eq!(
        store.database.list_walking_records(None).await.unwrap().len(),
        2
    );
}

#[tokio::test]
async fn test_goal_change_leaves_past_days_untouched() {
    let store = create_test_store().await.unwrap();
    let yesterday = noon() - ONE_DAY_MS;
    store
        .database
        .insert_walking_record(&WalkingRecord::new(yesterday))
        .await
        .unwrap();

    let touched = store.database.set_daily_goal_from_today(8_000).await.unwrap();
    assert_eq!(touched, 1);

    let past = store
        .database
        .walking_record_for_day(yesterday)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(past.daily_goal, 10_000);
    let today = store.database.today_walking_record().await.unwrap().unwrap();
    assert_eq!(today.daily_goal, 8_000);
}

#[tokio::test]
async fn test_goal_change_creates_missing_today_record() {
    let store = create_test_store().await.unwrap();
    store.database.delete_all_walking_records().await.unwrap();

    let touched = store.database.set_daily_goal_from_today(15_000).await.unwrap();

    assert_eq!(touched, 1);
    let today = store.database.today_walking_record().await.unwrap().unwrap();
    assert_eq!(today.daily_goal, 15_000);
    assert_eq!(today.steps, 0);
}

#[tokio::test]
async fn test_day_boundaries_are_inclusive() {
    let store = create_test_store().await.unwrap();
    let bounds = day_bounds(noon());
    for ts in [bounds.start_ms, bounds.end_ms, bounds.end_ms + 1] {
        store
            .database
            .insert_heart_rate_sample(&HeartRateSample::new(ts, 70, 3, None))
            .await
            .unwrap();
    }

    let today = store
        .database
        .list_heart_rate_samples(Some(bounds))
        .await
        .unwrap();
    assert_eq!(today.len(), 2);
    assert_eq!(today[0].timestamp, bounds.end_ms, "newest first");
}

#[tokio::test]
async fn test_stats_on_empty_range_are_zero() {
    let store = create_test_store().await.unwrap();
    let far_past = Window::Week.ending_at(noon() - 365 * ONE_DAY_MS);

    let hr = store.database.heart_rate_stats(far_past).await.unwrap();
    assert_eq!(hr.count, 0);
    assert_eq!(hr.max, 0);
    assert!(hr.average.abs() < f64::EPSILON);

    let walking = store.database.walking_stats(far_past).await.unwrap();
    assert_eq!(walking.days, 0);
    assert_eq!(walking.total_steps, 0);
    assert!(walking.average_steps.abs() < f64::EPSILON);
}

#[tokio::test]
async fn test_writes_publish_table_changes() {
    let store = create_test_store().await.unwrap();
    let mut changes = store.database.subscribe();

    store
        .database
        .insert_heart_rate_sample(&HeartRateSample::new(noon(), 80, 2, None))
        .await
        .unwrap();
    store.database.upsert_today_activity(10, 5.0, 0).await.unwrap();
    store
        .database
        .delete_heart_rate_samples_before(noon() + 1)
        .await
        .unwrap();

    assert_eq!(
        changes.recv().await.unwrap(),
        TableChange {
            table: Table::HeartRate,
            kind: ChangeKind::Insert
        }
    );
    assert_eq!(
        changes.recv().await.unwrap(),
        TableChange {
            table: Table::Walking,
            kind: ChangeKind::Update
        }
    );
    assert_eq!(
        changes.recv().await.unwrap(),
        TableChange {
            table: Table::HeartRate,
            kind: ChangeKind::Delete
        }
    );
}

#[tokio::test]
async fn test_invalid_database_url_is_rejected() {
    init_test_logging();
    let result = Database::new("postgres://localhost/fittrack").await;
    assert!(result.is_err());
}
