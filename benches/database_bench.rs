// ABOUTME: Criterion benchmarks for record store operations using the SQLite backend
// ABOUTME: Measures sample ingestion, daily upserts, range listing, and aggregate queries
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Criterion benchmarks for record store operations.
//!
//! Measures heart-rate ingestion, daily walking upserts, range listing,
//! and aggregate statistics over an in-memory `SQLite` store.

#![allow(
    clippy::missing_docs_in_private_items,
    clippy::unwrap_used,
    missing_docs
)]

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use fittrack::constants::windows::ONE_DAY_MS;
use fittrack::database::Database;
use fittrack::models::{HeartRateSample, WalkingRecord};
use fittrack::time::{at_local_hour, ManualClock, TimeRange};
use std::sync::Arc;
use tokio::runtime::Runtime;

/// Fixed benchmark time, noon local
fn bench_now() -> i64 {
    at_local_hour(1_750_000_000_000, 12)
}

/// Create in-memory store frozen at the benchmark time
async fn create_test_db() -> Database {
    Database::with_clock("sqlite::memory:", Arc::new(ManualClock::new(bench_now())))
        .await
        .unwrap()
}

/// Seed one heart-rate sample every `spacing_ms` going back from now
async fn seed_heart_rate(db: &Database, count: i64, spacing_ms: i64) {
    let now = bench_now();
    for i in 0..count {
        let sample = HeartRateSample::new(now - i * spacing_ms, 55 + (i % 90) as i32, 3, None);
        db.insert_heart_rate_sample(&sample).await.unwrap();
    }
}

/// Seed one walking record per day going back from today
async fn seed_walking(db: &Database, days: i64) {
    db.delete_all_walking_records().await.unwrap();
    let now = bench_now();
    for day in 0..days {
        let mut record = WalkingRecord::new(now - day * ONE_DAY_MS);
        record.apply_activity(2_000 + (day * 731) % 12_000, 1_500.0, 30);
        db.insert_walking_record(&record).await.unwrap();
    }
}

/// Benchmark heart-rate sample ingestion
fn bench_heart_rate_insert(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let mut group = c.benchmark_group("database_heart_rate_insert");

    let db = rt.block_on(create_test_db());

    group.bench_function("single_sample", |b| {
        let mut offset = 0;
        b.iter(|| {
            offset += 1;
            let sample = HeartRateSample::new(bench_now() - offset, 72, 3, None);
            rt.block_on(async { db.insert_heart_rate_sample(black_box(&sample)).await })
        });
    });

    // Burst of readings after a sensor reconnect
    group.throughput(Throughput::Elements(10));
    group.bench_function("batch_10_samples", |b| {
        b.iter(|| {
            rt.block_on(async {
                for i in 0..10 {
                    let sample = HeartRateSample::new(bench_now() - i * 1_000, 80, 3, None);
                    let _ = db.insert_heart_rate_sample(&sample).await;
                }
            });
        });
    });

    group.finish();
}

/// Benchmark the per-callback walking write path
fn bench_walking_upsert(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let mut group = c.benchmark_group("database_walking_upsert");

    let db = rt.block_on(create_test_db());

    group.bench_function("today_activity", |b| {
        let mut steps = 0;
        b.iter(|| {
            steps += 10;
            rt.block_on(async {
                db.upsert_today_activity(black_box(steps), black_box(7.5), black_box(1))
                    .await
            })
        });
    });

    group.bench_function("today_lookup", |b| {
        b.iter(|| rt.block_on(async { db.today_walking_record().await }));
    });

    group.finish();
}

/// Benchmark range listing over growing histories
fn bench_range_listing(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let mut group = c.benchmark_group("database_range_listing");

    for sample_count in [100_i64, 1_000, 5_000] {
        let db = rt.block_on(create_test_db());
        rt.block_on(seed_heart_rate(&db, sample_count, 60_000));
        let last_day = TimeRange::new(bench_now() - ONE_DAY_MS, bench_now());

        group.throughput(Throughput::Elements(sample_count as u64));
        group.bench_with_input(
            BenchmarkId::new("heart_rate_last_day", sample_count),
            &db,
            |b, db| {
                b.iter(|| {
                    rt.block_on(async { db.list_heart_rate_samples(black_box(Some(last_day))).await })
                });
            },
        );
    }

    let db = rt.block_on(create_test_db());
    rt.block_on(seed_walking(&db, 365));
    let last_month = TimeRange::new(bench_now() - 30 * ONE_DAY_MS, bench_now());
    group.bench_function("walking_last_month", |b| {
        b.iter(|| rt.block_on(async { db.list_walking_records(black_box(Some(last_month))).await }));
    });

    group.finish();
}

/// Benchmark aggregate statistics
fn bench_aggregation(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let mut group = c.benchmark_group("database_aggregation");

    for sample_count in [100_i64, 1_000, 5_000] {
        let db = rt.block_on(create_test_db());
        rt.block_on(seed_heart_rate(&db, sample_count, 30_000));
        let range = TimeRange::new(0, bench_now());

        group.bench_with_input(
            BenchmarkId::new("heart_rate_stats", sample_count),
            &db,
            |b, db| {
                b.iter(|| rt.block_on(async { db.heart_rate_stats(black_box(range)).await }));
            },
        );
    }

    for days in [30_i64, 365] {
        let db = rt.block_on(create_test_db());
        rt.block_on(seed_walking(&db, days));
        let range = TimeRange::new(0, bench_now());

        group.bench_with_input(BenchmarkId::new("walking_stats", days), &db, |b, db| {
            b.iter(|| rt.block_on(async { db.walking_stats(black_box(range)).await }));
        });
    }

    group.finish();
}

/// Benchmark concurrent readers against the single writer path
fn bench_concurrent_operations(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let mut group = c.benchmark_group("database_concurrent");
    group.sample_size(30);

    let db = rt.block_on(create_test_db());
    rt.block_on(seed_heart_rate(&db, 500, 60_000));
    let last_day = TimeRange::new(bench_now() - ONE_DAY_MS, bench_now());

    group.throughput(Throughput::Elements(20));
    group.bench_function("mixed_10_reads_10_writes", |b| {
        b.iter(|| {
            rt.block_on(async {
                let mut handles = Vec::with_capacity(20);

                for _ in 0..10 {
                    let db = db.clone();
                    handles.push(tokio::spawn(async move {
                        db.heart_rate_stats(last_day).await.map(|_| ())
                    }));
                }

                for i in 0..10 {
                    let db = db.clone();
                    handles.push(tokio::spawn(async move {
                        db.upsert_today_activity(i * 100, 75.0, 1).await.map(|_| ())
                    }));
                }

                for handle in handles {
                    let _ = handle.await;
                }
            });
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_heart_rate_insert,
    bench_walking_upsert,
    bench_range_listing,
    bench_aggregation,
    bench_concurrent_operations,
);
criterion_main!(benches);
