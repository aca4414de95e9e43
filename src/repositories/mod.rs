// ABOUTME: Repository traits over the record store with catch-log-degrade error handling
// ABOUTME: Reads fall back to neutral defaults; the three mutations log and re-raise store failures
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Repositories
//!
//! Thin async access to the record store used by trackers, reminders and
//! services. Read operations never fail: a store error is logged and a neutral
//! value (empty list, zero, `None`) is returned instead. Validation rejections
//! are logged at `warn` and reported as "not stored" rather than as errors.
//!
//! Watch streams emit the current query result immediately and again after
//! every write to their table.

mod heart_rate_repository;
mod walking_repository;

pub use heart_rate_repository::{HeartRateRepository, HeartRateRepositoryImpl};
pub use walking_repository::{WalkingRepository, WalkingRepositoryImpl};

use crate::database::{Database, Table};
use crate::errors::AppResult;
use futures_util::stream::BoxStream;
use std::future::Future;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, error};

/// Stream of query results re-emitted on every change to the watched table
pub type RecordStream<T> = BoxStream<'static, Vec<T>>;

/// Return the value, or log the failure and return `default`
pub(crate) fn or_default_logged<T>(result: AppResult<T>, default: T, operation: &str) -> T {
    match result {
        Ok(value) => value,
        Err(e) => {
            error!(error = %e, operation, "Record store read failed, using default");
            default
        }
    }
}

/// Re-run `query` after every change to `table`
///
/// A failing query yields an empty list and the stream keeps watching.
pub(crate) fn watch<T, F, Fut>(db: &Database, table: Table, operation: &'static str, query: F) -> RecordStream<T>
where
    T: Send + 'static,
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = AppResult<Vec<T>>> + Send,
{
    let mut changes = db.subscribe();

    Box::pin(async_stream::stream! {
        'watch: loop {
            match query().await {
                Ok(rows) => yield rows,
                Err(e) => {
                    error!(error = %e, operation, table = %table, "Watch query failed");
                    yield Vec::new();
                }
            }

            loop {
                match changes.recv().await {
                    Ok(change) if change.table == table => break,
                    Ok(_) => {}
                    Err(RecvError::Lagged(skipped)) => {
                        debug!(skipped, table = %table, "Watch stream lagged, re-querying");
                        break;
                    }
                    Err(RecvError::Closed) => break 'watch,
                }
            }
        }
    })
}
