// ABOUTME: Heart-rate sample storage: inserts, range queries, aggregates, and age-based cleanup
// ABOUTME: Raw store access; validation and error degradation live in the repository layer
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::{ChangeKind, Database, Table};
use crate::errors::{AppResult, DatabaseError};
use crate::models::HeartRateSample;
use crate::time::TimeRange;
use serde::{Deserialize, Serialize};

const SAMPLE_COLUMNS: &str = "id, timestamp, heart_rate, accuracy, note";

/// Aggregate heart-rate figures over a time range
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct HeartRateStats {
    /// Number of samples
    pub count: i64,
    /// Mean BPM, 0.0 when empty
    pub average: f64,
    /// Highest BPM, 0 when empty
    pub max: i32,
    /// Lowest BPM, 0 when empty
    pub min: i32,
}

impl Database {
    /// Insert a sample and return it with its assigned id
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails
    pub async fn insert_heart_rate_sample(
        &self,
        sample: &HeartRateSample,
    ) -> AppResult<HeartRateSample> {
        let result = sqlx::query(
            "INSERT INTO heart_rate_records (timestamp, heart_rate, accuracy, note) VALUES ($1, $2, $3, $4)",
        )
        .bind(sample.timestamp)
        .bind(sample.heart_rate)
        .bind(sample.accuracy)
        .bind(sample.note.as_deref())
        .execute(&self.pool)
        .await
        .map_err(|e| DatabaseError::query("insert heart rate", &e))?;

        self.notify(Table::HeartRate, ChangeKind::Insert);

        Ok(HeartRateSample {
            id: result.last_insert_rowid(),
            ..sample.clone()
        })
    }

    /// Most recent sample by timestamp
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn latest_heart_rate_sample(&self) -> AppResult<Option<HeartRateSample>> {
        let sample = sqlx::query_as::<_, HeartRateSample>(&format!(
            "SELECT {SAMPLE_COLUMNS} FROM heart_rate_records ORDER BY timestamp DESC, id DESC LIMIT 1"
        ))
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DatabaseError::query("latest heart rate", &e))?;
        Ok(sample)
    }

    /// Samples inside `range` (all samples when `None`), newest first
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn list_heart_rate_samples(
        &self,
        range: Option<TimeRange>,
    ) -> AppResult<Vec<HeartRateSample>> {
        let samples = match range {
            Some(range) => {
                sqlx::query_as::<_, HeartRateSample>(&format!(
                    "SELECT {SAMPLE_COLUMNS} FROM heart_rate_records \
                     WHERE timestamp >= $1 AND timestamp <= $2 \
                     ORDER BY timestamp DESC, id DESC"
                ))
                .bind(range.start_ms)
                .bind(range.end_ms)
                .fetch_all(&self.pool)
                .await
            }
            None => {
                sqlx::query_as::<_, HeartRateSample>(&format!(
                    "SELECT {SAMPLE_COLUMNS} FROM heart_rate_records ORDER BY timestamp DESC, id DESC"
                ))
                .fetch_all(&self.pool)
                .await
            }
        }
        .map_err(|e| DatabaseError::query("list heart rates", &e))?;
        Ok(samples)
    }

    /// Count, average, max and min over `range`
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn heart_rate_stats(&self, range: TimeRange) -> AppResult<HeartRateStats> {
        let (count, average, max, min): (i64, Option<f64>, Option<i64>, Option<i64>) =
            sqlx::query_as(
                "SELECT COUNT(*), AVG(heart_rate), MAX(heart_rate), MIN(heart_rate) \
                 FROM heart_rate_records WHERE timestamp >= $1 AND timestamp <= $2",
            )
            .bind(range.start_ms)
            .bind(range.end_ms)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| DatabaseError::query("heart rate stats", &e))?;

        Ok(HeartRateStats {
            count,
            average: average.unwrap_or(0.0),
            max: max.map_or(0, |v| v as i32),
            min: min.map_or(0, |v| v as i32),
        })
    }

    /// Delete samples strictly older than `cutoff_ms`, returning the number removed
    ///
    /// # Errors
    ///
    /// Returns an error if the delete fails
    pub async fn delete_heart_rate_samples_before(&self, cutoff_ms: i64) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM heart_rate_records WHERE timestamp < $1")
            .bind(cutoff_ms)
            .execute(&self.pool)
            .await
            .map_err(|e| DatabaseError::query("delete old heart rates", &e))?;

        let removed = result.rows_affected();
        if removed > 0 {
            self.notify(Table::HeartRate, ChangeKind::Delete);
        }
        Ok(removed)
    }

    /// Delete one sample by id
    ///
    /// # Errors
    ///
    /// Returns an error if the delete fails
    pub async fn delete_heart_rate_sample(&self, id: i64) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM heart_rate_records WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| DatabaseError::query("delete heart rate", &e))?;

        let deleted = result.rows_affected() > 0;
        if deleted {
            self.notify(Table::HeartRate, ChangeKind::Delete);
        }
        Ok(deleted)
    }

    /// Remove every heart-rate sample
    ///
    /// # Errors
    ///
    /// Returns an error if the delete fails
    pub async fn delete_all_heart_rate_samples(&self) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM heart_rate_records")
            .execute(&self.pool)
            .await
            .map_err(|e| DatabaseError::query("delete all heart rates", &e))?;
        self.notify(Table::HeartRate, ChangeKind::Delete);
        Ok(result.rows_affected())
    }
}
