// ABOUTME: Daily walking record storage: today's upsert, goal updates, history, and aggregates
// ABOUTME: Today's record is the first record dated inside the current local calendar day
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::{ChangeKind, Database, Table};
use crate::constants::walking::DEFAULT_DAILY_GOAL;
use crate::errors::{AppResult, DatabaseError};
use crate::models::WalkingRecord;
use crate::time::{day_bounds, start_of_day, TimeRange};
use serde::{Deserialize, Serialize};
use sqlx::{Sqlite, Transaction};

const RECORD_COLUMNS: &str =
    "id, date, steps, distance, daily_goal, average_speed, calories_burned, active_minutes";

/// Aggregate walking figures over a time range
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct WalkingStats {
    /// Number of daily records
    pub days: i64,
    /// Sum of steps
    pub total_steps: i64,
    /// Sum of distance in meters
    pub total_distance: f64,
    /// Mean steps per record, 0.0 when empty
    pub average_steps: f64,
    /// Best day, 0 when empty
    pub max_steps: i64,
    /// Records whose steps reached their goal
    pub goal_achieved_count: i64,
}

impl Database {
    /// Insert a complete record and return it with its assigned id
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails
    pub async fn insert_walking_record(&self, record: &WalkingRecord) -> AppResult<WalkingRecord> {
        let result = sqlx::query(
            "INSERT INTO walking_records \
             (date, steps, distance, daily_goal, average_speed, calories_burned, active_minutes) \
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(record.date)
        .bind(record.steps)
        .bind(record.distance)
        .bind(record.daily_goal)
        .bind(record.average_speed)
        .bind(record.calories_burned)
        .bind(record.active_minutes)
        .execute(&self.pool)
        .await
        .map_err(|e| DatabaseError::query("insert walking record", &e))?;

        self.notify(Table::Walking, ChangeKind::Insert);

        Ok(WalkingRecord {
            id: result.last_insert_rowid(),
            ..record.clone()
        })
    }

    /// Overwrite a stored record by id
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails
    pub async fn update_walking_record(&self, record: &WalkingRecord) -> AppResult<bool> {
        let result = sqlx::query(
            "UPDATE walking_records SET date = $1, steps = $2, distance = $3, daily_goal = $4, \
             average_speed = $5, calories_burned = $6, active_minutes = $7 WHERE id = $8",
        )
        .bind(record.date)
        .bind(record.steps)
        .bind(record.distance)
        .bind(record.daily_goal)
        .bind(record.average_speed)
        .bind(record.calories_burned)
        .bind(record.active_minutes)
        .bind(record.id)
        .execute(&self.pool)
        .await
        .map_err(|e| DatabaseError::query("update walking record", &e))?;

        let updated = result.rows_affected() > 0;
        if updated {
            self.notify(Table::Walking, ChangeKind::Update);
        }
        Ok(updated)
    }

    /// Remove one record by id
    ///
    /// # Errors
    ///
    /// Returns an error if the delete fails
    pub async fn delete_walking_record(&self, id: i64) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM walking_records WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| DatabaseError::query("delete walking record", &e))?;

        let deleted = result.rows_affected() > 0;
        if deleted {
            self.notify(Table::Walking, ChangeKind::Delete);
        }
        Ok(deleted)
    }

    /// Remove every walking record
    ///
    /// # Errors
    ///
    /// Returns an error if the delete fails
    pub async fn delete_all_walking_records(&self) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM walking_records")
            .execute(&self.pool)
            .await
            .map_err(|e| DatabaseError::query("delete all walking records", &e))?;
        self.notify(Table::Walking, ChangeKind::Delete);
        Ok(result.rows_affected())
    }

    /// First record dated on the local calendar day containing `timestamp_ms`
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn walking_record_for_day(
        &self,
        timestamp_ms: i64,
    ) -> AppResult<Option<WalkingRecord>> {
        let bounds = day_bounds(timestamp_ms);
        let record = sqlx::query_as::<_, WalkingRecord>(&format!(
            "SELECT {RECORD_COLUMNS} FROM walking_records \
             WHERE date >= $1 AND date <= $2 ORDER BY date ASC, id ASC LIMIT 1"
        ))
        .bind(bounds.start_ms)
        .bind(bounds.end_ms)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DatabaseError::query("walking record for day", &e))?;
        Ok(record)
    }

    /// Today's record according to the store's clock
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn today_walking_record(&self) -> AppResult<Option<WalkingRecord>> {
        self.walking_record_for_day(self.now_millis()).await
    }

    /// Records inside `range` (all records when `None`), newest first
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn list_walking_records(
        &self,
        range: Option<TimeRange>,
    ) -> AppResult<Vec<WalkingRecord>> {
        let records = match range {
            Some(range) => {
                sqlx::query_as::<_, WalkingRecord>(&format!(
                    "SELECT {RECORD_COLUMNS} FROM walking_records \
                     WHERE date >= $1 AND date <= $2 ORDER BY date DESC, id DESC"
                ))
                .bind(range.start_ms)
                .bind(range.end_ms)
                .fetch_all(&self.pool)
                .await
            }
            None => {
                sqlx::query_as::<_, WalkingRecord>(&format!(
                    "SELECT {RECORD_COLUMNS} FROM walking_records ORDER BY date DESC, id DESC"
                ))
                .fetch_all(&self.pool)
                .await
            }
        }
        .map_err(|e| DatabaseError::query("list walking records", &e))?;
        Ok(records)
    }

    /// Records inside `range` whose steps reached the goal, newest first
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn goal_achieved_records(&self, range: TimeRange) -> AppResult<Vec<WalkingRecord>> {
        let records = sqlx::query_as::<_, WalkingRecord>(&format!(
            "SELECT {RECORD_COLUMNS} FROM walking_records \
             WHERE steps >= daily_goal AND date >= $1 AND date <= $2 ORDER BY date DESC, id DESC"
        ))
        .bind(range.start_ms)
        .bind(range.end_ms)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DatabaseError::query("goal achieved records", &e))?;
        Ok(records)
    }

    /// Totals, averages and goal counts over `range`
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn walking_stats(&self, range: TimeRange) -> AppResult<WalkingStats> {
        let (days, total_steps, total_distance, average_steps, max_steps, achieved): (
            i64,
            i64,
            f64,
            Option<f64>,
            Option<i64>,
            i64,
        ) = sqlx::query_as(
            "SELECT COUNT(*), \
                    COALESCE(SUM(steps), 0), \
                    CAST(COALESCE(SUM(distance), 0) AS REAL), \
                    AVG(steps), \
                    MAX(steps), \
                    COALESCE(SUM(CASE WHEN steps >= daily_goal THEN 1 ELSE 0 END), 0) \
             FROM walking_records WHERE date >= $1 AND date <= $2",
        )
        .bind(range.start_ms)
        .bind(range.end_ms)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| DatabaseError::query("walking stats", &e))?;

        Ok(WalkingStats {
            days,
            total_steps,
            total_distance,
            average_steps: average_steps.unwrap_or(0.0),
            max_steps: max_steps.unwrap_or(0),
            goal_achieved_count: achieved,
        })
    }

    /// Write today's activity totals in one transaction
    ///
    /// Updates today's record in place, or inserts one when the day has none.
    /// A new record inherits the goal of the most recent earlier record.
    /// Each transaction opens with a write so concurrent writers queue on the
    /// `SQLite` write lock instead of failing to upgrade a read lock.
    ///
    /// # Errors
    ///
    /// Returns an error if the transaction fails
    pub async fn upsert_today_activity(
        &self,
        steps: i64,
        distance: f64,
        active_minutes: i64,
    ) -> AppResult<WalkingRecord> {
        let now = self.now_millis();
        let bounds = day_bounds(now);
        let mut totals = WalkingRecord::new(now);
        totals.apply_activity(steps, distance, active_minutes);

        let mut tx = self.begin("upsert today activity").await?;

        let updated = sqlx::query_as::<_, WalkingRecord>(&format!(
            "UPDATE walking_records SET steps = $1, distance = $2, average_speed = $3, \
             calories_burned = $4, active_minutes = $5 \
             WHERE id = (SELECT id FROM walking_records \
                         WHERE date >= $6 AND date <= $7 ORDER BY date ASC, id ASC LIMIT 1) \
             RETURNING {RECORD_COLUMNS}"
        ))
        .bind(totals.steps)
        .bind(totals.distance)
        .bind(totals.average_speed)
        .bind(totals.calories_burned)
        .bind(totals.active_minutes)
        .bind(bounds.start_ms)
        .bind(bounds.end_ms)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| DatabaseError::query("update today's steps", &e))?;

        let (record, kind) = match updated {
            Some(record) => (record, ChangeKind::Update),
            None => {
                let mut record = totals.with_goal(Self::latest_goal(&mut tx).await?);
                record.id = Self::insert_in_tx(&mut tx, &record).await?;
                (record, ChangeKind::Insert)
            }
        };

        tx.commit()
            .await
            .map_err(|e| DatabaseError::TransactionFailed {
                context: format!("commit today's steps: {e}"),
            })?;
        self.notify(Table::Walking, kind);

        Ok(record)
    }

    /// Set `daily_goal` on every record dated from the start of today onward
    ///
    /// When today has no record yet, one is created carrying the new goal so
    /// that later step updates inherit it. Returns the number of records touched.
    ///
    /// # Errors
    ///
    /// Returns an error if the transaction fails
    pub async fn set_daily_goal_from_today(&self, daily_goal: i64) -> AppResult<u64> {
        let now = self.now_millis();
        let mut tx = self.begin("update daily goal").await?;

        let updated = sqlx::query("UPDATE walking_records SET daily_goal = $1 WHERE date >= $2")
            .bind(daily_goal)
            .bind(start_of_day(now))
            .execute(&mut *tx)
            .await
            .map_err(|e| DatabaseError::query("update daily goal", &e))?
            .rows_affected();

        let touched = if Self::first_record_of_day(&mut tx, now).await?.is_none() {
            let record = WalkingRecord::new(now).with_goal(daily_goal);
            Self::insert_in_tx(&mut tx, &record).await?;
            updated + 1
        } else {
            updated
        };

        tx.commit()
            .await
            .map_err(|e| DatabaseError::TransactionFailed {
                context: format!("commit daily goal: {e}"),
            })?;
        self.notify(Table::Walking, ChangeKind::Update);

        Ok(touched)
    }

    async fn begin(&self, operation: &str) -> AppResult<Transaction<'static, Sqlite>> {
        let tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DatabaseError::TransactionFailed {
                context: format!("{operation}: {e}"),
            })?;
        Ok(tx)
    }

    async fn first_record_of_day(
        tx: &mut Transaction<'static, Sqlite>,
        timestamp_ms: i64,
    ) -> AppResult<Option<WalkingRecord>> {
        let bounds = day_bounds(timestamp_ms);
        let record = sqlx::query_as::<_, WalkingRecord>(&format!(
            "SELECT {RECORD_COLUMNS} FROM walking_records \
             WHERE date >= $1 AND date <= $2 ORDER BY date ASC, id ASC LIMIT 1"
        ))
        .bind(bounds.start_ms)
        .bind(bounds.end_ms)
        .fetch_optional(&mut **tx)
        .await
        .map_err(|e| DatabaseError::query("today's walking record", &e))?;
        Ok(record)
    }

    async fn latest_goal(tx: &mut Transaction<'static, Sqlite>) -> AppResult<i64> {
        let goal: Option<i64> = sqlx::query_scalar(
            "SELECT daily_goal FROM walking_records ORDER BY date DESC, id DESC LIMIT 1",
        )
        .fetch_optional(&mut **tx)
        .await
        .map_err(|e| DatabaseError::query("latest daily goal", &e))?;
        Ok(goal.unwrap_or(DEFAULT_DAILY_GOAL))
    }

    async fn insert_in_tx(
        tx: &mut Transaction<'static, Sqlite>,
        record: &WalkingRecord,
    ) -> AppResult<i64> {
        let result = sqlx::query(
            "INSERT INTO walking_records \
             (date, steps, distance, daily_goal, average_speed, calories_burned, active_minutes) \
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(record.date)
        .bind(record.steps)
        .bind(record.distance)
        .bind(record.daily_goal)
        .bind(record.average_speed)
        .bind(record.calories_burned)
        .bind(record.active_minutes)
        .execute(&mut **tx)
        .await
        .map_err(|e| DatabaseError::query("insert today's walking record", &e))?;
        Ok(result.last_insert_rowid())
    }
}
