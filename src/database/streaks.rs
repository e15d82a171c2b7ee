// ABOUTME: Login streak database operations
// ABOUTME: Reads and upserts the per-user current/longest streak and last login date
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use chrono::{NaiveDate, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use super::users::parse_uuid;
use crate::errors::{AppError, AppResult};
use crate::models::StreakRecord;

/// Login streak database operations manager
pub struct StreakManager {
    pool: SqlitePool,
}

impl StreakManager {
    /// Create a new streak manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Get the streak record of a user, if one exists
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails or the row is malformed
    pub async fn get(&self, user_id: Uuid) -> AppResult<Option<StreakRecord>> {
        let row = sqlx::query(
            r"
            SELECT user_id, current_streak, longest_streak, last_login_date
            FROM login_streaks
            WHERE user_id = $1
            ",
        )
        .bind(user_id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to get login streak: {e}")))?;

        row.map(|r| Self::row_to_record(&r)).transpose()
    }

    /// Insert or replace the streak record of a user
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn upsert(&self, record: &StreakRecord) -> AppResult<()> {
        sqlx::query(
            r"
            INSERT INTO login_streaks
                (user_id, current_streak, longest_streak, last_login_date, updated_at)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT(user_id) DO UPDATE SET
                current_streak = excluded.current_streak,
                longest_streak = excluded.longest_streak,
                last_login_date = excluded.last_login_date,
                updated_at = excluded.updated_at
            ",
        )
        .bind(record.user_id.to_string())
        .bind(i64::from(record.current_streak))
        .bind(i64::from(record.longest_streak))
        .bind(record.last_login_date.format("%Y-%m-%d").to_string())
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::database(format!("Failed to save login streak: {e}"))
                .with_user_id(record.user_id)
        })?;

        Ok(())
    }

    fn row_to_record(row: &SqliteRow) -> AppResult<StreakRecord> {
        let user_id: String = row.get("user_id");
        let current: i64 = row.get("current_streak");
        let longest: i64 = row.get("longest_streak");
        let last_login: String = row.get("last_login_date");

        let last_login_date = NaiveDate::parse_from_str(&last_login, "%Y-%m-%d").map_err(|e| {
            AppError::database(format!("Invalid last_login_date '{last_login}': {e}"))
        })?;

        Ok(StreakRecord {
            user_id: parse_uuid(&user_id)?,
            current_streak: u32::try_from(current).unwrap_or(0),
            longest_streak: u32::try_from(longest).unwrap_or(0),
            last_login_date,
        })
    }
}
