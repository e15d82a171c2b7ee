// ABOUTME: Per-user achievement record storage
// ABOUTME: Keeps the raw stored JSON array so legacy and malformed entries can be repaired on read
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use uuid::Uuid;

use super::points::{increment_balance, insert_row};
use crate::errors::{AppError, AppResult};
use crate::models::{PointTransaction, UserAchievementRecord};

/// Achievement record database operations manager
///
/// The column is stored untyped on purpose: older writers stored bare badge
/// id strings, and those must reach the evaluator's repair step intact.
pub struct AchievementsManager {
    pool: SqlitePool,
}

impl AchievementsManager {
    /// Create a new achievements manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Load the raw stored JSON for a user, `None` if nothing was ever stored
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn load_raw(&self, user_id: Uuid) -> AppResult<Option<String>> {
        sqlx::query_scalar("SELECT entries_json FROM user_achievements WHERE user_id = $1")
            .bind(user_id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to load achievements: {e}")))
    }

    /// Replace the stored collection with well-formed records
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the database write fails
    pub async fn store(&self, user_id: Uuid, records: &[UserAchievementRecord]) -> AppResult<()> {
        let json = serde_json::to_string(records)?;
        self.store_raw(user_id, &json).await
    }

    /// Replace the stored collection with an arbitrary JSON document
    ///
    /// # Errors
    ///
    /// Returns an error if the database write fails
    pub async fn store_raw(&self, user_id: Uuid, entries_json: &str) -> AppResult<()> {
        let mut conn = self
            .pool
            .acquire()
            .await
            .map_err(|e| AppError::database(format!("Failed to acquire connection: {e}")))?;
        upsert_entries(&mut *conn, user_id, entries_json).await
    }

    /// Store `records` and append their bonus transactions in one transaction
    ///
    /// Either every bonus is credited and the records are saved, or nothing
    /// changes. Returns the balance after the last bonus, or `None` when
    /// `bonuses` is empty.
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` for an unknown user and `DatabaseError`
    /// when any statement or the commit fails
    pub async fn store_with_bonuses(
        &self,
        user_id: Uuid,
        records: &[UserAchievementRecord],
        bonuses: &[PointTransaction],
    ) -> AppResult<Option<i64>> {
        let json = serde_json::to_string(records)?;
        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::database(format!("Failed to begin achievement transaction: {e}"))
        })?;

        let mut balance = None;
        for bonus in bonuses {
            let new_balance = increment_balance(&mut *tx, user_id, bonus.amount)
                .await?
                .ok_or_else(|| {
                    AppError::not_found(format!("User {user_id}")).with_user_id(user_id)
                })?;
            insert_row(&mut *tx, bonus, None).await.map_err(|e| {
                AppError::database(format!("Failed to insert achievement bonus: {e}"))
                    .with_user_id(user_id)
            })?;
            balance = Some(new_balance);
        }
        upsert_entries(&mut *tx, user_id, &json).await?;

        tx.commit().await.map_err(|e| {
            AppError::database(format!("Failed to commit achievement transaction: {e}"))
                .with_user_id(user_id)
        })?;
        Ok(balance)
    }
}

async fn upsert_entries(
    conn: &mut SqliteConnection,
    user_id: Uuid,
    entries_json: &str,
) -> AppResult<()> {
    sqlx::query(
        r"
        INSERT INTO user_achievements (user_id, entries_json, updated_at)
        VALUES ($1, $2, $3)
        ON CONFLICT(user_id) DO UPDATE SET
            entries_json = excluded.entries_json,
            updated_at = excluded.updated_at
        ",
    )
    .bind(user_id.to_string())
    .bind(entries_json)
    .bind(Utc::now().to_rfc3339())
    .execute(&mut *conn)
    .await
    .map_err(|e| {
        AppError::database(format!("Failed to store achievements: {e}")).with_user_id(user_id)
    })?;

    Ok(())
}
