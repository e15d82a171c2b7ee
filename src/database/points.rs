// ABOUTME: Point transaction database operations with atomic balance mutation
// ABOUTME: Inserts ledger rows and increments users.points_balance in one SQLite transaction
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use chrono::NaiveDate;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection, SqlitePool};
use uuid::Uuid;

use super::users::{parse_timestamp, parse_uuid};
use crate::errors::{is_unique_violation, AppError, AppResult};
use crate::models::{PointKind, PointTransaction};

/// Date format used for `occurred_on` and `daily_key`
const DAY_FORMAT: &str = "%Y-%m-%d";

/// Outcome of a transactional insert
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    /// Row inserted; carries the balance read inside the same transaction
    Inserted {
        /// Balance after the increment
        new_balance: i64,
    },
    /// The (user, kind, day) slot was already taken; nothing changed
    DailySlotTaken,
}

/// Add `amount` to the user's balance on `conn`; `None` for an unknown user
pub(crate) async fn increment_balance(
    conn: &mut SqliteConnection,
    user_id: Uuid,
    amount: i64,
) -> AppResult<Option<i64>> {
    sqlx::query_scalar(
        r"
        UPDATE users
        SET points_balance = points_balance + $1
        WHERE id = $2
        RETURNING points_balance
        ",
    )
    .bind(amount)
    .bind(user_id.to_string())
    .fetch_optional(&mut *conn)
    .await
    .map_err(|e| AppError::database(format!("Failed to increment balance: {e}")))
}

/// Insert one ledger row on `conn`, leaving unique violations to the caller
pub(crate) async fn insert_row(
    conn: &mut SqliteConnection,
    transaction: &PointTransaction,
    daily_key: Option<NaiveDate>,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r"
        INSERT INTO point_transactions
            (id, user_id, amount, kind, reason, occurred_at, occurred_on, daily_key)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        ",
    )
    .bind(transaction.id.to_string())
    .bind(transaction.user_id.to_string())
    .bind(transaction.amount)
    .bind(transaction.kind.as_str())
    .bind(&transaction.reason)
    .bind(transaction.occurred_at.to_rfc3339())
    .bind(transaction.occurred_on().format(DAY_FORMAT).to_string())
    .bind(daily_key.map(|day| day.format(DAY_FORMAT).to_string()))
    .execute(&mut *conn)
    .await?;
    Ok(())
}

/// Point ledger database operations manager
pub struct PointsManager {
    pool: SqlitePool,
}

impl PointsManager {
    /// Create a new points manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a transaction and increment the owner's balance atomically
    ///
    /// When `daily_key` is set the insert competes for the unique
    /// (user, kind, day) slot; losing that race rolls back the balance
    /// increment and reports [`InsertOutcome::DailySlotTaken`].
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` for an unknown user and `DatabaseError`
    /// when either statement or the commit fails. No partial state is left.
    pub async fn insert_transaction(
        &self,
        transaction: &PointTransaction,
        daily_key: Option<NaiveDate>,
    ) -> AppResult<InsertOutcome> {
        let user_id = transaction.user_id;
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::database(format!("Failed to begin ledger transaction: {e}")))?;

        let Some(new_balance) = increment_balance(&mut *tx, user_id, transaction.amount).await?
        else {
            tx.rollback()
                .await
                .map_err(|e| AppError::database(format!("Failed to roll back: {e}")))?;
            return Err(AppError::not_found(format!("User {user_id}")).with_user_id(user_id));
        };

        let inserted = insert_row(&mut *tx, transaction, daily_key).await;

        match inserted {
            Ok(()) => {
                tx.commit().await.map_err(|e| {
                    AppError::database(format!("Failed to commit ledger transaction: {e}"))
                })?;
                Ok(InsertOutcome::Inserted { new_balance })
            }
            Err(e) if daily_key.is_some() && is_unique_violation(&e) => {
                tx.rollback()
                    .await
                    .map_err(|e| AppError::database(format!("Failed to roll back: {e}")))?;
                Ok(InsertOutcome::DailySlotTaken)
            }
            Err(e) => Err(AppError::database(format!(
                "Failed to insert point transaction: {e}"
            ))
            .with_user_id(user_id)),
        }
    }

    /// Current denormalized balance
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` for an unknown user
    pub async fn get_balance(&self, user_id: Uuid) -> AppResult<i64> {
        sqlx::query_scalar("SELECT points_balance FROM users WHERE id = $1")
            .bind(user_id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to get balance: {e}")))?
            .ok_or_else(|| AppError::not_found(format!("User {user_id}")))
    }

    /// Sum of all transaction amounts for a user, recomputed from the ledger
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn sum_transactions(&self, user_id: Uuid) -> AppResult<i64> {
        sqlx::query_scalar(
            "SELECT COALESCE(SUM(amount), 0) FROM point_transactions WHERE user_id = $1",
        )
        .bind(user_id.to_string())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to sum transactions: {e}")))
    }

    /// Whether at least one transaction of `kind` exists on `day`
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn has_kind_on_day(
        &self,
        user_id: Uuid,
        kind: PointKind,
        day: NaiveDate,
    ) -> AppResult<bool> {
        sqlx::query_scalar(
            r"
            SELECT EXISTS(
                SELECT 1 FROM point_transactions
                WHERE user_id = $1 AND kind = $2 AND occurred_on = $3
            )
            ",
        )
        .bind(user_id.to_string())
        .bind(kind.as_str())
        .bind(day.format(DAY_FORMAT).to_string())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to query daily transactions: {e}")))
    }

    /// Sum of amounts of `kind` awarded on `day`
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn sum_kind_on_day(
        &self,
        user_id: Uuid,
        kind: PointKind,
        day: NaiveDate,
    ) -> AppResult<i64> {
        sqlx::query_scalar(
            r"
            SELECT COALESCE(SUM(amount), 0) FROM point_transactions
            WHERE user_id = $1 AND kind = $2 AND occurred_on = $3
            ",
        )
        .bind(user_id.to_string())
        .bind(kind.as_str())
        .bind(day.format(DAY_FORMAT).to_string())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to sum daily transactions: {e}")))
    }

    /// Number of transactions of `kind` for a user
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn count_kind(&self, user_id: Uuid, kind: PointKind) -> AppResult<u32> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM point_transactions WHERE user_id = $1 AND kind = $2",
        )
        .bind(user_id.to_string())
        .bind(kind.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to count transactions: {e}")))?;

        Ok(u32::try_from(count).unwrap_or(u32::MAX))
    }

    /// Transaction history, newest first
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails or a row is malformed
    pub async fn list_transactions(
        &self,
        user_id: Uuid,
        limit: i64,
    ) -> AppResult<Vec<PointTransaction>> {
        let rows = sqlx::query(
            r"
            SELECT id, user_id, amount, kind, reason, occurred_at
            FROM point_transactions
            WHERE user_id = $1
            ORDER BY occurred_at DESC, rowid DESC
            LIMIT $2
            ",
        )
        .bind(user_id.to_string())
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to list transactions: {e}")))?;

        rows.iter().map(Self::row_to_transaction).collect()
    }

    fn row_to_transaction(row: &SqliteRow) -> AppResult<PointTransaction> {
        let id: String = row.get("id");
        let user_id: String = row.get("user_id");
        let kind: String = row.get("kind");
        let occurred_at: String = row.get("occurred_at");

        Ok(PointTransaction {
            id: parse_uuid(&id)?,
            user_id: parse_uuid(&user_id)?,
            amount: row.get("amount"),
            kind: kind.parse()?,
            reason: row.get("reason"),
            occurred_at: parse_timestamp(&occurred_at)?,
        })
    }
}
