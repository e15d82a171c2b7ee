// ABOUTME: Append-only point ledger owning the authoritative running balance
// ABOUTME: Validates awards, appends transactions atomically, and audits the balance invariant
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use tracing::debug;
use uuid::Uuid;

use crate::database::points::InsertOutcome;
use crate::database::Database;
use crate::errors::{AppError, AppResult};
use crate::models::{LedgerReceipt, PointKind, PointTransaction, UserAchievementRecord};

/// Stored balance compared against the sum of the ledger
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceCheck {
    /// Denormalized balance on the user row
    pub stored: i64,
    /// Sum of all transaction amounts
    pub recomputed: i64,
}

impl BalanceCheck {
    /// Whether the stored balance matches the ledger
    #[must_use]
    pub const fn is_consistent(&self) -> bool {
        self.stored == self.recomputed
    }
}

/// Point ledger
///
/// The only writer of `point_transactions` and `users.points_balance`.
#[derive(Clone)]
pub struct PointLedger {
    database: Database,
}

impl PointLedger {
    /// Create a ledger over `database`
    #[must_use]
    pub const fn new(database: Database) -> Self {
        Self { database }
    }

    /// Append one transaction and increment the balance in the same unit of work
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` for a zero amount, `ResourceNotFound` for an
    /// unknown user, and `DatabaseError` when persistence fails. Nothing is
    /// written in any error case.
    pub async fn append(
        &self,
        user_id: Uuid,
        amount: i64,
        kind: PointKind,
        reason: &str,
        occurred_at: DateTime<Utc>,
    ) -> AppResult<LedgerReceipt> {
        let transaction = Self::build_transaction(user_id, amount, kind, reason, occurred_at)?;
        match self
            .database
            .points()
            .insert_transaction(&transaction, None)
            .await?
        {
            InsertOutcome::Inserted { new_balance } => Ok(Self::receipt(&transaction, new_balance)),
            // Only keyed inserts can collide on the daily index
            InsertOutcome::DailySlotTaken => Err(AppError::internal(
                "Unkeyed ledger insert reported a daily slot collision",
            )),
        }
    }

    /// Append at most one transaction of `kind` per user per UTC day
    ///
    /// Returns `None` when the day's slot is already taken. The check is the
    /// unique index itself, so concurrent callers cannot both succeed.
    ///
    /// # Errors
    ///
    /// Same as [`PointLedger::append`]
    pub async fn append_once_per_day(
        &self,
        user_id: Uuid,
        amount: i64,
        kind: PointKind,
        reason: &str,
        occurred_at: DateTime<Utc>,
    ) -> AppResult<Option<LedgerReceipt>> {
        let transaction = Self::build_transaction(user_id, amount, kind, reason, occurred_at)?;
        let day = transaction.occurred_on();
        match self
            .database
            .points()
            .insert_transaction(&transaction, Some(day))
            .await?
        {
            InsertOutcome::Inserted { new_balance } => {
                Ok(Some(Self::receipt(&transaction, new_balance)))
            }
            InsertOutcome::DailySlotTaken => {
                debug!(
                    user_id = %user_id,
                    kind = %kind,
                    day = %day,
                    "Daily award slot already taken"
                );
                Ok(None)
            }
        }
    }

    /// Append one achievement bonus per badge and save `records` in the same unit of work
    ///
    /// Returns the balance after the last bonus, `None` when `badge_ids` is empty.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` for a zero bonus and `DatabaseError` when
    /// persistence fails. Neither the bonuses nor the records are written
    /// in any error case.
    pub async fn append_achievement_bonuses(
        &self,
        user_id: Uuid,
        badge_ids: &[String],
        bonus: i64,
        records: &[UserAchievementRecord],
        occurred_at: DateTime<Utc>,
    ) -> AppResult<Option<i64>> {
        let bonuses = badge_ids
            .iter()
            .map(|badge_id| {
                let reason = format!("Achievement earned: {badge_id}");
                Self::build_transaction(
                    user_id,
                    bonus,
                    PointKind::Achievement,
                    &reason,
                    occurred_at,
                )
            })
            .collect::<AppResult<Vec<_>>>()?;

        self.database
            .achievements()
            .store_with_bonuses(user_id, records, &bonuses)
            .await
    }

    /// Current balance
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` for an unknown user
    pub async fn balance(&self, user_id: Uuid) -> AppResult<i64> {
        self.database.points().get_balance(user_id).await
    }

    /// Sum of `kind` amounts awarded on `day`
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn awarded_on(
        &self,
        user_id: Uuid,
        kind: PointKind,
        day: NaiveDate,
    ) -> AppResult<i64> {
        self.database.points().sum_kind_on_day(user_id, kind, day).await
    }

    /// Number of `kind` transactions ever appended for the user
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn count(&self, user_id: Uuid, kind: PointKind) -> AppResult<u32> {
        self.database.points().count_kind(user_id, kind).await
    }

    /// Most recent transactions, newest first
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn history(&self, user_id: Uuid, limit: u32) -> AppResult<Vec<PointTransaction>> {
        self.database
            .points()
            .list_transactions(user_id, i64::from(limit))
            .await
    }

    /// Compare the stored balance with the sum of the ledger
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` for an unknown user
    pub async fn verify_balance(&self, user_id: Uuid) -> AppResult<BalanceCheck> {
        let points = self.database.points();
        let stored = points.get_balance(user_id).await?;
        let recomputed = points.sum_transactions(user_id).await?;
        Ok(BalanceCheck { stored, recomputed })
    }

    fn build_transaction(
        user_id: Uuid,
        amount: i64,
        kind: PointKind,
        reason: &str,
        occurred_at: DateTime<Utc>,
    ) -> AppResult<PointTransaction> {
        if amount == 0 {
            return Err(
                AppError::invalid_input("Point amount must be non-zero").with_user_id(user_id)
            );
        }

        Ok(PointTransaction {
            id: Uuid::new_v4(),
            user_id,
            amount,
            kind,
            reason: reason.to_owned(),
            occurred_at,
        })
    }

    const fn receipt(transaction: &PointTransaction, new_balance: i64) -> LedgerReceipt {
        LedgerReceipt {
            transaction_id: transaction.id,
            new_balance,
        }
    }
}
