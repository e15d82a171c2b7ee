// ABOUTME: Gamification facade composing the ledger, streak tracker, and achievement evaluator
// ABOUTME: AwardPoints and EvaluateAchievements with per-user serialization and bounded badge bonuses
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Gamification Service
//!
//! The only entry point other subsystems call. Every mutation for a user
//! runs under that user's async mutex, so daily policies, the message cap,
//! and achievement persistence never interleave for the same user inside
//! one process. The daily unique index covers the same ground across
//! processes.
//!
//! Awarding points re-evaluates achievements. Each newly earned badge
//! appends a flat achievement bonus, which can earn further badges; the
//! loop stops once a pass earns nothing, and since earned badges are never
//! earned twice it runs at most once per catalog entry.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::Serialize;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{error, instrument};
use uuid::Uuid;

use super::catalog::AchievementCatalog;
use super::evaluator::{evaluate_catalog, AchievementEvaluator, RepairedRecords};
use super::ledger::{BalanceCheck, PointLedger};
use super::snapshot::{NoExternalStatistics, SnapshotBuilder, StatisticsProvider};
use super::streaks::StreakTracker;
use crate::config::GamificationConfig;
use crate::database::Database;
use crate::errors::{AppError, AppResult};
use crate::logging::GamificationLogger;
use crate::models::{
    EvaluationOutcome, LedgerReceipt, PointKind, PointTransaction, StreakRecord, UserAccount,
    UserAchievementRecord, UserStatisticsSnapshot,
};

/// Result of one `award_points` call
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AwardOutcome {
    /// Whether a transaction was appended
    pub awarded: bool,
    /// Appended transaction, if any
    pub transaction_id: Option<Uuid>,
    /// Points actually credited (after any daily cap)
    pub amount: i64,
    /// Balance after the award and any achievement bonuses
    pub balance: i64,
    /// Badges earned as a consequence, including cascaded ones
    pub newly_earned: Vec<String>,
}

impl AwardOutcome {
    const fn skipped(balance: i64) -> Self {
        Self {
            awarded: false,
            transaction_id: None,
            amount: 0,
            balance,
            newly_earned: Vec::new(),
        }
    }
}

/// Held while mutating one user; drops the user's lock entry once unused
struct UserLockGuard<'a> {
    locks: &'a DashMap<Uuid, Arc<Mutex<()>>>,
    user_id: Uuid,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for UserLockGuard<'_> {
    fn drop(&mut self) {
        drop(self.guard.take());
        // Waiters hold their own clone, so a count of one means nobody wants it
        self.locks
            .remove_if(&self.user_id, |_, lock| Arc::strong_count(lock) == 1);
    }
}

/// Result of a login
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginOutcome {
    /// Streak after this login
    pub streak: StreakRecord,
    /// Daily login bonus
    pub award: AwardOutcome,
}

/// Result of a workout completion
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutOutcome {
    /// Daily workout points
    pub award: AwardOutcome,
    /// Consecutive workout days ending today
    pub workout_streak: u32,
    /// Streak bonus, when the streak hit the bonus length today
    pub streak_bonus: Option<AwardOutcome>,
}

/// Gamification facade
pub struct GamificationService {
    database: Database,
    config: GamificationConfig,
    ledger: PointLedger,
    streaks: StreakTracker,
    evaluator: AchievementEvaluator,
    snapshots: SnapshotBuilder,
    user_locks: DashMap<Uuid, Arc<Mutex<()>>>,
}

impl GamificationService {
    /// Create a service from its parts
    #[must_use]
    pub fn new(
        database: Database,
        config: GamificationConfig,
        catalog: Arc<AchievementCatalog>,
        provider: Arc<dyn StatisticsProvider>,
    ) -> Self {
        let ledger = PointLedger::new(database.clone());
        let streaks = StreakTracker::new(database.clone(), config.streaks.clone());
        let evaluator = AchievementEvaluator::new(database.clone(), catalog);
        let snapshots = SnapshotBuilder::new(ledger.clone(), streaks.clone(), provider);

        Self {
            database,
            config,
            ledger,
            streaks,
            evaluator,
            snapshots,
            user_locks: DashMap::new(),
        }
    }

    /// Service using the global configuration and catalog and no collaborators
    #[must_use]
    pub fn with_defaults(database: Database) -> Self {
        Self::new(
            database,
            GamificationConfig::global().clone(),
            Arc::new(AchievementCatalog::global().clone()),
            Arc::new(NoExternalStatistics),
        )
    }

    /// Configuration in effect
    #[must_use]
    pub const fn config(&self) -> &GamificationConfig {
        &self.config
    }

    /// Point ledger
    #[must_use]
    pub const fn ledger(&self) -> &PointLedger {
        &self.ledger
    }

    /// Streak tracker
    #[must_use]
    pub const fn streaks(&self) -> &StreakTracker {
        &self.streaks
    }

    /// Register a user
    ///
    /// # Errors
    ///
    /// Returns an error if the id is taken or the insert fails
    pub async fn create_user(&self, user: &UserAccount) -> AppResult<Uuid> {
        self.database.users().create_user(user).await
    }

    /// Award points now
    ///
    /// # Errors
    ///
    /// See [`GamificationService::award_points_at`]
    pub async fn award_points(
        &self,
        user_id: Uuid,
        amount: i64,
        kind: PointKind,
        reason: &str,
    ) -> AppResult<AwardOutcome> {
        self.award_points_at(user_id, amount, kind, reason, Utc::now())
            .await
    }

    /// Award points at `now`, apply the kind's daily policy, and settle achievements
    ///
    /// Once-per-day kinds already awarded on the UTC day of `now`, and
    /// messages past the daily cap, return `awarded = false` with the
    /// unchanged balance.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` for a zero amount, `ResourceNotFound` for an
    /// unknown user, and `DatabaseError` when the ledger append fails; in
    /// those cases nothing was written. A `DatabaseError` can also come from
    /// settling achievements after the award committed. The award then
    /// stays, no badge is marked earned, and [`Self::evaluate_achievements`]
    /// or the next award pays the pending badges.
    #[instrument(skip_all, fields(user_id = %user_id, kind = %kind, amount = amount))]
    pub async fn award_points_at(
        &self,
        user_id: Uuid,
        amount: i64,
        kind: PointKind,
        reason: &str,
        now: DateTime<Utc>,
    ) -> AppResult<AwardOutcome> {
        Self::validate_amount(user_id, amount)?;
        let _guard = self.lock_user(user_id).await;
        self.award_locked(user_id, amount, kind, reason, now).await
    }

    /// Evaluate achievements against a caller-supplied snapshot
    ///
    /// Newly earned badges award their bonus, which re-triggers evaluation
    /// with the updated balance. The returned progress reflects `snapshot`,
    /// so calling twice with the same snapshot yields the same progress and
    /// an empty `newly_earned` the second time.
    ///
    /// # Errors
    ///
    /// Returns an error if achievement records cannot be loaded or saved, or
    /// if a bonus cannot be appended
    #[instrument(skip_all, fields(user_id = %user_id))]
    pub async fn evaluate_achievements(
        &self,
        user_id: Uuid,
        snapshot: &UserStatisticsSnapshot,
    ) -> AppResult<EvaluationOutcome> {
        let _guard = self.lock_user(user_id).await;
        self.settle_achievements(user_id, snapshot, Utc::now()).await
    }

    /// Build the current snapshot of a user from the ledger and collaborators
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` for an unknown user
    pub async fn snapshot(&self, user_id: Uuid) -> AppResult<UserStatisticsSnapshot> {
        let user = self.database.users().require_user(user_id).await?;
        Ok(self
            .snapshots
            .build(&user, user.points_balance, Utc::now().date_naive())
            .await)
    }

    /// Current badge state, evaluated against a freshly built snapshot
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` for an unknown user, or a storage error
    pub async fn current_achievements(&self, user_id: Uuid) -> AppResult<EvaluationOutcome> {
        let snapshot = self.snapshot(user_id).await?;
        self.evaluate_achievements(user_id, &snapshot).await
    }

    /// Stored achievement records after repair
    ///
    /// # Errors
    ///
    /// Returns an error if the records cannot be loaded
    pub async fn achievement_records(
        &self,
        user_id: Uuid,
    ) -> AppResult<Vec<UserAchievementRecord>> {
        self.evaluator.records(user_id).await
    }

    /// Current balance
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` for an unknown user
    pub async fn balance(&self, user_id: Uuid) -> AppResult<i64> {
        self.ledger.balance(user_id).await
    }

    /// Most recent transactions, newest first
    ///
    /// # Errors
    ///
    /// Returns an error if the ledger query fails
    pub async fn history(&self, user_id: Uuid, limit: u32) -> AppResult<Vec<PointTransaction>> {
        self.ledger.history(user_id, limit).await
    }

    /// Compare the stored balance with the ledger sum
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` for an unknown user
    pub async fn verify_balance(&self, user_id: Uuid) -> AppResult<BalanceCheck> {
        self.ledger.verify_balance(user_id).await
    }

    // ================================================================================================
    // Collaborator flows
    // ================================================================================================

    /// Daily login: advance the login streak, then grant the daily login bonus
    ///
    /// # Errors
    ///
    /// Returns an error if the user is unknown or persistence fails
    pub async fn record_login(&self, user_id: Uuid) -> AppResult<LoginOutcome> {
        self.record_login_at(user_id, Utc::now()).await
    }

    /// Daily login at `now`
    ///
    /// # Errors
    ///
    /// Returns an error if the user is unknown or persistence fails
    pub async fn record_login_at(
        &self,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> AppResult<LoginOutcome> {
        let _guard = self.lock_user(user_id).await;

        self.database.users().require_user(user_id).await?;
        let streak = self.streaks.record_login(user_id, now.date_naive()).await?;
        GamificationLogger::log_streak_updated(
            user_id,
            streak.current_streak,
            streak.longest_streak,
        );

        let award = self
            .award_locked(
                user_id,
                self.config.points.daily_login,
                PointKind::Login,
                "Daily login",
                now,
            )
            .await?;

        Ok(LoginOutcome { streak, award })
    }

    /// Workout completed today
    ///
    /// # Errors
    ///
    /// Returns an error if the user is unknown or persistence fails
    pub async fn complete_workout(&self, user_id: Uuid) -> AppResult<WorkoutOutcome> {
        self.complete_workout_at(user_id, Utc::now()).await
    }

    /// Workout completed at `now`: daily workout points, then the streak bonus
    ///
    /// The bonus is granted when the workout streak ending on the UTC day of
    /// `now` is exactly the configured length, at most once per day.
    ///
    /// # Errors
    ///
    /// Returns an error if the user is unknown or persistence fails
    pub async fn complete_workout_at(
        &self,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> AppResult<WorkoutOutcome> {
        let _guard = self.lock_user(user_id).await;

        let award = self
            .award_locked(
                user_id,
                self.config.points.workout_completed,
                PointKind::Workout,
                "Workout completed",
                now,
            )
            .await?;

        let bonus_days = self.config.streaks.workout_streak_bonus_days;
        let workout_streak = self.streaks.workout_streak(user_id, now.date_naive()).await?;

        let streak_bonus = if workout_streak == bonus_days {
            let reason = format!("{bonus_days}-day workout streak");
            Some(
                self.award_locked(
                    user_id,
                    self.config.points.workout_streak_bonus,
                    PointKind::Streak,
                    &reason,
                    now,
                )
                .await?,
            )
        } else {
            None
        };

        Ok(WorkoutOutcome {
            award,
            workout_streak,
            streak_bonus,
        })
    }

    /// Message sent; capped per day
    ///
    /// # Errors
    ///
    /// Returns an error if the user is unknown or persistence fails
    pub async fn record_message(&self, user_id: Uuid) -> AppResult<AwardOutcome> {
        let amount = self.config.points.message_sent;
        self.award_points(user_id, amount, PointKind::Message, "Message sent")
            .await
    }

    /// Friend request accepted
    ///
    /// # Errors
    ///
    /// Returns an error if the user is unknown or persistence fails
    pub async fn accept_friend(&self, user_id: Uuid) -> AppResult<AwardOutcome> {
        let amount = self.config.points.friend_accepted;
        self.award_points(user_id, amount, PointKind::Friend, "Friend request accepted")
            .await
    }

    /// Goal completed
    ///
    /// # Errors
    ///
    /// Returns an error if the user is unknown or persistence fails
    pub async fn complete_goal(&self, user_id: Uuid, goal_title: &str) -> AppResult<AwardOutcome> {
        let amount = self.config.points.goal_completed;
        let reason = format!("Goal completed: {goal_title}");
        self.award_points(user_id, amount, PointKind::Goal, &reason)
            .await
    }

    /// Training program selected
    ///
    /// # Errors
    ///
    /// Returns an error if the user is unknown or persistence fails
    pub async fn select_program(
        &self,
        user_id: Uuid,
        program_name: &str,
    ) -> AppResult<AwardOutcome> {
        let amount = self.config.points.program_selected;
        let reason = format!("Program selected: {program_name}");
        self.award_points(user_id, amount, PointKind::ProgramSelection, &reason)
            .await
    }

    // ================================================================================================
    // Internals; callers hold the user's lock
    // ================================================================================================

    async fn lock_user(&self, user_id: Uuid) -> UserLockGuard<'_> {
        let lock = self
            .user_locks
            .entry(user_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        UserLockGuard {
            locks: &self.user_locks,
            user_id,
            guard: Some(lock.lock_owned().await),
        }
    }

    fn validate_amount(user_id: Uuid, amount: i64) -> AppResult<()> {
        if amount == 0 {
            return Err(
                AppError::invalid_input("Point amount must be non-zero").with_user_id(user_id)
            );
        }
        Ok(())
    }

    async fn award_locked(
        &self,
        user_id: Uuid,
        amount: i64,
        kind: PointKind,
        reason: &str,
        now: DateTime<Utc>,
    ) -> AppResult<AwardOutcome> {
        let user = self.database.users().require_user(user_id).await?;

        let appended = self
            .append_with_policy(&user, amount, kind, reason, now)
            .await?;
        let Some((receipt, credited)) = appended else {
            let balance = self.ledger.balance(user_id).await?;
            return Ok(AwardOutcome::skipped(balance));
        };
        GamificationLogger::log_points_awarded(user_id, kind, credited, receipt.new_balance);

        let snapshot = self
            .snapshots
            .build(&user, receipt.new_balance, now.date_naive())
            .await;

        let newly_earned = self
            .settle_achievements(user_id, &snapshot, now)
            .await
            .map_err(|e| {
                error!(
                    user_id = %user_id,
                    transaction_id = %receipt.transaction_id,
                    "Award committed but achievement settlement failed: {e}"
                );
                e
            })?
            .newly_earned;

        let balance = if newly_earned.is_empty() {
            receipt.new_balance
        } else {
            self.ledger.balance(user_id).await?
        };

        Ok(AwardOutcome {
            awarded: true,
            transaction_id: Some(receipt.transaction_id),
            amount: credited,
            balance,
            newly_earned,
        })
    }

    /// Append under the kind's daily policy; `None` when the policy refuses
    async fn append_with_policy(
        &self,
        user: &UserAccount,
        amount: i64,
        kind: PointKind,
        reason: &str,
        now: DateTime<Utc>,
    ) -> AppResult<Option<(LedgerReceipt, i64)>> {
        if kind.is_once_per_day() {
            let receipt = self
                .ledger
                .append_once_per_day(user.id, amount, kind, reason, now)
                .await?;
            if receipt.is_none() {
                GamificationLogger::log_award_skipped(user.id, kind, "already awarded today");
            }
            return Ok(receipt.map(|r| (r, amount)));
        }

        let credited = match self.config.daily_cap(kind) {
            Some(cap) if amount > 0 => {
                let awarded_today = self
                    .ledger
                    .awarded_on(user.id, kind, now.date_naive())
                    .await?;
                amount.min(cap - awarded_today)
            }
            _ => amount,
        };
        if credited <= 0 && amount > 0 {
            GamificationLogger::log_award_skipped(user.id, kind, "daily cap reached");
            return Ok(None);
        }

        let receipt = self
            .ledger
            .append(user.id, credited, kind, reason, now)
            .await?;
        Ok(Some((receipt, credited)))
    }

    /// Evaluate, pay bonuses for newly earned badges, and repeat until quiet
    ///
    /// The cascade runs in memory; the earned records and every bonus are
    /// then committed in one transaction, so a failure leaves the badges
    /// unearned and the next evaluation pays them.
    async fn settle_achievements(
        &self,
        user_id: Uuid,
        snapshot: &UserStatisticsSnapshot,
        now: DateTime<Utc>,
    ) -> AppResult<EvaluationOutcome> {
        let RepairedRecords {
            mut records,
            changed,
        } = self.evaluator.load(user_id, now).await?;
        let catalog = self.evaluator.catalog();

        let first = evaluate_catalog(catalog, snapshot, &mut records, now);
        if first.newly_earned.is_empty() {
            if changed {
                self.evaluator.save_repaired(user_id, &records).await?;
            }
            return Ok(first);
        }

        let bonus = self.config.points.achievement_bonus;
        let mut working = snapshot.clone();
        working.points_balance = self.ledger.balance(user_id).await?;
        let mut newly_earned = Vec::new();
        let mut pending = first.newly_earned;

        while !pending.is_empty() {
            for _ in &pending {
                working.points_balance = working.points_balance.saturating_add(bonus);
            }
            newly_earned.append(&mut pending);
            pending = evaluate_catalog(catalog, &working, &mut records, now).newly_earned;
        }

        self.ledger
            .append_achievement_bonuses(user_id, &newly_earned, bonus, &records, now)
            .await?;
        for badge_id in &newly_earned {
            GamificationLogger::log_achievement_earned(user_id, badge_id);
        }

        // Progress for the caller's snapshot; records now include every cascade
        let settled = evaluate_catalog(catalog, snapshot, &mut records, now);
        Ok(EvaluationOutcome {
            newly_earned,
            progress: settled.progress,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::database::test_utils::{create_test_db, create_test_user};
    use crate::models::UserRole;

    #[tokio::test]
    async fn test_user_locks_released_after_mutations() {
        let database = create_test_db().await.unwrap();
        let first = create_test_user(&database, UserRole::Athlete).await.unwrap();
        let second = create_test_user(&database, UserRole::Coach).await.unwrap();
        let service = GamificationService::new(
            database,
            GamificationConfig::default(),
            Arc::new(AchievementCatalog::builtin()),
            Arc::new(NoExternalStatistics),
        );
        let now = Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap();

        service
            .award_points_at(first, 20, PointKind::Goal, "goal", now)
            .await
            .unwrap();
        service.record_login_at(second, now).await.unwrap();
        service.complete_workout_at(first, now).await.unwrap();

        assert!(service.user_locks.is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_contended_user_lock_released_once() {
        let database = create_test_db().await.unwrap();
        let user_id = create_test_user(&database, UserRole::Athlete).await.unwrap();
        let service = Arc::new(GamificationService::new(
            database,
            GamificationConfig::default(),
            Arc::new(AchievementCatalog::builtin()),
            Arc::new(NoExternalStatistics),
        ));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let service = Arc::clone(&service);
                tokio::spawn(async move {
                    service
                        .award_points(user_id, 1, PointKind::Nutrition, "meal")
                        .await
                })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        assert!(service.user_locks.is_empty());
        assert_eq!(service.balance(user_id).await.unwrap(), 8);
    }
}
