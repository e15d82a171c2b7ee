// ABOUTME: Statistics snapshot assembly from the ledger, streaks, and external collaborators
// ABOUTME: StatisticsProvider seam with in-memory providers; failures degrade a statistic to zero
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::warn;
use uuid::Uuid;

use super::ledger::PointLedger;
use super::streaks::{live_login_streak, StreakTracker};
use crate::errors::AppResult;
use crate::models::{PointKind, UserAccount, UserRole, UserStatisticsSnapshot};

/// Weight-history summary supplied by the measurements collaborator
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BodyProgress {
    /// First recorded weight minus latest, in kilograms (negative when gained)
    pub weight_delta_kg: f64,
    /// Any circumference increased between first and latest record
    pub circumference_increased: bool,
}

/// Read-only queries answered by subsystems outside the engine
#[async_trait]
pub trait StatisticsProvider: Send + Sync {
    /// Accepted friends
    async fn friend_count(&self, user_id: Uuid) -> AppResult<u32>;

    /// Completed goals
    async fn goals_completed(&self, user_id: Uuid) -> AppResult<u32>;

    /// Body measurement records
    async fn measurement_count(&self, user_id: Uuid) -> AppResult<u32>;

    /// Total logins
    async fn login_count(&self, user_id: Uuid) -> AppResult<u32>;

    /// Shared items
    async fn share_count(&self, user_id: Uuid) -> AppResult<u32>;

    /// First-versus-latest body record comparison
    async fn body_progress(&self, user_id: Uuid) -> AppResult<BodyProgress>;

    /// Athletes coached by a coach
    async fn coach_athlete_count(&self, user_id: Uuid) -> AppResult<u32>;

    /// Programs authored by a coach
    async fn coach_program_count(&self, user_id: Uuid) -> AppResult<u32>;
}

/// Provider for deployments without any collaborator wired in
#[derive(Debug, Clone, Copy, Default)]
pub struct NoExternalStatistics;

#[async_trait]
impl StatisticsProvider for NoExternalStatistics {
    async fn friend_count(&self, _user_id: Uuid) -> AppResult<u32> {
        Ok(0)
    }

    async fn goals_completed(&self, _user_id: Uuid) -> AppResult<u32> {
        Ok(0)
    }

    async fn measurement_count(&self, _user_id: Uuid) -> AppResult<u32> {
        Ok(0)
    }

    async fn login_count(&self, _user_id: Uuid) -> AppResult<u32> {
        Ok(0)
    }

    async fn share_count(&self, _user_id: Uuid) -> AppResult<u32> {
        Ok(0)
    }

    async fn body_progress(&self, _user_id: Uuid) -> AppResult<BodyProgress> {
        Ok(BodyProgress::default())
    }

    async fn coach_athlete_count(&self, _user_id: Uuid) -> AppResult<u32> {
        Ok(0)
    }

    async fn coach_program_count(&self, _user_id: Uuid) -> AppResult<u32> {
        Ok(0)
    }
}

/// Collaborator statistics held in memory
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CollaboratorStatistics {
    /// Accepted friends
    pub friends: u32,
    /// Completed goals
    pub goals_completed: u32,
    /// Body measurement records
    pub measurements: u32,
    /// Total logins
    pub logins: u32,
    /// Shared items
    pub shares: u32,
    /// Weight history summary
    pub body: BodyProgress,
    /// Athletes coached
    pub coach_athletes: u32,
    /// Programs authored
    pub coach_programs: u32,
}

/// In-memory provider answering the same statistics for every user
///
/// Used by the CLI and tests; values can be changed between awards.
#[derive(Debug, Default)]
pub struct FixedStatistics {
    stats: RwLock<CollaboratorStatistics>,
}

impl FixedStatistics {
    /// Provider answering `stats`
    #[must_use]
    pub fn new(stats: CollaboratorStatistics) -> Self {
        Self {
            stats: RwLock::new(stats),
        }
    }

    /// Replace the answered statistics
    pub async fn set(&self, stats: CollaboratorStatistics) {
        *self.stats.write().await = stats;
    }

    /// Modify the answered statistics in place
    pub async fn update(&self, apply: impl FnOnce(&mut CollaboratorStatistics) + Send) {
        apply(&mut *self.stats.write().await);
    }

    async fn current(&self) -> CollaboratorStatistics {
        *self.stats.read().await
    }
}

#[async_trait]
impl StatisticsProvider for FixedStatistics {
    async fn friend_count(&self, _user_id: Uuid) -> AppResult<u32> {
        Ok(self.current().await.friends)
    }

    async fn goals_completed(&self, _user_id: Uuid) -> AppResult<u32> {
        Ok(self.current().await.goals_completed)
    }

    async fn measurement_count(&self, _user_id: Uuid) -> AppResult<u32> {
        Ok(self.current().await.measurements)
    }

    async fn login_count(&self, _user_id: Uuid) -> AppResult<u32> {
        Ok(self.current().await.logins)
    }

    async fn share_count(&self, _user_id: Uuid) -> AppResult<u32> {
        Ok(self.current().await.shares)
    }

    async fn body_progress(&self, _user_id: Uuid) -> AppResult<BodyProgress> {
        Ok(self.current().await.body)
    }

    async fn coach_athlete_count(&self, _user_id: Uuid) -> AppResult<u32> {
        Ok(self.current().await.coach_athletes)
    }

    async fn coach_program_count(&self, _user_id: Uuid) -> AppResult<u32> {
        Ok(self.current().await.coach_programs)
    }
}

/// Keep a gathered statistic, or fall back to its default with a warning
fn or_default<T: Default>(user_id: Uuid, statistic: &'static str, result: AppResult<T>) -> T {
    result.unwrap_or_else(|e| {
        warn!(
            user_id = %user_id,
            statistic,
            "Statistic unavailable, treating as zero: {e}"
        );
        T::default()
    })
}

/// Assembles a [`UserStatisticsSnapshot`] just before evaluation
#[derive(Clone)]
pub struct SnapshotBuilder {
    ledger: PointLedger,
    streaks: StreakTracker,
    provider: Arc<dyn StatisticsProvider>,
}

impl SnapshotBuilder {
    /// Create a builder
    #[must_use]
    pub fn new(
        ledger: PointLedger,
        streaks: StreakTracker,
        provider: Arc<dyn StatisticsProvider>,
    ) -> Self {
        Self {
            ledger,
            streaks,
            provider,
        }
    }

    /// Build the snapshot for `user` with the balance produced by the triggering award
    ///
    /// Never fails: each statistic that cannot be gathered stays at zero/false.
    pub async fn build(
        &self,
        user: &UserAccount,
        points_balance: i64,
        today: NaiveDate,
    ) -> UserStatisticsSnapshot {
        let user_id = user.id;
        let mut snapshot = UserStatisticsSnapshot::new(user.role, today);
        snapshot.points_balance = points_balance;

        let streak = self.streaks.login_streak(user_id).await;
        if let Some(record) = or_default(user_id, "loginStreak", streak) {
            snapshot.login_streak = live_login_streak(&record, today);
            snapshot.record_streak =
                snapshot.login_streak > 0 && self.streaks.is_record_streak(&record);
        }

        snapshot.workouts = or_default(
            user_id,
            "workouts",
            self.ledger.count(user_id, PointKind::Workout).await,
        );

        let provider = &self.provider;
        snapshot.friends = or_default(user_id, "friends", provider.friend_count(user_id).await);
        snapshot.goals_completed = or_default(
            user_id,
            "goalsCompleted",
            provider.goals_completed(user_id).await,
        );
        snapshot.measurements = or_default(
            user_id,
            "measurements",
            provider.measurement_count(user_id).await,
        );
        snapshot.logins = or_default(user_id, "logins", provider.login_count(user_id).await);
        snapshot.shares = or_default(user_id, "shares", provider.share_count(user_id).await);

        let body = or_default(user_id, "bodyProgress", provider.body_progress(user_id).await);
        snapshot.weight_loss_kg = body.weight_delta_kg.max(0.0);
        snapshot.muscle_gain = body.circumference_increased;

        if user.role == UserRole::Coach {
            snapshot.coach_athletes = or_default(
                user_id,
                "athletes",
                provider.coach_athlete_count(user_id).await,
            );
            snapshot.coach_programs = or_default(
                user_id,
                "programs",
                provider.coach_program_count(user_id).await,
            );
        }

        snapshot
    }
}
