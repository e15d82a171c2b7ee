// ABOUTME: Statistics snapshot consumed by the achievement evaluator
// ABOUTME: One explicit field per recognized statistic, all defaulting to zero or false
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::achievements::UserRole;

/// Just-in-time bundle of user statistics for one evaluation pass
///
/// Never persisted. A statistic that could not be gathered stays at its
/// default so a single failing collaborator cannot block evaluation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserStatisticsSnapshot {
    /// Role used for catalog filtering
    pub role: UserRole,
    /// UTC calendar day the snapshot was taken
    pub today: NaiveDate,
    /// Ledger balance after the triggering award
    pub points_balance: i64,
    /// Current login streak
    pub login_streak: u32,
    /// Current login streak equals the user's best streak
    pub record_streak: bool,
    /// Workout transactions in the ledger
    pub workouts: u32,
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
    /// Kilograms lost since the first weight record (zero when gained)
    pub weight_loss_kg: f64,
    /// Any circumference increase observed
    pub muscle_gain: bool,
    /// Athletes coached (coaches only)
    pub coach_athletes: u32,
    /// Programs authored (coaches only)
    pub coach_programs: u32,
}

impl UserStatisticsSnapshot {
    /// Empty snapshot for `role` taken on `today`
    #[must_use]
    pub fn new(role: UserRole, today: NaiveDate) -> Self {
        Self {
            role,
            today,
            ..Self::default()
        }
    }
}
