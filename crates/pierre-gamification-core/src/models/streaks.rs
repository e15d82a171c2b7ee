// ABOUTME: Login streak record persisted per user
// ABOUTME: Current and longest consecutive-day login streaks with the last login date
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Consecutive-day login streak for one user
///
/// `last_login_date` is a UTC calendar date and never moves backwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreakRecord {
    /// Owning user
    pub user_id: Uuid,
    /// Consecutive days up to and including `last_login_date`
    pub current_streak: u32,
    /// Best streak ever reached
    pub longest_streak: u32,
    /// Most recent login day (UTC)
    pub last_login_date: NaiveDate,
}

impl StreakRecord {
    /// Record created by a user's first login
    #[must_use]
    pub const fn first_login(user_id: Uuid, today: NaiveDate) -> Self {
        Self {
            user_id,
            current_streak: 1,
            longest_streak: 1,
            last_login_date: today,
        }
    }
}
