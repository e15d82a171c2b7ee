// ABOUTME: Unified streak tracker for login and workout streaks
// ABOUTME: Persists the login streak and derives the workout streak by walking the ledger backwards
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Streak Tracker
//!
//! Two streaks, one component:
//!
//! - **Login streak**: persisted, advanced once per UTC day by
//!   [`advance_login_streak`].
//! - **Workout streak**: derived on demand from the ledger; the number of
//!   consecutive UTC days ending today with at least one workout
//!   transaction. The walk is capped by
//!   [`StreakSettings::max_workout_streak_walk_days`].

use chrono::{Days, NaiveDate};
use tracing::debug;
use uuid::Uuid;

use crate::config::StreakSettings;
use crate::database::Database;
use crate::errors::AppResult;
use crate::models::{PointKind, StreakRecord};

/// Apply one login on `today` to an existing streak record
///
/// - same day: unchanged
/// - next day: current streak grows by one
/// - any other gap, including a clock that moved backwards: reset to one
///
/// The last login date never moves backwards.
#[must_use]
pub fn advance_login_streak(
    existing: Option<&StreakRecord>,
    user_id: Uuid,
    today: NaiveDate,
) -> StreakRecord {
    let Some(previous) = existing else {
        return StreakRecord::first_login(user_id, today);
    };

    let days_since_last = today
        .signed_duration_since(previous.last_login_date)
        .num_days();

    let current_streak = match days_since_last {
        0 => return *previous,
        1 => previous.current_streak.saturating_add(1),
        _ => 1,
    };

    StreakRecord {
        user_id: previous.user_id,
        current_streak,
        longest_streak: previous.longest_streak.max(current_streak),
        last_login_date: previous.last_login_date.max(today),
    }
}

/// Current login streak as seen on `today`
///
/// A streak whose last login is older than yesterday is broken and counts
/// as zero, even though the stored record still holds its old length.
#[must_use]
pub fn live_login_streak(record: &StreakRecord, today: NaiveDate) -> u32 {
    let days_since_last = today
        .signed_duration_since(record.last_login_date)
        .num_days();
    if days_since_last > 1 {
        0
    } else {
        record.current_streak
    }
}

/// Login and workout streak service
#[derive(Clone)]
pub struct StreakTracker {
    database: Database,
    settings: StreakSettings,
}

impl StreakTracker {
    /// Create a tracker over `database`
    #[must_use]
    pub const fn new(database: Database, settings: StreakSettings) -> Self {
        Self { database, settings }
    }

    /// Streak settings in effect
    #[must_use]
    pub const fn settings(&self) -> &StreakSettings {
        &self.settings
    }

    /// Record a login on `today` and persist the advanced streak
    ///
    /// # Errors
    ///
    /// Returns an error if the streak cannot be read or saved
    pub async fn record_login(&self, user_id: Uuid, today: NaiveDate) -> AppResult<StreakRecord> {
        let streaks = self.database.streaks();
        let existing = streaks.get(user_id).await?;
        let updated = advance_login_streak(existing.as_ref(), user_id, today);

        if existing.as_ref() != Some(&updated) {
            streaks.upsert(&updated).await?;
        }

        Ok(updated)
    }

    /// Persisted login streak, if the user ever logged in
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn login_streak(&self, user_id: Uuid) -> AppResult<Option<StreakRecord>> {
        self.database.streaks().get(user_id).await
    }

    /// Whether `record` is at the user's best streak and long enough to count
    #[must_use]
    pub const fn is_record_streak(&self, record: &StreakRecord) -> bool {
        record.current_streak == record.longest_streak
            && record.current_streak >= self.settings.record_streak_min_days
    }

    /// Consecutive days ending on `today` with at least one workout transaction
    ///
    /// # Errors
    ///
    /// Returns an error if a ledger query fails
    pub async fn workout_streak(&self, user_id: Uuid, today: NaiveDate) -> AppResult<u32> {
        let points = self.database.points();
        let cap = self.settings.max_workout_streak_walk_days;
        let mut streak = 0_u32;
        let mut day = today;

        while streak < cap
            && points
                .has_kind_on_day(user_id, PointKind::Workout, day)
                .await?
        {
            streak += 1;
            let Some(previous) = day.checked_sub_days(Days::new(1)) else {
                break;
            };
            day = previous;
        }

        debug!(user_id = %user_id, streak, "Workout streak derived");
        Ok(streak)
    }
}
