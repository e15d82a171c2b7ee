// ABOUTME: Constants module with domain-separated organization
// ABOUTME: Default point values, streak limits, and catalog versioning
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Constants module
//!
//! Defaults only. Every value that operators may want to tune is also
//! exposed through the root crate's `GamificationConfig`.

/// Default number of points granted per award category
pub mod points {
    /// Daily login bonus
    pub const DAILY_LOGIN: i64 = 5;
    /// Completing the day's workout
    pub const WORKOUT_COMPLETED: i64 = 10;
    /// Completing a goal
    pub const GOAL_COMPLETED: i64 = 20;
    /// Accepting a friend request
    pub const FRIEND_ACCEPTED: i64 = 10;
    /// Sending a message
    pub const MESSAGE_SENT: i64 = 1;
    /// Maximum message points per user per calendar day
    pub const MESSAGE_DAILY_CAP: i64 = 10;
    /// Selecting a training program
    pub const PROGRAM_SELECTED: i64 = 15;
    /// Reaching the workout streak milestone
    pub const WORKOUT_STREAK_BONUS: i64 = 50;
    /// Flat bonus for every newly earned achievement
    pub const ACHIEVEMENT_BONUS: i64 = 25;
}

/// Streak tracking limits
pub mod streaks {
    /// Consecutive workout days that trigger the streak bonus
    pub const WORKOUT_STREAK_BONUS_DAYS: u32 = 7;
    /// Upper bound for the backward workout-day walk (three years)
    pub const MAX_WORKOUT_STREAK_WALK_DAYS: u32 = 1095;
    /// Minimum login streak length for the record-streak flag
    pub const RECORD_STREAK_MIN_DAYS: u32 = 2;
}

/// Achievement catalog metadata
pub mod catalog {
    /// Version of the built-in achievement catalog
    pub const CATALOG_VERSION: u32 = 3;
}

/// Service identity used in structured logs
pub mod service_names {
    /// Service name for the gamification engine
    pub const PIERRE_GAMIFICATION: &str = "pierre-gamification";
}
