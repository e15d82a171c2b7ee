// ABOUTME: Core data models for the gamification engine
// ABOUTME: Points, achievements, streaks, and the statistics snapshot
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

/// Award categories, point transactions, and ledger receipts
pub mod points;

/// Catalog definitions, conditions, and per-user achievement records
pub mod achievements;

/// Login streak records
pub mod streaks;

/// Statistics snapshot fed into the evaluator
pub mod statistics;

/// User accounts with role and point balance
pub mod users;

pub use achievements::{
    AchievementCondition, AchievementDefinition, BadgeProgress, EvaluationOutcome,
    UserAchievementRecord, UserRole,
};
pub use points::{LedgerReceipt, PointKind, PointTransaction};
pub use statistics::UserStatisticsSnapshot;
pub use streaks::StreakRecord;
pub use users::UserAccount;
