// ABOUTME: Gamification engine - point ledger, streaks, achievement catalog and evaluator
// ABOUTME: GamificationService is the facade every other subsystem calls
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Gamification Engine
//!
//! Leaf-first:
//!
//! - [`ledger`]: append-only point transactions and the running balance
//! - [`streaks`]: persisted login streak and derived workout streak
//! - [`catalog`]: versioned badge definitions
//! - [`evaluator`]: snapshot-to-progress scoring and record repair
//! - [`snapshot`]: statistics gathering from the ledger and collaborators
//! - [`service`]: the facade (`award_points`, `evaluate_achievements`)

/// Achievement catalog
pub mod catalog;
/// Achievement evaluation and record repair
pub mod evaluator;
/// Point ledger
pub mod ledger;
/// Gamification facade
pub mod service;
/// Statistics snapshot assembly
pub mod snapshot;
/// Login and workout streaks
pub mod streaks;

pub use catalog::AchievementCatalog;
pub use evaluator::{AchievementEvaluator, ConditionError, ConditionScore};
pub use ledger::{BalanceCheck, PointLedger};
pub use service::{AwardOutcome, GamificationService, LoginOutcome, WorkoutOutcome};
pub use snapshot::{
    BodyProgress, CollaboratorStatistics, FixedStatistics, NoExternalStatistics, SnapshotBuilder,
    StatisticsProvider,
};
pub use streaks::{advance_login_streak, live_login_streak, StreakTracker};
