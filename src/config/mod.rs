// ABOUTME: Configuration management module for the gamification engine
// ABOUTME: Database target and gamification tuning loaded from the environment
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Configuration module
//!
//! - **Database**: `SQLite` target and pool sizing
//! - **Gamification**: point values, daily caps, and streak limits

/// Database connection configuration
pub mod database;
/// Point values and streak settings
pub mod gamification;

pub use database::{DatabaseConfig, DatabaseUrl};
pub use gamification::{ConfigError, GamificationConfig, PointValues, StreakSettings};
