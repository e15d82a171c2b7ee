// ABOUTME: Tests for environment-driven gamification and database configuration
// ABOUTME: Env overrides, validation failures, and catalog files loaded from disk
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

use std::env;
use std::io::Write;

use pierre_gamification::config::{DatabaseConfig, DatabaseUrl, GamificationConfig};
use pierre_gamification::gamification::AchievementCatalog;
use pierre_gamification::models::UserRole;
use serial_test::serial;
use tempfile::NamedTempFile;

#[test]
#[serial]
fn test_point_values_overridden_from_environment() {
    env::set_var("PIERRE_GAMIFICATION_POINTS_LOGIN", "7");
    env::set_var("PIERRE_GAMIFICATION_MESSAGE_DAILY_CAP", "20");
    env::set_var("PIERRE_GAMIFICATION_WORKOUT_STREAK_DAYS", "5");

    let config = GamificationConfig::load().unwrap();

    assert_eq!(config.points.daily_login, 7);
    assert_eq!(config.points.message_daily_cap, 20);
    assert_eq!(config.streaks.workout_streak_bonus_days, 5);
    assert_eq!(config.points.workout_completed, 10);

    env::remove_var("PIERRE_GAMIFICATION_POINTS_LOGIN");
    env::remove_var("PIERRE_GAMIFICATION_MESSAGE_DAILY_CAP");
    env::remove_var("PIERRE_GAMIFICATION_WORKOUT_STREAK_DAYS");
}

#[test]
#[serial]
fn test_unparseable_override_is_rejected() {
    env::set_var("PIERRE_GAMIFICATION_POINTS_GOAL", "twenty");

    let result = GamificationConfig::load();

    env::remove_var("PIERRE_GAMIFICATION_POINTS_GOAL");
    assert!(result.is_err());
}

#[test]
#[serial]
fn test_out_of_range_override_is_rejected() {
    env::set_var("PIERRE_GAMIFICATION_POINTS_ACHIEVEMENT", "0");

    let result = GamificationConfig::load();

    env::remove_var("PIERRE_GAMIFICATION_POINTS_ACHIEVEMENT");
    assert!(result.is_err());
}

#[test]
#[serial]
fn test_catalog_path_read_from_environment() {
    env::set_var("PIERRE_GAMIFICATION_CATALOG_PATH", "/tmp/badges.json");

    let config = GamificationConfig::load().unwrap();

    env::remove_var("PIERRE_GAMIFICATION_CATALOG_PATH");
    assert_eq!(
        config.catalog_path.as_deref(),
        Some(std::path::Path::new("/tmp/badges.json"))
    );
}

#[test]
#[serial]
fn test_database_config_from_environment() {
    env::set_var("DATABASE_URL", "sqlite::memory:");
    env::set_var("DATABASE_MAX_CONNECTIONS", "3");

    let config = DatabaseConfig::from_env().unwrap();

    env::remove_var("DATABASE_URL");
    env::remove_var("DATABASE_MAX_CONNECTIONS");
    assert_eq!(config.url, DatabaseUrl::Memory);
    assert_eq!(config.max_connections, 3);
}

#[test]
#[serial]
fn test_invalid_pool_size_is_rejected() {
    env::set_var("DATABASE_MAX_CONNECTIONS", "many");

    let result = DatabaseConfig::from_env();

    env::remove_var("DATABASE_MAX_CONNECTIONS");
    assert!(result.is_err());
}

#[test]
fn test_catalog_loaded_from_file() {
    let mut file = NamedTempFile::new().unwrap();
    write!(
        file,
        r#"{{
            "version": 9,
            "badges": [
                {{"id": "walker", "title": "Walker", "description": "", "condition": {{"type": "workouts", "required": 3}}}},
                {{"id": "mentor", "title": "Mentor", "description": "", "condition": {{"type": "athletes", "required": 1}}, "restrictedToRole": "coach"}}
            ]
        }}"#
    )
    .unwrap();

    let catalog = AchievementCatalog::load_from_path(file.path()).unwrap();

    assert_eq!(catalog.version, 9);
    assert_eq!(catalog.len(), 2);
    assert_eq!(catalog.eligible_for(UserRole::Athlete).count(), 1);
}

#[test]
fn test_catalog_file_errors_are_reported() {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "not json").unwrap();
    assert!(AchievementCatalog::load_from_path(file.path()).is_err());

    let missing = std::path::Path::new("/nonexistent/pierre/badges.json");
    assert!(AchievementCatalog::load_from_path(missing).is_err());
}
