// ABOUTME: Shared test utilities and setup functions for integration tests
// ABOUTME: Provides in-memory databases, seeded users, and services with fixed statistics
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence
#![allow(
    dead_code,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::must_use_candidate
)]
//! Shared test utilities for `pierre_gamification`

use std::sync::{Arc, Once};

use anyhow::Result;
use chrono::{DateTime, TimeZone, Utc};
use pierre_gamification::config::GamificationConfig;
use pierre_gamification::database::Database;
use pierre_gamification::gamification::{
    AchievementCatalog, CollaboratorStatistics, FixedStatistics, GamificationService,
};
use pierre_gamification::models::{UserAccount, UserRole};
use uuid::Uuid;

static INIT_LOGGER: Once = Once::new();

/// Initialize quiet logging for tests (call once per test process)
pub fn init_test_logging() {
    INIT_LOGGER.call_once(|| {
        let log_level = match std::env::var("TEST_LOG").as_deref() {
            Ok("TRACE") => tracing::Level::TRACE,
            Ok("DEBUG") => tracing::Level::DEBUG,
            Ok("INFO") => tracing::Level::INFO,
            _ => tracing::Level::WARN,
        };

        tracing_subscriber::fmt()
            .with_max_level(log_level)
            .with_test_writer()
            .init();
    });
}

/// Standard in-memory test database
pub async fn create_test_database() -> Result<Database> {
    init_test_logging();
    Ok(Database::connect("sqlite::memory:").await?)
}

/// Create a user with `role`
pub async fn create_test_user(database: &Database, role: UserRole) -> Result<Uuid> {
    let user = UserAccount::new("Test User", role);
    Ok(database.users().create_user(&user).await?)
}

/// Service over `database` using the built-in catalog and the given statistics provider
pub fn create_service(database: &Database, stats: Arc<FixedStatistics>) -> GamificationService {
    GamificationService::new(
        database.clone(),
        GamificationConfig::default(),
        Arc::new(AchievementCatalog::builtin()),
        stats,
    )
}

/// Database, athlete, and service with zeroed collaborator statistics
pub async fn setup_athlete() -> Result<(Database, Uuid, GamificationService, Arc<FixedStatistics>)> {
    let database = create_test_database().await?;
    let user_id = create_test_user(&database, UserRole::Athlete).await?;
    let stats = Arc::new(FixedStatistics::new(CollaboratorStatistics::default()));
    let service = create_service(&database, stats.clone());
    Ok((database, user_id, service, stats))
}

/// Noon UTC on the given day
pub fn at_noon(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 12, 0, 0)
        .single()
        .unwrap_or_default()
}
