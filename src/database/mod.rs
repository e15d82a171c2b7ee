// ABOUTME: SQLite database management with connection pooling and schema migrations
// ABOUTME: Hands out per-domain managers for users, points, streaks, and achievements
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Database Management
//!
//! Owns the `SQLite` pool and the schema. Each table family has a manager
//! wrapping a clone of the pool, following the same pattern everywhere:
//! `Database::points()` returns a [`PointsManager`], and so on.

/// Per-user achievement record storage
pub mod achievements;
/// Point transaction storage and balance mutation
pub mod points;
/// Login streak storage
pub mod streaks;
/// User account storage
pub mod users;

/// In-memory database helpers for tests
#[cfg(any(test, feature = "testing"))]
pub mod test_utils;

pub use achievements::AchievementsManager;
pub use points::PointsManager;
pub use streaks::StreakManager;
pub use users::UsersManager;

use std::fs;
use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::config::{DatabaseConfig, DatabaseUrl};
use crate::errors::{AppError, AppResult};

/// Database manager for gamification storage
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Open the configured database and run migrations
    ///
    /// In-memory databases use a single long-lived connection so every
    /// query sees the same schema.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection or a migration fails
    pub async fn new(config: &DatabaseConfig) -> AppResult<Self> {
        let pool = match &config.url {
            DatabaseUrl::Memory => {
                SqlitePoolOptions::new()
                    .max_connections(1)
                    .min_connections(1)
                    .idle_timeout(None)
                    .max_lifetime(None)
                    .connect("sqlite::memory:")
                    .await?
            }
            DatabaseUrl::SQLite { path } => {
                if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                    fs::create_dir_all(parent).map_err(|e| {
                        AppError::database(format!(
                            "Failed to create database directory {}: {e}",
                            parent.display()
                        ))
                    })?;
                }
                let options = SqliteConnectOptions::from_str(&config.url.to_connection_string())?
                    .create_if_missing(true)
                    .foreign_keys(true);
                SqlitePoolOptions::new()
                    .max_connections(config.max_connections.max(1))
                    .connect_with(options)
                    .await?
            }
        };

        let db = Self { pool };
        db.migrate().await?;
        info!(database = %config.url, "Gamification database ready");

        Ok(db)
    }

    /// Open a database from a URL string such as `sqlite::memory:`
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid or the database cannot be opened
    pub async fn connect(database_url: &str) -> AppResult<Self> {
        let config = DatabaseConfig {
            url: DatabaseUrl::parse_url(database_url)?,
            ..DatabaseConfig::default()
        };
        Self::new(&config).await
    }

    /// Get a reference to the database pool for advanced operations
    #[must_use]
    pub const fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// User account operations
    #[must_use]
    pub fn users(&self) -> UsersManager {
        UsersManager::new(self.pool.clone())
    }

    /// Point ledger storage operations
    #[must_use]
    pub fn points(&self) -> PointsManager {
        PointsManager::new(self.pool.clone())
    }

    /// Login streak storage operations
    #[must_use]
    pub fn streaks(&self) -> StreakManager {
        StreakManager::new(self.pool.clone())
    }

    /// Achievement record storage operations
    #[must_use]
    pub fn achievements(&self) -> AchievementsManager {
        AchievementsManager::new(self.pool.clone())
    }

    /// Run database migrations
    ///
    /// # Errors
    ///
    /// Returns an error if any statement fails
    pub async fn migrate(&self) -> AppResult<()> {
        self.migrate_users().await?;
        self.migrate_points().await?;
        self.migrate_streaks().await?;
        self.migrate_achievements().await?;
        debug!("Gamification schema migrations applied");
        Ok(())
    }

    async fn migrate_users(&self) -> AppResult<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS users (
                id TEXT PRIMARY KEY,
                display_name TEXT NOT NULL,
                role TEXT NOT NULL CHECK (role IN ('athlete', 'coach')),
                points_balance INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn migrate_points(&self) -> AppResult<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS point_transactions (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                amount INTEGER NOT NULL CHECK (amount != 0),
                kind TEXT NOT NULL,
                reason TEXT NOT NULL,
                occurred_at TEXT NOT NULL,
                occurred_on TEXT NOT NULL,
                daily_key TEXT
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r"
            CREATE INDEX IF NOT EXISTS idx_point_transactions_user_kind_day
            ON point_transactions(user_id, kind, occurred_on)
            ",
        )
        .execute(&self.pool)
        .await?;

        // At most one once-per-day award per (user, kind, day)
        sqlx::query(
            r"
            CREATE UNIQUE INDEX IF NOT EXISTS uq_point_transactions_daily
            ON point_transactions(user_id, kind, daily_key)
            WHERE daily_key IS NOT NULL
            ",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn migrate_streaks(&self) -> AppResult<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS login_streaks (
                user_id TEXT PRIMARY KEY REFERENCES users(id) ON DELETE CASCADE,
                current_streak INTEGER NOT NULL,
                longest_streak INTEGER NOT NULL,
                last_login_date TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn migrate_achievements(&self) -> AppResult<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS user_achievements (
                user_id TEXT PRIMARY KEY REFERENCES users(id) ON DELETE CASCADE,
                entries_json TEXT NOT NULL DEFAULT '[]',
                updated_at TEXT NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
