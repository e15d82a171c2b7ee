// ABOUTME: User account database operations for the gamification engine
// ABOUTME: Create and look up users; the balance column is written only by the points manager
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use crate::errors::{is_unique_violation, AppError, AppResult};
use crate::models::{UserAccount, UserRole};

/// User account database operations manager
pub struct UsersManager {
    pool: SqlitePool,
}

impl UsersManager {
    /// Create a new users manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a new user account
    ///
    /// # Errors
    ///
    /// Returns an error if the id is taken or the database query fails
    pub async fn create_user(&self, user: &UserAccount) -> AppResult<Uuid> {
        sqlx::query(
            r"
            INSERT INTO users (id, display_name, role, points_balance, created_at)
            VALUES ($1, $2, $3, $4, $5)
            ",
        )
        .bind(user.id.to_string())
        .bind(&user.display_name)
        .bind(user.role.as_str())
        .bind(user.points_balance)
        .bind(user.created_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::already_exists(format!("User {}", user.id))
            } else {
                AppError::database(format!("Failed to create user: {e}"))
            }
        })?;

        Ok(user.id)
    }

    /// Get a user account by ID
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails or the row is malformed
    pub async fn get_user(&self, user_id: Uuid) -> AppResult<Option<UserAccount>> {
        let row = sqlx::query(
            r"
            SELECT id, display_name, role, points_balance, created_at
            FROM users
            WHERE id = $1
            ",
        )
        .bind(user_id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to get user: {e}")))?;

        row.map(|r| Self::row_to_user(&r)).transpose()
    }

    /// Get a user account, failing when it does not exist
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` for an unknown user
    pub async fn require_user(&self, user_id: Uuid) -> AppResult<UserAccount> {
        self.get_user(user_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("User {user_id}")).with_user_id(user_id))
    }

    /// List all user ids, oldest first
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn list_user_ids(&self) -> AppResult<Vec<Uuid>> {
        let rows = sqlx::query("SELECT id FROM users ORDER BY created_at ASC")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to list users: {e}")))?;

        rows.iter()
            .map(|r| {
                let id: String = r.get("id");
                parse_uuid(&id)
            })
            .collect()
    }

    fn row_to_user(row: &SqliteRow) -> AppResult<UserAccount> {
        let id: String = row.get("id");
        let role: String = row.get("role");
        let created_at: String = row.get("created_at");

        Ok(UserAccount {
            id: parse_uuid(&id)?,
            display_name: row.get("display_name"),
            role: role.parse::<UserRole>()?,
            points_balance: row.get("points_balance"),
            created_at: parse_timestamp(&created_at)?,
        })
    }
}

/// Parse a UUID stored as TEXT
pub(crate) fn parse_uuid(value: &str) -> AppResult<Uuid> {
    Uuid::parse_str(value)
        .map_err(|e| AppError::database(format!("Invalid UUID in database '{value}': {e}")))
}

/// Parse an RFC 3339 timestamp stored as TEXT
pub(crate) fn parse_timestamp(value: &str) -> AppResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| AppError::database(format!("Invalid timestamp in database '{value}': {e}")))
}
