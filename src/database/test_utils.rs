// ABOUTME: Test utilities for creating isolated in-memory gamification databases
// ABOUTME: Provides a migrated database and a seeded user for unit and integration tests
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use uuid::Uuid;

use super::Database;
use crate::errors::AppResult;
use crate::models::{UserAccount, UserRole};

/// Create a migrated in-memory test database
///
/// # Errors
///
/// Returns an error if database initialization fails
pub async fn create_test_db() -> AppResult<Database> {
    Database::connect("sqlite::memory:").await
}

/// Create a user with the given role in `database`
///
/// # Errors
///
/// Returns an error if the insert fails
pub async fn create_test_user(database: &Database, role: UserRole) -> AppResult<Uuid> {
    let user = UserAccount::new(format!("test-{}", role.as_str()), role);
    database.users().create_user(&user).await
}
