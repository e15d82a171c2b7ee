// ABOUTME: User management commands for pierre-gamification-cli
// ABOUTME: Registers athletes and coaches with a zero balance
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use pierre_gamification::database::Database;
use pierre_gamification::errors::AppResult;
use pierre_gamification::models::{UserAccount, UserRole};
use tracing::info;

use crate::helpers::display;

/// Create a user and print its id
pub async fn create(database: &Database, name: String, role: UserRole) -> AppResult<()> {
    let user = UserAccount::new(name, role);
    database.users().create_user(&user).await?;
    info!(user_id = %user.id, role = %user.role, "User created");

    display::display_user_created(&user);
    Ok(())
}
