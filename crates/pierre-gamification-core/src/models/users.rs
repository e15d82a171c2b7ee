// ABOUTME: Minimal user account carrying the role and denormalized point balance
// ABOUTME: The balance always equals the sum of the user's point transactions
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::achievements::UserRole;

/// User account as seen by the gamification engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserAccount {
    /// User identifier
    pub id: Uuid,
    /// Display name
    pub display_name: String,
    /// Athlete or coach
    pub role: UserRole,
    /// Denormalized running balance, written only by the ledger
    pub points_balance: i64,
    /// Account creation time
    pub created_at: DateTime<Utc>,
}

impl UserAccount {
    /// New account with a zero balance
    pub fn new(display_name: impl Into<String>, role: UserRole) -> Self {
        Self {
            id: Uuid::new_v4(),
            display_name: display_name.into(),
            role,
            points_balance: 0,
            created_at: Utc::now(),
        }
    }
}
