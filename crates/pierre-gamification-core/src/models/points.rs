// ABOUTME: Point ledger models - award categories and immutable point transactions
// ABOUTME: PointKind, PointTransaction, and the append receipt returned by the ledger
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;

/// Category of a point award
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum PointKind {
    /// Workout completed
    Workout,
    /// Nutrition entry logged
    Nutrition,
    /// Daily login
    Login,
    /// Friend request accepted
    Friend,
    /// Message sent
    Message,
    /// Consecutive-day workout streak bonus
    Streak,
    /// Bonus for a newly earned achievement
    Achievement,
    /// Goal completed
    Goal,
    /// Training program selected
    ProgramSelection,
}

impl PointKind {
    /// Every recognized award category
    pub const ALL: [Self; 9] = [
        Self::Workout,
        Self::Nutrition,
        Self::Login,
        Self::Friend,
        Self::Message,
        Self::Streak,
        Self::Achievement,
        Self::Goal,
        Self::ProgramSelection,
    ];

    /// Database string representation
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Workout => "workout",
            Self::Nutrition => "nutrition",
            Self::Login => "login",
            Self::Friend => "friend",
            Self::Message => "message",
            Self::Streak => "streak",
            Self::Achievement => "achievement",
            Self::Goal => "goal",
            Self::ProgramSelection => "program-selection",
        }
    }

    /// Whether awards of this kind are granted at most once per user per UTC day
    #[must_use]
    pub const fn is_once_per_day(&self) -> bool {
        matches!(self, Self::Login | Self::Workout | Self::Streak)
    }
}

impl Display for PointKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

impl FromStr for PointKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('_', "-").as_str() {
            "workout" => Ok(Self::Workout),
            "nutrition" => Ok(Self::Nutrition),
            "login" => Ok(Self::Login),
            "friend" => Ok(Self::Friend),
            "message" => Ok(Self::Message),
            "streak" => Ok(Self::Streak),
            "achievement" => Ok(Self::Achievement),
            "goal" => Ok(Self::Goal),
            "program-selection" | "programselection" => Ok(Self::ProgramSelection),
            _ => Err(AppError::invalid_input(format!("Invalid point kind: {s}"))),
        }
    }
}

/// Immutable ledger entry. Created once, never updated or deleted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PointTransaction {
    /// Transaction identifier
    pub id: Uuid,
    /// Owning user
    pub user_id: Uuid,
    /// Signed point amount (never zero)
    pub amount: i64,
    /// Award category
    pub kind: PointKind,
    /// Free-text reason shown in the user's history
    pub reason: String,
    /// When the award happened
    pub occurred_at: DateTime<Utc>,
}

impl PointTransaction {
    /// UTC calendar day the transaction belongs to
    #[must_use]
    pub fn occurred_on(&self) -> NaiveDate {
        self.occurred_at.date_naive()
    }
}

/// Result of a successful ledger append
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LedgerReceipt {
    /// Identifier of the inserted transaction
    pub transaction_id: Uuid,
    /// Balance after the insert, read inside the same unit of work
    pub new_balance: i64,
}
