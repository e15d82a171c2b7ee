// ABOUTME: Achievement models - catalog definitions, tagged conditions, and per-user records
// ABOUTME: UserRole, AchievementCondition, AchievementDefinition, UserAchievementRecord, BadgeProgress
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;

/// Role of a platform user
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    /// Trains under a coach
    #[default]
    Athlete,
    /// Manages athletes and programs
    Coach,
}

impl UserRole {
    /// Database string representation
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Athlete => "athlete",
            Self::Coach => "coach",
        }
    }
}

impl Display for UserRole {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "athlete" => Ok(Self::Athlete),
            "coach" => Ok(Self::Coach),
            _ => Err(AppError::invalid_input(format!("Invalid user role: {s}"))),
        }
    }
}

/// The single evaluable condition of an achievement
///
/// Each variant names the statistic it consumes. Count-based variants earn
/// when the statistic reaches `required`; flag-based variants earn when the
/// flag is set; `Date` earns on one calendar day of the year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum AchievementCondition {
    /// Completed goals
    GoalsCompleted {
        /// Goals needed
        required: u32,
    },
    /// Current point balance
    Points {
        /// Balance needed
        required: i64,
    },
    /// Accepted friends
    Friends {
        /// Friends needed
        required: u32,
    },
    /// Body measurement records
    Measurements {
        /// Records needed
        required: u32,
    },
    /// Total logins
    Logins {
        /// Logins needed
        required: u32,
    },
    /// Current consecutive-day login streak
    Streak {
        /// Streak length needed
        required: u32,
    },
    /// Shared items
    Shares {
        /// Shares needed
        required: u32,
    },
    /// Workout transactions in the ledger
    Workouts {
        /// Workouts needed
        required: u32,
    },
    /// Weight lost since the first weight record, in kilograms
    WeightLoss {
        /// Kilograms needed
        required_kg: f64,
    },
    /// Any circumference increase observed
    MuscleGain,
    /// Current login streak matches the user's best streak
    RecordStreak,
    /// Reserved; never earned
    Secret,
    /// Reserved; never earned
    NightLogin,
    /// Calendar day of the year
    Date {
        /// Month (1-12)
        month: u32,
        /// Day of month (1-31)
        day: u32,
    },
    /// Athletes coached
    Athletes {
        /// Athletes needed
        required: u32,
    },
    /// Training programs authored
    Programs {
        /// Programs needed
        required: u32,
    },
    /// Condition type this engine does not know; never earned
    #[serde(other)]
    Unrecognized,
}

impl AchievementCondition {
    /// Short label of the consumed statistic, used in logs
    #[must_use]
    pub const fn statistic(&self) -> &'static str {
        match self {
            Self::GoalsCompleted { .. } => "goalsCompleted",
            Self::Points { .. } => "points",
            Self::Friends { .. } => "friends",
            Self::Measurements { .. } => "measurements",
            Self::Logins { .. } => "logins",
            Self::Streak { .. } => "streak",
            Self::Shares { .. } => "shares",
            Self::Workouts { .. } => "workouts",
            Self::WeightLoss { .. } => "weightLoss",
            Self::MuscleGain => "muscleGain",
            Self::RecordStreak => "recordStreak",
            Self::Secret => "secret",
            Self::NightLogin => "nightLogin",
            Self::Date { .. } => "date",
            Self::Athletes { .. } => "athletes",
            Self::Programs { .. } => "programs",
            Self::Unrecognized => "unrecognized",
        }
    }
}

/// Catalog entry describing one badge
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AchievementDefinition {
    /// Stable identifier, e.g. `friends-10`
    pub id: String,
    /// Display title
    pub title: String,
    /// Display description
    pub description: String,
    /// Condition evaluated against the statistics snapshot
    pub condition: AchievementCondition,
    /// When set, only users with this role can earn the badge
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub restricted_to_role: Option<UserRole>,
}

impl AchievementDefinition {
    /// Whether a user with `role` is eligible for this badge
    #[must_use]
    pub fn is_available_to(&self, role: UserRole) -> bool {
        self.restricted_to_role
            .map_or(true, |restricted| restricted == role)
    }
}

/// Persisted per-user badge state
///
/// A badge id appears at most once per user and an earned record never
/// reverts to unearned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserAchievementRecord {
    /// Catalog badge id
    pub badge_id: String,
    /// Whether the badge has been earned
    pub earned: bool,
    /// When the badge was earned
    pub earned_date: Option<DateTime<Utc>>,
}

impl UserAchievementRecord {
    /// Build an earned record stamped with `now`
    pub fn earned_at(badge_id: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            badge_id: badge_id.into(),
            earned: true,
            earned_date: Some(now),
        }
    }
}

/// Progress of one eligible badge as returned to callers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BadgeProgress {
    /// Catalog badge id
    pub badge_id: String,
    /// Display title
    pub title: String,
    /// Display description
    pub description: String,
    /// Progress percentage, 0 to 100
    pub progress: u8,
    /// Earned state, persisted state taking precedence
    pub earned: bool,
    /// When the badge was earned
    pub earned_date: Option<DateTime<Utc>>,
}

/// Result of one evaluation pass
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationOutcome {
    /// Badges that transitioned to earned during this pass
    pub newly_earned: Vec<String>,
    /// Progress of every badge eligible for the user's role
    pub progress: Vec<BadgeProgress>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_condition_tagged_json_shape() {
        let condition: AchievementCondition =
            serde_json::from_str(r#"{"type":"friends","required":10}"#).unwrap();
        assert_eq!(condition, AchievementCondition::Friends { required: 10 });

        let weight: AchievementCondition =
            serde_json::from_str(r#"{"type":"weightLoss","requiredKg":5.0}"#).unwrap();
        assert_eq!(weight, AchievementCondition::WeightLoss { required_kg: 5.0 });

        let flag: AchievementCondition = serde_json::from_str(r#"{"type":"muscleGain"}"#).unwrap();
        assert_eq!(flag, AchievementCondition::MuscleGain);
    }

    #[test]
    fn test_role_restriction() {
        let badge = AchievementDefinition {
            id: "coach-5-athletes".into(),
            title: "Team Builder".into(),
            description: "Coach five athletes".into(),
            condition: AchievementCondition::Athletes { required: 5 },
            restricted_to_role: Some(UserRole::Coach),
        };
        assert!(badge.is_available_to(UserRole::Coach));
        assert!(!badge.is_available_to(UserRole::Athlete));
    }

    #[test]
    fn test_record_uses_camel_case_fields() {
        let record = UserAchievementRecord {
            badge_id: "goal-master".into(),
            earned: true,
            earned_date: None,
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["badgeId"], "goal-master");
        assert!(json["earnedDate"].is_null());
    }
}
