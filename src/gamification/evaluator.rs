// ABOUTME: Achievement evaluator turning a statistics snapshot into badge progress and earned state
// ABOUTME: Repairs legacy stored records, isolates malformed conditions, and persists monotonically
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Achievement Evaluator
//!
//! Evaluation is split in three steps so the pure parts can be tested
//! without a database:
//!
//! 1. [`repair_records`] turns whatever is stored for the user into a clean,
//!    deduplicated record list.
//! 2. [`evaluate_catalog`] scores every badge eligible for the snapshot's
//!    role and appends records for badges that became earned.
//! 3. [`AchievementEvaluator`] loads and saves the records. Records that
//!    gain an earned badge are saved by the ledger together with the badge
//!    bonuses, so an earned record never exists without its bonus.
//!
//! Earned records are never downgraded and their `earnedDate` never moves.

use std::sync::Arc;

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};
use uuid::Uuid;

use super::catalog::AchievementCatalog;
use crate::database::Database;
use crate::errors::AppResult;
use crate::models::{
    AchievementCondition, BadgeProgress, EvaluationOutcome, UserAchievementRecord,
    UserStatisticsSnapshot,
};

/// A badge condition that cannot be evaluated
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConditionError {
    /// Threshold is zero, negative, or not a number
    #[error("required threshold must be a positive number, got {0}")]
    InvalidThreshold(f64),

    /// Month/day pair is not a calendar day
    #[error("invalid calendar day {month}-{day}")]
    InvalidDate {
        /// Month as configured
        month: u32,
        /// Day as configured
        day: u32,
    },

    /// Condition type unknown to this engine
    #[error("unrecognized condition type")]
    Unrecognized,
}

/// Score of one condition against one snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConditionScore {
    /// Percentage, 0 to 100
    pub progress: u8,
    /// Whether the condition is met
    pub earned: bool,
}

impl ConditionScore {
    const NONE: Self = Self {
        progress: 0,
        earned: false,
    };

    const fn flag(set: bool) -> Self {
        if set {
            Self {
                progress: 100,
                earned: true,
            }
        } else {
            Self::NONE
        }
    }

    fn ratio(current: f64, required: f64) -> Result<Self, ConditionError> {
        if !required.is_finite() || required <= 0.0 {
            return Err(ConditionError::InvalidThreshold(required));
        }
        let current = if current.is_finite() { current } else { 0.0 };
        let percent = (current / required * 100.0).round().clamp(0.0, 100.0);

        Ok(Self {
            progress: percent as u8,
            earned: current >= required,
        })
    }
}

/// Score `condition` against `snapshot`
///
/// # Errors
///
/// Returns a [`ConditionError`] when the condition itself is malformed
pub fn evaluate_condition(
    condition: &AchievementCondition,
    snapshot: &UserStatisticsSnapshot,
) -> Result<ConditionScore, ConditionError> {
    use AchievementCondition as C;

    let count = |current: u32, required: u32| {
        ConditionScore::ratio(f64::from(current), f64::from(required))
    };

    match condition {
        C::GoalsCompleted { required } => count(snapshot.goals_completed, *required),
        C::Friends { required } => count(snapshot.friends, *required),
        C::Measurements { required } => count(snapshot.measurements, *required),
        C::Logins { required } => count(snapshot.logins, *required),
        C::Streak { required } => count(snapshot.login_streak, *required),
        C::Shares { required } => count(snapshot.shares, *required),
        C::Workouts { required } => count(snapshot.workouts, *required),
        C::Athletes { required } => count(snapshot.coach_athletes, *required),
        C::Programs { required } => count(snapshot.coach_programs, *required),
        C::Points { required } => points_ratio(snapshot.points_balance, *required),
        C::WeightLoss { required_kg } => {
            ConditionScore::ratio(snapshot.weight_loss_kg.max(0.0), *required_kg)
        }
        C::MuscleGain => count(u32::from(snapshot.muscle_gain), 1),
        C::RecordStreak => Ok(ConditionScore::flag(snapshot.record_streak)),
        C::Date { month, day } => {
            // 2000 is a leap year, so Feb 29 is accepted
            if NaiveDate::from_ymd_opt(2000, *month, *day).is_none() {
                return Err(ConditionError::InvalidDate {
                    month: *month,
                    day: *day,
                });
            }
            Ok(ConditionScore::flag(
                snapshot.today.month() == *month && snapshot.today.day() == *day,
            ))
        }
        C::Secret | C::NightLogin => Ok(ConditionScore::NONE),
        C::Unrecognized => Err(ConditionError::Unrecognized),
    }
}

fn points_ratio(balance: i64, required: i64) -> Result<ConditionScore, ConditionError> {
    ConditionScore::ratio(balance as f64, required as f64)
}

/// Stored records after repair
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepairedRecords {
    /// Clean records, one per badge id
    pub records: Vec<UserAchievementRecord>,
    /// Whether the stored form differed and must be rewritten
    pub changed: bool,
}

/// Coerce the stored JSON for a user into well-formed records
///
/// - missing column: empty, unchanged
/// - unparseable column or non-array document: empty, rewritten
/// - bare string entry: legacy earned badge, upgraded with `earnedDate = now`
/// - object entry matching the record shape: kept
/// - anything else: dropped
/// - duplicate badge ids: one record kept, earned preferred
pub fn repair_records(raw: Option<&str>, now: DateTime<Utc>) -> RepairedRecords {
    let Some(raw) = raw else {
        return RepairedRecords::default();
    };

    let entries = match serde_json::from_str::<Value>(raw) {
        Ok(Value::Array(entries)) => entries,
        Ok(other) => {
            warn!(stored = %other, "Stored achievements are not a list, discarding");
            return RepairedRecords {
                records: Vec::new(),
                changed: true,
            };
        }
        Err(e) => {
            warn!("Stored achievements are not valid JSON, discarding: {e}");
            return RepairedRecords {
                records: Vec::new(),
                changed: true,
            };
        }
    };

    let mut repaired = RepairedRecords::default();
    for entry in entries {
        let record = match entry {
            Value::String(badge_id) if !badge_id.trim().is_empty() => {
                debug!(badge_id = %badge_id, "Upgrading legacy achievement entry");
                repaired.changed = true;
                UserAchievementRecord::earned_at(badge_id, now)
            }
            Value::Object(_) => match serde_json::from_value::<UserAchievementRecord>(entry) {
                Ok(record) if !record.badge_id.trim().is_empty() => record,
                Ok(_) | Err(_) => {
                    warn!("Dropping malformed achievement record");
                    repaired.changed = true;
                    continue;
                }
            },
            other => {
                warn!(entry = %other, "Dropping malformed achievement record");
                repaired.changed = true;
                continue;
            }
        };
        repaired.changed |= merge_record(&mut repaired.records, record);
    }

    repaired
}

/// Insert `record`, resolving a duplicate badge id. Returns true on a duplicate.
fn merge_record(records: &mut Vec<UserAchievementRecord>, record: UserAchievementRecord) -> bool {
    match records.iter_mut().find(|r| r.badge_id == record.badge_id) {
        Some(existing) => {
            if !existing.earned && record.earned {
                *existing = record;
            }
            true
        }
        None => {
            records.push(record);
            false
        }
    }
}

/// Score every badge eligible for the snapshot's role
///
/// Records for badges that became earned are added to `records` (or an
/// unearned record is upgraded). Persisted earned state always wins in the
/// returned progress list.
pub fn evaluate_catalog(
    catalog: &AchievementCatalog,
    snapshot: &UserStatisticsSnapshot,
    records: &mut Vec<UserAchievementRecord>,
    now: DateTime<Utc>,
) -> EvaluationOutcome {
    let mut outcome = EvaluationOutcome::default();

    for badge in catalog.eligible_for(snapshot.role) {
        let score = evaluate_condition(&badge.condition, snapshot).unwrap_or_else(|e| {
            warn!(
                badge_id = %badge.id,
                statistic = badge.condition.statistic(),
                "Skipping malformed achievement condition: {e}"
            );
            ConditionScore::NONE
        });

        let position = records.iter().position(|r| r.badge_id == badge.id);
        let record = match position {
            Some(index) if score.earned && !records[index].earned => {
                records[index] = UserAchievementRecord::earned_at(badge.id.clone(), now);
                outcome.newly_earned.push(badge.id.clone());
                Some(&records[index])
            }
            Some(index) => Some(&records[index]),
            None if score.earned => {
                records.push(UserAchievementRecord::earned_at(badge.id.clone(), now));
                outcome.newly_earned.push(badge.id.clone());
                records.last()
            }
            None => None,
        };

        outcome.progress.push(BadgeProgress {
            badge_id: badge.id.clone(),
            title: badge.title.clone(),
            description: badge.description.clone(),
            progress: score.progress,
            earned: record.is_some_and(|r| r.earned),
            earned_date: record.and_then(|r| r.earned_date),
        });
    }

    outcome
}

/// Evaluates and persists achievements against a catalog
#[derive(Clone)]
pub struct AchievementEvaluator {
    database: Database,
    catalog: Arc<AchievementCatalog>,
}

impl AchievementEvaluator {
    /// Create an evaluator over `database` and `catalog`
    #[must_use]
    pub const fn new(database: Database, catalog: Arc<AchievementCatalog>) -> Self {
        Self { database, catalog }
    }

    /// Catalog in use
    #[must_use]
    pub fn catalog(&self) -> &AchievementCatalog {
        &self.catalog
    }

    /// Repaired stored records of a user
    ///
    /// # Errors
    ///
    /// Returns an error if the records cannot be loaded
    pub async fn records(&self, user_id: Uuid) -> AppResult<Vec<UserAchievementRecord>> {
        Ok(self.load(user_id, Utc::now()).await?.records)
    }

    /// Load and repair the stored records of a user
    ///
    /// # Errors
    ///
    /// Returns an error if the records cannot be loaded
    pub async fn load(&self, user_id: Uuid, now: DateTime<Utc>) -> AppResult<RepairedRecords> {
        let raw = self.database.achievements().load_raw(user_id).await?;
        Ok(repair_records(raw.as_deref(), now))
    }

    /// Write back repaired records that earned nothing new
    ///
    /// # Errors
    ///
    /// Returns an error if the records cannot be saved
    pub async fn save_repaired(
        &self,
        user_id: Uuid,
        records: &[UserAchievementRecord],
    ) -> AppResult<()> {
        self.database.achievements().store(user_id, records).await?;
        debug!(user_id = %user_id, "Repaired achievement records saved");
        Ok(())
    }
}
