// ABOUTME: Versioned achievement catalog loaded once per process
// ABOUTME: Built-in badge definitions with optional JSON override and duplicate-id validation
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use crate::config::GamificationConfig;
use crate::constants::catalog::CATALOG_VERSION;
use crate::errors::{AppError, AppResult};
use crate::models::{AchievementCondition, AchievementDefinition, UserRole};

/// Process-wide catalog, read-only after first access
static ACHIEVEMENT_CATALOG: OnceLock<AchievementCatalog> = OnceLock::new();

/// Read-only list of badge definitions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AchievementCatalog {
    /// Catalog revision
    pub version: u32,
    /// Badge definitions in display order
    pub badges: Vec<AchievementDefinition>,
}

impl AchievementCatalog {
    /// Build a catalog, rejecting empty or duplicate badge ids
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` if a badge id is empty or appears twice
    pub fn new(version: u32, badges: Vec<AchievementDefinition>) -> AppResult<Self> {
        let catalog = Self { version, badges };
        catalog.validate()?;
        Ok(catalog)
    }

    /// The catalog shipped with the engine
    #[must_use]
    pub fn builtin() -> Self {
        Self {
            version: CATALOG_VERSION,
            badges: builtin_badges(),
        }
    }

    /// Get the process-wide catalog
    ///
    /// Uses the file named by `PIERRE_GAMIFICATION_CATALOG_PATH` when set and
    /// valid, the built-in catalog otherwise.
    pub fn global() -> &'static Self {
        ACHIEVEMENT_CATALOG.get_or_init(|| {
            let Some(path) = &GamificationConfig::global().catalog_path else {
                return Self::builtin();
            };
            Self::load_from_path(path).unwrap_or_else(|e| {
                warn!(
                    path = %path.display(),
                    "Failed to load achievement catalog: {e}, using built-in"
                );
                Self::builtin()
            })
        })
    }

    /// Parse a catalog from its JSON form
    ///
    /// A badge whose condition cannot be read is kept with an
    /// [`AchievementCondition::Unrecognized`] condition, so it never blocks
    /// the rest of the catalog.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is invalid, a badge lacks its id or
    /// title, or the catalog fails validation
    pub fn from_json(json: &str) -> AppResult<Self> {
        let document: CatalogDocument = serde_json::from_str(json)?;
        let badges = document
            .badges
            .iter()
            .map(parse_badge)
            .collect::<AppResult<Vec<_>>>()?;
        Self::new(document.version, badges)
    }

    /// Load a catalog from a JSON file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed
    pub fn load_from_path(path: &Path) -> AppResult<Self> {
        let json = fs::read_to_string(path).map_err(|e| {
            AppError::config(format!(
                "Failed to read achievement catalog {}: {e}",
                path.display()
            ))
        })?;
        let catalog = Self::from_json(&json)?;
        info!(
            path = %path.display(),
            version = catalog.version,
            badges = catalog.badges.len(),
            "Loaded achievement catalog"
        );
        Ok(catalog)
    }

    /// Check badge ids are non-empty and unique
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` describing the first offending id
    pub fn validate(&self) -> AppResult<()> {
        let mut seen = HashSet::with_capacity(self.badges.len());
        for badge in &self.badges {
            if badge.id.trim().is_empty() {
                return Err(AppError::invalid_input("Achievement id must not be empty"));
            }
            if !seen.insert(badge.id.as_str()) {
                return Err(AppError::invalid_input(format!(
                    "Duplicate achievement id: {}",
                    badge.id
                )));
            }
        }
        Ok(())
    }

    /// Badges a user with `role` can earn, in catalog order
    pub fn eligible_for(&self, role: UserRole) -> impl Iterator<Item = &AchievementDefinition> {
        self.badges
            .iter()
            .filter(move |badge| badge.is_available_to(role))
    }

    /// Look up a badge by id
    #[must_use]
    pub fn get(&self, badge_id: &str) -> Option<&AchievementDefinition> {
        self.badges.iter().find(|badge| badge.id == badge_id)
    }

    /// Number of badges
    #[must_use]
    pub fn len(&self) -> usize {
        self.badges.len()
    }

    /// Whether the catalog has no badges
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.badges.is_empty()
    }
}

impl Default for AchievementCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Catalog file with badges left untyped until each is parsed
#[derive(Deserialize)]
struct CatalogDocument {
    version: u32,
    badges: Vec<Value>,
}

/// Badge fields that remain usable when the condition does not parse
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct BadgeShell {
    id: String,
    title: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    restricted_to_role: Option<UserRole>,
}

fn parse_badge(entry: &Value) -> AppResult<AchievementDefinition> {
    match AchievementDefinition::deserialize(entry) {
        Ok(badge) => Ok(badge),
        Err(e) => {
            let shell = BadgeShell::deserialize(entry)?;
            warn!(
                badge_id = %shell.id,
                "Unreadable achievement condition, badge cannot be earned: {e}"
            );
            Ok(AchievementDefinition {
                id: shell.id,
                title: shell.title,
                description: shell.description,
                condition: AchievementCondition::Unrecognized,
                restricted_to_role: shell.restricted_to_role,
            })
        }
    }
}

fn badge(
    id: &str,
    title: &str,
    description: &str,
    condition: AchievementCondition,
) -> AchievementDefinition {
    AchievementDefinition {
        id: id.to_owned(),
        title: title.to_owned(),
        description: description.to_owned(),
        condition,
        restricted_to_role: None,
    }
}

fn coach_badge(
    id: &str,
    title: &str,
    description: &str,
    condition: AchievementCondition,
) -> AchievementDefinition {
    AchievementDefinition {
        restricted_to_role: Some(UserRole::Coach),
        ..badge(id, title, description, condition)
    }
}

fn builtin_badges() -> Vec<AchievementDefinition> {
    use AchievementCondition as C;

    vec![
        badge("first-goal", "First Goal", "Complete your first goal", C::GoalsCompleted { required: 1 }),
        badge("goal-master", "Goal Master", "Complete 10 goals", C::GoalsCompleted { required: 10 }),
        badge("points-100", "Century", "Reach 100 points", C::Points { required: 100 }),
        badge("points-1000", "High Scorer", "Reach 1000 points", C::Points { required: 1000 }),
        badge("friends-1", "First Friend", "Make your first friend", C::Friends { required: 1 }),
        badge("friends-10", "Social Butterfly", "Make 10 friends", C::Friends { required: 10 }),
        badge("measurements-5", "Tracker", "Log 5 body measurements", C::Measurements { required: 5 }),
        badge("logins-30", "Regular", "Log in 30 times", C::Logins { required: 30 }),
        badge("streak-7", "On Fire", "Log in 7 days in a row", C::Streak { required: 7 }),
        badge("streak-30", "Unstoppable", "Log in 30 days in a row", C::Streak { required: 30 }),
        badge("shares-5", "Influencer", "Share 5 times", C::Shares { required: 5 }),
        badge("workouts-10", "Committed", "Complete workouts on 10 days", C::Workouts { required: 10 }),
        badge("workouts-100", "Iron Will", "Complete workouts on 100 days", C::Workouts { required: 100 }),
        badge("weight-loss-5", "Lighter", "Lose 5 kg", C::WeightLoss { required_kg: 5.0 }),
        badge("muscle-gain", "Gains", "Increase any body circumference", C::MuscleGain),
        badge("record-streak", "Personal Best", "Match your longest login streak", C::RecordStreak),
        badge("new-year", "Fresh Start", "Log in on New Year's Day", C::Date { month: 1, day: 1 }),
        badge("secret", "???", "Keep exploring", C::Secret),
        badge("night-owl", "Night Owl", "Log in late at night", C::NightLogin),
        coach_badge("coach-5-athletes", "Team Builder", "Coach 5 athletes", C::Athletes { required: 5 }),
        coach_badge("coach-3-programs", "Program Author", "Publish 3 programs", C::Programs { required: 3 }),
    ]
}
