// ABOUTME: Gamification configuration for point values, daily caps, and streak limits
// ABOUTME: Defaults overridable through PIERRE_GAMIFICATION_ environment variables
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Gamification Configuration Module
//!
//! All values can be overridden via environment variables with the
//! `PIERRE_GAMIFICATION_` prefix. The configuration is loaded once per
//! process and read through [`GamificationConfig::global`].

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::constants::{points, streaks};
use crate::models::PointKind;

/// Global configuration singleton
static GAMIFICATION_CONFIG: OnceLock<GamificationConfig> = OnceLock::new();

/// Configuration validation errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An environment variable could not be parsed
    #[error("Parse error: {0}")]
    Parse(String),

    /// A value is outside its accepted range
    #[error("Value out of range: {0}")]
    ValueOutOfRange(&'static str),
}

// ============================================================================
// Main Configuration
// ============================================================================

/// Gamification configuration container
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GamificationConfig {
    /// Points granted per award category
    pub points: PointValues,
    /// Streak tracking settings
    pub streaks: StreakSettings,
    /// Optional JSON file replacing the built-in achievement catalog
    pub catalog_path: Option<PathBuf>,
}

impl GamificationConfig {
    /// Get the global configuration instance
    pub fn global() -> &'static Self {
        GAMIFICATION_CONFIG.get_or_init(|| {
            Self::load().unwrap_or_else(|e| {
                warn!("Failed to load gamification config: {e}, using defaults");
                Self::default()
            })
        })
    }

    /// Load configuration from environment
    ///
    /// # Errors
    ///
    /// Returns an error if environment variables contain invalid values or validation fails
    pub fn load() -> Result<Self, ConfigError> {
        let config = Self::default().apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if configuration values are invalid
    pub fn validate(&self) -> Result<(), ConfigError> {
        let p = &self.points;
        let award_values = [
            p.daily_login,
            p.workout_completed,
            p.goal_completed,
            p.friend_accepted,
            p.message_sent,
            p.program_selected,
            p.workout_streak_bonus,
            p.achievement_bonus,
        ];
        if award_values.iter().any(|value| *value <= 0) {
            return Err(ConfigError::ValueOutOfRange("point values must be > 0"));
        }

        if p.message_daily_cap < p.message_sent {
            return Err(ConfigError::ValueOutOfRange(
                "message_daily_cap must be >= message_sent",
            ));
        }

        if self.streaks.workout_streak_bonus_days == 0 {
            return Err(ConfigError::ValueOutOfRange(
                "workout_streak_bonus_days must be > 0",
            ));
        }

        if self.streaks.max_workout_streak_walk_days < self.streaks.workout_streak_bonus_days {
            return Err(ConfigError::ValueOutOfRange(
                "max_workout_streak_walk_days must cover workout_streak_bonus_days",
            ));
        }

        Ok(())
    }

    /// Daily cap in points for `kind`, if the kind is capped
    #[must_use]
    pub const fn daily_cap(&self, kind: PointKind) -> Option<i64> {
        match kind {
            PointKind::Message => Some(self.points.message_daily_cap),
            _ => None,
        }
    }

    fn apply_env_var<T: FromStr>(env_var_name: &str, target: &mut T) -> Result<(), ConfigError> {
        if let Ok(val) = env::var(env_var_name) {
            *target = val
                .parse()
                .map_err(|_| ConfigError::Parse(format!("Invalid {env_var_name}")))?;
        }
        Ok(())
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(mut self) -> Result<Self, ConfigError> {
        // Point values
        Self::apply_env_var(
            "PIERRE_GAMIFICATION_POINTS_LOGIN",
            &mut self.points.daily_login,
        )?;
        Self::apply_env_var(
            "PIERRE_GAMIFICATION_POINTS_WORKOUT",
            &mut self.points.workout_completed,
        )?;
        Self::apply_env_var(
            "PIERRE_GAMIFICATION_POINTS_GOAL",
            &mut self.points.goal_completed,
        )?;
        Self::apply_env_var(
            "PIERRE_GAMIFICATION_POINTS_FRIEND",
            &mut self.points.friend_accepted,
        )?;
        Self::apply_env_var(
            "PIERRE_GAMIFICATION_POINTS_MESSAGE",
            &mut self.points.message_sent,
        )?;
        Self::apply_env_var(
            "PIERRE_GAMIFICATION_MESSAGE_DAILY_CAP",
            &mut self.points.message_daily_cap,
        )?;
        Self::apply_env_var(
            "PIERRE_GAMIFICATION_POINTS_PROGRAM",
            &mut self.points.program_selected,
        )?;
        Self::apply_env_var(
            "PIERRE_GAMIFICATION_POINTS_WORKOUT_STREAK",
            &mut self.points.workout_streak_bonus,
        )?;
        Self::apply_env_var(
            "PIERRE_GAMIFICATION_POINTS_ACHIEVEMENT",
            &mut self.points.achievement_bonus,
        )?;

        // Streak settings
        Self::apply_env_var(
            "PIERRE_GAMIFICATION_WORKOUT_STREAK_DAYS",
            &mut self.streaks.workout_streak_bonus_days,
        )?;
        Self::apply_env_var(
            "PIERRE_GAMIFICATION_MAX_STREAK_WALK_DAYS",
            &mut self.streaks.max_workout_streak_walk_days,
        )?;
        Self::apply_env_var(
            "PIERRE_GAMIFICATION_RECORD_STREAK_MIN_DAYS",
            &mut self.streaks.record_streak_min_days,
        )?;

        if let Ok(path) = env::var("PIERRE_GAMIFICATION_CATALOG_PATH") {
            self.catalog_path = Some(PathBuf::from(path));
        }

        Ok(self)
    }
}

// ============================================================================
// Sub-Configurations
// ============================================================================

/// Points granted per award category
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PointValues {
    /// Daily login bonus
    pub daily_login: i64,
    /// Daily workout completion
    pub workout_completed: i64,
    /// Goal completion
    pub goal_completed: i64,
    /// Friend request accepted
    pub friend_accepted: i64,
    /// Points per message sent
    pub message_sent: i64,
    /// Maximum message points per day
    pub message_daily_cap: i64,
    /// Training program selection
    pub program_selected: i64,
    /// Workout streak milestone bonus
    pub workout_streak_bonus: i64,
    /// Flat bonus per newly earned achievement
    pub achievement_bonus: i64,
}

impl Default for PointValues {
    fn default() -> Self {
        Self {
            daily_login: points::DAILY_LOGIN,
            workout_completed: points::WORKOUT_COMPLETED,
            goal_completed: points::GOAL_COMPLETED,
            friend_accepted: points::FRIEND_ACCEPTED,
            message_sent: points::MESSAGE_SENT,
            message_daily_cap: points::MESSAGE_DAILY_CAP,
            program_selected: points::PROGRAM_SELECTED,
            workout_streak_bonus: points::WORKOUT_STREAK_BONUS,
            achievement_bonus: points::ACHIEVEMENT_BONUS,
        }
    }
}

/// Streak tracking settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreakSettings {
    /// Consecutive workout days that trigger the streak bonus
    pub workout_streak_bonus_days: u32,
    /// Upper bound for the backward workout-day walk
    pub max_workout_streak_walk_days: u32,
    /// Minimum login streak for the record-streak flag
    pub record_streak_min_days: u32,
}

impl Default for StreakSettings {
    fn default() -> Self {
        Self {
            workout_streak_bonus_days: streaks::WORKOUT_STREAK_BONUS_DAYS,
            max_workout_streak_walk_days: streaks::MAX_WORKOUT_STREAK_WALK_DAYS,
            record_streak_min_days: streaks::RECORD_STREAK_MIN_DAYS,
        }
    }
}
