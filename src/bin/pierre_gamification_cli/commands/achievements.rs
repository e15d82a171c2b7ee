// ABOUTME: Achievement commands for pierre-gamification-cli
// ABOUTME: Evaluates the catalog for a user and prints progress per badge
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use pierre_gamification::errors::AppResult;
use pierre_gamification::gamification::GamificationService;
use uuid::Uuid;

use crate::helpers::display;

/// Evaluate and print achievements
pub async fn show(service: &GamificationService, user_id: Uuid) -> AppResult<()> {
    let outcome = service.current_achievements(user_id).await?;
    display::display_achievements(&outcome);
    Ok(())
}
