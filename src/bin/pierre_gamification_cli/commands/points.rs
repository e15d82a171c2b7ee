// ABOUTME: Point ledger commands for pierre-gamification-cli
// ABOUTME: Logins, awards, workouts, messages, balance, history, and invariant verification
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use pierre_gamification::database::Database;
use pierre_gamification::errors::{AppError, AppResult};
use pierre_gamification::gamification::GamificationService;
use pierre_gamification::models::PointKind;
use tracing::warn;
use uuid::Uuid;

use crate::helpers::display;

/// Daily login
pub async fn login(service: &GamificationService, user_id: Uuid) -> AppResult<()> {
    let outcome = service.record_login(user_id).await?;
    println!(
        "Login streak: {} (best {})",
        outcome.streak.current_streak, outcome.streak.longest_streak
    );
    display::display_award(PointKind::Login, &outcome.award);
    Ok(())
}

/// Direct award
pub async fn award(
    service: &GamificationService,
    user_id: Uuid,
    kind: PointKind,
    amount: i64,
    reason: &str,
) -> AppResult<()> {
    let outcome = service.award_points(user_id, amount, kind, reason).await?;
    display::display_award(kind, &outcome);
    Ok(())
}

/// Workout completed today
pub async fn workout(service: &GamificationService, user_id: Uuid) -> AppResult<()> {
    let outcome = service.complete_workout(user_id).await?;
    display::display_award(PointKind::Workout, &outcome.award);
    println!("Workout streak: {} day(s)", outcome.workout_streak);
    if let Some(bonus) = &outcome.streak_bonus {
        display::display_award(PointKind::Streak, bonus);
    }
    Ok(())
}

/// Message sent
pub async fn message(service: &GamificationService, user_id: Uuid) -> AppResult<()> {
    let outcome = service.record_message(user_id).await?;
    display::display_award(PointKind::Message, &outcome);
    Ok(())
}

/// Current balance
pub async fn balance(service: &GamificationService, user_id: Uuid) -> AppResult<()> {
    let balance = service.balance(user_id).await?;
    println!("Balance: {balance}");
    Ok(())
}

/// Recent transactions
pub async fn history(service: &GamificationService, user_id: Uuid, limit: u32) -> AppResult<()> {
    let transactions = service.history(user_id, limit).await?;
    display::display_history(&transactions);
    Ok(())
}

/// Check stored balances against the ledger; fails if any user diverges
pub async fn verify(
    database: &Database,
    service: &GamificationService,
    user_id: Option<Uuid>,
) -> AppResult<()> {
    let user_ids = match user_id {
        Some(id) => vec![id],
        None => database.users().list_user_ids().await?,
    };

    let mut inconsistent = 0_usize;
    for id in &user_ids {
        let check = service.verify_balance(*id).await?;
        if check.is_consistent() {
            println!("OK       {id}  balance {}", check.stored);
        } else {
            inconsistent += 1;
            warn!(
                user_id = %id,
                stored = check.stored,
                recomputed = check.recomputed,
                "Balance diverges from ledger"
            );
            println!(
                "MISMATCH {id}  stored {} ledger {}",
                check.stored, check.recomputed
            );
        }
    }

    println!("{} user(s) checked, {inconsistent} mismatch(es)", user_ids.len());
    if inconsistent > 0 {
        return Err(AppError::internal(format!(
            "{inconsistent} balance(s) diverge from the ledger"
        )));
    }
    Ok(())
}
