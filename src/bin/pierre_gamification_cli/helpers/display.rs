// ABOUTME: Output formatting helpers for pierre-gamification-cli
// ABOUTME: Consistent display of users, awards, history, and badge progress
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use pierre_gamification::gamification::AwardOutcome;
use pierre_gamification::models::{EvaluationOutcome, PointKind, PointTransaction, UserAccount};

/// Display a newly created user
pub fn display_user_created(user: &UserAccount) {
    println!("\nUser Created Successfully!");
    println!("{}", "=".repeat(50));
    println!("   ID:   {}", user.id);
    println!("   Name: {}", user.display_name);
    println!("   Role: {}", user.role);
}

/// Display the result of one award
pub fn display_award(kind: PointKind, outcome: &AwardOutcome) {
    if outcome.awarded {
        println!("+{} {kind} point(s), balance {}", outcome.amount, outcome.balance);
    } else {
        println!("No {kind} points awarded (daily limit), balance {}", outcome.balance);
    }
    for badge_id in &outcome.newly_earned {
        println!("   Achievement earned: {badge_id}");
    }
}

/// Display transaction history
pub fn display_history(transactions: &[PointTransaction]) {
    if transactions.is_empty() {
        println!("No transactions");
        return;
    }
    println!("{:<20} {:<18} {:>7}  REASON", "WHEN", "KIND", "AMOUNT");
    println!("{}", "-".repeat(70));
    for tx in transactions {
        println!(
            "{:<20} {:<18} {:>7}  {}",
            tx.occurred_at.format("%Y-%m-%d %H:%M"),
            tx.kind.as_str(),
            tx.amount,
            tx.reason
        );
    }
}

/// Display badge progress
pub fn display_achievements(outcome: &EvaluationOutcome) {
    for badge_id in &outcome.newly_earned {
        println!("New achievement: {badge_id}");
    }
    println!("{:<20} {:<22} {:>8}  EARNED", "BADGE", "TITLE", "PROGRESS");
    println!("{}", "-".repeat(70));
    for badge in &outcome.progress {
        let earned = badge.earned_date.map_or_else(
            || if badge.earned { "yes".to_owned() } else { String::new() },
            |date| date.format("%Y-%m-%d").to_string(),
        );
        println!(
            "{:<20} {:<22} {:>7}%  {earned}",
            badge.badge_id, badge.title, badge.progress
        );
    }
}
