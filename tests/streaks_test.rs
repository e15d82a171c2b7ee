// ABOUTME: Integration tests for login and workout streaks through the gamification facade
// ABOUTME: Login streak persistence, derived workout streak, and the consecutive-day workout bonus
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use std::sync::Arc;

use chrono::NaiveDate;
use pierre_gamification::config::GamificationConfig;
use pierre_gamification::gamification::{
    AchievementCatalog, FixedStatistics, GamificationService, NoExternalStatistics,
    SnapshotBuilder,
};
use pierre_gamification::models::{PointKind, UserRole};

use common::{at_noon, create_test_database, create_test_user, setup_athlete};

#[tokio::test]
async fn test_scenario_login_streak_resets_after_gap() {
    let (_db, user_id, service, _stats) = setup_athlete().await.unwrap();

    for day in 1..=4 {
        service
            .record_login_at(user_id, at_noon(2024, 3, day))
            .await
            .unwrap();
    }
    let before = service.streaks().login_streak(user_id).await.unwrap().unwrap();
    assert_eq!(before.current_streak, 4);
    assert_eq!(before.longest_streak, 4);

    let after_gap = service
        .record_login_at(user_id, at_noon(2024, 3, 8))
        .await
        .unwrap();
    assert_eq!(after_gap.streak.current_streak, 1);
    assert_eq!(after_gap.streak.longest_streak, 4);
    assert_eq!(
        after_gap.streak.last_login_date,
        NaiveDate::from_ymd_opt(2024, 3, 8).unwrap()
    );

    let next_day = service
        .record_login_at(user_id, at_noon(2024, 3, 9))
        .await
        .unwrap();
    assert_eq!(next_day.streak.current_streak, 2);
    assert_eq!(next_day.streak.longest_streak, 4);
}

#[tokio::test]
async fn test_same_day_login_keeps_streak_and_skips_bonus() {
    let (_db, user_id, service, _stats) = setup_athlete().await.unwrap();

    let first = service
        .record_login_at(user_id, at_noon(2024, 3, 1))
        .await
        .unwrap();
    let second = service
        .record_login_at(user_id, at_noon(2024, 3, 1))
        .await
        .unwrap();

    assert_eq!(first.streak, second.streak);
    assert!(first.award.awarded);
    assert!(!second.award.awarded);
    assert_eq!(second.award.balance, 5);
}

#[tokio::test]
async fn test_record_streak_badge_on_matching_best_streak() {
    let (_db, user_id, service, _stats) = setup_athlete().await.unwrap();

    let day_one = service
        .record_login_at(user_id, at_noon(2024, 3, 1))
        .await
        .unwrap();
    // A one-day streak is too short to count as a record
    assert!(day_one.award.newly_earned.is_empty());

    let day_two = service
        .record_login_at(user_id, at_noon(2024, 3, 2))
        .await
        .unwrap();
    assert!(day_two
        .award
        .newly_earned
        .contains(&"record-streak".to_owned()));
    assert_eq!(day_two.award.balance, 5 + 5 + 25);
    assert!(service.verify_balance(user_id).await.unwrap().is_consistent());
}

#[tokio::test]
async fn test_workout_streak_bonus_on_seventh_day_only() {
    let (_db, user_id, service, _stats) = setup_athlete().await.unwrap();

    for day in 1..=6 {
        let outcome = service
            .complete_workout_at(user_id, at_noon(2024, 3, day))
            .await
            .unwrap();
        assert_eq!(outcome.workout_streak, day);
        assert!(outcome.streak_bonus.is_none());
    }

    let seventh = service
        .complete_workout_at(user_id, at_noon(2024, 3, 7))
        .await
        .unwrap();
    assert_eq!(seventh.workout_streak, 7);
    let bonus = seventh.streak_bonus.unwrap();
    assert!(bonus.awarded);
    assert_eq!(bonus.amount, 50);
    // 7 workouts + streak bonus crosses 100 points
    assert!(bonus.newly_earned.contains(&"points-100".to_owned()));
    assert_eq!(bonus.balance, 7 * 10 + 50 + 25);

    let repeat = service
        .complete_workout_at(user_id, at_noon(2024, 3, 7))
        .await
        .unwrap();
    assert!(!repeat.award.awarded);
    assert!(!repeat.streak_bonus.unwrap().awarded);

    let eighth = service
        .complete_workout_at(user_id, at_noon(2024, 3, 8))
        .await
        .unwrap();
    assert_eq!(eighth.workout_streak, 8);
    assert!(eighth.streak_bonus.is_none());

    let ledger = service.ledger();
    assert_eq!(ledger.count(user_id, PointKind::Streak).await.unwrap(), 1);
    assert_eq!(ledger.count(user_id, PointKind::Workout).await.unwrap(), 8);
    assert!(service.verify_balance(user_id).await.unwrap().is_consistent());
}

#[tokio::test]
async fn test_missed_day_breaks_workout_streak() {
    let (_db, user_id, service, _stats) = setup_athlete().await.unwrap();

    for day in [1, 2, 4] {
        service
            .complete_workout_at(user_id, at_noon(2024, 3, day))
            .await
            .unwrap();
    }

    let today = NaiveDate::from_ymd_opt(2024, 3, 4).unwrap();
    assert_eq!(service.streaks().workout_streak(user_id, today).await.unwrap(), 1);

    let day_without_workout = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
    assert_eq!(
        service
            .streaks()
            .workout_streak(user_id, day_without_workout)
            .await
            .unwrap(),
        0
    );
}

#[tokio::test]
async fn test_workout_streak_walk_is_capped() {
    let database = create_test_database().await.unwrap();
    let user_id = create_test_user(&database, UserRole::Athlete).await.unwrap();

    let mut config = GamificationConfig::default();
    config.streaks.workout_streak_bonus_days = 2;
    config.streaks.max_workout_streak_walk_days = 3;
    assert!(config.validate().is_ok());

    let service = GamificationService::new(
        database,
        config,
        Arc::new(AchievementCatalog::builtin()),
        Arc::new(FixedStatistics::default()),
    );

    let mut streaks = Vec::new();
    for day in 1..=5 {
        let outcome = service
            .complete_workout_at(user_id, at_noon(2024, 3, day))
            .await
            .unwrap();
        streaks.push(outcome.workout_streak);
    }

    assert_eq!(streaks, vec![1, 2, 3, 3, 3]);
    assert_eq!(
        service
            .ledger()
            .count(user_id, PointKind::Streak)
            .await
            .unwrap(),
        1
    );
}

#[tokio::test]
async fn test_snapshot_reports_broken_login_streak_as_zero() {
    let (db, user_id, service, _stats) = setup_athlete().await.unwrap();
    for day in 1..=2 {
        service
            .record_login_at(user_id, at_noon(2024, 3, day))
            .await
            .unwrap();
    }

    let builder = SnapshotBuilder::new(
        service.ledger().clone(),
        service.streaks().clone(),
        Arc::new(NoExternalStatistics),
    );
    let user = db.users().require_user(user_id).await.unwrap();

    let next_day = builder
        .build(&user, 0, NaiveDate::from_ymd_opt(2024, 3, 3).unwrap())
        .await;
    assert_eq!(next_day.login_streak, 2);
    assert!(next_day.record_streak);

    let after_gap = builder
        .build(&user, 0, NaiveDate::from_ymd_opt(2024, 3, 5).unwrap())
        .await;
    assert_eq!(after_gap.login_streak, 0);
    assert!(!after_gap.record_streak);

    // The stored record keeps its length until the next login resets it
    let stored = service.streaks().login_streak(user_id).await.unwrap().unwrap();
    assert_eq!(stored.current_streak, 2);
}
