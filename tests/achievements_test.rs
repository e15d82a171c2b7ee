// ABOUTME: Integration tests for achievement evaluation through the gamification facade
// ABOUTME: Progress scoring, role filtering, idempotency, monotonic earned state, legacy repair
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use std::io::Write;
use std::sync::Arc;

use chrono::NaiveDate;
use pierre_gamification::config::GamificationConfig;
use pierre_gamification::errors::ErrorCode;
use pierre_gamification::gamification::{
    AchievementCatalog, CollaboratorStatistics, FixedStatistics, GamificationService,
};
use pierre_gamification::models::{
    AchievementCondition, AchievementDefinition, BadgeProgress, PointKind, UserRole,
    UserStatisticsSnapshot,
};

use common::{at_noon, create_service, create_test_database, create_test_user, setup_athlete};
use tempfile::NamedTempFile;

fn athlete_snapshot() -> UserStatisticsSnapshot {
    UserStatisticsSnapshot::new(
        UserRole::Athlete,
        NaiveDate::from_ymd_opt(2024, 6, 15).unwrap(),
    )
}

fn progress_of<'a>(progress: &'a [BadgeProgress], badge_id: &str) -> &'a BadgeProgress {
    progress
        .iter()
        .find(|badge| badge.badge_id == badge_id)
        .unwrap_or_else(|| panic!("badge {badge_id} missing from progress"))
}

#[tokio::test]
async fn test_scenario_friends_badge_progress() {
    let (_db, user_id, service, _stats) = setup_athlete().await.unwrap();

    let mut partial = athlete_snapshot();
    partial.friends = 7;
    let outcome = service.evaluate_achievements(user_id, &partial).await.unwrap();
    let friends = progress_of(&outcome.progress, "friends-10");
    assert_eq!(friends.progress, 70);
    assert!(!friends.earned);

    let mut complete = athlete_snapshot();
    complete.friends = 10;
    let outcome = service.evaluate_achievements(user_id, &complete).await.unwrap();
    let friends = progress_of(&outcome.progress, "friends-10");
    assert_eq!(friends.progress, 100);
    assert!(friends.earned);
    assert!(friends.earned_date.is_some());
    assert!(outcome.newly_earned.contains(&"friends-10".to_owned()));
}

#[tokio::test]
async fn test_newly_earned_badges_award_flat_bonus() {
    let (_db, user_id, service, _stats) = setup_athlete().await.unwrap();

    let mut snapshot = athlete_snapshot();
    snapshot.friends = 10;
    let outcome = service.evaluate_achievements(user_id, &snapshot).await.unwrap();

    // friends-1 and friends-10
    assert_eq!(outcome.newly_earned.len(), 2);
    assert_eq!(service.balance(user_id).await.unwrap(), 50);
    assert_eq!(
        service
            .ledger()
            .count(user_id, PointKind::Achievement)
            .await
            .unwrap(),
        2
    );
}

#[tokio::test]
async fn test_bonus_cascade_earns_points_badge_once() {
    let (_db, user_id, service, stats) = setup_athlete().await.unwrap();
    stats
        .update(|s| {
            s.friends = 10;
            s.goals_completed = 1;
        })
        .await;

    // 60 + friends-1, friends-10, first-goal bonuses (75) = 135 -> points-100
    let outcome = service
        .award_points_at(user_id, 60, PointKind::Goal, "big goal", at_noon(2024, 6, 15))
        .await
        .unwrap();

    assert!(outcome.newly_earned.contains(&"points-100".to_owned()));
    assert_eq!(outcome.newly_earned.len(), 4);
    assert_eq!(outcome.balance, 60 + 4 * 25);
    assert!(service.verify_balance(user_id).await.unwrap().is_consistent());

    let again = service
        .award_points_at(user_id, 1, PointKind::Nutrition, "snack", at_noon(2024, 6, 15))
        .await
        .unwrap();
    assert!(again.newly_earned.is_empty());
    assert_eq!(again.balance, 161);
}

#[tokio::test]
async fn test_evaluation_is_idempotent_for_unchanged_snapshot() {
    let (_db, user_id, service, _stats) = setup_athlete().await.unwrap();
    let mut snapshot = athlete_snapshot();
    snapshot.friends = 3;
    snapshot.goals_completed = 4;
    snapshot.points_balance = 90;

    let first = service.evaluate_achievements(user_id, &snapshot).await.unwrap();
    let second = service.evaluate_achievements(user_id, &snapshot).await.unwrap();

    assert!(!first.newly_earned.is_empty());
    assert!(second.newly_earned.is_empty());
    assert_eq!(first.progress, second.progress);
}

#[tokio::test]
async fn test_earned_state_never_reverts() {
    let (_db, user_id, service, _stats) = setup_athlete().await.unwrap();

    let mut earned = athlete_snapshot();
    earned.friends = 10;
    let outcome = service.evaluate_achievements(user_id, &earned).await.unwrap();
    let earned_date = progress_of(&outcome.progress, "friends-10").earned_date;

    let lost_friends = athlete_snapshot();
    let outcome = service
        .evaluate_achievements(user_id, &lost_friends)
        .await
        .unwrap();
    let badge = progress_of(&outcome.progress, "friends-10");
    assert!(badge.earned);
    assert_eq!(badge.earned_date, earned_date);
    assert_eq!(badge.progress, 0);

    let records = service.achievement_records(user_id).await.unwrap();
    let record = records.iter().find(|r| r.badge_id == "friends-10").unwrap();
    assert!(record.earned);
    assert_eq!(record.earned_date, earned_date);
}

#[tokio::test]
async fn test_coach_badges_never_shown_to_athletes() {
    let (_db, user_id, service, _stats) = setup_athlete().await.unwrap();
    let mut snapshot = athlete_snapshot();
    snapshot.coach_athletes = 50;
    snapshot.coach_programs = 50;

    let outcome = service.evaluate_achievements(user_id, &snapshot).await.unwrap();

    assert!(outcome
        .progress
        .iter()
        .all(|badge| !badge.badge_id.starts_with("coach-")));
    assert!(outcome.newly_earned.iter().all(|id| !id.starts_with("coach-")));
}

#[tokio::test]
async fn test_coach_earns_coach_badges() {
    let database = create_test_database().await.unwrap();
    let coach_id = create_test_user(&database, UserRole::Coach).await.unwrap();
    let stats = Arc::new(FixedStatistics::new(CollaboratorStatistics {
        coach_athletes: 5,
        coach_programs: 1,
        ..CollaboratorStatistics::default()
    }));
    let service = create_service(&database, stats);

    let outcome = service.current_achievements(coach_id).await.unwrap();

    assert!(outcome.newly_earned.contains(&"coach-5-athletes".to_owned()));
    let programs = progress_of(&outcome.progress, "coach-3-programs");
    assert_eq!(programs.progress, 33);
    assert!(!programs.earned);
}

#[tokio::test]
async fn test_scenario_legacy_string_record_repaired_once() {
    let (db, user_id, service, _stats) = setup_athlete().await.unwrap();
    db.achievements()
        .store_raw(user_id, r#"["goal-master"]"#)
        .await
        .unwrap();

    let first = service
        .evaluate_achievements(user_id, &athlete_snapshot())
        .await
        .unwrap();
    let badge = progress_of(&first.progress, "goal-master");
    assert!(badge.earned);
    assert!(badge.earned_date.is_some());
    // Repaired legacy entries are not newly earned and pay no bonus
    assert!(first.newly_earned.is_empty());

    let stored_after_first = db.achievements().load_raw(user_id).await.unwrap().unwrap();
    let records: serde_json::Value = serde_json::from_str(&stored_after_first).unwrap();
    assert_eq!(records[0]["badgeId"], "goal-master");
    assert_eq!(records[0]["earned"], true);
    assert!(records[0]["earnedDate"].is_string());

    service
        .evaluate_achievements(user_id, &athlete_snapshot())
        .await
        .unwrap();
    let stored_after_second = db.achievements().load_raw(user_id).await.unwrap().unwrap();
    assert_eq!(stored_after_first, stored_after_second);
}

#[tokio::test]
async fn test_malformed_stored_records_are_dropped() {
    let (db, user_id, service, _stats) = setup_athlete().await.unwrap();
    db.achievements()
        .store_raw(
            user_id,
            r#"[17, {"badgeId": "friends-1", "earned": true, "earnedDate": null}, {"bogus": 1}, null]"#,
        )
        .await
        .unwrap();

    let outcome = service
        .evaluate_achievements(user_id, &athlete_snapshot())
        .await
        .unwrap();

    assert!(progress_of(&outcome.progress, "friends-1").earned);
    let records = service.achievement_records(user_id).await.unwrap();
    assert_eq!(records.len(), 1);
}

#[tokio::test]
async fn test_malformed_catalog_entry_isolated() {
    let database = create_test_database().await.unwrap();
    let user_id = create_test_user(&database, UserRole::Athlete).await.unwrap();
    let catalog = AchievementCatalog::new(
        1,
        vec![
            AchievementDefinition {
                id: "broken-date".into(),
                title: "Broken".into(),
                description: String::new(),
                condition: AchievementCondition::Date { month: 13, day: 1 },
                restricted_to_role: None,
            },
            AchievementDefinition {
                id: "shares-1".into(),
                title: "Sharer".into(),
                description: String::new(),
                condition: AchievementCondition::Shares { required: 1 },
                restricted_to_role: None,
            },
        ],
    )
    .unwrap();
    let service = GamificationService::new(
        database,
        GamificationConfig::default(),
        Arc::new(catalog),
        Arc::new(FixedStatistics::default()),
    );

    let mut snapshot = athlete_snapshot();
    snapshot.shares = 1;
    let outcome = service.evaluate_achievements(user_id, &snapshot).await.unwrap();

    assert_eq!(outcome.newly_earned, vec!["shares-1".to_owned()]);
    let broken = progress_of(&outcome.progress, "broken-date");
    assert_eq!(broken.progress, 0);
    assert!(!broken.earned);
}

#[tokio::test]
async fn test_failing_collaborator_degrades_to_zero() {
    use async_trait::async_trait;
    use pierre_gamification::errors::{AppError, AppResult};
    use pierre_gamification::gamification::{BodyProgress, StatisticsProvider};
    use uuid::Uuid;

    struct FriendsDown;

    #[async_trait]
    impl StatisticsProvider for FriendsDown {
        async fn friend_count(&self, _user_id: Uuid) -> AppResult<u32> {
            Err(AppError::internal("friends service unavailable"))
        }
        async fn goals_completed(&self, _user_id: Uuid) -> AppResult<u32> {
            Ok(1)
        }
        async fn measurement_count(&self, _user_id: Uuid) -> AppResult<u32> {
            Ok(0)
        }
        async fn login_count(&self, _user_id: Uuid) -> AppResult<u32> {
            Ok(0)
        }
        async fn share_count(&self, _user_id: Uuid) -> AppResult<u32> {
            Ok(0)
        }
        async fn body_progress(&self, _user_id: Uuid) -> AppResult<BodyProgress> {
            Ok(BodyProgress::default())
        }
        async fn coach_athlete_count(&self, _user_id: Uuid) -> AppResult<u32> {
            Ok(0)
        }
        async fn coach_program_count(&self, _user_id: Uuid) -> AppResult<u32> {
            Ok(0)
        }
    }

    let database = create_test_database().await.unwrap();
    let user_id = create_test_user(&database, UserRole::Athlete).await.unwrap();
    let service = GamificationService::new(
        database,
        GamificationConfig::default(),
        Arc::new(AchievementCatalog::builtin()),
        Arc::new(FriendsDown),
    );

    let snapshot = service.snapshot(user_id).await.unwrap();
    assert_eq!(snapshot.friends, 0);
    assert_eq!(snapshot.goals_completed, 1);

    let outcome = service.current_achievements(user_id).await.unwrap();
    assert!(outcome.newly_earned.contains(&"first-goal".to_owned()));
    assert!(!outcome.newly_earned.contains(&"friends-1".to_owned()));
}

#[tokio::test]
async fn test_failed_bonus_leaves_badge_unearned_until_retried() {
    let (db, user_id, service, stats) = setup_athlete().await.unwrap();
    stats.update(|s| s.goals_completed = 1).await;

    sqlx::query(
        "CREATE TRIGGER reject_achievement_bonus BEFORE INSERT ON point_transactions \
         WHEN NEW.kind = 'achievement' \
         BEGIN SELECT RAISE(ABORT, 'achievement inserts disabled'); END",
    )
    .execute(db.pool())
    .await
    .unwrap();

    let err = service
        .award_points_at(user_id, 20, PointKind::Goal, "goal", at_noon(2024, 6, 15))
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::DatabaseError);

    // The goal award committed; the badge and its bonus did not
    assert_eq!(service.balance(user_id).await.unwrap(), 20);
    let records = service.achievement_records(user_id).await.unwrap();
    assert!(records.iter().all(|record| !record.earned));
    assert!(service.verify_balance(user_id).await.unwrap().is_consistent());

    sqlx::query("DROP TRIGGER reject_achievement_bonus")
        .execute(db.pool())
        .await
        .unwrap();

    let retried = service
        .award_points_at(user_id, 1, PointKind::Nutrition, "meal", at_noon(2024, 6, 15))
        .await
        .unwrap();
    assert_eq!(retried.newly_earned, vec!["first-goal".to_owned()]);
    assert_eq!(retried.balance, 46);
    assert_eq!(
        service.ledger().count(user_id, PointKind::Achievement).await.unwrap(),
        1
    );
    let records = service.achievement_records(user_id).await.unwrap();
    assert!(records
        .iter()
        .any(|record| record.badge_id == "first-goal" && record.earned));
    assert!(service.verify_balance(user_id).await.unwrap().is_consistent());
}

#[tokio::test]
async fn test_catalog_file_with_unknown_condition_still_evaluates() {
    let mut file = NamedTempFile::new().unwrap();
    write!(
        file,
        r#"{{
            "version": 3,
            "badges": [
                {{"id": "friends-1", "title": "First Friend", "description": "",
                  "condition": {{"type": "friends", "required": 1}}}},
                {{"id": "marathon", "title": "Marathoner", "description": "",
                  "condition": {{"type": "marathons", "required": 1}}}},
                {{"id": "points-10", "title": "Starter", "description": "",
                  "condition": {{"type": "points", "required": 10}}}}
            ]
        }}"#
    )
    .unwrap();
    let catalog = AchievementCatalog::load_from_path(file.path()).unwrap();
    assert_eq!(catalog.len(), 3);

    let database = create_test_database().await.unwrap();
    let user_id = create_test_user(&database, UserRole::Athlete).await.unwrap();
    let service = GamificationService::new(
        database,
        GamificationConfig::default(),
        Arc::new(catalog),
        Arc::new(FixedStatistics::new(CollaboratorStatistics::default())),
    );

    let mut snapshot = athlete_snapshot();
    snapshot.friends = 1;
    let outcome = service.evaluate_achievements(user_id, &snapshot).await.unwrap();

    // friends-1 bonus (25) lifts the balance past points-10
    assert_eq!(
        outcome.newly_earned,
        vec!["friends-1".to_owned(), "points-10".to_owned()]
    );
    let marathon = progress_of(&outcome.progress, "marathon");
    assert_eq!(marathon.progress, 0);
    assert!(!marathon.earned);
}
