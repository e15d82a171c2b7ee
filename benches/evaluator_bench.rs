// ABOUTME: Criterion benchmarks for achievement evaluation and point awards
// ABOUTME: Measures catalog scoring, stored-record repair, and the full award path on SQLite
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Criterion benchmarks for the gamification hot paths.

#![allow(
    clippy::missing_docs_in_private_items,
    clippy::unwrap_used,
    missing_docs
)]

use std::sync::Arc;

use chrono::{NaiveDate, TimeZone, Utc};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use pierre_gamification::database::Database;
use pierre_gamification::gamification::evaluator::{evaluate_catalog, repair_records};
use pierre_gamification::gamification::{AchievementCatalog, GamificationService};
use pierre_gamification::models::{
    PointKind, UserAccount, UserAchievementRecord, UserRole, UserStatisticsSnapshot,
};
use tokio::runtime::Runtime;

fn busy_snapshot(role: UserRole) -> UserStatisticsSnapshot {
    let today = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();
    let mut snapshot = UserStatisticsSnapshot::new(role, today);
    snapshot.points_balance = 640;
    snapshot.login_streak = 12;
    snapshot.workouts = 42;
    snapshot.friends = 6;
    snapshot.goals_completed = 4;
    snapshot.measurements = 3;
    snapshot.weight_loss_kg = 2.5;
    snapshot.coach_athletes = 2;
    snapshot
}

fn bench_evaluate_catalog(c: &mut Criterion) {
    let catalog = AchievementCatalog::builtin();
    let now = Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap();
    let mut group = c.benchmark_group("evaluate_catalog");
    group.throughput(Throughput::Elements(catalog.len() as u64));

    for role in [UserRole::Athlete, UserRole::Coach] {
        let snapshot = busy_snapshot(role);
        group.bench_with_input(
            BenchmarkId::new("no_records", role.as_str()),
            &snapshot,
            |b, snapshot| {
                b.iter(|| {
                    let mut records = Vec::new();
                    evaluate_catalog(&catalog, black_box(snapshot), &mut records, now)
                });
            },
        );
    }

    let snapshot = busy_snapshot(UserRole::Athlete);
    let earned: Vec<UserAchievementRecord> = catalog
        .badges
        .iter()
        .map(|badge| UserAchievementRecord::earned_at(badge.id.clone(), now))
        .collect();
    group.bench_function("all_earned", |b| {
        b.iter(|| {
            let mut records = earned.clone();
            evaluate_catalog(&catalog, black_box(&snapshot), &mut records, now)
        });
    });

    group.finish();
}

fn bench_repair_records(c: &mut Criterion) {
    let now = Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap();
    let mut group = c.benchmark_group("repair_records");

    for count in [10_usize, 100] {
        let clean: Vec<UserAchievementRecord> = (0..count)
            .map(|i| UserAchievementRecord::earned_at(format!("badge-{i}"), now))
            .collect();
        let clean_json = serde_json::to_string(&clean).unwrap();
        let legacy: Vec<String> = (0..count).map(|i| format!("badge-{i}")).collect();
        let legacy_json = serde_json::to_string(&legacy).unwrap();

        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::new("clean", count), &clean_json, |b, json| {
            b.iter(|| repair_records(Some(black_box(json)), now));
        });
        group.bench_with_input(BenchmarkId::new("legacy", count), &legacy_json, |b, json| {
            b.iter(|| repair_records(Some(black_box(json)), now));
        });
    }

    group.finish();
}

fn bench_award_points(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let (service, user_id) = rt.block_on(async {
        let database = Database::connect("sqlite::memory:").await.unwrap();
        let service = GamificationService::with_defaults(database);
        let user = UserAccount::new("Bench Athlete", UserRole::Athlete);
        let user_id = service.create_user(&user).await.unwrap();
        (Arc::new(service), user_id)
    });

    let mut group = c.benchmark_group("award_points");
    group.bench_function("nutrition_entry", |b| {
        b.to_async(&rt).iter(|| {
            let service = service.clone();
            async move {
                service
                    .award_points(user_id, 1, PointKind::Nutrition, "Logged a meal")
                    .await
                    .unwrap()
            }
        });
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_evaluate_catalog,
    bench_repair_records,
    bench_award_points
);
criterion_main!(benches);
