// ABOUTME: Main library entry point for the Pierre gamification engine
// ABOUTME: Point ledger, streak tracking, and achievement evaluation behind one facade
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![deny(unsafe_code)]

//! # Pierre Gamification
//!
//! The gamification engine of the Pierre fitness coaching platform.
//!
//! ## Features
//!
//! - **Point ledger**: append-only transactions with an atomically maintained balance
//! - **Daily policies**: once-per-day bonuses and capped message points
//! - **Streaks**: persisted login streak and a derived workout streak with a 7-day bonus
//! - **Achievements**: versioned badge catalog, role filtering, legacy record repair
//!
//! ## Architecture
//!
//! - **Core crate**: errors, constants, and plain data models
//! - **Database**: `SQLite` pool, schema, and per-table managers
//! - **Gamification**: ledger, streak tracker, evaluator, and the facade
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use pierre_gamification::database::Database;
//! use pierre_gamification::errors::AppResult;
//! use pierre_gamification::gamification::GamificationService;
//! use pierre_gamification::models::{PointKind, UserAccount, UserRole};
//!
//! #[tokio::main]
//! async fn main() -> AppResult<()> {
//!     let database = Database::connect("sqlite::memory:").await?;
//!     let service = GamificationService::with_defaults(database);
//!
//!     let user_id = service
//!         .create_user(&UserAccount::new("Ada", UserRole::Athlete))
//!         .await?;
//!     let outcome = service
//!         .award_points(user_id, 5, PointKind::Login, "daily login")
//!         .await?;
//!     println!("Balance: {}", outcome.balance);
//!
//!     Ok(())
//! }
//! ```

/// Environment configuration
pub mod config;

/// Domain constants
pub mod constants;

/// `SQLite` persistence
pub mod database;

/// Unified error handling
pub mod errors;

/// Ledger, streaks, achievements, and the facade
pub mod gamification;

/// Structured logging setup
pub mod logging;

/// Domain models
pub mod models;
