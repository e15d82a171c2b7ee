// ABOUTME: Core types and constants for the Pierre gamification engine
// ABOUTME: Foundation crate with error handling, domain models, and point constants
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![deny(unsafe_code)]

//! # Pierre Gamification Core
//!
//! Foundation crate providing shared types and constants for the Pierre
//! gamification engine. Nothing in here performs I/O; the root crate owns
//! persistence and orchestration.
//!
//! ## Modules
//!
//! - **errors**: Unified error handling with `AppError` and `ErrorCode`
//! - **constants**: Point values, limits, and catalog versioning
//! - **models**: Point transactions, achievement definitions and records,
//!   streak records, and the statistics snapshot

/// Unified error handling system with standard error codes
pub mod errors;

/// Application constants organized by domain
pub mod constants;

/// Core data models (points, achievements, streaks, statistics)
pub mod models;
