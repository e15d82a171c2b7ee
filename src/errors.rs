// ABOUTME: Unified error handling re-exported from pierre-gamification-core
// ABOUTME: AppError, ErrorCode, and AppResult plus the unique-violation probe
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Unified Error Handling System
//!
//! Re-exports the core error types so the rest of the crate can keep using
//! `crate::errors::{AppError, AppResult}`.

pub use pierre_gamification_core::errors::{
    is_unique_violation, AppError, AppResult, ErrorCode, ErrorContext,
};
