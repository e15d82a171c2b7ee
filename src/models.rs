// ABOUTME: Data models re-exported from pierre-gamification-core
// ABOUTME: Points, achievements, streaks, and the statistics snapshot
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

pub use pierre_gamification_core::models::*;
