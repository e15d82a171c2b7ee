// ABOUTME: Application constants re-exported from pierre-gamification-core
// ABOUTME: Point defaults, streak limits, catalog version, and service names
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

pub use pierre_gamification_core::constants::*;
