// ABOUTME: Re-exports command modules for pierre-gamification-cli
// ABOUTME: Provides access to user, points, and achievement commands
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

pub mod achievements;
pub mod points;
pub mod user;
