// ABOUTME: Pierre gamification CLI - operate the point ledger and achievements from a terminal
// ABOUTME: Handles user creation, awards, logins, workouts, and ledger verification
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence
//!
//! Usage:
//! ```bash
//! # Register an athlete
//! pierre-gamification-cli user create --name "Ada" --role athlete
//!
//! # Daily login (streak + login bonus)
//! pierre-gamification-cli login <user-id>
//!
//! # Award points directly
//! pierre-gamification-cli award <user-id> --kind goal --amount 20 --reason "10k run"
//!
//! # Complete today's workout
//! pierre-gamification-cli workout <user-id>
//!
//! # Evaluate achievements with collaborator statistics
//! pierre-gamification-cli achievements <user-id> --friends 10 --goals 3
//!
//! # Check the balance invariant for every user
//! pierre-gamification-cli verify
//! ```

mod commands;
mod helpers;

use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use pierre_gamification::config::{DatabaseConfig, DatabaseUrl, GamificationConfig};
use pierre_gamification::database::Database;
use pierre_gamification::gamification::{
    AchievementCatalog, BodyProgress, CollaboratorStatistics, FixedStatistics,
    GamificationService,
};
use pierre_gamification::logging::{LogFormat, LoggingConfig};
use pierre_gamification::models::{PointKind, UserRole};
use tracing::info;
use uuid::Uuid;

#[derive(Parser)]
#[command(
    name = "pierre-gamification-cli",
    about = "Pierre Gamification Engine CLI",
    long_about = "Command-line tool for the Pierre point ledger, streaks, and achievements."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Database URL override
    #[arg(long, global = true)]
    database_url: Option<String>,

    /// Enable debug logging
    #[arg(long, short = 'v', global = true)]
    verbose: bool,
}

#[non_exhaustive]
#[derive(Subcommand)]
enum Command {
    /// User management commands
    User {
        #[command(subcommand)]
        action: UserCommand,
    },

    /// Record a daily login
    Login {
        /// User ID
        user_id: Uuid,
    },

    /// Award points
    Award {
        /// User ID
        user_id: Uuid,

        /// Award category (workout, nutrition, login, friend, message, streak, achievement, goal, program-selection)
        #[arg(long)]
        kind: PointKind,

        /// Signed, non-zero point amount
        #[arg(long, allow_negative_numbers = true)]
        amount: i64,

        /// Reason shown in the history
        #[arg(long, default_value = "Manual award")]
        reason: String,
    },

    /// Complete today's workout
    Workout {
        /// User ID
        user_id: Uuid,
    },

    /// Record a sent message (capped per day)
    Message {
        /// User ID
        user_id: Uuid,
    },

    /// Evaluate and show achievements
    Achievements {
        /// User ID
        user_id: Uuid,

        #[command(flatten)]
        stats: StatsArgs,
    },

    /// Show the current balance
    Balance {
        /// User ID
        user_id: Uuid,
    },

    /// Show recent transactions
    History {
        /// User ID
        user_id: Uuid,

        /// Number of transactions to show
        #[arg(long, default_value = "20")]
        limit: u32,
    },

    /// Check stored balances against the ledger
    Verify {
        /// Only this user (all users if omitted)
        user_id: Option<Uuid>,
    },
}

#[non_exhaustive]
#[derive(Subcommand)]
enum UserCommand {
    /// Create a new user
    Create {
        /// Display name
        #[arg(long)]
        name: String,

        /// Role (athlete or coach)
        #[arg(long, default_value = "athlete")]
        role: UserRole,
    },
}

/// Collaborator statistics supplied on the command line
#[derive(clap::Args, Default)]
struct StatsArgs {
    /// Accepted friends
    #[arg(long, default_value = "0")]
    friends: u32,

    /// Completed goals
    #[arg(long, default_value = "0")]
    goals: u32,

    /// Body measurement records
    #[arg(long, default_value = "0")]
    measurements: u32,

    /// Total logins
    #[arg(long, default_value = "0")]
    logins: u32,

    /// Shared items
    #[arg(long, default_value = "0")]
    shares: u32,

    /// Kilograms lost since the first weight record
    #[arg(long, default_value = "0")]
    weight_loss_kg: f64,

    /// A body circumference increased
    #[arg(long)]
    muscle_gain: bool,

    /// Athletes coached
    #[arg(long, default_value = "0")]
    athletes: u32,

    /// Programs authored
    #[arg(long, default_value = "0")]
    programs: u32,
}

impl StatsArgs {
    fn into_statistics(self) -> CollaboratorStatistics {
        CollaboratorStatistics {
            friends: self.friends,
            goals_completed: self.goals,
            measurements: self.measurements,
            logins: self.logins,
            shares: self.shares,
            body: BodyProgress {
                weight_delta_kg: self.weight_loss_kg,
                circumference_increased: self.muscle_gain,
            },
            coach_athletes: self.athletes,
            coach_programs: self.programs,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut logging = LoggingConfig::from_env();
    logging.format = LogFormat::Compact;
    if cli.verbose {
        logging.level = "debug".into();
    }
    logging.init()?;

    let mut db_config = DatabaseConfig::from_env()?;
    if let Some(url) = &cli.database_url {
        db_config.url = DatabaseUrl::parse_url(url)?;
    }
    info!("Connecting to database: {}", db_config.url);
    let database = Database::new(&db_config).await?;

    let build_service = |stats: CollaboratorStatistics| {
        GamificationService::new(
            database.clone(),
            GamificationConfig::global().clone(),
            Arc::new(AchievementCatalog::global().clone()),
            Arc::new(FixedStatistics::new(stats)),
        )
    };

    match cli.command {
        Command::User { action } => match action {
            UserCommand::Create { name, role } => {
                commands::user::create(&database, name, role).await?;
            }
        },
        Command::Login { user_id } => {
            let service = build_service(CollaboratorStatistics::default());
            commands::points::login(&service, user_id).await?;
        }
        Command::Award {
            user_id,
            kind,
            amount,
            reason,
        } => {
            let service = build_service(CollaboratorStatistics::default());
            commands::points::award(&service, user_id, kind, amount, &reason).await?;
        }
        Command::Workout { user_id } => {
            let service = build_service(CollaboratorStatistics::default());
            commands::points::workout(&service, user_id).await?;
        }
        Command::Message { user_id } => {
            let service = build_service(CollaboratorStatistics::default());
            commands::points::message(&service, user_id).await?;
        }
        Command::Achievements { user_id, stats } => {
            let service = build_service(stats.into_statistics());
            commands::achievements::show(&service, user_id).await?;
        }
        Command::Balance { user_id } => {
            let service = build_service(CollaboratorStatistics::default());
            commands::points::balance(&service, user_id).await?;
        }
        Command::History { user_id, limit } => {
            let service = build_service(CollaboratorStatistics::default());
            commands::points::history(&service, user_id, limit).await?;
        }
        Command::Verify { user_id } => {
            let service = build_service(CollaboratorStatistics::default());
            commands::points::verify(&database, &service, user_id).await?;
        }
    }

    Ok(())
}
