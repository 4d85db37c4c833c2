// ABOUTME: Pierre training CLI: generate plans, classify messages, and report progress as JSON
// ABOUTME: Reads profiles and plans from files or stdin, writes results to stdout, logs to stderr
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence
//!
//! Usage:
//! ```bash
//! # Generate a 12-week plan from a profile
//! pierre-training generate --profile athlete.json --weeks 12 --seed 42 > plan.json
//!
//! # Classify a chat message with the configured completion service
//! pierre-training classify "my knee hurts after long runs"
//!
//! # Progress statistics and the missed-workout signal for a stored plan
//! pierre-training progress --plan plan.json --today 2026-04-01
//! ```

use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::info;

use pierre_training::clock::SystemClock;
use pierre_training::config::EngineConfig;
use pierre_training::errors::{config_app_error, AppError};
use pierre_training::core::models::{TrainingPlan, UserProfile};
use pierre_training::intent::IntentClassifier;
use pierre_training::llm::{
    ChatMessage, DisabledService, NaturalLanguageService, OpenAiCompatibleService,
};
use pierre_training::logging::LoggingConfig;
use pierre_training::periodization::{
    MissedWorkoutSignal, PlanGenerator, PlanRequest, ProgressReport, ProgressTracker,
};

#[derive(Parser)]
#[command(
    name = "pierre-training",
    about = "Pierre adaptive training engine",
    long_about = "Generate periodized training plans, classify athlete messages, and summarize progress."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable debug logging
    #[arg(long, short = 'v', global = true)]
    verbose: bool,
}

#[non_exhaustive]
#[derive(Subcommand)]
enum Command {
    /// Generate a plan from a profile JSON file ("-" for stdin)
    Generate {
        /// Profile JSON
        #[arg(long)]
        profile: PathBuf,

        /// Plan length in weeks
        #[arg(long)]
        weeks: u32,

        /// Earliest start date (defaults to today; rolled forward to Monday)
        #[arg(long)]
        start: Option<NaiveDate>,

        /// Seed for a reproducible plan
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Classify a message into an intent with slots
    Classify {
        /// Message text
        message: String,

        /// Conversation history JSON (array of {role, content})
        #[arg(long)]
        history: Option<PathBuf>,
    },

    /// Progress report for a plan JSON file ("-" for stdin)
    Progress {
        /// Plan JSON
        #[arg(long)]
        plan: PathBuf,

        /// Reference date (defaults to today)
        #[arg(long)]
        today: Option<NaiveDate>,
    },
}

#[derive(Serialize)]
struct ProgressOutput {
    report: ProgressReport,
    missed_workout_signal: Option<MissedWorkoutSignal>,
}

fn read_input(path: &Path) -> Result<String> {
    if path.as_os_str() == "-" {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .context("failed to read stdin")?;
        return Ok(buffer);
    }
    std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let output = serde_json::to_string_pretty(value).context("failed to serialize output")?;
    println!("{output}");
    Ok(())
}

fn completion_service(config: &EngineConfig) -> Result<Arc<dyn NaturalLanguageService>> {
    if !config.intent.enabled {
        return Ok(Arc::new(DisabledService));
    }
    let service = OpenAiCompatibleService::new(config.completion.clone())
        .context("failed to build completion client")?;
    Ok(Arc::new(service))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut logging = LoggingConfig::from_env();
    if cli.verbose {
        "debug".clone_into(&mut logging.level);
    }
    logging.init()?;

    let config = EngineConfig::from_env().map_err(|e| config_app_error(&e))?;

    match cli.command {
        Command::Generate {
            profile,
            weeks,
            start,
            seed,
        } => {
            let profile: UserProfile =
                serde_json::from_str(&read_input(&profile)?).context("invalid profile JSON")?;
            let now = Utc::now();
            let request = PlanRequest {
                total_weeks: weeks,
                start_date: start.unwrap_or_else(|| now.date_naive()),
                seed,
            };
            let plan = PlanGenerator::new(config.phases.clone())
                .generate(&profile, &request, now)
                .map_err(AppError::from)?;
            info!(plan_id = %plan.id, "plan written to stdout");
            print_json(&plan)?;
        }
        Command::Classify { message, history } => {
            let history: Vec<ChatMessage> = match history {
                Some(path) => serde_json::from_str(&read_input(&path)?)
                    .context("invalid history JSON")?,
                None => Vec::new(),
            };
            let classifier = IntentClassifier::new(
                completion_service(&config)?,
                Arc::new(SystemClock),
                config.intent.clone(),
            );
            print_json(&classifier.classify(&message, &history).await)?;
        }
        Command::Progress { plan, today } => {
            let plan: TrainingPlan =
                serde_json::from_str(&read_input(&plan)?).context("invalid plan JSON")?;
            let today = today.unwrap_or_else(|| Utc::now().date_naive());
            let tracker = ProgressTracker::new(config.progress);
            print_json(&ProgressOutput {
                report: tracker.report(plan.workouts(), today),
                missed_workout_signal: tracker.missed_workout_signal(plan.workouts(), today),
            })?;
        }
    }
    Ok(())
}
