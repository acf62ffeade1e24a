//! Command-line and environment configuration.
//!
//! Flags win over environment values (`MJOP_LOG_LEVEL`, `MJOP_LOG_DIR`,
//! `MJOP_TODAY`). Logging stays off unless a log directory is configured.

use chrono::NaiveDate;
use clap::error::ErrorKind;
use clap::{CommandFactory, Parser, Subcommand};
use mjop_core::{default_log_level, parse_calendar_date};
use std::path::PathBuf;

pub const ENV_LOG_LEVEL: &str = "MJOP_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "MJOP_LOG_DIR";
pub const ENV_TODAY: &str = "MJOP_TODAY";

/// MJOP reserve-fund projection.
///
/// Loads a plan document, expands its tasks and prints one row per
/// occurrence with its price and remaining reserve balance.
#[derive(Debug, Parser)]
#[command(name = "mjop", version, about, long_about = None)]
#[command(subcommand_negates_reqs = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Plan document (JSON).
    #[arg(required = true)]
    pub plan: Option<PathBuf>,

    /// Reference date (YYYY-MM-DD or DD-MM-YYYY); defaults to the local date.
    #[arg(long, env = ENV_TODAY, value_parser = parse_today)]
    pub today: Option<NaiveDate>,

    /// Log level: trace, debug, info, warn or error.
    #[arg(long, env = ENV_LOG_LEVEL, default_value = default_log_level())]
    pub log_level: String,

    /// Absolute directory for rolling log files.
    #[arg(long, env = ENV_LOG_DIR)]
    pub log_dir: Option<String>,
}

/// Core linkage checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Subcommand)]
pub enum Commands {
    /// Check that the core library answers.
    Ping,
    /// Print the core library version.
    Version,
}

/// What the binary was asked to do, after parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Ping,
    Version,
    Project(RunConfig),
}

/// Settings for one projection run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    pub plan_path: PathBuf,
    /// Reference date; `None` means the local calendar date.
    pub today: Option<NaiveDate>,
    pub log_level: String,
    pub log_dir: Option<String>,
}

impl Cli {
    /// Resolves parsed arguments into the action to run.
    pub fn action(self) -> Result<Action, clap::Error> {
        match (self.command, self.plan) {
            (Some(Commands::Ping), _) => Ok(Action::Ping),
            (Some(Commands::Version), _) => Ok(Action::Version),
            (None, Some(plan_path)) => Ok(Action::Project(RunConfig {
                plan_path,
                today: self.today,
                log_level: self.log_level,
                log_dir: self.log_dir.filter(|dir| !dir.trim().is_empty()),
            })),
            (None, None) => Err(Cli::command().error(
                ErrorKind::MissingRequiredArgument,
                "a plan document is required",
            )),
        }
    }
}

fn parse_today(raw: &str) -> Result<NaiveDate, String> {
    parse_calendar_date(raw).map_err(|err| err.to_string())
}
