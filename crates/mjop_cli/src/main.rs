//! MJOP projection CLI.
//!
//! # Responsibility
//! - Load a plan document, expand its tasks and print one row per
//!   occurrence with its price and remaining reserve balance.
//! - Provide `ping`/`version` subcommands for checking core linkage.

mod config;

use clap::Parser;
use config::{Action, Cli, RunConfig};
use log::info;
use mjop_core::{
    core_version, format_calendar_date, init_logging, PlanDocument, PlanService, TaskBalance,
};
use std::process::ExitCode;

fn main() -> ExitCode {
    let action = match Cli::parse().action() {
        Ok(action) => action,
        Err(err) => err.exit(),
    };

    match action {
        Action::Ping => println!("mjop_core ping=pong"),
        Action::Version => println!("mjop_core version={}", core_version()),
        Action::Project(config) => {
            if let Err(message) = run(&config) {
                eprintln!("error: {message}");
                return ExitCode::FAILURE;
            }
        }
    }
    ExitCode::SUCCESS
}

fn run(config: &RunConfig) -> Result<(), String> {
    if let Some(log_dir) = config.log_dir.as_deref() {
        init_logging(&config.log_level, log_dir).map_err(|err| err.to_string())?;
    }

    let raw = std::fs::read_to_string(&config.plan_path)
        .map_err(|err| format!("cannot read `{}`: {err}", config.plan_path.display()))?;
    let document: PlanDocument = serde_json::from_str(&raw)
        .map_err(|err| format!("invalid plan `{}`: {err}", config.plan_path.display()))?;

    let service = PlanService::from_document(&document).map_err(|err| err.to_string())?;
    let today = config
        .today
        .unwrap_or_else(|| chrono::Local::now().date_naive());
    let rows = service
        .remaining_balances(today)
        .map_err(|err| err.to_string())?;
    info!(
        "event=projection module=cli status=ok rows={} today={}",
        rows.len(),
        format_calendar_date(today)
    );

    for line in render_rows(&service, &rows) {
        println!("{line}");
    }
    Ok(())
}

fn render_rows(service: &PlanService, rows: &[TaskBalance]) -> Vec<String> {
    let plan = service.plan();
    let mut lines = Vec::with_capacity(rows.len() + 1);
    lines.push(format!(
        "{:<10}  {:<20}  {:<28}  {:>12}  {:>12}",
        "due", "element", "task", "price", "balance"
    ));
    for row in rows {
        let element = plan
            .elements
            .iter()
            .find(|element| element.id == row.element_id)
            .map_or("?", |element| element.name.as_str());
        let task = plan
            .find_occurrence(row.occurrence_id)
            .map_or("?", |task| task.name.as_str());
        lines.push(format!(
            "{:<10}  {:<20}  {:<28}  {:>12.2}  {:>12.2}",
            format_calendar_date(row.due_date),
            element,
            task,
            row.price,
            row.remaining_balance
        ));
    }
    lines
}
