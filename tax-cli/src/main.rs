use std::path::PathBuf;

use anyhow::Context;
use chrono::Datelike;
use clap::{Parser, Subcommand};
use tracing::{debug, info};

use tax_cli::{app, logging, report};
use tax_data::{load_scenarios_from_file, tables_to_toml};

// ─── CLI definition ──────────────────────────────────────────────────────────

/// Multi-year tax planning projections.
///
/// Loads client scenarios, compares each against its no-strategy baseline,
/// and prints the projected savings.
#[derive(Debug, Parser)]
struct Cli {
    /// TOML file replacing the built-in tax tables.
    #[arg(long, global = true)]
    tables: Option<PathBuf>,

    /// CSV of bracket schedules applied on top of the tables.
    #[arg(long, global = true)]
    brackets: Option<PathBuf>,

    /// First calendar year for scenarios that do not set one.
    #[arg(long, global = true, default_value_t = chrono::Local::now().year())]
    year: i32,

    /// Print JSON instead of text.
    #[arg(long, global = true)]
    json: bool,

    /// Also append log output to this file.
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    /// Raise log verbosity; repeat for more. `RUST_LOG` takes precedence.
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Project the first scenario in a TOML or CSV file.
    Project { file: PathBuf },

    /// Project every scenario in a TOML or CSV file in parallel.
    Batch {
        file: PathBuf,

        /// Stop at the first failing scenario.
        #[arg(long)]
        fail_fast: bool,
    },

    /// Print the effective tax tables as TOML.
    Tables,
}

// ─── entry point ─────────────────────────────────────────────────────────────

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose, cli.log_file.as_deref())?;

    let tables = app::load_tables(cli.tables.as_deref(), cli.brackets.as_deref())?;
    debug!(tax_year = tables.tax_year, "tax tables ready");

    let output = match &cli.command {
        Command::Project { file } => {
            let mut scenarios = load_scenarios_from_file(file)
                .with_context(|| format!("failed to load scenarios from '{}'", file.display()))?;
            app::apply_default_year(&mut scenarios, cli.year);

            let first = scenarios
                .first()
                .with_context(|| format!("no scenarios in '{}'", file.display()))?;
            let scenario_report = app::build_report(&tables, first)?;
            if cli.json {
                report::render_json(&scenario_report)?
            } else {
                report::render_text(&scenario_report)?
            }
        }
        Command::Batch { file, fail_fast } => {
            let mut scenarios = load_scenarios_from_file(file)
                .with_context(|| format!("failed to load scenarios from '{}'", file.display()))?;
            app::apply_default_year(&mut scenarios, cli.year);
            info!(count = scenarios.len(), "running batch");

            let batch = app::build_batch_report(&tables, &scenarios, *fail_fast)?;
            if cli.json {
                report::render_json(&batch)?
            } else {
                report::render_batch_text(&batch)?
            }
        }
        Command::Tables => tables_to_toml(&tables).context("failed to serialize tax tables")?,
    };

    print!("{output}");
    Ok(())
}
