//! eating-helper: CLI for weekly meal plans
//!
//! Reads hand-written recipe and meal plan files, reports nutrition, builds
//! the grocery list and schedules meals.

use anyhow::Result;
use clap::{Parser, Subcommand};
use owo_colors::OwoColorize;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use eating_helper::config::Settings;

mod commands;

#[derive(Parser)]
#[command(name = "eating-helper")]
#[command(about = "CLI helper for weekly meal plans", long_about = None)]
#[command(version)]
struct Cli {
    /// Config file (default: <config dir>/eating-helper/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Show debug logs
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show nutrition per recipe, per day and for the week
    Stats {
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Build the grocery list and add it to the shopping task list
    Grocery {
        /// Print the list without sending it
        #[arg(short = 'n', long)]
        dry_run: bool,
    },

    /// Add the week's meals to the meal plan calendar
    Calendar {
        /// Print the schedule without sending it
        #[arg(short = 'n', long)]
        dry_run: bool,

        /// Days from today until the plan's first day
        #[arg(long, default_value_t = 2)]
        days_from_now: u32,
    },

    /// Delete every task on the shopping list
    ClearTasks {
        /// Skip confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let settings = Settings::load(cli.config.as_deref())?;

    let result = match cli.command {
        Commands::Stats { json } => commands::stats::execute(&settings, json),

        Commands::Grocery { dry_run } => {
            if dry_run {
                println!("{}", "(DRY-RUN MODE - nothing will be sent)".blue());
            }
            commands::grocery::execute(&settings, dry_run)
        }

        Commands::Calendar {
            dry_run,
            days_from_now,
        } => {
            if dry_run {
                println!("{}", "(DRY-RUN MODE - nothing will be sent)".blue());
            }
            commands::calendar::execute(&settings, dry_run, days_from_now)
        }

        Commands::ClearTasks { yes } => commands::clear_tasks::execute(&settings, yes),
    };

    if let Err(e) = &result {
        commands::utils::print_hints(e);
    }
    result
}
