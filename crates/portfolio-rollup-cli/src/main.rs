mod commands;
mod config;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use portfolio_rollup_core::calendar::SystemClock;
use std::process;
use tracing_subscriber::EnvFilter;

use commands::calendar::BucketsArgs;
use commands::rollup::{ClampArgs, RollupArgs, ValidateArgs};

/// Calendar-bucketed revenue, cost and margin rollups for project portfolios
#[derive(Parser)]
#[command(
    name = "prollup",
    version,
    about = "Calendar-bucketed project portfolio rollups",
    long_about = "Allocates each project's constant weekly revenue, cost and adjustments \
                  across the months or 7-day weeks of a fiscal year, prorating partial \
                  periods by day, and rolls the results up into project and portfolio \
                  totals with margin percentages."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Path to a YAML config file (or set PORTFOLIO_ROLLUP_CONFIG)
    #[arg(long, global = true)]
    config: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Allocate every project across the year's buckets and roll up totals
    Rollup(RollupArgs),
    /// Print the bucket calendar for a year
    Buckets(BucketsArgs),
    /// Re-clamp every project range into another year
    Clamp(ClampArgs),
    /// Report projects whose date ranges cannot be allocated
    Validate(ValidateArgs),
    /// Print the current year and the selectable year range
    Years,
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Yaml,
    Table,
    Csv,
    Minimal,
}

fn init_tracing(default_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();

    let app_config = match config::load_config(cli.config.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    };
    init_tracing(&app_config.log_level);
    tracing::debug!(?app_config, "configuration resolved");

    let clock = SystemClock;

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Rollup(args) => commands::rollup::run_rollup(args, &app_config, &clock),
        Commands::Buckets(args) => commands::calendar::run_buckets(args, &app_config, &clock),
        Commands::Clamp(args) => commands::rollup::run_clamp(args),
        Commands::Validate(args) => commands::rollup::run_validate(args),
        Commands::Years => commands::calendar::run_years(&app_config, &clock),
        Commands::Version => {
            println!("prollup {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
