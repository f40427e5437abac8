use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::process;
use tracing::{info, info_span, warn};

use reward_stats::analyzer::{ProcessOptions, StatsAnalyzer, StatsCommand};
use reward_stats::config::Config;
use reward_stats::display::ReportDisplayManager;
use reward_stats::logging::{init_logging, new_run_id};
use reward_stats::Period;

#[derive(Parser)]
#[command(name = "reward-stats")]
#[command(about = "Summarise monthly reward distribution and staking reports")]
#[command(version)]
struct Cli {
    /// Directory holding the <year>-<month> report folders
    #[arg(long, global = true)]
    reports_dir: Option<PathBuf>,

    /// Output in JSON format
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Args, Clone, Default)]
struct RangeArgs {
    /// First month of the range (YYYY-M)
    #[arg(long)]
    from: Option<Period>,
    /// Last month of the range (YYYY-M)
    #[arg(long)]
    to: Option<Period>,
    /// Periods to show; all periods in the range when omitted
    periods: Vec<Period>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the full report for each period
    Report(RangeArgs),
    /// Show the total rewards distributed for each period
    Distributed(RangeArgs),
    /// List the report periods present on disk
    List,
}

fn main() {
    match run() {
        Ok(true) => {}
        Ok(false) => process::exit(1),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            process::exit(1);
        }
    }
}

fn run() -> Result<bool> {
    let cli = Cli::parse();
    let config = Config::load()?;

    let _log_guard = init_logging(&config.logging, &config.paths.log_directory);
    if !config.output.color {
        colored::control::set_override(false);
    }

    let run_id = new_run_id();
    let span = info_span!("run", run_id = %run_id);
    let _enter = span.enter();

    if let Some(path) = &config.source {
        info!(config_file = %path.display(), "Loaded configuration from file");
    }

    let (command, range) = match cli.command.unwrap_or(Commands::Report(RangeArgs::default())) {
        Commands::Report(range) => (StatsCommand::Report, range),
        Commands::Distributed(range) => (StatsCommand::Distributed, range),
        Commands::List => (StatsCommand::List, RangeArgs::default()),
    };

    // Without periods or a range on the command line, show the configured selection
    let periods = if range.periods.is_empty() && range.from.is_none() && range.to.is_none() {
        config.range.default_periods()?
    } else {
        range.periods
    };

    let options = ProcessOptions {
        reports_dir: cli.reports_dir.unwrap_or(config.paths.reports_dir.clone()),
        start: match range.from {
            Some(p) => p,
            None => config.range.start_period()?,
        },
        end: match range.to {
            Some(p) => p,
            None => config.range.end_period()?,
        },
        periods,
        json_output: cli.json,
    };

    if !options.reports_dir.exists() {
        warn!(
            reports_dir = %options.reports_dir.display(),
            "Reports directory does not exist"
        );
    }

    let analyzer =
        StatsAnalyzer::with_display_manager(ReportDisplayManager::with_json_pretty(
            config.output.json_pretty,
        ));
    let outcome = analyzer.run_command(command, &options)?;
    Ok(outcome.is_success())
}
