//! health-report - evaluate health check exports from the command line
//!
//! Usage:
//! ```bash
//! # Report for the latest visit, compared with the one before it
//! health-report evaluate visits.json --focus sleep,diet
//!
//! # One report per visit, as JSON
//! health-report --format json evaluate visits.json --all
//!
//! # Trend of a single metric across all visits
//! health-report trends visits.json --metric vo2Max
//!
//! # Reference ranges for a subject
//! health-report ranges --gender female --age 35
//! ```

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{debug, error};

use health_report_lib::commands::{self, CommandError};
use health_report_lib::logging::LogFormat;
use health_report_lib::{Gender, OutputFormat, ReportConfig};

#[derive(Parser)]
#[command(
  name = "health-report",
  version,
  about = "Health check evaluation",
  long_about = "Scores health check visits against reference ranges and follows metrics from visit to visit."
)]
struct Cli {
  #[command(subcommand)]
  command: Command,

  /// Output format (overrides HEALTH_REPORT_FORMAT)
  #[arg(long, global = true, value_enum)]
  format: Option<OutputFormat>,

  /// Date used as "today" for ages and undated rows, YYYY-MM-DD
  #[arg(long, global = true)]
  reference_date: Option<NaiveDate>,

  /// Log output format on stderr
  #[arg(long, global = true, value_enum)]
  log_format: Option<LogFormat>,

  /// Enable debug logging
  #[arg(long, short = 'v', global = true)]
  verbose: bool,
}

#[derive(Subcommand)]
enum Command {
  /// Build a report for the latest visit in a row export
  Evaluate {
    /// JSON array of spreadsheet rows
    file: PathBuf,

    /// Report every visit instead of only the latest
    #[arg(long)]
    all: bool,

    /// Focus areas, comma-separated keys or labels
    #[arg(long, value_delimiter = ',')]
    focus: Vec<String>,

    /// Maximum number of focus areas (overrides HEALTH_REPORT_MAX_FOCUS_AREAS)
    #[arg(long, value_parser = clap::value_parser!(u8).range(1..=8))]
    max_focus: Option<u8>,
  },

  /// Show metric trends across visits
  Trends {
    /// JSON array of spreadsheet rows
    file: PathBuf,

    /// Single metric key, e.g. weight or tcHdlRatio
    #[arg(long)]
    metric: Option<String>,
  },

  /// Print reference ranges and fitness norms
  Ranges {
    #[arg(long)]
    gender: Option<Gender>,

    #[arg(long)]
    age: Option<u32>,
  },
}

fn load_config(cli: &Cli) -> Result<ReportConfig, CommandError> {
  let mut config = ReportConfig::from_env()?;

  if let Some(format) = cli.format {
    config.format = format;
  }
  if let Some(date) = cli.reference_date {
    config.reference_date = date;
  }
  if let Some(format) = cli.log_format {
    config.logging.format = format;
  }
  if cli.verbose {
    config.logging.filter = "debug".into();
  }
  if let Command::Evaluate { max_focus: Some(max), .. } = &cli.command {
    config.max_focus_areas = usize::from(*max);
  }
  Ok(config)
}

fn execute(config: &ReportConfig, command: &Command) -> Result<String, CommandError> {
  match command {
    Command::Evaluate { file, all, focus, .. } => commands::evaluate::run(config, file, *all, focus),
    Command::Trends { file, metric } => commands::trends::run(config, file, metric.as_deref()),
    Command::Ranges { gender, age } => commands::ranges::run(config.format, *gender, *age),
  }
}

fn main() -> ExitCode {
  let cli = Cli::parse();

  let config = match load_config(&cli) {
    Ok(config) => config,
    Err(e) => {
      eprintln!("error: {}", e);
      return ExitCode::FAILURE;
    }
  };

  if let Err(e) = config.logging.init() {
    eprintln!("Failed to initialize logging: {}", e);
  }
  debug!(?config, "loaded configuration");

  match execute(&config, &cli.command) {
    Ok(output) => {
      print!("{}", output);
      ExitCode::SUCCESS
    }
    Err(e) => {
      error!(error = %e, "command failed");
      eprintln!("error: {}", e);
      ExitCode::FAILURE
    }
  }
}
