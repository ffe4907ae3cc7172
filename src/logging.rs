//! Tracing subscriber setup
//!
//! Logs always go to stderr so stdout carries only report output.

use serde::Serialize;
use std::env;
use std::io;
use tracing::debug;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub const LOG_FILTER_VAR: &str = "HEALTH_REPORT_LOG";
pub const LOG_FORMAT_VAR: &str = "HEALTH_REPORT_LOG_FORMAT";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
  /// Multi-line, for development
  #[default]
  Pretty,
  /// One line per event
  Compact,
  /// Newline-delimited JSON
  Json,
}

impl std::str::FromStr for LogFormat {
  type Err = String;
  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim().to_lowercase().as_str() {
      "pretty" => Ok(LogFormat::Pretty),
      "compact" => Ok(LogFormat::Compact),
      "json" => Ok(LogFormat::Json),
      other => Err(format!("Unknown log format: {}", other)),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoggingConfig {
  /// `EnvFilter` directive, e.g. `info` or `health_report_lib=debug`
  pub filter: String,
  pub format: LogFormat,
}

impl Default for LoggingConfig {
  fn default() -> Self {
    Self {
      filter: "info".into(),
      format: LogFormat::default(),
    }
  }
}

impl LoggingConfig {
  /// Filter from `HEALTH_REPORT_LOG`, then `RUST_LOG`, then `info`.
  /// Unknown formats fall back to pretty.
  pub fn from_env() -> Self {
    let filter = env::var(LOG_FILTER_VAR)
      .or_else(|_| env::var("RUST_LOG"))
      .ok()
      .filter(|f| !f.trim().is_empty())
      .unwrap_or_else(|| "info".into());

    let format = env::var(LOG_FORMAT_VAR)
      .ok()
      .and_then(|f| f.parse().ok())
      .unwrap_or_default();

    Self { filter, format }
  }

  /// Install the global subscriber. Fails if one is already set.
  pub fn init(&self) -> Result<(), tracing_subscriber::util::TryInitError> {
    let env_filter = EnvFilter::try_new(&self.filter).unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(env_filter);

    match self.format {
      LogFormat::Json => {
        let layer = fmt::layer().with_target(true).with_writer(io::stderr).json();
        registry.with(layer).try_init()?;
      }
      LogFormat::Pretty => {
        let layer = fmt::layer().with_target(true).with_writer(io::stderr).pretty();
        registry.with(layer).try_init()?;
      }
      LogFormat::Compact => {
        let layer = fmt::layer()
          .compact()
          .with_target(false)
          .with_writer(io::stderr);
        registry.with(layer).try_init()?;
      }
    }

    debug!(filter = %self.filter, format = ?self.format, "logging initialised");
    Ok(())
  }
}
