use chrono::{Local, NaiveDate};
use serde::Serialize;
use std::env;

use crate::lifestyle::{FocusAreaKey, DEFAULT_MAX_FOCUS_AREAS};
use crate::logging::LoggingConfig;

pub const FORMAT_VAR: &str = "HEALTH_REPORT_FORMAT";
pub const MAX_FOCUS_AREAS_VAR: &str = "HEALTH_REPORT_MAX_FOCUS_AREAS";
pub const REFERENCE_DATE_VAR: &str = "HEALTH_REPORT_REFERENCE_DATE";

/// ---------------------------------------------------------------------------
/// Error Handling
/// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
  #[error("Invalid value for {key}: '{value}'")]
  Invalid { key: &'static str, value: String },
}

impl Serialize for ConfigError {
  fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
  where
    S: serde::Serializer,
  {
    serializer.serialize_str(&self.to_string())
  }
}

/// ---------------------------------------------------------------------------
/// Configuration
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
  #[default]
  Text,
  Json,
}

impl std::str::FromStr for OutputFormat {
  type Err = String;
  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim().to_lowercase().as_str() {
      "text" => Ok(OutputFormat::Text),
      "json" => Ok(OutputFormat::Json),
      other => Err(format!("Unknown output format: {}", other)),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportConfig {
  pub format: OutputFormat,
  /// Upper bound for selected focus areas, 1..=8
  pub max_focus_areas: usize,
  /// "Today" for age calculations and undated rows
  pub reference_date: NaiveDate,
  pub logging: LoggingConfig,
}

impl Default for ReportConfig {
  fn default() -> Self {
    Self {
      format: OutputFormat::default(),
      max_focus_areas: DEFAULT_MAX_FOCUS_AREAS,
      reference_date: Local::now().date_naive(),
      logging: LoggingConfig::default(),
    }
  }
}

fn var(key: &str) -> Option<String> {
  env::var(key).ok().map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

impl ReportConfig {
  /// Load from the environment (and `.env` if present). Unset variables
  /// keep their defaults; set but invalid ones are an error.
  pub fn from_env() -> Result<Self, ConfigError> {
    dotenvy::dotenv().ok();

    let defaults = Self::default();

    let format = match var(FORMAT_VAR) {
      Some(v) => v
        .parse::<OutputFormat>()
        .map_err(|_| ConfigError::Invalid { key: FORMAT_VAR, value: v })?,
      None => defaults.format,
    };

    let max_focus_areas = match var(MAX_FOCUS_AREAS_VAR) {
      Some(v) => parse_max_focus_areas(&v).ok_or(ConfigError::Invalid {
        key: MAX_FOCUS_AREAS_VAR,
        value: v,
      })?,
      None => defaults.max_focus_areas,
    };

    let reference_date = match var(REFERENCE_DATE_VAR) {
      Some(v) => NaiveDate::parse_from_str(&v, "%Y-%m-%d").map_err(|_| ConfigError::Invalid {
        key: REFERENCE_DATE_VAR,
        value: v,
      })?,
      None => defaults.reference_date,
    };

    Ok(Self {
      format,
      max_focus_areas,
      reference_date,
      logging: LoggingConfig::from_env(),
    })
  }
}

fn parse_max_focus_areas(value: &str) -> Option<usize> {
  value
    .parse::<usize>()
    .ok()
    .filter(|n| (1..=FocusAreaKey::ALL.len()).contains(n))
}
