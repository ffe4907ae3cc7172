use std::path::Path;
use tracing::info;

use crate::commands::{render, CommandError};
use crate::config::ReportConfig;
use crate::evaluation::evaluate_all;
use crate::ingest::load_file;
use crate::lifestyle::{FocusAreaKey, FocusSelection};
use crate::models::{EvaluatedRecord, HealthRecord};
use crate::report::HealthReport;
use crate::trends::is_chronological;

const REPORT_SEPARATOR: &str = "\n----------------------------------------\n\n";

/// ---------------------------------------------------------------------------
/// Focus Areas
/// ---------------------------------------------------------------------------

/// Parse user-supplied focus keys (English keys or Swedish labels)
pub fn parse_focus(keys: &[String], max: usize) -> Result<FocusSelection, CommandError> {
  let keys = keys
    .iter()
    .flat_map(|k| k.split(','))
    .filter(|k| !k.trim().is_empty())
    .map(|k| k.parse::<FocusAreaKey>().map_err(CommandError::InvalidArgument))
    .collect::<Result<Vec<_>, _>>()?;

  if keys.len() > max {
    tracing::warn!(requested = keys.len(), max, "too many focus areas, keeping the first");
  }
  Ok(FocusSelection::from_keys(keys, max))
}

/// ---------------------------------------------------------------------------
/// Reports
/// ---------------------------------------------------------------------------

/// Reports for an oldest-first history: only the latest visit, or every
/// visit when `all` is set, each compared with the visit before it
pub fn build_reports(history: &[EvaluatedRecord], all: bool, focus: &FocusSelection) -> Vec<HealthReport> {
  is_chronological(history);

  let start = if all { 0 } else { history.len().saturating_sub(1) };
  (start..history.len())
    .map(|i| {
      let previous = i.checked_sub(1).map(|p| &history[p]);
      HealthReport::build(&history[i], previous, focus)
    })
    .collect()
}

pub fn evaluate_records(
  records: &[HealthRecord],
  all: bool,
  focus: &FocusSelection,
) -> Vec<HealthReport> {
  let history = evaluate_all(records);
  build_reports(&history, all, focus)
}

/// Load a row export and build its reports
pub fn evaluate_file(
  config: &ReportConfig,
  path: &Path,
  all: bool,
  focus: &[String],
) -> Result<Vec<HealthReport>, CommandError> {
  let focus = parse_focus(focus, config.max_focus_areas)?;
  let records = load_file(path, config.reference_date)?;
  let reports = evaluate_records(&records, all, &focus);

  info!(
    records = records.len(),
    reports = reports.len(),
    "evaluated health records"
  );
  Ok(reports)
}

pub fn run(config: &ReportConfig, path: &Path, all: bool, focus: &[String]) -> Result<String, CommandError> {
  let reports = evaluate_file(config, path, all, focus)?;
  render(config.format, &reports, |reports| {
    reports
      .iter()
      .map(HealthReport::render_text)
      .collect::<Vec<_>>()
      .join(REPORT_SEPARATOR)
  })
}
