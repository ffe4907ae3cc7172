pub mod commands;
pub mod config;
pub mod evaluation;
pub mod ingest;
pub mod lifestyle;
pub mod logging;
pub mod models;
pub mod norms;
pub mod reference;
pub mod report;
pub mod trends;

#[cfg(test)]
mod test_utils;

pub use commands::CommandError;
pub use config::{ConfigError, OutputFormat, ReportConfig};
pub use evaluation::{evaluate_all, evaluate_health_data};
pub use ingest::{load_file, parse_json, IngestionError};
pub use models::{EvaluatedRecord, Gender, HealthRecord, RiskLevel};
pub use report::HealthReport;
