pub mod evaluate;
pub mod ranges;
pub mod trends;

use serde::Serialize;

use crate::config::{ConfigError, OutputFormat};
use crate::ingest::IngestionError;

/// ---------------------------------------------------------------------------
/// Error Handling
/// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum CommandError {
  #[error(transparent)]
  Ingestion(#[from] IngestionError),

  #[error(transparent)]
  Config(#[from] ConfigError),

  #[error("Failed to serialize output: {0}")]
  Output(#[from] serde_json::Error),

  #[error("{0}")]
  InvalidArgument(String),
}

impl Serialize for CommandError {
  fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
  where
    S: serde::Serializer,
  {
    serializer.serialize_str(&self.to_string())
  }
}

/// Render `value` as pretty JSON or through the text renderer
pub fn render<T, F>(format: OutputFormat, value: &T, text: F) -> Result<String, CommandError>
where
  T: Serialize + ?Sized,
  F: FnOnce(&T) -> String,
{
  match format {
    OutputFormat::Json => Ok(serde_json::to_string_pretty(value)?),
    OutputFormat::Text => Ok(text(value)),
  }
}
