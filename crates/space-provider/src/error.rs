use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while reading local descriptions or collections.
#[derive(Debug, Error)]
pub enum ProviderError {
  #[error("io error: {0}")]
  Io(#[from] std::io::Error),

  #[error("invalid description {path}: {source}")]
  Json {
    path: PathBuf,
    #[source]
    source: serde_json::Error,
  },

  #[error("invalid collection file {path}: {source}")]
  Csv {
    path: PathBuf,
    #[source]
    source: csv::Error,
  },
}
