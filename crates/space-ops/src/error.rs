use std::time::Duration;

use space_gateway::GatewayError;
use space_parser::ParseError;
use thiserror::Error;

/// Errors that can occur while running a remote operation.
#[derive(Debug, Error)]
pub enum OpsError {
  #[error(transparent)]
  Gateway(#[from] GatewayError),

  #[error(transparent)]
  Parse(#[from] ParseError),

  #[error("{operation} is not supported for organizations")]
  UnsupportedOperation { operation: String },

  #[error("api key not found: {0}")]
  UnknownApiKey(String),

  #[error("invalid schema {core_id}: {source}")]
  InvalidSchema {
    core_id: String,
    #[source]
    source: serde_json::Error,
  },

  #[error("no status update within {0:?}")]
  StatusTimeout(Duration),
}
