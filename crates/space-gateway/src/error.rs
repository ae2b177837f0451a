use thiserror::Error;

/// Errors raised by a gateway. Callers propagate these unmodified.
#[derive(Debug, Error)]
pub enum GatewayError {
  /// HTTP request failed.
  #[error("http error: {0}")]
  Http(#[from] reqwest::Error),

  /// The server answered with a non-success status.
  #[error("unexpected status {status}: {body}")]
  Status { status: u16, body: String },

  /// The server answered with GraphQL errors.
  #[error("remote error in {operation}: {}", messages.join("; "))]
  GraphQl {
    operation: String,
    messages: Vec<String>,
  },

  /// No document is registered for the operation.
  #[error("unknown operation: {0}")]
  UnknownOperation(String),

  /// WebSocket transport failed.
  #[error("websocket error: {0}")]
  WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

  /// The subscription protocol was violated by the server.
  #[error("subscription protocol error: {0}")]
  Protocol(String),

  /// Token acquisition failed.
  #[error("authentication failed: {0}")]
  Auth(String),

  /// The configuration is missing or invalid.
  #[error("invalid configuration: {0}")]
  Config(String),

  /// IO error when reading documents or configuration.
  #[error("io error: {0}")]
  Io(#[from] std::io::Error),

  /// Response or configuration JSON could not be decoded.
  #[error("invalid json: {0}")]
  Json(#[from] serde_json::Error),
}
