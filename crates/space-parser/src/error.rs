use thiserror::Error;

/// Errors that can occur while decoding a response.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
  /// An entity is present but lacks its primary identifier.
  #[error("malformed response: {entity} is missing {field}")]
  MalformedResponse { entity: String, field: String },
}

impl ParseError {
  pub fn missing(entity: &str, field: &str) -> Self {
    ParseError::MalformedResponse {
      entity: entity.to_string(),
      field: field.to_string(),
    }
  }
}
