use space_ops::OpsError;
use space_provider::ProviderError;
use thiserror::Error;

/// Errors that can occur during reconciliation.
#[derive(Debug, Error)]
pub enum ManagerError {
  #[error("component not found: {reverse_id}")]
  NotFound { reverse_id: String },

  #[error("member '{member}' depends on undeclared alias '{alias}'")]
  MissingAlias { alias: String, member: String },

  #[error("alias '{alias}' is declared by more than one member")]
  DuplicateAlias { alias: String },

  #[error("component {reverse_id} has no active version")]
  MissingVersion { reverse_id: String },

  #[error("component {reverse_id} has no active branch")]
  MissingBranch { reverse_id: String },

  #[error(transparent)]
  Ops(#[from] OpsError),

  #[error(transparent)]
  Provider(#[from] ProviderError),
}
