use async_trait::async_trait;
use space_schema::ComponentDescription;

use crate::error::ProviderError;

/// Source of locally authored component descriptions.
#[async_trait]
pub trait ComponentProvider: Send + Sync {
  /// Get the description registered under `reverse_id`, if any.
  async fn get_by_reverse_id(
    &self,
    reverse_id: &str,
  ) -> Result<Option<ComponentDescription>, ProviderError>;

  /// List every description this provider knows about.
  async fn list(&self) -> Result<Vec<ComponentDescription>, ProviderError>;
}
