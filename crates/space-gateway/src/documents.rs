use std::collections::HashMap;
use std::path::Path;

use tokio::fs;

use crate::error::GatewayError;

/// GraphQL documents keyed by operation name.
///
/// On disk a document set is a directory of `*.graphql` files; the file stem
/// is the operation name:
/// ```text
/// {dir}/
/// ├── create_component.graphql
/// ├── get_comp_with_reverse_id.graphql
/// └── subscribe_to_status.graphql
/// ```
#[derive(Debug, Clone, Default)]
pub struct DocumentSet {
  documents: HashMap<String, String>,
}

impl DocumentSet {
  pub fn new() -> Self {
    Self::default()
  }

  /// Register a document under an operation name.
  pub fn insert(&mut self, operation: impl Into<String>, document: impl Into<String>) {
    self.documents.insert(operation.into(), document.into());
  }

  pub fn get(&self, operation: &str) -> Option<&str> {
    self.documents.get(operation).map(String::as_str)
  }

  pub fn len(&self) -> usize {
    self.documents.len()
  }

  pub fn is_empty(&self) -> bool {
    self.documents.is_empty()
  }

  /// Load every `*.graphql` file in `dir`.
  pub async fn load_dir(dir: &Path) -> Result<Self, GatewayError> {
    let mut set = Self::new();
    let mut entries = fs::read_dir(dir).await?;

    while let Some(entry) = entries.next_entry().await? {
      let path = entry.path();
      if path.extension().and_then(|e| e.to_str()) != Some("graphql") {
        continue;
      }
      let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
        continue;
      };
      let document = fs::read_to_string(&path).await?;
      set.insert(stem, document);
    }

    Ok(set)
  }
}
