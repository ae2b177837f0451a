use std::path::{Path, PathBuf};

use async_trait::async_trait;
use space_schema::ComponentDescription;
use tokio::fs;
use tracing::debug;

use crate::error::ProviderError;
use crate::provider::ComponentProvider;

/// Filesystem-based component provider.
///
/// Descriptions are JSON files in a single directory:
/// ```text
/// {root}/
/// ├── scraper.json
/// ├── urls.json
/// └── pipeline.json
/// ```
/// A file named after the reverse id is checked first; otherwise every
/// `*.json` file is scanned for a matching `reverse_id`.
pub struct FsComponentProvider {
  root: PathBuf,
}

impl FsComponentProvider {
  pub fn new(root: impl Into<PathBuf>) -> Self {
    Self { root: root.into() }
  }

  pub fn root(&self) -> &Path {
    &self.root
  }

  async fn read_description(path: &Path) -> Result<ComponentDescription, ProviderError> {
    let content = fs::read_to_string(path).await?;
    serde_json::from_str(&content).map_err(|source| ProviderError::Json {
      path: path.to_path_buf(),
      source,
    })
  }

  async fn description_files(&self) -> Result<Vec<PathBuf>, ProviderError> {
    let mut files = Vec::new();
    if !self.root.exists() {
      return Ok(files);
    }

    let mut entries = fs::read_dir(&self.root).await?;
    while let Some(entry) = entries.next_entry().await? {
      let path = entry.path();
      if path.is_file() && path.extension().is_some_and(|ext| ext == "json") {
        files.push(path);
      }
    }
    files.sort();
    Ok(files)
  }
}

#[async_trait]
impl ComponentProvider for FsComponentProvider {
  async fn get_by_reverse_id(
    &self,
    reverse_id: &str,
  ) -> Result<Option<ComponentDescription>, ProviderError> {
    let direct = self.root.join(format!("{}.json", reverse_id));
    if direct.is_file() {
      let description = Self::read_description(&direct).await?;
      if description.reverse_id == reverse_id {
        debug!(reverse_id, path = %direct.display(), "found local description");
        return Ok(Some(description));
      }
    }

    for path in self.description_files().await? {
      if path == direct {
        continue;
      }
      let description = Self::read_description(&path).await?;
      if description.reverse_id == reverse_id {
        debug!(reverse_id, path = %path.display(), "found local description");
        return Ok(Some(description));
      }
    }

    Ok(None)
  }

  async fn list(&self) -> Result<Vec<ComponentDescription>, ProviderError> {
    let mut descriptions = Vec::new();
    for path in self.description_files().await? {
      descriptions.push(Self::read_description(&path).await?);
    }
    Ok(descriptions)
  }
}
