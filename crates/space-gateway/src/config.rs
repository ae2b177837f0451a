use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::fs;

use crate::error::GatewayError;

fn default_timeout_secs() -> u64 {
  600
}

/// Connection settings for a Space deployment.
///
/// Stored as JSON, by default at `~/.space/config.json`:
/// ```json
/// {
///   "graphql_url": "https://space.example.com/api/graphql",
///   "ws_url": "wss://space.example.com/api/graphql",
///   "auth_url": "https://space.example.com/api/auth/token",
///   "username": "me@example.com",
///   "password": "...",
///   "org": "acme",
///   "documents_dir": "/home/me/.space/documents"
/// }
/// ```
/// `SPACE_USERNAME`, `SPACE_PASSWORD` and `SPACE_ORG` override the file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpaceConfig {
  pub graphql_url: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub ws_url: Option<String>,
  pub auth_url: String,
  pub username: String,
  pub password: String,
  /// Reverse id of the organization to act in.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub org: Option<String>,
  /// Directory of `*.graphql` operation documents.
  pub documents_dir: PathBuf,
  /// Host collections and assets are scoped to.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub host_id: Option<String>,
  /// Directory of local component descriptions.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub components_dir: Option<PathBuf>,
  #[serde(default = "default_timeout_secs")]
  pub timeout_secs: u64,
}

impl SpaceConfig {
  /// Default location of the configuration file.
  pub fn default_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".space").join("config.json"))
  }

  /// Load the configuration from `path` and apply environment overrides.
  pub async fn load(path: &Path) -> Result<Self, GatewayError> {
    let content = fs::read_to_string(path).await.map_err(|e| {
      GatewayError::Config(format!("failed to read {}: {}", path.display(), e))
    })?;
    let mut config: SpaceConfig = serde_json::from_str(&content)?;
    config.apply_env(|key| std::env::var(key).ok());
    config.validate()?;
    Ok(config)
  }

  /// Apply overrides from a variable lookup.
  pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(username) = lookup("SPACE_USERNAME") {
      self.username = username;
    }
    if let Some(password) = lookup("SPACE_PASSWORD") {
      self.password = password;
    }
    if let Some(org) = lookup("SPACE_ORG") {
      self.org = Some(org);
    }
  }

  pub fn validate(&self) -> Result<(), GatewayError> {
    for (field, value) in [
      ("graphql_url", &self.graphql_url),
      ("auth_url", &self.auth_url),
    ] {
      url::Url::parse(value)
        .map_err(|e| GatewayError::Config(format!("{} is not a valid url: {}", field, e)))?;
    }
    if let Some(ws_url) = &self.ws_url {
      url::Url::parse(ws_url)
        .map_err(|e| GatewayError::Config(format!("ws_url is not a valid url: {}", e)))?;
    }
    Ok(())
  }

  pub fn timeout(&self) -> Duration {
    Duration::from_secs(self.timeout_secs)
  }
}
