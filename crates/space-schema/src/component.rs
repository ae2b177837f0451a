use serde::{Deserialize, Serialize};

use crate::app::App;
use crate::flow::Flow;

/// How reconciliation treats an existing component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VersionMode {
  /// Return the existing component untouched.
  #[default]
  Default,
  Major,
  Minor,
  Patch,
  /// Replace the content of the active version in place.
  Override,
}

impl VersionMode {
  pub fn as_str(&self) -> &'static str {
    match self {
      VersionMode::Default => "default",
      VersionMode::Major => "major",
      VersionMode::Minor => "minor",
      VersionMode::Patch => "patch",
      VersionMode::Override => "override",
    }
  }
}

impl std::str::FromStr for VersionMode {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.to_ascii_lowercase().as_str() {
      "default" => Ok(VersionMode::Default),
      "major" => Ok(VersionMode::Major),
      "minor" => Ok(VersionMode::Minor),
      "patch" => Ok(VersionMode::Patch),
      "override" => Ok(VersionMode::Override),
      other => Err(format!("unknown version mode: {}", other)),
    }
  }
}

/// Type tag stored alongside a component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComponentType {
  App,
  Flow,
  Collection,
  Asset,
}

impl ComponentType {
  pub fn as_str(&self) -> &'static str {
    match self {
      ComponentType::App => "app",
      ComponentType::Flow => "flow",
      ComponentType::Collection => "collection",
      ComponentType::Asset => "asset",
    }
  }
}

/// Requested version metadata.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VersionDescription {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub readable_name: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub updates_markdown: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub status: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub commit_digest: Option<String>,
}

/// Requested branch. An absent name means "the active branch".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BranchDescription {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub name: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub status: Option<String>,
}

/// A use case a component is (or is not) designed for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UseCase {
  pub title: String,
  pub body: String,
  #[serde(default)]
  pub is_public_example: bool,
}

/// A data schema the component depends on, registered before the component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaMetadata {
  pub core_id: String,
  /// Raw JSON text of the schema.
  pub schema_data: String,
}

/// A collection alias payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CollectionAlias {
  pub core_alias: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub schema_core_id: Option<String>,
  /// Inline JSON documents. When empty, `path` is loaded instead.
  #[serde(default)]
  pub docs: Vec<String>,
  /// Tabular file relative to the manager's base directory.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub path: Option<String>,
}

/// An asset payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Asset {
  pub core_path: String,
  #[serde(default)]
  pub is_composite: bool,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub checksum: Option<String>,
}

/// The content of one version. Exactly one variant is active.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComponentContent {
  App(App),
  Flow(Flow),
  Collection(CollectionAlias),
  Asset(Asset),
}

impl ComponentContent {
  pub fn kind(&self) -> ComponentType {
    match self {
      ComponentContent::App(_) => ComponentType::App,
      ComponentContent::Flow(_) => ComponentType::Flow,
      ComponentContent::Collection(_) => ComponentType::Collection,
      ComponentContent::Asset(_) => ComponentType::Asset,
    }
  }
}

/// Caller-authored description of the desired state of a component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentDescription {
  pub name: String,
  /// Stable identifier, unique across the platform and across versions.
  pub reverse_id: String,
  #[serde(default)]
  pub description: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub version: Option<VersionDescription>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub branch: Option<BranchDescription>,
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub tags: Vec<String>,
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub designed_for_use_case: Vec<UseCase>,
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub not_designed_for_use_case: Vec<UseCase>,
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub required_schema: Vec<SchemaMetadata>,
  /// Serialized as a sibling key: `"app"`, `"flow"`, `"collection"` or `"asset"`.
  #[serde(flatten)]
  pub content: Option<ComponentContent>,
}

impl ComponentDescription {
  /// Create a description with no version, branch or content.
  pub fn new(name: impl Into<String>, reverse_id: impl Into<String>) -> Self {
    Self {
      name: name.into(),
      reverse_id: reverse_id.into(),
      description: String::new(),
      version: None,
      branch: None,
      tags: Vec::new(),
      designed_for_use_case: Vec::new(),
      not_designed_for_use_case: Vec::new(),
      required_schema: Vec::new(),
      content: None,
    }
  }

  pub fn with_content(mut self, content: ComponentContent) -> Self {
    self.content = Some(content);
    self
  }

  /// Type tag derived from the payload. Content-less components are apps.
  pub fn kind(&self) -> ComponentType {
    self
      .content
      .as_ref()
      .map(ComponentContent::kind)
      .unwrap_or(ComponentType::App)
  }

  /// Requested branch name, if any.
  pub fn branch_name(&self) -> Option<&str> {
    self.branch.as_ref().and_then(|b| b.name.as_deref())
  }

  /// Requested version name, if any.
  pub fn version_name(&self) -> Option<&str> {
    self.version.as_ref().and_then(|v| v.readable_name.as_deref())
  }
}
