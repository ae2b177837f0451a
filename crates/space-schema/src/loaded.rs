use serde::{Deserialize, Serialize};

use crate::app::{OpArg, OpType};
use crate::component::ComponentType;

/// A version as it exists remotely.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LoadedVersion {
  pub uid: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub readable_name: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub updates_markdown: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub status: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub commit_digest: Option<String>,
}

/// A branch as it exists remotely.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LoadedBranch {
  pub uid: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub name: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub status: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub active_version: Option<LoadedVersion>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadedSchema {
  pub uid: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub core_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadedOpRequirement {
  pub uid: String,
  pub key: String,
  #[serde(rename = "type")]
  pub dep_type: String,
}

/// An op attached to an app version.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadedOp {
  pub uid: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub core_id: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub name: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub doc: Option<String>,
  /// `None` when the remote reports a type this SDK does not know.
  #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
  pub op_type: Option<OpType>,
  #[serde(default)]
  pub args: Vec<OpArg>,
  #[serde(default)]
  pub input_schema: Vec<LoadedSchema>,
  #[serde(default)]
  pub output_schema: Vec<LoadedSchema>,
  #[serde(default)]
  pub requires: Vec<LoadedOpRequirement>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadedCfg {
  pub uid: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub readable_name: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub core_name: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub core_id: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub cfg_json: Option<serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadedApp {
  pub uid: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub container_ref: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub container_user: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub container_token: Option<String>,
  #[serde(default)]
  pub ops: Vec<LoadedOp>,
  #[serde(default)]
  pub cfg: Vec<LoadedCfg>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadedInFlowApp {
  pub app_id: String,
  #[serde(default)]
  pub active_op: Vec<LoadedOp>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadedInFlowFlow {
  pub flow_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadedInFlowCollection {
  pub collection_id: String,
}

/// A member of a loaded flow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadedInFlowComponent {
  pub uid: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub alias: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub comp_id: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub reverse_id: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub app: Option<LoadedInFlowApp>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub flow: Option<LoadedInFlowFlow>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub collection: Option<LoadedInFlowCollection>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub active_cfg: Option<LoadedCfg>,
  /// Upstream members, as deep as the response nests them.
  #[serde(default)]
  pub prev: Vec<LoadedInFlowComponent>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadedFlow {
  pub uid: String,
  #[serde(default)]
  pub components: Vec<LoadedInFlowComponent>,
}

impl LoadedFlow {
  /// Find a member by alias.
  pub fn member(&self, alias: &str) -> Option<&LoadedInFlowComponent> {
    self
      .components
      .iter()
      .find(|c| c.alias.as_deref() == Some(alias))
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadedCollectionAlias {
  pub uid: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub core_alias: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub core_id: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub schema_core_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadedAsset {
  pub uid: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub core_path: Option<String>,
  #[serde(default)]
  pub is_composite: bool,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub download_url: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub upload_url: Option<String>,
}

/// Content realized under the active version.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadedContent {
  App(LoadedApp),
  Flow(LoadedFlow),
  Collection(LoadedCollectionAlias),
  Asset(LoadedAsset),
}

/// A component as it exists remotely.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadedComponent {
  pub uid: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub reverse_id: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub name: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub description: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub branch: Option<LoadedBranch>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub version: Option<LoadedVersion>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub content: Option<LoadedContent>,
}

impl LoadedComponent {
  /// Type derived from the realized content.
  pub fn kind(&self) -> Option<ComponentType> {
    self.content.as_ref().map(|c| match c {
      LoadedContent::App(_) => ComponentType::App,
      LoadedContent::Flow(_) => ComponentType::Flow,
      LoadedContent::Collection(_) => ComponentType::Collection,
      LoadedContent::Asset(_) => ComponentType::Asset,
    })
  }

  pub fn app(&self) -> Option<&LoadedApp> {
    match &self.content {
      Some(LoadedContent::App(app)) => Some(app),
      _ => None,
    }
  }

  pub fn flow(&self) -> Option<&LoadedFlow> {
    match &self.content {
      Some(LoadedContent::Flow(flow)) => Some(flow),
      _ => None,
    }
  }

  pub fn collection(&self) -> Option<&LoadedCollectionAlias> {
    match &self.content {
      Some(LoadedContent::Collection(collection)) => Some(collection),
      _ => None,
    }
  }

  pub fn asset(&self) -> Option<&LoadedAsset> {
    match &self.content {
      Some(LoadedContent::Asset(asset)) => Some(asset),
      _ => None,
    }
  }

  /// Name of the active version, if the component has one.
  pub fn version_name(&self) -> Option<&str> {
    self.version.as_ref().and_then(|v| v.readable_name.as_deref())
  }
}
