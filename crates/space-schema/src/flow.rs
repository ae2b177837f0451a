use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::app::Cfg;

/// Remap of one schema name onto another along a dependency edge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaAlias {
  pub src: String,
  pub target: String,
}

/// A pair of ports narrowing a dependency to a specific output and input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Terminal {
  pub src: String,
  pub target: String,
  /// Overrides the dependency-level order for this link.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub order: Option<i64>,
}

/// An edge from another member (by alias) into the declaring member.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InFlowDependency {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub alias: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub reverse_id: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub as_collection: Option<String>,
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub terminals: Vec<Terminal>,
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub schema_aliases: Vec<SchemaAlias>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub order: Option<i64>,
}

/// Resource requests and limits of a member.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Limits {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub memory_request: Option<u64>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub memory_limit: Option<u64>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub cpu_request: Option<u64>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub cpu_limit: Option<u64>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub storage_request: Option<u64>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub storage_limit: Option<u64>,
}

/// Selects an op of an app member by its core id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpSelector {
  pub core_id: String,
}

/// App-specific settings of a member.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InFlowApp {
  #[serde(default)]
  pub active_op: Vec<OpSelector>,
}

/// Active configuration of a member: a reference by core name, or an inline
/// config that is created before being activated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ActiveCfg {
  Named(String),
  Inline(Cfg),
}

/// Placement of an existing component inside a flow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InFlowComponent {
  pub reverse_id: String,
  /// Unique within the flow. Dependencies refer to members by alias.
  pub alias: String,
  #[serde(rename = "offsetX", alias = "offset_x", default)]
  pub offset_x: f64,
  #[serde(rename = "offsetY", alias = "offset_y", default)]
  pub offset_y: f64,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub limits: Option<Limits>,
  /// Keyed by an arbitrary dependency name; declaration order is preserved.
  #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
  pub depends: IndexMap<String, InFlowDependency>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub app: Option<InFlowApp>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub active_cfg: Option<ActiveCfg>,
}

impl InFlowComponent {
  pub fn new(reverse_id: impl Into<String>, alias: impl Into<String>) -> Self {
    Self {
      reverse_id: reverse_id.into(),
      alias: alias.into(),
      offset_x: 0.0,
      offset_y: 0.0,
      limits: None,
      depends: IndexMap::new(),
      app: None,
      active_cfg: None,
    }
  }

  /// Declare a plain member-level dependency on `alias`.
  pub fn depends_on(mut self, alias: impl Into<String>) -> Self {
    let alias = alias.into();
    self.depends.insert(
      alias.clone(),
      InFlowDependency {
        alias: Some(alias),
        ..Default::default()
      },
    );
    self
  }
}

/// A flow payload: the members of the graph, edges declared on each member.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Flow {
  #[serde(default)]
  pub is_demo: bool,
  #[serde(default)]
  pub components: Vec<InFlowComponent>,
}
