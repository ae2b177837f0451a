use serde::{Deserialize, Serialize};

/// Role an op plays inside an app.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OpType {
  Input,
  Processor,
  Output,
  Preinit,
}

impl OpType {
  pub fn as_str(&self) -> &'static str {
    match self {
      OpType::Input => "input",
      OpType::Processor => "processor",
      OpType::Output => "output",
      OpType::Preinit => "preinit",
    }
  }

  /// Parse the remote type tag. Unknown tags yield `None`.
  pub fn parse(raw: &str) -> Option<Self> {
    match raw {
      "input" => Some(OpType::Input),
      "processor" => Some(OpType::Processor),
      "output" => Some(OpType::Output),
      "preinit" => Some(OpType::Preinit),
      _ => None,
    }
  }
}

/// External resource an op needs at runtime (secret, env key, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpRequirement {
  pub key: String,
  #[serde(rename = "type")]
  pub dep_type: String,
}

/// Positional argument of an op.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpArg {
  pub arg_name: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub arg_type: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub arg_order: Option<i64>,
}

/// An op declared by an app description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Op {
  pub core_id: String,
  #[serde(rename = "type")]
  pub op_type: OpType,
  /// Core ids of the input schemas.
  #[serde(default)]
  pub input_schema: Vec<String>,
  /// Core ids of the output schemas.
  #[serde(default)]
  pub output_schema: Vec<String>,
  #[serde(default)]
  pub requires: Vec<OpRequirement>,
}

/// A named JSON configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Cfg {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub readable_name: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub core_name: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub cfg_json: Option<serde_json::Value>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub core_id: Option<String>,
}

/// An app payload: a container image plus its configs and ops.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct App {
  pub container_ref: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub container_user: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub container_token: Option<String>,
  #[serde(default)]
  pub preload_ops: bool,
  #[serde(default)]
  pub cfg: Vec<Cfg>,
  #[serde(default)]
  pub ops: Vec<Op>,
}
