use serde::{Deserialize, Serialize};

use crate::loaded::LoadedCollectionAlias;

/// Status of one flow member within a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunCompStatus {
  pub in_flow_comp_id: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub in_flow_app_id: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub in_flow_comp_alias: Option<String>,
  pub status: String,
}

/// One event of the status subscription feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatusEvent {
  /// Overall task status change.
  Task(String),
  /// Status change of a single member.
  Component(RunCompStatus),
}

/// Snapshot of a run: overall state plus per-member statuses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunStatus {
  pub state: String,
  pub components: Vec<RunCompStatus>,
}

/// Documents produced by one member during a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultSchema {
  pub ca: LoadedCollectionAlias,
  pub raw_json: Vec<serde_json::Value>,
}

/// A deployment (task) of a flow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadedTask {
  pub uid: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub state: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub core_id: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub last_runned_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadedOrg {
  pub uid: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadedServiceAccount {
  pub uid: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub alias: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub core_username: Option<String>,
}

/// An execution host the caller has access to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadedHost {
  pub uid: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub alias: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub conn_url: Option<String>,
  #[serde(default)]
  pub sa: Vec<LoadedServiceAccount>,
}

/// Input of an invocation.
///
/// Each payload entry is sent as is; its shape depends on the start members
/// of the invoked flow (see [`TaskStartSchema`]).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InvokePayload {
  #[serde(default)]
  pub payload: Vec<serde_json::Value>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub webhook: Option<String>,
}

/// The task and run started by an invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invocation {
  pub task_id: String,
  pub run_id: String,
}

/// A public endpoint bound to a task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadedEndpoint {
  pub uid: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub invocation_url: Option<String>,
}

/// A member of a deployed flow that accepts input when the task starts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskStartSchema {
  pub in_flow_id: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub ca_alias: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub injected_alias: Option<String>,
}

/// Core id of a task together with the reverse id of its component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskIdentity {
  pub core_id: String,
  pub reverse_id: String,
}
