use std::collections::HashMap;

use serde_json::{Value, json};
use space_parser::{
  parse_endpoint, parse_host, parse_invocation, parse_results, parse_run_status, parse_snapshot,
  parse_task_identity, parse_task_start_schema, parse_tasks,
};
use space_schema::{
  Invocation, InvokePayload, LoadedEndpoint, LoadedHost, LoadedTask, ResultSchema, RunStatus,
  TaskIdentity, TaskStartSchema,
};
use tracing::{debug, info};

use crate::error::OpsError;
use crate::ops::{SpaceOps, args, str_at, value_at};

const RUN_SNAPSHOT: &[&str] = &["run", "task", "snapshot"];
const TASK_SNAPSHOT: &[&str] = &["task", "snapshot"];

/// Where to read a deployment snapshot from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotSource<'a> {
  Run(&'a str),
  Task(&'a str),
}

/// Deployments, runs, hosts and secrets.
impl SpaceOps {
  /// Build deployable tasks for a flow on a host.
  pub async fn build_task(&self, flow_id: &str, host_id: Option<&str>) -> Result<Vec<String>, OpsError> {
    let data = self
      .org_request(
        "build_task",
        args(json!({ "flow_id": flow_id, "host_id": host_id })),
      )
      .await?;

    let tasks = value_at(&data, &["flow", "buildCoreTask"])
      .and_then(Value::as_array)
      .map(|created| {
        created
          .iter()
          .filter_map(|t| t.get("uid").and_then(Value::as_str))
          .map(str::to_string)
          .collect::<Vec<_>>()
      })
      .unwrap_or_default();
    info!(flow_id, tasks = tasks.len(), "built tasks");
    Ok(tasks)
  }

  pub async fn boot_task(&self, task_id: &str, exist_deployment: bool) -> Result<String, OpsError> {
    let data = self
      .request(
        "boot_task",
        args(json!({ "task_id": task_id, "exist_deployment": exist_deployment })),
      )
      .await?;
    str_at("boot_task", &data, &["task", "boot", "details", "uid"])
  }

  /// Start a run of a booted task. Returns the run id.
  pub async fn run_task(&self, task_id: &str, webhook: Option<&str>) -> Result<String, OpsError> {
    let data = self
      .org_request(
        "run_task",
        args(json!({ "task_id": task_id, "webhook": webhook })),
      )
      .await?;
    str_at("run_task", &data, &["runWithStatus", "details", "uid"])
  }

  pub async fn change_task_state(&self, task_id: &str, target_state: &str) -> Result<String, OpsError> {
    let data = self
      .request(
        "change_task_state",
        args(json!({ "task_id": task_id, "target_state": target_state })),
      )
      .await?;
    str_at("change_task_state", &data, &["task", "changeState", "details", "uid"])
  }

  /// Deployments of a component, optionally filtered by state.
  pub async fn get_deployments_by_reverse_id(
    &self,
    reverse_id: &str,
    status: &[String],
  ) -> Result<Vec<LoadedTask>, OpsError> {
    let status = if status.is_empty() { Value::Null } else { json!(status) };
    let data = self
      .org_request(
        "get_deployments_by_reverse_id",
        args(json!({ "reverse_id": reverse_id, "status": status })),
      )
      .await?;

    match value_at(&data, &["tasks", "component"]) {
      Some(raw) => Ok(parse_tasks(raw)?),
      None => Ok(Vec::new()),
    }
  }

  /// Deployments of a flow, optionally filtered by state.
  pub async fn get_deployments_by_flow(
    &self,
    flow_id: &str,
    status: &[String],
  ) -> Result<Vec<LoadedTask>, OpsError> {
    let status = if status.is_empty() { Value::Null } else { json!(status) };
    let data = self
      .request(
        "get_deployments_by_flow",
        args(json!({ "uid": flow_id, "status": status })),
      )
      .await?;

    match value_at(&data, &["tasks", "flow"]) {
      Some(raw) => Ok(parse_tasks(raw)?),
      None => Ok(Vec::new()),
    }
  }

  pub async fn get_task_core_id(&self, task_id: &str) -> Result<TaskIdentity, OpsError> {
    let data = self
      .org_request("get_task_core_id", args(json!({ "task_id": task_id })))
      .await?;
    let raw = value_at(&data, &["task"]).unwrap_or(&Value::Null);
    Ok(parse_task_identity(raw)?)
  }

  /// Members of a deployed flow that take input when the task starts.
  pub async fn get_task_start_schema(&self, task_id: &str) -> Result<Vec<TaskStartSchema>, OpsError> {
    let data = self
      .request("get_task_start_schema", args(json!({ "task_id": task_id })))
      .await?;
    match value_at(&data, &["task"]) {
      Some(raw) => Ok(parse_task_start_schema(raw)?),
      None => Ok(Vec::new()),
    }
  }

  /// Start a run of the active deployment of a component. `None` when the
  /// platform has nothing to invoke.
  pub async fn invoke(
    &self,
    component: &str,
    payload: &InvokePayload,
    branch: Option<&str>,
  ) -> Result<Option<Invocation>, OpsError> {
    let data = self
      .org_request(
        "invoke_component",
        args(json!({
          "component": component,
          "branch": branch,
          "payload": payload.payload,
          "webhook": payload.webhook,
        })),
      )
      .await?;

    let Some(raw) = value_at(&data, &["invoke"]) else {
      return Ok(None);
    };
    let invocation = parse_invocation(raw)?;
    info!(component, task_id = %invocation.task_id, run_id = %invocation.run_id, "invoked");
    Ok(Some(invocation))
  }

  /// Id of the caller's api key called `name`.
  pub async fn get_api_token_by_name(&self, name: &str) -> Result<Option<String>, OpsError> {
    let data = self
      .request("get_api_token_by_name", args(json!({ "name": name })))
      .await?;
    let details = value_at(&data, &["apiKey", "byName", "details"]);
    Ok(
      details
        .and_then(|d| d.as_str().or_else(|| d.get("uid").and_then(Value::as_str)))
        .map(str::to_string),
    )
  }

  /// Expose a task through a public endpoint, optionally guarded by the api
  /// key called `token`.
  pub async fn create_endpoint(
    &self,
    task_id: &str,
    alias: Option<&str>,
    token: Option<&str>,
  ) -> Result<LoadedEndpoint, OpsError> {
    let api_key = match token {
      Some(name) => vec![
        self
          .get_api_token_by_name(name)
          .await?
          .ok_or_else(|| OpsError::UnknownApiKey(name.to_string()))?,
      ],
      None => Vec::new(),
    };

    let data = self
      .request(
        "create_endpoint",
        args(json!({ "task_id": task_id, "alias": alias, "api_key": api_key })),
      )
      .await?;
    let raw = value_at(&data, &["task", "createEndpoint"]).unwrap_or(&Value::Null);
    let endpoint = parse_endpoint(raw)?;
    info!(task_id, endpoint_id = %endpoint.uid, "endpoint created");
    Ok(endpoint)
  }

  /// Point an existing endpoint at another task.
  pub async fn update_endpoint(&self, endpoint_id: &str, task_id: &str) -> Result<(), OpsError> {
    self
      .request(
        "update_endpoint",
        args(json!({ "endpoint_id": endpoint_id, "task_id": task_id })),
      )
      .await?;
    debug!(endpoint_id, task_id, "endpoint updated");
    Ok(())
  }

  /// Current state of a run and of each of its members.
  pub async fn get_run_status(&self, run_id: &str) -> Result<RunStatus, OpsError> {
    let data = self
      .request("get_run_status", args(json!({ "run_id": run_id })))
      .await?;
    let raw = value_at(&data, &["run"]).unwrap_or(&Value::Null);
    Ok(parse_run_status(raw)?)
  }

  /// Collections produced by one member in a run.
  pub async fn get_results(&self, run_id: &str, in_flow_id: &str) -> Result<Vec<ResultSchema>, OpsError> {
    let data = self
      .request(
        "get_results",
        args(json!({ "run_id": run_id, "in_flow_id": in_flow_id })),
      )
      .await?;
    match value_at(&data, &["run"]) {
      Some(raw) => Ok(parse_results(raw)?),
      None => Ok(Vec::new()),
    }
  }

  /// Members of the flow snapshot a task or run was deployed from, as
  /// `alias -> in-flow id`.
  pub async fn get_snapshot_components(
    &self,
    source: SnapshotSource<'_>,
  ) -> Result<HashMap<String, String>, OpsError> {
    let (operation, request, path): (&str, Value, &[&str]) = match source {
      SnapshotSource::Run(run_id) => (
        "get_run_snapshot_components",
        json!({ "run_id": run_id }),
        RUN_SNAPSHOT,
      ),
      SnapshotSource::Task(task_id) => (
        "get_task_snapshot_components",
        json!({ "task_id": task_id }),
        TASK_SNAPSHOT,
      ),
    };

    let data = self.request(operation, args(request)).await?;
    match value_at(&data, path) {
      Some(raw) => Ok(parse_snapshot(raw)?),
      None => Ok(HashMap::new()),
    }
  }

  /// Hosts the caller can deploy to.
  pub async fn get_my_hosts(&self) -> Result<Vec<LoadedHost>, OpsError> {
    let data = self.request("get_my_hosts", args(json!({}))).await?;
    value_at(&data, &["user", "me", "hosts", "edges"])
      .and_then(Value::as_array)
      .map(|edges| edges.iter().filter_map(|e| value_at(e, &["node"])).collect::<Vec<_>>())
      .unwrap_or_default()
      .into_iter()
      .map(|node| parse_host(node).map_err(OpsError::from))
      .collect()
  }

  /// Register an execution host.
  pub async fn create_host(&self, alias: &str, conn_url: &str) -> Result<LoadedHost, OpsError> {
    let data = self
      .request(
        "create_host",
        args(json!({ "alias": alias, "conn_url": conn_url })),
      )
      .await?;
    let raw = value_at(&data, &["hosts", "create"]).unwrap_or(&Value::Null);
    Ok(parse_host(raw)?)
  }

  /// Store a secret in one of the caller's environments.
  pub async fn add_secret(
    &self,
    key: &str,
    value: &str,
    org_id: Option<&str>,
    env_name: &str,
  ) -> Result<String, OpsError> {
    if org_id.is_some() {
      return Err(OpsError::UnsupportedOperation {
        operation: "add_secret".to_string(),
      });
    }
    let data = self
      .request(
        "add_secret",
        args(json!({ "env_name": env_name, "key": key, "value": value })),
      )
      .await?;
    str_at("add_secret", &data, &["user", "me", "env", "addSecret", "details", "uid"])
  }

  pub async fn get_secret(
    &self,
    key: &str,
    org_id: Option<&str>,
    env_name: &str,
  ) -> Result<String, OpsError> {
    if org_id.is_some() {
      return Err(OpsError::UnsupportedOperation {
        operation: "get_secret".to_string(),
      });
    }
    let data = self
      .request("get_secret", args(json!({ "env_name": env_name, "key": key })))
      .await?;
    str_at("get_secret", &data, &["user", "me", "env", "key", "details", "value"])
  }
}
