use std::collections::HashMap;

use serde_json::Value;
use space_schema::{
  Invocation, LoadedEndpoint, LoadedHost, LoadedOrg, LoadedServiceAccount, LoadedTask,
  ResultSchema, RunCompStatus, RunStatus, RunStatusEvent, TaskIdentity, TaskStartSchema,
};

use crate::component::parse_collection;
use crate::error::ParseError;
use crate::fields::Fields;

/// Decode the `run` object of a status query.
pub fn parse_run_status(raw: &Value) -> Result<RunStatus, ParseError> {
  let fields = Fields::of("run", raw);
  let state = fields
    .obj("details")
    .and_then(|d| d.str("state"))
    .ok_or_else(|| ParseError::missing("run", "details.state"))?;

  let components = fields
    .edges("state")
    .into_iter()
    .filter_map(|edge| {
      let node = edge.obj("node")?.named("run_component");
      Some(node.required_str("uid").map(|uid| RunCompStatus {
        in_flow_comp_id: uid,
        in_flow_app_id: None,
        in_flow_comp_alias: node.str("alias"),
        status: edge.obj("rel").and_then(|r| r.str("status")).unwrap_or_default(),
      }))
    })
    .collect::<Result<Vec<_>, _>>()?;

  Ok(RunStatus { state, components })
}

/// Decode one entry of the `runStatus` subscription payload.
///
/// Returns `None` for entries carrying neither a task nor a member status.
pub fn parse_status_event(raw: &Value) -> Result<Option<RunStatusEvent>, ParseError> {
  let fields = Fields::of("run_status", raw);

  if let Some(status) = fields.obj("task").and_then(|t| t.str("status")) {
    return Ok(Some(RunStatusEvent::Task(status)));
  }

  let Some(app) = fields.obj("app") else {
    return Ok(None);
  };
  let app = app.named("run_status.app");
  Ok(Some(RunStatusEvent::Component(RunCompStatus {
    in_flow_comp_id: app.required_str("inFlowCompUid")?,
    in_flow_app_id: app.str("inFlowAppId"),
    in_flow_comp_alias: app.str("inFlowCompAlias"),
    status: app.str("status").unwrap_or_default(),
  })))
}

/// Decode the collections produced in a run (`run.interCa.edges`).
///
/// Each `rawJson` row is decoded as JSON; rows that are not valid JSON are
/// kept as strings.
pub fn parse_results(raw: &Value) -> Result<Vec<ResultSchema>, ParseError> {
  let fields = Fields::of("run", raw);
  fields
    .nodes("interCa")
    .into_iter()
    .filter_map(|node| node.obj("ca"))
    .map(|ca| {
      let collection = parse_collection(ca.named("collection"))?;
      let raw_json = ca
        .nodes("coreTable")
        .into_iter()
        .filter_map(|row| row.raw("rawJson"))
        .map(|value| match value {
          Value::String(s) => serde_json::from_str(s).unwrap_or_else(|_| value.clone()),
          other => other.clone(),
        })
        .collect();
      Ok(ResultSchema {
        ca: collection,
        raw_json,
      })
    })
    .collect()
}

/// Decode a host node with its service accounts.
pub fn parse_host(raw: &Value) -> Result<LoadedHost, ParseError> {
  let fields = Fields::of("host", raw);
  let uid = fields.details_uid()?;
  let details = fields.obj("details");

  let sa = fields
    .nodes("mySaOnHost")
    .into_iter()
    .map(|node| {
      let node = node.named("service_account");
      let details = node.obj("details");
      Ok(LoadedServiceAccount {
        uid: node.details_uid()?,
        alias: details.and_then(|d| d.str("alias")),
        core_username: details.and_then(|d| d.str("coreUsername")),
      })
    })
    .collect::<Result<Vec<_>, ParseError>>()?;

  Ok(LoadedHost {
    uid,
    alias: details.and_then(|d| d.str("alias")),
    conn_url: details.and_then(|d| d.str("connUrl")),
    sa,
  })
}

/// Decode a task connection (`{edges[{node{details{...}}}]}`).
pub fn parse_tasks(raw: &Value) -> Result<Vec<LoadedTask>, ParseError> {
  let fields = Fields::of("task", raw);
  fields
    .list("edges")
    .into_iter()
    .filter_map(|edge| edge.obj("node"))
    .map(|node| {
      let details = node.obj("details");
      Ok(LoadedTask {
        uid: node.details_uid()?,
        state: details.and_then(|d| d.str("bootState")),
        core_id: details.and_then(|d| d.str("coreId")),
        last_runned_at: details.and_then(|d| d.str("lastRunnedAt")),
      })
    })
    .collect()
}

/// Decode a snapshot's members into `alias -> in-flow uid`.
pub fn parse_snapshot(raw: &Value) -> Result<HashMap<String, String>, ParseError> {
  let fields = Fields::of("snapshot", raw);
  fields
    .nodes("inFlowComponents")
    .into_iter()
    .filter_map(|node| {
      let details = node.obj("details")?;
      let alias = details.str("alias")?;
      Some(node.details_uid().map(|uid| (alias, uid)))
    })
    .collect()
}

/// Decode the `invoke` object: the task and run it started.
pub fn parse_invocation(raw: &Value) -> Result<Invocation, ParseError> {
  let fields = Fields::of("invoke", raw);
  let task_id = fields
    .obj("task")
    .ok_or_else(|| ParseError::missing("invoke", "task"))?
    .named("invoke.task")
    .details_uid()?;
  let run_id = fields
    .obj("run")
    .ok_or_else(|| ParseError::missing("invoke", "run"))?
    .named("invoke.run")
    .details_uid()?;
  Ok(Invocation { task_id, run_id })
}

/// Decode a created endpoint: `{details{uid},invokationUrl}`.
pub fn parse_endpoint(raw: &Value) -> Result<LoadedEndpoint, ParseError> {
  let fields = Fields::of("endpoint", raw);
  Ok(LoadedEndpoint {
    uid: fields.details_uid()?,
    invocation_url: fields.str("invokationUrl"),
  })
}

/// Decode the start schema of a task (`task.startSchema[]`).
pub fn parse_task_start_schema(raw: &Value) -> Result<Vec<TaskStartSchema>, ParseError> {
  Fields::of("task", raw)
    .list("startSchema")
    .into_iter()
    .map(|start| {
      let start = start.named("start_schema");
      Ok(TaskStartSchema {
        in_flow_id: start.required_str("inFlowId")?,
        ca_alias: start.str("caAlias"),
        injected_alias: start.str("injectedAlias"),
      })
    })
    .collect()
}

/// Decode the core id of a task and the reverse id of its component.
pub fn parse_task_identity(raw: &Value) -> Result<TaskIdentity, ParseError> {
  let fields = Fields::of("task", raw);
  let core_id = fields
    .path(&["details"])
    .and_then(|d| d.str("coreId"))
    .ok_or_else(|| ParseError::missing("task", "details.coreId"))?;
  let reverse_id = fields
    .path(&["component", "details"])
    .and_then(|d| d.str("reverseId"))
    .ok_or_else(|| ParseError::missing("task", "component.details.reverseId"))?;
  Ok(TaskIdentity {
    core_id,
    reverse_id,
  })
}

/// Decode an organization object. An org without an id is absent.
pub fn parse_org(raw: &Value) -> Option<LoadedOrg> {
  Fields::of("org", raw)
    .path(&["details"])
    .and_then(|d| d.str("uid"))
    .map(|uid| LoadedOrg { uid })
}
