use std::future::Future;
use std::pin::Pin;

use serde::Serialize;
use serde_json::{Value, json};
use space_parser::parse_flow;
use space_schema::{LoadedFlow, Limits, OpType};
use tracing::debug;

use crate::error::OpsError;
use crate::ops::{SpaceOps, args, str_at, value_at};

/// Ops of one type selected for a member.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OpSelection {
  #[serde(rename = "opType")]
  pub op_type: Option<OpType>,
  #[serde(rename = "opId")]
  pub op_ids: Vec<String>,
}

/// Placement of a component version inside a flow.
#[derive(Debug, Clone)]
pub struct InFlowPlacement<'a> {
  pub flow_id: &'a str,
  pub alias: &'a str,
  /// Version of the member component that is placed.
  pub version_id: &'a str,
  pub offset_x: f64,
  pub offset_y: f64,
  pub limits: Option<&'a Limits>,
  pub selected_op: Vec<OpSelection>,
}

/// A directed edge between two placed members.
#[derive(Debug, Clone, Default)]
pub struct Link<'a> {
  pub flow_id: &'a str,
  pub start_id: &'a str,
  pub target_id: &'a str,
  pub as_collection: Option<&'a str>,
  pub start_terminal_id: Option<&'a str>,
  pub target_terminal_id: Option<&'a str>,
  pub order: Option<i64>,
}

/// A leaf member of a flow after nested flows are flattened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowMember {
  pub uid: String,
  pub alias: Option<String>,
}

/// Flow plumbing: flow objects, members and the edges between them.
impl SpaceOps {
  /// The flow realized under a version, if any.
  pub async fn get_flow_by_version_id(&self, version_id: &str) -> Result<Option<String>, OpsError> {
    let data = self
      .request(
        "get_flow_by_version_id",
        args(json!({ "version_id": version_id })),
      )
      .await?;
    Ok(
      value_at(&data, &["version", "flow", "details", "uid"])
        .and_then(Value::as_str)
        .map(str::to_string),
    )
  }

  pub async fn create_flow_in_version(
    &self,
    version_id: &str,
    is_demo: bool,
  ) -> Result<String, OpsError> {
    let data = self
      .request(
        "create_flow_in_version",
        args(json!({ "version_id": version_id, "is_demo": is_demo })),
      )
      .await?;
    str_at("create_flow_in_version", &data, &["version", "addUnderlyingFlow", "uid"])
  }

  /// Place a member in a flow. Returns the in-flow id of the member.
  pub async fn add_comp_in_flow(&self, placement: &InFlowPlacement<'_>) -> Result<String, OpsError> {
    let selected_op = if placement.selected_op.is_empty() {
      Value::Null
    } else {
      json!(placement.selected_op)
    };

    let mut request = args(json!({
      "flow_id": placement.flow_id,
      "alias": placement.alias,
      "target_comp_version_id": placement.version_id,
      "version_id": placement.version_id,
      "offset_x": placement.offset_x,
      "offset_y": placement.offset_y,
      "selected_op": selected_op,
    }));
    if let Some(limits) = placement.limits {
      request.insert("memory_request".into(), json!(limits.memory_request));
      request.insert("memory_limit".into(), json!(limits.memory_limit));
      request.insert("cpu_request".into(), json!(limits.cpu_request));
      request.insert("cpu_limit".into(), json!(limits.cpu_limit));
      request.insert("storage_request".into(), json!(limits.storage_request));
      request.insert("storage_limit".into(), json!(limits.storage_limit));
    }

    let data = self.request("add_comp_in_flow", request).await?;
    str_at("add_comp_in_flow", &data, &["flow", "addComponent", "details", "uid"])
  }

  /// Activate a config on a member by its core name.
  pub async fn set_in_flow_component_cfg(
    &self,
    flow_id: &str,
    comp_id: &str,
    cfg_core_id: &str,
  ) -> Result<String, OpsError> {
    let data = self
      .request(
        "set_in_flow_component_cfg",
        args(json!({ "flow_id": flow_id, "comp_id": comp_id, "cfg_core_id": cfg_core_id })),
      )
      .await?;
    str_at(
      "set_in_flow_component_cfg",
      &data,
      &["flow", "inFlowComponent", "updateConfig", "details", "uid"],
    )
  }

  /// Link two members. Returns the schema adapter the platform attached, if any.
  pub async fn link(&self, link: &Link<'_>) -> Result<Option<String>, OpsError> {
    let data = self
      .request(
        "link",
        args(json!({
          "flow_id": link.flow_id,
          "start_id": link.start_id,
          "target_id": link.target_id,
          "schema_adapter_id": null,
          "as_collection": link.as_collection,
          "start_terminal_id": link.start_terminal_id,
          "target_terminal_id": link.target_terminal_id,
          "order": link.order,
        })),
      )
      .await?;
    Ok(
      value_at(&data, &["flow", "linkComponents", "schemaAdapter", "details", "uid"])
        .and_then(Value::as_str)
        .map(str::to_string),
    )
  }

  pub async fn add_schema_alias(
    &self,
    flow_id: &str,
    start_id: &str,
    target_id: &str,
    src_schema: &str,
    target_schema: &str,
  ) -> Result<(), OpsError> {
    self
      .request(
        "add_schema_alias",
        args(json!({
          "flow_id": flow_id,
          "start_id": start_id,
          "target_id": target_id,
          "src_schema": src_schema,
          "target_schema": target_schema,
        })),
      )
      .await?;
    Ok(())
  }

  /// Collection alias bound to a collection member of a flow.
  pub async fn get_ca_in_flow(&self, flow_id: &str, in_flow_id: &str) -> Result<Option<String>, OpsError> {
    let data = self
      .request(
        "get_ca_in_flow",
        args(json!({ "flow_id": flow_id, "in_flow_id": in_flow_id })),
      )
      .await?;
    Ok(
      value_at(
        &data,
        &["flow", "inFlowComponent", "collectionAlias", "collection", "details", "uid"],
      )
      .and_then(Value::as_str)
      .map(str::to_string),
    )
  }

  /// Point a collection alias at another core collection.
  pub async fn update_ca(&self, ca_id: &str, core_id: &str) -> Result<String, OpsError> {
    let data = self
      .request(
        "update_ca",
        args(json!({ "ca_id": ca_id, "core_id": core_id })),
      )
      .await?;
    str_at("update_ca", &data, &["collectionAlias", "update", "uid"])
  }

  /// Ask the platform to lay out the members of a flow.
  pub async fn auto_layout(&self, flow_id: &str) -> Result<(), OpsError> {
    self
      .request("auto_layout", args(json!({ "flow": flow_id })))
      .await?;
    Ok(())
  }

  /// Fetch and decode a flow by id. `None` when it does not exist.
  pub async fn get_flow(&self, flow_id: &str) -> Result<Option<LoadedFlow>, OpsError> {
    let data = self
      .request("get_flow", args(json!({ "flow_id": flow_id })))
      .await?;
    match value_at(&data, &["flow"]) {
      Some(raw) => Ok(Some(parse_flow(raw)?)),
      None => Ok(None),
    }
  }

  /// All leaf members of a flow, descending into members that are flows.
  pub fn extract_flow_members<'a>(
    &'a self,
    flow_id: &'a str,
  ) -> Pin<Box<dyn Future<Output = Result<Vec<FlowMember>, OpsError>> + Send + 'a>> {
    Box::pin(async move {
      let Some(flow) = self.get_flow(flow_id).await? else {
        return Ok(Vec::new());
      };

      let mut members = Vec::new();
      for component in flow.components {
        match &component.flow {
          Some(nested) => {
            debug!(flow_id, nested = %nested.flow_id, "descending into nested flow");
            members.extend(self.extract_flow_members(&nested.flow_id).await?);
          }
          None => members.push(FlowMember {
            uid: component.uid,
            alias: component.alias,
          }),
        }
      }
      Ok(members)
    })
  }
}


#[cfg(test)]
mod gateway_tests {
  use std::sync::Arc;

  use super::*;
  use crate::testing::MockGateway;

  fn flow_response(uid: &str, members: Value) -> Value {
    json!({ "flow": { "details": { "uid": uid }, "inFlowComponents": { "edges": members } } })
  }

  struct NestedFlows {
    inner: Arc<MockGateway>,
  }

  #[async_trait::async_trait]
  impl space_gateway::Gateway for NestedFlows {
    async fn execute(
      &self,
      operation: &str,
      args: space_gateway::Args,
    ) -> Result<Value, space_gateway::GatewayError> {
      let flow_id = args["flow_id"].as_str().unwrap_or_default().to_string();
      let response = match flow_id.as_str() {
        "outer" => flow_response(
          "outer",
          json!([
            { "node": { "details": { "uid": "m-1", "alias": "source" } } },
            { "node": {
              "details": { "uid": "m-2", "alias": "sub" },
              "flow": { "details": { "uid": "inner" } }
            } }
          ]),
        ),
        _ => flow_response(
          "inner",
          json!([{ "node": { "details": { "uid": "m-3", "alias": "scrape" } } }]),
        ),
      };
      self.inner.respond(operation, response);
      self.inner.execute(operation, args).await
    }

    async fn subscribe(
      &self,
      operation: &str,
      args: space_gateway::Args,
    ) -> Result<space_gateway::ValueStream, space_gateway::GatewayError> {
      self.inner.subscribe(operation, args).await
    }
  }

  #[tokio::test]
  async fn test_extract_flow_members_flattens_nested_flows() {
    let ops = SpaceOps::new(Arc::new(NestedFlows {
      inner: MockGateway::new(),
    }));

    let members = ops.extract_flow_members("outer").await.unwrap();
    let uids: Vec<_> = members.iter().map(|m| m.uid.as_str()).collect();
    assert_eq!(uids, vec!["m-1", "m-3"]);
  }

  #[tokio::test]
  async fn test_link_sends_terminals() {
    let gateway = MockGateway::new();
    gateway.respond("link", json!({ "flow": { "linkComponents": { "schemaAdapter": null } } }));
    let ops = SpaceOps::new(gateway.clone());

    let adapter = ops
      .link(&Link {
        flow_id: "f-1",
        start_id: "m-1",
        target_id: "m-2",
        start_terminal_id: Some("out"),
        target_terminal_id: Some("in"),
        order: Some(2),
        ..Default::default()
      })
      .await
      .unwrap();
    assert!(adapter.is_none());

    let sent = gateway.last_args("link").unwrap();
    assert_eq!(sent["start_terminal_id"], "out");
    assert_eq!(sent["order"], 2);
    assert_eq!(sent["as_collection"], Value::Null);
  }

  #[tokio::test]
  async fn test_add_comp_in_flow_sends_grouped_ops() {
    let gateway = MockGateway::new();
    gateway.respond(
      "add_comp_in_flow",
      json!({ "flow": { "addComponent": { "details": { "uid": "m-1" } } } }),
    );
    let ops = SpaceOps::new(gateway.clone());

    let mut placement = InFlowPlacement {
      flow_id: "f-1",
      alias: "reader",
      version_id: "v-1",
      offset_x: 0.0,
      offset_y: 0.0,
      limits: None,
      selected_op: vec![OpSelection {
        op_type: Some(OpType::Input),
        op_ids: vec!["op-1".to_string()],
      }],
    };
    assert_eq!(ops.add_comp_in_flow(&placement).await.unwrap(), "m-1");
    assert_eq!(
      gateway.last_args("add_comp_in_flow").unwrap()["selected_op"],
      json!([{ "opType": "input", "opId": ["op-1"] }])
    );

    placement.selected_op.clear();
    ops.add_comp_in_flow(&placement).await.unwrap();
    assert_eq!(gateway.last_args("add_comp_in_flow").unwrap()["selected_op"], Value::Null);
  }

  #[tokio::test]
  async fn test_collection_alias_in_flow() {
    let gateway = MockGateway::new();
    gateway.respond(
      "get_ca_in_flow",
      json!({ "flow": { "inFlowComponent": { "collectionAlias": {
        "collection": { "details": { "uid": "ca-1" } }
      } } } }),
    );
    gateway.respond(
      "update_ca",
      json!({ "collectionAlias": { "update": { "uid": "ca-1" } } }),
    );
    let ops = SpaceOps::new(gateway.clone());

    let ca_id = ops.get_ca_in_flow("f-1", "m-1").await.unwrap().unwrap();
    assert_eq!(ca_id, "ca-1");
    assert_eq!(ops.update_ca(&ca_id, "core-2").await.unwrap(), "ca-1");
    assert_eq!(gateway.last_args("update_ca").unwrap()["core_id"], "core-2");

    gateway.respond(
      "get_ca_in_flow",
      json!({ "flow": { "inFlowComponent": { "collectionAlias": null } } }),
    );
    assert!(ops.get_ca_in_flow("f-1", "m-2").await.unwrap().is_none());
  }
}
