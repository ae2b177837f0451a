use serde_json::Value;
use space_schema::{
  LoadedFlow, LoadedInFlowApp, LoadedInFlowCollection, LoadedInFlowComponent, LoadedInFlowFlow,
  LoadedOp,
};

use crate::component::parse_cfg;
use crate::error::ParseError;
use crate::fields::Fields;

/// Decode a flow object: `{details{uid}, inFlowComponents{edges[...]}}`.
pub fn parse_flow(raw: &Value) -> Result<LoadedFlow, ParseError> {
  parse_flow_fields(Fields::of("flow", raw))
}

/// Decode one edge of `inFlowComponents`. Accepts either the edge
/// (`{node, rel}`) or the bare node.
pub fn parse_in_flow_component(raw: &Value) -> Result<LoadedInFlowComponent, ParseError> {
  let fields = Fields::of("in_flow_component", raw);
  let node = fields.obj("node").unwrap_or(fields);
  parse_member(node)
}

pub(crate) fn parse_flow_fields(fields: Fields<'_>) -> Result<LoadedFlow, ParseError> {
  let uid = fields.details_uid()?;
  let components = fields
    .nodes("inFlowComponents")
    .into_iter()
    .map(parse_member)
    .collect::<Result<Vec<_>, _>>()?;

  Ok(LoadedFlow { uid, components })
}

fn parse_member(node: Fields<'_>) -> Result<LoadedInFlowComponent, ParseError> {
  let node = node.named("in_flow_component");
  let uid = node.details_uid()?;
  let component = node.path(&["component", "details"]);

  let prev = node
    .nodes("prev")
    .into_iter()
    .map(parse_member)
    .collect::<Result<Vec<_>, _>>()?;

  let active_cfg = node.obj("cfg").map(parse_cfg).transpose()?;

  Ok(LoadedInFlowComponent {
    uid,
    alias: node.obj("details").and_then(|d| d.str("alias")),
    comp_id: component.and_then(|c| c.str("uid")),
    reverse_id: component.and_then(|c| c.str("reverseId")),
    app: node.obj("app").map(parse_member_app).transpose()?.flatten(),
    flow: node
      .path(&["flow", "details"])
      .and_then(|d| d.str("uid"))
      .map(|flow_id| LoadedInFlowFlow { flow_id }),
    collection: node
      .path(&["collectionAlias", "details"])
      .and_then(|d| d.str("uid"))
      .map(|collection_id| LoadedInFlowCollection { collection_id }),
    active_cfg,
    prev,
  })
}

/// The app a member points to, with the ops selected for it. A reference
/// without an id is treated as absent.
fn parse_member_app(app: Fields<'_>) -> Result<Option<LoadedInFlowApp>, ParseError> {
  let Some(app_id) = app.obj("details").and_then(|d| d.str("uid")) else {
    return Ok(None);
  };

  let active_op = app
    .nodes("op")
    .into_iter()
    .map(|op| {
      let op = op.named("op");
      let details = op.obj("details");
      Ok(LoadedOp {
        uid: op.details_uid()?,
        core_id: details.and_then(|d| d.str("coreId")),
        name: details.and_then(|d| d.str("name")),
        doc: None,
        op_type: None,
        args: Vec::new(),
        input_schema: Vec::new(),
        output_schema: Vec::new(),
        requires: Vec::new(),
      })
    })
    .collect::<Result<Vec<_>, ParseError>>()?;

  Ok(Some(LoadedInFlowApp { app_id, active_op }))
}
