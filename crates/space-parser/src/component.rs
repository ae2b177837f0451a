use serde_json::Value;
use space_schema::{
  LoadedApp, LoadedAsset, LoadedBranch, LoadedCfg, LoadedCollectionAlias, LoadedComponent,
  LoadedContent, LoadedOp, LoadedOpRequirement, LoadedSchema, LoadedVersion, OpArg, OpType,
};

use crate::error::ParseError;
use crate::fields::Fields;
use crate::flow::parse_flow_fields;

/// Decode the `component` object of a component query.
pub fn parse_component(raw: &Value) -> Result<LoadedComponent, ParseError> {
  let fields = Fields::of("component", raw);
  let uid = fields.details_uid()?;
  let details = fields.obj("details");

  let branch = fields
    .obj("activeBranch")
    .map(|b| parse_branch_fields(b.named("branch")))
    .transpose()?;
  let version_fields = fields.obj("activeBranchVersion");
  let version = version_fields
    .map(|v| parse_version_fields(v.named("version")))
    .transpose()?;
  let content = version_fields.map(parse_content).transpose()?.flatten();

  Ok(LoadedComponent {
    uid,
    reverse_id: details.and_then(|d| d.str("reverseId")),
    name: details.and_then(|d| d.str("name")),
    description: details.and_then(|d| d.str("descriptionMarkdown")),
    branch,
    version,
    content,
  })
}

/// Decode a version object: `{details{uid,readableName,...}}`.
pub fn parse_version(raw: &Value) -> Result<LoadedVersion, ParseError> {
  parse_version_fields(Fields::of("version", raw))
}

/// Decode a branch object, including its active version when present.
pub fn parse_branch(raw: &Value) -> Result<LoadedBranch, ParseError> {
  parse_branch_fields(Fields::of("branch", raw))
}

/// Decode the op connection of an app version (`avOp.edges`).
pub fn parse_ops(raw: &Value) -> Result<Vec<LoadedOp>, ParseError> {
  let fields = Fields::of("op", raw);
  fields
    .list("edges")
    .into_iter()
    .filter_map(|edge| {
      let node = edge.obj("node")?;
      Some(parse_op(node, edge.obj("rel")))
    })
    .collect()
}

/// Decode an asset object: `{details{uid,corePath,isComposite},downloadUrl,uploadUrl}`.
pub fn parse_asset(raw: &Value) -> Result<LoadedAsset, ParseError> {
  parse_asset_fields(Fields::of("asset", raw))
}

fn parse_version_fields(fields: Fields<'_>) -> Result<LoadedVersion, ParseError> {
  let uid = fields.details_uid()?;
  let details = fields.obj("details");
  Ok(LoadedVersion {
    uid,
    readable_name: details.and_then(|d| d.str("readableName")),
    updates_markdown: details.and_then(|d| d.str("updatesMarkdown")),
    status: details.and_then(|d| d.str("status")),
    commit_digest: details.and_then(|d| d.str("commitDigest")),
  })
}

fn parse_branch_fields(fields: Fields<'_>) -> Result<LoadedBranch, ParseError> {
  let uid = fields.details_uid()?;
  let details = fields.obj("details");
  let active_version = fields
    .obj("activeVersion")
    .map(|v| parse_version_fields(v.named("version")))
    .transpose()?;

  Ok(LoadedBranch {
    uid,
    name: details.and_then(|d| d.str("name")),
    status: details.and_then(|d| d.str("status")),
    active_version,
  })
}

fn parse_content(version: Fields<'_>) -> Result<Option<LoadedContent>, ParseError> {
  if let Some(app) = version.obj("app") {
    return parse_app(app.named("app")).map(|a| Some(LoadedContent::App(a)));
  }
  if let Some(flow) = version.obj("flow") {
    return parse_flow_fields(flow.named("flow")).map(|f| Some(LoadedContent::Flow(f)));
  }
  if let Some(collection) = version.obj("collection") {
    return parse_collection(collection.named("collection"))
      .map(|c| Some(LoadedContent::Collection(c)));
  }
  if let Some(asset) = version.obj("asset") {
    return parse_asset_fields(asset.named("asset")).map(|a| Some(LoadedContent::Asset(a)));
  }
  Ok(None)
}

fn parse_app(fields: Fields<'_>) -> Result<LoadedApp, ParseError> {
  let uid = fields.details_uid()?;
  let details = fields.obj("details");

  let ops = fields
    .edges("avOp")
    .into_iter()
    .filter_map(|edge| {
      let node = edge.obj("node")?;
      Some(parse_op(node, edge.obj("rel")))
    })
    .collect::<Result<Vec<_>, _>>()?;

  let cfg = fields
    .nodes("avCfg")
    .into_iter()
    .map(parse_cfg)
    .collect::<Result<Vec<_>, _>>()?;

  Ok(LoadedApp {
    uid,
    container_ref: details.and_then(|d| d.str("containerRef")),
    container_user: details.and_then(|d| d.str("containerUser")),
    container_token: details.and_then(|d| d.str("containerToken")),
    ops,
    cfg,
  })
}

fn parse_op(node: Fields<'_>, rel: Option<Fields<'_>>) -> Result<LoadedOp, ParseError> {
  let node = node.named("op");
  let uid = node.details_uid()?;
  let details = node.obj("details");

  let op_type = rel
    .and_then(|r| r.str("type"))
    .or_else(|| details.and_then(|d| d.str("type")))
    .and_then(|t| OpType::parse(&t));

  let args = details
    .map(|d| d.list("args"))
    .unwrap_or_default()
    .into_iter()
    .filter_map(|arg| {
      Some(OpArg {
        arg_name: arg.str("argName")?,
        arg_type: arg.str("argType"),
        arg_order: arg.i64("argOrder"),
      })
    })
    .collect();

  Ok(LoadedOp {
    uid,
    core_id: details.and_then(|d| d.str("coreId")),
    name: details.and_then(|d| d.str("name")),
    doc: details.and_then(|d| d.str("doc")),
    op_type,
    args,
    input_schema: parse_schemas(node, "inputSchema")?,
    output_schema: parse_schemas(node, "outputSchema")?,
    requires: parse_requirements(node)?,
  })
}

fn parse_schemas(node: Fields<'_>, key: &str) -> Result<Vec<LoadedSchema>, ParseError> {
  node
    .list(key)
    .into_iter()
    .map(|schema| {
      let schema = schema.named("schema");
      Ok(LoadedSchema {
        uid: schema.details_uid()?,
        core_id: schema.obj("details").and_then(|d| d.str("coreId")),
      })
    })
    .collect()
}

fn parse_requirements(node: Fields<'_>) -> Result<Vec<LoadedOpRequirement>, ParseError> {
  node
    .list("deps")
    .into_iter()
    .filter_map(|dep| {
      let dep = dep.named("dependency");
      let details = dep.obj("details")?;
      Some(dep.details_uid().map(|uid| LoadedOpRequirement {
        uid,
        key: details.str("key").unwrap_or_default(),
        dep_type: details.str("type").unwrap_or_default(),
      }))
    })
    .collect()
}

/// Decode a cfg node. `cfgJson` arrives either as an object or as an
/// encoded JSON string. An undecodable string is treated as absent.
pub(crate) fn parse_cfg(node: Fields<'_>) -> Result<LoadedCfg, ParseError> {
  let node = node.named("cfg");
  let uid = node.details_uid()?;
  let details = node.obj("details");

  let cfg_json = details
    .and_then(|d| d.raw("cfgJson"))
    .and_then(|raw| match raw {
      Value::String(s) => serde_json::from_str(s).ok(),
      other => Some(other.clone()),
    });

  Ok(LoadedCfg {
    uid,
    readable_name: details.and_then(|d| d.str("readableName")),
    core_name: details.and_then(|d| d.str("coreName")),
    core_id: details.and_then(|d| d.str("coreId")),
    cfg_json,
  })
}

pub(crate) fn parse_collection(fields: Fields<'_>) -> Result<LoadedCollectionAlias, ParseError> {
  let uid = fields.details_uid()?;
  let details = fields.obj("details");
  Ok(LoadedCollectionAlias {
    uid,
    core_alias: details.and_then(|d| d.str("coreAlias")),
    core_id: details.and_then(|d| d.str("coreId")),
    schema_core_id: fields
      .path(&["schema", "details"])
      .and_then(|d| d.str("coreId")),
  })
}

fn parse_asset_fields(fields: Fields<'_>) -> Result<LoadedAsset, ParseError> {
  let uid = fields.details_uid()?;
  let details = fields.obj("details");
  Ok(LoadedAsset {
    uid,
    core_path: details.and_then(|d| d.str("corePath")),
    is_composite: details.and_then(|d| d.bool("isComposite")).unwrap_or(false),
    download_url: fields.str("downloadUrl"),
    upload_url: fields.str("uploadUrl"),
  })
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  fn app_component() -> Value {
    json!({
      "details": {
        "uid": "c-1",
        "name": "Scraper",
        "reverseId": "scraper",
        "type": "app",
        "descriptionMarkdown": "Scrapes"
      },
      "activeBranch": { "details": { "uid": "b-1", "name": "main", "status": "active" } },
      "activeBranchVersion": {
        "details": { "uid": "v-1", "readableName": "0.0.1", "updatesMarkdown": "Initial version" },
        "app": {
          "details": { "uid": "a-1", "containerRef": "registry/scraper:1" },
          "avCfg": { "edges": [
            { "node": { "details": { "uid": "cfg-1", "coreName": "default", "cfgJson": "{\"depth\": 2}" } } }
          ] },
          "avOp": { "edges": [
            {
              "node": {
                "details": {
                  "uid": "op-1",
                  "name": "scrape",
                  "coreId": "scrape",
                  "args": [{ "argName": "url", "argType": "str", "argOrder": 0 }]
                },
                "deps": [{ "details": { "uid": "d-1", "key": "proxy", "type": "secret" } }],
                "inputSchema": [{ "details": { "uid": "s-1", "coreId": "urls" } }],
                "outputSchema": []
              },
              "rel": { "type": "processor" }
            }
          ] }
        }
      }
    })
  }

  #[test]
  fn test_parse_app_component() {
    let component = parse_component(&app_component()).unwrap();

    assert_eq!(component.uid, "c-1");
    assert_eq!(component.reverse_id.as_deref(), Some("scraper"));
    assert_eq!(component.branch.as_ref().unwrap().uid, "b-1");
    assert_eq!(component.version_name(), Some("0.0.1"));

    let app = component.app().unwrap();
    assert_eq!(app.uid, "a-1");
    assert_eq!(app.container_ref.as_deref(), Some("registry/scraper:1"));
    assert_eq!(app.cfg[0].cfg_json, Some(json!({ "depth": 2 })));

    let op = &app.ops[0];
    assert_eq!(op.op_type, Some(OpType::Processor));
    assert_eq!(op.args[0].arg_name, "url");
    assert_eq!(op.input_schema[0].core_id.as_deref(), Some("urls"));
    assert_eq!(op.requires[0].key, "proxy");
  }

  #[test]
  fn test_parse_component_without_version() {
    let raw = json!({ "details": { "uid": "c-2" }, "activeBranch": null });
    let component = parse_component(&raw).unwrap();

    assert!(component.branch.is_none());
    assert!(component.version.is_none());
    assert!(component.content.is_none());
    assert!(component.kind().is_none());
  }

  #[test]
  fn test_parse_component_missing_uid() {
    let raw = json!({ "details": { "name": "nameless" } });
    let err = parse_component(&raw).unwrap_err();
    assert_eq!(err, ParseError::missing("component", "details.uid"));
  }

  #[test]
  fn test_parse_version_missing_uid() {
    let raw = json!({
      "details": { "uid": "c-3" },
      "activeBranchVersion": { "details": { "readableName": "0.0.1" } }
    });
    let err = parse_component(&raw).unwrap_err();
    assert_eq!(err, ParseError::missing("version", "details.uid"));
  }

  #[test]
  fn test_parse_collection_and_asset() {
    let raw = json!({
      "details": { "uid": "c-4" },
      "activeBranchVersion": {
        "details": { "uid": "v-4" },
        "collection": {
          "details": { "uid": "ca-1", "coreAlias": "urls", "coreId": "core-1" },
          "schema": { "details": { "coreId": "urls_schema" } }
        }
      }
    });
    let component = parse_component(&raw).unwrap();
    let collection = component.collection().unwrap();
    assert_eq!(collection.core_alias.as_deref(), Some("urls"));
    assert_eq!(collection.schema_core_id.as_deref(), Some("urls_schema"));

    let asset = parse_asset(&json!({
      "details": { "uid": "as-1", "corePath": "models/weights.bin", "isComposite": false },
      "uploadUrl": "https://upload"
    }))
    .unwrap();
    assert_eq!(asset.core_path.as_deref(), Some("models/weights.bin"));
    assert_eq!(asset.upload_url.as_deref(), Some("https://upload"));
    assert!(asset.download_url.is_none());
  }

  #[test]
  fn test_parse_branch_with_active_version() {
    let raw = json!({
      "details": { "uid": "b-2", "name": "dev" },
      "activeVersion": { "details": { "uid": "v-9", "readableName": "1.2.0" } }
    });
    let branch = parse_branch(&raw).unwrap();
    assert_eq!(branch.name.as_deref(), Some("dev"));
    assert_eq!(
      branch.active_version.unwrap().readable_name.as_deref(),
      Some("1.2.0")
    );
  }
}
