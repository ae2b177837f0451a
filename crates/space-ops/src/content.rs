use serde_json::{Value, json};
use space_parser::parse_asset;
use space_schema::{App, Asset, Cfg, CollectionAlias, LoadedAsset, Op, OpRequirement, OpType};

use crate::error::OpsError;
use crate::ops::{SpaceOps, args, str_at, value_at};

/// Content realized under a version: apps, configs, ops, collections, assets.
impl SpaceOps {
  pub async fn create_app_in_version(&self, version_id: &str, app: &App) -> Result<String, OpsError> {
    let data = self
      .request(
        "create_app_in_version",
        args(json!({
          "version_id": version_id,
          "container_ref": app.container_ref,
          "container_user": app.container_user,
          "container_token": app.container_token,
          "preload_op": app.preload_ops,
        })),
      )
      .await?;
    str_at("create_app_in_version", &data, &["version", "addUnderlyingApp", "uid"])
  }

  /// Create a standalone config. `cfg_json` is sent encoded as a string.
  pub async fn create_cfg_standalone(&self, cfg: &Cfg) -> Result<String, OpsError> {
    let cfg_json = cfg.cfg_json.as_ref().unwrap_or(&Value::Null).to_string();
    let data = self
      .request(
        "create_cfg_standalone",
        args(json!({
          "readable_name": cfg.readable_name,
          "cfg_json": cfg_json,
          "core_name": cfg.core_name,
        })),
      )
      .await?;
    str_at("create_cfg_standalone", &data, &["configs", "update", "uid"])
  }

  pub async fn add_cfg_2_av(&self, app_id: &str, cfg_id: &str) -> Result<String, OpsError> {
    let data = self
      .request(
        "add_cfg_2_av",
        args(json!({ "app_id": app_id, "cfg_id": cfg_id })),
      )
      .await?;
    str_at("add_cfg_2_av", &data, &["app", "addCfg2Av", "details", "uid"])
  }

  pub async fn create_op(&self, op: &Op) -> Result<String, OpsError> {
    let data = self
      .request(
        "create_op",
        args(json!({
          "core_id": op.core_id,
          "input_schema": op.input_schema,
          "output_schema": op.output_schema,
        })),
      )
      .await?;
    str_at("create_op", &data, &["ops", "create", "details", "uid"])
  }

  pub async fn add_op_2_av(
    &self,
    app_id: &str,
    op_id: &str,
    op_type: OpType,
  ) -> Result<String, OpsError> {
    let data = self
      .request(
        "add_op_2_av",
        args(json!({ "app_id": app_id, "op_id": op_id, "op_type": op_type.as_str() })),
      )
      .await?;
    str_at("add_op_2_av", &data, &["app", "addOp2Av", "details", "uid"])
  }

  pub async fn add_dep_2_op(&self, op_id: &str, dep: &OpRequirement) -> Result<String, OpsError> {
    let data = self
      .request(
        "add_dep_2_op",
        args(json!({ "op_id": op_id, "dep_key": dep.key, "dep_type": dep.dep_type })),
      )
      .await?;
    str_at("add_dep_2_op", &data, &["op", "addDep", "details", "uid"])
  }

  /// Create a collection alias holding `docs` (one JSON document per row).
  pub async fn create_collection(
    &self,
    collection: &CollectionAlias,
    docs: &[String],
    host_id: Option<&str>,
  ) -> Result<String, OpsError> {
    let data = self
      .org_request(
        "create_collection",
        args(json!({
          "host_id": host_id,
          "core_alias": collection.core_alias,
          "schema_core_id": collection.schema_core_id,
          "docs": docs,
        })),
      )
      .await?;
    str_at("create_collection", &data, &["collectionAliases", "create", "details", "uid"])
  }

  pub async fn create_collection_in_version(
    &self,
    version_id: &str,
    ca_id: &str,
  ) -> Result<String, OpsError> {
    let data = self
      .request(
        "create_collection_in_version",
        args(json!({ "version_id": version_id, "ca_id": ca_id })),
      )
      .await?;
    str_at("create_collection_in_version", &data, &["version", "addUnderlyingCa", "uid"])
  }

  /// Create an asset outside of any component version.
  pub async fn create_asset(&self, asset: &Asset, host_id: Option<&str>) -> Result<LoadedAsset, OpsError> {
    let data = self
      .org_request(
        "create_asset",
        args(json!({
          "core_path": asset.core_path,
          "is_composite": asset.is_composite,
          "checksum": asset.checksum,
          "host_id": host_id,
        })),
      )
      .await?;
    let raw = value_at(&data, &["assets", "create"]).unwrap_or(&Value::Null);
    Ok(parse_asset(raw)?)
  }

  /// Fetch an asset with fresh transfer urls. `None` when it does not exist.
  pub async fn get_asset(&self, uid: &str) -> Result<Option<LoadedAsset>, OpsError> {
    let data = self.request("get_asset", args(json!({ "uid": uid }))).await?;
    match value_at(&data, &["asset"]) {
      Some(raw) => Ok(Some(parse_asset(raw)?)),
      None => Ok(None),
    }
  }

  /// Create an asset under a version. The response carries upload and
  /// download urls for the asset payload.
  pub async fn create_asset_in_version(
    &self,
    version_id: &str,
    asset: &Asset,
    host_id: Option<&str>,
  ) -> Result<LoadedAsset, OpsError> {
    let data = self
      .org_request(
        "create_asset_in_version",
        args(json!({
          "version_id": version_id,
          "core_path": asset.core_path,
          "is_composite": asset.is_composite,
          "checksum": asset.checksum,
          "host_id": host_id,
        })),
      )
      .await?;

    let raw = value_at(&data, &["version", "createUnderlyingAsset"]).unwrap_or(&Value::Null);
    Ok(parse_asset(raw)?)
  }
}
