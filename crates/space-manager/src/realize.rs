use serde_json::Value;
use space_schema::{App, Asset, CollectionAlias, ComponentContent, ComponentDescription, LoadedComponent};
use tracing::{debug, info};

use crate::error::ManagerError;
use crate::manager::ComponentManager;

impl ComponentManager {
  /// Realize the content of `desired` under a version, then re-fetch.
  pub(crate) async fn realize(
    &self,
    desired: &ComponentDescription,
    version_id: &str,
  ) -> Result<LoadedComponent, ManagerError> {
    match &desired.content {
      None => debug!(reverse_id = %desired.reverse_id, "no_content"),
      Some(ComponentContent::App(app)) => self.realize_app(app, version_id).await?,
      Some(ComponentContent::Flow(flow)) => {
        return self
          .assemble_flow(&desired.reverse_id, flow, version_id)
          .await;
      }
      Some(ComponentContent::Collection(collection)) => {
        self.realize_collection(collection, version_id).await?
      }
      Some(ComponentContent::Asset(asset)) => self.realize_asset(asset, version_id).await?,
    }

    self.get(&desired.reverse_id).await
  }

  async fn realize_app(&self, app: &App, version_id: &str) -> Result<(), ManagerError> {
    let ops = self.ops();
    let app_id = ops.create_app_in_version(version_id, app).await?;

    for cfg in &app.cfg {
      let cfg_id = ops.create_cfg_standalone(cfg).await?;
      ops.add_cfg_2_av(&app_id, &cfg_id).await?;
    }

    for op in &app.ops {
      let op_id = ops.create_op(op).await?;
      ops.add_op_2_av(&app_id, &op_id, op.op_type).await?;
      for requirement in &op.requires {
        ops.add_dep_2_op(&op_id, requirement).await?;
      }
    }

    info!(
      app_id = %app_id,
      ops = app.ops.len(),
      configs = app.cfg.len(),
      "app_realized"
    );
    Ok(())
  }

  async fn realize_collection(
    &self,
    collection: &CollectionAlias,
    version_id: &str,
  ) -> Result<(), ManagerError> {
    let docs = self.collection_docs(collection)?;
    let ca_id = self
      .ops()
      .create_collection(collection, &docs, self.host_id.as_deref())
      .await?;
    self
      .ops()
      .create_collection_in_version(version_id, &ca_id)
      .await?;

    info!(
      collection_id = %ca_id,
      alias = %collection.core_alias,
      docs = docs.len(),
      "collection_realized"
    );
    Ok(())
  }

  /// Inline documents, or the rows of the collection file when there are none.
  fn collection_docs(&self, collection: &CollectionAlias) -> Result<Vec<String>, ManagerError> {
    if !collection.docs.is_empty() {
      return Ok(collection.docs.clone());
    }

    let (Some(path), Some(base_dir)) = (&collection.path, &self.base_dir) else {
      return Ok(Vec::new());
    };

    let path = base_dir.join(path);
    debug!(path = %path.display(), "loading_collection_rows");
    let rows = self.loader.load_rows(&path)?;
    Ok(
      rows
        .into_iter()
        .map(|row| Value::Object(row).to_string())
        .collect(),
    )
  }

  async fn realize_asset(&self, asset: &Asset, version_id: &str) -> Result<(), ManagerError> {
    let loaded = self
      .ops()
      .create_asset_in_version(version_id, asset, self.host_id.as_deref())
      .await?;
    info!(
      asset_id = %loaded.uid,
      core_path = %asset.core_path,
      "asset_realized"
    );
    Ok(())
  }
}
