use serde_json::{Value, json};
use space_parser::{parse_branch, parse_component};
use space_schema::{
  ComponentDescription, LoadedBranch, LoadedComponent, LoadedSchema, UseCase, VersionDescription,
};
use tracing::debug;

use crate::error::OpsError;
use crate::ops::{SpaceOps, args, str_at, value_at};

/// Component lifecycle: components, branches, versions and their metadata.
impl SpaceOps {
  /// Fetch and decode a component by reverse id. `None` when it does not exist.
  pub async fn get_parsed_component_by_reverse_id(
    &self,
    reverse_id: &str,
  ) -> Result<Option<LoadedComponent>, OpsError> {
    let data = self
      .request(
        "get_component_by_reverse_id",
        args(json!({ "reverse_id": reverse_id })),
      )
      .await?;

    match value_at(&data, &["component"]) {
      Some(raw) => Ok(Some(parse_component(raw)?)),
      None => Ok(None),
    }
  }

  /// Fetch a component with the branch and version a task was deployed from
  /// in place of the active ones. `None` when the component does not exist.
  pub async fn get_parsed_versioned_component_by_task_id(
    &self,
    reverse_id: &str,
    task_id: &str,
  ) -> Result<Option<LoadedComponent>, OpsError> {
    let data = self
      .request(
        "get_component_by_reverse_id",
        args(json!({ "reverse_id": reverse_id })),
      )
      .await?;
    let Some(mut raw) = value_at(&data, &["component"]).cloned() else {
      return Ok(None);
    };

    let by_task = json!({ "reverse_id": reverse_id, "task_id": task_id });
    let data = self
      .request("get_version_by_task_id", args(by_task.clone()))
      .await?;
    let version_id =
      value_at(&data, &["task", "version", "details", "uid"]).and_then(Value::as_str);
    if let Some(version_id) = version_id {
      let data = self
        .request("get_version", args(json!({ "version_id": version_id })))
        .await?;
      if let (Some(version), Value::Object(component)) = (value_at(&data, &["version"]), &mut raw) {
        component.insert("activeBranchVersion".to_string(), version.clone());
      }
    }

    let data = self.request("get_branch_by_task_id", args(by_task)).await?;
    let branch = value_at(&data, &["task", "branch"]);
    if let (Some(branch), Value::Object(component)) = (branch, &mut raw) {
      component.insert("activeBranch".to_string(), branch.clone());
    }

    Ok(Some(parse_component(&raw)?))
  }

  /// Create a component from its description. Returns the new uid.
  pub async fn create_component(&self, desc: &ComponentDescription) -> Result<String, OpsError> {
    let data = self
      .org_request(
        "create_component",
        args(json!({
          "name": desc.name,
          "reverse_id": desc.reverse_id,
          "description": desc.description,
          "type": desc.kind().as_str(),
        })),
      )
      .await?;
    str_at("create_component", &data, &["components", "create", "details", "uid"])
  }

  /// Update the mutable metadata of a component.
  pub async fn update_component(
    &self,
    comp_id: &str,
    desc: &ComponentDescription,
  ) -> Result<String, OpsError> {
    let data = self
      .request(
        "update_component",
        args(json!({
          "comp_id": comp_id,
          "name": desc.name,
          "reverse_id": desc.reverse_id,
          "description": desc.description,
        })),
      )
      .await?;
    str_at("update_component", &data, &["component", "update", "uid"])
  }

  pub async fn add_comp_to_org(
    &self,
    comp_id: &str,
    org_id: &str,
  ) -> Result<Option<String>, OpsError> {
    let data = self
      .request(
        "add_comp_to_org",
        args(json!({ "comp_id": comp_id, "org_id": org_id })),
      )
      .await?;
    Ok(
      value_at(&data, &["component", "addToOrg", "details", "uid"])
        .and_then(Value::as_str)
        .map(str::to_string),
    )
  }

  pub async fn create_branch(
    &self,
    component_id: &str,
    name: &str,
    status: &str,
  ) -> Result<String, OpsError> {
    let data = self
      .request(
        "create_branch",
        args(json!({
          "component_id": component_id,
          "name": name,
          "status": status,
          "comp_rel_status": status,
        })),
      )
      .await?;
    str_at("create_branch", &data, &["component", "createBranch", "details", "uid"])
  }

  /// Find a branch of a component by name, with its active version.
  pub async fn get_branch_by_name(
    &self,
    component_id: &str,
    branch_name: &str,
  ) -> Result<Option<LoadedBranch>, OpsError> {
    let data = self
      .request(
        "get_branch_by_name",
        args(json!({ "component_id": component_id, "branch_name": branch_name })),
      )
      .await?;

    let first = value_at(&data, &["component", "branches", "edges"])
      .and_then(Value::as_array)
      .and_then(|edges| edges.first())
      .and_then(|edge| value_at(edge, &["node"]));

    match first {
      Some(node) => Ok(Some(parse_branch(node)?)),
      None => Ok(None),
    }
  }

  /// Create a version under a branch. All fields of `version` are sent as given.
  pub async fn create_version(
    &self,
    branch_id: &str,
    version: &VersionDescription,
  ) -> Result<String, OpsError> {
    let data = self
      .request(
        "create_version",
        args(json!({
          "branch_id": branch_id,
          "readable_name": version.readable_name,
          "updates_markdown": version.updates_markdown,
          "branch_version_status": version.status,
          "commit_digest": version.commit_digest,
        })),
      )
      .await?;
    str_at("create_version", &data, &["branch", "createVersion", "uid"])
  }

  pub async fn create_tag(&self, title: &str) -> Result<String, OpsError> {
    let data = self
      .request("create_tag", args(json!({ "title": title })))
      .await?;
    str_at("create_tag", &data, &["tags", "create", "details", "uid"])
  }

  pub async fn attach_tag_to_comp(&self, comp_id: &str, tag_ids: &[String]) -> Result<(), OpsError> {
    self
      .request(
        "attach_tag_to_comp",
        args(json!({ "comp_id": comp_id, "tag_ids": tag_ids })),
      )
      .await?;
    Ok(())
  }

  pub async fn create_use_case(&self, use_case: &UseCase) -> Result<String, OpsError> {
    let data = self
      .request(
        "create_use_case",
        args(json!({
          "title": use_case.title,
          "body": use_case.body,
          "is_public_example": use_case.is_public_example,
        })),
      )
      .await?;
    str_at("create_use_case", &data, &["useCases", "create", "details", "uid"])
  }

  /// Attach a use case. `designed` tells whether the component is meant for it.
  pub async fn attach_use_case(
    &self,
    comp_uid: &str,
    use_case_uid: &str,
    designed: bool,
  ) -> Result<bool, OpsError> {
    let data = self
      .request(
        "attach_use_case",
        args(json!({
          "comp_uid": comp_uid,
          "use_case_uid": [use_case_uid],
          "designed": designed,
        })),
      )
      .await?;
    Ok(value_at(&data, &["component", "attachUseCase"]).is_some())
  }

  /// Look up a registered schema by its core id.
  pub async fn get_schema(&self, core_id: &str) -> Result<Option<LoadedSchema>, OpsError> {
    let data = self
      .request("get_schema", args(json!({ "core_id": core_id })))
      .await?;

    Ok(
      value_at(&data, &["schema", "details", "uid"])
        .and_then(Value::as_str)
        .map(|uid| LoadedSchema {
          uid: uid.to_string(),
          core_id: value_at(&data, &["schema", "details", "coreId"])
            .and_then(Value::as_str)
            .map(str::to_string),
        }),
    )
  }

  /// Register a schema. The schema text must be JSON; it is sent compacted.
  pub async fn create_schema(&self, core_id: &str, schema_data: &str) -> Result<String, OpsError> {
    let raw = serde_json::from_str::<Value>(schema_data)
      .map_err(|source| OpsError::InvalidSchema {
        core_id: core_id.to_string(),
        source,
      })?
      .to_string();

    let data = self
      .request("create_schema", args(json!({ "core_id": core_id, "raw": raw })))
      .await?;
    let uid = str_at("create_schema", &data, &["schemas", "create", "details", "uid"])?;
    debug!(core_id, uid = %uid, "registered schema");
    Ok(uid)
  }

  /// Remove a component and everything under it.
  pub async fn wipe_component(&self, reverse_id: &str) -> Result<bool, OpsError> {
    let data = self
      .request("wipe_component", args(json!({ "reverse_id": reverse_id })))
      .await?;
    Ok(
      value_at(&data, &["component", "wipe"])
        .and_then(Value::as_bool)
        .unwrap_or(false),
    )
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::testing::MockGateway;
  use space_schema::LoadedOrg;

  #[tokio::test]
  async fn test_missing_component_is_none() {
    let gateway = MockGateway::new();
    gateway.respond("get_component_by_reverse_id", json!({ "component": null }));
    let ops = SpaceOps::new(gateway.clone());

    let component = ops.get_parsed_component_by_reverse_id("nope").await.unwrap();
    assert!(component.is_none());
    assert_eq!(
      gateway.last_args("get_component_by_reverse_id").unwrap()["reverse_id"],
      "nope"
    );
  }

  #[tokio::test]
  async fn test_create_component_is_org_scoped() {
    let gateway = MockGateway::new();
    gateway.respond(
      "create_component",
      json!({ "components": { "create": { "details": { "uid": "c-1" } } } }),
    );
    let ops = SpaceOps::new(gateway.clone()).with_org(Some(LoadedOrg {
      uid: "org-1".to_string(),
    }));

    let desc = ComponentDescription::new("Scraper", "scraper");
    assert_eq!(ops.create_component(&desc).await.unwrap(), "c-1");

    let sent = gateway.last_args("create_component").unwrap();
    assert_eq!(sent["org_id"], "org-1");
    assert_eq!(sent["type"], "app");
  }

  #[tokio::test]
  async fn test_branch_lookup() {
    let gateway = MockGateway::new();
    gateway.respond(
      "get_branch_by_name",
      json!({ "component": { "branches": { "edges": [
        { "node": {
          "details": { "uid": "b-1", "name": "dev" },
          "activeVersion": { "details": { "uid": "v-1", "readableName": "0.1.0" } }
        } }
      ] } } }),
    );
    let ops = SpaceOps::new(gateway.clone());

    let branch = ops.get_branch_by_name("c-1", "dev").await.unwrap().unwrap();
    assert_eq!(branch.uid, "b-1");
    assert_eq!(
      branch.active_version.unwrap().readable_name.as_deref(),
      Some("0.1.0")
    );

    gateway.respond(
      "get_branch_by_name",
      json!({ "component": { "branches": { "edges": [] } } }),
    );
    assert!(ops.get_branch_by_name("c-1", "other").await.unwrap().is_none());
  }

  #[tokio::test]
  async fn test_create_schema_rejects_invalid_json() {
    let gateway = MockGateway::new();
    gateway.respond(
      "create_schema",
      json!({ "schemas": { "create": { "details": { "uid": "s-1" } } } }),
    );
    let ops = SpaceOps::new(gateway.clone());

    let result = ops.create_schema("pages", "{ not json").await;
    assert!(matches!(
      result,
      Err(OpsError::InvalidSchema { core_id, .. }) if core_id == "pages"
    ));
    assert!(gateway.last_args("create_schema").is_none());

    let uid = ops.create_schema("pages", "{ \"type\": \"object\" }").await.unwrap();
    assert_eq!(uid, "s-1");
    assert_eq!(gateway.last_args("create_schema").unwrap()["raw"], r#"{"type":"object"}"#);
  }

  #[tokio::test]
  async fn test_component_as_deployed_by_task() {
    let gateway = MockGateway::new();
    gateway.respond(
      "get_component_by_reverse_id",
      json!({ "component": {
        "details": { "uid": "c-1", "reverseId": "acme.pipeline" },
        "activeBranch": { "details": { "uid": "b-main", "name": "main" } },
        "activeBranchVersion": { "details": { "uid": "v-3", "readableName": "0.3.0" } }
      } }),
    );
    gateway.respond(
      "get_version_by_task_id",
      json!({ "task": { "version": { "details": { "uid": "v-1" } } } }),
    );
    gateway.respond(
      "get_version",
      json!({ "version": { "details": { "uid": "v-1", "readableName": "0.1.0" } } }),
    );
    gateway.respond(
      "get_branch_by_task_id",
      json!({ "task": { "branch": { "details": { "uid": "b-dev", "name": "dev" } } } }),
    );
    let ops = SpaceOps::new(gateway.clone());

    let component = ops
      .get_parsed_versioned_component_by_task_id("acme.pipeline", "t-1")
      .await
      .unwrap()
      .unwrap();
    assert_eq!(component.version_name(), Some("0.1.0"));
    assert_eq!(component.branch.unwrap().name.as_deref(), Some("dev"));
    assert_eq!(gateway.last_args("get_version").unwrap()["version_id"], "v-1");

    gateway.respond(
      "get_version_by_task_id",
      json!({ "task": { "version": null } }),
    );
    gateway.respond("get_branch_by_task_id", json!({ "task": { "branch": null } }));
    let component = ops
      .get_parsed_versioned_component_by_task_id("acme.pipeline", "t-2")
      .await
      .unwrap()
      .unwrap();
    assert_eq!(component.version_name(), Some("0.3.0"));
    assert_eq!(component.branch.unwrap().name.as_deref(), Some("main"));
  }

  #[tokio::test]
  async fn test_malformed_create_response() {
    let gateway = MockGateway::new();
    gateway.respond("create_tag", json!({ "tags": { "create": null } }));
    let ops = SpaceOps::new(gateway);

    assert!(matches!(
      ops.create_tag("nlp").await,
      Err(OpsError::Parse(_))
    ));
  }
}
