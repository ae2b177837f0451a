use std::sync::Arc;

use serde_json::Value;
use space_gateway::{Args, Gateway};
use space_parser::{Fields, ParseError, parse_org};
use space_schema::LoadedOrg;
use tracing::debug;

use crate::error::OpsError;

/// Typed access to the remote operations of the platform.
#[derive(Clone)]
pub struct SpaceOps {
  gateway: Arc<dyn Gateway>,
  org: Option<LoadedOrg>,
}

impl SpaceOps {
  /// Create operations acting on behalf of the user only.
  pub fn new(gateway: Arc<dyn Gateway>) -> Self {
    Self { gateway, org: None }
  }

  /// Act on behalf of an already resolved organization.
  pub fn with_org(mut self, org: Option<LoadedOrg>) -> Self {
    self.org = org;
    self
  }

  /// Create operations, resolving the acting organization by reverse id.
  pub async fn for_org(
    gateway: Arc<dyn Gateway>,
    org_reverse_id: Option<&str>,
  ) -> Result<Self, OpsError> {
    let ops = Self::new(gateway);
    let org = match org_reverse_id {
      Some(reverse_id) => ops.get_org(reverse_id).await?,
      None => None,
    };
    Ok(ops.with_org(org))
  }

  pub fn org(&self) -> Option<&LoadedOrg> {
    self.org.as_ref()
  }

  pub fn org_id(&self) -> Option<&str> {
    self.org.as_ref().map(|o| o.uid.as_str())
  }

  pub fn gateway(&self) -> &Arc<dyn Gateway> {
    &self.gateway
  }

  /// Look up an organization by reverse id.
  pub async fn get_org(&self, reverse_id: &str) -> Result<Option<LoadedOrg>, OpsError> {
    let data = self
      .request("get_org", args(serde_json::json!({ "reverse_id": reverse_id })))
      .await?;
    Ok(data.get("org").and_then(parse_org))
  }

  /// Create an organization. `None` when the platform refuses it.
  pub async fn create_org(&self, name: &str, reverse_id: &str) -> Result<Option<String>, OpsError> {
    let data = self
      .request(
        "create_org",
        args(serde_json::json!({ "name": name, "reverse_id": reverse_id })),
      )
      .await?;
    Ok(
      value_at(&data, &["orgs", "create", "details", "uid"])
        .and_then(Value::as_str)
        .map(str::to_string),
    )
  }

  /// Invite users to an organization by email. Returns one detail message per
  /// invitation.
  pub async fn invite_to_org(&self, reverse_id: &str, members: &[String]) -> Result<Vec<String>, OpsError> {
    let data = self
      .request(
        "invite_to_org",
        args(serde_json::json!({ "reverse_id": reverse_id, "members": members })),
      )
      .await?;
    Ok(
      value_at(&data, &["org", "addUserByEmail"])
        .and_then(Value::as_array)
        .map(|invites| {
          invites
            .iter()
            .filter_map(|i| i.get("detail").and_then(Value::as_str))
            .map(str::to_string)
            .collect()
        })
        .unwrap_or_default(),
    )
  }

  pub(crate) async fn request(&self, operation: &str, args: Args) -> Result<Value, OpsError> {
    debug!(operation, "remote operation");
    Ok(self.gateway.execute(operation, args).await?)
  }

  /// Run an operation, adding `org_id` when an organization is configured.
  pub(crate) async fn org_request(&self, operation: &str, mut args: Args) -> Result<Value, OpsError> {
    if let Some(org_id) = self.org_id() {
      args.insert("org_id".to_string(), Value::String(org_id.to_string()));
    }
    self.request(operation, args).await
  }
}

/// Turn a JSON object literal into an argument map.
pub(crate) fn args(value: Value) -> Args {
  match value {
    Value::Object(map) => map,
    _ => Args::new(),
  }
}

/// Extract a required string at `path` from an operation response.
pub(crate) fn str_at(
  operation: &'static str,
  data: &Value,
  path: &[&str],
) -> Result<String, OpsError> {
  let (last, parents) = path
    .split_last()
    .ok_or_else(|| ParseError::missing(operation, ""))?;

  Fields::of(operation, data)
    .path(parents)
    .and_then(|f| f.str(last))
    .ok_or_else(|| ParseError::missing(operation, &path.join(".")).into())
}

/// Value at `path`, absent when any step is missing or `null`.
pub(crate) fn value_at<'a>(data: &'a Value, path: &[&str]) -> Option<&'a Value> {
  path
    .iter()
    .try_fold(data, |current, key| current.get(key))
    .filter(|v| !v.is_null())
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::testing::MockGateway;
  use serde_json::json;

  #[test]
  fn test_str_at() {
    let data = json!({ "components": { "create": { "details": { "uid": "c-1" } } } });
    let uid = str_at("create_component", &data, &["components", "create", "details", "uid"]);
    assert_eq!(uid.unwrap(), "c-1");

    let err = str_at("create_component", &json!({}), &["components", "create", "details", "uid"])
      .unwrap_err();
    match err {
      OpsError::Parse(ParseError::MalformedResponse { entity, field }) => {
        assert_eq!(entity, "create_component");
        assert_eq!(field, "components.create.details.uid");
      }
      other => panic!("expected malformed response, got {:?}", other),
    }
  }

  #[tokio::test]
  async fn test_org_management() {
    let gateway = MockGateway::new();
    gateway.respond(
      "create_org",
      json!({ "orgs": { "create": { "details": { "uid": "org-1" } } } }),
    );
    gateway.respond(
      "invite_to_org",
      json!({ "org": { "addUserByEmail": [{ "detail": "invited" }, { "detail": "already member" }] } }),
    );
    let ops = SpaceOps::new(gateway.clone());

    assert_eq!(ops.create_org("Acme", "acme").await.unwrap().as_deref(), Some("org-1"));
    let sent = gateway.last_args("create_org").unwrap();
    assert_eq!(sent["reverse_id"], "acme");
    assert!(sent.get("org_id").is_none());

    let members = vec!["a@acme.test".to_string(), "b@acme.test".to_string()];
    let details = ops.invite_to_org("acme", &members).await.unwrap();
    assert_eq!(details, vec!["invited", "already member"]);
    assert_eq!(gateway.last_args("invite_to_org").unwrap()["members"][1], "b@acme.test");

    gateway.respond("create_org", json!({ "orgs": { "create": {} } }));
    assert!(ops.create_org("Acme", "acme").await.unwrap().is_none());
  }

  #[test]
  fn test_value_at() {
    let data = json!({ "component": { "wipe": true, "gone": null } });
    assert_eq!(value_at(&data, &["component", "wipe"]), Some(&json!(true)));
    assert!(value_at(&data, &["component", "gone"]).is_none());
    assert!(value_at(&data, &["missing", "wipe"]).is_none());
  }
}
