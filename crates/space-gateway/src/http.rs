use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::AUTHORIZATION;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::debug;

use crate::auth::fetch_token;
use crate::config::SpaceConfig;
use crate::documents::DocumentSet;
use crate::error::GatewayError;
use crate::gateway::{Args, Gateway, ValueStream};
use crate::subscription;

#[derive(Debug, Deserialize)]
pub(crate) struct GraphQlResponse {
  #[serde(default)]
  data: Option<Value>,
  #[serde(default)]
  errors: Vec<GraphQlErrorMessage>,
}

#[derive(Debug, Deserialize)]
struct GraphQlErrorMessage {
  message: String,
}

/// Split a GraphQL response into its data or its errors.
pub(crate) fn into_data(operation: &str, response: GraphQlResponse) -> Result<Value, GatewayError> {
  if !response.errors.is_empty() {
    return Err(GatewayError::GraphQl {
      operation: operation.to_string(),
      messages: response.errors.into_iter().map(|e| e.message).collect(),
    });
  }
  Ok(response.data.unwrap_or(Value::Null))
}

/// Gateway speaking GraphQL over HTTP, with subscriptions over WebSocket.
pub struct HttpGateway {
  client: Client,
  graphql_url: String,
  ws_url: Option<String>,
  token: String,
  documents: DocumentSet,
}

impl HttpGateway {
  /// Create a gateway from an already acquired token.
  pub fn new(
    client: Client,
    graphql_url: impl Into<String>,
    ws_url: Option<String>,
    token: impl Into<String>,
    documents: DocumentSet,
  ) -> Self {
    Self {
      client,
      graphql_url: graphql_url.into(),
      ws_url,
      token: token.into(),
      documents,
    }
  }

  /// Load documents, authenticate and build a gateway from configuration.
  pub async fn connect(config: &SpaceConfig) -> Result<Self, GatewayError> {
    let client = Client::builder().timeout(config.timeout()).build()?;
    let documents = DocumentSet::load_dir(&config.documents_dir).await?;
    debug!(documents = documents.len(), "loaded operation documents");

    let token = fetch_token(&client, &config.auth_url, &config.username, &config.password).await?;

    Ok(Self::new(
      client,
      config.graphql_url.clone(),
      config.ws_url.clone(),
      token,
      documents,
    ))
  }

  fn document(&self, operation: &str) -> Result<&str, GatewayError> {
    self
      .documents
      .get(operation)
      .ok_or_else(|| GatewayError::UnknownOperation(operation.to_string()))
  }
}

#[async_trait]
impl Gateway for HttpGateway {
  async fn execute(&self, operation: &str, args: Args) -> Result<Value, GatewayError> {
    let document = self.document(operation)?;
    debug!(operation, "executing remote operation");

    let response = self
      .client
      .post(&self.graphql_url)
      .header(AUTHORIZATION, format!("Bearer {}", self.token))
      .json(&json!({ "query": document, "variables": args }))
      .send()
      .await?;

    let status = response.status();
    if !status.is_success() {
      let body = response.text().await.unwrap_or_default();
      return Err(GatewayError::Status {
        status: status.as_u16(),
        body,
      });
    }

    let body: GraphQlResponse = response.json().await?;
    into_data(operation, body)
  }

  async fn subscribe(&self, operation: &str, args: Args) -> Result<ValueStream, GatewayError> {
    let document = self.document(operation)?;
    let ws_url = self
      .ws_url
      .as_deref()
      .ok_or_else(|| GatewayError::Config("ws_url is required for subscriptions".to_string()))?;
    debug!(operation, "opening subscription");

    subscription::open(ws_url, &self.token, operation, document, args).await
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_into_data_returns_data() {
    let response: GraphQlResponse =
      serde_json::from_value(json!({ "data": { "tags": { "create": "t-1" } } })).unwrap();
    let data = into_data("create_tag", response).unwrap();
    assert_eq!(data["tags"]["create"], "t-1");
  }

  #[test]
  fn test_into_data_surfaces_errors() {
    let response: GraphQlResponse = serde_json::from_value(json!({
      "data": null,
      "errors": [{ "message": "forbidden" }, { "message": "try again" }]
    }))
    .unwrap();

    match into_data("create_tag", response) {
      Err(GatewayError::GraphQl {
        operation,
        messages,
      }) => {
        assert_eq!(operation, "create_tag");
        assert_eq!(messages, vec!["forbidden", "try again"]);
      }
      other => panic!("expected graphql error, got {:?}", other),
    }
  }

  #[tokio::test]
  async fn test_unknown_operation() {
    let gateway = HttpGateway::new(
      Client::new(),
      "http://localhost:1/graphql",
      None,
      "token",
      DocumentSet::new(),
    );

    let result = gateway.execute("missing", Args::new()).await;
    assert!(matches!(result, Err(GatewayError::UnknownOperation(op)) if op == "missing"));
  }

  #[tokio::test]
  async fn test_subscribe_requires_ws_url() {
    let mut documents = DocumentSet::new();
    documents.insert("subscribe_to_status", "subscription { runStatus { task { status } } }");
    let gateway = HttpGateway::new(
      Client::new(),
      "http://localhost:1/graphql",
      None,
      "token",
      documents,
    );

    let result = gateway.subscribe("subscribe_to_status", Args::new()).await;
    assert!(matches!(result, Err(GatewayError::Config(_))));
  }
}
