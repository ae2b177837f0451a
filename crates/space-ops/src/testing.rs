use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::Value;
use space_gateway::{Args, Gateway, GatewayError, ValueStream};

/// Gateway answering each operation with a canned response and recording
/// every call it receives.
pub(crate) struct MockGateway {
  responses: Mutex<HashMap<String, Value>>,
  pub(crate) calls: Mutex<Vec<(String, Args)>>,
}

impl MockGateway {
  pub(crate) fn new() -> Arc<Self> {
    Arc::new(Self {
      responses: Mutex::new(HashMap::new()),
      calls: Mutex::new(Vec::new()),
    })
  }

  pub(crate) fn respond(&self, operation: &str, data: Value) {
    self
      .responses
      .lock()
      .unwrap()
      .insert(operation.to_string(), data);
  }

  pub(crate) fn last_args(&self, operation: &str) -> Option<Args> {
    self
      .calls
      .lock()
      .unwrap()
      .iter()
      .rev()
      .find(|(op, _)| op == operation)
      .map(|(_, args)| args.clone())
  }
}

#[async_trait]
impl Gateway for MockGateway {
  async fn execute(&self, operation: &str, args: Args) -> Result<Value, GatewayError> {
    self
      .calls
      .lock()
      .unwrap()
      .push((operation.to_string(), args));
    self
      .responses
      .lock()
      .unwrap()
      .get(operation)
      .cloned()
      .ok_or_else(|| GatewayError::UnknownOperation(operation.to_string()))
  }

  async fn subscribe(&self, operation: &str, _args: Args) -> Result<ValueStream, GatewayError> {
    Err(GatewayError::UnknownOperation(operation.to_string()))
  }
}
