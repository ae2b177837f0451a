use std::pin::Pin;

use async_trait::async_trait;
use futures::Stream;
use serde_json::{Map, Value};

use crate::error::GatewayError;

/// Arguments of a remote operation.
pub type Args = Map<String, Value>;

/// A boxed stream of raw subscription payloads.
pub type ValueStream = Pin<Box<dyn Stream<Item = Result<Value, GatewayError>> + Send>>;

/// Executes named remote operations.
///
/// Implementations return the `data` part of the response untouched. Any
/// failure surfaces as a [`GatewayError`]; implementations do not retry.
#[async_trait]
pub trait Gateway: Send + Sync {
  /// Execute a query or mutation.
  async fn execute(&self, operation: &str, args: Args) -> Result<Value, GatewayError>;

  /// Open a subscription. The stream ends when the server completes it or
  /// when it is dropped.
  async fn subscribe(&self, operation: &str, args: Args) -> Result<ValueStream, GatewayError>;
}
