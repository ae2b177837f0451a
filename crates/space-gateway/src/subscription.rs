//! Subscriptions over the `graphql-transport-ws` protocol.

use futures::{SinkExt, StreamExt};
use serde_json::{Value, json};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::debug;

use crate::error::GatewayError;
use crate::gateway::{Args, ValueStream};
use crate::http::{GraphQlResponse, into_data};

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

const PROTOCOL: &str = "graphql-transport-ws";
const SUBSCRIPTION_ID: &str = "1";

/// A decoded protocol message.
#[derive(Debug, PartialEq)]
enum Frame {
  Ack,
  Next(Value),
  Ping,
  Complete,
  Ignored,
}

fn parse_frame(operation: &str, text: &str) -> Result<Frame, GatewayError> {
  let message: Value = serde_json::from_str(text)?;
  let kind = message.get("type").and_then(Value::as_str).unwrap_or_default();

  match kind {
    "connection_ack" => Ok(Frame::Ack),
    "ping" => Ok(Frame::Ping),
    "complete" => Ok(Frame::Complete),
    "next" => {
      let payload = message.get("payload").cloned().unwrap_or(Value::Null);
      let response: GraphQlResponse = serde_json::from_value(payload)?;
      into_data(operation, response).map(Frame::Next)
    }
    "error" => {
      let messages = message
        .get("payload")
        .and_then(Value::as_array)
        .map(|errors| {
          errors
            .iter()
            .filter_map(|e| e.get("message").and_then(Value::as_str))
            .map(str::to_string)
            .collect()
        })
        .unwrap_or_default();
      Err(GatewayError::GraphQl {
        operation: operation.to_string(),
        messages,
      })
    }
    _ => Ok(Frame::Ignored),
  }
}

async fn send(socket: &mut Socket, message: Value) -> Result<(), GatewayError> {
  socket.send(Message::text(message.to_string())).await?;
  Ok(())
}

async fn next_frame(socket: &mut Socket, operation: &str) -> Result<Frame, GatewayError> {
  match socket.next().await {
    None | Some(Ok(Message::Close(_))) => Ok(Frame::Complete),
    Some(Ok(Message::Text(text))) => parse_frame(operation, text.as_str()),
    Some(Ok(_)) => Ok(Frame::Ignored),
    Some(Err(e)) => Err(e.into()),
  }
}

/// Connect, authenticate and start a subscription.
pub(crate) async fn open(
  ws_url: &str,
  token: &str,
  operation: &str,
  document: &str,
  variables: Args,
) -> Result<ValueStream, GatewayError> {
  let mut request = ws_url.into_client_request()?;
  request
    .headers_mut()
    .insert("Sec-WebSocket-Protocol", HeaderValue::from_static(PROTOCOL));

  let (mut socket, _) = connect_async(request).await?;

  send(
    &mut socket,
    json!({
      "type": "connection_init",
      "payload": { "Authorization": format!("Bearer {}", token) }
    }),
  )
  .await?;

  loop {
    match next_frame(&mut socket, operation).await? {
      Frame::Ack => break,
      Frame::Ping => send(&mut socket, json!({ "type": "pong" })).await?,
      Frame::Complete => {
        return Err(GatewayError::Protocol(
          "connection closed before acknowledgement".to_string(),
        ));
      }
      _ => {}
    }
  }

  send(
    &mut socket,
    json!({
      "id": SUBSCRIPTION_ID,
      "type": "subscribe",
      "payload": { "query": document, "variables": variables }
    }),
  )
  .await?;
  debug!(operation, "subscription started");

  let stream = futures::stream::unfold(
    Some((socket, operation.to_string())),
    |state| async move {
      let (mut socket, operation) = state?;
      loop {
        match next_frame(&mut socket, &operation).await {
          Ok(Frame::Next(data)) => return Some((Ok(data), Some((socket, operation)))),
          Ok(Frame::Ping) => {
            if let Err(e) = send(&mut socket, json!({ "type": "pong" })).await {
              return Some((Err(e), None));
            }
          }
          Ok(Frame::Complete) => {
            let _ = socket.close(None).await;
            return None;
          }
          Ok(Frame::Ack) | Ok(Frame::Ignored) => {}
          Err(e) => return Some((Err(e), None)),
        }
      }
    },
  );

  Ok(Box::pin(stream))
}
