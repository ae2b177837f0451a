use std::collections::VecDeque;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;

use futures::{Stream, StreamExt};
use serde_json::{Value, json};
use space_gateway::ValueStream;
use space_parser::parse_status_event;
use space_schema::RunStatusEvent;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::error::OpsError;
use crate::ops::{SpaceOps, args, value_at};

type EventStream = Pin<Box<dyn Stream<Item = Result<RunStatusEvent, OpsError>> + Send>>;

/// Live status feed of a run.
///
/// Events are pulled on demand. The stream ends when the caller's token is
/// cancelled, when [`StatusStream::close`] is called, or when the remote feed
/// completes. If no update arrives within the timeout, a final
/// [`OpsError::StatusTimeout`] is yielded. Once ended it cannot be restarted.
pub struct StatusStream {
  inner: EventStream,
  close: CancellationToken,
}

impl StatusStream {
  fn new(feed: ValueStream, timeout: Duration, cancel: &CancellationToken) -> Self {
    let close = cancel.child_token();
    let state = FeedState {
      feed,
      pending: VecDeque::new(),
      timeout,
      cancel: close.clone(),
    };

    let inner = futures::stream::unfold(Some(state), |state| async move {
      let mut state = state?;
      loop {
        if state.cancel.is_cancelled() {
          return None;
        }
        if let Some(event) = state.pending.pop_front() {
          return Some((Ok(event), Some(state)));
        }

        let next = tokio::select! {
          biased;
          _ = state.cancel.cancelled() => return None,
          next = tokio::time::timeout(state.timeout, state.feed.next()) => next,
        };

        match next {
          Err(_) => return Some((Err(OpsError::StatusTimeout(state.timeout)), None)),
          Ok(None) => return None,
          Ok(Some(Err(e))) => return Some((Err(e.into()), None)),
          Ok(Some(Ok(payload))) => {
            if let Err(e) = state.push(&payload) {
              return Some((Err(e), None));
            }
          }
        }
      }
    });

    Self {
      inner: Box::pin(inner),
      close,
    }
  }

  /// End the stream. Pending and future events are dropped.
  pub fn close(&self) {
    self.close.cancel();
  }

  pub fn is_closed(&self) -> bool {
    self.close.is_cancelled()
  }
}

impl Stream for StatusStream {
  type Item = Result<RunStatusEvent, OpsError>;

  fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
    self.inner.as_mut().poll_next(cx)
  }
}

struct FeedState {
  feed: ValueStream,
  pending: VecDeque<RunStatusEvent>,
  timeout: Duration,
  cancel: CancellationToken,
}

impl FeedState {
  /// Queue every event of one subscription payload.
  fn push(&mut self, payload: &Value) -> Result<(), OpsError> {
    let entries = value_at(payload, &["runStatus"])
      .and_then(Value::as_array)
      .map(Vec::as_slice)
      .unwrap_or_default();

    for entry in entries {
      if let Some(event) = parse_status_event(entry)? {
        self.pending.push_back(event);
      }
    }
    Ok(())
  }
}

impl SpaceOps {
  /// Subscribe to the status feed of a run.
  pub async fn subscribe_to_status(
    &self,
    run_id: &str,
    timeout: Duration,
    cancel: &CancellationToken,
  ) -> Result<StatusStream, OpsError> {
    let feed = self
      .gateway()
      .subscribe("subscribe_to_status", args(json!({ "run_id": run_id })))
      .await?;
    debug!(run_id, "subscribed to run status");
    Ok(StatusStream::new(feed, timeout, cancel))
  }
}
