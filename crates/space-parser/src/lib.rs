//! Space Parser
//!
//! Pure functions turning raw, deeply nested API responses into the typed
//! entities of `space-schema`.
//!
//! Every nested key of a response may be missing, `null`, or an empty edge
//! list. All of those decode to "absent" ([`None`] or an empty `Vec`). The
//! only hard failure is a missing primary identifier on an entity that is
//! present, reported as [`ParseError::MalformedResponse`].
//!
//! Members of a flow may themselves reference upstream members (`prev`);
//! those are decoded recursively, as deep as the response nests them.

mod component;
mod error;
mod fields;
mod flow;
mod run;

pub use component::{parse_asset, parse_branch, parse_component, parse_ops, parse_version};
pub use error::ParseError;
pub use fields::Fields;
pub use flow::{parse_flow, parse_in_flow_component};
pub use run::{
  parse_endpoint, parse_host, parse_invocation, parse_org, parse_results, parse_run_status,
  parse_snapshot, parse_status_event, parse_task_identity, parse_task_start_schema, parse_tasks,
};
