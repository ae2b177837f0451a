//! Space Ops
//!
//! [`SpaceOps`] wraps every remote operation the SDK issues in a typed
//! method. Each method names its operation, builds the argument map, sends it
//! through the [`Gateway`](space_gateway::Gateway) and extracts the fields it
//! needs from the nested response.
//!
//! Operations that create shared resources are org-scoped: when an
//! organization is configured its id is injected as `org_id`.

mod component;
mod content;
mod error;
mod flow;
mod ops;
mod run;
mod status;

#[cfg(test)]
mod testing;

pub use error::OpsError;
pub use flow::{FlowMember, InFlowPlacement, Link, OpSelection};
pub use ops::SpaceOps;
pub use run::SnapshotSource;
pub use status::StatusStream;
