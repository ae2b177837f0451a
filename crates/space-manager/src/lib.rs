//! Space Manager
//!
//! The reconciliation engine. Given the desired state of a component as a
//! [`ComponentDescription`](space_schema::ComponentDescription), the
//! [`ComponentManager`] brings the remote platform in line with it:
//!
//! 1. Fetch the component by reverse id. Absent means "create".
//! 2. Decide the version strategy from the [`VersionMode`](space_schema::VersionMode):
//!    reuse, bump, override, or create the first version.
//! 3. Create the version under the resolved branch and realize its content.
//!    Flows are assembled in two passes: every member is placed first, then
//!    dependencies are linked, so members may depend on aliases declared
//!    later in the flow.
//! 4. Re-fetch and return the component.
//!
//! All remote calls are issued one at a time, in program order. Nothing is
//! rolled back on failure.

mod error;
mod flow;
mod manager;
mod realize;
pub mod version;

pub use error::ManagerError;
pub use manager::{ComponentManager, Resolved};
pub use version::next_version;
