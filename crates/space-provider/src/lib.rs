//! Space Provider
//!
//! Local collaborators of the reconciliation engine:
//! - [`ComponentProvider`] resolves a reverse id to a component description
//!   authored locally, before the engine falls back to the remote side.
//! - [`CollectionLoader`] reads the rows of a collection file so they can be
//!   uploaded as documents.

mod error;
mod fs_provider;
mod loader;
mod provider;

pub use error::ProviderError;
pub use fs_provider::FsComponentProvider;
pub use loader::{CollectionLoader, CsvCollectionLoader};
pub use provider::ComponentProvider;
