//! Space Gateway
//!
//! The gateway executes named remote operations against the Space API. The
//! rest of the SDK only sees the [`Gateway`] trait: an operation name plus a
//! JSON argument map in, a raw nested JSON response out.
//!
//! [`HttpGateway`] is the production implementation. Queries and mutations
//! go over HTTP, subscriptions over a `graphql-transport-ws` WebSocket. The
//! GraphQL documents themselves are opaque to the SDK and are supplied as a
//! [`DocumentSet`] keyed by operation name.

mod auth;
mod config;
mod documents;
mod error;
mod gateway;
mod http;
mod subscription;

pub use auth::fetch_token;
pub use config::SpaceConfig;
pub use documents::DocumentSet;
pub use error::GatewayError;
pub use gateway::{Args, Gateway, ValueStream};
pub use http::HttpGateway;
