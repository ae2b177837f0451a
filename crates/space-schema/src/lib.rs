//! Space Schema
//!
//! This crate contains the data model of the Space SDK.
//!
//! Two families of types live here:
//! - Descriptions ([`ComponentDescription`] and everything it embeds) are
//!   authored by the caller, usually as JSON files, and describe the desired
//!   state of a component.
//! - Loaded entities ([`LoadedComponent`] and friends) are produced by the
//!   response parser and describe a component as it exists remotely.
//!
//! Descriptions carry at most one content payload. This is enforced by
//! modelling the payload as the closed [`ComponentContent`] sum type.

mod app;
mod component;
pub mod defaults;
mod flow;
mod loaded;
mod run;

pub use app::{App, Cfg, Op, OpArg, OpRequirement, OpType};
pub use component::{
  Asset, BranchDescription, CollectionAlias, ComponentContent, ComponentDescription, ComponentType,
  SchemaMetadata, UseCase, VersionDescription, VersionMode,
};
pub use flow::{
  ActiveCfg, Flow, InFlowApp, InFlowComponent, InFlowDependency, Limits, OpSelector, SchemaAlias,
  Terminal,
};
pub use loaded::{
  LoadedApp, LoadedAsset, LoadedBranch, LoadedCfg, LoadedCollectionAlias, LoadedComponent,
  LoadedContent, LoadedFlow, LoadedInFlowApp, LoadedInFlowCollection, LoadedInFlowComponent,
  LoadedInFlowFlow, LoadedOp, LoadedOpRequirement, LoadedSchema, LoadedVersion,
};
pub use run::{
  Invocation, InvokePayload, LoadedEndpoint, LoadedHost, LoadedOrg, LoadedServiceAccount,
  LoadedTask, ResultSchema, RunCompStatus, RunStatus, RunStatusEvent, TaskIdentity,
  TaskStartSchema,
};
