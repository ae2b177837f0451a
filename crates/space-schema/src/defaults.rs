//! Defaults applied when a description leaves a field unset.

pub const DEFAULT_BRANCH_NAME: &str = "main";
pub const DEFAULT_BRANCH_STATUS: &str = "active";
pub const DEFAULT_VERSION_NAME: &str = "0.0.1";
pub const DEFAULT_VERSION_STATUS: &str = "active";
pub const DEFAULT_VERSION_UPDATE_MD: &str = "Initial version";

/// Base used when bumping a component that has no previous version name.
pub const BASE_VERSION_NAME: &str = "0.0.0";
