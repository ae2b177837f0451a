use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;
use std::sync::Arc;

use space_ops::SpaceOps;
use space_provider::{CollectionLoader, ComponentProvider, CsvCollectionLoader};
use space_schema::defaults::{
  DEFAULT_BRANCH_NAME, DEFAULT_BRANCH_STATUS, DEFAULT_VERSION_NAME, DEFAULT_VERSION_STATUS,
  DEFAULT_VERSION_UPDATE_MD,
};
use space_schema::{ComponentDescription, LoadedComponent, VersionDescription, VersionMode};
use tracing::{Instrument, debug, info, info_span};

use crate::error::ManagerError;
use crate::version::next_version;

pub(crate) type BoxFuture<'a, T> =
  Pin<Box<dyn Future<Output = Result<T, ManagerError>> + Send + 'a>>;

/// Where a reverse id resolved to.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolved {
  /// A description authored locally, still to be reconciled.
  Local(ComponentDescription),
  /// A component that already exists remotely.
  Remote(LoadedComponent),
}

/// Where the content of a reconciliation lands.
enum VersionTarget {
  /// Realize into an existing version.
  Reuse(String),
  /// Create a version with this name under the branch first.
  Create { branch_id: String, readable_name: String },
}

/// Reconciles component descriptions against the platform.
pub struct ComponentManager {
  ops: SpaceOps,
  provider: Option<Arc<dyn ComponentProvider>>,
  pub(crate) loader: Arc<dyn CollectionLoader>,
  pub(crate) host_id: Option<String>,
  pub(crate) base_dir: Option<PathBuf>,
}

impl ComponentManager {
  pub fn new(ops: SpaceOps) -> Self {
    Self {
      ops,
      provider: None,
      loader: Arc::new(CsvCollectionLoader::new()),
      host_id: None,
      base_dir: None,
    }
  }

  /// Resolve flow members from local descriptions before asking the platform.
  pub fn with_provider(mut self, provider: Arc<dyn ComponentProvider>) -> Self {
    self.provider = Some(provider);
    self
  }

  pub fn with_loader(mut self, loader: Arc<dyn CollectionLoader>) -> Self {
    self.loader = loader;
    self
  }

  /// Host that collections and assets are created on.
  pub fn with_host(mut self, host_id: Option<String>) -> Self {
    self.host_id = host_id;
    self
  }

  /// Directory that collection file paths are relative to.
  pub fn with_base_dir(mut self, base_dir: Option<PathBuf>) -> Self {
    self.base_dir = base_dir;
    self
  }

  pub fn ops(&self) -> &SpaceOps {
    &self.ops
  }

  /// Resolve a reverse id, preferring the local provider over the platform.
  pub async fn lookup(&self, reverse_id: &str) -> Result<Resolved, ManagerError> {
    if let Some(provider) = &self.provider {
      if let Some(desc) = provider.get_by_reverse_id(reverse_id).await? {
        debug!(reverse_id, "resolved_locally");
        return Ok(Resolved::Local(desc));
      }
    }

    match self.ops.get_parsed_component_by_reverse_id(reverse_id).await? {
      Some(loaded) => Ok(Resolved::Remote(loaded)),
      None => Err(ManagerError::NotFound {
        reverse_id: reverse_id.to_string(),
      }),
    }
  }

  /// Fetch a component that must exist.
  pub async fn get(&self, reverse_id: &str) -> Result<LoadedComponent, ManagerError> {
    self
      .ops
      .get_parsed_component_by_reverse_id(reverse_id)
      .await?
      .ok_or_else(|| ManagerError::NotFound {
        reverse_id: reverse_id.to_string(),
      })
  }

  /// Bring the platform in line with `desired` and return the result.
  ///
  /// With [`VersionMode::Default`] an existing component is returned as is,
  /// without any write. Every other mode updates the component metadata and
  /// realizes the content into a new version (or, for
  /// [`VersionMode::Override`], into the active one).
  pub fn reconcile<'a>(
    &'a self,
    desired: &'a ComponentDescription,
    mode: VersionMode,
  ) -> BoxFuture<'a, LoadedComponent> {
    let span = info_span!(
      "reconcile",
      reverse_id = %desired.reverse_id,
      mode = mode.as_str(),
    );

    Box::pin(
      async move {
        let existing = self
          .ops
          .get_parsed_component_by_reverse_id(&desired.reverse_id)
          .await?;

        if let Some(loaded) = &existing {
          if mode == VersionMode::Default {
            debug!(component_id = %loaded.uid, "component_unchanged");
            return Ok(loaded.clone());
          }
        }

        self.register_schemas(desired).await?;
        let target = match &existing {
          Some(loaded) => self.prepare_update(desired, loaded, mode).await?,
          None => self.prepare_create(desired).await?,
        };

        let version_id = match target {
          VersionTarget::Reuse(version_id) => version_id,
          VersionTarget::Create {
            branch_id,
            readable_name,
          } => {
            let requested = desired.version.clone().unwrap_or_default();
            let version = VersionDescription {
              readable_name: Some(readable_name),
              updates_markdown: requested
                .updates_markdown
                .or_else(|| Some(DEFAULT_VERSION_UPDATE_MD.to_string())),
              status: requested
                .status
                .or_else(|| Some(DEFAULT_VERSION_STATUS.to_string())),
              commit_digest: requested.commit_digest,
            };
            let version_id = self.ops.create_version(&branch_id, &version).await?;
            info!(
              version_id = %version_id,
              version = version.readable_name.as_deref().unwrap_or_default(),
              "version_created"
            );
            version_id
          }
        };

        self.realize(desired, &version_id).await
      }
      .instrument(span),
    )
  }

  async fn prepare_update(
    &self,
    desired: &ComponentDescription,
    loaded: &LoadedComponent,
    mode: VersionMode,
  ) -> Result<VersionTarget, ManagerError> {
    self.ops.update_component(&loaded.uid, desired).await?;
    self.attach_metadata(&loaded.uid, desired).await?;
    if let Some(org_id) = self.ops.org_id() {
      self.ops.add_comp_to_org(&loaded.uid, org_id).await?;
    }

    let (branch_id, previous) = match desired.branch_name() {
      Some(name) => match self.ops.get_branch_by_name(&loaded.uid, name).await? {
        Some(branch) => (
          branch.uid,
          branch.active_version.and_then(|v| v.readable_name),
        ),
        None => {
          let status = desired
            .branch
            .as_ref()
            .and_then(|b| b.status.as_deref())
            .unwrap_or(DEFAULT_BRANCH_STATUS);
          let branch_id = self.ops.create_branch(&loaded.uid, name, status).await?;
          info!(branch = name, branch_id = %branch_id, "branch_created");
          (branch_id, None)
        }
      },
      None => {
        let branch = loaded
          .branch
          .as_ref()
          .ok_or_else(|| ManagerError::MissingBranch {
            reverse_id: desired.reverse_id.clone(),
          })?;
        (branch.uid.clone(), loaded.version_name().map(str::to_string))
      }
    };

    if mode == VersionMode::Override {
      let version = loaded
        .version
        .as_ref()
        .ok_or_else(|| ManagerError::MissingVersion {
          reverse_id: desired.reverse_id.clone(),
        })?;
      debug!(version_id = %version.uid, "overriding_active_version");
      return Ok(VersionTarget::Reuse(version.uid.clone()));
    }

    let readable_name = desired
      .version_name()
      .map(str::to_string)
      .unwrap_or_else(|| next_version(previous.as_deref(), mode));
    Ok(VersionTarget::Create {
      branch_id,
      readable_name,
    })
  }

  async fn prepare_create(&self, desired: &ComponentDescription) -> Result<VersionTarget, ManagerError> {
    let comp_id = self.ops.create_component(desired).await?;
    info!(component_id = %comp_id, "component_created");
    self.attach_metadata(&comp_id, desired).await?;

    let branch = desired.branch.clone().unwrap_or_default();
    let branch_id = self
      .ops
      .create_branch(
        &comp_id,
        branch.name.as_deref().unwrap_or(DEFAULT_BRANCH_NAME),
        branch.status.as_deref().unwrap_or(DEFAULT_BRANCH_STATUS),
      )
      .await?;

    Ok(VersionTarget::Create {
      branch_id,
      readable_name: desired
        .version_name()
        .unwrap_or(DEFAULT_VERSION_NAME)
        .to_string(),
    })
  }

  /// Attach use cases and tags. Tags are attached in one call.
  async fn attach_metadata(&self, comp_id: &str, desired: &ComponentDescription) -> Result<(), ManagerError> {
    let use_cases = desired
      .designed_for_use_case
      .iter()
      .map(|u| (u, true))
      .chain(desired.not_designed_for_use_case.iter().map(|u| (u, false)));
    for (use_case, designed) in use_cases {
      let use_case_id = self.ops.create_use_case(use_case).await?;
      self.ops.attach_use_case(comp_id, &use_case_id, designed).await?;
    }

    if !desired.tags.is_empty() {
      let mut tag_ids = Vec::with_capacity(desired.tags.len());
      for tag in &desired.tags {
        tag_ids.push(self.ops.create_tag(tag).await?);
      }
      self.ops.attach_tag_to_comp(comp_id, &tag_ids).await?;
    }
    Ok(())
  }

  /// Register the schemas a component needs. Existing schemas are left alone.
  async fn register_schemas(&self, desired: &ComponentDescription) -> Result<(), ManagerError> {
    for schema in &desired.required_schema {
      if self.ops.get_schema(&schema.core_id).await?.is_some() {
        debug!(core_id = %schema.core_id, "schema_exists");
        continue;
      }
      self
        .ops
        .create_schema(&schema.core_id, &schema.schema_data)
        .await?;
    }
    Ok(())
  }
}
