use std::collections::HashSet;

use indexmap::IndexMap;
use space_ops::{InFlowPlacement, Link, OpSelection};
use space_schema::{
  ActiveCfg, Flow, InFlowComponent, LoadedApp, LoadedComponent, OpSelector, OpType, VersionMode,
};
use tracing::{Instrument, debug, info, info_span, warn};

use crate::error::ManagerError;
use crate::manager::{BoxFuture, ComponentManager, Resolved};

/// A member after it was placed in the flow.
#[derive(Debug)]
pub(crate) struct PlacedMember {
  pub component: LoadedComponent,
  pub in_flow_id: String,
}

/// Check that aliases are unique and every dependency names a declared member.
pub(crate) fn validate_aliases(flow: &Flow) -> Result<(), ManagerError> {
  let mut declared: HashSet<&str> = HashSet::with_capacity(flow.components.len());
  for member in &flow.components {
    if !declared.insert(member.alias.as_str()) {
      return Err(ManagerError::DuplicateAlias {
        alias: member.alias.clone(),
      });
    }
  }

  for member in &flow.components {
    let referenced = member.depends.values().filter_map(|d| d.alias.as_deref());
    for alias in referenced {
      if !declared.contains(alias) {
        return Err(ManagerError::MissingAlias {
          alias: alias.to_string(),
          member: member.alias.clone(),
        });
      }
    }
  }
  Ok(())
}

/// Ops of `app` selected by core id, grouped by op type in order of first
/// appearance.
pub(crate) fn select_ops(app: &LoadedApp, selection: &[OpSelector]) -> Vec<OpSelection> {
  let wanted: HashSet<&str> = selection.iter().map(|s| s.core_id.as_str()).collect();

  let mut groups: IndexMap<Option<OpType>, Vec<String>> = IndexMap::new();
  for op in &app.ops {
    if op.core_id.as_deref().is_some_and(|id| wanted.contains(id)) {
      groups.entry(op.op_type).or_default().push(op.uid.clone());
    }
  }

  groups
    .into_iter()
    .map(|(op_type, op_ids)| OpSelection { op_type, op_ids })
    .collect()
}

impl ComponentManager {
  /// Realize a flow under a version.
  ///
  /// Members are placed first and linked afterwards, so a dependency may name
  /// a member declared later in the flow.
  pub(crate) fn assemble_flow<'a>(
    &'a self,
    reverse_id: &'a str,
    flow: &'a Flow,
    version_id: &'a str,
  ) -> BoxFuture<'a, LoadedComponent> {
    let span = info_span!(
      "assemble_flow",
      reverse_id = %reverse_id,
      members = flow.components.len(),
    );

    Box::pin(
      async move {
        validate_aliases(flow)?;

        let flow_id = match self.ops().get_flow_by_version_id(version_id).await? {
          Some(flow_id) => flow_id,
          None => self.ops().create_flow_in_version(version_id, flow.is_demo).await?,
        };

        let placed = self.place_members(&flow_id, flow).await?;
        self.wire_members(&flow_id, flow, &placed).await?;
        info!(flow_id = %flow_id, members = placed.len(), "flow_assembled");

        self.get(reverse_id).await
      }
      .instrument(span),
    )
  }

  async fn place_members(
    &self,
    flow_id: &str,
    flow: &Flow,
  ) -> Result<IndexMap<String, PlacedMember>, ManagerError> {
    let mut placed = IndexMap::with_capacity(flow.components.len());

    for member in &flow.components {
      // Members are never bumped by the flow that contains them.
      let component = match self.lookup(&member.reverse_id).await? {
        Resolved::Remote(loaded) => loaded,
        Resolved::Local(desc) => self.reconcile(&desc, VersionMode::Default).await?,
      };
      let version_id = component
        .version
        .as_ref()
        .map(|v| v.uid.clone())
        .ok_or_else(|| ManagerError::MissingVersion {
          reverse_id: member.reverse_id.clone(),
        })?;

      let selected_op = match (&member.app, component.app()) {
        (Some(selection), Some(app)) => select_ops(app, &selection.active_op),
        _ => Vec::new(),
      };

      let in_flow_id = self
        .ops()
        .add_comp_in_flow(&InFlowPlacement {
          flow_id,
          alias: &member.alias,
          version_id: &version_id,
          offset_x: member.offset_x,
          offset_y: member.offset_y,
          limits: member.limits.as_ref(),
          selected_op,
        })
        .await?;
      debug!(alias = %member.alias, in_flow_id = %in_flow_id, "member_placed");

      if let Some(cfg) = &member.active_cfg {
        self.activate_cfg(flow_id, &in_flow_id, member, cfg).await?;
      }

      placed.insert(
        member.alias.clone(),
        PlacedMember {
          component,
          in_flow_id,
        },
      );
    }
    Ok(placed)
  }

  async fn activate_cfg(
    &self,
    flow_id: &str,
    in_flow_id: &str,
    member: &InFlowComponent,
    cfg: &ActiveCfg,
  ) -> Result<(), ManagerError> {
    let core_name = match cfg {
      ActiveCfg::Named(name) => name.as_str(),
      ActiveCfg::Inline(inline) => {
        self.ops().create_cfg_standalone(inline).await?;
        match inline.core_name.as_deref() {
          Some(core_name) => core_name,
          None => {
            warn!(alias = %member.alias, "inline_cfg_without_core_name");
            return Ok(());
          }
        }
      }
    };

    self
      .ops()
      .set_in_flow_component_cfg(flow_id, in_flow_id, core_name)
      .await?;
    Ok(())
  }

  async fn wire_members(
    &self,
    flow_id: &str,
    flow: &Flow,
    placed: &IndexMap<String, PlacedMember>,
  ) -> Result<(), ManagerError> {
    for member in &flow.components {
      for (key, dep) in &member.depends {
        let Some(alias) = dep.alias.as_deref() else {
          warn!(member = %member.alias, dependency = %key, "dependency_without_alias");
          continue;
        };
        let start = endpoint(placed, alias, &member.alias)?;
        let target = endpoint(placed, &member.alias, &member.alias)?;

        let base = Link {
          flow_id,
          start_id: &start.in_flow_id,
          target_id: &target.in_flow_id,
          as_collection: dep.as_collection.as_deref(),
          ..Default::default()
        };

        if dep.terminals.is_empty() {
          self
            .ops()
            .link(&Link {
              order: dep.order,
              ..base.clone()
            })
            .await?;
        } else {
          for terminal in &dep.terminals {
            self
              .ops()
              .link(&Link {
                start_terminal_id: Some(terminal.src.as_str()),
                target_terminal_id: Some(terminal.target.as_str()),
                order: terminal.order.or(dep.order),
                ..base.clone()
              })
              .await?;
          }
        }

        for schema_alias in &dep.schema_aliases {
          self
            .ops()
            .add_schema_alias(
              flow_id,
              &start.in_flow_id,
              &target.in_flow_id,
              &schema_alias.src,
              &schema_alias.target,
            )
            .await?;
        }

        debug!(
          from = start.component.reverse_id.as_deref().unwrap_or(alias),
          to = target.component.reverse_id.as_deref().unwrap_or(&member.alias),
          "members_linked"
        );
      }
    }
    Ok(())
  }
}

fn endpoint<'a>(
  placed: &'a IndexMap<String, PlacedMember>,
  alias: &str,
  member: &str,
) -> Result<&'a PlacedMember, ManagerError> {
  placed.get(alias).ok_or_else(|| ManagerError::MissingAlias {
    alias: alias.to_string(),
    member: member.to_string(),
  })
}
