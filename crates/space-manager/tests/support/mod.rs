//! In-memory stand-in for the Space platform.
//!
//! Answers the operations the manager issues with responses shaped like the
//! real API, so reconciled components can be fetched back and parsed.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{Value, json};
use space_gateway::{Args, Gateway, GatewayError, ValueStream};
use space_manager::ComponentManager;
use space_ops::SpaceOps;

struct Component {
  uid: String,
  reverse_id: String,
  name: String,
  description: String,
  kind: String,
  active_branch: Option<String>,
}

struct Branch {
  uid: String,
  component_id: String,
  name: String,
  status: String,
  active_version: Option<String>,
}

#[derive(Default)]
struct Version {
  uid: String,
  readable_name: String,
  updates_markdown: Value,
  status: Value,
  app: Option<String>,
  flow: Option<String>,
  collection: Option<String>,
  asset: Option<Value>,
}

struct AppRecord {
  uid: String,
  container_ref: Value,
  ops: Vec<(String, String)>,
  cfgs: Vec<String>,
}

struct Member {
  uid: String,
  alias: String,
  version_id: String,
  cfg: Option<String>,
  prev: Vec<String>,
}

#[derive(Default)]
struct State {
  next_id: u64,
  components: Vec<Component>,
  branches: HashMap<String, Branch>,
  versions: HashMap<String, Version>,
  apps: HashMap<String, AppRecord>,
  ops: HashMap<String, Value>,
  cfgs: HashMap<String, Value>,
  flows: HashMap<String, Vec<Member>>,
  collections: HashMap<String, Value>,
  schemas: HashMap<String, String>,
}

impl State {
  fn id(&mut self, prefix: &str) -> String {
    self.next_id += 1;
    format!("{}-{}", prefix, self.next_id)
  }

  fn component_of_version(&self, version_id: &str) -> Option<&Component> {
    let branch = self
      .branches
      .values()
      .find(|b| b.active_version.as_deref() == Some(version_id))?;
    self.components.iter().find(|c| c.uid == branch.component_id)
  }

  fn component_json(&self, component: &Component) -> Value {
    let branch = component
      .active_branch
      .as_ref()
      .and_then(|id| self.branches.get(id));
    let version = branch
      .and_then(|b| b.active_version.as_ref())
      .and_then(|id| self.versions.get(id));

    json!({
      "details": {
        "uid": component.uid,
        "name": component.name,
        "reverseId": component.reverse_id,
        "descriptionMarkdown": component.description,
        "type": component.kind,
      },
      "activeBranch": branch.map(|b| json!({
        "details": { "uid": b.uid, "name": b.name, "status": b.status }
      })),
      "activeBranchVersion": version.map(|v| self.version_json(v)),
    })
  }

  fn version_json(&self, version: &Version) -> Value {
    json!({
      "details": {
        "uid": version.uid,
        "readableName": version.readable_name,
        "updatesMarkdown": version.updates_markdown,
        "status": version.status,
      },
      "app": version.app.as_ref().and_then(|id| self.apps.get(id)).map(|a| self.app_json(a)),
      "flow": version.flow.as_ref().map(|id| self.flow_json(id)),
      "collection": version.collection.as_ref().and_then(|id| self.collections.get(id)).map(|c| json!({ "details": c })),
      "asset": version.asset,
    })
  }

  fn app_json(&self, app: &AppRecord) -> Value {
    let ops: Vec<Value> = app
      .ops
      .iter()
      .map(|(op_id, op_type)| {
        json!({ "node": { "details": self.ops.get(op_id) }, "rel": { "type": op_type } })
      })
      .collect();
    let cfgs: Vec<Value> = app
      .cfgs
      .iter()
      .map(|cfg_id| json!({ "node": { "details": self.cfgs.get(cfg_id) } }))
      .collect();

    json!({
      "details": { "uid": app.uid, "containerRef": app.container_ref },
      "avOp": { "edges": ops },
      "avCfg": { "edges": cfgs },
    })
  }

  fn flow_json(&self, flow_id: &str) -> Value {
    let members = self.flows.get(flow_id).map(Vec::as_slice).unwrap_or_default();
    let edges: Vec<Value> = members
      .iter()
      .map(|member| {
        let component = self.component_of_version(&member.version_id);
        let prev: Vec<Value> = member
          .prev
          .iter()
          .filter_map(|uid| members.iter().find(|m| &m.uid == uid))
          .map(|m| json!({ "node": { "details": { "uid": m.uid, "alias": m.alias } } }))
          .collect();
        json!({ "node": {
          "details": { "uid": member.uid, "alias": member.alias },
          "component": component.map(|c| json!({
            "details": { "uid": c.uid, "reverseId": c.reverse_id }
          })),
          "prev": { "edges": prev },
          "cfg": member.cfg.as_ref().map(|name| json!({
            "details": { "uid": format!("cfg-{}", name), "coreName": name }
          })),
        } })
      })
      .collect();

    json!({ "details": { "uid": flow_id }, "inFlowComponents": { "edges": edges } })
  }
}

fn text(args: &Args, key: &str) -> String {
  args
    .get(key)
    .and_then(Value::as_str)
    .unwrap_or_default()
    .to_string()
}

/// A recording, in-memory platform.
pub struct FakeSpace {
  state: Mutex<State>,
  calls: Mutex<Vec<(String, Args)>>,
  failing: Mutex<Option<String>>,
}

impl FakeSpace {
  pub fn new() -> Arc<Self> {
    Arc::new(Self {
      state: Mutex::new(State::default()),
      calls: Mutex::new(Vec::new()),
      failing: Mutex::new(None),
    })
  }

  /// Make every call to `operation` fail with a remote error.
  pub fn fail_on(&self, operation: &str) {
    *self.failing.lock().unwrap() = Some(operation.to_string());
  }

  /// Names of the operations issued so far, in order.
  pub fn operations(&self) -> Vec<String> {
    self
      .calls
      .lock()
      .unwrap()
      .iter()
      .map(|(op, _)| op.clone())
      .collect()
  }

  /// Issued operations that change remote state.
  pub fn writes(&self) -> Vec<String> {
    self
      .operations()
      .into_iter()
      .filter(|op| !op.starts_with("get_"))
      .collect()
  }

  pub fn count(&self, operation: &str) -> usize {
    self
      .operations()
      .iter()
      .filter(|op| op.as_str() == operation)
      .count()
  }

  /// Arguments of every call to `operation`, in order.
  pub fn calls_to(&self, operation: &str) -> Vec<Args> {
    self
      .calls
      .lock()
      .unwrap()
      .iter()
      .filter(|(op, _)| op == operation)
      .map(|(_, args)| args.clone())
      .collect()
  }

  pub fn clear_calls(&self) {
    self.calls.lock().unwrap().clear();
  }

  fn handle(&self, operation: &str, args: &Args) -> Result<Value, GatewayError> {
    let mut state = self.state.lock().unwrap();
    let state = &mut *state;

    let response = match operation {
      "get_component_by_reverse_id" => {
        let reverse_id = text(args, "reverse_id");
        let component = state
          .components
          .iter()
          .find(|c| c.reverse_id == reverse_id)
          .map(|c| state.component_json(c));
        json!({ "component": component })
      }
      "create_component" => {
        let uid = state.id("c");
        state.components.push(Component {
          uid: uid.clone(),
          reverse_id: text(args, "reverse_id"),
          name: text(args, "name"),
          description: text(args, "description"),
          kind: text(args, "type"),
          active_branch: None,
        });
        json!({ "components": { "create": { "details": { "uid": uid } } } })
      }
      "update_component" => {
        let comp_id = text(args, "comp_id");
        if let Some(component) = state.components.iter_mut().find(|c| c.uid == comp_id) {
          component.name = text(args, "name");
          component.description = text(args, "description");
        }
        json!({ "component": { "update": { "uid": comp_id } } })
      }
      "add_comp_to_org" => {
        json!({ "component": { "addToOrg": { "details": { "uid": text(args, "comp_id") } } } })
      }
      "create_branch" => {
        let uid = state.id("b");
        let component_id = text(args, "component_id");
        let status = text(args, "status");
        if status == "active" {
          if let Some(component) = state.components.iter_mut().find(|c| c.uid == component_id) {
            component.active_branch = Some(uid.clone());
          }
        }
        state.branches.insert(
          uid.clone(),
          Branch {
            uid: uid.clone(),
            component_id,
            name: text(args, "name"),
            status,
            active_version: None,
          },
        );
        json!({ "component": { "createBranch": { "details": { "uid": uid } } } })
      }
      "get_branch_by_name" => {
        let component_id = text(args, "component_id");
        let name = text(args, "branch_name");
        let edges: Vec<Value> = state
          .branches
          .values()
          .filter(|b| b.component_id == component_id && b.name == name)
          .map(|b| {
            let active = b.active_version.as_ref().and_then(|id| state.versions.get(id));
            json!({ "node": {
              "details": { "uid": b.uid, "name": b.name, "status": b.status },
              "activeVersion": active.map(|v| json!({
                "details": { "uid": v.uid, "readableName": v.readable_name }
              })),
            } })
          })
          .collect();
        json!({ "component": { "branches": { "edges": edges } } })
      }
      "create_version" => {
        let uid = state.id("v");
        let branch_id = text(args, "branch_id");
        if let Some(branch) = state.branches.get_mut(&branch_id) {
          branch.active_version = Some(uid.clone());
        }
        state.versions.insert(
          uid.clone(),
          Version {
            uid: uid.clone(),
            readable_name: text(args, "readable_name"),
            updates_markdown: args.get("updates_markdown").cloned().unwrap_or(Value::Null),
            status: args.get("branch_version_status").cloned().unwrap_or(Value::Null),
            ..Default::default()
          },
        );
        json!({ "branch": { "createVersion": { "uid": uid } } })
      }
      "create_tag" => {
        let uid = state.id("tag");
        json!({ "tags": { "create": { "details": { "uid": uid } } } })
      }
      "attach_tag_to_comp" => json!({ "component": { "attachTags": true } }),
      "create_use_case" => {
        let uid = state.id("uc");
        json!({ "useCases": { "create": { "details": { "uid": uid } } } })
      }
      "attach_use_case" => json!({ "component": { "attachUseCase": { "uid": text(args, "comp_uid") } } }),
      "get_schema" => {
        let core_id = text(args, "core_id");
        let schema = state
          .schemas
          .get(&core_id)
          .map(|uid| json!({ "details": { "uid": uid, "coreId": core_id } }));
        json!({ "schema": schema })
      }
      "create_schema" => {
        let uid = state.id("s");
        state.schemas.insert(text(args, "core_id"), uid.clone());
        json!({ "schemas": { "create": { "details": { "uid": uid } } } })
      }
      "create_app_in_version" => {
        let uid = state.id("a");
        state.apps.insert(
          uid.clone(),
          AppRecord {
            uid: uid.clone(),
            container_ref: args.get("container_ref").cloned().unwrap_or(Value::Null),
            ops: Vec::new(),
            cfgs: Vec::new(),
          },
        );
        if let Some(version) = state.versions.get_mut(&text(args, "version_id")) {
          version.app = Some(uid.clone());
        }
        json!({ "version": { "addUnderlyingApp": { "uid": uid } } })
      }
      "create_cfg_standalone" => {
        let uid = state.id("cfg");
        state.cfgs.insert(
          uid.clone(),
          json!({
            "uid": uid,
            "coreName": args.get("core_name"),
            "readableName": args.get("readable_name"),
            "cfgJson": args.get("cfg_json"),
          }),
        );
        json!({ "configs": { "update": { "uid": uid } } })
      }
      "add_cfg_2_av" => {
        let cfg_id = text(args, "cfg_id");
        if let Some(app) = state.apps.get_mut(&text(args, "app_id")) {
          app.cfgs.push(cfg_id.clone());
        }
        json!({ "app": { "addCfg2Av": { "details": { "uid": cfg_id } } } })
      }
      "create_op" => {
        let uid = state.id("op");
        state
          .ops
          .insert(uid.clone(), json!({ "uid": uid, "coreId": text(args, "core_id") }));
        json!({ "ops": { "create": { "details": { "uid": uid } } } })
      }
      "add_op_2_av" => {
        let op_id = text(args, "op_id");
        if let Some(app) = state.apps.get_mut(&text(args, "app_id")) {
          app.ops.push((op_id.clone(), text(args, "op_type")));
        }
        json!({ "app": { "addOp2Av": { "details": { "uid": op_id } } } })
      }
      "add_dep_2_op" => {
        let uid = state.id("dep");
        json!({ "op": { "addDep": { "details": { "uid": uid } } } })
      }
      "get_flow_by_version_id" => {
        let flow = state
          .versions
          .get(&text(args, "version_id"))
          .and_then(|v| v.flow.clone())
          .map(|uid| json!({ "details": { "uid": uid } }));
        json!({ "version": { "flow": flow } })
      }
      "create_flow_in_version" => {
        let uid = state.id("f");
        state.flows.insert(uid.clone(), Vec::new());
        if let Some(version) = state.versions.get_mut(&text(args, "version_id")) {
          version.flow = Some(uid.clone());
        }
        json!({ "version": { "addUnderlyingFlow": { "uid": uid } } })
      }
      "add_comp_in_flow" => {
        let uid = state.id("m");
        if let Some(members) = state.flows.get_mut(&text(args, "flow_id")) {
          members.push(Member {
            uid: uid.clone(),
            alias: text(args, "alias"),
            version_id: text(args, "version_id"),
            cfg: None,
            prev: Vec::new(),
          });
        }
        json!({ "flow": { "addComponent": { "details": { "uid": uid } } } })
      }
      "set_in_flow_component_cfg" => {
        let comp_id = text(args, "comp_id");
        if let Some(members) = state.flows.get_mut(&text(args, "flow_id")) {
          if let Some(member) = members.iter_mut().find(|m| m.uid == comp_id) {
            member.cfg = Some(text(args, "cfg_core_id"));
          }
        }
        json!({ "flow": { "inFlowComponent": { "updateConfig": { "details": { "uid": comp_id } } } } })
      }
      "link" => {
        let start_id = text(args, "start_id");
        let target_id = text(args, "target_id");
        if let Some(members) = state.flows.get_mut(&text(args, "flow_id")) {
          if let Some(target) = members.iter_mut().find(|m| m.uid == target_id) {
            if !target.prev.contains(&start_id) {
              target.prev.push(start_id);
            }
          }
        }
        json!({ "flow": { "linkComponents": { "schemaAdapter": null } } })
      }
      "add_schema_alias" => json!({ "flow": { "addSchemaAlias": true } }),
      "get_flow" => {
        let flow_id = text(args, "flow_id");
        let flow = state
          .flows
          .contains_key(&flow_id)
          .then(|| state.flow_json(&flow_id));
        json!({ "flow": flow })
      }
      "create_collection" => {
        let uid = state.id("ca");
        state.collections.insert(
          uid.clone(),
          json!({ "uid": uid, "coreAlias": args.get("core_alias") }),
        );
        json!({ "collectionAliases": { "create": { "details": { "uid": uid } } } })
      }
      "create_collection_in_version" => {
        let ca_id = text(args, "ca_id");
        if let Some(version) = state.versions.get_mut(&text(args, "version_id")) {
          version.collection = Some(ca_id.clone());
        }
        json!({ "version": { "addUnderlyingCa": { "uid": ca_id } } })
      }
      "create_asset_in_version" => {
        let uid = state.id("as");
        let asset = json!({
          "details": {
            "uid": uid,
            "corePath": args.get("core_path"),
            "isComposite": args.get("is_composite"),
          },
          "uploadUrl": format!("https://upload.test/{}", uid),
        });
        if let Some(version) = state.versions.get_mut(&text(args, "version_id")) {
          version.asset = Some(asset.clone());
        }
        json!({ "version": { "createUnderlyingAsset": asset } })
      }
      other => return Err(GatewayError::UnknownOperation(other.to_string())),
    };
    Ok(response)
  }
}

#[async_trait]
impl Gateway for FakeSpace {
  async fn execute(&self, operation: &str, args: Args) -> Result<Value, GatewayError> {
    self
      .calls
      .lock()
      .unwrap()
      .push((operation.to_string(), args.clone()));

    if self.failing.lock().unwrap().as_deref() == Some(operation) {
      return Err(GatewayError::GraphQl {
        operation: operation.to_string(),
        messages: vec!["injected failure".to_string()],
      });
    }
    self.handle(operation, &args)
  }

  async fn subscribe(&self, operation: &str, _args: Args) -> Result<ValueStream, GatewayError> {
    Err(GatewayError::UnknownOperation(operation.to_string()))
  }
}

/// A manager backed by a fresh fake platform.
pub fn manager() -> (Arc<FakeSpace>, ComponentManager) {
  let space = FakeSpace::new();
  let manager = ComponentManager::new(SpaceOps::new(space.clone()));
  (space, manager)
}
