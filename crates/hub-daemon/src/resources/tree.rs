//! The reservation state machine shared by the test-bed and SUT trees
//! (spec §4.7), grounded on the original `reserve_tb`/`save_reserved_tb`/
//! `save_release_reserved_tb`/`discard_release_reserved_tb` family.

use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::RwLock;
use twister_hub_core::{HubError, ProjectModel};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeState {
    Free,
    Reserved { by: String },
    Modified { by: String },
}

#[derive(Debug, Clone)]
pub struct ResourceNode {
    pub name: String,
    pub parent: String,
    pub props: Map<String, Value>,
    pub working_copy: Option<Map<String, Value>>,
    pub state: NodeState,
}

impl ResourceNode {
    fn new(name: String, parent: String, props: Map<String, Value>) -> Self {
        Self {
            name,
            parent,
            props,
            working_copy: None,
            state: NodeState::Free,
        }
    }

    fn reserved_by(&self) -> Option<&str> {
        match &self.state {
            NodeState::Free => None,
            NodeState::Reserved { by } | NodeState::Modified { by } => Some(by.as_str()),
        }
    }
}

fn node_path(parent: &str, name: &str) -> String {
    if parent == "/" || parent.is_empty() {
        format!("/{name}")
    } else {
        format!("{parent}/{name}")
    }
}

/// One tree (test-bed or SUT). `tree_name` identifies which one to the
/// project model's `persist_resource` hook.
pub struct ResourceTree {
    tree_name: &'static str,
    nodes: RwLock<HashMap<String, ResourceNode>>,
}

impl ResourceTree {
    pub fn new(tree_name: &'static str) -> Self {
        Self {
            tree_name,
            nodes: RwLock::new(HashMap::new()),
        }
    }

    pub fn get(&self, path: &str) -> Option<ResourceNode> {
        self.nodes.read().unwrap().get(path).cloned()
    }

    pub fn is_reserved(&self, path: &str) -> Option<String> {
        self.nodes
            .read()
            .unwrap()
            .get(path)
            .and_then(|n| n.reserved_by().map(str::to_string))
    }

    pub fn list_all(&self) -> Vec<String> {
        let mut paths: Vec<String> = self.nodes.read().unwrap().keys().cloned().collect();
        paths.sort();
        paths
    }

    /// `create_new(name, parent, user, props)`: the parent must be `/` or a
    /// node reserved by `user` — otherwise `NotReserved`.
    pub fn create_new(
        &self,
        name: &str,
        parent: &str,
        user: &str,
        mut props: Map<String, Value>,
    ) -> Result<(), HubError> {
        self.require_reservable_parent(parent, user)?;
        let path = node_path(parent, name);
        let mut nodes = self.nodes.write().unwrap();
        if nodes.contains_key(&path) {
            return Err(HubError::InvalidArgument(format!(
                "{path} already exists"
            )));
        }
        props.insert("__user".to_string(), Value::String(user.to_string()));
        nodes.insert(path, ResourceNode::new(name.to_string(), parent.to_string(), props));
        Ok(())
    }

    /// `create_component(name, parent, user, props)`: same reservation rule
    /// as `create_new`; components are just nodes nested under an existing
    /// reserved node.
    pub fn create_component(
        &self,
        name: &str,
        parent: &str,
        user: &str,
        props: Map<String, Value>,
    ) -> Result<(), HubError> {
        self.create_new(name, parent, user, props)
    }

    /// `update_meta(name, parent, user, props)`: merges `props` into the
    /// node's stored metadata without going through the reservation working
    /// copy (spec's original kept a distinction between content props and
    /// meta); here it still requires the node be reserved by `user`.
    pub fn update_meta(
        &self,
        name: &str,
        parent: &str,
        user: &str,
        props: Map<String, Value>,
    ) -> Result<(), HubError> {
        let path = node_path(parent, name);
        let mut nodes = self.nodes.write().unwrap();
        let node = nodes
            .get_mut(&path)
            .ok_or_else(|| HubError::NotFound(path.clone()))?;
        match node.reserved_by() {
            Some(holder) if holder == user => {
                for (k, v) in props {
                    node.props.insert(k, v);
                }
                Ok(())
            }
            Some(holder) => Err(HubError::AlreadyReserved(holder.to_string())),
            None => Err(HubError::NotReserved(path)),
        }
    }

    /// `rename(path, new_name, user)`: requires the node be reserved by
    /// `user`.
    pub fn rename(&self, path: &str, new_name: &str, user: &str) -> Result<(), HubError> {
        let mut nodes = self.nodes.write().unwrap();
        let node = nodes
            .get(path)
            .ok_or_else(|| HubError::NotFound(path.to_string()))?;
        match node.reserved_by() {
            Some(holder) if holder == user => {}
            Some(holder) => return Err(HubError::AlreadyReserved(holder.to_string())),
            None => return Err(HubError::NotReserved(path.to_string())),
        }
        let mut node = nodes.remove(path).unwrap();
        node.name = new_name.to_string();
        let new_path = node_path(&node.parent, new_name);
        nodes.insert(new_path, node);
        Ok(())
    }

    /// `delete(path, user)`: requires the node be reserved by `user`.
    pub fn delete(&self, path: &str, user: &str) -> Result<(), HubError> {
        let mut nodes = self.nodes.write().unwrap();
        let node = nodes
            .get(path)
            .ok_or_else(|| HubError::NotFound(path.to_string()))?;
        match node.reserved_by() {
            Some(holder) if holder == user => {}
            Some(holder) => return Err(HubError::AlreadyReserved(holder.to_string())),
            None => return Err(HubError::NotReserved(path.to_string())),
        }
        nodes.remove(path);
        Ok(())
    }

    /// `reserve(path, user)`: FREE → RESERVED(user); idempotent if already
    /// held by `user`; `AlreadyReserved` if held by someone else.
    pub fn reserve(&self, path: &str, user: &str) -> Result<(), HubError> {
        let mut nodes = self.nodes.write().unwrap();
        let node = nodes
            .get_mut(path)
            .ok_or_else(|| HubError::NotFound(path.to_string()))?;
        match node.reserved_by() {
            Some(holder) if holder == user => Ok(()),
            Some(holder) => Err(HubError::AlreadyReserved(holder.to_string())),
            None => {
                node.state = NodeState::Reserved {
                    by: user.to_string(),
                };
                Ok(())
            }
        }
    }

    /// `release(path, user)`: RESERVED(user) → FREE, dropping any
    /// uncommitted working copy. `NotReserved` if `user` doesn't hold it.
    pub fn release(&self, path: &str, user: &str) -> Result<(), HubError> {
        let mut nodes = self.nodes.write().unwrap();
        let node = nodes
            .get_mut(path)
            .ok_or_else(|| HubError::NotFound(path.to_string()))?;
        match node.reserved_by() {
            Some(holder) if holder == user => {
                node.state = NodeState::Free;
                node.working_copy = None;
                Ok(())
            }
            Some(holder) => Err(HubError::AlreadyReserved(holder.to_string())),
            None => Err(HubError::NotReserved(path.to_string())),
        }
    }

    /// `set_props(path, user, props)`: RESERVED(user) or MODIFIED(user) →
    /// MODIFIED(user); merges `props` into the working copy only.
    pub fn set_props(
        &self,
        path: &str,
        user: &str,
        props: Map<String, Value>,
    ) -> Result<(), HubError> {
        let mut nodes = self.nodes.write().unwrap();
        let node = nodes
            .get_mut(path)
            .ok_or_else(|| HubError::NotFound(path.to_string()))?;
        match node.reserved_by() {
            Some(holder) if holder == user => {
                let mut working = node.working_copy.clone().unwrap_or_else(|| node.props.clone());
                for (k, v) in props {
                    working.insert(k, v);
                }
                node.working_copy = Some(working);
                node.state = NodeState::Modified {
                    by: user.to_string(),
                };
                Ok(())
            }
            Some(holder) => Err(HubError::AlreadyReserved(holder.to_string())),
            None => Err(HubError::NotReserved(path.to_string())),
        }
    }

    /// `save_reserved(path, user)`: MODIFIED(user) → RESERVED(user),
    /// committing the working copy to `props` and persisting through the
    /// project model; no-op (beyond persistence) if already at RESERVED
    /// with no pending working copy.
    pub fn save_reserved(
        &self,
        path: &str,
        user: &str,
        project: &dyn ProjectModel,
    ) -> Result<(), HubError> {
        let committed = {
            let mut nodes = self.nodes.write().unwrap();
            let node = nodes
                .get_mut(path)
                .ok_or_else(|| HubError::NotFound(path.to_string()))?;
            match node.reserved_by() {
                Some(holder) if holder == user => {}
                Some(holder) => return Err(HubError::AlreadyReserved(holder.to_string())),
                None => return Err(HubError::NotReserved(path.to_string())),
            }
            if let Some(working) = node.working_copy.take() {
                node.props = working;
            }
            node.state = NodeState::Reserved {
                by: user.to_string(),
            };
            Value::Object(node.props.clone())
        };
        project.persist_resource(self.tree_name, path, user, &committed)
    }

    /// `save_as(name, path, user)` (SUT only, but harmless on the test-bed
    /// tree too): clones the working copy (or current props) to a new
    /// sibling node; the source node's state is unchanged.
    pub fn save_as(&self, name: &str, path: &str, user: &str) -> Result<(), HubError> {
        let mut nodes = self.nodes.write().unwrap();
        let source = nodes
            .get(path)
            .ok_or_else(|| HubError::NotFound(path.to_string()))?;
        match source.reserved_by() {
            Some(holder) if holder == user => {}
            Some(holder) => return Err(HubError::AlreadyReserved(holder.to_string())),
            None => return Err(HubError::NotReserved(path.to_string())),
        }
        let props = source.working_copy.clone().unwrap_or_else(|| source.props.clone());
        let parent = source.parent.clone();
        let new_path = node_path(&parent, name);
        if nodes.contains_key(&new_path) {
            return Err(HubError::InvalidArgument(format!(
                "{new_path} already exists"
            )));
        }
        nodes.insert(new_path, ResourceNode::new(name.to_string(), parent, props));
        Ok(())
    }

    /// `save_release_reserved(path, user)`: commit and release atomically.
    pub fn save_release_reserved(
        &self,
        path: &str,
        user: &str,
        project: &dyn ProjectModel,
    ) -> Result<(), HubError> {
        self.save_reserved(path, user, project)?;
        self.release(path, user)
    }

    /// `discard_release_reserved(path, user)`: drop the working copy and
    /// release without persisting.
    pub fn discard_release_reserved(&self, path: &str, user: &str) -> Result<(), HubError> {
        self.release(path, user)
    }

    fn require_reservable_parent(&self, parent: &str, user: &str) -> Result<(), HubError> {
        if parent == "/" || parent.is_empty() {
            return Ok(());
        }
        let nodes = self.nodes.read().unwrap();
        let node = nodes
            .get(parent)
            .ok_or_else(|| HubError::NotFound(parent.to_string()))?;
        match node.reserved_by() {
            Some(holder) if holder == user => Ok(()),
            Some(holder) => Err(HubError::AlreadyReserved(holder.to_string())),
            None => Err(HubError::NotReserved(parent.to_string())),
        }
    }
}
