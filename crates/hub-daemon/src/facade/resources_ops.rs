//! Routes the two trees' reservation/CRUD surface (spec §4.7) to
//! [`ResourceTree`]. Shared between the test-bed and SUT method families,
//! which differ only in name suffix and a handful of SUT-only extras
//! (`save_as`, `rename_meta`, `delete_component`, `get_info`).

use crate::registry::{require_user, ConnectionRegistry};
use crate::resources::ResourceTree;
use serde_json::{Map, Value};
use twister_hub_core::{HubError, ProjectModel, Request};

fn arg_str<'a>(request: &'a Request, index: usize) -> Result<&'a str, HubError> {
    request.arg_str(index).map_err(HubError::InvalidArgument)
}

fn arg_props(request: &Request, index: usize) -> Map<String, Value> {
    request
        .args
        .get(index)
        .and_then(Value::as_object)
        .cloned()
        .unwrap_or_default()
}

fn node_to_value(node: &crate::resources::ResourceNode) -> Value {
    let mut out = node.props.clone();
    out.insert("__name".to_string(), Value::String(node.name.clone()));
    out.insert("__parent".to_string(), Value::String(node.parent.clone()));
    Value::Object(out)
}

pub fn dispatch(
    tree: &ResourceTree,
    project: &dyn ProjectModel,
    addr: &str,
    registry: &ConnectionRegistry,
    method: &str,
    request: &Request,
) -> Result<Value, HubError> {
    let user = require_user(registry, addr)?;

    if method.starts_with("list_all_") {
        return Ok(Value::Array(
            tree.list_all().into_iter().map(Value::String).collect(),
        ));
    }
    if method == "get_tb" || method == "get_sut" {
        let path = arg_str(request, 0)?;
        let node = tree.get(path).ok_or_else(|| HubError::NotFound(path.to_string()))?;
        return Ok(node_to_value(&node));
    }
    if method.starts_with("get_info_") {
        let path = arg_str(request, 0)?;
        let node = tree.get(path).ok_or_else(|| HubError::NotFound(path.to_string()))?;
        return Ok(node_to_value(&node));
    }
    if method.starts_with("is_") && method.ends_with("_reserved") {
        let path = arg_str(request, 0)?;
        return Ok(match tree.is_reserved(path) {
            Some(holder) => Value::String(holder),
            None => Value::Bool(false),
        });
    }
    if method.starts_with("reserve_") {
        let path = arg_str(request, 0)?;
        tree.reserve(path, &user)?;
        return Ok(Value::Bool(true));
    }
    if method.ends_with("_as") && method.starts_with("save_reserved_") {
        let name = arg_str(request, 0)?.to_string();
        let path = arg_str(request, 1)?;
        tree.save_as(&name, path, &user)?;
        return Ok(Value::Bool(true));
    }
    if method.starts_with("save_reserved_") {
        let path = arg_str(request, 0)?;
        tree.save_reserved(path, &user, project)?;
        return Ok(Value::Bool(true));
    }
    if method.starts_with("save_release_reserved_") {
        let path = arg_str(request, 0)?;
        tree.save_release_reserved(path, &user, project)?;
        return Ok(Value::Bool(true));
    }
    if method.starts_with("discard_release_reserved_") {
        let path = arg_str(request, 0)?;
        tree.discard_release_reserved(path, &user)?;
        return Ok(Value::Bool(true));
    }
    if method.starts_with("rename_meta_") {
        let path = arg_str(request, 0)?;
        let new_name = arg_str(request, 1)?;
        tree.rename(path, new_name, &user)?;
        return Ok(Value::Bool(true));
    }
    if method.starts_with("rename_") {
        let path = arg_str(request, 0)?;
        let new_name = arg_str(request, 1)?;
        tree.rename(path, new_name, &user)?;
        return Ok(Value::Bool(true));
    }
    if method.starts_with("delete_component_") {
        let path = arg_str(request, 0)?;
        tree.delete(path, &user)?;
        return Ok(Value::Bool(true));
    }
    if method.starts_with("delete_") {
        let path = arg_str(request, 0)?;
        tree.delete(path, &user)?;
        return Ok(Value::Bool(true));
    }
    if method.starts_with("create_new_") {
        let name = arg_str(request, 0)?.to_string();
        let parent = arg_str(request, 1)?.to_string();
        let props = arg_props(request, 2);
        tree.create_new(&name, &parent, &user, props)?;
        return Ok(Value::Bool(true));
    }
    if method.starts_with("create_component_") {
        let name = arg_str(request, 0)?.to_string();
        let parent = arg_str(request, 1)?.to_string();
        let props = arg_props(request, 2);
        tree.create_component(&name, &parent, &user, props)?;
        return Ok(Value::Bool(true));
    }
    if method.starts_with("update_meta_") {
        let name = arg_str(request, 0)?.to_string();
        let parent = arg_str(request, 1)?.to_string();
        let props = arg_props(request, 2);
        tree.update_meta(&name, &parent, &user, props)?;
        return Ok(Value::Bool(true));
    }
    if method == "set_tb" || method == "set_sut" {
        let path = arg_str(request, 0)?;
        let props = arg_props(request, 1);
        tree.set_props(path, &user, props)?;
        return Ok(Value::Bool(true));
    }

    Err(HubError::InvalidArgument(format!(
        "unrecognized resource method {method}"
    )))
}
