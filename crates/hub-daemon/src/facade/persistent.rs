//! Persistent project edits and settings (spec §4.6).

use crate::registry::{require_user, ConnectionRegistry};
use serde_json::Value;
use twister_hub_core::{HubError, ProjectModel, Request};

fn arg_str<'a>(request: &'a Request, index: usize) -> Result<&'a str, HubError> {
    request.arg_str(index).map_err(HubError::InvalidArgument)
}

fn arg_value(request: &Request, index: usize) -> Result<Value, HubError> {
    request
        .args
        .get(index)
        .cloned()
        .ok_or_else(|| HubError::InvalidArgument(format!("missing argument {index}")))
}

pub fn set_persistent_suite(
    project: &dyn ProjectModel,
    addr: &str,
    registry: &ConnectionRegistry,
    request: &Request,
) -> Result<Value, HubError> {
    let user = require_user(registry, addr)?;
    let suite = arg_str(request, 0)?.to_string();
    let data = arg_value(request, 1)?;
    project.set_persistent_suite(&user, &suite, data)?;
    Ok(Value::Bool(true))
}

pub fn del_persistent_suite(
    project: &dyn ProjectModel,
    addr: &str,
    registry: &ConnectionRegistry,
    request: &Request,
) -> Result<Value, HubError> {
    let user = require_user(registry, addr)?;
    let suite = arg_str(request, 0)?;
    project.del_persistent_suite(&user, suite)?;
    Ok(Value::Bool(true))
}

pub fn set_persistent_file(
    project: &dyn ProjectModel,
    addr: &str,
    registry: &ConnectionRegistry,
    request: &Request,
) -> Result<Value, HubError> {
    let user = require_user(registry, addr)?;
    let file = arg_str(request, 0)?.to_string();
    let data = arg_value(request, 1)?;
    project.set_persistent_file(&user, &file, data)?;
    Ok(Value::Bool(true))
}

pub fn del_persistent_file(
    project: &dyn ProjectModel,
    addr: &str,
    registry: &ConnectionRegistry,
    request: &Request,
) -> Result<Value, HubError> {
    let user = require_user(registry, addr)?;
    let file = arg_str(request, 0)?;
    project.del_persistent_file(&user, file)?;
    Ok(Value::Bool(true))
}

pub fn list_settings(
    project: &dyn ProjectModel,
    addr: &str,
    registry: &ConnectionRegistry,
) -> Result<Value, HubError> {
    let user = require_user(registry, addr)?;
    let keys = project.list_settings(&user);
    Ok(Value::Array(keys.into_iter().map(Value::String).collect()))
}

pub fn get_setting(
    project: &dyn ProjectModel,
    addr: &str,
    registry: &ConnectionRegistry,
    request: &Request,
) -> Result<Value, HubError> {
    let user = require_user(registry, addr)?;
    let key = arg_str(request, 0)?;
    Ok(project.get_setting(&user, key).unwrap_or(Value::Null))
}

pub fn set_setting(
    project: &dyn ProjectModel,
    addr: &str,
    registry: &ConnectionRegistry,
    request: &Request,
) -> Result<Value, HubError> {
    let user = require_user(registry, addr)?;
    let key = arg_str(request, 0)?.to_string();
    let value = arg_value(request, 1)?;
    project.set_setting(&user, &key, value)?;
    Ok(Value::Bool(true))
}

pub fn del_setting(
    project: &dyn ProjectModel,
    addr: &str,
    registry: &ConnectionRegistry,
    request: &Request,
) -> Result<Value, HubError> {
    let user = require_user(registry, addr)?;
    let key = arg_str(request, 0)?;
    project.del_setting(&user, key)?;
    Ok(Value::Bool(true))
}
