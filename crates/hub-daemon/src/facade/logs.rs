//! Log file access (spec §4.6).

use crate::registry::{require_user, ConnectionRegistry};
use serde_json::Value;
use twister_hub_core::{HubError, ProjectModel, Request};

fn arg_str<'a>(request: &'a Request, index: usize) -> Result<&'a str, HubError> {
    request.arg_str(index).map_err(HubError::InvalidArgument)
}

fn arg_usize(request: &Request, index: usize) -> Result<usize, HubError> {
    request
        .args
        .get(index)
        .and_then(Value::as_u64)
        .map(|n| n as usize)
        .ok_or_else(|| HubError::InvalidArgument(format!("argument {index} must be a non-negative integer")))
}

pub fn get_log_file(
    project: &dyn ProjectModel,
    addr: &str,
    registry: &ConnectionRegistry,
    request: &Request,
) -> Result<Value, HubError> {
    let user = require_user(registry, addr)?;
    let name = arg_str(request, 0)?;
    let start = arg_usize(request, 1)?;
    let read = arg_usize(request, 2)?;
    Ok(Value::String(project.get_log_file(&user, name, start, read)?))
}

pub fn log_message(
    project: &dyn ProjectModel,
    addr: &str,
    registry: &ConnectionRegistry,
    request: &Request,
) -> Result<Value, HubError> {
    let user = require_user(registry, addr)?;
    let name = arg_str(request, 0)?;
    let message = arg_str(request, 1)?;
    project.log_message(&user, name, message)?;
    Ok(Value::Bool(true))
}

pub fn log_live(
    project: &dyn ProjectModel,
    addr: &str,
    registry: &ConnectionRegistry,
    request: &Request,
) -> Result<Value, HubError> {
    let user = require_user(registry, addr)?;
    let name = arg_str(request, 0)?;
    Ok(Value::String(project.log_live(&user, name)?))
}

pub fn reset_log(
    project: &dyn ProjectModel,
    addr: &str,
    registry: &ConnectionRegistry,
    request: &Request,
) -> Result<Value, HubError> {
    let user = require_user(registry, addr)?;
    let name = arg_str(request, 0)?;
    project.reset_log(&user, name)?;
    Ok(Value::Bool(true))
}

pub fn reset_logs(
    project: &dyn ProjectModel,
    addr: &str,
    registry: &ConnectionRegistry,
) -> Result<Value, HubError> {
    let user = require_user(registry, addr)?;
    project.reset_logs(&user)?;
    Ok(Value::Bool(true))
}
