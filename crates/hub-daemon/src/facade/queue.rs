//! Runtime queue and file status (spec §4.6).

use crate::registry::{require_user, ConnectionRegistry};
use serde_json::Value;
use twister_hub_core::{HubError, ProjectModel, Request};

fn arg_str<'a>(request: &'a Request, index: usize) -> Result<&'a str, HubError> {
    request.arg_str(index).map_err(HubError::InvalidArgument)
}

pub fn queue_file(
    project: &dyn ProjectModel,
    addr: &str,
    registry: &ConnectionRegistry,
    request: &Request,
) -> Result<Value, HubError> {
    let user = require_user(registry, addr)?;
    let ep = arg_str(request, 0)?;
    let file = arg_str(request, 1)?;
    project.queue_file(&user, ep, file)?;
    Ok(Value::Bool(true))
}

pub fn dequeue_files(
    project: &dyn ProjectModel,
    addr: &str,
    registry: &ConnectionRegistry,
    request: &Request,
) -> Result<Value, HubError> {
    let user = require_user(registry, addr)?;
    let ep = arg_str(request, 0)?;
    let files = project.dequeue_files(&user, ep);
    Ok(Value::Array(files.into_iter().map(Value::String).collect()))
}

pub fn set_file_status(
    project: &dyn ProjectModel,
    addr: &str,
    registry: &ConnectionRegistry,
    request: &Request,
) -> Result<Value, HubError> {
    let user = require_user(registry, addr)?;
    let file = arg_str(request, 0)?.to_string();
    let status = request
        .args
        .get(1)
        .cloned()
        .ok_or_else(|| HubError::InvalidArgument("missing status".to_string()))?;
    project.set_file_status(&user, &file, status)?;
    Ok(Value::Bool(true))
}

pub fn set_file_status_all(
    project: &dyn ProjectModel,
    addr: &str,
    registry: &ConnectionRegistry,
    request: &Request,
) -> Result<Value, HubError> {
    let user = require_user(registry, addr)?;
    let ep = arg_str(request, 0)?.to_string();
    let status = request
        .args
        .get(1)
        .cloned()
        .ok_or_else(|| HubError::InvalidArgument("missing status".to_string()))?;
    project.set_file_status_all(&user, &ep, status)?;
    Ok(Value::Bool(true))
}

pub fn get_file_status_all(
    project: &dyn ProjectModel,
    addr: &str,
    registry: &ConnectionRegistry,
    request: &Request,
) -> Result<Value, HubError> {
    let user = require_user(registry, addr)?;
    let ep = arg_str(request, 0)?;
    Ok(project.get_file_status_all(&user, ep))
}
