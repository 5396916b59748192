//! Library and test file download (spec §4.6). The three-root fallback
//! (versioned-FS config, user root, global root) lives inside the project
//! model's `resolve_library`; the façade only shapes the result for the
//! wire.

use crate::registry::{require_user, ConnectionRegistry};
use serde_json::Value;
use twister_hub_core::{HubError, ProjectModel, Request};

fn arg_str<'a>(request: &'a Request, index: usize) -> Result<&'a str, HubError> {
    request.arg_str(index).map_err(HubError::InvalidArgument)
}

fn bytes_to_value(bytes: Vec<u8>) -> Value {
    Value::Array(bytes.into_iter().map(|b| Value::Number(b.into())).collect())
}

pub fn list_libraries(
    project: &dyn ProjectModel,
    addr: &str,
    registry: &ConnectionRegistry,
) -> Result<Value, HubError> {
    let user = require_user(registry, addr)?;
    let names = project.list_libraries(&user);
    Ok(Value::Array(names.into_iter().map(Value::String).collect()))
}

pub fn download_library(
    project: &dyn ProjectModel,
    addr: &str,
    registry: &ConnectionRegistry,
    request: &Request,
) -> Result<Value, HubError> {
    let user = require_user(registry, addr)?;
    let name = arg_str(request, 0)?;
    let bytes = project.resolve_library(&user, name)?;
    Ok(bytes_to_value(bytes))
}

pub fn get_ep_files(
    project: &dyn ProjectModel,
    addr: &str,
    registry: &ConnectionRegistry,
    request: &Request,
) -> Result<Value, HubError> {
    let user = require_user(registry, addr)?;
    let ep = arg_str(request, 0)?;
    let files = project.get_ep_files(&user, ep);
    serde_json::to_value(files).map_err(|e| HubError::Internal(e.to_string()))
}

pub fn get_suite_files(
    project: &dyn ProjectModel,
    addr: &str,
    registry: &ConnectionRegistry,
    request: &Request,
) -> Result<Value, HubError> {
    let user = require_user(registry, addr)?;
    let suite = arg_str(request, 0)?;
    let files = project.get_suite_files(&user, suite);
    serde_json::to_value(files).map_err(|e| HubError::Internal(e.to_string()))
}

pub fn download_file(
    project: &dyn ProjectModel,
    addr: &str,
    registry: &ConnectionRegistry,
    request: &Request,
) -> Result<Value, HubError> {
    let user = require_user(registry, addr)?;
    let ep = arg_str(request, 0)?;
    let file_ref = arg_str(request, 1)?;
    let resolved = project.resolve_file(&user, ep, file_ref)?;
    serde_json::to_value(resolved).map_err(|e| HubError::Internal(e.to_string()))
}
