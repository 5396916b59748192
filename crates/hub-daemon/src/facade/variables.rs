//! User/EP/suite/file variable access, user listing, and text crypto
//! (spec §4.6 "User/variable" family).

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

pub fn get_user_variable(
    project: &dyn ProjectModel,
    addr: &str,
    registry: &ConnectionRegistry,
    request: &Request,
) -> Result<Value, HubError> {
    let user = require_user(registry, addr)?;
    let key = arg_str(request, 0)?;
    Ok(project.get_user_variable(&user, key).unwrap_or(Value::Null))
}

pub fn set_user_variable(
    project: &dyn ProjectModel,
    addr: &str,
    registry: &ConnectionRegistry,
    request: &Request,
) -> Result<Value, HubError> {
    let user = require_user(registry, addr)?;
    let key = arg_str(request, 0)?.to_string();
    let value = arg_value(request, 1)?;
    project.set_user_variable(&user, &key, value)?;
    Ok(Value::Bool(true))
}

pub fn get_ep_variable(
    project: &dyn ProjectModel,
    addr: &str,
    registry: &ConnectionRegistry,
    request: &Request,
) -> Result<Value, HubError> {
    let user = require_user(registry, addr)?;
    let ep = arg_str(request, 0)?;
    let key = arg_str(request, 1)?;
    Ok(project.get_ep_variable(&user, ep, key).unwrap_or(Value::Null))
}

pub fn set_ep_variable(
    project: &dyn ProjectModel,
    addr: &str,
    registry: &ConnectionRegistry,
    request: &Request,
) -> Result<Value, HubError> {
    let user = require_user(registry, addr)?;
    let ep = arg_str(request, 0)?.to_string();
    let key = arg_str(request, 1)?.to_string();
    let value = arg_value(request, 2)?;
    project.set_ep_variable(&user, &ep, &key, value)?;
    Ok(Value::Bool(true))
}

pub fn get_suite_variable(
    project: &dyn ProjectModel,
    addr: &str,
    registry: &ConnectionRegistry,
    request: &Request,
) -> Result<Value, HubError> {
    let user = require_user(registry, addr)?;
    let suite = arg_str(request, 0)?;
    let key = arg_str(request, 1)?;
    Ok(project
        .get_suite_variable(&user, suite, key)
        .unwrap_or(Value::Null))
}

pub fn set_suite_variable(
    project: &dyn ProjectModel,
    addr: &str,
    registry: &ConnectionRegistry,
    request: &Request,
) -> Result<Value, HubError> {
    let user = require_user(registry, addr)?;
    let suite = arg_str(request, 0)?.to_string();
    let key = arg_str(request, 1)?.to_string();
    let value = arg_value(request, 2)?;
    project.set_suite_variable(&user, &suite, &key, value)?;
    Ok(Value::Bool(true))
}

pub fn get_file_variable(
    project: &dyn ProjectModel,
    addr: &str,
    registry: &ConnectionRegistry,
    request: &Request,
) -> Result<Value, HubError> {
    let user = require_user(registry, addr)?;
    let file = arg_str(request, 0)?;
    let key = arg_str(request, 1)?;
    Ok(project
        .get_file_variable(&user, file, key)
        .unwrap_or(Value::Null))
}

pub fn set_file_variable(
    project: &dyn ProjectModel,
    addr: &str,
    registry: &ConnectionRegistry,
    request: &Request,
) -> Result<Value, HubError> {
    let user = require_user(registry, addr)?;
    let file = arg_str(request, 0)?.to_string();
    let key = arg_str(request, 1)?.to_string();
    let value = arg_value(request, 2)?;
    project.set_file_variable(&user, &file, &key, value)?;
    Ok(Value::Bool(true))
}

pub fn list_users(project: &dyn ProjectModel, request: &Request) -> Result<Value, HubError> {
    let active_only = request
        .args
        .first()
        .and_then(Value::as_bool)
        .unwrap_or(false);
    let users = project.list_users(active_only);
    Ok(Value::Array(users.into_iter().map(Value::String).collect()))
}

pub fn encrypt_text(project: &dyn ProjectModel, request: &Request) -> Result<Value, HubError> {
    let plaintext = arg_str(request, 0)?;
    Ok(Value::String(project.encrypt_text(plaintext)))
}

pub fn decrypt_text(project: &dyn ProjectModel, request: &Request) -> Result<Value, HubError> {
    let ciphertext = arg_str(request, 0)?;
    Ok(Value::String(project.decrypt_text(ciphertext)?))
}

pub fn dependency_info(
    project: &dyn ProjectModel,
    addr: &str,
    registry: &ConnectionRegistry,
    request: &Request,
) -> Result<Value, HubError> {
    let user = require_user(registry, addr)?;
    let name = arg_str(request, 0)?;
    Ok(project.dependency_info(&user, name).unwrap_or(Value::Null))
}
