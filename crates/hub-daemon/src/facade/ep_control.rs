//! EP control: registration, status, and upcalls into the owning
//! connection (spec §4.6 "EP control" family).

use crate::dispatch;
use crate::ep_ledger;
use crate::registry::{require_user, ConnectionRegistry};
use serde_json::Value;
use tokio::time::Duration;
use tracing::warn;
use twister_hub_core::{HubError, ProjectModel, Request};

fn arg_str<'a>(request: &'a Request, index: usize) -> Result<&'a str, HubError> {
    request.arg_str(index).map_err(HubError::InvalidArgument)
}

fn arg_str_list(request: &Request, index: usize) -> Result<Vec<String>, HubError> {
    let value = request
        .args
        .get(index)
        .ok_or_else(|| HubError::InvalidArgument(format!("missing argument {index}")))?;
    value
        .as_array()
        .ok_or_else(|| HubError::InvalidArgument(format!("argument {index} must be an array")))?
        .iter()
        .map(|v| {
            v.as_str()
                .map(str::to_string)
                .ok_or_else(|| HubError::InvalidArgument("EP name must be a string".to_string()))
        })
        .collect()
}

/// Step 4 of spec §4.4's `register(addr, eps[])`: once the ledger has been
/// updated, issue a courtesy `peer.hello(hub_address)` upcall on the
/// newly-registered session. A failure here is logged but never rolls back
/// the registration that already happened.
pub async fn register_eps(
    registry: &ConnectionRegistry,
    project: &dyn ProjectModel,
    addr: &str,
    request: &Request,
    hub_address: &str,
    upcall_deadline: Duration,
) -> Result<Value, HubError> {
    let user = require_user(registry, addr)?;
    let names = arg_str_list(request, 0)?;
    if names.is_empty() {
        return Err(HubError::InvalidArgument("no EP names given".to_string()));
    }
    let accepted = ep_ledger::register_eps(registry, project, addr, &user, &names);
    if accepted.is_empty() {
        return Err(HubError::InvalidArgument(
            "project model rejected every EP name".to_string(),
        ));
    }

    if let Some(view) = registry.get(addr) {
        let hello_args = vec![Value::String(hub_address.to_string())];
        if let Err(e) = view.peer.call("hello", hello_args, upcall_deadline).await {
            warn!(%addr, error = %e, "courtesy hello upcall after EP registration failed");
        }
    }

    Ok(Value::Array(accepted.into_iter().map(Value::String).collect()))
}

pub fn unregister_eps(
    registry: &ConnectionRegistry,
    project: &dyn ProjectModel,
    addr: &str,
    request: &Request,
) -> Result<Value, HubError> {
    let user = require_user(registry, addr)?;
    let names = arg_str_list(request, 0)?;
    ep_ledger::unregister_eps(registry, project, addr, &user, &names);
    Ok(Value::Bool(true))
}

pub fn list_eps(
    project: &dyn ProjectModel,
    addr: &str,
    registry: &ConnectionRegistry,
) -> Result<Value, HubError> {
    let user = require_user(registry, addr)?;
    let status = project.get_all_ep_status(&user);
    let names: Vec<String> = status
        .as_object()
        .map(|obj| obj.keys().cloned().collect())
        .unwrap_or_default();
    Ok(Value::Array(names.into_iter().map(Value::String).collect()))
}

pub fn registered_eps(registry: &ConnectionRegistry, addr: &str) -> Result<Value, HubError> {
    let user = require_user(registry, addr)?;
    let names = registry.registered_eps(&user);
    Ok(Value::Array(names.into_iter().map(Value::String).collect()))
}

pub async fn start_ep(
    registry: &ConnectionRegistry,
    addr: &str,
    request: &Request,
    deadline: Duration,
) -> Result<Value, HubError> {
    let user = require_user(registry, addr)?;
    let ep = arg_str(request, 0)?;
    dispatch::call_ep(registry, &user, ep, "start", Vec::new(), deadline).await
}

pub async fn stop_ep(
    registry: &ConnectionRegistry,
    addr: &str,
    request: &Request,
    deadline: Duration,
) -> Result<Value, HubError> {
    let user = require_user(registry, addr)?;
    let ep = arg_str(request, 0)?;
    dispatch::call_ep(registry, &user, ep, "stop", Vec::new(), deadline).await
}

pub fn get_ep_status(
    project: &dyn ProjectModel,
    addr: &str,
    registry: &ConnectionRegistry,
    request: &Request,
) -> Result<Value, HubError> {
    let user = require_user(registry, addr)?;
    let ep = arg_str(request, 0)?;
    Ok(project.get_ep_status(&user, ep).unwrap_or(Value::Null))
}

pub fn set_ep_status(
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
    project.set_ep_status(&user, &ep, status)?;
    Ok(Value::Bool(true))
}

pub fn get_all_ep_status(
    project: &dyn ProjectModel,
    addr: &str,
    registry: &ConnectionRegistry,
) -> Result<Value, HubError> {
    let user = require_user(registry, addr)?;
    Ok(project.get_all_ep_status(&user))
}
