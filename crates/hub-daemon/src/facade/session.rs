//! Session/meta operations: `hello`, `echo`, `set_log_level`, `login`
//! (spec §4.6).

use crate::auth;
use crate::ep_ledger;
use crate::registry::ConnectionRegistry;
use serde_json::Value;
use std::sync::Mutex;
use twister_hub_core::{HubError, ProjectModel, Request};

/// `hello(hello_string, extras?)`: declare this connection's role (spec
/// §4.1's `on_hello`). If the session is already authenticated and
/// `extras.eps` is present, those names are handed straight to the EP
/// ledger — the same path `register_eps` uses, minus its courtesy upcall
/// (we're mid-handshake with this very peer).
pub fn hello(
    registry: &ConnectionRegistry,
    project: &dyn ProjectModel,
    addr: &str,
    request: &Request,
) -> Result<Value, HubError> {
    let hello_raw = request.arg_str(0).map_err(HubError::InvalidArgument)?.to_string();

    let mut pending_registration = None;
    registry.with_session_mut(addr, |session| {
        session.on_hello(&hello_raw);
        if session.authenticated {
            if let Some(names) = request
                .args
                .get(1)
                .and_then(Value::as_object)
                .and_then(|extras| extras.get("eps"))
                .and_then(Value::as_array)
            {
                let names: Vec<String> = names
                    .iter()
                    .filter_map(|v| v.as_str().map(str::to_string))
                    .collect();
                if !names.is_empty() {
                    pending_registration = Some((session.user.clone(), names));
                }
            }
        }
    });

    if let Some((user, names)) = pending_registration {
        ep_ledger::register_eps(registry, project, addr, &user, &names);
    }

    Ok(Value::Bool(true))
}

pub fn echo(request: &Request) -> Result<Value, HubError> {
    Ok(request.args.first().cloned().unwrap_or(Value::Null))
}

pub fn set_log_level(log_level: &Mutex<String>, request: &Request) -> Result<Value, HubError> {
    let level = request.arg_str(0).map_err(HubError::InvalidArgument)?;
    *log_level.lock().unwrap() = level.to_string();
    Ok(Value::Bool(true))
}

pub fn login(
    registry: &ConnectionRegistry,
    project: &dyn ProjectModel,
    addr: &str,
    request: &Request,
) -> Result<Value, HubError> {
    let user = request.arg_str(0).map_err(HubError::InvalidArgument)?;
    let password = request.arg_str(1).map_err(HubError::InvalidArgument)?;
    Ok(Value::Bool(auth::login(registry, project, addr, user, password)))
}
