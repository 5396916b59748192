//! Plugins (spec §4.6): `run_plugin` is decoded as a [`CommandEnvelope`]
//! rather than raw positional arguments, per spec §9's redesign note.

use super::decode_envelope;
use crate::registry::{require_user, ConnectionRegistry};
use serde_json::Value;
use twister_hub_core::{HubError, ProjectModel, Request};

pub fn list_plugins(
    project: &dyn ProjectModel,
    addr: &str,
    registry: &ConnectionRegistry,
) -> Result<Value, HubError> {
    let user = require_user(registry, addr)?;
    let names = project.list_plugins(&user);
    Ok(Value::Array(names.into_iter().map(Value::String).collect()))
}

pub fn run_plugin(
    project: &dyn ProjectModel,
    addr: &str,
    registry: &ConnectionRegistry,
    request: &Request,
) -> Result<Value, HubError> {
    let user = require_user(registry, addr)?;
    let envelope = decode_envelope(request)?;
    match project.run_plugin(&user, &envelope.command, Value::Object(envelope.params)) {
        Ok(result) => Ok(result),
        Err(err) => Ok(Value::String(format!("*ERROR* {err}"))),
    }
}
