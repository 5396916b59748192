//! Reverse Dispatcher (C5): finds the connection that owns an EP (or
//! matches a role filter) and issues an upcall on it (spec §4.5).

use crate::registry::ConnectionRegistry;
use serde_json::Value;
use tokio::time::Duration;
use twister_hub_core::HubError;

/// `find_connection(user, role_filter)`: the first session authenticated
/// as `user` whose declared role matches `role_filter` exactly (or its
/// `role:subqualifier` prefix, per [`crate::registry::Role::matches`]).
pub fn find_connection(
    registry: &ConnectionRegistry,
    user: &str,
    role_filter: &str,
) -> Option<String> {
    registry
        .find_first(|s| s.user == user && s.authenticated && s.role.matches(role_filter))
        .map(|s| s.addr)
}

/// Issue an upcall on the EP that owns `ep_name` for `user`. `NoSuchPeer`
/// if no session currently owns it.
pub async fn call_ep(
    registry: &ConnectionRegistry,
    user: &str,
    ep_name: &str,
    method: &str,
    args: Vec<Value>,
    deadline: Duration,
) -> Result<Value, HubError> {
    let addr = registry
        .find_owner(user, ep_name)
        .ok_or(HubError::NoSuchPeer)?;
    let view = registry.get(&addr).ok_or(HubError::NoSuchPeer)?;
    view.peer.call(method, args, deadline).await
}

/// Issue an upcall on the first connection matching `role_filter` for
/// `user` (used by broadcast-style operations such as `log_live`).
pub async fn call_role(
    registry: &ConnectionRegistry,
    user: &str,
    role_filter: &str,
    method: &str,
    args: Vec<Value>,
    deadline: Duration,
) -> Result<Value, HubError> {
    let addr = find_connection(registry, user, role_filter).ok_or(HubError::NoSuchPeer)?;
    let view = registry.get(&addr).ok_or(HubError::NoSuchPeer)?;
    view.peer.call(method, args, deadline).await
}
