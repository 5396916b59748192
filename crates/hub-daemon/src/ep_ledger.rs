//! EP Ownership Ledger (C4): the façade-facing wrapper around the
//! registry's EP bookkeeping, bridging it to the project model's own
//! durable `register_ep`/`unregister_ep` calls (spec §4.4).

use crate::registry::{log_registration, ConnectionRegistry};
use twister_hub_core::ProjectModel;

/// `register_eps(addr, user, names)`: persist each name at the project
/// model, keep only the ones it accepted, then hand the survivors to the
/// registry for ownership arbitration. Rejections are logged, not raised —
/// spec §4.4 treats a per-name rejection as a partial success.
pub fn register_eps(
    registry: &ConnectionRegistry,
    project: &dyn ProjectModel,
    addr: &str,
    user: &str,
    names: &[String],
) -> Vec<String> {
    let mut accepted = Vec::new();
    let mut failed = Vec::new();
    for name in names {
        if project.register_ep(user, name) {
            accepted.push(name.clone());
        } else {
            failed.push(name.clone());
        }
    }

    let transferred = registry.register_eps(addr, user, &accepted);
    log_registration(addr, &transferred, &failed);
    accepted
}

/// `unregister_eps(addr, user, names)`: the inverse, always removing the
/// names from the registry regardless of the project model's per-name
/// result (spec §4.4).
pub fn unregister_eps(
    registry: &ConnectionRegistry,
    project: &dyn ProjectModel,
    addr: &str,
    user: &str,
    names: &[String],
) {
    for name in names {
        project.unregister_ep(user, name);
    }
    registry.unregister_eps(addr, names);
}
