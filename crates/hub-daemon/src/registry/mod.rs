//! Connection Registry (C2) and Session (C1) types, plus the EP Ownership
//! Ledger (C4) layered on the registry's lock.

mod connection_registry;
mod session;

pub use connection_registry::{log_registration, require_user, ConnectionRegistry};
pub use session::{Role, Session, SessionView};
