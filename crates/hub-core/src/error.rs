//! The hub's error model (spec §7).
//!
//! Every exposed operation converts its result to one of these kinds before
//! it ever reaches the wire; [`HubError::to_wire`] performs that final
//! flattening into the three-shape RPC contract (`false` / `*ERROR* ...` /
//! success payload).

use serde_json::Value;
use thiserror::Error;

/// All ways a façade operation can fail.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HubError {
    /// Caller has no authenticated session.
    #[error("unauthenticated")]
    Unauthenticated,

    /// Malformed inputs: bad type, missing field, unknown EP.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Path/file/plugin does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Reservation conflict; carries the current holder's user id.
    #[error("already reserved by {0}")]
    AlreadyReserved(String),

    /// Mutation attempted on a node not held by the caller.
    #[error("not reserved: {0}")]
    NotReserved(String),

    /// Reverse dispatcher could not find a matching live peer.
    #[error("no such peer")]
    NoSuchPeer,

    /// An upcall raised or timed out.
    #[error("peer upcall failed: {0}")]
    PeerUpcallFailed(String),

    /// Unhandled failure inside the façade; never propagated as a crash.
    #[error("internal error: {0}")]
    Internal(String),
}

impl HubError {
    /// Flatten to the wire contract: `false` for denied/not-applicable,
    /// `*ERROR* ...` for attempted-but-failed, anything else is a success
    /// payload (produced by the caller, not here).
    pub fn to_wire(&self) -> Value {
        match self {
            HubError::Unauthenticated | HubError::NoSuchPeer | HubError::PeerUpcallFailed(_) => {
                Value::Bool(false)
            }
            HubError::InvalidArgument(msg) => Value::String(format!("*ERROR* {msg}")),
            HubError::NotFound(msg) => Value::String(format!("*ERROR* {msg}")),
            HubError::AlreadyReserved(user) => {
                Value::String(format!("*ERROR* already reserved by {user}"))
            }
            HubError::NotReserved(msg) => Value::String(format!("*ERROR* {msg}")),
            HubError::Internal(msg) => Value::String(format!("*ERROR* {msg}")),
        }
    }

    /// Whether this error should additionally be logged at the call site
    /// (the wire shape alone doesn't carry enough detail for `NoSuchPeer`
    /// and `PeerUpcallFailed`, per spec §7).
    pub fn should_log(&self) -> bool {
        matches!(
            self,
            HubError::NoSuchPeer | HubError::PeerUpcallFailed(_) | HubError::Internal(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unauthenticated_is_false() {
        assert_eq!(HubError::Unauthenticated.to_wire(), Value::Bool(false));
    }

    #[test]
    fn test_no_such_peer_is_false() {
        assert_eq!(HubError::NoSuchPeer.to_wire(), Value::Bool(false));
    }

    #[test]
    fn test_invalid_argument_is_error_string() {
        let wire = HubError::InvalidArgument("bad type".to_string()).to_wire();
        assert_eq!(wire, Value::String("*ERROR* bad type".to_string()));
    }

    #[test]
    fn test_already_reserved_message() {
        let wire = HubError::AlreadyReserved("alice".to_string()).to_wire();
        assert_eq!(
            wire,
            Value::String("*ERROR* already reserved by alice".to_string())
        );
    }

    #[test]
    fn test_should_log() {
        assert!(HubError::NoSuchPeer.should_log());
        assert!(HubError::PeerUpcallFailed("x".into()).should_log());
        assert!(!HubError::Unauthenticated.should_log());
        assert!(!HubError::InvalidArgument("x".into()).should_log());
    }
}
