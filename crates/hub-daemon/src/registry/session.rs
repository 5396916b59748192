//! Session (C1): the per-connection record tracked by the Connection
//! Registry.

use crate::transport::PeerHandle;
use std::collections::BTreeSet;
use std::time::{SystemTime, UNIX_EPOCH};

/// Role a peer declares via `hello`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Client,
    Ep,
    Lib,
    Cli,
    Unset,
}

impl Role {
    /// Parse the prefix before `:` in a raw hello string.
    pub fn from_hello(hello_raw: &str) -> Self {
        let prefix = hello_raw.split(':').next().unwrap_or("");
        match prefix {
            "client" => Role::Client,
            "ep" => Role::Ep,
            "lib" => Role::Lib,
            "cli" => Role::Cli,
            _ => Role::Unset,
        }
    }

    /// Whether this role (or its sub-qualified variant) matches `filter`,
    /// per the Reverse Dispatcher's role-matching rule (spec §4.5): exact
    /// hello or prefix-before-`:` match.
    pub fn matches(&self, filter: &str) -> bool {
        self.as_str() == filter
    }

    fn as_str(&self) -> &'static str {
        match self {
            Role::Client => "client",
            Role::Ep => "ep",
            Role::Lib => "lib",
            Role::Cli => "cli",
            Role::Unset => "",
        }
    }
}

/// One per accepted connection. A passive record plus the peer handle
/// (spec §4.1); all mutation happens through the Connection Registry under
/// its single mutex.
#[derive(Clone)]
pub struct Session {
    pub addr: String,
    pub role: Role,
    pub hello_raw: String,
    pub user: String,
    pub authenticated: bool,
    pub eps: BTreeSet<String>,
    pub connected_at: u64,
    pub last_seen: u64,
    pub peer: PeerHandle,
}

impl Session {
    /// `on_accept`: a fresh, unauthenticated record with no declared role.
    pub fn new(addr: String, peer: PeerHandle) -> Self {
        let now = now_secs();
        Self {
            addr,
            role: Role::Unset,
            hello_raw: String::new(),
            user: String::new(),
            authenticated: false,
            eps: BTreeSet::new(),
            connected_at: now,
            last_seen: now,
            peer,
        }
    }

    /// `on_hello`: set declared role from the raw hello string.
    pub fn on_hello(&mut self, hello_raw: &str) {
        self.hello_raw = hello_raw.to_string();
        self.role = Role::from_hello(hello_raw);
        self.last_seen = now_secs();
    }

    pub fn touch(&mut self) {
        self.last_seen = now_secs();
    }

    /// (I2): `eps` may be non-empty only when authenticated and acting as a
    /// client.
    pub fn can_own_eps(&self) -> bool {
        self.authenticated && matches!(self.role, Role::Client)
    }
}

/// A stable, lock-free snapshot of a session's fields, returned by
/// `ConnectionRegistry::snapshot_iter` so dispatch never runs under the
/// registry mutex.
#[derive(Debug, Clone)]
pub struct SessionView {
    pub addr: String,
    pub role: Role,
    pub hello_raw: String,
    pub user: String,
    pub authenticated: bool,
    pub eps: BTreeSet<String>,
    pub peer: PeerHandle,
}

impl From<&Session> for SessionView {
    fn from(s: &Session) -> Self {
        Self {
            addr: s.addr.clone(),
            role: s.role,
            hello_raw: s.hello_raw.clone(),
            user: s.user.clone(),
            authenticated: s.authenticated,
            eps: s.eps.clone(),
            peer: s.peer.clone(),
        }
    }
}

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_from_hello_with_subqualifier() {
        assert_eq!(Role::from_hello("client:gui"), Role::Client);
        assert_eq!(Role::from_hello("ep"), Role::Ep);
        assert_eq!(Role::from_hello("bogus"), Role::Unset);
    }

    #[test]
    fn test_can_own_eps_requires_auth_and_client_role() {
        let mut s = Session::new("1.2.3.4:1".into(), PeerHandle::disconnected());
        assert!(!s.can_own_eps());
        s.authenticated = true;
        assert!(!s.can_own_eps());
        s.on_hello("client");
        assert!(s.can_own_eps());
    }

    #[test]
    fn test_on_hello_sets_role_and_raw() {
        let mut s = Session::new("1.2.3.4:1".into(), PeerHandle::disconnected());
        s.on_hello("ep:linux");
        assert_eq!(s.role, Role::Ep);
        assert_eq!(s.hello_raw, "ep:linux");
    }
}
