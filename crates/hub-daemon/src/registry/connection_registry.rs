//! Connection Registry (C2) and, layered on the same lock, the EP
//! Ownership Ledger (C4) — spec §3 describes the ledger as "a derivable
//! view of C2", so both share one mutex rather than risking the two
//! getting out of sync under independent locks.

use crate::registry::session::{Role, Session, SessionView};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::{info, warn};
use twister_hub_core::HubError;

struct Inner {
    sessions: HashMap<String, Session>,
}

/// The single process-wide table of live sessions (spec §4.2). Protected
/// by one mutex; upcalls must never run while it is held.
#[derive(Clone)]
pub struct ConnectionRegistry {
    inner: Arc<Mutex<Inner>>,
}

impl Default for ConnectionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                sessions: HashMap::new(),
            })),
        }
    }

    /// `on_accept`: insert a fresh, unauthenticated session.
    pub fn insert(&self, session: Session) {
        let mut guard = self.inner.lock().unwrap();
        guard.sessions.insert(session.addr.clone(), session);
    }

    /// `on_disconnect`: remove the session, returning the EP names it
    /// owned so the caller can log the teardown. (I4): this happens under
    /// the same lock acquisition as the removal, so no other task can
    /// observe the session gone from the registry while its EPs still
    /// appear owned elsewhere — the open question in spec §9 about a
    /// non-atomic read/delete is resolved here by holding the lock across
    /// both.
    pub fn remove(&self, addr: &str) -> Option<Session> {
        let mut guard = self.inner.lock().unwrap();
        guard.sessions.remove(addr)
    }

    pub fn get(&self, addr: &str) -> Option<SessionView> {
        let guard = self.inner.lock().unwrap();
        guard.sessions.get(addr).map(SessionView::from)
    }

    /// Mutate a session in place under the lock. Returns `false` if no
    /// session exists at `addr`.
    pub fn with_session_mut<F: FnOnce(&mut Session)>(&self, addr: &str, f: F) -> bool {
        let mut guard = self.inner.lock().unwrap();
        match guard.sessions.get_mut(addr) {
            Some(session) => {
                f(session);
                true
            }
            None => false,
        }
    }

    /// First session matching `predicate`, evaluated under the lock but
    /// returned as a detached snapshot.
    pub fn find_first<F: Fn(&Session) -> bool>(&self, predicate: F) -> Option<SessionView> {
        let guard = self.inner.lock().unwrap();
        guard
            .sessions
            .values()
            .find(|s| predicate(s))
            .map(SessionView::from)
    }

    /// A stable copy of every session, safe to iterate without holding the
    /// lock.
    pub fn snapshot_iter(&self) -> Vec<SessionView> {
        let guard = self.inner.lock().unwrap();
        guard.sessions.values().map(SessionView::from).collect()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().unwrap().sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // --- EP Ownership Ledger (C4) ------------------------------------

    /// Register `eps` as owned by the session at `addr`. Steps (spec
    /// §4.4), all under the single lock:
    /// 1. caller ensures project-model registration happened and passes
    ///    only the names that succeeded;
    /// 2. remove those names from every other session owned by the same
    ///    user (ownership transfer);
    /// 3. replace the target session's `eps` with the sorted unique set.
    ///
    /// Returns the list of `(other_addr, name)` pairs whose ownership was
    /// transferred away, for the caller to log.
    pub fn register_eps(&self, addr: &str, user: &str, eps: &[String]) -> Vec<(String, String)> {
        let mut guard = self.inner.lock().unwrap();
        let mut transferred = Vec::new();

        let incoming: std::collections::BTreeSet<String> = eps.iter().cloned().collect();

        for (other_addr, session) in guard.sessions.iter_mut() {
            if other_addr == addr || session.user != user {
                continue;
            }
            for name in &incoming {
                if session.eps.remove(name) {
                    transferred.push((other_addr.clone(), name.clone()));
                }
            }
        }

        if let Some(session) = guard.sessions.get_mut(addr) {
            session.eps = incoming;
        }

        transferred
    }

    /// Remove `eps` from the session at `addr`. Spec §4.4: failures for
    /// individual names at the project-model layer are logged by the
    /// caller and do not abort the batch; this call always removes
    /// whatever names are present locally.
    pub fn unregister_eps(&self, addr: &str, eps: &[String]) {
        let mut guard = self.inner.lock().unwrap();
        if let Some(session) = guard.sessions.get_mut(addr) {
            for name in eps {
                session.eps.remove(name);
            }
        }
    }

    /// `find_owner(user, ep_name)`: linear scan for the one session that
    /// may contain it (I3: at most one).
    pub fn find_owner(&self, user: &str, ep_name: &str) -> Option<String> {
        let guard = self.inner.lock().unwrap();
        guard
            .sessions
            .values()
            .find(|s| s.user == user && s.authenticated && s.eps.contains(ep_name))
            .map(|s| s.addr.clone())
    }

    /// `registered_eps(user)`: EP names across every session authenticated
    /// as `user` acting as a client (spec §9's resolved open question).
    pub fn registered_eps(&self, user: &str) -> Vec<String> {
        let guard = self.inner.lock().unwrap();
        let mut names: Vec<String> = guard
            .sessions
            .values()
            .filter(|s| s.user == user && s.authenticated && matches!(s.role, Role::Client))
            .flat_map(|s| s.eps.iter().cloned())
            .collect();
        names.sort();
        names.dedup();
        names
    }
}

/// Convenience used by the façade's `register_eps` operation: logs each
/// transfer and each failed project-model registration, matching spec
/// §4.4 step 2's "emit a log record identifying source→destination addr".
pub fn log_registration(addr: &str, transferred: &[(String, String)], failed_names: &[String]) {
    for (from_addr, name) in transferred {
        info!(%from_addr, to_addr = %addr, ep = %name, "EP ownership transferred");
    }
    for name in failed_names {
        warn!(%addr, ep = %name, "EP registration rejected by project model");
    }
}

/// Require an authenticated caller for `addr`, returning the user id or
/// `Unauthenticated` (spec §4.3).
pub fn require_user(registry: &ConnectionRegistry, addr: &str) -> Result<String, HubError> {
    match registry.get(addr) {
        Some(view) if view.authenticated => Ok(view.user),
        _ => Err(HubError::Unauthenticated),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::PeerHandle;

    fn auth_session(addr: &str, user: &str) -> Session {
        let mut s = Session::new(addr.to_string(), PeerHandle::disconnected());
        s.on_hello("client");
        s.user = user.to_string();
        s.authenticated = true;
        s
    }

    #[test]
    fn test_insert_get_remove() {
        let reg = ConnectionRegistry::new();
        reg.insert(Session::new("a:1".into(), PeerHandle::disconnected()));
        assert!(reg.get("a:1").is_some());
        assert_eq!(reg.len(), 1);

        let removed = reg.remove("a:1");
        assert!(removed.is_some());
        assert!(reg.get("a:1").is_none());
        assert!(reg.is_empty());
    }

    #[test]
    fn test_register_eps_transfers_ownership() {
        let reg = ConnectionRegistry::new();
        reg.insert(auth_session("a:1", "alice"));
        reg.insert(auth_session("a:2", "alice"));

        reg.register_eps("a:1", "alice", &["ep-x".to_string()]);
        assert_eq!(reg.find_owner("alice", "ep-x"), Some("a:1".to_string()));

        let transferred = reg.register_eps("a:2", "alice", &["ep-x".to_string()]);
        assert_eq!(transferred, vec![("a:1".to_string(), "ep-x".to_string())]);
        assert_eq!(reg.find_owner("alice", "ep-x"), Some("a:2".to_string()));

        // P2: exactly one owner after the transfer.
        let owners = reg
            .snapshot_iter()
            .into_iter()
            .filter(|s| s.eps.contains("ep-x"))
            .count();
        assert_eq!(owners, 1);
    }

    #[test]
    fn test_register_eps_does_not_cross_users() {
        let reg = ConnectionRegistry::new();
        reg.insert(auth_session("a:1", "alice"));
        reg.insert(auth_session("b:1", "bob"));

        reg.register_eps("a:1", "alice", &["ep-x".to_string()]);
        let transferred = reg.register_eps("b:1", "bob", &["ep-x".to_string()]);

        assert!(transferred.is_empty());
        assert_eq!(reg.find_owner("alice", "ep-x"), Some("a:1".to_string()));
        assert_eq!(reg.find_owner("bob", "ep-x"), Some("b:1".to_string()));
    }

    #[test]
    fn test_disconnect_cleans_up_ledger() {
        let reg = ConnectionRegistry::new();
        reg.insert(auth_session("a:1", "alice"));
        reg.register_eps("a:1", "alice", &["ep-x".to_string()]);

        reg.remove("a:1");

        assert_eq!(reg.find_owner("alice", "ep-x"), None);
        assert!(reg.get("a:1").is_none());
    }

    #[test]
    fn test_registered_eps_excludes_unauthenticated_and_non_client() {
        let reg = ConnectionRegistry::new();
        reg.insert(auth_session("a:1", "alice"));
        reg.register_eps("a:1", "alice", &["ep-a".to_string(), "ep-b".to_string()]);

        let mut unset = Session::new("a:2".into(), PeerHandle::disconnected());
        unset.user = "alice".to_string();
        unset.authenticated = true;
        reg.insert(unset);

        assert_eq!(reg.registered_eps("alice"), vec!["ep-a", "ep-b"]);
    }

    #[test]
    fn test_require_user_unauthenticated() {
        let reg = ConnectionRegistry::new();
        reg.insert(Session::new("a:1".into(), PeerHandle::disconnected()));
        assert_eq!(require_user(&reg, "a:1"), Err(HubError::Unauthenticated));
        assert_eq!(require_user(&reg, "missing"), Err(HubError::Unauthenticated));
    }

    #[test]
    fn test_require_user_authenticated() {
        let reg = ConnectionRegistry::new();
        reg.insert(auth_session("a:1", "alice"));
        assert_eq!(require_user(&reg, "a:1"), Ok("alice".to_string()));
    }
}
