//! Auth Gate (C3): the one path that turns an anonymous [`Session`] into
//! an authenticated one.

use crate::registry::ConnectionRegistry;
use twister_hub_core::ProjectModel;

/// `login(user, password)` (spec §4.3): delegates credential checking to
/// the project model and, on success, stamps the session at `addr` as
/// authenticated. A session may re-login as a different user; this simply
/// overwrites the prior identity and leaves any previously registered EPs
/// in place under the old name until `unregister_eps`/disconnect clears
/// them.
pub fn login(
    registry: &ConnectionRegistry,
    project: &dyn ProjectModel,
    addr: &str,
    user: &str,
    password: &str,
) -> bool {
    let ok = project.check_login(user, password) && project.has_user_home(user);
    if ok {
        registry.with_session_mut(addr, |session| {
            session.user = user.to_string();
            session.authenticated = true;
            session.touch();
        });
    }
    ok
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::Session;
    use crate::transport::PeerHandle;
    use serde_json::Value;
    use twister_hub_core::{FileRef, HubError};

    struct FixedProject {
        accept: bool,
        has_home: bool,
    }

    #[allow(unused_variables)]
    impl ProjectModel for FixedProject {
        fn check_login(&self, user: &str, password: &str) -> bool {
            self.accept
        }
        fn has_user_home(&self, user: &str) -> bool {
            self.has_home
        }
        fn get_user_variable(&self, user: &str, key: &str) -> Option<Value> {
            None
        }
        fn set_user_variable(&self, user: &str, key: &str, value: Value) -> Result<(), HubError> {
            Ok(())
        }
        fn get_ep_variable(&self, user: &str, ep: &str, key: &str) -> Option<Value> {
            None
        }
        fn set_ep_variable(
            &self,
            user: &str,
            ep: &str,
            key: &str,
            value: Value,
        ) -> Result<(), HubError> {
            Ok(())
        }
        fn get_suite_variable(&self, user: &str, suite: &str, key: &str) -> Option<Value> {
            None
        }
        fn set_suite_variable(
            &self,
            user: &str,
            suite: &str,
            key: &str,
            value: Value,
        ) -> Result<(), HubError> {
            Ok(())
        }
        fn get_file_variable(&self, user: &str, file: &str, key: &str) -> Option<Value> {
            None
        }
        fn set_file_variable(
            &self,
            user: &str,
            file: &str,
            key: &str,
            value: Value,
        ) -> Result<(), HubError> {
            Ok(())
        }
        fn list_users(&self, _active_only: bool) -> Vec<String> {
            Vec::new()
        }
        fn encrypt_text(&self, plaintext: &str) -> String {
            plaintext.to_string()
        }
        fn decrypt_text(&self, ciphertext: &str) -> Result<String, HubError> {
            Ok(ciphertext.to_string())
        }
        fn dependency_info(&self, user: &str, name: &str) -> Option<Value> {
            None
        }
        fn set_persistent_suite(&self, user: &str, suite: &str, data: Value) -> Result<(), HubError> {
            Ok(())
        }
        fn del_persistent_suite(&self, user: &str, suite: &str) -> Result<(), HubError> {
            Ok(())
        }
        fn set_persistent_file(&self, user: &str, file: &str, data: Value) -> Result<(), HubError> {
            Ok(())
        }
        fn del_persistent_file(&self, user: &str, file: &str) -> Result<(), HubError> {
            Ok(())
        }
        fn list_settings(&self, user: &str) -> Vec<String> {
            Vec::new()
        }
        fn get_setting(&self, user: &str, key: &str) -> Option<Value> {
            None
        }
        fn set_setting(&self, user: &str, key: &str, value: Value) -> Result<(), HubError> {
            Ok(())
        }
        fn del_setting(&self, user: &str, key: &str) -> Result<(), HubError> {
            Ok(())
        }
        fn register_ep(&self, user: &str, ep_name: &str) -> bool {
            true
        }
        fn unregister_ep(&self, user: &str, ep_name: &str) -> bool {
            true
        }
        fn get_ep_status(&self, user: &str, ep: &str) -> Option<Value> {
            None
        }
        fn set_ep_status(&self, user: &str, ep: &str, status: Value) -> Result<(), HubError> {
            Ok(())
        }
        fn get_all_ep_status(&self, user: &str) -> Value {
            Value::Null
        }
        fn queue_file(&self, user: &str, ep: &str, file: &str) -> Result<(), HubError> {
            Ok(())
        }
        fn dequeue_files(&self, user: &str, ep: &str) -> Vec<String> {
            Vec::new()
        }
        fn set_file_status(&self, user: &str, file: &str, status: Value) -> Result<(), HubError> {
            Ok(())
        }
        fn set_file_status_all(
            &self,
            user: &str,
            ep: &str,
            status: Value,
        ) -> Result<(), HubError> {
            Ok(())
        }
        fn get_file_status_all(&self, user: &str, ep: &str) -> Value {
            Value::Null
        }
        fn list_libraries(&self, user: &str) -> Vec<String> {
            Vec::new()
        }
        fn resolve_library(&self, user: &str, name: &str) -> Result<Vec<u8>, HubError> {
            Err(HubError::NotFound(name.to_string()))
        }
        fn get_ep_files(&self, user: &str, ep: &str) -> Vec<FileRef> {
            Vec::new()
        }
        fn get_suite_files(&self, user: &str, suite: &str) -> Vec<FileRef> {
            Vec::new()
        }
        fn resolve_file(&self, user: &str, ep: &str, file_ref: &str) -> Result<FileRef, HubError> {
            Err(HubError::NotFound(file_ref.to_string()))
        }
        fn list_plugins(&self, user: &str) -> Vec<String> {
            Vec::new()
        }
        fn run_plugin(&self, user: &str, name: &str, params: Value) -> Result<Value, HubError> {
            Err(HubError::NotFound(name.to_string()))
        }
        fn get_log_file(
            &self,
            user: &str,
            name: &str,
            start: usize,
            read: usize,
        ) -> Result<String, HubError> {
            Ok(String::new())
        }
        fn log_message(&self, user: &str, name: &str, message: &str) -> Result<(), HubError> {
            Ok(())
        }
        fn log_live(&self, user: &str, name: &str) -> Result<String, HubError> {
            Ok(String::new())
        }
        fn reset_log(&self, user: &str, name: &str) -> Result<(), HubError> {
            Ok(())
        }
        fn reset_logs(&self, user: &str) -> Result<(), HubError> {
            Ok(())
        }
        fn persist_resource(
            &self,
            tree: &str,
            path: &str,
            user: &str,
            props: &Value,
        ) -> Result<(), HubError> {
            Ok(())
        }
    }

    #[test]
    fn test_login_success_marks_session_authenticated() {
        let registry = ConnectionRegistry::new();
        registry.insert(Session::new("a:1".into(), PeerHandle::disconnected()));
        let project = FixedProject {
            accept: true,
            has_home: true,
        };

        let ok = login(&registry, &project, "a:1", "alice", "secret");

        assert!(ok);
        let view = registry.get("a:1").unwrap();
        assert!(view.authenticated);
        assert_eq!(view.user, "alice");
    }

    #[test]
    fn test_login_failure_leaves_session_unauthenticated() {
        let registry = ConnectionRegistry::new();
        registry.insert(Session::new("a:1".into(), PeerHandle::disconnected()));
        let project = FixedProject {
            accept: false,
            has_home: true,
        };

        let ok = login(&registry, &project, "a:1", "alice", "wrong");

        assert!(!ok);
        let view = registry.get("a:1").unwrap();
        assert!(!view.authenticated);
    }

    #[test]
    fn test_login_rejected_without_user_home() {
        let registry = ConnectionRegistry::new();
        registry.insert(Session::new("a:1".into(), PeerHandle::disconnected()));
        let project = FixedProject {
            accept: true,
            has_home: false,
        };

        let ok = login(&registry, &project, "a:1", "alice", "secret");

        assert!(!ok);
    }
}
