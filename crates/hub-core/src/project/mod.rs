//! The project model collaborator interface.
//!
//! The project model itself — suites, files, settings, globals, users,
//! logs, persistence, the plugin engine, the filesystem/ClearCase and
//! versioned-FS backends, the encryption service — is explicitly out of
//! scope for this crate (spec §1). [`ProjectModel`] is the seam the core
//! calls through; `hub-daemon` ships an in-memory reference implementation
//! for tests and local development, and a production deployment would
//! supply its own.

mod types;

pub use types::{FileRef, LibrarySource};

use crate::error::HubError;
use serde_json::Value;

/// Everything the Operation Façade (C6) and Resource Reservation Engine
/// (C7) delegate to once a call has cleared the Auth Gate.
///
/// Every method is scoped to the authenticated `user` string the façade
/// obtained from the caller's session; the project model is assumed
/// internally thread-safe per user (spec §5).
pub trait ProjectModel: Send + Sync {
    /// Verify a user's credentials. Never logs the password.
    fn check_login(&self, user: &str, password: &str) -> bool;

    /// Whether `user`'s per-user twister home exists; a user without one
    /// cannot log in even with correct credentials (spec §6).
    fn has_user_home(&self, user: &str) -> bool;

    // --- variables -------------------------------------------------

    fn get_user_variable(&self, user: &str, key: &str) -> Option<Value>;
    fn set_user_variable(&self, user: &str, key: &str, value: Value) -> Result<(), HubError>;
    fn get_ep_variable(&self, user: &str, ep: &str, key: &str) -> Option<Value>;
    fn set_ep_variable(&self, user: &str, ep: &str, key: &str, value: Value) -> Result<(), HubError>;
    fn get_suite_variable(&self, user: &str, suite: &str, key: &str) -> Option<Value>;
    fn set_suite_variable(
        &self,
        user: &str,
        suite: &str,
        key: &str,
        value: Value,
    ) -> Result<(), HubError>;
    fn get_file_variable(&self, user: &str, file: &str, key: &str) -> Option<Value>;
    fn set_file_variable(
        &self,
        user: &str,
        file: &str,
        key: &str,
        value: Value,
    ) -> Result<(), HubError>;

    /// Active users, or all known users when `active_only` is false.
    fn list_users(&self, active_only: bool) -> Vec<String>;

    fn encrypt_text(&self, plaintext: &str) -> String;
    fn decrypt_text(&self, ciphertext: &str) -> Result<String, HubError>;

    fn dependency_info(&self, user: &str, name: &str) -> Option<Value>;

    // --- persistent project edits -----------------------------------

    fn set_persistent_suite(&self, user: &str, suite: &str, data: Value) -> Result<(), HubError>;
    fn del_persistent_suite(&self, user: &str, suite: &str) -> Result<(), HubError>;
    fn set_persistent_file(&self, user: &str, file: &str, data: Value) -> Result<(), HubError>;
    fn del_persistent_file(&self, user: &str, file: &str) -> Result<(), HubError>;

    fn list_settings(&self, user: &str) -> Vec<String>;
    fn get_setting(&self, user: &str, key: &str) -> Option<Value>;
    fn set_setting(&self, user: &str, key: &str, value: Value) -> Result<(), HubError>;
    fn del_setting(&self, user: &str, key: &str) -> Result<(), HubError>;

    // --- EP registration at the persistence layer --------------------

    /// Register one EP name for `user` at the project-model level
    /// (durable bookkeeping; ownership arbitration lives in the EP
    /// ledger). Returns false if the project model rejects the name.
    fn register_ep(&self, user: &str, ep_name: &str) -> bool;
    fn unregister_ep(&self, user: &str, ep_name: &str) -> bool;

    fn get_ep_status(&self, user: &str, ep: &str) -> Option<Value>;
    fn set_ep_status(&self, user: &str, ep: &str, status: Value) -> Result<(), HubError>;
    fn get_all_ep_status(&self, user: &str) -> Value;

    // --- runtime queue and file status --------------------------------

    fn queue_file(&self, user: &str, ep: &str, file: &str) -> Result<(), HubError>;
    fn dequeue_files(&self, user: &str, ep: &str) -> Vec<String>;
    fn set_file_status(&self, user: &str, file: &str, status: Value) -> Result<(), HubError>;
    fn set_file_status_all(&self, user: &str, ep: &str, status: Value) -> Result<(), HubError>;
    fn get_file_status_all(&self, user: &str, ep: &str) -> Value;

    // --- libraries and test files --------------------------------------

    fn list_libraries(&self, user: &str) -> Vec<String>;

    /// Resolve `name` against, in order: a user-enabled versioned-FS
    /// config, the user's library root, the global library root
    /// (spec §4.6). Returns the raw or archived bytes, or `NotFound`.
    fn resolve_library(&self, user: &str, name: &str) -> Result<Vec<u8>, HubError>;

    fn get_ep_files(&self, user: &str, ep: &str) -> Vec<FileRef>;
    fn get_suite_files(&self, user: &str, suite: &str) -> Vec<FileRef>;

    /// Resolve a file reference (path or file-id) for `download_file`.
    /// `FileRef::revision` is populated when the source carries a
    /// versioned-FS marker.
    fn resolve_file(&self, user: &str, ep: &str, file_ref: &str) -> Result<FileRef, HubError>;

    // --- plugins -----------------------------------------------------

    fn list_plugins(&self, user: &str) -> Vec<String>;

    /// Construct/obtain a plugin instance and invoke its `run(params)`.
    /// Any failure inside the plugin is converted to a string error
    /// result by the caller, not raised.
    fn run_plugin(&self, user: &str, name: &str, params: Value) -> Result<Value, HubError>;

    // --- logs ----------------------------------------------------------

    fn get_log_file(&self, user: &str, name: &str, start: usize, read: usize) -> Result<String, HubError>;
    fn log_message(&self, user: &str, name: &str, message: &str) -> Result<(), HubError>;
    fn log_live(&self, user: &str, name: &str) -> Result<String, HubError>;
    fn reset_log(&self, user: &str, name: &str) -> Result<(), HubError>;
    fn reset_logs(&self, user: &str) -> Result<(), HubError>;

    // --- resource persistence hook -------------------------------------

    /// Commit a resource node's working copy to durable storage. Called by
    /// the Resource Reservation Engine on `save_reserved` /
    /// `save_release_reserved`; the engine has already applied the new
    /// `props` in memory by the time this is called.
    fn persist_resource(&self, tree: &str, path: &str, user: &str, props: &Value) -> Result<(), HubError>;
}
