//! `InMemoryProjectModel`: a reference [`ProjectModel`] sufficient to
//! exercise the façade and the testable properties in spec §8. Explicitly
//! a test/demo fixture (spec §1's Non-goals exclude the real project
//! model); a production deployment supplies its own.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Mutex;
use serde_json::{Map, Value};
use twister_hub_core::{FileRef, HubError, ProjectModel};

#[derive(Default)]
struct Inner {
    credentials: HashMap<String, String>,
    homes: HashSet<String>,
    active_users: HashSet<String>,

    user_vars: HashMap<String, HashMap<String, Value>>,
    ep_vars: HashMap<(String, String), HashMap<String, Value>>,
    suite_vars: HashMap<(String, String), HashMap<String, Value>>,
    file_vars: HashMap<(String, String), HashMap<String, Value>>,

    persistent_suites: HashMap<(String, String), Value>,
    persistent_files: HashMap<(String, String), Value>,
    settings: HashMap<(String, String), Value>,

    registered_eps: HashMap<String, HashSet<String>>,
    ep_status: HashMap<(String, String), Value>,

    queues: HashMap<(String, String), VecDeque<String>>,
    file_status: HashMap<(String, String), Value>,
    ep_files: HashMap<(String, String), Vec<String>>,

    libraries: HashMap<(String, String), Vec<u8>>,
    files: HashMap<(String, String), Vec<u8>>,

    plugins: HashSet<String>,

    logs: HashMap<(String, String), String>,
}

/// A `HashMap`-backed stand-in for the real project model. Every user
/// implicitly has a home (`homes` starts empty — call [`Self::grant_home`]
/// to model a user without one for login-gate tests).
pub struct InMemoryProjectModel {
    inner: Mutex<Inner>,
    default_home: bool,
}

impl Default for InMemoryProjectModel {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryProjectModel {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner::default()),
            default_home: true,
        }
    }

    /// Convenience constructor for tests: every `has_user_home` check fails
    /// unless explicitly granted via [`Self::grant_home`].
    pub fn without_default_home() -> Self {
        Self {
            inner: Mutex::new(Inner::default()),
            default_home: false,
        }
    }

    pub fn add_user(&self, user: &str, password: &str) {
        self.inner
            .lock()
            .unwrap()
            .credentials
            .insert(user.to_string(), password.to_string());
    }

    pub fn grant_home(&self, user: &str) {
        self.inner.lock().unwrap().homes.insert(user.to_string());
    }

    pub fn register_plugin(&self, name: &str) {
        self.inner.lock().unwrap().plugins.insert(name.to_string());
    }

    pub fn seed_library(&self, user: &str, name: &str, bytes: Vec<u8>) {
        self.inner
            .lock()
            .unwrap()
            .libraries
            .insert((user.to_string(), name.to_string()), bytes);
    }
}

fn as_object(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

impl ProjectModel for InMemoryProjectModel {
    fn check_login(&self, user: &str, password: &str) -> bool {
        let mut inner = self.inner.lock().unwrap();
        let ok = inner
            .credentials
            .get(user)
            .map(|stored| stored == password)
            .unwrap_or(false);
        if ok {
            inner.active_users.insert(user.to_string());
        }
        ok
    }

    fn has_user_home(&self, user: &str) -> bool {
        let inner = self.inner.lock().unwrap();
        self.default_home || inner.homes.contains(user)
    }

    fn get_user_variable(&self, user: &str, key: &str) -> Option<Value> {
        self.inner
            .lock()
            .unwrap()
            .user_vars
            .get(user)
            .and_then(|vars| vars.get(key))
            .cloned()
    }

    fn set_user_variable(&self, user: &str, key: &str, value: Value) -> Result<(), HubError> {
        self.inner
            .lock()
            .unwrap()
            .user_vars
            .entry(user.to_string())
            .or_default()
            .insert(key.to_string(), value);
        Ok(())
    }

    fn get_ep_variable(&self, user: &str, ep: &str, key: &str) -> Option<Value> {
        self.inner
            .lock()
            .unwrap()
            .ep_vars
            .get(&(user.to_string(), ep.to_string()))
            .and_then(|vars| vars.get(key))
            .cloned()
    }

    fn set_ep_variable(
        &self,
        user: &str,
        ep: &str,
        key: &str,
        value: Value,
    ) -> Result<(), HubError> {
        self.inner
            .lock()
            .unwrap()
            .ep_vars
            .entry((user.to_string(), ep.to_string()))
            .or_default()
            .insert(key.to_string(), value);
        Ok(())
    }

    fn get_suite_variable(&self, user: &str, suite: &str, key: &str) -> Option<Value> {
        self.inner
            .lock()
            .unwrap()
            .suite_vars
            .get(&(user.to_string(), suite.to_string()))
            .and_then(|vars| vars.get(key))
            .cloned()
    }

    fn set_suite_variable(
        &self,
        user: &str,
        suite: &str,
        key: &str,
        value: Value,
    ) -> Result<(), HubError> {
        self.inner
            .lock()
            .unwrap()
            .suite_vars
            .entry((user.to_string(), suite.to_string()))
            .or_default()
            .insert(key.to_string(), value);
        Ok(())
    }

    fn get_file_variable(&self, user: &str, file: &str, key: &str) -> Option<Value> {
        self.inner
            .lock()
            .unwrap()
            .file_vars
            .get(&(user.to_string(), file.to_string()))
            .and_then(|vars| vars.get(key))
            .cloned()
    }

    fn set_file_variable(
        &self,
        user: &str,
        file: &str,
        key: &str,
        value: Value,
    ) -> Result<(), HubError> {
        self.inner
            .lock()
            .unwrap()
            .file_vars
            .entry((user.to_string(), file.to_string()))
            .or_default()
            .insert(key.to_string(), value);
        Ok(())
    }

    fn list_users(&self, active_only: bool) -> Vec<String> {
        let inner = self.inner.lock().unwrap();
        let mut users: Vec<String> = if active_only {
            inner.active_users.iter().cloned().collect()
        } else {
            inner.credentials.keys().cloned().collect()
        };
        users.sort();
        users
    }

    fn encrypt_text(&self, plaintext: &str) -> String {
        hex_encode(plaintext.as_bytes())
    }

    fn decrypt_text(&self, ciphertext: &str) -> Result<String, HubError> {
        let bytes = hex_decode(ciphertext)
            .ok_or_else(|| HubError::InvalidArgument("not valid ciphertext".to_string()))?;
        String::from_utf8(bytes)
            .map_err(|_| HubError::InvalidArgument("not valid ciphertext".to_string()))
    }

    fn dependency_info(&self, _user: &str, _name: &str) -> Option<Value> {
        None
    }

    fn set_persistent_suite(&self, user: &str, suite: &str, data: Value) -> Result<(), HubError> {
        self.inner
            .lock()
            .unwrap()
            .persistent_suites
            .insert((user.to_string(), suite.to_string()), data);
        Ok(())
    }

    fn del_persistent_suite(&self, user: &str, suite: &str) -> Result<(), HubError> {
        self.inner
            .lock()
            .unwrap()
            .persistent_suites
            .remove(&(user.to_string(), suite.to_string()));
        Ok(())
    }

    fn set_persistent_file(&self, user: &str, file: &str, data: Value) -> Result<(), HubError> {
        self.inner
            .lock()
            .unwrap()
            .persistent_files
            .insert((user.to_string(), file.to_string()), data);
        Ok(())
    }

    fn del_persistent_file(&self, user: &str, file: &str) -> Result<(), HubError> {
        self.inner
            .lock()
            .unwrap()
            .persistent_files
            .remove(&(user.to_string(), file.to_string()));
        Ok(())
    }

    fn list_settings(&self, user: &str) -> Vec<String> {
        let inner = self.inner.lock().unwrap();
        let mut keys: Vec<String> = inner
            .settings
            .keys()
            .filter(|(u, _)| u == user)
            .map(|(_, k)| k.clone())
            .collect();
        keys.sort();
        keys
    }

    fn get_setting(&self, user: &str, key: &str) -> Option<Value> {
        self.inner
            .lock()
            .unwrap()
            .settings
            .get(&(user.to_string(), key.to_string()))
            .cloned()
    }

    fn set_setting(&self, user: &str, key: &str, value: Value) -> Result<(), HubError> {
        self.inner
            .lock()
            .unwrap()
            .settings
            .insert((user.to_string(), key.to_string()), value);
        Ok(())
    }

    fn del_setting(&self, user: &str, key: &str) -> Result<(), HubError> {
        self.inner
            .lock()
            .unwrap()
            .settings
            .remove(&(user.to_string(), key.to_string()));
        Ok(())
    }

    fn register_ep(&self, user: &str, ep_name: &str) -> bool {
        if ep_name.is_empty() {
            return false;
        }
        self.inner
            .lock()
            .unwrap()
            .registered_eps
            .entry(user.to_string())
            .or_default()
            .insert(ep_name.to_string());
        true
    }

    fn unregister_ep(&self, user: &str, ep_name: &str) -> bool {
        self.inner
            .lock()
            .unwrap()
            .registered_eps
            .get_mut(user)
            .map(|eps| eps.remove(ep_name))
            .unwrap_or(false)
    }

    fn get_ep_status(&self, user: &str, ep: &str) -> Option<Value> {
        self.inner
            .lock()
            .unwrap()
            .ep_status
            .get(&(user.to_string(), ep.to_string()))
            .cloned()
    }

    fn set_ep_status(&self, user: &str, ep: &str, status: Value) -> Result<(), HubError> {
        self.inner
            .lock()
            .unwrap()
            .ep_status
            .insert((user.to_string(), ep.to_string()), status);
        Ok(())
    }

    fn get_all_ep_status(&self, user: &str) -> Value {
        let inner = self.inner.lock().unwrap();
        let mut out = Map::new();
        for ((u, ep), status) in inner.ep_status.iter() {
            if u == user {
                out.insert(ep.clone(), status.clone());
            }
        }
        Value::Object(out)
    }

    fn queue_file(&self, user: &str, ep: &str, file: &str) -> Result<(), HubError> {
        let mut inner = self.inner.lock().unwrap();
        inner
            .queues
            .entry((user.to_string(), ep.to_string()))
            .or_default()
            .push_back(file.to_string());
        inner
            .ep_files
            .entry((user.to_string(), ep.to_string()))
            .or_default()
            .push(file.to_string());
        Ok(())
    }

    fn dequeue_files(&self, user: &str, ep: &str) -> Vec<String> {
        let mut inner = self.inner.lock().unwrap();
        match inner.queues.get_mut(&(user.to_string(), ep.to_string())) {
            Some(queue) => queue.drain(..).collect(),
            None => Vec::new(),
        }
    }

    fn set_file_status(&self, user: &str, file: &str, status: Value) -> Result<(), HubError> {
        self.inner
            .lock()
            .unwrap()
            .file_status
            .insert((user.to_string(), file.to_string()), status);
        Ok(())
    }

    fn set_file_status_all(&self, user: &str, ep: &str, status: Value) -> Result<(), HubError> {
        let mut inner = self.inner.lock().unwrap();
        let files = inner
            .ep_files
            .get(&(user.to_string(), ep.to_string()))
            .cloned()
            .unwrap_or_default();
        for file in files {
            inner
                .file_status
                .insert((user.to_string(), file), status.clone());
        }
        Ok(())
    }

    fn get_file_status_all(&self, user: &str, ep: &str) -> Value {
        let inner = self.inner.lock().unwrap();
        let files = inner
            .ep_files
            .get(&(user.to_string(), ep.to_string()))
            .cloned()
            .unwrap_or_default();
        let mut out = Map::new();
        for file in files {
            if let Some(status) = inner.file_status.get(&(user.to_string(), file.clone())) {
                out.insert(file, status.clone());
            }
        }
        Value::Object(out)
    }

    fn list_libraries(&self, user: &str) -> Vec<String> {
        let inner = self.inner.lock().unwrap();
        let mut names: Vec<String> = inner
            .libraries
            .keys()
            .filter(|(u, _)| u == user)
            .map(|(_, name)| name.clone())
            .collect();
        names.sort();
        names
    }

    fn resolve_library(&self, user: &str, name: &str) -> Result<Vec<u8>, HubError> {
        self.inner
            .lock()
            .unwrap()
            .libraries
            .get(&(user.to_string(), name.to_string()))
            .cloned()
            .ok_or_else(|| HubError::NotFound(name.to_string()))
    }

    fn get_ep_files(&self, user: &str, ep: &str) -> Vec<FileRef> {
        self.inner
            .lock()
            .unwrap()
            .ep_files
            .get(&(user.to_string(), ep.to_string()))
            .cloned()
            .unwrap_or_default()
            .into_iter()
            .map(FileRef::plain)
            .collect()
    }

    fn get_suite_files(&self, _user: &str, _suite: &str) -> Vec<FileRef> {
        Vec::new()
    }

    fn resolve_file(&self, user: &str, _ep: &str, file_ref: &str) -> Result<FileRef, HubError> {
        self.inner
            .lock()
            .unwrap()
            .files
            .get(&(user.to_string(), file_ref.to_string()))
            .map(|_| FileRef::plain(file_ref.to_string()))
            .ok_or_else(|| HubError::NotFound(file_ref.to_string()))
    }

    fn list_plugins(&self, _user: &str) -> Vec<String> {
        let mut names: Vec<String> = self.inner.lock().unwrap().plugins.iter().cloned().collect();
        names.sort();
        names
    }

    fn run_plugin(&self, _user: &str, name: &str, params: Value) -> Result<Value, HubError> {
        let inner = self.inner.lock().unwrap();
        if !inner.plugins.contains(name) {
            return Err(HubError::NotFound(name.to_string()));
        }
        let mut result = as_object(params);
        result.insert("plugin".to_string(), Value::String(name.to_string()));
        Ok(Value::Object(result))
    }

    fn get_log_file(
        &self,
        user: &str,
        name: &str,
        start: usize,
        read: usize,
    ) -> Result<String, HubError> {
        let inner = self.inner.lock().unwrap();
        let contents = inner
            .logs
            .get(&(user.to_string(), name.to_string()))
            .cloned()
            .unwrap_or_default();
        let end = (start + read).min(contents.len());
        if start >= contents.len() {
            return Ok(String::new());
        }
        Ok(contents[start..end].to_string())
    }

    fn log_message(&self, user: &str, name: &str, message: &str) -> Result<(), HubError> {
        let mut inner = self.inner.lock().unwrap();
        let entry = inner
            .logs
            .entry((user.to_string(), name.to_string()))
            .or_default();
        entry.push_str(message);
        entry.push('\n');
        Ok(())
    }

    fn log_live(&self, user: &str, name: &str) -> Result<String, HubError> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .logs
            .get(&(user.to_string(), name.to_string()))
            .cloned()
            .unwrap_or_default())
    }

    fn reset_log(&self, user: &str, name: &str) -> Result<(), HubError> {
        self.inner
            .lock()
            .unwrap()
            .logs
            .remove(&(user.to_string(), name.to_string()));
        Ok(())
    }

    fn reset_logs(&self, user: &str) -> Result<(), HubError> {
        self.inner
            .lock()
            .unwrap()
            .logs
            .retain(|(u, _), _| u != user);
        Ok(())
    }

    fn persist_resource(
        &self,
        _tree: &str,
        _path: &str,
        _user: &str,
        _props: &Value,
    ) -> Result<(), HubError> {
        Ok(())
    }
}

fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

fn hex_decode(s: &str) -> Option<Vec<u8>> {
    if s.len() % 2 != 0 {
        return None;
    }
    (0..s.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&s[i..i + 2], 16).ok())
        .collect()
}
