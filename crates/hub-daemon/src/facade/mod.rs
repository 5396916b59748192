//! Operation Façade (C6): one method-routed entry point per exposed
//! operation, uniformly authenticate → validate → delegate (spec §4.6).

mod ep_control;
mod libraries;
mod logs;
mod persistent;
mod plugins;
mod queue;
mod resources_ops;
mod session;
mod variables;

use crate::project::InMemoryProjectModel;
use crate::registry::ConnectionRegistry;
use crate::resources::ResourceTree;
use serde_json::Value;
use std::sync::{Arc, Mutex};
use tokio::time::Duration;
use tracing::warn;
use twister_hub_core::{CommandEnvelope, HubError, ProjectModel, Request, Response};

/// Methods that never require an authenticated session (spec §4.6.1).
const UNAUTHENTICATED_METHODS: &[&str] =
    &["get_log_level", "set_log_level", "echo", "hub_address", "login", "hello"];

pub struct Facade {
    pub registry: ConnectionRegistry,
    pub project: Arc<dyn ProjectModel>,
    pub tb: ResourceTree,
    pub sut: ResourceTree,
    pub upcall_deadline: Duration,
    pub hub_address: String,
    log_level: Mutex<String>,
}

impl Facade {
    pub fn new(
        registry: ConnectionRegistry,
        project: Arc<dyn ProjectModel>,
        hub_address: String,
        upcall_deadline: Duration,
        default_log_level: String,
    ) -> Self {
        Self {
            registry,
            project,
            tb: ResourceTree::new("tb"),
            sut: ResourceTree::new("sut"),
            upcall_deadline,
            hub_address,
            log_level: Mutex::new(default_log_level),
        }
    }

    pub fn with_in_memory_project(hub_address: String, upcall_deadline: Duration) -> Self {
        Self::new(
            ConnectionRegistry::new(),
            Arc::new(InMemoryProjectModel::new()),
            hub_address,
            upcall_deadline,
            "info".to_string(),
        )
    }

    /// Dispatch one inbound request to completion, always returning a
    /// `Response` (never panicking on caller input) — the boundary where
    /// every [`HubError`] becomes the wire contract's `false`/`*ERROR*`
    /// shape.
    pub async fn dispatch(&self, addr: String, request: Request) -> Response {
        let id = request.id;
        match self.route(&addr, &request).await {
            Ok(value) => Response::ok(id, value),
            Err(err) => {
                if err.should_log() {
                    warn!(%addr, method = %request.method, error = %err, "operation failed");
                }
                Response::ok(id, err.to_wire())
            }
        }
    }

    async fn route(&self, addr: &str, request: &Request) -> Result<Value, HubError> {
        let method = request.method.as_str();

        if !UNAUTHENTICATED_METHODS.contains(&method) {
            crate::registry::require_user(&self.registry, addr)?;
        }

        match method {
            "echo" => session::echo(request),
            "hub_address" => Ok(Value::String(self.hub_address.clone())),
            "get_log_level" => Ok(Value::String(self.log_level.lock().unwrap().clone())),
            "set_log_level" => session::set_log_level(&self.log_level, request),
            "login" => session::login(&self.registry, self.project.as_ref(), addr, request),
            "hello" => session::hello(&self.registry, self.project.as_ref(), addr, request),

            "get_user_variable" => variables::get_user_variable(self.project.as_ref(), addr, &self.registry, request),
            "set_user_variable" => variables::set_user_variable(self.project.as_ref(), addr, &self.registry, request),
            "get_ep_variable" => variables::get_ep_variable(self.project.as_ref(), addr, &self.registry, request),
            "set_ep_variable" => variables::set_ep_variable(self.project.as_ref(), addr, &self.registry, request),
            "get_suite_variable" => variables::get_suite_variable(self.project.as_ref(), addr, &self.registry, request),
            "set_suite_variable" => variables::set_suite_variable(self.project.as_ref(), addr, &self.registry, request),
            "get_file_variable" => variables::get_file_variable(self.project.as_ref(), addr, &self.registry, request),
            "set_file_variable" => variables::set_file_variable(self.project.as_ref(), addr, &self.registry, request),
            "list_users" => variables::list_users(self.project.as_ref(), request),
            "encrypt_text" => variables::encrypt_text(self.project.as_ref(), request),
            "decrypt_text" => variables::decrypt_text(self.project.as_ref(), request),
            "dependency_info" => variables::dependency_info(self.project.as_ref(), addr, &self.registry, request),

            "set_persistent_suite" => persistent::set_persistent_suite(self.project.as_ref(), addr, &self.registry, request),
            "del_persistent_suite" => persistent::del_persistent_suite(self.project.as_ref(), addr, &self.registry, request),
            "set_persistent_file" => persistent::set_persistent_file(self.project.as_ref(), addr, &self.registry, request),
            "del_persistent_file" => persistent::del_persistent_file(self.project.as_ref(), addr, &self.registry, request),
            "list_settings" => persistent::list_settings(self.project.as_ref(), addr, &self.registry),
            "get_setting" => persistent::get_setting(self.project.as_ref(), addr, &self.registry, request),
            "set_setting" => persistent::set_setting(self.project.as_ref(), addr, &self.registry, request),
            "del_setting" => persistent::del_setting(self.project.as_ref(), addr, &self.registry, request),

            "register_eps" => {
                ep_control::register_eps(
                    &self.registry,
                    self.project.as_ref(),
                    addr,
                    request,
                    &self.hub_address,
                    self.upcall_deadline,
                )
                .await
            }
            "unregister_eps" => ep_control::unregister_eps(&self.registry, self.project.as_ref(), addr, request),
            "list_eps" => ep_control::list_eps(self.project.as_ref(), addr, &self.registry),
            "registered_eps" => ep_control::registered_eps(&self.registry, addr),
            "start_ep" => ep_control::start_ep(&self.registry, addr, request, self.upcall_deadline).await,
            "stop_ep" => ep_control::stop_ep(&self.registry, addr, request, self.upcall_deadline).await,
            "get_ep_status" => ep_control::get_ep_status(self.project.as_ref(), addr, &self.registry, request),
            "set_ep_status" => ep_control::set_ep_status(self.project.as_ref(), addr, &self.registry, request),
            "get_all_ep_status" => ep_control::get_all_ep_status(self.project.as_ref(), addr, &self.registry),

            "queue_file" => queue::queue_file(self.project.as_ref(), addr, &self.registry, request),
            "dequeue_files" => queue::dequeue_files(self.project.as_ref(), addr, &self.registry, request),
            "set_file_status" => queue::set_file_status(self.project.as_ref(), addr, &self.registry, request),
            "set_file_status_all" => queue::set_file_status_all(self.project.as_ref(), addr, &self.registry, request),
            "get_file_status_all" => queue::get_file_status_all(self.project.as_ref(), addr, &self.registry, request),

            "list_libraries" => libraries::list_libraries(self.project.as_ref(), addr, &self.registry),
            "download_library" => libraries::download_library(self.project.as_ref(), addr, &self.registry, request),
            "get_ep_files" => libraries::get_ep_files(self.project.as_ref(), addr, &self.registry, request),
            "get_suite_files" => libraries::get_suite_files(self.project.as_ref(), addr, &self.registry, request),
            "download_file" => libraries::download_file(self.project.as_ref(), addr, &self.registry, request),

            "list_plugins" => plugins::list_plugins(self.project.as_ref(), addr, &self.registry),
            "run_plugin" => plugins::run_plugin(self.project.as_ref(), addr, &self.registry, request),

            "get_log_file" => logs::get_log_file(self.project.as_ref(), addr, &self.registry, request),
            "log_message" => logs::log_message(self.project.as_ref(), addr, &self.registry, request),
            "log_live" => logs::log_live(self.project.as_ref(), addr, &self.registry, request),
            "reset_log" => logs::reset_log(self.project.as_ref(), addr, &self.registry, request),
            "reset_logs" => logs::reset_logs(self.project.as_ref(), addr, &self.registry),

            m if m.contains("_tb") || m == "get_tb" || m == "set_tb" => {
                resources_ops::dispatch(&self.tb, self.project.as_ref(), addr, &self.registry, m, request)
            }
            m if m.contains("_sut") || m == "get_sut" || m == "set_sut" => {
                resources_ops::dispatch(&self.sut, self.project.as_ref(), addr, &self.registry, m, request)
            }

            other => Err(HubError::InvalidArgument(format!("unknown method {other}"))),
        }
    }
}

/// Decode a `run_plugin`-style call as a [`CommandEnvelope`] rather than
/// raw `args`/`kwargs` (spec §9's redesign note).
pub(crate) fn decode_envelope(request: &Request) -> Result<CommandEnvelope, HubError> {
    let first = request
        .args
        .first()
        .ok_or_else(|| HubError::InvalidArgument("missing command envelope".to_string()))?;
    serde_json::from_value(first.clone())
        .map_err(|e| HubError::InvalidArgument(format!("malformed command envelope: {e}")))
}
