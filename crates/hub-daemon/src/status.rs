//! Status reporting: a JSON snapshot of the daemon's health for external
//! consumption, written atomically on a timer and on shutdown.

use crate::registry::ConnectionRegistry;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::warn;
use twister_hub_core::io::atomic_write;

#[derive(Debug, Serialize)]
pub struct DaemonStatus {
    pub timestamp: String,
    pub pid: u32,
    pub version: &'static str,
    pub uptime_secs: u64,
    pub sessions: usize,
    pub authenticated_sessions: usize,
    pub registered_eps: usize,
}

pub struct StatusWriter {
    status_path: PathBuf,
    start_time: Instant,
    version: &'static str,
}

impl StatusWriter {
    pub fn new(home_dir: &Path, version: &'static str) -> Self {
        Self {
            status_path: home_dir.join("status.json"),
            start_time: Instant::now(),
            version,
        }
    }

    pub fn write_status(&self, registry: &ConnectionRegistry) {
        let sessions = registry.snapshot_iter();
        let authenticated = sessions.iter().filter(|s| s.authenticated).count();
        let registered_eps = sessions.iter().map(|s| s.eps.len()).sum();

        let status = DaemonStatus {
            timestamp: format_timestamp(),
            pid: std::process::id(),
            version: self.version,
            uptime_secs: self.start_time.elapsed().as_secs(),
            sessions: sessions.len(),
            authenticated_sessions: authenticated,
            registered_eps,
        };

        let encoded = match serde_json::to_vec_pretty(&status) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(error = %e, "failed to encode status");
                return;
            }
        };

        if let Err(e) = atomic_write(&self.status_path, &encoded) {
            warn!(error = %e, "failed to write status file");
        }
    }
}

fn format_timestamp() -> String {
    let now: DateTime<Utc> = Utc::now();
    now.to_rfc3339()
}
