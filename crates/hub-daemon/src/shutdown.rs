//! Graceful shutdown coordination for open connections.

use crate::registry::ConnectionRegistry;
use anyhow::Result;
use std::time::Duration;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

const DRAIN_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Stop accepting new connections and wait for existing ones to close on
/// their own, up to `drain_timeout`. Connections still open past the
/// deadline are logged and left to the OS to reap on process exit; this
/// never blocks shutdown indefinitely on a single stuck peer.
pub async fn graceful_shutdown(
    shutdown: &CancellationToken,
    registry: &ConnectionRegistry,
    drain_timeout: Duration,
) -> Result<()> {
    let open = registry.len();
    info!(open, ?drain_timeout, "beginning graceful shutdown");
    shutdown.cancel();

    let deadline = tokio::time::Instant::now() + drain_timeout;
    loop {
        let remaining = registry.len();
        if remaining == 0 {
            info!("all connections drained");
            return Ok(());
        }
        if tokio::time::Instant::now() >= deadline {
            warn!(remaining, "shutdown timed out with connections still open");
            return Ok(());
        }
        sleep(DRAIN_POLL_INTERVAL).await;
    }
}
