//! The remote-exposed interface handle a [`crate::registry::Session`] holds
//! for its peer (spec §3's `peer` field), used by the Reverse Dispatcher to
//! issue upcalls.

use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::{mpsc, oneshot};
use tokio::time::{timeout, Duration};
use twister_hub_core::{HubError, Request, Response};

/// A frame queued for the connection's single writer task.
#[derive(Debug)]
pub enum OutboundFrame {
    Request(Request),
    Response(Response),
}

struct PeerInner {
    addr: String,
    outbound: mpsc::UnboundedSender<OutboundFrame>,
    pending: Mutex<HashMap<u64, oneshot::Sender<Response>>>,
    next_id: AtomicU64,
}

/// A cheap handle to a live connection's writer, shared by every `Session`
/// that references it. Cloning is an `Arc` bump; a disconnected handle
/// (used in tests, and briefly before a real connection is wired up)
/// fails every call with `NoSuchPeer`.
#[derive(Clone)]
pub struct PeerHandle {
    inner: Option<Arc<PeerInner>>,
}

impl PeerHandle {
    pub fn new(addr: String, outbound: mpsc::UnboundedSender<OutboundFrame>) -> Self {
        Self {
            inner: Some(Arc::new(PeerInner {
                addr,
                outbound,
                pending: Mutex::new(HashMap::new()),
                next_id: AtomicU64::new(1),
            })),
        }
    }

    /// A handle with no live connection behind it; every call fails.
    pub fn disconnected() -> Self {
        Self { inner: None }
    }

    pub fn addr(&self) -> Option<&str> {
        self.inner.as_ref().map(|i| i.addr.as_str())
    }

    /// Issue an upcall on this peer and wait for its response, bounded by
    /// `deadline`. Any transport failure or timeout is reported as
    /// `PeerUpcallFailed` (spec §4.5).
    pub async fn call(
        &self,
        method: &str,
        args: Vec<Value>,
        deadline: Duration,
    ) -> Result<Value, HubError> {
        let inner = self
            .inner
            .as_ref()
            .ok_or(HubError::PeerUpcallFailed("peer not connected".to_string()))?;

        let id = inner.next_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = oneshot::channel();
        inner.pending.lock().unwrap().insert(id, tx);

        let request = Request::new(id, method, args);
        if inner
            .outbound
            .send(OutboundFrame::Request(request))
            .is_err()
        {
            inner.pending.lock().unwrap().remove(&id);
            return Err(HubError::PeerUpcallFailed("connection closed".to_string()));
        }

        let result = timeout(deadline, rx).await;
        inner.pending.lock().unwrap().remove(&id);

        match result {
            Ok(Ok(response)) => match response.error {
                Some(err) => Err(HubError::PeerUpcallFailed(truncate(&err))),
                None => Ok(response.result.unwrap_or(Value::Null)),
            },
            Ok(Err(_)) => Err(HubError::PeerUpcallFailed("connection closed".to_string())),
            Err(_) => Err(HubError::PeerUpcallFailed("upcall deadline exceeded".to_string())),
        }
    }

    /// Resolve a pending upcall's response. Called by the connection's
    /// reader task when an inbound frame parses as a `Response`.
    pub fn resolve(&self, response: Response) {
        if let Some(inner) = &self.inner
            && let Some(tx) = inner.pending.lock().unwrap().remove(&response.id)
        {
            let _ = tx.send(response);
        }
    }

    /// Send a `Response` to an inbound `Request` this peer issued on us.
    pub fn reply(&self, response: Response) {
        if let Some(inner) = &self.inner {
            let _ = inner.outbound.send(OutboundFrame::Response(response));
        }
    }
}

fn truncate(s: &str) -> String {
    const MAX: usize = 500;
    if s.len() <= MAX {
        s.to_string()
    } else {
        format!("{}...", &s[..MAX])
    }
}
