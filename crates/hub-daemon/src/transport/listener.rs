//! TCP accept loop and per-connection frame pump.
//!
//! A frame's direction is not decided by which connection it arrived on —
//! every connection carries both inbound Requests (the peer calling the
//! façade) and outbound Requests (an upcall we issued via
//! [`crate::transport::PeerHandle::call`]) interleaved on the same wire.
//! A frame is told apart by shape alone: presence of a `"method"` key
//! means Request, its absence means Response.

use crate::registry::{ConnectionRegistry, Session};
use crate::transport::peer::{OutboundFrame, PeerHandle};
use serde_json::Value;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use twister_hub_core::{Request, Response};

/// Dispatches one inbound `Request` to the façade and produces its
/// `Response`. Boxed so the transport layer doesn't need to know the
/// façade's concrete type.
pub type HandlerFn =
    Arc<dyn Fn(String, Request) -> Pin<Box<dyn Future<Output = Response> + Send>> + Send + Sync>;

/// Accept connections on `bind_addr` until `shutdown` fires.
pub async fn run(
    bind_addr: &str,
    registry: ConnectionRegistry,
    handler: HandlerFn,
    shutdown: CancellationToken,
) -> std::io::Result<()> {
    let listener = TcpListener::bind(bind_addr).await?;
    info!(%bind_addr, "hub listening");

    loop {
        tokio::select! {
            _ = shutdown.cancelled() => {
                info!("transport accept loop shutting down");
                return Ok(());
            }
            accepted = listener.accept() => {
                let (stream, peer_addr) = match accepted {
                    Ok(pair) => pair,
                    Err(e) => {
                        warn!(error = %e, "accept failed");
                        continue;
                    }
                };
                let addr = peer_addr.to_string();
                let registry = registry.clone();
                let handler = handler.clone();
                let conn_shutdown = shutdown.clone();
                tokio::spawn(async move {
                    handle_connection(stream, addr, registry, handler, conn_shutdown).await;
                });
            }
        }
    }
}

async fn handle_connection(
    stream: TcpStream,
    addr: String,
    registry: ConnectionRegistry,
    handler: HandlerFn,
    shutdown: CancellationToken,
) {
    let (read_half, mut write_half) = stream.into_split();
    let mut reader = BufReader::new(read_half);

    let (outbound_tx, mut outbound_rx) = tokio::sync::mpsc::unbounded_channel::<OutboundFrame>();
    let peer = PeerHandle::new(addr.clone(), outbound_tx);
    registry.insert(Session::new(addr.clone(), peer.clone()));
    info!(%addr, "connection accepted");

    let writer_task = tokio::spawn(async move {
        while let Some(frame) = outbound_rx.recv().await {
            let line = match &frame {
                OutboundFrame::Request(req) => serde_json::to_string(req),
                OutboundFrame::Response(resp) => serde_json::to_string(resp),
            };
            let line = match line {
                Ok(l) => l,
                Err(e) => {
                    warn!(error = %e, "failed to encode outbound frame");
                    continue;
                }
            };
            if write_half.write_all(line.as_bytes()).await.is_err()
                || write_half.write_all(b"\n").await.is_err()
                || write_half.flush().await.is_err()
            {
                break;
            }
        }
    });

    let mut line = String::new();
    loop {
        line.clear();
        tokio::select! {
            _ = shutdown.cancelled() => break,
            read_result = reader.read_line(&mut line) => {
                match read_result {
                    Ok(0) => break,
                    Ok(_) => {}
                    Err(e) => {
                        warn!(%addr, error = %e, "read error, closing connection");
                        break;
                    }
                }
            }
        }

        let trimmed = line.trim_end();
        if trimmed.is_empty() {
            continue;
        }

        let value: Value = match serde_json::from_str(trimmed) {
            Ok(v) => v,
            Err(e) => {
                debug!(%addr, error = %e, "dropping malformed frame");
                continue;
            }
        };

        if value.get("method").is_some() {
            let request: Request = match serde_json::from_value(value) {
                Ok(r) => r,
                Err(e) => {
                    debug!(%addr, error = %e, "malformed request frame");
                    continue;
                }
            };
            let id = request.id;
            let handler = handler.clone();
            let peer = peer.clone();
            let addr_for_dispatch = addr.clone();
            tokio::spawn(async move {
                let response = handler(addr_for_dispatch, request).await;
                debug_assert_eq!(response.id, id);
                peer.reply(response);
            });
        } else {
            let response: Response = match serde_json::from_value(value) {
                Ok(r) => r,
                Err(e) => {
                    debug!(%addr, error = %e, "malformed response frame");
                    continue;
                }
            };
            peer.resolve(response);
        }
    }

    writer_task.abort();
    registry.remove(&addr);
    info!(%addr, "connection closed");
}
