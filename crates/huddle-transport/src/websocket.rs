//! WebSocket transport adapter using `tokio-tungstenite`.
//!
//! This adapter only manages connection lifecycle — it accepts or dials
//! WebSocket links and reports [`TransportEvent`]s. Payload traffic is the
//! business of whatever runs on top; the session coordinator never sends
//! bytes through it.

use std::sync::Arc;
use std::sync::Mutex as StdMutex;
use std::sync::atomic::{AtomicU64, Ordering};

use futures_util::StreamExt;
use huddle_types::PeerAddr;
use tokio::net::TcpListener;
use tokio::sync::{Mutex, broadcast};
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;

use crate::{ConnectionId, Transport, TransportError, TransportEvent};

/// Counter for generating unique connection IDs.
static NEXT_CONNECTION_ID: AtomicU64 = AtomicU64::new(1);

/// Event channel capacity. Lifecycle events are rare; 64 is plenty.
const EVENT_CAPACITY: usize = 64;

fn next_connection_id() -> ConnectionId {
    ConnectionId::new(NEXT_CONNECTION_ID.fetch_add(1, Ordering::Relaxed))
}

/// What's currently running: the accept loop (host) or the dial/read
/// task (client), plus any per-peer reader tasks the host spawned.
struct Active {
    main: JoinHandle<()>,
    readers: Arc<StdMutex<Vec<JoinHandle<()>>>>,
}

/// A WebSocket-based [`Transport`].
///
/// `start_host` binds `bind_addr` and accepts peers; `start_client` dials
/// a host. At most one of the two runs at a time.
pub struct WebSocketTransport {
    bind_addr: String,
    events: broadcast::Sender<TransportEvent>,
    active: Mutex<Option<Active>>,
}

impl WebSocketTransport {
    /// Creates a transport that will host on `bind_addr`. No sockets are
    /// opened until [`Transport::start_host`] or
    /// [`Transport::start_client`] is called.
    pub fn new(bind_addr: &str) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            bind_addr: bind_addr.to_string(),
            events,
            active: Mutex::new(None),
        }
    }
}

impl Transport for WebSocketTransport {
    async fn start_host(&self) -> Result<(), TransportError> {
        let mut active = self.active.lock().await;
        if active.is_some() {
            return Err(TransportError::AlreadyRunning);
        }

        let listener = TcpListener::bind(&self.bind_addr)
            .await
            .map_err(TransportError::HostStartFailed)?;
        tracing::info!(addr = %self.bind_addr, "WebSocket host listening");

        let events = self.events.clone();
        let readers: Arc<StdMutex<Vec<JoinHandle<()>>>> = Arc::default();
        let reader_registry = Arc::clone(&readers);

        let main = tokio::spawn(async move {
            let _ = events.send(TransportEvent::ServerStarted);
            loop {
                let (stream, addr) = match listener.accept().await {
                    Ok(pair) => pair,
                    Err(e) => {
                        tracing::warn!(error = %e, "accept failed");
                        continue;
                    }
                };
                let ws = match tokio_tungstenite::accept_async(stream).await {
                    Ok(ws) => ws,
                    Err(e) => {
                        tracing::debug!(%addr, error = %e, "handshake failed");
                        continue;
                    }
                };

                let id = next_connection_id();
                tracing::debug!(%id, %addr, "peer connected");
                let _ = events.send(TransportEvent::PeerConnected(id));

                let events = events.clone();
                let reader = tokio::spawn(async move {
                    read_until_closed(ws).await;
                    tracing::debug!(%id, "peer disconnected");
                    let _ = events.send(TransportEvent::PeerDisconnected(id));
                });
                // Reap readers whose peers already went away, so the
                // registry doesn't grow without bound under peer churn.
                let mut registry = reader_registry.lock().expect("reader registry");
                registry.retain(|handle| !handle.is_finished());
                registry.push(reader);
            }
        });

        *active = Some(Active { main, readers });
        Ok(())
    }

    async fn start_client(&self, peer: &PeerAddr) -> Result<ConnectionId, TransportError> {
        let mut active = self.active.lock().await;
        if active.is_some() {
            return Err(TransportError::AlreadyRunning);
        }

        let id = next_connection_id();
        let url = format!("ws://{peer}");
        let events = self.events.clone();

        // The dial outcome is reported through events, not the return
        // value: a failed dial is a PeerDisconnected that never saw a
        // PeerConnected, which is exactly what the coordinator's joining
        // state machine expects.
        let main = tokio::spawn(async move {
            match tokio_tungstenite::connect_async(&url).await {
                Ok((ws, _)) => {
                    tracing::debug!(%id, %url, "connected to host");
                    let _ = events.send(TransportEvent::PeerConnected(id));
                    read_until_closed(ws).await;
                    tracing::debug!(%id, "link to host closed");
                    let _ = events.send(TransportEvent::PeerDisconnected(id));
                }
                Err(e) => {
                    tracing::debug!(%id, %url, error = %e, "dial failed");
                    let _ = events.send(TransportEvent::PeerDisconnected(id));
                }
            }
        });

        *active = Some(Active {
            main,
            readers: Arc::default(),
        });
        Ok(id)
    }

    async fn shutdown(&self) -> Result<(), TransportError> {
        let mut active = self.active.lock().await;
        let Some(running) = active.take() else {
            return Ok(());
        };

        // Aborting (rather than closing gracefully) guarantees no further
        // events are emitted for connections that belong to the session
        // being torn down. Awaiting the aborted tasks ensures the
        // listener socket is released before shutdown returns.
        running.main.abort();
        let _ = running.main.await;
        let readers: Vec<_> = running.readers.lock().expect("reader registry").drain(..).collect();
        for reader in readers {
            reader.abort();
            let _ = reader.await;
        }
        tracing::info!("WebSocket transport shut down");
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<TransportEvent> {
        self.events.subscribe()
    }
}

/// Drives a WebSocket stream until the peer closes it or it errors.
/// Control frames are handled by tungstenite; payload frames are ignored.
async fn read_until_closed<S>(mut ws: tokio_tungstenite::WebSocketStream<S>)
where
    S: tokio::io::AsyncRead + tokio::io::AsyncWrite + Unpin,
{
    while let Some(msg) = ws.next().await {
        match msg {
            Ok(Message::Close(_)) | Err(_) => break,
            Ok(_) => continue,
        }
    }
}
