//! Transport adapter seam for Huddle.
//!
//! The session coordinator does not speak any wire protocol itself — it
//! only needs to start a network host or client, shut it down, and hear
//! about connection lifecycle changes. The [`Transport`] trait captures
//! exactly that contract, and [`TransportEvent`] is the callback stream.
//!
//! # Feature Flags
//!
//! - `websocket` (default) — WebSocket adapter via `tokio-tungstenite`

mod error;
#[cfg(feature = "websocket")]
mod websocket;

pub use error::TransportError;
#[cfg(feature = "websocket")]
pub use websocket::WebSocketTransport;

use std::fmt;
use std::future::Future;

use huddle_types::PeerAddr;
use tokio::sync::broadcast;

/// Opaque identifier for a transport-level connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(u64);

impl ConnectionId {
    /// Creates a new `ConnectionId` from a raw `u64`.
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the underlying `u64` value.
    pub fn into_inner(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// A connection lifecycle callback from the transport.
///
/// Delivered through the broadcast channel returned by
/// [`Transport::subscribe`], in the order the underlying callbacks
/// occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportEvent {
    /// The host side is up and accepting peers.
    ServerStarted,
    /// A connection reached the connected state. On the host this fires
    /// once per remote peer; on a client it fires once for the link to
    /// the host.
    PeerConnected(ConnectionId),
    /// A connection ended (or a dial attempt failed before connecting).
    PeerDisconnected(ConnectionId),
}

/// Starts and stops the network transport for a session.
///
/// The active host or client link is exclusively owned by the session
/// coordinator for the session's lifetime — no other component starts or
/// stops it.
///
/// # Trait bounds and method form
///
/// Methods are declared in the desugared `impl Future + Send` form so the
/// coordinator can call them from spawned tasks; implementations can still
/// be written with plain `async fn`.
pub trait Transport: Send + Sync + 'static {
    /// Starts hosting. Emits [`TransportEvent::ServerStarted`] once peers
    /// can connect.
    fn start_host(&self) -> impl Future<Output = Result<(), TransportError>> + Send;

    /// Starts a client dialing `peer`.
    ///
    /// Returns the [`ConnectionId`] that subsequent events for this
    /// attempt will carry. The connection outcome itself arrives as
    /// [`TransportEvent::PeerConnected`] or — if the dial fails or the
    /// link drops before connecting — [`TransportEvent::PeerDisconnected`].
    fn start_client(
        &self,
        peer: &PeerAddr,
    ) -> impl Future<Output = Result<ConnectionId, TransportError>> + Send;

    /// Shuts down whatever is running (host or client). Idempotent;
    /// a transport that is not running shuts down successfully.
    fn shutdown(&self) -> impl Future<Output = Result<(), TransportError>> + Send;

    /// Subscribes to connection lifecycle events.
    fn subscribe(&self) -> broadcast::Receiver<TransportEvent>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_id_new_and_into_inner() {
        let id = ConnectionId::new(42);
        assert_eq!(id.into_inner(), 42);
    }

    #[test]
    fn test_connection_id_display() {
        let id = ConnectionId::new(7);
        assert_eq!(id.to_string(), "conn-7");
    }

    #[test]
    fn test_connection_id_equality() {
        let a = ConnectionId::new(1);
        let b = ConnectionId::new(1);
        let c = ConnectionId::new(2);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_connection_id_hash_works_as_map_key() {
        use std::collections::HashMap;
        let mut map = HashMap::new();
        map.insert(ConnectionId::new(1), "host");
        map.insert(ConnectionId::new(2), "client");
        assert_eq!(map[&ConnectionId::new(1)], "host");
    }
}
