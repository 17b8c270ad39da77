//! `HuddleBuilder`: wiring the stack together.
//!
//! This is the entry point for standing up a peer. It ties the layers
//! together: transport + matchmaking → session coordinator, and hands
//! back the [`SessionHandle`] the application drives.

use huddle_matchmaking::Matchmaker;
use huddle_session::{SessionConfig, SessionCoordinator, SessionHandle};
use huddle_transport::{Transport, WebSocketTransport};

/// Builder for configuring and starting a Huddle peer.
///
/// # Example
///
/// ```rust,ignore
/// use huddle::prelude::*;
///
/// let session = HuddleBuilder::new()
///     .bind("0.0.0.0:9300")
///     .build(my_matchmaker);
/// let info = session.create_session(4).await?;
/// ```
pub struct HuddleBuilder {
    bind_addr: String,
    session_config: SessionConfig,
}

impl HuddleBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            bind_addr: "127.0.0.1:9300".to_string(),
            session_config: SessionConfig::default(),
        }
    }

    /// Sets the address the transport binds to when this peer hosts.
    pub fn bind(mut self, addr: &str) -> Self {
        self.bind_addr = addr.to_string();
        self
    }

    /// Sets the session coordinator configuration.
    pub fn session_config(mut self, config: SessionConfig) -> Self {
        self.session_config = config;
        self
    }

    /// Spawns the session coordinator over the default
    /// [`WebSocketTransport`] and returns its handle.
    pub fn build(self, matchmaker: impl Matchmaker) -> SessionHandle {
        let transport = WebSocketTransport::new(&self.bind_addr);
        self.build_with_transport(transport, matchmaker)
    }

    /// Spawns the session coordinator over a custom transport.
    pub fn build_with_transport(
        self,
        transport: impl Transport,
        matchmaker: impl Matchmaker,
    ) -> SessionHandle {
        tracing::debug!(bind = %self.bind_addr, "starting huddle peer");
        SessionCoordinator::spawn(transport, matchmaker, self.session_config)
    }
}

impl Default for HuddleBuilder {
    fn default() -> Self {
        Self::new()
    }
}
