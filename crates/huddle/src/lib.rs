//! # Huddle
//!
//! Peer-to-peer session and lobby coordination for multiplayer games.
//!
//! Huddle turns asynchronous matchmaking and transport callbacks into one
//! consistent local view of the session. The application drives a single
//! [`SessionHandle`](huddle_session::SessionHandle) — create, join by id,
//! disconnect — and subscribes to session events; the stack handles lobby
//! discovery, the transport link, rollback on failure, and membership
//! tracking.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use huddle::prelude::*;
//!
//! # async fn run(matchmaker: huddle_matchmaking::InMemoryMatchmaker) -> Result<(), HuddleError> {
//! let session = HuddleBuilder::new().bind("0.0.0.0:9300").build(matchmaker);
//!
//! let info = session.create_session(4).await?;
//! println!("hosting session {} — share this id", info.id);
//! # Ok(())
//! # }
//! ```

mod builder;
mod error;

pub use builder::HuddleBuilder;
pub use error::HuddleError;

/// The types most applications need, in one import.
pub mod prelude {
    pub use crate::{HuddleBuilder, HuddleError};
    pub use huddle_matchmaking::{Matchmaker, MatchmakingEvent};
    pub use huddle_session::{
        SessionConfig, SessionCoordinator, SessionError, SessionEvent, SessionHandle, SessionState,
    };
    pub use huddle_transport::{Transport, TransportEvent};
    pub use huddle_types::{MemberInfo, PeerAddr, PeerId, SessionId, SessionInfo, SessionRole};
}

/// Initializes `tracing` with an env-filtered fmt subscriber.
///
/// Reads `RUST_LOG`; defaults to `info` when unset. Convenience for
/// binaries and demos; libraries should leave subscriber setup to the
/// application.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(true)
        .init();
}
