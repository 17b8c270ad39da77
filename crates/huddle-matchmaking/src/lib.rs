//! Matchmaking service seam for Huddle.
//!
//! The session coordinator discovers, creates, and joins lobbies through
//! the [`Matchmaker`] trait and hears about lobby changes through
//! [`MatchmakingEvent`]s. The real service behind the trait is the
//! platform's matchmaking backend; [`InMemoryMatchmaker`] is an
//! in-process implementation for tests, demos, and LAN-style play.
//!
//! # Key types
//!
//! - [`Matchmaker`] — the async lobby operations the coordinator drives
//! - [`LobbyHandle`] — a snapshot of one joinable lobby
//! - [`MatchmakingEvent`] — the subscription-based callback stream
//! - [`LobbyDirectory`] / [`InMemoryMatchmaker`] — in-process backend

mod error;
mod event;
mod memory;

pub use error::MatchmakingError;
pub use event::MatchmakingEvent;
pub use memory::{InMemoryMatchmaker, LobbyDirectory};

use std::future::Future;

use huddle_types::{MemberInfo, PeerAddr, SessionId};
use tokio::sync::broadcast;

/// A snapshot of one lobby as the matchmaking service sees it.
///
/// Handles are point-in-time: `member_count` is current as of the call
/// that produced the handle, and later changes arrive as events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LobbyHandle {
    /// The lobby's identifier (the session id peers type in to join).
    pub id: SessionId,
    /// Display name (set via lobby metadata; may be empty right after
    /// creation, before the host publishes one).
    pub name: String,
    /// Maximum member slots.
    pub capacity: u32,
    /// Members currently in the lobby.
    pub member_count: u32,
    /// Address the transport client dials to reach the lobby's host.
    pub host_addr: PeerAddr,
}

/// Async lobby operations on the matchmaking service.
///
/// Methods are declared in the desugared `impl Future + Send` form so the
/// coordinator can call them from spawned tasks; implementations can be
/// written with plain `async fn`.
pub trait Matchmaker: Send + Sync + 'static {
    /// Creates a lobby with `capacity` member slots, entering it as host.
    fn create_lobby(
        &self,
        capacity: u32,
    ) -> impl Future<Output = Result<LobbyHandle, MatchmakingError>> + Send;

    /// Lists lobbies with at least one free slot.
    fn list_joinable(
        &self,
    ) -> impl Future<Output = Result<Vec<LobbyHandle>, MatchmakingError>> + Send;

    /// Joins the given lobby. Returns a handle reflecting the lobby
    /// state after the join (this peer included in `member_count`).
    fn join_lobby(
        &self,
        id: SessionId,
    ) -> impl Future<Output = Result<LobbyHandle, MatchmakingError>> + Send;

    /// Leaves the given lobby. Leaving a lobby this peer is not in is
    /// reported as an error but has no other effect.
    fn leave_lobby(
        &self,
        id: SessionId,
    ) -> impl Future<Output = Result<(), MatchmakingError>> + Send;

    /// Sets one metadata key on a lobby this peer hosts (e.g. `"name"`).
    fn set_lobby_metadata(
        &self,
        id: SessionId,
        key: &str,
        value: &str,
    ) -> impl Future<Output = Result<(), MatchmakingError>> + Send;

    /// The local peer as the matchmaking service knows it.
    ///
    /// Membership callbacks include the local peer's own joins and
    /// leaves; consumers use this to tell them apart from remote ones.
    fn identity(&self) -> MemberInfo;

    /// Subscribes to the matchmaking callback stream.
    fn subscribe(&self) -> broadcast::Receiver<MatchmakingEvent>;
}
