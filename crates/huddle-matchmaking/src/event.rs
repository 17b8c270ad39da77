//! The matchmaking callback stream.

use huddle_types::{MemberInfo, SessionId};

use crate::LobbyHandle;

/// An asynchronous callback from the matchmaking service.
///
/// Delivered through the broadcast channel returned by
/// [`Matchmaker::subscribe`](crate::Matchmaker::subscribe), in the order
/// the underlying callbacks occurred. The coordinator filters these by
/// its current state and lobby id — events for a lobby it is not in are
/// ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchmakingEvent {
    /// A lobby this peer requested was created (host side).
    LobbyCreated { lobby: LobbyHandle },

    /// This peer entered a lobby (fires for both create and join).
    LobbyEntered { lobby: LobbyHandle },

    /// Another member joined a lobby this peer is in.
    MemberJoined {
        lobby_id: SessionId,
        member: MemberInfo,
    },

    /// A member left a lobby this peer is in.
    MemberLeft {
        lobby_id: SessionId,
        member_id: huddle_types::PeerId,
    },

    /// A friend invited this peer to their lobby.
    InviteReceived {
        from: MemberInfo,
        lobby_id: SessionId,
    },

    /// This peer accepted an invite (platform overlay, friend list); the
    /// coordinator should join `lobby_id` as if the id had been typed in.
    JoinRequested { lobby_id: SessionId },
}
