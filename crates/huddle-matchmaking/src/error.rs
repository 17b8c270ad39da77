//! Error types for the matchmaking seam.

use huddle_types::SessionId;

/// Errors that can occur during matchmaking operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MatchmakingError {
    /// No lobby exists with the given id (or it is no longer joinable).
    #[error("lobby {0} not found")]
    LobbyNotFound(SessionId),

    /// The lobby has no free member slots.
    #[error("lobby {0} is full")]
    LobbyFull(SessionId),

    /// This peer is already in a lobby; leave it first.
    #[error("already in lobby {0}")]
    AlreadyInLobby(SessionId),

    /// This peer is not in the given lobby.
    #[error("not in lobby {0}")]
    NotInLobby(SessionId),

    /// The service rejected the operation (quota, backend outage, ...).
    #[error("matchmaking service rejected the operation: {0}")]
    Rejected(String),
}
