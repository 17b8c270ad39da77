//! Unified error type for the Huddle stack.

use huddle_matchmaking::MatchmakingError;
use huddle_session::SessionError;
use huddle_transport::TransportError;

/// Top-level error that wraps all crate-specific errors.
///
/// When using the `huddle` meta-crate, you deal with this single error
/// type instead of importing errors from each sub-crate. The `#[from]`
/// attribute on each variant auto-generates `From` impls, so the `?`
/// operator converts sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum HuddleError {
    /// A transport-level error (host start, dial, shutdown).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A matchmaking-level error (lobby create, join, leave).
    #[error(transparent)]
    Matchmaking(#[from] MatchmakingError),

    /// A session-level error (establish, disconnect, coordination).
    #[error(transparent)]
    Session(#[from] SessionError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use huddle_types::SessionId;

    #[test]
    fn test_from_transport_error() {
        let err = TransportError::ClientStartFailed("unreachable".into());
        let huddle_err: HuddleError = err.into();
        assert!(matches!(huddle_err, HuddleError::Transport(_)));
        assert!(huddle_err.to_string().contains("unreachable"));
    }

    #[test]
    fn test_from_matchmaking_error() {
        let err = MatchmakingError::LobbyNotFound(SessionId(3));
        let huddle_err: HuddleError = err.into();
        assert!(matches!(huddle_err, HuddleError::Matchmaking(_)));
    }

    #[test]
    fn test_from_session_error() {
        let err = SessionError::AlreadyInProgress;
        let huddle_err: HuddleError = err.into();
        assert!(matches!(huddle_err, HuddleError::Session(_)));
        assert!(huddle_err.to_string().contains("in progress"));
    }
}
