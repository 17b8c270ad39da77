//! The session state machine.

use huddle_types::SessionRole;

/// The coordinator's view of the session, exactly one value at a time.
///
/// ```text
///          ┌──(CreateSession)──→ Hosting ──(lobby ok)──→ Connected(Host)
///   Idle ──┤                        │ (failure: rollback)      │
///          └──(JoinSessionById)─→ Joining ──(link up)──→ Connected(Client)
///                                   │ (failure: rollback)      │
///   Idle ←───────── Leaving ←──(Disconnect / link lost)────────┘
/// ```
///
/// `Hosting` and `Joining` are the establish phases; any failure there
/// rolls back to `Idle` and releases whatever was partially acquired.
/// `Leaving` is the (brief) teardown phase of a disconnect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No session; commands that establish one are accepted.
    Idle,
    /// Transport host started, lobby creation in flight.
    Hosting,
    /// Lobby lookup/join or transport link in flight.
    Joining,
    /// Fully established, in the given role.
    Connected(SessionRole),
    /// Tearing down: leaving the lobby and shutting the transport down.
    Leaving,
}

impl SessionState {
    /// Returns `true` if a new establish operation may start.
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    /// Returns `true` if an establish operation is in flight.
    pub fn is_establishing(&self) -> bool {
        matches!(self, Self::Hosting | Self::Joining)
    }

    /// Returns `true` if the session is fully established.
    pub fn is_connected(&self) -> bool {
        matches!(self, Self::Connected(_))
    }

    /// Returns the role if connected.
    pub fn role(&self) -> Option<SessionRole> {
        match self {
            Self::Connected(role) => Some(*role),
            _ => None,
        }
    }
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "Idle"),
            Self::Hosting => write!(f, "Hosting"),
            Self::Joining => write!(f, "Joining"),
            Self::Connected(role) => write!(f, "Connected({role})"),
            Self::Leaving => write!(f, "Leaving"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_state_is_idle() {
        assert!(SessionState::Idle.is_idle());
        assert!(!SessionState::Hosting.is_idle());
        assert!(!SessionState::Connected(SessionRole::Host).is_idle());
        assert!(!SessionState::Leaving.is_idle());
    }

    #[test]
    fn test_session_state_is_establishing() {
        assert!(SessionState::Hosting.is_establishing());
        assert!(SessionState::Joining.is_establishing());
        assert!(!SessionState::Idle.is_establishing());
        assert!(!SessionState::Connected(SessionRole::Client).is_establishing());
    }

    #[test]
    fn test_session_state_role() {
        assert_eq!(
            SessionState::Connected(SessionRole::Host).role(),
            Some(SessionRole::Host)
        );
        assert_eq!(SessionState::Joining.role(), None);
    }

    #[test]
    fn test_session_state_display() {
        assert_eq!(SessionState::Idle.to_string(), "Idle");
        assert_eq!(
            SessionState::Connected(SessionRole::Client).to_string(),
            "Connected(client)"
        );
    }
}
