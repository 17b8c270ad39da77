//! Identity and session metadata types.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ParseIdError;

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// A unique identifier for a session (the lobby id on the matchmaking side).
///
/// Newtype over `u64` so a session id can never be confused with a
/// [`PeerId`]. `#[serde(transparent)]` serializes it as the bare number.
///
/// `Display` prints the bare number and `FromStr` parses one, because the
/// id round-trips through the UI: the host shows it on screen, a friend
/// types it back in to join.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(pub u64);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for SessionId {
    type Err = ParseIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u64>()
            .map(SessionId)
            .map_err(|_| ParseIdError(s.to_string()))
    }
}

/// A unique identifier for a peer (a player on the matchmaking service).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PeerId(pub u64);

impl fmt::Display for PeerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P-{}", self.0)
    }
}

/// The network address a transport client dials to reach a host.
///
/// Opaque to everything except the transport implementation — the
/// coordinator only carries it from the lobby handle into `start_client`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PeerAddr(pub String);

impl PeerAddr {
    /// Creates an address from anything string-like.
    pub fn new(addr: impl Into<String>) -> Self {
        Self(addr.into())
    }

    /// Returns the address as a `&str` for dialing.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PeerAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Session metadata
// ---------------------------------------------------------------------------

/// Which side of the session this peer is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionRole {
    /// This peer started the transport host and created the lobby.
    Host,
    /// This peer joined an existing lobby and dialed the host.
    Client,
}

impl fmt::Display for SessionRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Host => write!(f, "host"),
            Self::Client => write!(f, "client"),
        }
    }
}

/// Metadata about the session this peer is currently in.
///
/// Created when hosting starts or a join succeeds; cleared when the
/// coordinator returns to idle. The id is stable for the session's
/// lifetime; `member_count` is updated as members come and go.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionInfo {
    /// Opaque session identifier, stable for the session's lifetime.
    pub id: SessionId,
    /// Display name shown in lobby lists.
    pub name: String,
    /// Maximum number of members.
    pub capacity: u32,
    /// Current number of members (including this peer).
    pub member_count: u32,
}

/// A member of the current session.
///
/// Ephemeral — exists only while the member is present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberInfo {
    /// The member's peer id.
    pub id: PeerId,
    /// The member's display name.
    pub name: String,
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    //! Tests for identity types and their JSON shapes.
    //!
    //! Observers consume these types as JSON (UI layers, debug overlays),
    //! so the serde attributes are part of the contract.

    use super::*;

    // =====================================================================
    // SessionId
    // =====================================================================

    #[test]
    fn test_session_id_serializes_as_plain_number() {
        // `#[serde(transparent)]` means SessionId(42) → `42`.
        let json = serde_json::to_string(&SessionId(42)).unwrap();
        assert_eq!(json, "42");
    }

    #[test]
    fn test_session_id_display_round_trips_through_from_str() {
        // The UI flow: host displays the id, a friend types it back in.
        let id = SessionId(90210);
        let parsed: SessionId = id.to_string().parse().unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn test_session_id_from_str_trims_whitespace() {
        // Ids get copy-pasted; stray whitespace shouldn't fail the join.
        let parsed: SessionId = " 42 ".parse().unwrap();
        assert_eq!(parsed, SessionId(42));
    }

    #[test]
    fn test_session_id_from_str_rejects_non_numeric() {
        let result = "not-a-number".parse::<SessionId>();
        assert_eq!(result, Err(ParseIdError("not-a-number".into())));
    }

    #[test]
    fn test_session_id_from_str_rejects_empty() {
        assert!("".parse::<SessionId>().is_err());
    }

    #[test]
    fn test_session_id_from_str_rejects_negative() {
        // Lobby ids are unsigned on the wire.
        assert!("-3".parse::<SessionId>().is_err());
    }

    // =====================================================================
    // PeerId / PeerAddr
    // =====================================================================

    #[test]
    fn test_peer_id_display() {
        assert_eq!(PeerId(7).to_string(), "P-7");
    }

    #[test]
    fn test_peer_id_hash_works_as_map_key() {
        use std::collections::HashMap;
        let mut map = HashMap::new();
        map.insert(PeerId(1), "alice");
        map.insert(PeerId(2), "bob");
        assert_eq!(map[&PeerId(1)], "alice");
    }

    #[test]
    fn test_peer_addr_serializes_as_plain_string() {
        let json = serde_json::to_string(&PeerAddr::new("127.0.0.1:7777")).unwrap();
        assert_eq!(json, "\"127.0.0.1:7777\"");
    }

    // =====================================================================
    // SessionInfo / MemberInfo
    // =====================================================================

    #[test]
    fn test_session_info_round_trip() {
        let info = SessionInfo {
            id: SessionId(42),
            name: "lobby-17".into(),
            capacity: 8,
            member_count: 2,
        };
        let bytes = serde_json::to_vec(&info).unwrap();
        let decoded: SessionInfo = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(info, decoded);
    }

    #[test]
    fn test_member_info_json_shape() {
        let member = MemberInfo {
            id: PeerId(3),
            name: "carol".into(),
        };
        let json: serde_json::Value = serde_json::to_value(&member).unwrap();
        assert_eq!(json["id"], 3);
        assert_eq!(json["name"], "carol");
    }

    #[test]
    fn test_session_role_display() {
        assert_eq!(SessionRole::Host.to_string(), "host");
        assert_eq!(SessionRole::Client.to_string(), "client");
    }
}
