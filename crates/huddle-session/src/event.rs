//! Session facts published to observers.

use huddle_types::{MemberInfo, PeerId, SessionInfo};

use crate::SessionError;

/// A session-level fact, broadcast to every subscriber.
///
/// Events for a given session are delivered in the order the underlying
/// callbacks occurred. Each subscriber holds its own receiver, so a slow
/// or dropped observer cannot affect the others or the coordinator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// The session is fully established (lobby *and* transport link).
    Established(SessionInfo),

    /// An establish operation failed and the coordinator rolled back to
    /// idle, releasing any partially acquired resource.
    Failed(SessionError),

    /// The session ended (local disconnect, or the link to the host was
    /// lost). The coordinator is idle again.
    Ended,

    /// A member joined the current session.
    MemberJoined(MemberInfo),

    /// A member left the current session.
    MemberLeft(PeerId),
}
