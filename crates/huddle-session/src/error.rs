//! Error types for the session layer.

use huddle_types::SessionId;

/// Everything that can go wrong in session coordination.
///
/// Two delivery paths, per the propagation policy:
///
/// - **Call-time validation** (`InvalidIdentifier`, `InvalidCapacity`,
///   `AlreadyInProgress`) is returned synchronously from the command
///   future, with no state change.
/// - **Post-commitment failures** (`NotFound`, `TransportStartFailed`,
///   `LobbyOperationFailed`, `TransportError`) resolve the command future
///   *and* are emitted as [`SessionEvent::Failed`](crate::SessionEvent)
///   after the coordinator rolls back to idle.
///
/// Nothing here is fatal — every failure path has a defined rollback.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    /// The identifier string could not be parsed into a session id.
    #[error("invalid session identifier: `{0}`")]
    InvalidIdentifier(String),

    /// Session capacity must be at least one member.
    #[error("session capacity must be at least 1")]
    InvalidCapacity,

    /// An establish operation is already in flight (or a session is
    /// already active); only one at a time.
    #[error("a session operation is already in progress")]
    AlreadyInProgress,

    /// No joinable session exists with the given id.
    #[error("no joinable session found with id {0}")]
    NotFound(SessionId),

    /// The transport host or client failed to start.
    #[error("transport failed to start: {0}")]
    TransportStartFailed(String),

    /// A lobby operation (create, join) failed on the matchmaking side.
    #[error("lobby operation failed: {0}")]
    LobbyOperationFailed(String),

    /// The transport link dropped before the session was established.
    #[error("transport connection failed")]
    TransportError,

    /// The operation was cancelled by a disconnect before it completed.
    #[error("operation cancelled by disconnect")]
    Cancelled,

    /// The coordinator has been shut down and can no longer be reached.
    #[error("session coordinator is unavailable")]
    Unavailable,
}
