//! Error types for identifier parsing.

/// The string could not be parsed into an identifier.
///
/// Returned by the `FromStr` impls on [`SessionId`](crate::SessionId) and
/// [`PeerId`](crate::PeerId). Carries the offending input so callers can
/// report it (the coordinator maps this to its `InvalidIdentifier`
/// failure).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("`{0}` is not a valid identifier")]
pub struct ParseIdError(pub String);
