//! Shared value types for Huddle.
//!
//! Everything in this crate is plain data: identifiers, session metadata,
//! and member descriptions. These types are what the coordinator publishes
//! to observers (menus, HUDs) and what the transport and matchmaking seams
//! exchange — so they live in their own crate at the bottom of the stack.
//!
//! ```text
//! huddle (meta)
//!     ↕
//! huddle-session  ← coordinator, owns SessionState
//!     ↕
//! huddle-transport / huddle-matchmaking  ← external-service seams
//!     ↕
//! huddle-types (this crate)  ← ids, SessionInfo, MemberInfo
//! ```

mod error;
mod types;

pub use error::ParseIdError;
pub use types::{MemberInfo, PeerAddr, PeerId, SessionId, SessionInfo, SessionRole};
