//! Session coordination for Huddle.
//!
//! This crate is the core of the stack: it turns asynchronous matchmaking
//! and transport callbacks into one consistent local view of the session
//! (idle, hosting, joining, connected, leaving) and sequences the
//! operations that establish or tear down a peer-to-peer session.
//!
//! # How it fits in the stack
//!
//! ```text
//! Observers (menus, HUDs)   ← subscribe to SessionEvent, issue commands
//!     ↕
//! Session layer (this crate) ← owns SessionState, drives the seams below
//!     ↕
//! huddle-transport / huddle-matchmaking ← external-service seams
//! ```
//!
//! # Key types
//!
//! - [`SessionCoordinator`] — spawns the actor that owns all state
//! - [`SessionHandle`] — cheap-clone handle observers issue commands on
//! - [`SessionState`] — the five-state machine
//! - [`SessionEvent`] — the facts published to observers
//! - [`SessionError`] — everything that can go wrong, and when it's
//!   returned vs. emitted

mod config;
mod coordinator;
mod error;
mod event;
mod state;

pub use config::SessionConfig;
pub use coordinator::{SessionCoordinator, SessionHandle};
pub use error::SessionError;
pub use event::SessionEvent;
pub use state::SessionState;
