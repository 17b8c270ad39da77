//! In-process matchmaking backend: a shared lobby directory.
//!
//! [`LobbyDirectory`] is the "service": it owns every lobby and the
//! callback stream. [`InMemoryMatchmaker`] is one peer's client onto a
//! shared directory — tests and the demo create one directory and hand a
//! client to each coordinator.
//!
//! The directory broadcasts every event to every subscriber (a real
//! platform backend delivers per-peer); coordinators already filter by
//! state and lobby id, so the wider fan-out is harmless in-process.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use huddle_types::{MemberInfo, PeerAddr, PeerId, SessionId};
use tokio::sync::broadcast;

use crate::{LobbyHandle, Matchmaker, MatchmakingError, MatchmakingEvent};

/// Counter for generating unique lobby IDs.
static NEXT_LOBBY_ID: AtomicU64 = AtomicU64::new(1);

/// Event channel capacity for the directory's callback stream.
const EVENT_CAPACITY: usize = 64;

/// One lobby as the directory stores it.
#[derive(Debug, Clone)]
struct Lobby {
    id: SessionId,
    capacity: u32,
    host: PeerId,
    host_addr: PeerAddr,
    members: Vec<MemberInfo>,
    metadata: HashMap<String, String>,
}

impl Lobby {
    fn handle(&self) -> LobbyHandle {
        LobbyHandle {
            id: self.id,
            name: self.metadata.get("name").cloned().unwrap_or_default(),
            capacity: self.capacity,
            member_count: self.members.len() as u32,
            host_addr: self.host_addr.clone(),
        }
    }

    fn is_full(&self) -> bool {
        self.members.len() as u32 >= self.capacity
    }
}

#[derive(Default)]
struct DirectoryState {
    /// All live lobbies, keyed by lobby id.
    lobbies: HashMap<SessionId, Lobby>,
    /// Which lobby each peer is in. A peer is in at most one lobby
    /// at a time (key invariant).
    peer_lobbies: HashMap<PeerId, SessionId>,
}

/// The shared lobby registry behind every [`InMemoryMatchmaker`].
pub struct LobbyDirectory {
    state: Mutex<DirectoryState>,
    events: broadcast::Sender<MatchmakingEvent>,
}

impl LobbyDirectory {
    /// Creates a new, empty directory.
    pub fn new() -> Arc<Self> {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Arc::new(Self {
            state: Mutex::new(DirectoryState::default()),
            events,
        })
    }

    fn emit(&self, event: MatchmakingEvent) {
        // No subscribers is fine — nobody is listening yet.
        let _ = self.events.send(event);
    }

    /// Creates a lobby hosted by `host` and enters it.
    pub fn create(
        &self,
        host: MemberInfo,
        host_addr: PeerAddr,
        capacity: u32,
    ) -> Result<LobbyHandle, MatchmakingError> {
        let mut state = self.state.lock().expect("directory lock");

        if let Some(current) = state.peer_lobbies.get(&host.id) {
            return Err(MatchmakingError::AlreadyInLobby(*current));
        }

        let id = SessionId(NEXT_LOBBY_ID.fetch_add(1, Ordering::Relaxed));
        let lobby = Lobby {
            id,
            capacity,
            host: host.id,
            host_addr,
            members: vec![host.clone()],
            metadata: HashMap::new(),
        };
        let handle = lobby.handle();

        state.peer_lobbies.insert(host.id, id);
        state.lobbies.insert(id, lobby);
        drop(state);

        tracing::info!(lobby_id = %id, host = %host.id, "lobby created");
        self.emit(MatchmakingEvent::LobbyCreated {
            lobby: handle.clone(),
        });
        self.emit(MatchmakingEvent::LobbyEntered {
            lobby: handle.clone(),
        });
        Ok(handle)
    }

    /// Lists lobbies with at least one free slot.
    pub fn list_joinable(&self) -> Vec<LobbyHandle> {
        let state = self.state.lock().expect("directory lock");
        state
            .lobbies
            .values()
            .filter(|lobby| !lobby.is_full())
            .map(Lobby::handle)
            .collect()
    }

    /// Adds `member` to the lobby with the given id.
    pub fn join(
        &self,
        member: MemberInfo,
        id: SessionId,
    ) -> Result<LobbyHandle, MatchmakingError> {
        let mut state = self.state.lock().expect("directory lock");

        if let Some(current) = state.peer_lobbies.get(&member.id) {
            return Err(MatchmakingError::AlreadyInLobby(*current));
        }
        let lobby = state
            .lobbies
            .get_mut(&id)
            .ok_or(MatchmakingError::LobbyNotFound(id))?;
        if lobby.is_full() {
            return Err(MatchmakingError::LobbyFull(id));
        }

        lobby.members.push(member.clone());
        let handle = lobby.handle();
        state.peer_lobbies.insert(member.id, id);
        drop(state);

        tracing::info!(lobby_id = %id, member = %member.id, "member joined lobby");
        self.emit(MatchmakingEvent::MemberJoined {
            lobby_id: id,
            member,
        });
        self.emit(MatchmakingEvent::LobbyEntered {
            lobby: handle.clone(),
        });
        Ok(handle)
    }

    /// Removes `member_id` from the lobby. If the host leaves, the lobby
    /// is dissolved and every remaining member is released.
    pub fn leave(
        &self,
        member_id: PeerId,
        id: SessionId,
    ) -> Result<(), MatchmakingError> {
        let mut state = self.state.lock().expect("directory lock");

        let lobby = state
            .lobbies
            .get_mut(&id)
            .ok_or(MatchmakingError::LobbyNotFound(id))?;
        if !lobby.members.iter().any(|m| m.id == member_id) {
            return Err(MatchmakingError::NotInLobby(id));
        }

        if lobby.host == member_id {
            let lobby = state.lobbies.remove(&id).expect("checked above");
            for member in &lobby.members {
                state.peer_lobbies.remove(&member.id);
            }
            drop(state);

            tracing::info!(lobby_id = %id, "host left, lobby dissolved");
            self.emit(MatchmakingEvent::MemberLeft {
                lobby_id: id,
                member_id,
            });
        } else {
            lobby.members.retain(|m| m.id != member_id);
            state.peer_lobbies.remove(&member_id);
            drop(state);

            tracing::info!(lobby_id = %id, member = %member_id, "member left lobby");
            self.emit(MatchmakingEvent::MemberLeft {
                lobby_id: id,
                member_id,
            });
        }
        Ok(())
    }

    /// Sets one metadata key on a lobby. Host-only.
    pub fn set_metadata(
        &self,
        member_id: PeerId,
        id: SessionId,
        key: &str,
        value: &str,
    ) -> Result<(), MatchmakingError> {
        let mut state = self.state.lock().expect("directory lock");
        let lobby = state
            .lobbies
            .get_mut(&id)
            .ok_or(MatchmakingError::LobbyNotFound(id))?;
        if lobby.host != member_id {
            return Err(MatchmakingError::Rejected(
                "only the host can set lobby metadata".into(),
            ));
        }
        lobby.metadata.insert(key.to_string(), value.to_string());
        Ok(())
    }

    /// Delivers an invite callback, as the platform would when a friend
    /// invites this peer to their lobby.
    pub fn send_invite(&self, from: MemberInfo, lobby_id: SessionId) {
        self.emit(MatchmakingEvent::InviteReceived { from, lobby_id });
    }

    /// Delivers an invite-accepted callback, as the platform would when
    /// the local player accepts an invite from the overlay.
    pub fn request_join(&self, lobby_id: SessionId) {
        self.emit(MatchmakingEvent::JoinRequested { lobby_id });
    }

    /// Returns the number of live lobbies.
    pub fn len(&self) -> usize {
        self.state.lock().expect("directory lock").lobbies.len()
    }

    /// Returns `true` if there are no lobbies.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn subscribe(&self) -> broadcast::Receiver<MatchmakingEvent> {
        self.events.subscribe()
    }
}

/// One peer's client onto a shared [`LobbyDirectory`].
#[derive(Clone)]
pub struct InMemoryMatchmaker {
    directory: Arc<LobbyDirectory>,
    identity: MemberInfo,
    addr: PeerAddr,
}

impl InMemoryMatchmaker {
    /// Creates a client for the given peer identity.
    ///
    /// `addr` is the address other peers dial to reach this peer when it
    /// hosts — it becomes the lobby's `host_addr`.
    pub fn new(directory: Arc<LobbyDirectory>, identity: MemberInfo, addr: PeerAddr) -> Self {
        Self {
            directory,
            identity,
            addr,
        }
    }

    /// The identity this client acts as.
    pub fn identity(&self) -> &MemberInfo {
        &self.identity
    }
}

impl Matchmaker for InMemoryMatchmaker {
    async fn create_lobby(&self, capacity: u32) -> Result<LobbyHandle, MatchmakingError> {
        self.directory
            .create(self.identity.clone(), self.addr.clone(), capacity)
    }

    async fn list_joinable(&self) -> Result<Vec<LobbyHandle>, MatchmakingError> {
        Ok(self.directory.list_joinable())
    }

    async fn join_lobby(&self, id: SessionId) -> Result<LobbyHandle, MatchmakingError> {
        self.directory.join(self.identity.clone(), id)
    }

    async fn leave_lobby(&self, id: SessionId) -> Result<(), MatchmakingError> {
        self.directory.leave(self.identity.id, id)
    }

    async fn set_lobby_metadata(
        &self,
        id: SessionId,
        key: &str,
        value: &str,
    ) -> Result<(), MatchmakingError> {
        self.directory.set_metadata(self.identity.id, id, key, value)
    }

    fn identity(&self) -> MemberInfo {
        self.identity.clone()
    }

    fn subscribe(&self) -> broadcast::Receiver<MatchmakingEvent> {
        self.directory.subscribe()
    }
}

// =========================================================================
// Tests
// =========================================================================
