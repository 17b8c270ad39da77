//! The session coordinator: an actor that owns the session state machine.
//!
//! One Tokio task owns all session state. Every input — observer
//! commands, results from spawned establish tasks, and forwarded
//! transport/matchmaking callbacks — goes through a single queue, so
//! effects on state are strictly serialized and there is never a moment
//! where the session is "in two states at once".
//!
//! Long-running establish flows (create, join) run in spawned tasks and
//! report back through the queue as generation-tagged continuations, so
//! a pending network round trip never blocks reads or a disconnect.

use std::collections::HashMap;
use std::sync::Arc;

use huddle_matchmaking::{LobbyHandle, Matchmaker, MatchmakingError, MatchmakingEvent};
use huddle_transport::{ConnectionId, Transport, TransportError, TransportEvent};
use huddle_types::{MemberInfo, PeerId, SessionId, SessionInfo, SessionRole};
use rand::Rng;
use tokio::sync::{broadcast, mpsc, oneshot, watch};

use crate::{SessionConfig, SessionError, SessionEvent, SessionState};

type EstablishReply = oneshot::Sender<Result<SessionInfo, SessionError>>;
type Snapshot = (SessionState, Option<SessionInfo>);

// ---------------------------------------------------------------------------
// Actor inputs
// ---------------------------------------------------------------------------

/// Everything that can reach the actor, in one queue.
enum Input {
    Command(Command),
    Continuation(Continuation),
    Transport(TransportEvent),
    Matchmaking(MatchmakingEvent),
}

/// Commands sent by [`SessionHandle`].
enum Command {
    Create {
        capacity: u32,
        reply: EstablishReply,
    },
    Join {
        id: String,
        reply: EstablishReply,
    },
    Disconnect {
        reply: oneshot::Sender<()>,
    },
    Members {
        reply: oneshot::Sender<Vec<MemberInfo>>,
    },
    Shutdown,
}

/// A result reported by a spawned establish task.
///
/// Each carries the generation captured when its operation started. A
/// continuation whose generation no longer matches is stale — the
/// operation was cancelled after the task was spawned — and the handler
/// releases whatever the task acquired instead of applying the result.
enum Continuation {
    /// Host flow: transport up and lobby created.
    HostReady {
        generation: u64,
        lobby: LobbyHandle,
        name: String,
    },
    /// Host flow: the transport host never started.
    HostTransportFailed {
        generation: u64,
        error: TransportError,
    },
    /// Host flow: transport started but lobby creation failed.
    HostLobbyFailed {
        generation: u64,
        error: MatchmakingError,
    },
    /// Join flow: no joinable lobby with the requested id.
    JoinNotFound { generation: u64, id: SessionId },
    /// Join flow: the lobby lookup or join call failed.
    JoinLobbyFailed {
        generation: u64,
        error: MatchmakingError,
    },
    /// Join flow: in the lobby; time to dial the host.
    LobbyJoined {
        generation: u64,
        lobby: LobbyHandle,
    },
    /// Join flow: the client dial is underway under this connection id.
    ClientStarted {
        generation: u64,
        conn: ConnectionId,
    },
    /// Join flow: the transport client could not start.
    ClientStartFailed {
        generation: u64,
        error: TransportError,
    },
}

/// The establish operation currently in flight (at most one).
struct Pending {
    generation: u64,
    /// Where to deliver the result. `None` for invite-driven joins,
    /// which have no caller to answer.
    reply: Option<EstablishReply>,
    /// The lobby acquired so far (join flow, once entered).
    lobby: Option<LobbyHandle>,
    /// The dial this operation started, once known. Used to correlate
    /// transport callbacks to this attempt.
    conn: Option<ConnectionId>,
}

// ---------------------------------------------------------------------------
// Handle
// ---------------------------------------------------------------------------

/// Handle to a running session coordinator.
///
/// Cheap to clone; observers each hold one. Commands are serialized
/// through the coordinator's queue; `state`/`session_info` read a watch
/// snapshot and never block.
#[derive(Clone)]
pub struct SessionHandle {
    commands: mpsc::Sender<Input>,
    events: broadcast::Sender<SessionEvent>,
    snapshot: watch::Receiver<Snapshot>,
}

impl SessionHandle {
    /// Starts hosting a session with `capacity` member slots.
    ///
    /// Resolves once the session is fully established (or rolled back).
    ///
    /// # Errors
    /// - [`SessionError::InvalidCapacity`] — `capacity` is zero
    /// - [`SessionError::AlreadyInProgress`] — not idle
    /// - establish failures ([`SessionError::TransportStartFailed`],
    ///   [`SessionError::LobbyOperationFailed`]) after rollback
    pub async fn create_session(&self, capacity: u32) -> Result<SessionInfo, SessionError> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::Create { capacity, reply }).await?;
        rx.await.map_err(|_| SessionError::Unavailable)?
    }

    /// Joins the session whose id observers got from its host.
    ///
    /// Resolves once the lobby is joined *and* the transport link to the
    /// host is up — lobby membership alone is not a session.
    ///
    /// # Errors
    /// - [`SessionError::InvalidIdentifier`] — `id` doesn't parse
    /// - [`SessionError::AlreadyInProgress`] — not idle
    /// - [`SessionError::NotFound`] and the other establish failures
    ///   after rollback
    pub async fn join_session_by_id(&self, id: &str) -> Result<SessionInfo, SessionError> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::Join {
            id: id.to_string(),
            reply,
        })
        .await?;
        rx.await.map_err(|_| SessionError::Unavailable)?
    }

    /// Disconnects from the current session, best-effort.
    ///
    /// Always leaves the coordinator idle: leave/shutdown errors are
    /// logged, not surfaced. A no-op when already idle. An establish
    /// operation in flight is cancelled (its caller gets
    /// [`SessionError::Cancelled`]) and whatever it acquired is released.
    pub async fn disconnect(&self) -> Result<(), SessionError> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::Disconnect { reply }).await?;
        rx.await.map_err(|_| SessionError::Unavailable)
    }

    /// Current session state. Never blocks.
    pub fn state(&self) -> SessionState {
        self.snapshot.borrow().0
    }

    /// Metadata for the current session, if any. Never blocks.
    pub fn session_info(&self) -> Option<SessionInfo> {
        self.snapshot.borrow().1.clone()
    }

    /// The remote members currently known in the session.
    pub async fn members(&self) -> Result<Vec<MemberInfo>, SessionError> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::Members { reply }).await?;
        rx.await.map_err(|_| SessionError::Unavailable)
    }

    /// Subscribes to session events. Drop the receiver to unsubscribe;
    /// after the coordinator shuts down, receivers observe `Closed`.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    /// Shuts the coordinator down, disconnecting first if a session is
    /// live. For application exit.
    pub async fn shutdown(&self) -> Result<(), SessionError> {
        self.send(Command::Shutdown).await
    }

    async fn send(&self, command: Command) -> Result<(), SessionError> {
        self.commands
            .send(Input::Command(command))
            .await
            .map_err(|_| SessionError::Unavailable)
    }
}

// ---------------------------------------------------------------------------
// Spawning
// ---------------------------------------------------------------------------

/// Spawns session coordinators.
pub struct SessionCoordinator;

impl SessionCoordinator {
    /// Spawns a coordinator owning `transport` and `matchmaker` and
    /// returns the handle observers use to reach it.
    ///
    /// The coordinator takes exclusive ownership of both services for
    /// its lifetime; nothing else should start or stop them.
    pub fn spawn<T: Transport, M: Matchmaker>(
        transport: T,
        matchmaker: M,
        config: SessionConfig,
    ) -> SessionHandle {
        let (input_tx, input_rx) = mpsc::channel(config.queue_capacity);
        let (events, _) = broadcast::channel(config.event_capacity);
        let (snapshot_tx, snapshot_rx) = watch::channel((SessionState::Idle, None));

        let transport = Arc::new(transport);
        let matchmaker = Arc::new(matchmaker);
        let local = matchmaker.identity();

        // Forward service callbacks into the single input queue so the
        // actor applies them in arrival order with everything else.
        forward(transport.subscribe(), input_tx.clone(), Input::Transport);
        forward(matchmaker.subscribe(), input_tx.clone(), Input::Matchmaking);

        let actor = Actor {
            transport,
            matchmaker,
            local,
            config,
            state: SessionState::Idle,
            info: None,
            members: HashMap::new(),
            generation: 0,
            pending: None,
            active_conn: None,
            input_tx: input_tx.clone(),
            events: events.clone(),
            snapshot: snapshot_tx,
        };
        tokio::spawn(actor.run(input_rx));

        SessionHandle {
            commands: input_tx,
            events,
            snapshot: snapshot_rx,
        }
    }
}

/// Drains a broadcast callback stream into the actor queue.
fn forward<E: Clone + Send + 'static>(
    mut rx: broadcast::Receiver<E>,
    tx: mpsc::Sender<Input>,
    wrap: fn(E) -> Input,
) {
    tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(event) => {
                    if tx.send(wrap(event)).await.is_err() {
                        break; // coordinator gone
                    }
                }
                Err(broadcast::error::RecvError::Lagged(missed)) => {
                    tracing::warn!(missed, "callback stream lagged");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    });
}

// ---------------------------------------------------------------------------
// Actor
// ---------------------------------------------------------------------------

struct Actor<T: Transport, M: Matchmaker> {
    transport: Arc<T>,
    matchmaker: Arc<M>,
    /// This peer's matchmaking identity, for filtering its own
    /// membership echoes out of the callback stream.
    local: MemberInfo,
    config: SessionConfig,
    state: SessionState,
    info: Option<SessionInfo>,
    /// Remote members of the current session, for diagnostics/UI.
    members: HashMap<PeerId, MemberInfo>,
    /// Bumped on every operation start and every rollback to idle.
    /// Continuations carrying an older generation are stale.
    generation: u64,
    pending: Option<Pending>,
    /// The client-side link while connected as client.
    active_conn: Option<ConnectionId>,
    input_tx: mpsc::Sender<Input>,
    events: broadcast::Sender<SessionEvent>,
    snapshot: watch::Sender<Snapshot>,
}

impl<T: Transport, M: Matchmaker> Actor<T, M> {
    async fn run(mut self, mut inputs: mpsc::Receiver<Input>) {
        tracing::info!("session coordinator started");

        while let Some(input) = inputs.recv().await {
            match input {
                Input::Command(Command::Shutdown) => {
                    self.disconnect_session("coordinator shutdown").await;
                    break;
                }
                Input::Command(cmd) => self.handle_command(cmd).await,
                Input::Continuation(cont) => self.handle_continuation(cont).await,
                Input::Transport(event) => self.handle_transport_event(event).await,
                Input::Matchmaking(event) => self.handle_matchmaking_event(event).await,
            }
        }

        tracing::info!("session coordinator stopped");
    }

    // -- Commands ---------------------------------------------------------

    async fn handle_command(&mut self, command: Command) {
        match command {
            Command::Create { capacity, reply } => {
                if capacity == 0 {
                    let _ = reply.send(Err(SessionError::InvalidCapacity));
                    return;
                }
                if !self.state.is_idle() {
                    let _ = reply.send(Err(SessionError::AlreadyInProgress));
                    return;
                }
                self.begin_create(capacity, reply);
            }
            Command::Join { id, reply } => {
                let session_id: SessionId = match id.parse() {
                    Ok(parsed) => parsed,
                    Err(_) => {
                        let _ = reply.send(Err(SessionError::InvalidIdentifier(id)));
                        return;
                    }
                };
                if !self.state.is_idle() {
                    let _ = reply.send(Err(SessionError::AlreadyInProgress));
                    return;
                }
                self.begin_join(session_id, Some(reply));
            }
            Command::Disconnect { reply } => {
                self.disconnect_session("disconnect requested").await;
                let _ = reply.send(());
            }
            Command::Members { reply } => {
                let _ = reply.send(self.members.values().cloned().collect());
            }
            Command::Shutdown => unreachable!("handled in run()"),
        }
    }

    /// Idle → Hosting: start the transport host, then create the lobby.
    fn begin_create(&mut self, capacity: u32, reply: EstablishReply) {
        self.generation += 1;
        let generation = self.generation;
        self.set_state(SessionState::Hosting);
        self.pending = Some(Pending {
            generation,
            reply: Some(reply),
            lobby: None,
            conn: None,
        });
        tracing::info!(capacity, "creating session");

        let name = format!(
            "{}{}",
            self.config.lobby_name_prefix,
            rand::rng().random_range(0..100)
        );
        let transport = Arc::clone(&self.transport);
        let matchmaker = Arc::clone(&self.matchmaker);
        let tx = self.input_tx.clone();
        tokio::spawn(async move {
            if let Err(error) = transport.start_host().await {
                send_continuation(&tx, Continuation::HostTransportFailed { generation, error }).await;
                return;
            }
            match matchmaker.create_lobby(capacity).await {
                Ok(lobby) => {
                    // Display name is advisory; failure to publish it is
                    // logged, not fatal.
                    if let Err(error) = matchmaker.set_lobby_metadata(lobby.id, "name", &name).await
                    {
                        tracing::warn!(lobby_id = %lobby.id, %error, "failed to set lobby name");
                    }
                    send_continuation(
                        &tx,
                        Continuation::HostReady {
                            generation,
                            lobby,
                            name,
                        },
                    )
                    .await;
                }
                Err(error) => {
                    send_continuation(&tx, Continuation::HostLobbyFailed { generation, error })
                        .await;
                }
            }
        });
    }

    /// Idle → Joining: look the lobby up, join it; the transport dial
    /// follows once the lobby is entered.
    fn begin_join(&mut self, id: SessionId, reply: Option<EstablishReply>) {
        self.generation += 1;
        let generation = self.generation;
        self.set_state(SessionState::Joining);
        self.pending = Some(Pending {
            generation,
            reply,
            lobby: None,
            conn: None,
        });
        tracing::info!(session_id = %id, "joining session");

        let matchmaker = Arc::clone(&self.matchmaker);
        let tx = self.input_tx.clone();
        tokio::spawn(async move {
            let lobbies = match matchmaker.list_joinable().await {
                Ok(lobbies) => lobbies,
                Err(error) => {
                    send_continuation(&tx, Continuation::JoinLobbyFailed { generation, error })
                        .await;
                    return;
                }
            };
            let Some(candidate) = lobbies.into_iter().find(|lobby| lobby.id == id) else {
                send_continuation(&tx, Continuation::JoinNotFound { generation, id }).await;
                return;
            };
            match matchmaker.join_lobby(candidate.id).await {
                Ok(lobby) => {
                    send_continuation(&tx, Continuation::LobbyJoined { generation, lobby }).await;
                }
                Err(error) => {
                    send_continuation(&tx, Continuation::JoinLobbyFailed { generation, error })
                        .await;
                }
            }
        });
    }

    /// Tears the session down, best-effort, and returns to idle.
    ///
    /// Covers every live state: cancels a pending establish operation,
    /// leaves whatever lobby was acquired, and shuts the transport down.
    /// A no-op when already idle.
    async fn disconnect_session(&mut self, reason: &str) {
        if self.state.is_idle() {
            return;
        }
        tracing::info!(reason, state = %self.state, "disconnecting");

        // Invalidate in-flight continuations; their stale handlers
        // release anything acquired after this point.
        self.generation += 1;

        let pending = self.pending.take();
        let lobby_id = pending
            .as_ref()
            .and_then(|p| p.lobby.as_ref().map(|l| l.id))
            .or(self.info.as_ref().map(|i| i.id));
        if let Some(p) = pending {
            if let Some(reply) = p.reply {
                let _ = reply.send(Err(SessionError::Cancelled));
            }
        }
        self.info = None;
        self.members.clear();
        self.set_state(SessionState::Leaving);

        if let Some(id) = lobby_id {
            if let Err(error) = self.matchmaker.leave_lobby(id).await {
                tracing::warn!(lobby_id = %id, %error, "lobby leave failed (best effort)");
            }
        }
        if let Err(error) = self.transport.shutdown().await {
            tracing::warn!(%error, "transport shutdown failed (best effort)");
        }

        self.active_conn = None;
        self.set_state(SessionState::Idle);
        self.emit(SessionEvent::Ended);
    }

    // -- Continuations ----------------------------------------------------

    async fn handle_continuation(&mut self, continuation: Continuation) {
        match continuation {
            Continuation::HostReady {
                generation,
                lobby,
                name,
            } => {
                if generation != self.generation {
                    // Cancelled mid-create: both the lobby and the host
                    // transport came up after the disconnect already ran,
                    // so release them here.
                    self.release_stale_lobby(lobby.id);
                    if self.state.is_idle() {
                        self.shutdown_transport_detached();
                    }
                    return;
                }
                let info = SessionInfo {
                    id: lobby.id,
                    name,
                    capacity: lobby.capacity,
                    member_count: lobby.member_count,
                };
                self.info = Some(info.clone());
                self.set_state(SessionState::Connected(SessionRole::Host));
                tracing::info!(session_id = %info.id, "session established as host");
                self.emit(SessionEvent::Established(info.clone()));
                self.resolve_pending(Ok(info));
            }
            Continuation::HostTransportFailed { generation, error } => {
                if generation != self.generation {
                    return;
                }
                self.fail_establish(SessionError::TransportStartFailed(error.to_string()));
            }
            Continuation::HostLobbyFailed { generation, error } => {
                if generation != self.generation {
                    // The host started after the disconnect ran; reap it
                    // while nothing else owns the transport.
                    if self.state.is_idle() {
                        self.shutdown_transport_detached();
                    }
                    return;
                }
                // The transport host did start; roll it back.
                if let Err(error) = self.transport.shutdown().await {
                    tracing::warn!(%error, "transport rollback failed");
                }
                self.fail_establish(SessionError::LobbyOperationFailed(error.to_string()));
            }
            Continuation::JoinNotFound { generation, id } => {
                if generation != self.generation {
                    return;
                }
                self.fail_establish(SessionError::NotFound(id));
            }
            Continuation::JoinLobbyFailed { generation, error } => {
                if generation != self.generation {
                    return;
                }
                self.fail_establish(SessionError::LobbyOperationFailed(error.to_string()));
            }
            Continuation::LobbyJoined { generation, lobby } => {
                if generation != self.generation {
                    self.release_stale_lobby(lobby.id);
                    return;
                }
                // In the lobby; now dial the host. Established fires only
                // once the transport link comes up.
                self.info = Some(SessionInfo {
                    id: lobby.id,
                    name: lobby.name.clone(),
                    capacity: lobby.capacity,
                    member_count: lobby.member_count,
                });
                self.publish_snapshot();
                if let Some(pending) = self.pending.as_mut() {
                    pending.lobby = Some(lobby.clone());
                }
                tracing::info!(session_id = %lobby.id, host = %lobby.host_addr, "lobby joined, dialing host");

                let transport = Arc::clone(&self.transport);
                let tx = self.input_tx.clone();
                tokio::spawn(async move {
                    match transport.start_client(&lobby.host_addr).await {
                        Ok(conn) => {
                            send_continuation(&tx, Continuation::ClientStarted { generation, conn })
                                .await;
                        }
                        Err(error) => {
                            send_continuation(
                                &tx,
                                Continuation::ClientStartFailed { generation, error },
                            )
                            .await;
                        }
                    }
                });
            }
            Continuation::ClientStarted { generation, conn } => {
                if generation != self.generation {
                    // A dial that started after teardown is orphaned;
                    // reap it while nothing else owns the transport.
                    if self.state.is_idle() {
                        self.shutdown_transport_detached();
                    }
                    return;
                }
                match self.pending.as_mut() {
                    Some(pending) => pending.conn = Some(conn),
                    // Connect callback beat this continuation through the
                    // queue; we're already connected under this id.
                    None if self.state.is_connected() => self.active_conn = Some(conn),
                    None => {}
                }
            }
            Continuation::ClientStartFailed { generation, error } => {
                if generation != self.generation {
                    return;
                }
                self.rollback_join().await;
                self.fail_establish(SessionError::TransportStartFailed(error.to_string()));
            }
        }
    }

    // -- Transport callbacks ----------------------------------------------

    async fn handle_transport_event(&mut self, event: TransportEvent) {
        match event {
            TransportEvent::ServerStarted => {
                tracing::debug!("transport host ready");
            }
            TransportEvent::PeerConnected(conn) => match self.state {
                SessionState::Joining => {
                    let Some(pending) = self.pending.as_ref() else {
                        return;
                    };
                    // Only a dial we started can connect us; an id
                    // mismatch means a stale link from a torn-down
                    // attempt.
                    if pending.lobby.is_none() || pending.conn.is_some_and(|c| c != conn) {
                        return;
                    }
                    let info = self.info.clone().expect("info set when lobby joined");
                    self.active_conn = Some(conn);
                    self.set_state(SessionState::Connected(SessionRole::Client));
                    tracing::info!(session_id = %info.id, %conn, "session established as client");
                    self.emit(SessionEvent::Established(info.clone()));
                    self.resolve_pending(Ok(info));
                }
                SessionState::Connected(SessionRole::Host) => {
                    tracing::debug!(%conn, "peer link up");
                }
                _ => {
                    tracing::debug!(%conn, state = %self.state, "ignoring connect callback");
                }
            },
            TransportEvent::PeerDisconnected(conn) => match self.state {
                SessionState::Joining => {
                    let Some(pending) = self.pending.as_ref() else {
                        return;
                    };
                    if pending.lobby.is_none() || pending.conn.is_some_and(|c| c != conn) {
                        return;
                    }
                    // The link dropped before it ever came up: leave the
                    // lobby we joined and roll back.
                    tracing::warn!(%conn, "link to host failed during join");
                    self.rollback_join().await;
                    self.fail_establish(SessionError::TransportError);
                }
                SessionState::Connected(SessionRole::Client) => {
                    if self.active_conn.is_some_and(|c| c != conn) {
                        return;
                    }
                    // Involuntary disconnect behaves like a local one:
                    // best-effort teardown, session ended.
                    self.disconnect_session("link to host lost").await;
                }
                SessionState::Connected(SessionRole::Host) => {
                    // Membership is tracked through matchmaking events;
                    // transport-level churn is only worth a log line.
                    tracing::debug!(%conn, "peer link down");
                }
                _ => {}
            },
        }
    }

    // -- Matchmaking callbacks --------------------------------------------

    async fn handle_matchmaking_event(&mut self, event: MatchmakingEvent) {
        match event {
            MatchmakingEvent::MemberJoined { lobby_id, member } => {
                if member.id == self.local.id {
                    return; // our own join, echoed back
                }
                if !self.in_current_session(lobby_id) {
                    tracing::debug!(%lobby_id, "ignoring member-joined outside session");
                    return;
                }
                if self.members.insert(member.id, member.clone()).is_some() {
                    return; // already known
                }
                if let Some(info) = self.info.as_mut() {
                    info.member_count = info.member_count.saturating_add(1);
                }
                self.publish_snapshot();
                tracing::info!(member = %member.id, name = %member.name, "member joined");
                self.emit(SessionEvent::MemberJoined(member));
            }
            MatchmakingEvent::MemberLeft {
                lobby_id,
                member_id,
            } => {
                if member_id == self.local.id {
                    return; // our own leave, echoed back
                }
                if !self.in_current_session(lobby_id) {
                    tracing::debug!(%lobby_id, "ignoring member-left outside session");
                    return;
                }
                self.members.remove(&member_id);
                if let Some(info) = self.info.as_mut() {
                    info.member_count = info.member_count.saturating_sub(1);
                }
                self.publish_snapshot();
                tracing::info!(member = %member_id, "member left");
                self.emit(SessionEvent::MemberLeft(member_id));
            }
            MatchmakingEvent::LobbyCreated { lobby } | MatchmakingEvent::LobbyEntered { lobby } => {
                // Establish flows are driven by the async call results,
                // not these callbacks.
                tracing::debug!(lobby_id = %lobby.id, "lobby callback");
            }
            MatchmakingEvent::InviteReceived { from, lobby_id } => {
                tracing::info!(from = %from.name, %lobby_id, "invite received");
            }
            MatchmakingEvent::JoinRequested { lobby_id } => {
                // Invite accepted: an implicit join-by-id, subject to the
                // same single-operation rule. No caller to answer, so
                // failures surface only as events.
                if self.state.is_idle() {
                    tracing::info!(%lobby_id, "joining from accepted invite");
                    self.begin_join(lobby_id, None);
                } else {
                    tracing::warn!(%lobby_id, state = %self.state, "ignoring join request while busy");
                }
            }
        }
    }

    // -- Shared plumbing ---------------------------------------------------

    /// Rolls an establish failure back to idle and reports it on both
    /// paths: the `Failed` event and the pending caller, if any.
    fn fail_establish(&mut self, error: SessionError) {
        // Invalidate any sibling continuation still in flight.
        self.generation += 1;
        let pending = self.pending.take();
        self.active_conn = None;
        self.members.clear();
        self.info = None;
        self.set_state(SessionState::Idle);
        tracing::warn!(%error, "session establish failed");
        self.emit(SessionEvent::Failed(error.clone()));
        if let Some(p) = pending {
            if let Some(reply) = p.reply {
                let _ = reply.send(Err(error));
            }
        }
    }

    /// Releases what the join flow acquired: the lobby, and whatever the
    /// transport client already set up.
    async fn rollback_join(&mut self) {
        let lobby_id = self
            .pending
            .as_ref()
            .and_then(|p| p.lobby.as_ref().map(|l| l.id));
        if let Some(id) = lobby_id {
            if let Err(error) = self.matchmaker.leave_lobby(id).await {
                tracing::warn!(lobby_id = %id, %error, "lobby leave failed during rollback");
            }
        }
        if let Err(error) = self.transport.shutdown().await {
            tracing::warn!(%error, "transport rollback failed");
        }
    }

    /// Leaves a lobby acquired by an operation that was cancelled after
    /// its task had already run.
    fn release_stale_lobby(&self, id: SessionId) {
        tracing::debug!(lobby_id = %id, "releasing lobby from cancelled operation");
        let matchmaker = Arc::clone(&self.matchmaker);
        tokio::spawn(async move {
            if let Err(error) = matchmaker.leave_lobby(id).await {
                tracing::warn!(lobby_id = %id, %error, "stale lobby release failed");
            }
        });
    }

    fn shutdown_transport_detached(&self) {
        let transport = Arc::clone(&self.transport);
        tokio::spawn(async move {
            if let Err(error) = transport.shutdown().await {
                tracing::warn!(%error, "orphaned transport shutdown failed");
            }
        });
    }

    fn resolve_pending(&mut self, result: Result<SessionInfo, SessionError>) {
        if let Some(pending) = self.pending.take() {
            if let Some(reply) = pending.reply {
                let _ = reply.send(result);
            }
        }
    }

    /// True while connected to the session with the given lobby id;
    /// membership callbacks outside that are stale and ignored.
    fn in_current_session(&self, lobby_id: SessionId) -> bool {
        self.state.is_connected() && self.info.as_ref().is_some_and(|info| info.id == lobby_id)
    }

    fn set_state(&mut self, state: SessionState) {
        self.state = state;
        self.publish_snapshot();
    }

    fn publish_snapshot(&self) {
        let _ = self.snapshot.send((self.state, self.info.clone()));
    }

    fn emit(&self, event: SessionEvent) {
        // No subscribers is fine; each subscriber's receiver is
        // independent, so one lagging observer can't affect the rest.
        let _ = self.events.send(event);
    }
}

async fn send_continuation(tx: &mpsc::Sender<Input>, continuation: Continuation) {
    // A closed queue means the coordinator is gone; nothing to report to.
    let _ = tx.send(Input::Continuation(continuation)).await;
}
