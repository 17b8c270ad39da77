//! Two peers in one process: a host creates a session, a friend joins it
//! by id (the way a player would paste an id into a menu), and both watch
//! the session events go by.
//!
//! Run with `cargo run -p lobby-demo`. Set `RUST_LOG=debug` to watch the
//! coordinators work underneath.

use std::time::Duration;

use huddle::prelude::*;
use huddle_matchmaking::{InMemoryMatchmaker, LobbyDirectory};
use tracing::info;

fn peer(
    directory: &std::sync::Arc<LobbyDirectory>,
    id: u64,
    name: &str,
    port: u16,
) -> SessionHandle {
    let matchmaker = InMemoryMatchmaker::new(
        std::sync::Arc::clone(directory),
        MemberInfo {
            id: PeerId(id),
            name: name.to_string(),
        },
        PeerAddr::new(format!("127.0.0.1:{port}")),
    );
    HuddleBuilder::new()
        .bind(&format!("127.0.0.1:{port}"))
        .build(matchmaker)
}

/// Prints every session event a peer sees, tagged with its name.
fn watch_events(name: &'static str, session: &SessionHandle) {
    let mut events = session.subscribe();
    tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            match event {
                SessionEvent::Established(info) => {
                    info!("[{name}] session {} established ({})", info.id, info.name);
                }
                SessionEvent::Failed(error) => info!("[{name}] session failed: {error}"),
                SessionEvent::Ended => info!("[{name}] session ended"),
                SessionEvent::MemberJoined(member) => {
                    info!("[{name}] member joined: {}", member.name);
                }
                SessionEvent::MemberLeft(id) => info!("[{name}] member left: {id}"),
            }
        }
    });
}

#[tokio::main]
async fn main() -> Result<(), HuddleError> {
    huddle::init_tracing();

    // One shared directory stands in for the platform's matchmaking
    // service; each peer gets its own client onto it.
    let directory = LobbyDirectory::new();

    let alice = peer(&directory, 1, "alice", 9301);
    let bob = peer(&directory, 2, "bob", 9302);
    watch_events("alice", &alice);
    watch_events("bob", &bob);

    // Alice hosts and shares the session id out of band.
    let info = alice.create_session(4).await?;
    info!("alice is hosting session {} — share this id", info.id);

    // Bob types the id in and joins.
    bob.join_session_by_id(&info.id.to_string()).await?;
    info!("bob joined as {:?}", bob.state().role());

    // Give the membership callbacks a moment to fan out.
    tokio::time::sleep(Duration::from_millis(200)).await;
    info!(
        "alice sees {} member(s) in the session",
        alice.session_info().map_or(0, |i| i.member_count)
    );

    bob.disconnect().await?;
    alice.disconnect().await?;
    tokio::time::sleep(Duration::from_millis(200)).await;

    alice.shutdown().await?;
    bob.shutdown().await?;
    Ok(())
}
