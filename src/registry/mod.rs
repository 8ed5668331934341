//! Run Registry (§2 component 9, §5 "Shared resources").
//!
//! A concurrent index: `runId -> Run` (here, a handle onto the task that
//! owns the Run's `World`), `playerId -> runId`, and `runId -> set of
//! client handles`. Bevy `Entity` values are only unique *within* a Run's
//! `World` (§3 invariant 1), so cross-run identity needs its own opaque
//! ids — [`RunId`], [`PlayerId`], [`ClientId`] — minted here and handed to
//! the transport layer, which is the only caller that needs to address a
//! Run or a client from outside its owning task.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::{mpsc, RwLock};
use tracing::{info, warn};

use crate::net::intents::ClientIntent;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RunId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PlayerId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClientId(pub u64);

/// Capacity of each Run's inbound intent channel (§5.1).
pub const RUN_INTENT_CHANNEL_CAPACITY: usize = 256;

/// A tagged intent as it crosses from the transport layer into a Run's
/// task — the player it came from, resolved before enqueueing.
#[derive(Debug, Clone)]
pub struct TaggedIntent {
    pub player: PlayerId,
    pub intent: ClientIntent,
}

/// What the registry knows about a live Run from the outside: how to reach
/// its task, and which clients are currently subscribed to its broadcasts.
#[derive(Debug)]
pub struct RunHandle {
    pub intent_tx: mpsc::Sender<TaggedIntent>,
    pub clients: HashSet<ClientId>,
}

#[derive(Debug, Default)]
struct RegistryState {
    runs: HashMap<RunId, RunHandle>,
    player_to_run: HashMap<PlayerId, RunId>,
}

/// Shared across every connection-handling task; cheap to clone (`Arc`
/// inside).
#[derive(Debug, Default)]
pub struct RunRegistry {
    state: RwLock<RegistryState>,
    next_run_id: AtomicU64,
    next_player_id: AtomicU64,
    next_client_id: AtomicU64,
}

impl RunRegistry {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn mint_run_id(&self) -> RunId {
        RunId(self.next_run_id.fetch_add(1, Ordering::Relaxed))
    }

    pub fn mint_player_id(&self) -> PlayerId {
        PlayerId(self.next_player_id.fetch_add(1, Ordering::Relaxed))
    }

    pub fn mint_client_id(&self) -> ClientId {
        ClientId(self.next_client_id.fetch_add(1, Ordering::Relaxed))
    }

    /// Register a newly spawned Run's task handle, returning the intent
    /// sender half callers should hold onto (the registry keeps its own
    /// clone for routing).
    pub async fn register_run(&self, run_id: RunId, intent_tx: mpsc::Sender<TaggedIntent>) {
        let mut state = self.state.write().await;
        state.runs.insert(
            run_id,
            RunHandle {
                intent_tx,
                clients: HashSet::new(),
            },
        );
        info!(?run_id, "run registered");
    }

    /// Removes the Run entry, as happens both on a `RunFault` (§5.1) and
    /// on the last-player-disconnect lifecycle event (§5).
    pub async fn remove_run(&self, run_id: RunId) {
        let mut state = self.state.write().await;
        if state.runs.remove(&run_id).is_some() {
            state.player_to_run.retain(|_, r| *r != run_id);
            info!(?run_id, "run removed");
        }
    }

    pub async fn bind_player(&self, player: PlayerId, run_id: RunId) {
        self.state.write().await.player_to_run.insert(player, run_id);
    }

    pub async fn unbind_player(&self, player: PlayerId) {
        self.state.write().await.player_to_run.remove(&player);
    }

    pub async fn run_for_player(&self, player: PlayerId) -> Option<RunId> {
        self.state.read().await.player_to_run.get(&player).copied()
    }

    pub async fn add_client_to_run(&self, run_id: RunId, client: ClientId) {
        let mut state = self.state.write().await;
        match state.runs.get_mut(&run_id) {
            Some(handle) => {
                handle.clients.insert(client);
            }
            None => warn!(?run_id, ?client, "add_client_to_run: run not found"),
        }
    }

    /// Returns `true` if the Run now has zero subscribed clients, i.e. the
    /// caller should tear it down (§5 "last player in the Run").
    pub async fn remove_client_from_run(&self, run_id: RunId, client: ClientId) -> bool {
        let mut state = self.state.write().await;
        match state.runs.get_mut(&run_id) {
            Some(handle) => {
                handle.clients.remove(&client);
                handle.clients.is_empty()
            }
            None => true,
        }
    }

    pub async fn clients_in_run(&self, run_id: RunId) -> HashSet<ClientId> {
        self.state
            .read()
            .await
            .runs
            .get(&run_id)
            .map(|h| h.clients.clone())
            .unwrap_or_default()
    }

    /// Routes an intent to its Run's inbound channel. Returns `Err` if the
    /// Run is gone or its channel is saturated/closed — callers should
    /// surface this as a dropped-intent log, not a hard failure.
    pub async fn route_intent(&self, run_id: RunId, intent: TaggedIntent) -> Result<(), ()> {
        let tx = {
            let state = self.state.read().await;
            match state.runs.get(&run_id) {
                Some(handle) => handle.intent_tx.clone(),
                None => return Err(()),
            }
        };
        tx.send(intent).await.map_err(|_| ())
    }

    pub async fn run_count(&self) -> usize {
        self.state.read().await.runs.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn register_then_remove_run_clears_player_bindings() {
        let registry = RunRegistry::new();
        let run_id = registry.mint_run_id();
        let player = registry.mint_player_id();
        let (tx, _rx) = mpsc::channel(RUN_INTENT_CHANNEL_CAPACITY);
        registry.register_run(run_id, tx).await;
        registry.bind_player(player, run_id).await;
        assert_eq!(registry.run_for_player(player).await, Some(run_id));

        registry.remove_run(run_id).await;
        assert_eq!(registry.run_for_player(player).await, None);
    }

    #[tokio::test]
    async fn removing_last_client_signals_teardown() {
        let registry = RunRegistry::new();
        let run_id = registry.mint_run_id();
        let (tx, _rx) = mpsc::channel(RUN_INTENT_CHANNEL_CAPACITY);
        registry.register_run(run_id, tx).await;
        let c1 = registry.mint_client_id();
        let c2 = registry.mint_client_id();
        registry.add_client_to_run(run_id, c1).await;
        registry.add_client_to_run(run_id, c2).await;

        assert!(!registry.remove_client_from_run(run_id, c1).await);
        assert!(registry.remove_client_from_run(run_id, c2).await);
    }

    #[tokio::test]
    async fn route_intent_fails_for_unknown_run() {
        let registry = RunRegistry::new();
        let unknown = RunId(999);
        let player = registry.mint_player_id();
        let result = registry
            .route_intent(
                unknown,
                TaggedIntent {
                    player,
                    intent: ClientIntent::Ping,
                },
            )
            .await;
        assert!(result.is_err());
    }
}
