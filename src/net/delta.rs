//! Per-client delta broadcast (§2 component 10, §4.9).

use bevy_ecs::prelude::*;
use std::collections::HashMap;

/// Per-client cached last-sent view, keyed by client id. Holds just enough
/// to detect "needs full sync" and to diff against on subsequent ticks.
#[derive(Debug, Clone, Default)]
pub struct ClientSyncState {
    pub needs_full_sync: bool,
    pub last_sent_room_fingerprints: HashMap<Entity, u64>,
    pub last_sent_entity_fingerprints: HashMap<Entity, u64>,
}

impl ClientSyncState {
    pub fn joined() -> Self {
        Self {
            needs_full_sync: true,
            ..Default::default()
        }
    }

    pub fn on_floor_change(&mut self) {
        self.needs_full_sync = true;
        self.last_sent_room_fingerprints.clear();
        self.last_sent_entity_fingerprints.clear();
    }
}

#[derive(Debug, Clone)]
pub enum BroadcastPlan {
    FullSnapshot,
    Delta { changed_rooms: Vec<Entity>, changed_entities: Vec<Entity> },
}

/// Decide, and if a delta, compute which rooms/entities changed fingerprint
/// since the last tick — never including the per-run `RunTracking`
/// substructure (§4.9 "Delta must omit the per-run tracking substructure").
pub fn plan_broadcast(
    state: &mut ClientSyncState,
    current_room_fingerprints: &HashMap<Entity, u64>,
    current_entity_fingerprints: &HashMap<Entity, u64>,
) -> BroadcastPlan {
    if state.needs_full_sync {
        state.needs_full_sync = false;
        state.last_sent_room_fingerprints = current_room_fingerprints.clone();
        state.last_sent_entity_fingerprints = current_entity_fingerprints.clone();
        return BroadcastPlan::FullSnapshot;
    }

    let changed_rooms = current_room_fingerprints
        .iter()
        .filter(|(id, fp)| state.last_sent_room_fingerprints.get(*id) != Some(*fp))
        .map(|(id, _)| *id)
        .collect();
    let changed_entities = current_entity_fingerprints
        .iter()
        .filter(|(id, fp)| state.last_sent_entity_fingerprints.get(*id) != Some(*fp))
        .map(|(id, _)| *id)
        .collect();

    state.last_sent_room_fingerprints = current_room_fingerprints.clone();
    state.last_sent_entity_fingerprints = current_entity_fingerprints.clone();

    BroadcastPlan::Delta { changed_rooms, changed_entities }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_sync_after_join_is_full_snapshot() {
        let mut state = ClientSyncState::joined();
        let plan = plan_broadcast(&mut state, &HashMap::new(), &HashMap::new());
        assert!(matches!(plan, BroadcastPlan::FullSnapshot));
    }

    #[test]
    fn floor_change_forces_next_sync_full() {
        let mut state = ClientSyncState::joined();
        let _ = plan_broadcast(&mut state, &HashMap::new(), &HashMap::new());
        state.on_floor_change();
        let plan = plan_broadcast(&mut state, &HashMap::new(), &HashMap::new());
        assert!(matches!(plan, BroadcastPlan::FullSnapshot));
    }

    #[test]
    fn unchanged_entity_is_not_in_delta() {
        let mut state = ClientSyncState::joined();
        let e = Entity::from_raw(1);
        let mut fp = HashMap::new();
        fp.insert(e, 42u64);
        let _ = plan_broadcast(&mut state, &HashMap::new(), &fp);
        let plan = plan_broadcast(&mut state, &HashMap::new(), &fp);
        match plan {
            BroadcastPlan::Delta { changed_entities, .. } => assert!(changed_entities.is_empty()),
            _ => panic!("expected delta"),
        }
    }
}
