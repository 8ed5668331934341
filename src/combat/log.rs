//! Per-run combat log (§4.7 "Emit ... combat events").
//!
//! Grounded on the reference engine's `combat::log::CombatLog` resource
//! (entries vec keyed by a typed event enum, `recent`/`filter_by_type`
//! helpers), rebuilt here rather than copied: the new log is owned by a
//! `Run` (not a shared match-wide singleton), and its entries carry the
//! structured payload the delta broadcaster forwards as `COMBAT_EVENT`
//! rather than a pre-formatted message string.

use bevy_ecs::prelude::*;
use bevy_ecs::system::Resource;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum CombatLogEvent {
    Damage {
        source: Entity,
        target: Entity,
        damage: i32,
        is_crit: bool,
        blocked: i32,
        ability: Option<crate::catalog::abilities::AbilityId>,
        killed: bool,
    },
    Heal {
        source: Entity,
        target: Entity,
        amount: i32,
    },
    ManaRestore {
        source: Entity,
        target: Entity,
        amount: i32,
    },
    AbilityUsed {
        source: Entity,
        ability: crate::catalog::abilities::AbilityId,
    },
    AuraApplied {
        target: Entity,
        icon: crate::catalog::abilities::IconId,
    },
    AuraRemoved {
        target: Entity,
        icon: crate::catalog::abilities::IconId,
    },
    CrowdControl {
        source: Entity,
        target: Entity,
        duration: f32,
    },
    Death {
        entity: Entity,
    },
    Taunt {
        source: Entity,
        target: Entity,
    },
    BossPhaseChange {
        boss: Entity,
    },
    LootDrop {
        room: Entity,
    },
    FloorComplete {
        floor: u32,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CombatLogEntry {
    pub tick_time: f32,
    pub event: CombatLogEvent,
}

/// Serializable as `serde_json`; entries accumulate for the lifetime of a
/// Run and are never persisted (§1.1 "no persisted state").
#[derive(Resource, Debug, Default)]
pub struct CombatLog {
    pub entries: Vec<CombatLogEntry>,
    pub tick_time: f32,
}

impl CombatLog {
    pub fn log(&mut self, event: CombatLogEvent) {
        self.entries.push(CombatLogEntry {
            tick_time: self.tick_time,
            event,
        });
    }

    pub fn recent(&self, count: usize) -> &[CombatLogEntry] {
        let start = self.entries.len().saturating_sub(count);
        &self.entries[start..]
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recent_returns_last_n_entries_in_order() {
        let mut log = CombatLog::default();
        for i in 0..5 {
            log.log(CombatLogEvent::FloorComplete { floor: i });
        }
        let recent = log.recent(2);
        assert_eq!(recent.len(), 2);
        match recent[1].event {
            CombatLogEvent::FloorComplete { floor } => assert_eq!(floor, 4),
            _ => panic!("wrong event"),
        }
    }
}
