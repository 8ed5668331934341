//! Run (§3): the unit of simulation, and its scratch tracking state.
//!
//! Per-entity scratch (attack cooldowns, aggro start, leash timers, charge
//! state, death time) is colocated on the entity itself via
//! [`super::enemy::EnemyTracking`] / [`super::player::PlayerCombatState`] —
//! since those components live inside this Run's own ECS `World`, they are
//! destroyed with the Run and can never leak across runs, which is the
//! property §3 calls out as load-bearing. `RunTracking` below holds the
//! remaining scratch state that isn't naturally keyed by a single entity.

use bevy_ecs::prelude::*;
use glam::Vec2;
use std::collections::{HashMap, HashSet};

use crate::catalog::items::ItemStats;

#[derive(Resource, Debug, Clone)]
pub struct Run {
    pub seed: String,
    pub floor: u32,
    /// Average equipped item power across all players, recomputed whenever
    /// equipment changes; feeds `scale_enemy_stats` (§4.3).
    pub avg_item_power: i32,
    pub pending_loot: Vec<PendingLoot>,
}

#[derive(Debug, Clone)]
pub struct PendingLoot {
    pub room: Entity,
    pub stats: ItemStats,
    pub rarity: crate::catalog::items::Rarity,
}

impl Run {
    pub fn new(seed: String) -> Self {
        Self {
            seed,
            floor: 1,
            avg_item_power: 0,
            pending_loot: Vec::new(),
        }
    }
}

/// Room- and pair-keyed scratch state that must not persist across Runs
/// (§3 RunTracking, §9 "fixed memory leak" note).
#[derive(Resource, Debug, Default)]
pub struct RunTracking {
    /// (player, ground-effect) -> time since last damage tick.
    pub ground_effect_tick_times: HashMap<(Entity, Entity), f32>,
    /// (player, trap) -> time since last damage tick.
    pub trap_damage_cooldowns: HashMap<(Entity, Entity), f32>,
    /// room -> whether its ambush has already been revealed.
    pub ambush_triggered: HashSet<Entity>,
    /// room -> time since last modifier (burning/cursed/blessed) tick.
    pub modifier_tick_times: HashMap<Entity, f32>,
    /// boss entity -> time the current boss fight started.
    pub boss_fight_start: HashMap<Entity, f32>,
    /// player -> continuous movement intent set by the last PLAYER_INPUT.
    pub movement_intent: HashMap<Entity, Vec2>,
    /// player -> momentum vector (Frozen theme physics, §4.7 step 2).
    pub momentum: HashMap<Entity, Vec2>,
    /// player -> time since Inferno hazard was last checked.
    pub inferno_hazard_timer: HashMap<Entity, f32>,
    /// enemy -> time since it left engagement range, for leashing (§4.5).
    pub leash_disengage_timer: HashMap<Entity, f32>,
    pub elapsed: f32,
}

impl RunTracking {
    /// Clear everything keyed by `entity`, used on respawn (§4.7 step 17)
    /// and floor transition.
    pub fn clear_for_entity(&mut self, entity: Entity) {
        self.movement_intent.remove(&entity);
        self.momentum.remove(&entity);
        self.inferno_hazard_timer.remove(&entity);
        self.leash_disengage_timer.remove(&entity);
        self.ground_effect_tick_times.retain(|(p, _), _| *p != entity);
        self.trap_damage_cooldowns.retain(|(p, _), _| *p != entity);
    }
}
