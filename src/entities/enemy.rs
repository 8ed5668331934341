//! Enemy entity (§3, §4.5).

use bevy_ecs::prelude::*;
use glam::Vec2;

use super::buff::ActiveBuffs;
use super::stats::Stats;
use crate::catalog::enemies::{BossId, EnemyId, EnemyRole};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatrolDirection {
    Forward,
    Reverse,
}

#[derive(Debug, Clone)]
pub struct Patrol {
    pub waypoints: Vec<Vec2>,
    pub current_waypoint_index: usize,
    pub direction: PatrolDirection,
}

#[derive(Component, Debug, Clone)]
pub struct Enemy {
    pub kind: EnemyId,
    pub role: EnemyRole,
    pub stats: Stats,
    pub buffs: ActiveBuffs,
    pub position: Vec2,
    pub target_id: Option<Entity>,
    pub is_boss: bool,
    pub is_rare: bool,
    pub is_elite: bool,
    pub is_hidden: bool,
    pub boss_id: Option<BossId>,
    pub spawn_position: Vec2,
    pub original_room_id: Entity,
    pub current_room_id: Entity,
    pub patrol: Option<Patrol>,
    pub was_patrolling: bool,
    pub is_alive: bool,
}

impl Enemy {
    pub fn new(kind: EnemyId, stats: Stats, position: Vec2, room: Entity) -> Self {
        Self {
            kind,
            role: kind.role(),
            stats,
            buffs: ActiveBuffs::default(),
            position,
            target_id: None,
            is_boss: false,
            is_rare: kind.is_rare(),
            is_elite: false,
            is_hidden: false,
            boss_id: None,
            spawn_position: position,
            original_room_id: room,
            current_room_id: room,
            patrol: None,
            was_patrolling: false,
            is_alive: true,
        }
    }

    pub fn is_patrolling(&self) -> bool {
        self.patrol.is_some()
    }

    pub fn kill(&mut self) {
        self.is_alive = false;
        self.target_id = None;
    }
}

/// Per-enemy tracking that must live under the owning `Run`, never
/// globally (§3 RunTracking, §9 "previously-global ... must be colocated").
#[derive(Component, Debug, Clone, Default)]
pub struct EnemyTracking {
    pub aggro_start: Option<f32>,
    pub attack_cooldown: f32,
    pub leash_timer: f32,
    pub is_charging: bool,
    pub charge_elapsed: f32,
    pub charge_target: Option<Vec2>,
}
