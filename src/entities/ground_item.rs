//! Ground items (§3 Room.groundItems): walkable per-room floor loot, spawned
//! by the generator and collected via an explicit `PICKUP_GROUND_ITEM`
//! intent — distinct from `Run.pendingLoot`, the boss/rare-kill drop queue
//! auto-collected by the tick scheduler's proximity phase.

use bevy_ecs::prelude::*;
use glam::Vec2;

use crate::catalog::items::{EquipmentSlot, ItemStats, Rarity};

#[derive(Component, Debug, Clone)]
pub struct GroundItem {
    pub position: Vec2,
    pub stats: ItemStats,
    pub rarity: Rarity,
    pub slot: EquipmentSlot,
    pub room: Entity,
}

impl GroundItem {
    pub fn new(position: Vec2, stats: ItemStats, rarity: Rarity, slot: EquipmentSlot, room: Entity) -> Self {
        Self { position, stats, rarity, slot, room }
    }
}
