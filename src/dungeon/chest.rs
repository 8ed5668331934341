//! Chests (§3, §4.2 step 8).

use bevy_ecs::prelude::*;
use glam::Vec2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LootTier {
    Common,
    Rare,
    Epic,
}

#[derive(Component, Debug, Clone)]
pub struct Chest {
    pub position: Vec2,
    pub loot_tier: LootTier,
    pub is_open: bool,
    pub is_locked: bool,
    /// Treasure-theme-only: opening spawns an enemy in place (§4.2
    /// "Failure semantics").
    pub is_mimic: bool,
}

impl Chest {
    pub fn new(position: Vec2, loot_tier: LootTier, is_mimic: bool) -> Self {
        Self {
            position,
            loot_tier,
            is_open: false,
            is_locked: false,
            is_mimic,
        }
    }

    pub fn tier_for_room(room_type: crate::dungeon::room::RoomType) -> LootTier {
        match room_type {
            crate::dungeon::room::RoomType::Boss => LootTier::Epic,
            crate::dungeon::room::RoomType::Rare => LootTier::Rare,
            _ => LootTier::Common,
        }
    }
}
