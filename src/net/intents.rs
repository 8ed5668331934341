//! Decoded client intents (§6).

use bevy_ecs::prelude::*;
use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::catalog::abilities::AbilityId;
use crate::catalog::classes::ClassId;
use crate::catalog::items::EquipmentSlot;
use crate::loot::vendor::ServiceType;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveData {
    pub name: String,
    pub class_id: String,
    pub level: u32,
    pub gold: u32,
    pub floor: u32,
    pub abilities: Vec<AbilityId>,
    pub backpack_len: usize,
    pub xp: i64,
    pub lives: u8,
}

/// The decoded, ID-resolved form of a client message — the transport layer
/// (out of scope) turns wire JSON into this after mapping client-visible
/// ids to live `Entity` handles within the addressed Run.
#[derive(Debug, Clone)]
pub enum ClientIntent {
    CreateRun {
        player_name: String,
        class: ClassId,
    },
    CreateRunFromSave {
        save: SaveData,
    },
    PlayerInput {
        move_x: f32,
        move_y: f32,
        cast_ability: Option<AbilityId>,
        target_id: Option<Entity>,
        target_position: Option<Vec2>,
    },
    SetTarget {
        target_id: Option<Entity>,
    },
    AdvanceFloor,
    UseItem {
        item_id: Entity,
    },
    SwapEquipment {
        backpack_index: usize,
        slot: EquipmentSlot,
    },
    UnequipItem {
        slot: EquipmentSlot,
    },
    InteractVendor {
        vendor_id: Entity,
    },
    PurchaseService {
        vendor_id: Entity,
        service_type: ServiceType,
        ability_id: Option<AbilityId>,
        item_id: Option<Entity>,
    },
    PickupGroundItem {
        item_id: Entity,
    },
    OpenChest {
        chest_id: Entity,
    },
    Ping,
}

pub const PICKUP_GROUND_ITEM_DISTANCE: f32 = 200.0;
pub const OPEN_CHEST_DISTANCE: f32 = 80.0;
