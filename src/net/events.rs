//! Server events (§6).

use bevy_ecs::prelude::*;
use glam::Vec2;

use crate::catalog::abilities::AbilityId;
use crate::loot::vendor::VendorKind;

#[derive(Debug, Clone)]
pub struct CombatEventPayload {
    pub source_id: Entity,
    pub target_id: Entity,
    pub damage: Option<i32>,
    pub heal: Option<i32>,
    pub blocked: Option<i32>,
    pub mana_restore: Option<i32>,
    pub ability_id: Option<AbilityId>,
    pub is_crit: bool,
    pub is_stealth_attack: bool,
    pub killed: bool,
}

#[derive(Debug, Clone)]
pub enum ServerEvent {
    RunCreated {
        run_id: Entity,
    },
    StateUpdate,
    DeltaUpdate,
    CombatEvent(CombatEventPayload),
    TauntEvent {
        source_id: Entity,
        target_id: Entity,
    },
    BossPhaseChange {
        boss_id: Entity,
    },
    LootDrop {
        room_id: Entity,
    },
    ItemCollected {
        player_id: Entity,
        item_id: Entity,
    },
    PotionUsed {
        player_id: Entity,
        item_id: Entity,
    },
    VendorServices {
        vendor_id: Entity,
        kind: VendorKind,
    },
    PurchaseResult {
        player_id: Entity,
        success: bool,
    },
    ChestOpened {
        chest_id: Entity,
        position: Vec2,
        is_mimic: bool,
    },
    FloorComplete {
        floor: u32,
    },
    Pong,
    Error {
        message: String,
    },
    /// Reward-oracle bridge message (§2 component 12, opaque payload).
    RewardOracle {
        payload: String,
    },
}
