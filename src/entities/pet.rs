//! Pets (§3): owner-scoped followers. Mirrors the taunt-cycle / attack-range
//! behavior the combat AI module drives in §4.7 step 13.

use bevy_ecs::prelude::*;
use glam::Vec2;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PetType {
    Imp,
    Voidwalker,
    Beast,
    Totem,
}

impl PetType {
    /// Totems are stationary and never taunt (§3).
    pub fn can_taunt(&self) -> bool {
        !matches!(self, PetType::Totem)
    }

    pub fn follows_owner(&self) -> bool {
        !matches!(self, PetType::Totem)
    }

    /// Attack range by pet type (§4.7 step 13).
    pub fn attack_range(&self) -> f32 {
        match self {
            PetType::Imp => 300.0,
            PetType::Totem => 250.0,
            PetType::Voidwalker | PetType::Beast => 200.0,
        }
    }
}

pub const PET_TAUNT_INTERVAL: f32 = 5.0;
pub const PET_ATTACK_INTERVAL: f32 = 1.5;
/// Distance at which a non-totem pet resumes following its owner.
pub const PET_FOLLOW_DISTANCE: f32 = 40.0;

#[derive(Component, Debug, Clone)]
pub struct Pet {
    pub owner: Entity,
    pub kind: PetType,
    pub position: Vec2,
    pub taunt_cooldown: f32,
    pub attack_cooldown: f32,
}

impl Pet {
    pub fn new(owner: Entity, kind: PetType, position: Vec2) -> Self {
        Self {
            owner,
            kind,
            position,
            taunt_cooldown: 0.0,
            attack_cooldown: 0.0,
        }
    }
}
