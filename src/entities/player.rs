//! Player entity (§3).

use bevy_ecs::prelude::*;
use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::buff::ActiveBuffs;
use super::stats::Stats;
use crate::catalog::abilities::AbilityId;
use crate::catalog::classes::ClassId;
use crate::catalog::items::{EquipmentSlot, ItemDefinition};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AbilityProgress {
    pub ability: AbilityId,
    pub rank: u8,
    pub cooldown_remaining: f32,
}

#[derive(Component, Debug, Clone)]
pub struct Player {
    pub name: String,
    pub class: ClassId,
    pub position: Vec2,
    pub base_stats: Stats,
    pub effective_stats: Stats,
    pub equipment: [Option<ItemDefinition>; 8],
    pub backpack: Vec<ItemDefinition>,
    pub abilities: Vec<AbilityProgress>,
    pub gold: u32,
    pub level: u32,
    pub xp: u32,
    pub target_id: Option<Entity>,
    pub is_alive: bool,
    pub lives_remaining: u8,
}

pub const MAX_BACKPACK: usize = 20;

impl Player {
    pub fn new(name: String, class: ClassId, position: Vec2) -> Self {
        let base = class.base_stats();
        let stats = Stats {
            max_health: base.max_health,
            health: base.max_health,
            max_mana: base.max_mana,
            mana: base.max_mana,
            armor: base.armor,
            resist: base.resist,
            attack_power: base.attack_power,
            spell_power: base.spell_power,
            crit: base.crit,
            speed: base.speed,
        };
        Self {
            name,
            class,
            position,
            base_stats: stats,
            effective_stats: stats,
            equipment: Default::default(),
            backpack: Vec::new(),
            abilities: class
                .starting_abilities()
                .iter()
                .map(|&a| AbilityProgress {
                    ability: a,
                    rank: 1,
                    cooldown_remaining: 0.0,
                })
                .collect(),
            gold: 0,
            level: 1,
            xp: 0,
            target_id: None,
            is_alive: true,
            lives_remaining: 3,
        }
    }

    /// `backpack.length ≤ 20` (§3 invariant 7). Equipping swaps the
    /// displaced item into the backpack if the slot was occupied.
    pub fn equip(&mut self, slot: EquipmentSlot, item: ItemDefinition) -> Result<(), &'static str> {
        let idx = slot as usize;
        let previous = self.equipment[idx].take();
        self.equipment[idx] = Some(item);
        if let Some(displaced) = previous {
            if self.backpack.len() >= MAX_BACKPACK {
                self.equipment[idx] = Some(displaced);
                return Err("backpack is full");
            }
            self.backpack.push(displaced);
        }
        Ok(())
    }

    pub fn kill(&mut self) {
        self.is_alive = false;
        self.target_id = None;
    }
}

#[derive(Component, Debug, Clone, Default)]
pub struct PlayerCombatState {
    pub buffs: ActiveBuffs,
    pub attack_cooldown: f32,
    pub death_time: Option<f32>,
}
