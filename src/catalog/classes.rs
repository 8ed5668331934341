//! Static per-class tables.
//!
//! Generalizes the reference engine's `CharacterClass` enum (with its
//! per-class base stats and `preferred_range()`) from a fixed PvP roster
//! into the dungeon-crawler's playable classes.

use serde::{Deserialize, Serialize};

use super::abilities::AbilityId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClassId {
    Warrior,
    Mage,
    Rogue,
    Priest,
    Warlock,
    Paladin,
    Hunter,
}

impl ClassId {
    pub fn all() -> &'static [ClassId] {
        &[
            ClassId::Warrior,
            ClassId::Mage,
            ClassId::Rogue,
            ClassId::Priest,
            ClassId::Warlock,
            ClassId::Paladin,
            ClassId::Hunter,
        ]
    }

    pub fn from_str(s: &str) -> Option<Self> {
        Self::all()
            .iter()
            .copied()
            .find(|c| c.name().eq_ignore_ascii_case(s))
    }

    pub fn name(&self) -> &'static str {
        match self {
            ClassId::Warrior => "warrior",
            ClassId::Mage => "mage",
            ClassId::Rogue => "rogue",
            ClassId::Priest => "priest",
            ClassId::Warlock => "warlock",
            ClassId::Paladin => "paladin",
            ClassId::Hunter => "hunter",
        }
    }

    pub fn is_healer(&self) -> bool {
        matches!(self, ClassId::Priest | ClassId::Paladin)
    }

    /// Base stat block at level 1, before floor/party scaling (§4.3, §4.8).
    pub fn base_stats(&self) -> BaseStats {
        match self {
            ClassId::Warrior => BaseStats {
                max_health: 180,
                max_mana: 0,
                armor: 20,
                resist: 5,
                attack_power: 14,
                spell_power: 0,
                crit: 5,
                speed: 6.0,
            },
            ClassId::Mage => BaseStats {
                max_health: 110,
                max_mana: 200,
                armor: 5,
                resist: 10,
                attack_power: 2,
                spell_power: 18,
                crit: 8,
                speed: 5.5,
            },
            ClassId::Rogue => BaseStats {
                max_health: 140,
                max_mana: 0,
                armor: 12,
                resist: 5,
                attack_power: 16,
                spell_power: 0,
                crit: 12,
                speed: 7.0,
            },
            ClassId::Priest => BaseStats {
                max_health: 115,
                max_mana: 220,
                armor: 5,
                resist: 10,
                attack_power: 2,
                spell_power: 16,
                crit: 5,
                speed: 5.5,
            },
            ClassId::Warlock => BaseStats {
                max_health: 120,
                max_mana: 210,
                armor: 5,
                resist: 8,
                attack_power: 2,
                spell_power: 17,
                crit: 6,
                speed: 5.5,
            },
            ClassId::Paladin => BaseStats {
                max_health: 170,
                max_mana: 140,
                armor: 18,
                resist: 8,
                attack_power: 10,
                spell_power: 10,
                crit: 5,
                speed: 6.0,
            },
            ClassId::Hunter => BaseStats {
                max_health: 130,
                max_mana: 0,
                armor: 10,
                resist: 5,
                attack_power: 15,
                spell_power: 0,
                crit: 10,
                speed: 6.5,
            },
        }
    }

    /// The abilities a fresh character of this class starts with at rank 1.
    pub fn starting_abilities(&self) -> &'static [AbilityId] {
        match self {
            ClassId::Warrior => &[AbilityId::WarriorStrike, AbilityId::WarriorCharge],
            ClassId::Mage => &[AbilityId::MageFireball, AbilityId::MageFrostNova],
            ClassId::Rogue => &[AbilityId::RogueStab, AbilityId::RogueStealth],
            ClassId::Priest => &[AbilityId::PriestFlashHeal, AbilityId::PriestShield],
            ClassId::Warlock => &[
                AbilityId::WarlockCorruption,
                AbilityId::WarlockDrain,
                AbilityId::WarlockHellfire,
            ],
            ClassId::Paladin => &[AbilityId::PaladinFlashOfLight, AbilityId::PaladinJudgment],
            ClassId::Hunter => &[AbilityId::HunterAimedShot, AbilityId::HunterTrap],
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct BaseStats {
    pub max_health: i32,
    pub max_mana: i32,
    pub armor: i32,
    pub resist: i32,
    pub attack_power: i32,
    pub spell_power: i32,
    pub crit: i32,
    pub speed: f32,
}
