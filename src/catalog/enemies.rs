//! Enemy and boss tables (§4.3, §4.5).
//!
//! Plays the role the reference engine's per-class `base_stats()` plays for
//! players, but for monsters, plus the boss-specific ability/AoE schedules
//! consumed by the AI module.

use serde::{Deserialize, Serialize};

use super::abilities::AbilityId;
use crate::entities::ground_effect::GroundEffectType;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnemyRole {
    Melee,
    Ranged,
    Caster,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnemyId {
    SkeletonWarrior,
    SkeletonArcher,
    BoneMage,
    CryptGhoul,
    EmberImp,
    FrostFang,
    BogLurker,
    ShadowStalker,
    TreasureGoblin,
    RareCryptLord,
    RareInfernoBrute,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BossId {
    CryptOverlord,
    Infernarch,
    RimeColossus,
    BogMother,
    ShadowWeaver,
}

#[derive(Debug, Clone, Copy)]
pub struct EnemyStats {
    pub max_health: i32,
    pub armor: i32,
    pub resist: i32,
    pub attack_power: i32,
    pub spell_power: i32,
}

#[derive(Debug, Clone, Copy)]
pub struct EnemyTemplate {
    pub role: EnemyRole,
    pub stats: EnemyStats,
    pub melee_range: f32,
    pub attack_cooldown: f32,
}

impl EnemyId {
    pub fn role(&self) -> EnemyRole {
        self.template().role
    }

    /// Base stats at floor 1, party size 1 (§4.3; scaled by
    /// `crate::catalog::leveling::scale_enemy_stats` for actual floor/party).
    pub fn template(&self) -> EnemyTemplate {
        use EnemyRole::*;
        match self {
            EnemyId::SkeletonWarrior => EnemyTemplate {
                role: Melee,
                stats: EnemyStats {
                    max_health: 60,
                    armor: 8,
                    resist: 0,
                    attack_power: 8,
                    spell_power: 0,
                },
                melee_range: 2.5,
                attack_cooldown: 1.8,
            },
            EnemyId::SkeletonArcher => EnemyTemplate {
                role: Ranged,
                stats: EnemyStats {
                    max_health: 45,
                    armor: 4,
                    resist: 2,
                    attack_power: 10,
                    spell_power: 0,
                },
                melee_range: 2.5,
                attack_cooldown: 2.0,
            },
            EnemyId::BoneMage => EnemyTemplate {
                role: Caster,
                stats: EnemyStats {
                    max_health: 40,
                    armor: 2,
                    resist: 6,
                    attack_power: 0,
                    spell_power: 14,
                },
                melee_range: 2.5,
                attack_cooldown: 2.5,
            },
            EnemyId::CryptGhoul => EnemyTemplate {
                role: Melee,
                stats: EnemyStats {
                    max_health: 75,
                    armor: 6,
                    resist: 0,
                    attack_power: 11,
                    spell_power: 0,
                },
                melee_range: 2.5,
                attack_cooldown: 1.5,
            },
            EnemyId::EmberImp => EnemyTemplate {
                role: Caster,
                stats: EnemyStats {
                    max_health: 35,
                    armor: 0,
                    resist: 8,
                    attack_power: 0,
                    spell_power: 12,
                },
                melee_range: 2.5,
                attack_cooldown: 2.2,
            },
            EnemyId::FrostFang => EnemyTemplate {
                role: Melee,
                stats: EnemyStats {
                    max_health: 65,
                    armor: 5,
                    resist: 4,
                    attack_power: 10,
                    spell_power: 0,
                },
                melee_range: 2.5,
                attack_cooldown: 1.7,
            },
            EnemyId::BogLurker => EnemyTemplate {
                role: Melee,
                stats: EnemyStats {
                    max_health: 90,
                    armor: 10,
                    resist: 2,
                    attack_power: 9,
                    spell_power: 0,
                },
                melee_range: 2.5,
                attack_cooldown: 2.0,
            },
            EnemyId::ShadowStalker => EnemyTemplate {
                role: Melee,
                stats: EnemyStats {
                    max_health: 55,
                    armor: 4,
                    resist: 6,
                    attack_power: 13,
                    spell_power: 0,
                },
                melee_range: 2.5,
                attack_cooldown: 1.3,
            },
            EnemyId::TreasureGoblin => EnemyTemplate {
                role: Ranged,
                stats: EnemyStats {
                    max_health: 30,
                    armor: 0,
                    resist: 0,
                    attack_power: 2,
                    spell_power: 0,
                },
                melee_range: 2.5,
                attack_cooldown: 3.0,
            },
            EnemyId::RareCryptLord => EnemyTemplate {
                role: Melee,
                stats: EnemyStats {
                    max_health: 220,
                    armor: 16,
                    resist: 6,
                    attack_power: 18,
                    spell_power: 0,
                },
                melee_range: 2.5,
                attack_cooldown: 1.6,
            },
            EnemyId::RareInfernoBrute => EnemyTemplate {
                role: Melee,
                stats: EnemyStats {
                    max_health: 260,
                    armor: 12,
                    resist: 10,
                    attack_power: 20,
                    spell_power: 0,
                },
                melee_range: 2.5,
                attack_cooldown: 1.8,
            },
        }
    }

    pub fn is_rare(&self) -> bool {
        matches!(self, EnemyId::RareCryptLord | EnemyId::RareInfernoBrute)
    }

    /// Weighted pool for normal-room spawns by theme (§4.2 step 6).
    pub fn pool_for_theme(theme: super::themes::DungeonTheme) -> &'static [EnemyId] {
        use super::themes::DungeonTheme::*;
        match theme {
            Crypt => &[EnemyId::SkeletonWarrior, EnemyId::SkeletonArcher, EnemyId::BoneMage],
            Inferno => &[EnemyId::EmberImp, EnemyId::CryptGhoul],
            Frozen => &[EnemyId::FrostFang, EnemyId::SkeletonArcher],
            Swamp => &[EnemyId::BogLurker, EnemyId::CryptGhoul],
            Shadow => &[EnemyId::ShadowStalker, EnemyId::BoneMage],
            Treasure => &[EnemyId::TreasureGoblin],
        }
    }

    pub fn rare_variant_for_theme(theme: super::themes::DungeonTheme) -> EnemyId {
        use super::themes::DungeonTheme::*;
        match theme {
            Crypt | Shadow => EnemyId::RareCryptLord,
            _ => EnemyId::RareInfernoBrute,
        }
    }
}

impl BossId {
    pub fn for_theme(theme: super::themes::DungeonTheme) -> BossId {
        use super::themes::DungeonTheme::*;
        match theme {
            Crypt => BossId::CryptOverlord,
            Inferno => BossId::Infernarch,
            Frozen => BossId::RimeColossus,
            Swamp => BossId::BogMother,
            Shadow | Treasure => BossId::ShadowWeaver,
        }
    }

    pub fn base_stats(&self) -> EnemyStats {
        match self {
            BossId::CryptOverlord => EnemyStats {
                max_health: 1400,
                armor: 25,
                resist: 15,
                attack_power: 26,
                spell_power: 10,
            },
            BossId::Infernarch => EnemyStats {
                max_health: 1600,
                armor: 18,
                resist: 20,
                attack_power: 22,
                spell_power: 24,
            },
            BossId::RimeColossus => EnemyStats {
                max_health: 1800,
                armor: 30,
                resist: 10,
                attack_power: 30,
                spell_power: 0,
            },
            BossId::BogMother => EnemyStats {
                max_health: 1500,
                armor: 20,
                resist: 18,
                attack_power: 18,
                spell_power: 22,
            },
            BossId::ShadowWeaver => EnemyStats {
                max_health: 1300,
                armor: 15,
                resist: 25,
                attack_power: 16,
                spell_power: 26,
            },
        }
    }

    /// `getBossAbilitiesForFloor` (§4.5): the ability rotation available to
    /// this boss on the given floor, in cooldown-stagger order.
    pub fn abilities_for_floor(&self, floor: u32) -> Vec<AbilityId> {
        let mut abilities = match self {
            BossId::CryptOverlord => vec![AbilityId::WarriorMortalStrike, AbilityId::WarriorRend],
            BossId::Infernarch => vec![AbilityId::MageFireball, AbilityId::WarlockHellfire],
            BossId::RimeColossus => vec![AbilityId::MageFrostNova, AbilityId::WarriorHeroicStrike],
            BossId::BogMother => vec![AbilityId::WarlockCorruption, AbilityId::WarlockDrain],
            BossId::ShadowWeaver => vec![AbilityId::WarlockFear, AbilityId::WarlockShadowbolt],
        };
        if floor >= 6 {
            abilities.push(AbilityId::WarriorBladeFlurry);
        }
        abilities
    }

    pub fn aoe_kind(&self) -> GroundEffectType {
        match self {
            BossId::CryptOverlord => GroundEffectType::ExpandingCircle,
            BossId::Infernarch => GroundEffectType::FirePool,
            BossId::RimeColossus => GroundEffectType::MovingWave,
            BossId::BogMother => GroundEffectType::VoidZone,
            BossId::ShadowWeaver => GroundEffectType::RotatingBeam,
        }
    }
}

/// Staggered initial cooldowns for a boss's ability track (§4.5, S5): 4s,
/// 7s, 10s, ... for successive abilities.
pub fn staggered_ability_cooldowns(count: usize) -> Vec<f32> {
    (0..count).map(|i| 4.0 + i as f32 * 3.0).collect()
}

/// Initial AoE cooldown range and recurrence (§4.5).
pub fn initial_aoe_cooldown_range() -> (f32, f32) {
    (6.0, 8.0)
}

pub fn aoe_recurrence(floor: u32) -> f32 {
    (10.0 - floor as f32 * 0.5).max(4.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stagger_matches_scenario_s5() {
        let cds = staggered_ability_cooldowns(3);
        assert_eq!(cds, vec![4.0, 7.0, 10.0]);
    }

    #[test]
    fn aoe_recurrence_floors_at_four_seconds() {
        assert_eq!(aoe_recurrence(20), 4.0);
        assert!(aoe_recurrence(5) > 4.0);
    }

    #[test]
    fn skeleton_warrior_matches_scenario_s1() {
        let t = EnemyId::SkeletonWarrior.template();
        assert_eq!(t.stats.max_health, 60);
        assert_eq!(t.stats.attack_power, 8);
    }
}
