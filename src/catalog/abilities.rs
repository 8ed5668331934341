//! Static ability table.
//!
//! Generalizes the reference engine's `AbilityType` + `AbilityDefinitions`
//! resource (a flattened data+function table keyed on a tagged enum, per the
//! "deep inheritance is flattened" design note) to dungeon-crawler classes.

use serde::{Deserialize, Serialize};

/// Stable logical key for a buff/debuff icon (§3 `Buff/DoT.icon`). Re-applying
/// a buff with the same icon refreshes it in place rather than stacking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IconId {
    WarriorRend,
    WarriorShieldWall,
    WarriorBattleShout,
    WarriorBladeFlurry,
    MagePyroblastStun,
    MageFrostNovaRoot,
    RogueStealth,
    RogueVanish,
    PriestPowerWordShield,
    WarlockCorruption,
    WarlockHellfireBurn,
    WarlockFear,
    WarlockSoulstone,
    PaladinJudgmentStun,
    PaladinDivineShield,
    PaladinDevotionAura,
    PaladinRetributionAura,
    PaladinBlessingOfProtection,
    HunterConcussiveSlow,
    RoomCursed,
    RoomBlessed,
    ShamanAncestralSpirit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AbilityId {
    WarriorStrike,
    WarriorCharge,
    WarriorRend,
    WarriorHeroicStrike,
    WarriorShieldWall,
    WarriorMortalStrike,
    WarriorBattleShout,
    WarriorBladeFlurry,

    MageFireball,
    MageFrostbolt,
    MageFrostNova,
    MagePyroblast,
    MageBlaze,

    RogueStab,
    RogueStealth,
    RogueVanish,
    RogueAmbush,
    RogueKick,
    RogueKidneyShot,

    PriestFlashHeal,
    PriestShield,
    PriestDispelMagic,
    PriestHolyFire,

    WarlockCorruption,
    WarlockDrain,
    WarlockHellfire,
    WarlockFear,
    WarlockShadowbolt,
    WarlockSoulstone,

    PaladinFlashOfLight,
    PaladinJudgment,
    PaladinCrusaderStrike,
    PaladinHammerOfJustice,
    PaladinCleanse,
    PaladinHolyLight,
    PaladinHolyShock,
    PaladinDivineShield,
    PaladinDevotionAura,
    PaladinRetributionAura,
    PaladinBlessingOfProtection,

    HunterAimedShot,
    HunterArcaneShot,
    HunterConcussiveShot,
    HunterDisengage,
    HunterTrap,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpellSchool {
    Physical,
    Fire,
    Frost,
    Shadow,
    Holy,
    Nature,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbilityKind {
    Damage,
    AoeDamage,
    Heal,
    Buff,
    Debuff,
    Summon,
    Utility,
}

/// Rank-scalable aura applied by an ability on hit/cast, stored as the same
/// delta values every cast (§3 invariant 5): removal must subtract exactly
/// what was applied.
#[derive(Debug, Clone, Copy)]
pub struct AppliedAura {
    pub icon: IconId,
    pub base_duration: f32,
    pub is_stun: bool,
    pub damage_per_tick: f32,
    pub tick_interval: f32,
}

#[derive(Debug, Clone, Copy)]
pub struct AbilityDefinition {
    pub name: &'static str,
    pub kind: AbilityKind,
    pub school: SpellSchool,
    pub mana_cost: f32,
    pub cooldown: f32,
    pub cast_time: f32,
    pub range: f32,
    pub base_damage: f32,
    pub base_heal: f32,
    pub applies_aura: Option<AppliedAura>,
    pub lockout_duration: f32,
}

/// `scaled(baseDamage, rank)` (§4.4): linear rank scaling, rank 1 = base.
pub fn scaled(base: f32, rank: u8) -> f32 {
    base * (1.0 + 0.25 * (rank.saturating_sub(1)) as f32)
}

impl AbilityId {
    pub fn definition(&self) -> AbilityDefinition {
        use AbilityKind::*;
        use SpellSchool::*;
        match self {
            AbilityId::WarriorStrike => AbilityDefinition {
                name: "Warrior Strike",
                kind: Damage,
                school: Physical,
                mana_cost: 0.0,
                cooldown: 6.0,
                cast_time: 0.0,
                range: 2.5,
                base_damage: 12.0,
                base_heal: 0.0,
                applies_aura: None,
                lockout_duration: 0.0,
            },
            AbilityId::WarriorCharge => AbilityDefinition {
                name: "Charge",
                kind: Utility,
                school: Physical,
                mana_cost: 0.0,
                cooldown: 15.0,
                cast_time: 0.0,
                range: 25.0,
                base_damage: 0.0,
                base_heal: 0.0,
                applies_aura: None,
                lockout_duration: 0.0,
            },
            AbilityId::WarriorRend => AbilityDefinition {
                name: "Rend",
                kind: Debuff,
                school: Physical,
                mana_cost: 0.0,
                cooldown: 9.0,
                cast_time: 0.0,
                range: 2.5,
                base_damage: 6.0,
                base_heal: 0.0,
                applies_aura: Some(AppliedAura {
                    icon: IconId::WarriorRend,
                    base_duration: 15.0,
                    is_stun: false,
                    damage_per_tick: 6.0,
                    tick_interval: 3.0,
                }),
                lockout_duration: 0.0,
            },
            AbilityId::WarriorHeroicStrike => AbilityDefinition {
                name: "Heroic Strike",
                kind: Damage,
                school: Physical,
                mana_cost: 0.0,
                cooldown: 4.5,
                cast_time: 0.0,
                range: 2.5,
                base_damage: 18.0,
                base_heal: 0.0,
                applies_aura: None,
                lockout_duration: 0.0,
            },
            AbilityId::WarriorShieldWall => AbilityDefinition {
                name: "Shield Wall",
                kind: Buff,
                school: Physical,
                mana_cost: 0.0,
                cooldown: 45.0,
                cast_time: 0.0,
                range: 0.0,
                base_damage: 0.0,
                base_heal: 0.0,
                applies_aura: Some(AppliedAura {
                    icon: IconId::WarriorShieldWall,
                    base_duration: 10.0,
                    is_stun: false,
                    damage_per_tick: 0.0,
                    tick_interval: 0.0,
                }),
                lockout_duration: 0.0,
            },
            AbilityId::WarriorMortalStrike => AbilityDefinition {
                name: "Mortal Strike",
                kind: Damage,
                school: Physical,
                mana_cost: 0.0,
                cooldown: 6.0,
                cast_time: 0.0,
                range: 2.5,
                base_damage: 22.0,
                base_heal: 0.0,
                applies_aura: None,
                lockout_duration: 0.0,
            },
            AbilityId::WarriorBattleShout => AbilityDefinition {
                name: "Battle Shout",
                kind: Buff,
                school: Physical,
                mana_cost: 0.0,
                cooldown: 20.0,
                cast_time: 0.0,
                range: 0.0,
                base_damage: 0.0,
                base_heal: 0.0,
                applies_aura: Some(AppliedAura {
                    icon: IconId::WarriorBattleShout,
                    base_duration: 120.0,
                    is_stun: false,
                    damage_per_tick: 0.0,
                    tick_interval: 0.0,
                }),
                lockout_duration: 0.0,
            },
            AbilityId::WarriorBladeFlurry => AbilityDefinition {
                name: "Blade Flurry",
                kind: Buff,
                school: Physical,
                mana_cost: 0.0,
                cooldown: 60.0,
                cast_time: 0.0,
                // Preserved as-is: far past melee range "for reliable
                // room-wide cleave" (open question, left unchanged).
                range: 300.0,
                base_damage: 0.0,
                base_heal: 0.0,
                applies_aura: Some(AppliedAura {
                    icon: IconId::WarriorBladeFlurry,
                    base_duration: 15.0,
                    is_stun: false,
                    damage_per_tick: 0.0,
                    tick_interval: 0.0,
                }),
                lockout_duration: 0.0,
            },

            AbilityId::MageFireball => AbilityDefinition {
                name: "Fireball",
                kind: Damage,
                school: Fire,
                mana_cost: 35.0,
                cooldown: 0.0,
                cast_time: 2.5,
                range: 40.0,
                base_damage: 28.0,
                base_heal: 0.0,
                applies_aura: None,
                lockout_duration: 0.0,
            },
            AbilityId::MageFrostbolt => AbilityDefinition {
                name: "Frostbolt",
                kind: Damage,
                school: Frost,
                mana_cost: 30.0,
                cooldown: 0.0,
                cast_time: 2.0,
                range: 40.0,
                base_damage: 22.0,
                base_heal: 0.0,
                applies_aura: None,
                lockout_duration: 0.0,
            },
            AbilityId::MageFrostNova => AbilityDefinition {
                name: "Frost Nova",
                kind: AoeDamage,
                school: Frost,
                mana_cost: 25.0,
                cooldown: 25.0,
                cast_time: 0.0,
                range: 10.0,
                base_damage: 8.0,
                base_heal: 0.0,
                applies_aura: Some(AppliedAura {
                    icon: IconId::MageFrostNovaRoot,
                    base_duration: 4.0,
                    is_stun: true,
                    damage_per_tick: 0.0,
                    tick_interval: 0.0,
                }),
                lockout_duration: 0.0,
            },
            AbilityId::MagePyroblast => AbilityDefinition {
                name: "Pyroblast",
                kind: Damage,
                school: Fire,
                mana_cost: 45.0,
                cooldown: 20.0,
                cast_time: 3.0,
                range: 40.0,
                base_damage: 40.0,
                base_heal: 0.0,
                applies_aura: Some(AppliedAura {
                    icon: IconId::MagePyroblastStun,
                    base_duration: 2.0,
                    is_stun: true,
                    damage_per_tick: 0.0,
                    tick_interval: 0.0,
                }),
                lockout_duration: 0.0,
            },
            AbilityId::MageBlaze => AbilityDefinition {
                name: "Blaze",
                kind: Damage,
                school: Fire,
                mana_cost: 20.0,
                cooldown: 8.0,
                cast_time: 1.5,
                range: 40.0,
                base_damage: 18.0,
                base_heal: 0.0,
                applies_aura: None,
                lockout_duration: 0.0,
            },

            AbilityId::RogueStab => AbilityDefinition {
                name: "Sinister Strike",
                kind: Damage,
                school: Physical,
                mana_cost: 0.0,
                cooldown: 3.0,
                cast_time: 0.0,
                range: 2.5,
                base_damage: 16.0,
                base_heal: 0.0,
                applies_aura: None,
                lockout_duration: 0.0,
            },
            AbilityId::RogueStealth => AbilityDefinition {
                name: "Stealth",
                kind: Buff,
                school: Physical,
                mana_cost: 0.0,
                cooldown: 10.0,
                cast_time: 0.0,
                range: 0.0,
                base_damage: 0.0,
                base_heal: 0.0,
                applies_aura: Some(AppliedAura {
                    icon: IconId::RogueStealth,
                    base_duration: 3600.0,
                    is_stun: false,
                    damage_per_tick: 0.0,
                    tick_interval: 0.0,
                }),
                lockout_duration: 0.0,
            },
            AbilityId::RogueVanish => AbilityDefinition {
                name: "Vanish",
                kind: Buff,
                school: Physical,
                mana_cost: 0.0,
                cooldown: 120.0,
                cast_time: 0.0,
                range: 0.0,
                base_damage: 0.0,
                base_heal: 0.0,
                applies_aura: Some(AppliedAura {
                    icon: IconId::RogueVanish,
                    base_duration: 3.0,
                    is_stun: false,
                    damage_per_tick: 0.0,
                    tick_interval: 0.0,
                }),
                lockout_duration: 0.0,
            },
            AbilityId::RogueAmbush => AbilityDefinition {
                name: "Ambush",
                kind: Damage,
                school: Physical,
                mana_cost: 0.0,
                cooldown: 10.0,
                cast_time: 0.0,
                range: 2.5,
                base_damage: 30.0,
                base_heal: 0.0,
                applies_aura: None,
                lockout_duration: 0.0,
            },
            AbilityId::RogueKick => AbilityDefinition {
                name: "Kick",
                kind: Utility,
                school: Physical,
                mana_cost: 0.0,
                cooldown: 10.0,
                cast_time: 0.0,
                range: 2.5,
                base_damage: 0.0,
                base_heal: 0.0,
                applies_aura: None,
                lockout_duration: 3.0,
            },
            AbilityId::RogueKidneyShot => AbilityDefinition {
                name: "Kidney Shot",
                kind: Debuff,
                school: Physical,
                mana_cost: 0.0,
                cooldown: 20.0,
                cast_time: 0.0,
                range: 2.5,
                base_damage: 0.0,
                base_heal: 0.0,
                applies_aura: Some(AppliedAura {
                    icon: IconId::WarriorRend, // reuse stun icon slot family
                    base_duration: 4.0,
                    is_stun: true,
                    damage_per_tick: 0.0,
                    tick_interval: 0.0,
                }),
                lockout_duration: 0.0,
            },

            AbilityId::PriestFlashHeal => AbilityDefinition {
                name: "Flash Heal",
                kind: Heal,
                school: Holy,
                mana_cost: 30.0,
                cooldown: 0.0,
                cast_time: 1.5,
                range: 40.0,
                base_damage: 0.0,
                base_heal: 30.0,
                applies_aura: None,
                lockout_duration: 0.0,
            },
            AbilityId::PriestShield => AbilityDefinition {
                name: "Power Word: Shield",
                kind: Buff,
                school: Holy,
                mana_cost: 25.0,
                cooldown: 4.0,
                cast_time: 0.0,
                range: 40.0,
                base_damage: 0.0,
                base_heal: 0.0,
                applies_aura: Some(AppliedAura {
                    icon: IconId::PriestPowerWordShield,
                    base_duration: 15.0,
                    is_stun: false,
                    damage_per_tick: 0.0,
                    tick_interval: 0.0,
                }),
                lockout_duration: 0.0,
            },
            AbilityId::PriestDispelMagic => AbilityDefinition {
                name: "Dispel Magic",
                kind: Utility,
                school: Holy,
                mana_cost: 20.0,
                cooldown: 5.0,
                cast_time: 0.0,
                range: 40.0,
                base_damage: 0.0,
                base_heal: 0.0,
                applies_aura: None,
                lockout_duration: 0.0,
            },
            AbilityId::PriestHolyFire => AbilityDefinition {
                name: "Holy Fire",
                kind: Damage,
                school: Holy,
                mana_cost: 28.0,
                cooldown: 10.0,
                cast_time: 2.0,
                range: 40.0,
                base_damage: 20.0,
                base_heal: 0.0,
                applies_aura: None,
                lockout_duration: 0.0,
            },

            AbilityId::WarlockCorruption => AbilityDefinition {
                name: "Corruption",
                kind: Debuff,
                school: Shadow,
                mana_cost: 20.0,
                cooldown: 0.0,
                cast_time: 0.0,
                range: 40.0,
                base_damage: 0.0,
                base_heal: 0.0,
                applies_aura: Some(AppliedAura {
                    icon: IconId::WarlockCorruption,
                    base_duration: 18.0,
                    is_stun: false,
                    damage_per_tick: 10.0,
                    tick_interval: 3.0,
                }),
                lockout_duration: 0.0,
            },
            AbilityId::WarlockDrain => AbilityDefinition {
                name: "Drain Life",
                kind: Damage,
                school: Shadow,
                mana_cost: 25.0,
                cooldown: 0.0,
                cast_time: 0.0,
                range: 30.0,
                base_damage: 14.0,
                base_heal: 0.0,
                applies_aura: None,
                lockout_duration: 0.0,
            },
            AbilityId::WarlockHellfire => AbilityDefinition {
                name: "Hellfire",
                kind: AoeDamage,
                school: Fire,
                mana_cost: 30.0,
                cooldown: 15.0,
                cast_time: 0.0,
                range: 30.0,
                base_damage: 16.0,
                base_heal: 0.0,
                applies_aura: Some(AppliedAura {
                    icon: IconId::WarlockHellfireBurn,
                    base_duration: 12.0,
                    is_stun: false,
                    // "Hellfire attaches a 4-tick burn worth 50% of the
                    // dealt damage" — resolved per-target at apply time in
                    // the combo handler, not baked in here.
                    damage_per_tick: 0.0,
                    tick_interval: 3.0,
                }),
                lockout_duration: 0.0,
            },
            AbilityId::WarlockFear => AbilityDefinition {
                name: "Fear",
                kind: Debuff,
                school: Shadow,
                mana_cost: 20.0,
                cooldown: 30.0,
                cast_time: 1.5,
                range: 30.0,
                base_damage: 0.0,
                base_heal: 0.0,
                applies_aura: Some(AppliedAura {
                    icon: IconId::WarlockFear,
                    base_duration: 5.0,
                    is_stun: true,
                    damage_per_tick: 0.0,
                    tick_interval: 0.0,
                }),
                lockout_duration: 0.0,
            },
            AbilityId::WarlockShadowbolt => AbilityDefinition {
                name: "Shadow Bolt",
                kind: Damage,
                school: Shadow,
                mana_cost: 30.0,
                cooldown: 0.0,
                cast_time: 2.5,
                range: 40.0,
                base_damage: 26.0,
                base_heal: 0.0,
                applies_aura: None,
                lockout_duration: 0.0,
            },
            AbilityId::WarlockSoulstone => AbilityDefinition {
                name: "Soulstone",
                kind: Buff,
                school: Shadow,
                mana_cost: 40.0,
                cooldown: 600.0,
                cast_time: 1.0,
                range: 30.0,
                base_damage: 0.0,
                base_heal: 0.0,
                applies_aura: Some(AppliedAura {
                    icon: IconId::WarlockSoulstone,
                    base_duration: 1800.0,
                    is_stun: false,
                    damage_per_tick: 0.0,
                    tick_interval: 0.0,
                }),
                lockout_duration: 0.0,
            },

            AbilityId::PaladinFlashOfLight => AbilityDefinition {
                name: "Flash of Light",
                kind: Heal,
                school: Holy,
                mana_cost: 25.0,
                cooldown: 0.0,
                cast_time: 1.0,
                range: 40.0,
                base_damage: 0.0,
                base_heal: 24.0,
                applies_aura: None,
                lockout_duration: 0.0,
            },
            AbilityId::PaladinJudgment => AbilityDefinition {
                name: "Judgment",
                kind: Damage,
                school: Holy,
                mana_cost: 15.0,
                cooldown: 8.0,
                cast_time: 0.0,
                range: 10.0,
                base_damage: 10.0,
                base_heal: 0.0,
                applies_aura: Some(AppliedAura {
                    icon: IconId::PaladinJudgmentStun,
                    base_duration: 2.0,
                    is_stun: true,
                    damage_per_tick: 0.0,
                    tick_interval: 0.0,
                }),
                lockout_duration: 0.0,
            },
            AbilityId::PaladinCrusaderStrike => AbilityDefinition {
                name: "Crusader Strike",
                kind: Damage,
                school: Physical,
                mana_cost: 10.0,
                cooldown: 6.0,
                cast_time: 0.0,
                range: 2.5,
                base_damage: 18.0,
                base_heal: 0.0,
                applies_aura: None,
                lockout_duration: 0.0,
            },
            AbilityId::PaladinHammerOfJustice => AbilityDefinition {
                name: "Hammer of Justice",
                kind: Debuff,
                school: Holy,
                mana_cost: 15.0,
                cooldown: 60.0,
                cast_time: 0.0,
                range: 10.0,
                base_damage: 0.0,
                base_heal: 0.0,
                applies_aura: Some(AppliedAura {
                    icon: IconId::PaladinJudgmentStun,
                    base_duration: 6.0,
                    is_stun: true,
                    damage_per_tick: 0.0,
                    tick_interval: 0.0,
                }),
                lockout_duration: 0.0,
            },
            AbilityId::PaladinCleanse => AbilityDefinition {
                name: "Cleanse",
                kind: Utility,
                school: Holy,
                mana_cost: 20.0,
                cooldown: 5.0,
                cast_time: 0.0,
                range: 40.0,
                base_damage: 0.0,
                base_heal: 0.0,
                applies_aura: None,
                lockout_duration: 0.0,
            },
            AbilityId::PaladinHolyLight => AbilityDefinition {
                name: "Holy Light",
                kind: Heal,
                school: Holy,
                mana_cost: 35.0,
                cooldown: 0.0,
                cast_time: 2.5,
                range: 40.0,
                base_damage: 0.0,
                base_heal: 45.0,
                applies_aura: None,
                lockout_duration: 0.0,
            },
            AbilityId::PaladinHolyShock => AbilityDefinition {
                name: "Holy Shock",
                kind: Heal,
                school: Holy,
                mana_cost: 25.0,
                cooldown: 15.0,
                cast_time: 0.0,
                range: 20.0,
                base_damage: 16.0,
                base_heal: 20.0,
                applies_aura: None,
                lockout_duration: 0.0,
            },
            AbilityId::PaladinDivineShield => AbilityDefinition {
                name: "Divine Shield",
                kind: Buff,
                school: Holy,
                mana_cost: 0.0,
                cooldown: 300.0,
                cast_time: 0.0,
                range: 0.0,
                base_damage: 0.0,
                base_heal: 0.0,
                applies_aura: Some(AppliedAura {
                    icon: IconId::PaladinDivineShield,
                    base_duration: 8.0,
                    is_stun: false,
                    damage_per_tick: 0.0,
                    tick_interval: 0.0,
                }),
                lockout_duration: 0.0,
            },
            AbilityId::PaladinDevotionAura => AbilityDefinition {
                name: "Devotion Aura",
                kind: Buff,
                school: Holy,
                mana_cost: 10.0,
                cooldown: 30.0,
                cast_time: 0.0,
                range: 0.0,
                base_damage: 0.0,
                base_heal: 0.0,
                applies_aura: Some(AppliedAura {
                    icon: IconId::PaladinDevotionAura,
                    base_duration: 60.0,
                    is_stun: false,
                    damage_per_tick: 0.0,
                    tick_interval: 0.0,
                }),
                lockout_duration: 0.0,
            },
            AbilityId::PaladinRetributionAura => AbilityDefinition {
                name: "Retribution Aura",
                kind: Buff,
                school: Holy,
                mana_cost: 10.0,
                cooldown: 30.0,
                cast_time: 0.0,
                range: 0.0,
                base_damage: 0.0,
                base_heal: 0.0,
                applies_aura: Some(AppliedAura {
                    icon: IconId::PaladinRetributionAura,
                    base_duration: 60.0,
                    is_stun: false,
                    damage_per_tick: 0.0,
                    tick_interval: 0.0,
                }),
                lockout_duration: 0.0,
            },
            AbilityId::PaladinBlessingOfProtection => AbilityDefinition {
                name: "Blessing of Protection",
                kind: Buff,
                school: Holy,
                mana_cost: 20.0,
                cooldown: 180.0,
                cast_time: 0.0,
                range: 40.0,
                base_damage: 0.0,
                base_heal: 0.0,
                applies_aura: Some(AppliedAura {
                    icon: IconId::PaladinBlessingOfProtection,
                    base_duration: 10.0,
                    is_stun: false,
                    damage_per_tick: 0.0,
                    tick_interval: 0.0,
                }),
                lockout_duration: 0.0,
            },

            AbilityId::HunterAimedShot => AbilityDefinition {
                name: "Aimed Shot",
                kind: Damage,
                school: Physical,
                mana_cost: 0.0,
                cooldown: 6.0,
                cast_time: 2.0,
                range: 35.0,
                base_damage: 24.0,
                base_heal: 0.0,
                applies_aura: None,
                lockout_duration: 0.0,
            },
            AbilityId::HunterArcaneShot => AbilityDefinition {
                name: "Arcane Shot",
                kind: Damage,
                school: Nature,
                mana_cost: 0.0,
                cooldown: 6.0,
                cast_time: 0.0,
                range: 35.0,
                base_damage: 18.0,
                base_heal: 0.0,
                applies_aura: None,
                lockout_duration: 0.0,
            },
            AbilityId::HunterConcussiveShot => AbilityDefinition {
                name: "Concussive Shot",
                kind: Debuff,
                school: Nature,
                mana_cost: 0.0,
                cooldown: 12.0,
                cast_time: 0.0,
                range: 35.0,
                base_damage: 4.0,
                base_heal: 0.0,
                applies_aura: Some(AppliedAura {
                    icon: IconId::HunterConcussiveSlow,
                    base_duration: 4.0,
                    is_stun: false,
                    damage_per_tick: 0.0,
                    tick_interval: 0.0,
                }),
                lockout_duration: 0.0,
            },
            AbilityId::HunterDisengage => AbilityDefinition {
                name: "Disengage",
                kind: Utility,
                school: Physical,
                mana_cost: 0.0,
                cooldown: 20.0,
                cast_time: 0.0,
                range: 0.0,
                base_damage: 0.0,
                base_heal: 0.0,
                applies_aura: None,
                lockout_duration: 0.0,
            },
            AbilityId::HunterTrap => AbilityDefinition {
                name: "Freezing Trap",
                kind: Debuff,
                school: Frost,
                mana_cost: 0.0,
                cooldown: 25.0,
                cast_time: 0.0,
                range: 35.0,
                base_damage: 0.0,
                base_heal: 0.0,
                applies_aura: None,
                lockout_duration: 0.0,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scaled_is_identity_at_rank_one() {
        assert_eq!(scaled(20.0, 1), 20.0);
        assert!(scaled(20.0, 2) > 20.0);
    }

    #[test]
    fn pyroblast_and_judgment_always_apply_a_stun() {
        let pyro = AbilityId::MagePyroblast.definition().applies_aura.unwrap();
        assert!(pyro.is_stun);
        let judgment = AbilityId::PaladinJudgment.definition().applies_aura.unwrap();
        assert!(judgment.is_stun);
    }
}
