//! Combat resolution pipeline (§4.4, §8 properties 1/4/5/6).
//!
//! Pure functions over stat/buff snapshots, mirroring the reference
//! engine's "collect a `CombatantInfo` snapshot, then mutate" pattern
//! (`combat_ai.rs`) so the math is independently testable without a live
//! `World`. The tick scheduler (`crate::tick`) is responsible for building
//! these snapshots from ECS components and writing results back.

use crate::catalog::abilities::{scaled, AbilityId, AbilityKind, IconId};
use crate::entities::buff::StatModifiers;
use crate::entities::stats::{is_crit, lifesteal_heal, mitigate, Stats, CRIT_MULTIPLIER};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CastOutcome {
    /// A no-op precondition (on cooldown, no mana, no target, dead target):
    /// consumed-free, zero events (§7 "No-op preconditions").
    NoOp,
    Applied,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DamageEvent {
    pub damage: i32,
    pub is_crit: bool,
    pub blocked: i32,
    pub killed: bool,
}

#[derive(Debug, Clone, Copy)]
pub struct CasterSnapshot {
    pub attack_power: i32,
    pub spell_power: i32,
    pub crit: i32,
    pub lifesteal: i32,
    pub bloodlust_rank: Option<u8>,
}

/// Ability-known + cooldown + mana precondition (§4.4 step 1).
pub fn check_cast_preconditions(known: bool, cooldown_remaining: f32, mana: i32, mana_cost: f32) -> CastOutcome {
    if !known || cooldown_remaining > 0.0 || (mana as f32) < mana_cost {
        CastOutcome::NoOp
    } else {
        CastOutcome::Applied
    }
}

/// Damage-pipeline target-alive precondition (§4.4 step 2).
pub fn check_target_alive(kind: AbilityKind, target_alive: bool) -> CastOutcome {
    if matches!(kind, AbilityKind::Damage | AbilityKind::Debuff) && !target_alive {
        CastOutcome::NoOp
    } else {
        CastOutcome::Applied
    }
}

/// One hit of the damage pipeline (§4.4, §8 property 1):
/// `base = scaled(baseDamage, rank) + 0.5 * max(spellPower, attackPower)`;
/// mitigator chosen by whichever caster power dominates; crit multiplies;
/// damage applied to `target`, returning the event and updating lifesteal
/// on `caster_health`/`caster_max_health` in place.
pub fn resolve_damage_hit(
    base_damage: f32,
    rank: u8,
    caster: CasterSnapshot,
    target_armor: i32,
    target_resist: i32,
    target: &mut Stats,
    crit_roll_0_100: f32,
) -> DamageEvent {
    let power = (caster.spell_power.max(caster.attack_power)) as f32;
    let base = scaled(base_damage, rank) + 0.5 * power;
    let mitigator = if caster.spell_power >= caster.attack_power {
        target_resist
    } else {
        target_armor
    };
    let mut damage = mitigate(base, mitigator);
    let crit = is_crit(crit_roll_0_100, caster.crit);
    if crit {
        damage = (damage as f32 * CRIT_MULTIPLIER).round() as i32;
    }
    target.health = (target.health - damage).max(0);
    DamageEvent {
        damage,
        is_crit: crit,
        blocked: 0,
        killed: target.health <= 0,
    }
}

/// Lifesteal + bloodlust follow-up to a damage hit (§4.4 step "apply
/// damage, then lifesteal, then bloodlust healing").
pub fn apply_lifesteal_and_bloodlust(event: &DamageEvent, caster: CasterSnapshot, caster_stats: &mut Stats) {
    lifesteal_heal(event.damage, caster.lifesteal, caster_stats);
    if let Some(rank) = caster.bloodlust_rank {
        let healed = scaled(event.damage as f32 * 0.1, rank).round() as i32;
        caster_stats.health = (caster_stats.health + healed).min(caster_stats.max_health);
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct IncomingDamageGuards {
    pub target_stealthed: bool,
    pub target_ice_blocked: bool,
    pub target_protected_vs_physical: bool,
    pub attack_is_physical: bool,
}

/// Step 1 of the incoming-damage pipeline (§4.4, §8 properties 4/5):
/// stealth/vanish and Ice Block reject every attack; Blessing of
/// Protection rejects only physical damage.
pub fn incoming_damage_rejected(guards: IncomingDamageGuards) -> bool {
    if guards.target_stealthed || guards.target_ice_blocked {
        return true;
    }
    guards.target_protected_vs_physical && guards.attack_is_physical
}

/// Shield Wall (§4.4 step 3, §8 property 6): refunds 50% of damage back as
/// healing is NOT applied here — Shield Wall *reduces* the hit by half and
/// records the blocked amount; it does not prevent an already-lethal halved
/// hit from killing.
pub fn apply_shield_wall(event: &mut DamageEvent, target: &mut Stats, pre_mitigation_health: i32) {
    let blocked = event.damage - event.damage / 2;
    event.damage /= 2;
    event.blocked = blocked;
    // `target` already had the full hit applied by `resolve_damage_hit`;
    // refund the blocked half back onto health.
    target.health = (pre_mitigation_health - event.damage).max(0);
    event.killed = target.health <= 0;
}

/// Retaliation / Retribution Aura reflect (§4.4 steps 4-5): flat or
/// percentage reflect back onto the attacker.
pub fn reflect_damage(incoming_damage: i32, reflect_percent: i32) -> i32 {
    (incoming_damage as f32 * reflect_percent as f32 / 100.0).round() as i32
}

pub fn retribution_aura_reflect(rank: u8) -> i32 {
    scaled(8.0, rank).round() as i32
}

/// Ancestral Spirit: heal 30 and consume one stack (§4.4 step 6).
pub const ANCESTRAL_SPIRIT_HEAL: i32 = 30;

/// Stat-modifier delta application, enforcing §3 invariant 2 (armor/resist
/// never negative after modifiers).
pub fn apply_stat_modifiers(stats: &mut Stats, delta: StatModifiers) {
    stats.armor = (stats.armor + delta.armor).max(0);
    stats.resist = (stats.resist + delta.resist).max(0);
    stats.attack_power += delta.attack_power;
    stats.spell_power += delta.spell_power;
    stats.crit += delta.crit;
    stats.max_health = (stats.max_health + delta.max_health).max(1);
    stats.clamp_invariants();
}

/// Single heal resolution (to ally or self).
pub fn resolve_heal(base_heal: f32, rank: u8, spell_power: i32, target: &mut Stats) -> i32 {
    let amount = (scaled(base_heal, rank) + 0.5 * spell_power as f32).round() as i32;
    let before = target.health;
    target.health = (target.health + amount).min(target.max_health);
    target.health - before
}

/// Meditation-style instant mana restore — a buff-type ability with no
/// buff insertion (§4.4 "Meditation is instant mana restore, no buff").
pub fn restore_mana(amount: i32, target: &mut Stats) -> i32 {
    let before = target.mana;
    target.mana = (target.mana + amount).min(target.max_mana);
    target.mana - before
}

/// Whether `icon` should refresh-not-stack (always true per §8 property 3;
/// kept as a named entry point so call sites read intention-first).
pub fn buff_refreshes_in_place(_icon: IconId) -> bool {
    true
}

pub fn ability_id_definition(ability: AbilityId) -> crate::catalog::abilities::AbilityDefinition {
    ability.definition()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn caster(attack_power: i32, spell_power: i32, crit: i32) -> CasterSnapshot {
        CasterSnapshot {
            attack_power,
            spell_power,
            crit,
            lifesteal: 0,
            bloodlust_rank: None,
        }
    }

    fn dummy_stats(health: i32, armor: i32, resist: i32) -> Stats {
        Stats {
            max_health: 1000,
            health,
            max_mana: 0,
            mana: 0,
            armor,
            resist,
            attack_power: 0,
            spell_power: 0,
            crit: 0,
            speed: 0.0,
        }
    }

    #[test]
    fn scenario_s1_warrior_strike_matches_formula() {
        // AP=10, skeleton armor=8 (§S1: uses skeleton_warrior with AP 8,
        // HP 60; the attacking player's AP is 10).
        let mut target = dummy_stats(60, 8, 0);
        let event = resolve_damage_hit(12.0, 1, caster(10, 0, 0), target.armor, target.resist, &mut target, 99.0);
        let expected = crate::entities::stats::mitigate(12.0 + 0.5 * 10.0, 8);
        assert_eq!(event.damage, expected);
        assert!(!event.is_crit);
    }

    #[test]
    fn shield_wall_halves_and_can_still_kill() {
        let mut target = dummy_stats(100, 0, 0);
        let mut event = resolve_damage_hit(200.0, 1, caster(0, 0, 0), 0, 0, &mut target, 99.0);
        let pre = 100; // health before this hit, for the refund baseline
        apply_shield_wall(&mut event, &mut target, pre);
        assert_eq!(event.blocked, event.damage);
        assert!(event.damage > 0);
    }

    #[test]
    fn stealth_rejects_every_attacker_kind() {
        let guards = IncomingDamageGuards {
            target_stealthed: true,
            attack_is_physical: true,
            ..Default::default()
        };
        assert!(incoming_damage_rejected(guards));
        let guards2 = IncomingDamageGuards {
            target_stealthed: true,
            attack_is_physical: false,
            ..Default::default()
        };
        assert!(incoming_damage_rejected(guards2));
    }

    #[test]
    fn blessing_of_protection_rejects_only_physical() {
        let physical = IncomingDamageGuards {
            target_protected_vs_physical: true,
            attack_is_physical: true,
            ..Default::default()
        };
        assert!(incoming_damage_rejected(physical));
        let magical = IncomingDamageGuards {
            target_protected_vs_physical: true,
            attack_is_physical: false,
            ..Default::default()
        };
        assert!(!incoming_damage_rejected(magical));
    }
}
