//! Named, target-state-driven combo behaviors (§4.4 "Combos").
//!
//! Each function answers "does this combo apply" and, where relevant, the
//! multiplier/side-effect to use — the tick scheduler's ability-cast system
//! queries these against the live buff snapshot before calling into
//! `resolver`.

use crate::catalog::abilities::IconId;

pub const PYROBLAST_COMBO_DAMAGE_BONUS: f32 = 1.5;
pub const JUDGMENT_COMBO_DAMAGE_BONUS: f32 = 1.5;
pub const JUDGMENT_COMBO_SELF_HEAL_PERCENT: f32 = 0.30;
pub const STEALTH_SINISTER_STRIKE_MULTIPLIER: f32 = 2.0;
pub const HELLFIRE_SECONDARY_PERCENT: f32 = 0.5;
pub const BLAZE_STUN_SPREAD_DURATION: f32 = 2.0;
pub const BLADE_FLURRY_CLEAVE_PERCENT: f32 = 1.0;
pub const BLADE_FLURRY_ATTACK_SPEED_MULTIPLIER: f32 = 0.5;

/// Fireball on a target with an unexpired `mage_pyroblast` stun: +50%
/// damage.
pub fn fireball_pyroblast_combo(target_has_pyroblast_stun: bool) -> f32 {
    if target_has_pyroblast_stun {
        PYROBLAST_COMBO_DAMAGE_BONUS
    } else {
        1.0
    }
}

/// Crusader Strike on `paladin_judgment` stun: +50% damage, 30% self-heal
/// of the damage dealt.
pub fn crusader_strike_judgment_combo(target_has_judgment_stun: bool) -> (f32, f32) {
    if target_has_judgment_stun {
        (JUDGMENT_COMBO_DAMAGE_BONUS, JUDGMENT_COMBO_SELF_HEAL_PERCENT)
    } else {
        (1.0, 0.0)
    }
}

/// Sinister Strike from `rogue_stealth`: x2 damage, stealth consumed by
/// the caller after this returns true.
pub fn sinister_strike_from_stealth(caster_is_stealthed: bool) -> f32 {
    if caster_is_stealthed {
        STEALTH_SINISTER_STRIKE_MULTIPLIER
    } else {
        1.0
    }
}

/// Blaze on a Pyroblast-stunned primary target: stun all other room
/// enemies for 2s.
pub fn blaze_pyroblast_spreads_stun(primary_has_pyroblast_stun: bool) -> Option<f32> {
    primary_has_pyroblast_stun.then_some(BLAZE_STUN_SPREAD_DURATION)
}

/// Has the icon that gates a combo. Thin wrapper kept so call sites read
/// by combo name rather than raw icon comparisons.
pub fn has_pyroblast_stun(icons: &[IconId]) -> bool {
    icons.contains(&IconId::MagePyroblastStun)
}

pub fn has_judgment_stun(icons: &[IconId]) -> bool {
    icons.contains(&IconId::PaladinJudgmentStun)
}

pub fn has_hellfire_burn(icons: &[IconId]) -> bool {
    icons.contains(&IconId::WarlockHellfireBurn)
}

pub fn has_stealth(icons: &[IconId]) -> bool {
    icons.contains(&IconId::RogueStealth) || icons.contains(&IconId::RogueVanish)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pyroblast_combo_only_applies_with_stun_present() {
        assert_eq!(fireball_pyroblast_combo(true), 1.5);
        assert_eq!(fireball_pyroblast_combo(false), 1.0);
    }

    #[test]
    fn judgment_combo_grants_damage_and_self_heal() {
        let (dmg_mult, heal_pct) = crusader_strike_judgment_combo(true);
        assert_eq!(dmg_mult, 1.5);
        assert_eq!(heal_pct, 0.30);
    }

    #[test]
    fn stealth_doubles_sinister_strike() {
        assert_eq!(sinister_strike_from_stealth(true), 2.0);
    }
}
