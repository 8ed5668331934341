//! Shared stat block and the mitigation/crit math both players and enemies
//! use (§4.3).

use serde::{Deserialize, Serialize};

/// Fixed crit damage multiplier (§4.3: "crit multiplier is a fixed
/// constant").
pub const CRIT_MULTIPLIER: f32 = 1.5;

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Stats {
    pub max_health: i32,
    pub health: i32,
    pub max_mana: i32,
    pub mana: i32,
    pub armor: i32,
    pub resist: i32,
    pub attack_power: i32,
    pub spell_power: i32,
    pub crit: i32,
    pub speed: f32,
}

impl Stats {
    pub fn clamp_invariants(&mut self) {
        self.health = self.health.clamp(0, self.max_health.max(0));
        self.mana = self.mana.clamp(0, self.max_mana.max(0));
        self.armor = self.armor.max(0);
        self.resist = self.resist.max(0);
    }

    pub fn is_alive(&self) -> bool {
        self.health > 0
    }
}

/// `reduction = 100 / (100 + value)` (§4.3, §8 property 1). Returns the
/// post-mitigation damage, rounded.
pub fn mitigate(base_damage: f32, mitigator: i32) -> i32 {
    (base_damage * 100.0 / (100.0 + mitigator.max(0) as f32)).round() as i32
}

/// `random() * 100 < crit` (§4.3). Takes the roll as a `[0,100)` value so
/// callers can supply a seeded RNG draw.
pub fn is_crit(roll_0_100: f32, crit_chance: i32) -> bool {
    roll_0_100 < crit_chance as f32
}

/// Lifesteal heal, clamped so the source never exceeds max health.
pub fn lifesteal_heal(damage_dealt: i32, lifesteal_percent: i32, current: &mut Stats) {
    if lifesteal_percent <= 0 {
        return;
    }
    let healed = (damage_dealt as f32 * lifesteal_percent as f32 / 100.0).round() as i32;
    current.health = (current.health + healed).min(current.max_health);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_armor_is_unmitigated() {
        assert_eq!(mitigate(100.0, 0), 100);
    }

    #[test]
    fn mitigation_formula_matches_property_one() {
        assert_eq!(mitigate(100.0, 100), 50);
        assert_eq!(mitigate(50.0, 400), (50.0 * 100.0 / 500.0).round() as i32);
    }

    #[test]
    fn lifesteal_clamps_to_max_health() {
        let mut s = Stats {
            max_health: 100,
            health: 95,
            ..Default::default()
        };
        lifesteal_heal(100, 50, &mut s);
        assert_eq!(s.health, 100);
    }
}
