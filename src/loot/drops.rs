//! Drop tables, rarity upgrade, and kill-time bonus (§4.8).

use crate::catalog::items::{EquipmentSlot, ItemStats, Rarity, EQUIPMENT_SLOTS};
use crate::dungeon::chest::LootTier;
use crate::rng::SeededRng;

/// Kill-time bonus multiplier on drop chance and rarity-upgrade odds
/// (§4.7 step 14, §4.8).
pub fn kill_time_bonus(seconds_to_kill: f32) -> f32 {
    if seconds_to_kill < 30.0 {
        0.5
    } else if seconds_to_kill < 60.0 {
        0.25
    } else if seconds_to_kill < 90.0 {
        0.10
    } else {
        0.0
    }
}

#[derive(Debug, Clone, Copy)]
pub struct DropTableEntry {
    pub base_chance: f32,
    pub base_stats: ItemStats,
}

/// Roll one drop-table entry, applying the kill-time bonus to its drop
/// chance and rolling once for a rarity upgrade on a hit.
pub fn roll_drop(rng: &mut SeededRng, entry: DropTableEntry, kill_time_bonus_pct: f32) -> Option<(ItemStats, Rarity)> {
    let chance = entry.base_chance * (1.0 + kill_time_bonus_pct);
    if !rng.chance(chance.min(1.0)) {
        return None;
    }
    let mut rarity = Rarity::Common;
    let upgrade_chance = 0.15 * (1.0 + kill_time_bonus_pct);
    if rng.chance(upgrade_chance.min(1.0)) {
        rarity = rarity.upgrade();
    }
    Some((entry.base_stats, rarity))
}

/// Set-piece drop check: an independent roll per floor, doubled for
/// bosses/rares.
pub fn roll_set_drop(rng: &mut SeededRng, base_chance: f32, is_boss_or_rare: bool) -> bool {
    let chance = if is_boss_or_rare { base_chance * 2.0 } else { base_chance };
    rng.chance(chance.min(1.0))
}

/// Chest loot roll (§4.2 step 8): tier sets the base roll strength, floor
/// scales it further, and a flat 20% chance bumps the rarity one step.
pub fn roll_chest_loot(rng: &mut SeededRng, tier: LootTier, floor: u32) -> (ItemStats, Rarity, EquipmentSlot) {
    let slot = *rng.pick(&EQUIPMENT_SLOTS).unwrap();
    let tier_multiplier = match tier {
        LootTier::Common => 1.0,
        LootTier::Rare => 1.5,
        LootTier::Epic => 2.5,
    };
    let mut rarity = match tier {
        LootTier::Common => Rarity::Common,
        LootTier::Rare => Rarity::Rare,
        LootTier::Epic => Rarity::Epic,
    };
    if rng.chance(0.2) {
        rarity = rarity.upgrade();
    }
    let base = 6 + floor as i32 * 3;
    let scaled = (base as f32 * tier_multiplier * rarity.stat_multiplier()).round() as i32;
    let mut stats = ItemStats::default();
    match slot {
        EquipmentSlot::MainHand => stats.attack_power = scaled,
        EquipmentSlot::Trinket => stats.lifesteal = (scaled / 2).max(1),
        EquipmentSlot::Head | EquipmentSlot::Chest | EquipmentSlot::Legs => stats.max_health = scaled * 3,
        EquipmentSlot::Shoulders | EquipmentSlot::Hands | EquipmentSlot::Feet => stats.armor = scaled,
    }
    (stats, rarity, slot)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kill_time_bonus_matches_scenario_thresholds() {
        assert_eq!(kill_time_bonus(10.0), 0.5);
        assert_eq!(kill_time_bonus(45.0), 0.25);
        assert_eq!(kill_time_bonus(80.0), 0.10);
        assert_eq!(kill_time_bonus(200.0), 0.0);
    }

    #[test]
    fn set_drop_doubles_for_boss_or_rare() {
        let mut rng = SeededRng::from_seed_str("drop-test");
        // Can't assert exact outcome deterministically across rand
        // versions beyond determinism-with-self; just check it runs.
        let _ = roll_set_drop(&mut rng, 0.05, true);
    }

    #[test]
    fn epic_tier_chest_outscales_common_tier() {
        let mut rng = SeededRng::from_seed_str("chest-test");
        let (common_stats, _, _) = roll_chest_loot(&mut rng, LootTier::Common, 1);
        let (epic_stats, _, _) = roll_chest_loot(&mut rng, LootTier::Epic, 1);
        let power = |s: &ItemStats| s.attack_power + s.armor + s.max_health + s.lifesteal;
        assert!(power(&epic_stats) > power(&common_stats));
    }
}
