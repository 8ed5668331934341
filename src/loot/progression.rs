//! XP award and level-up application (§4.8).

use crate::catalog::items::{item_power, ItemDefinition};
use crate::catalog::leveling::{can_upgrade_ability_rank, level_up_stat_gain, xp_to_next_level, MAX_LEVEL};
use crate::combat::resolver::restore_mana;
use crate::entities::player::{Player, MAX_BACKPACK};

/// Award XP and apply any level-ups it triggers, returning the number of
/// levels gained. Each level-up is a full Meditation-style mana refill
/// (`restore_mana`), not a buff insertion.
pub fn award_xp(player: &mut Player, xp: u32) -> u32 {
    player.xp += xp;
    let mut levels_gained = 0;
    while player.level < MAX_LEVEL && player.xp >= xp_to_next_level(player.level) {
        player.xp -= xp_to_next_level(player.level);
        player.level += 1;
        levels_gained += 1;
        let gain = level_up_stat_gain(player.level);
        player.base_stats.max_health += gain * 4;
        player.base_stats.health += gain * 4;
        player.effective_stats.max_health += gain * 4;
        player.effective_stats.health += gain * 4;
        restore_mana(player.effective_stats.max_mana, &mut player.effective_stats);
    }
    levels_gained
}

/// XP for killing an enemy (§4.8): scales with floor depth and the kill
/// modifiers rares/elites/bosses already carry.
pub fn xp_value_for_kill(floor: u32, is_boss: bool, is_rare: bool, is_elite: bool) -> u32 {
    let mut value = 10 + floor * 4;
    if is_elite {
        value = value * 3 / 2;
    }
    if is_rare {
        value *= 2;
    }
    if is_boss {
        value *= 10;
    }
    value
}

/// §4.8 auto-equip: an item with higher `itemPower` than what's currently
/// equipped in its slot is equipped immediately; otherwise it goes to the
/// backpack if there's room. Returns whether the item was collected at all
/// (a full backpack with no upgrade drops it on the floor).
pub fn auto_equip_or_stash(player: &mut Player, item: ItemDefinition) -> bool {
    let slot = item.slot;
    let idx = slot as usize;
    let incoming_power = item_power(&item.base_stats);
    let current_power = player.equipment[idx].as_ref().map(|equipped| item_power(&equipped.base_stats));

    let is_upgrade = match current_power {
        Some(current) => incoming_power > current,
        None => true,
    };

    if is_upgrade {
        let _ = player.equip(slot, item);
        return true;
    }

    if player.backpack.len() < MAX_BACKPACK {
        player.backpack.push(item);
        return true;
    }

    false
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrainResult {
    /// Rank upgraded.
    Upgraded,
    /// §4.8 "Ability gating": floor too low, converted to a fallback
    /// reward instead of the rank.
    FallbackReward { gold: u32 },
}

/// §4.8 "Ability gating": rank N can be upgraded only on floor ≥ N+1;
/// otherwise the purchase converts to a fallback reward (gold/tokens).
pub fn train_ability_rank(current_rank: u8, floor: u32) -> TrainResult {
    if can_upgrade_ability_rank(current_rank, floor) {
        TrainResult::Upgraded
    } else {
        TrainResult::FallbackReward { gold: 25 * current_rank as u32 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::classes::ClassId;
    use glam::Vec2;

    #[test]
    fn xp_overflow_chains_multiple_level_ups() {
        let mut player = Player::new("t".into(), ClassId::Warrior, Vec2::ZERO);
        let needed = xp_to_next_level(1) + xp_to_next_level(2) + 10;
        let gained = award_xp(&mut player, needed);
        assert_eq!(gained, 2);
        assert_eq!(player.level, 3);
    }

    #[test]
    fn training_below_gate_floor_falls_back_to_gold() {
        assert_eq!(train_ability_rank(3, 2), TrainResult::FallbackReward { gold: 75 });
        assert_eq!(train_ability_rank(3, 4), TrainResult::Upgraded);
    }
}
