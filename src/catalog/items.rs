//! Item and equipment tables (§3 Player.equipment, §4.8).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EquipmentSlot {
    Head,
    Shoulders,
    Chest,
    Hands,
    Legs,
    Feet,
    MainHand,
    Trinket,
}

pub const EQUIPMENT_SLOTS: [EquipmentSlot; 8] = [
    EquipmentSlot::Head,
    EquipmentSlot::Shoulders,
    EquipmentSlot::Chest,
    EquipmentSlot::Hands,
    EquipmentSlot::Legs,
    EquipmentSlot::Feet,
    EquipmentSlot::MainHand,
    EquipmentSlot::Trinket,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Rarity {
    Common,
    Uncommon,
    Rare,
    Epic,
    Legendary,
}

impl Rarity {
    pub fn upgrade(&self) -> Rarity {
        match self {
            Rarity::Common => Rarity::Uncommon,
            Rarity::Uncommon => Rarity::Rare,
            Rarity::Rare => Rarity::Epic,
            Rarity::Epic | Rarity::Legendary => Rarity::Legendary,
        }
    }

    pub fn stat_multiplier(&self) -> f32 {
        match self {
            Rarity::Common => 1.0,
            Rarity::Uncommon => 1.2,
            Rarity::Rare => 1.5,
            Rarity::Epic => 2.0,
            Rarity::Legendary => 3.0,
        }
    }
}

/// Raw stat totals on an item; `item_power` (§4.8) is a weighted sum of
/// these, never authored directly.
#[derive(Debug, Clone, Copy, Default)]
pub struct ItemStats {
    pub attack_power: i32,
    pub spell_power: i32,
    pub crit: i32,
    pub haste: i32,
    pub lifesteal: i32,
    pub armor: i32,
    pub resist: i32,
    pub max_health: i32,
    pub max_mana: i32,
}

/// `itemPower` = weighted sum of stats (attack/spell ×2, crit/haste ×3,
/// lifesteal ×4, others ×1).
pub fn item_power(stats: &ItemStats) -> i32 {
    stats.attack_power * 2
        + stats.spell_power * 2
        + stats.crit * 3
        + stats.haste * 3
        + stats.lifesteal * 4
        + stats.armor
        + stats.resist
        + stats.max_health
        + stats.max_mana
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SetId {
    BoneguardPlate,
    EmberSilk,
    VoidwalkerLeather,
}

#[derive(Debug, Clone)]
pub struct ItemDefinition {
    pub name: &'static str,
    pub slot: EquipmentSlot,
    pub base_stats: ItemStats,
    pub set: Option<SetId>,
}

/// Minimum pieces of a set that must be equipped for its bonus to apply.
pub fn set_bonus_threshold(_set: SetId) -> u8 {
    3
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn item_power_weights_match_formula() {
        let stats = ItemStats {
            attack_power: 1,
            spell_power: 0,
            crit: 1,
            haste: 0,
            lifesteal: 1,
            armor: 1,
            resist: 0,
            max_health: 0,
            max_mana: 0,
        };
        assert_eq!(item_power(&stats), 2 + 3 + 4 + 1);
    }

    #[test]
    fn rarity_upgrade_caps_at_legendary() {
        assert_eq!(Rarity::Legendary.upgrade(), Rarity::Legendary);
        assert_eq!(Rarity::Common.upgrade(), Rarity::Uncommon);
    }
}
