//! Dungeon theme table (§4.2 step 1).
//!
//! Generalizes the reference engine's `ArenaMap` (a flat enum of map
//! layouts with fixed visual/size constants) into themes that additionally
//! drive generator weighting and per-tick hazard behavior.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DungeonTheme {
    Crypt,
    Inferno,
    Frozen,
    Swamp,
    Shadow,
    Treasure,
}

#[derive(Debug, Clone, Copy)]
pub struct ThemeModifiers {
    /// Multiplies player movement speed; Frozen uses momentum physics on top
    /// of this (§4.7 step 2).
    pub movement_modifier: f32,
    /// Flat damage dealt by the theme's passive hazard tick.
    pub hazard_damage: i32,
    /// Scales trap damage (§4.2 step 8).
    pub trap_multiplier: f32,
}

impl DungeonTheme {
    pub fn all() -> &'static [DungeonTheme] {
        &[
            DungeonTheme::Crypt,
            DungeonTheme::Inferno,
            DungeonTheme::Frozen,
            DungeonTheme::Swamp,
            DungeonTheme::Shadow,
            DungeonTheme::Treasure,
        ]
    }

    pub fn modifiers(&self) -> ThemeModifiers {
        match self {
            DungeonTheme::Crypt => ThemeModifiers {
                movement_modifier: 1.0,
                hazard_damage: 0,
                trap_multiplier: 1.0,
            },
            DungeonTheme::Inferno => ThemeModifiers {
                movement_modifier: 1.0,
                hazard_damage: 8,
                trap_multiplier: 1.25,
            },
            DungeonTheme::Frozen => ThemeModifiers {
                movement_modifier: 0.85,
                hazard_damage: 0,
                trap_multiplier: 1.0,
            },
            DungeonTheme::Swamp => ThemeModifiers {
                movement_modifier: 0.9,
                hazard_damage: 3,
                trap_multiplier: 1.1,
            },
            DungeonTheme::Shadow => ThemeModifiers {
                movement_modifier: 1.0,
                hazard_damage: 0,
                trap_multiplier: 1.15,
            },
            DungeonTheme::Treasure => ThemeModifiers {
                movement_modifier: 1.0,
                hazard_damage: 0,
                trap_multiplier: 0.75,
            },
        }
    }

    /// Relative generation weight for `floor` — later floors favor the
    /// harsher themes. Floor 1 never rolls Treasure (reserved as a rare
    /// special floor).
    pub fn weight_for_floor(&self, floor: u32) -> f32 {
        match self {
            DungeonTheme::Crypt => 3.0,
            DungeonTheme::Inferno => 1.0 + floor as f32 * 0.15,
            DungeonTheme::Frozen => 1.0 + floor as f32 * 0.1,
            DungeonTheme::Swamp => 2.0,
            DungeonTheme::Shadow => 1.0 + floor as f32 * 0.2,
            DungeonTheme::Treasure => {
                if floor <= 1 {
                    0.0
                } else {
                    0.5
                }
            }
        }
    }
}

/// `isInferno` hazard chance (§9 open question: 8% per 5s check, literal).
pub const INFERNO_HAZARD_CHANCE: f32 = 0.08;
pub const INFERNO_HAZARD_CHECK_INTERVAL: f32 = 5.0;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn treasure_never_weighted_on_floor_one() {
        assert_eq!(DungeonTheme::Treasure.weight_for_floor(1), 0.0);
        assert!(DungeonTheme::Treasure.weight_for_floor(2) > 0.0);
    }

    #[test]
    fn all_themes_have_nonnegative_modifiers() {
        for theme in DungeonTheme::all() {
            let m = theme.modifiers();
            assert!(m.movement_modifier > 0.0);
            assert!(m.hazard_damage >= 0);
            assert!(m.trap_multiplier > 0.0);
        }
    }
}
