//! Boss ability/AoE cooldown tracks (§4.5 "Bosses additionally run two
//! independent cooldown tracks", §8 scenario S5).

use crate::catalog::abilities::AbilityId;
use crate::catalog::enemies::{aoe_recurrence, initial_aoe_cooldown_range, staggered_ability_cooldowns, BossId};

#[derive(Debug, Clone)]
pub struct BossAbilityTrack {
    pub abilities: Vec<AbilityId>,
    pub cooldowns: Vec<f32>,
}

impl BossAbilityTrack {
    pub fn new(boss: BossId, floor: u32) -> Self {
        let abilities = boss.abilities_for_floor(floor);
        let cooldowns = staggered_ability_cooldowns(abilities.len());
        Self { abilities, cooldowns }
    }

    /// Advance all cooldowns by `delta_time`; returns the index of the
    /// first ability ready to fire, if any, and resets its cooldown to its
    /// base recurrence (fixed at 8s here — individual per-ability
    /// recurrence beyond the initial stagger is not spec'd further).
    pub fn advance_and_pick_ready(&mut self, delta_time: f32) -> Option<usize> {
        for cd in &mut self.cooldowns {
            *cd -= delta_time;
        }
        let ready = self.cooldowns.iter().position(|&cd| cd <= 0.0)?;
        self.cooldowns[ready] = 8.0;
        Some(ready)
    }
}

#[derive(Debug, Clone)]
pub struct BossAoeTrack {
    pub cooldown: f32,
    pub floor: u32,
}

impl BossAoeTrack {
    pub fn new(initial_roll_6_to_8: f32, floor: u32) -> Self {
        let (lo, hi) = initial_aoe_cooldown_range();
        Self {
            cooldown: initial_roll_6_to_8.clamp(lo, hi),
            floor,
        }
    }

    pub fn advance(&mut self, delta_time: f32) -> bool {
        self.cooldown -= delta_time;
        if self.cooldown <= 0.0 {
            self.cooldown = aoe_recurrence(self.floor);
            true
        } else {
            false
        }
    }
}

/// Elite telegraphed void zones share a flat 6s cooldown (§4.5 "Enemy
/// AI ... Elite telegraphed void zones (6s cooldown)").
pub const ELITE_VOID_ZONE_COOLDOWN: f32 = 6.0;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ability_stagger_matches_scenario_s5() {
        let track = BossAbilityTrack::new(BossId::CryptOverlord, 5);
        assert_eq!(track.cooldowns, vec![4.0, 7.0]);
    }

    #[test]
    fn no_ability_fires_within_first_four_seconds() {
        let mut track = BossAbilityTrack::new(BossId::CryptOverlord, 5);
        assert_eq!(track.advance_and_pick_ready(3.9), None);
    }

    #[test]
    fn aoe_cooldown_clamped_to_six_to_eight_range() {
        let track = BossAoeTrack::new(100.0, 5);
        assert!(track.cooldown <= 8.0);
    }
}
