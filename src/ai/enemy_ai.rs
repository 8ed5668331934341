//! Enemy AI (§4.5): per-enemy-per-tick decision steps. Each step is a small
//! pure function; the tick scheduler wires them against live ECS state,
//! mirroring the reference engine's `acquire_targets`/`decide_abilities`
//! split (`combat_ai.rs`) of target acquisition from action execution.

use glam::Vec2;

use super::pathing::{has_line_of_sight, step_away, step_toward, KITE_TRIGGER_DISTANCE};
use crate::catalog::enemies::EnemyRole;
use crate::dungeon::room::Rect;

pub const ENEMY_AGGRO_DELAY: f32 = 1.0;
pub const EX_PATROLLER_AGGRO_DELAY: f32 = 0.3;
pub const CHARGE_TRIGGER_MIN: f32 = 200.0;
pub const CHARGE_TRIGGER_MAX: f32 = 400.0;
pub const CHARGE_CHANCE_PER_TICK: f32 = 0.02;
pub const CHARGE_SPEED: f32 = 600.0;
pub const CHARGE_DAMAGE_BONUS: i32 = 15;
pub const CHARGE_TIMEOUT: f32 = 3.0;
pub const LEASH_DISTANCE: f32 = 800.0;
pub const LEASH_RESET_DELAY: f32 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggroResult {
    NoTarget,
    Acquired { staggered_delay: f32 },
    Retained,
}

/// §4.5 step 3-4: pick the nearest non-stealthed alive candidate (or a
/// taunting pet, handled by the caller before calling this), and — on
/// first acquisition only — record a staggered aggro delay.
pub fn acquire_target(
    had_target_before: bool,
    candidates: &[(Vec2, f32 /* distance */)],
    stagger_roll_0_to_500ms: f32,
) -> AggroResult {
    if candidates.is_empty() {
        return AggroResult::NoTarget;
    }
    if had_target_before {
        AggroResult::Retained
    } else {
        AggroResult::Acquired {
            staggered_delay: stagger_roll_0_to_500ms.clamp(0.0, 0.5),
        }
    }
}

pub fn aggro_delay_for(was_patrolling: bool) -> f32 {
    if was_patrolling {
        EX_PATROLLER_AGGRO_DELAY
    } else {
        ENEMY_AGGRO_DELAY
    }
}

pub fn can_attack(time_since_aggro: f32, was_patrolling: bool, attack_cooldown: f32) -> bool {
    time_since_aggro >= aggro_delay_for(was_patrolling) && attack_cooldown <= 0.0
}

#[derive(Debug, Clone, Copy)]
pub struct MovementDecision {
    pub position: Vec2,
    pub started_kite: bool,
}

/// §4.5 step 6: after attacking, ranged/caster enemies kite away if the
/// target is within 120 units; melee closes distance.
pub fn post_attack_movement(role: EnemyRole, self_pos: Vec2, target_pos: Vec2, speed: f32, delta_time: f32) -> MovementDecision {
    let distance = self_pos.distance(target_pos);
    match role {
        EnemyRole::Ranged | EnemyRole::Caster if distance < KITE_TRIGGER_DISTANCE => MovementDecision {
            position: step_away(self_pos, target_pos, speed, delta_time),
            started_kite: true,
        },
        _ => MovementDecision {
            position: step_toward(self_pos, target_pos, speed, delta_time),
            started_kite: false,
        },
    }
}

pub fn in_line_of_sight(self_pos: Vec2, target_pos: Vec2, melee_range: f32, room: &Rect, is_walkable: impl Fn(Vec2) -> bool) -> bool {
    has_line_of_sight(self_pos, target_pos, melee_range, room, is_walkable)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ChargeDecision {
    None,
    Start,
    Impact,
    Abort,
}

/// §4.5 step 7: melee, non-boss enemies occasionally charge when the
/// target is out of range (200-400 units away), 2% chance per tick.
#[allow(clippy::too_many_arguments)]
pub fn decide_charge(
    role: EnemyRole,
    is_boss: bool,
    is_charging: bool,
    charge_elapsed: f32,
    target_alive: bool,
    distance_to_target: f32,
    melee_range: f32,
    chance_roll: f32,
) -> ChargeDecision {
    if is_charging {
        if !target_alive || charge_elapsed >= CHARGE_TIMEOUT {
            return ChargeDecision::Abort;
        }
        if distance_to_target <= melee_range {
            return ChargeDecision::Impact;
        }
        return ChargeDecision::None;
    }
    if role != EnemyRole::Melee || is_boss {
        return ChargeDecision::None;
    }
    if (CHARGE_TRIGGER_MIN..=CHARGE_TRIGGER_MAX).contains(&distance_to_target) && chance_roll < CHARGE_CHANCE_PER_TICK {
        ChargeDecision::Start
    } else {
        ChargeDecision::None
    }
}

/// §4.5 step 8: a non-boss enemy with no valid target, farther than
/// `LEASH_DISTANCE` from spawn, starts a leash timer; after
/// `LEASH_RESET_DELAY` it snaps to spawn, heals, and returns to its
/// original room.
pub fn should_leash(is_boss: bool, has_target: bool, distance_from_spawn: f32, leash_timer: f32) -> bool {
    !is_boss && !has_target && distance_from_spawn > LEASH_DISTANCE && leash_timer >= LEASH_RESET_DELAY
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aggro_stagger_matches_scenario_s6() {
        let result = acquire_target(false, &[(Vec2::ZERO, 10.0)], 0.3);
        assert_eq!(result, AggroResult::Acquired { staggered_delay: 0.3 });
    }

    #[test]
    fn ex_patroller_gets_shorter_aggro_delay() {
        assert_eq!(aggro_delay_for(true), 0.3);
        assert_eq!(aggro_delay_for(false), 1.0);
    }

    #[test]
    fn charge_only_considered_for_melee_non_boss_in_range() {
        let d = decide_charge(EnemyRole::Melee, false, false, 0.0, true, 300.0, 2.5, 0.01);
        assert_eq!(d, ChargeDecision::Start);
        let d2 = decide_charge(EnemyRole::Ranged, false, false, 0.0, true, 300.0, 2.5, 0.01);
        assert_eq!(d2, ChargeDecision::None);
    }

    #[test]
    fn leash_requires_distance_and_timer() {
        assert!(should_leash(false, false, 900.0, 5.0));
        assert!(!should_leash(true, false, 900.0, 5.0));
        assert!(!should_leash(false, true, 900.0, 5.0));
    }
}
