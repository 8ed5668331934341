//! Line-of-sight and movement helpers for enemy AI (§4.5 step 5).

use glam::Vec2;

use crate::dungeon::room::Rect;

const LOS_SAMPLE_STEP: f32 = 20.0;

/// Line-of-sight is trivially clear at melee range or when the target is
/// inside the enemy's current room; otherwise the path is segment-sampled
/// against walkable space at 20-unit steps.
pub fn has_line_of_sight(from: Vec2, to: Vec2, melee_range: f32, room: &Rect, is_walkable: impl Fn(Vec2) -> bool) -> bool {
    if from.distance(to) <= melee_range || room.contains(to) {
        return true;
    }
    let total = from.distance(to);
    let steps = (total / LOS_SAMPLE_STEP).ceil().max(1.0) as usize;
    for i in 0..=steps {
        let t = i as f32 / steps as f32;
        let point = from.lerp(to, t);
        if !is_walkable(point) {
            return false;
        }
    }
    true
}

/// Move `position` toward `target` by `speed * delta_time`, clamped not to
/// overshoot.
pub fn step_toward(position: Vec2, target: Vec2, speed: f32, delta_time: f32) -> Vec2 {
    let to_target = target - position;
    let max_step = speed * delta_time;
    if to_target.length() <= max_step {
        target
    } else {
        position + to_target.normalize_or_zero() * max_step
    }
}

/// Move `position` away from `target` (kiting) by `speed * delta_time`.
pub fn step_away(position: Vec2, target: Vec2, speed: f32, delta_time: f32) -> Vec2 {
    let away = (position - target).normalize_or_zero();
    position + away * speed * delta_time
}

/// Ranged/caster kite trigger distance (§4.5 step 6: "kite away if target
/// is within 120 units").
pub const KITE_TRIGGER_DISTANCE: f32 = 120.0;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn los_clear_at_melee_range_regardless_of_walkability() {
        let room = Rect { x: 0.0, y: 0.0, w: 100.0, h: 100.0 };
        assert!(has_line_of_sight(Vec2::ZERO, Vec2::new(1.0, 0.0), 2.5, &room, |_| false));
    }

    #[test]
    fn step_toward_does_not_overshoot() {
        let pos = step_toward(Vec2::ZERO, Vec2::new(10.0, 0.0), 5.0, 10.0);
        assert_eq!(pos, Vec2::new(10.0, 0.0));
    }
}
