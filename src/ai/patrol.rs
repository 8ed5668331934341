//! Patrol advance and patrol-into-room reassignment (§4.5 "Idle rooms",
//! §4.6, §8 properties 8/9).

use glam::Vec2;

use super::pathing::step_toward;
use crate::entities::enemy::PatrolDirection;

const WAYPOINT_ARRIVAL_DISTANCE: f32 = 20.0;
/// Inset used to decide a patroller is "physically inside" a room, both for
/// reassignment (§4.6) and for treating a room as the enemy's "current"
/// room for corridor-opening exclusion.
pub const PATROL_ROOM_INSET: f32 = 60.0;
const IDLE_ENEMY_RETURN_SPEED: f32 = 200.0;

/// §4.5 "Idle rooms": advance one waypoint step. Reverses direction at
/// either end of the route instead of looping.
pub fn advance_patrol(
    position: Vec2,
    waypoints: &[Vec2],
    index: usize,
    direction: PatrolDirection,
    speed: f32,
    delta_time: f32,
) -> (Vec2, usize, PatrolDirection) {
    if waypoints.is_empty() {
        return (position, index, direction);
    }
    let target = waypoints[index];
    let new_position = step_toward(position, target, speed, delta_time);
    if new_position.distance(target) <= WAYPOINT_ARRIVAL_DISTANCE {
        let (next_index, next_direction) = step_waypoint_index(index, waypoints.len(), direction);
        return (new_position, next_index, next_direction);
    }
    (new_position, index, direction)
}

fn step_waypoint_index(index: usize, len: usize, direction: PatrolDirection) -> (usize, PatrolDirection) {
    if len <= 1 {
        return (0, direction);
    }
    match direction {
        PatrolDirection::Forward => {
            if index + 1 >= len {
                (index.saturating_sub(1), PatrolDirection::Reverse)
            } else {
                (index + 1, PatrolDirection::Forward)
            }
        }
        PatrolDirection::Reverse => {
            if index == 0 {
                (1.min(len - 1), PatrolDirection::Forward)
            } else {
                (index - 1, PatrolDirection::Reverse)
            }
        }
    }
}

/// §4.6: scan other rooms for patrollers whose position lies inside the
/// current room, inset by 60px. Returns true if `patroller_position`
/// should be reassigned into `current_room`.
pub fn should_reassign_into_room(patroller_position: Vec2, current_room: &crate::dungeon::room::Rect) -> bool {
    current_room.contains_inset(patroller_position, PATROL_ROOM_INSET)
}

/// Non-patrol, non-boss enemies in idle rooms walk back to spawn at a fixed
/// speed (§4.5 "Idle rooms").
pub fn idle_return_to_spawn(position: Vec2, spawn: Vec2, delta_time: f32) -> Vec2 {
    step_toward(position, spawn, IDLE_ENEMY_RETURN_SPEED, delta_time)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dungeon::room::Rect;

    #[test]
    fn patrol_reverses_at_route_end() {
        let waypoints = vec![Vec2::ZERO, Vec2::new(10.0, 0.0)];
        let (_, idx, dir) = advance_patrol(Vec2::new(9.0, 0.0), &waypoints, 1, PatrolDirection::Forward, 100.0, 1.0);
        assert_eq!(idx, 0);
        assert_eq!(dir, PatrolDirection::Reverse);
    }

    #[test]
    fn reassignment_respects_inset() {
        let room = Rect { x: 0.0, y: 0.0, w: 200.0, h: 200.0 };
        assert!(!should_reassign_into_room(Vec2::new(30.0, 30.0), &room));
        assert!(should_reassign_into_room(Vec2::new(100.0, 100.0), &room));
    }
}
