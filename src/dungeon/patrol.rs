//! Patrol route generation (§4.2 step 7, §8 property 8).

use glam::Vec2;

/// Build waypoints for a route through `room_centers`: for a route
/// `[A,B,C]`, waypoints are `[center(A), mid(A,B), center(B), mid(B,C),
/// center(C)]` — never straight lines center-to-center.
pub fn build_waypoints(room_centers: &[Vec2]) -> Vec<Vec2> {
    if room_centers.is_empty() {
        return Vec::new();
    }
    let mut waypoints = Vec::with_capacity(room_centers.len() * 2 - 1);
    waypoints.push(room_centers[0]);
    for pair in room_centers.windows(2) {
        let mid = (pair[0] + pair[1]) / 2.0;
        waypoints.push(mid);
        waypoints.push(pair[1]);
    }
    waypoints
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn three_room_route_matches_property_eight() {
        let a = Vec2::new(0.0, 0.0);
        let b = Vec2::new(100.0, 0.0);
        let c = Vec2::new(100.0, 100.0);
        let waypoints = build_waypoints(&[a, b, c]);
        assert_eq!(waypoints, vec![a, (a + b) / 2.0, b, (b + c) / 2.0, c]);
    }
}
