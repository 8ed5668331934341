//! Ground effects (§3, §4.7 step 15): transient damaging volumes spawned by
//! bosses and elites.

use bevy_ecs::prelude::*;
use glam::Vec2;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GroundEffectType {
    ExpandingCircle,
    MovingWave,
    VoidZone,
    RotatingBeam,
    FirePool,
    GravityWell,
}

#[derive(Component, Debug, Clone)]
pub struct GroundEffect {
    pub kind: GroundEffectType,
    pub position: Vec2,
    pub direction: Option<Vec2>,
    pub speed: Option<f32>,
    pub radius: f32,
    pub max_radius: f32,
    pub damage: i32,
    pub tick_interval: f32,
    pub duration: f32,
    pub age: f32,
    pub source: Entity,
    /// Rotation angle in radians, for `RotatingBeam`.
    pub angle: f32,
}

impl GroundEffect {
    pub fn new(kind: GroundEffectType, position: Vec2, damage: i32, duration: f32, source: Entity) -> Self {
        let (radius, max_radius, tick_interval) = match kind {
            GroundEffectType::ExpandingCircle => (10.0, 120.0, 1.0),
            GroundEffectType::MovingWave => (40.0, 40.0, 0.5),
            GroundEffectType::VoidZone => (60.0, 60.0, 1.0),
            GroundEffectType::RotatingBeam => (200.0, 200.0, 0.5),
            GroundEffectType::FirePool => (50.0, 50.0, 1.0),
            GroundEffectType::GravityWell => (150.0, 150.0, 0.5),
        };
        Self {
            kind,
            position,
            direction: None,
            speed: None,
            radius,
            max_radius,
            damage,
            tick_interval,
            duration,
            age: 0.0,
            source,
            angle: 0.0,
        }
    }

    pub fn with_direction(mut self, direction: Vec2, speed: f32) -> Self {
        self.direction = Some(direction);
        self.speed = Some(speed);
        self
    }

    pub fn is_expired(&self) -> bool {
        self.age >= self.duration
    }

    /// Advance growth/translation/rotation for one tick (§4.7 step 15).
    pub fn advance(&mut self, delta_time: f32) {
        self.age += delta_time;
        match self.kind {
            GroundEffectType::ExpandingCircle | GroundEffectType::VoidZone => {
                let growth_window = 3.5_f32.max(delta_time);
                let t = (self.age / growth_window).min(1.0);
                self.radius = self.radius + (self.max_radius - self.radius) * t * delta_time / growth_window.max(delta_time);
                self.radius = self.radius.min(self.max_radius);
            }
            GroundEffectType::MovingWave => {
                if let (Some(dir), Some(speed)) = (self.direction, self.speed) {
                    self.position += dir.normalize_or_zero() * speed * delta_time;
                }
            }
            GroundEffectType::RotatingBeam => {
                self.angle = (self.angle + 1.5 * delta_time) % std::f32::consts::TAU;
            }
            GroundEffectType::FirePool | GroundEffectType::GravityWell => {}
        }
    }

    /// Whether `point` is inside the effect's damage volume right now.
    pub fn contains(&self, point: Vec2) -> bool {
        match self.kind {
            GroundEffectType::RotatingBeam => {
                let to_point = point - self.position;
                if to_point.length() > self.radius {
                    return false;
                }
                let point_angle = to_point.y.atan2(to_point.x);
                let mut diff = (point_angle - self.angle).rem_euclid(std::f32::consts::TAU);
                if diff > std::f32::consts::PI {
                    diff -= std::f32::consts::TAU;
                }
                diff.abs() <= 0.35
            }
            _ => point.distance(self.position) <= self.radius,
        }
    }

    /// Gravity-well pull strength at `point`: 80 base plus up to 40 more
    /// the closer `point` is to the well's center (§4.7 step 15).
    pub fn pull_strength(&self, point: Vec2) -> f32 {
        debug_assert_eq!(self.kind, GroundEffectType::GravityWell);
        let dist = point.distance(self.position).max(1.0);
        let proximity = 1.0 - (dist / self.radius).min(1.0);
        80.0 + 40.0 * proximity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dummy_source() -> Entity {
        Entity::from_raw(0)
    }

    #[test]
    fn rotating_beam_only_damages_inside_cone() {
        let mut beam = GroundEffect::new(GroundEffectType::RotatingBeam, Vec2::ZERO, 10, 30.0, dummy_source());
        beam.angle = 0.0;
        assert!(beam.contains(Vec2::new(50.0, 0.0)));
        assert!(!beam.contains(Vec2::new(0.0, 50.0)));
    }

    #[test]
    fn expanding_circle_grows_toward_max() {
        let mut circle = GroundEffect::new(GroundEffectType::ExpandingCircle, Vec2::ZERO, 5, 10.0, dummy_source());
        let start = circle.radius;
        circle.advance(1.0);
        assert!(circle.radius >= start);
        assert!(circle.radius <= circle.max_radius);
    }

    #[test]
    fn gravity_well_pull_increases_near_center() {
        let well = GroundEffect::new(GroundEffectType::GravityWell, Vec2::ZERO, 0, 10.0, dummy_source());
        let near = well.pull_strength(Vec2::new(10.0, 0.0));
        let far = well.pull_strength(Vec2::new(140.0, 0.0));
        assert!(near > far);
        assert!(far >= 80.0);
    }
}
