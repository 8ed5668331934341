//! Traps (§3, §4.2 step 8).

use bevy_ecs::prelude::*;
use glam::Vec2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrapType {
    Spikes,
    Flamethrower,
}

#[derive(Component, Debug, Clone)]
pub struct Trap {
    pub kind: TrapType,
    pub position: Vec2,
    pub active_duration: f32,
    pub inactive_duration: f32,
    pub damage: i32,
    pub direction: Option<Vec2>,
    pub is_active: bool,
    pub phase_timer: f32,
}

impl Trap {
    pub fn new(kind: TrapType, position: Vec2, base_damage: i32, trap_multiplier: f32) -> Self {
        let (active_duration, inactive_duration, direction) = match kind {
            TrapType::Spikes => (1.5, 2.5, None),
            TrapType::Flamethrower => (2.0, 3.0, Some(Vec2::X)),
        };
        Self {
            kind,
            position,
            active_duration,
            inactive_duration,
            damage: (base_damage as f32 * trap_multiplier).round() as i32,
            direction,
            is_active: true,
            phase_timer: 0.0,
        }
    }

    /// Advance the active/inactive phase timer (§4.7 step 6).
    pub fn advance(&mut self, delta_time: f32) {
        self.phase_timer += delta_time;
        let threshold = if self.is_active {
            self.active_duration
        } else {
            self.inactive_duration
        };
        if self.phase_timer >= threshold {
            self.phase_timer -= threshold;
            self.is_active = !self.is_active;
        }
    }
}
