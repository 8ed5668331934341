//! Room (§3).

use bevy_ecs::prelude::*;
use glam::Vec2;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoomType {
    Start,
    Normal,
    Rare,
    Boss,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoomVariant {
    Standard,
    Arena,
    Guardian,
    Swarm,
    Ambush,
    Gauntlet,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoomModifier {
    Burning,
    Cursed,
    Blessed,
    Dark,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.w / 2.0, self.y + self.h / 2.0)
    }

    /// Inset by `padding` on every side; used for "physically inside the
    /// room" checks (§4.5 step 3, §4.6).
    pub fn contains_inset(&self, point: Vec2, padding: f32) -> bool {
        point.x >= self.x + padding
            && point.x <= self.x + self.w - padding
            && point.y >= self.y + padding
            && point.y <= self.y + self.h - padding
    }

    pub fn contains(&self, point: Vec2) -> bool {
        self.contains_inset(point, 0.0)
    }

    pub fn overlaps(&self, other: &Rect) -> bool {
        self.x < other.x + other.w
            && self.x + self.w > other.x
            && self.y < other.y + other.h
            && self.y + self.h > other.y
    }
}

#[derive(Component, Debug, Clone)]
pub struct Room {
    pub rect: Rect,
    pub room_type: RoomType,
    pub variant: RoomVariant,
    pub modifier: Option<RoomModifier>,
    pub connected_to: HashSet<Entity>,
    pub cleared: bool,
    pub enemies: Vec<Entity>,
    pub traps: Vec<Entity>,
    pub chests: Vec<Entity>,
    pub ground_items: Vec<Entity>,
    pub vendor: Option<Entity>,
    pub shop_vendor: Option<Entity>,
    pub crypto_vendor: Option<Entity>,
}

impl Room {
    pub fn new(rect: Rect, room_type: RoomType) -> Self {
        Self {
            rect,
            room_type,
            variant: RoomVariant::Standard,
            modifier: None,
            connected_to: HashSet::new(),
            cleared: true,
            enemies: Vec::new(),
            traps: Vec::new(),
            chests: Vec::new(),
            ground_items: Vec::new(),
            vendor: None,
            shop_vendor: None,
            crypto_vendor: None,
        }
    }
}
