//! Dungeon generator and floor data model (§2 component 3, §3, §4.2).

pub mod chest;
pub mod generator;
pub mod patrol;
pub mod room;
pub mod trap;

use bevy_ecs::prelude::*;

use crate::catalog::themes::{DungeonTheme, ThemeModifiers};

/// One floor (§3). Replaced wholesale on floor advance; the outgoing
/// dungeon's room entities are despawned atomically by the caller.
#[derive(Resource, Debug, Clone)]
pub struct Dungeon {
    pub theme: DungeonTheme,
    pub theme_modifiers: ThemeModifiers,
    pub rooms: Vec<Entity>,
    pub current_room_id: Entity,
    pub boss_defeated: bool,
}
