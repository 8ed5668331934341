//! Procedural floor generation (§4.2).
//!
//! Generation is total: every step that could fail (boss overlap, broken
//! reachability) has a corrective fallback, so `generate` never returns an
//! error — unreachable invariants are logged via
//! `DungeonError::GeneratorUnreachable` and corrected in place (§7).

use bevy_ecs::prelude::*;
use glam::Vec2;
use std::collections::{HashMap, HashSet, VecDeque};
use tracing::warn;

use super::chest::{Chest, LootTier};
use super::patrol::build_waypoints;
use super::room::{Rect, Room, RoomModifier, RoomType, RoomVariant};
use super::trap::{Trap, TrapType};
use super::Dungeon;
use crate::catalog::enemies::EnemyId;
use crate::catalog::items::{EquipmentSlot, ItemStats, Rarity, EQUIPMENT_SLOTS};
use crate::catalog::leveling::scale_enemy_stats;
use crate::catalog::themes::DungeonTheme;
use crate::entities::enemy::{Enemy, EnemyTracking, Patrol, PatrolDirection};
use crate::entities::ground_item::GroundItem;
use crate::entities::stats::Stats;
use crate::error::DungeonError;
use crate::rng::{create_floor_rng, SeededRng};

const GRID_CELL: f32 = 320.0;
const ROOM_MARGIN: f32 = 40.0;
pub const RARE_MOB_SPAWN_CHANCE: f32 = 0.15;
const ELITE_CHANCE_FLOOR_3: f32 = 0.20;

pub fn generate(
    world: &mut World,
    run_seed: &str,
    floor: u32,
    party_size: u32,
    avg_item_power: i32,
) -> Dungeon {
    let mut rng = create_floor_rng(run_seed, floor);

    let theme = pick_theme(&mut rng, floor);
    let theme_modifiers = theme.modifiers();

    let rects = place_rooms(&mut rng, floor);
    let n = rects.len();
    let centers: Vec<Vec2> = rects.iter().map(|r| r.center()).collect();

    let mut adjacency = minimum_spanning_tree(&centers);
    add_extra_loop_edges(&mut rng, &centers, &mut adjacency, n / 3);

    let start_idx = 0usize;
    let boss_idx = furthest_from(&adjacency, start_idx, n);

    let mut room_types = vec![RoomType::Normal; n];
    room_types[start_idx] = RoomType::Start;
    room_types[boss_idx] = RoomType::Boss;

    let mut final_rects = rects.clone();
    resolve_boss_overlap(&mut final_rects, &mut adjacency, boss_idx, start_idx);

    for (i, room_type) in room_types.iter_mut().enumerate() {
        if *room_type == RoomType::Normal && rng.chance(RARE_MOB_SPAWN_CHANCE) {
            *room_type = RoomType::Rare;
        }
    }

    validate_reachability(&mut adjacency, &centers, start_idx, boss_idx);

    let mut entities = Vec::with_capacity(n);
    for i in 0..n {
        let mut room = Room::new(final_rects[i], room_types[i]);
        room.variant = pick_variant(&mut rng, room_types[i], theme, floor);
        room.modifier = pick_modifier(&mut rng, theme, room_types[i]);
        entities.push(world.spawn(room).id());
    }
    for (i, neighbors) in adjacency.iter().enumerate() {
        for &j in neighbors {
            let (a, b) = (entities[i], entities[j]);
            if let Some(mut room) = world.get_mut::<Room>(a) {
                room.connected_to.insert(b);
            }
        }
    }

    for i in 0..n {
        populate_room(world, &mut rng, entities[i], final_rects[i], room_types[i], theme, floor, party_size, avg_item_power);
        place_traps_and_chests(world, &mut rng, entities[i], final_rects[i], room_types[i], theme, floor);
        place_ground_items(world, &mut rng, entities[i], final_rects[i], room_types[i], floor);
    }

    if floor >= 2 {
        generate_patrols(world, &mut rng, &entities, &final_rects, &adjacency, floor);
    }

    Dungeon {
        theme,
        theme_modifiers,
        rooms: entities.clone(),
        current_room_id: entities[start_idx],
        boss_defeated: false,
    }
}

fn pick_theme(rng: &mut SeededRng, floor: u32) -> DungeonTheme {
    let themes = DungeonTheme::all();
    let weights: Vec<f32> = themes.iter().map(|t| t.weight_for_floor(floor)).collect();
    let total: f32 = weights.iter().sum();
    if total <= 0.0 {
        return DungeonTheme::Crypt;
    }
    let mut roll = rng.next_float(0.0, total);
    for (theme, weight) in themes.iter().zip(weights.iter()) {
        if roll < *weight {
            return *theme;
        }
        roll -= weight;
    }
    *themes.last().unwrap()
}

fn place_rooms(rng: &mut SeededRng, floor: u32) -> Vec<Rect> {
    let count = rng.next_int(5, 11) as usize;
    let mut cells: Vec<(i32, i32)> = (0..4).flat_map(|x| (0..4).map(move |y| (x, y))).collect();
    rng.shuffle(&mut cells);

    let mut rects = Vec::with_capacity(count);
    for (i, (cx, cy)) in cells.into_iter().take(count).enumerate() {
        let w = rng.next_float(140.0, 220.0);
        let h = rng.next_float(140.0, 220.0);
        let x = cx as f32 * GRID_CELL + ROOM_MARGIN;
        let y = cy as f32 * GRID_CELL + ROOM_MARGIN;
        let mut rect = Rect { x, y, w, h };
        if i == 0 {
            // start room enlarged to fit three vendors.
            rect.w += 120.0;
            rect.h += 60.0;
        }
        rects.push(rect);
    }
    let _ = floor;
    rects
}

fn minimum_spanning_tree(centers: &[Vec2]) -> Vec<HashSet<usize>> {
    let n = centers.len();
    let mut adjacency = vec![HashSet::new(); n];
    if n == 0 {
        return adjacency;
    }
    let mut in_tree = vec![false; n];
    in_tree[0] = true;
    let mut edges_added = 0;
    while edges_added < n - 1 {
        let mut best: Option<(usize, usize, f32)> = None;
        for i in 0..n {
            if !in_tree[i] {
                continue;
            }
            for j in 0..n {
                if in_tree[j] {
                    continue;
                }
                let dist = centers[i].distance(centers[j]);
                if best.map_or(true, |(_, _, d)| dist < d) {
                    best = Some((i, j, dist));
                }
            }
        }
        if let Some((i, j, _)) = best {
            adjacency[i].insert(j);
            adjacency[j].insert(i);
            in_tree[j] = true;
            edges_added += 1;
        } else {
            break;
        }
    }
    adjacency
}

fn add_extra_loop_edges(rng: &mut SeededRng, centers: &[Vec2], adjacency: &mut [HashSet<usize>], extra: usize) {
    let n = centers.len();
    if n < 2 {
        return;
    }
    for _ in 0..extra {
        let a = rng.next_int(0, n as i64) as usize;
        let b = rng.next_int(0, n as i64) as usize;
        if a != b && !adjacency[a].contains(&b) {
            adjacency[a].insert(b);
            adjacency[b].insert(a);
        }
    }
}

fn furthest_from(adjacency: &[HashSet<usize>], start: usize, n: usize) -> usize {
    let mut visited = vec![false; n];
    let mut queue = VecDeque::new();
    queue.push_back(start);
    visited[start] = true;
    let mut furthest = start;
    while let Some(node) = queue.pop_front() {
        furthest = node;
        for &next in &adjacency[node] {
            if !visited[next] {
                visited[next] = true;
                queue.push_back(next);
            }
        }
    }
    furthest
}

/// Boss room is doubled in size; if that makes it overlap a neighbor, the
/// neighbor's connections are pruned and full reachability restored
/// afterward by `validate_reachability` (§4.2 step 4, "Failure semantics").
fn resolve_boss_overlap(rects: &mut [Rect], adjacency: &mut [HashSet<usize>], boss_idx: usize, start_idx: usize) {
    let doubled = Rect {
        x: rects[boss_idx].x - rects[boss_idx].w / 2.0,
        y: rects[boss_idx].y - rects[boss_idx].h / 2.0,
        w: rects[boss_idx].w * 2.0,
        h: rects[boss_idx].h * 2.0,
    };
    let mut removed_any = false;
    for i in 0..rects.len() {
        if i == boss_idx || i == start_idx {
            continue;
        }
        if doubled.overlaps(&rects[i]) {
            for j in 0..adjacency.len() {
                adjacency[j].remove(&i);
            }
            adjacency[i].clear();
            removed_any = true;
        }
    }
    if removed_any {
        let err = DungeonError::GeneratorUnreachable(format!(
            "boss room {boss_idx} overlap resolved by pruning neighbor connections"
        ));
        warn!("{err}");
    }
    rects[boss_idx] = doubled;
}

fn validate_reachability(adjacency: &mut [HashSet<usize>], centers: &[Vec2], start: usize, boss: usize) {
    let n = centers.len();
    loop {
        let mut visited = vec![false; n];
        let mut queue = VecDeque::new();
        queue.push_back(start);
        visited[start] = true;
        while let Some(node) = queue.pop_front() {
            for &next in &adjacency[node] {
                if !visited[next] {
                    visited[next] = true;
                    queue.push_back(next);
                }
            }
        }
        if visited[boss] {
            return;
        }
        let err = DungeonError::GeneratorUnreachable("start->boss unreachable, force-connecting nearest node".into());
        warn!("{err}");
        // Force-connect the nearest unreached node to the nearest reached
        // node, stepping toward the boss.
        let mut best: Option<(usize, usize, f32)> = None;
        for i in 0..n {
            if !visited[i] {
                continue;
            }
            for j in 0..n {
                if visited[j] {
                    continue;
                }
                let dist = centers[j].distance(centers[boss]);
                if best.map_or(true, |(_, _, bd)| dist < bd) {
                    best = Some((i, j, dist));
                }
            }
        }
        match best {
            Some((i, j, _)) => {
                adjacency[i].insert(j);
                adjacency[j].insert(i);
            }
            None => return,
        }
    }
}

fn pick_variant(rng: &mut SeededRng, room_type: RoomType, theme: DungeonTheme, floor: u32) -> RoomVariant {
    if room_type == RoomType::Boss {
        return RoomVariant::Arena;
    }
    let pool: &[RoomVariant] = match theme {
        DungeonTheme::Shadow => &[RoomVariant::Ambush, RoomVariant::Standard, RoomVariant::Swarm],
        DungeonTheme::Inferno => &[RoomVariant::Gauntlet, RoomVariant::Swarm, RoomVariant::Standard],
        _ => &[
            RoomVariant::Standard,
            RoomVariant::Arena,
            RoomVariant::Guardian,
            RoomVariant::Swarm,
            RoomVariant::Ambush,
            RoomVariant::Gauntlet,
        ],
    };
    let _ = floor;
    *rng.pick(pool).unwrap_or(&RoomVariant::Standard)
}

fn pick_modifier(rng: &mut SeededRng, theme: DungeonTheme, room_type: RoomType) -> Option<RoomModifier> {
    if room_type == RoomType::Start {
        return None;
    }
    let roll = rng.next_f32();
    match theme {
        DungeonTheme::Inferno if roll < 0.35 => Some(RoomModifier::Burning),
        DungeonTheme::Shadow if roll < 0.30 => Some(RoomModifier::Cursed),
        DungeonTheme::Crypt if roll < 0.20 => Some(RoomModifier::Dark),
        _ if roll < 0.10 => Some(RoomModifier::Blessed),
        _ => None,
    }
}

fn formation_positions(rng: &mut SeededRng, rect: Rect, variant: RoomVariant, count: usize) -> Vec<Vec2> {
    let center = rect.center();
    (0..count)
        .map(|i| match variant {
            RoomVariant::Arena => {
                let angle = (i as f32 / count.max(1) as f32) * std::f32::consts::TAU;
                center + Vec2::new(angle.cos(), angle.sin()) * (rect.w.min(rect.h) * 0.4)
            }
            RoomVariant::Guardian => {
                if i == 0 {
                    center
                } else {
                    let angle = (i as f32 / (count - 1).max(1) as f32) * std::f32::consts::TAU;
                    center + Vec2::new(angle.cos(), angle.sin()) * (rect.w.min(rect.h) * 0.3)
                }
            }
            RoomVariant::Swarm => {
                center + Vec2::new(rng.next_float(-30.0, 30.0), rng.next_float(-30.0, 30.0))
            }
            RoomVariant::Ambush => {
                let edge = rng.next_int(0, 4);
                match edge {
                    0 => Vec2::new(rect.x + 20.0, rect.y + rng.next_float(0.0, rect.h)),
                    1 => Vec2::new(rect.x + rect.w - 20.0, rect.y + rng.next_float(0.0, rect.h)),
                    2 => Vec2::new(rect.x + rng.next_float(0.0, rect.w), rect.y + 20.0),
                    _ => Vec2::new(rect.x + rng.next_float(0.0, rect.w), rect.y + rect.h - 20.0),
                }
            }
            RoomVariant::Gauntlet => {
                let axis_len = rect.w.max(rect.h);
                let t = (i as f32 + 1.0) / (count as f32 + 1.0);
                if rect.w >= rect.h {
                    Vec2::new(rect.x + axis_len * t, center.y)
                } else {
                    Vec2::new(center.x, rect.y + axis_len * t)
                }
            }
            RoomVariant::Standard => {
                center + Vec2::new(rng.next_float(-40.0, 40.0), rng.next_float(-40.0, 40.0))
            }
        })
        .collect()
}

#[allow(clippy::too_many_arguments)]
fn populate_room(
    world: &mut World,
    rng: &mut SeededRng,
    room_entity: Entity,
    rect: Rect,
    room_type: RoomType,
    theme: DungeonTheme,
    floor: u32,
    party_size: u32,
    avg_item_power: i32,
) {
    if room_type == RoomType::Start {
        return;
    }

    if room_type == RoomType::Boss {
        let boss_id = crate::catalog::enemies::BossId::for_theme(theme);
        let scaled = scale_enemy_stats(boss_id.base_stats(), floor, party_size, avg_item_power);
        let stats = Stats {
            max_health: scaled.max_health,
            health: scaled.max_health,
            max_mana: 500,
            mana: 500,
            armor: scaled.armor,
            resist: scaled.resist,
            attack_power: scaled.attack_power,
            spell_power: scaled.spell_power,
            crit: 5,
            speed: 4.0,
        };
        let position = rect.center();
        let mut enemy = Enemy::new(EnemyId::RareCryptLord, stats, position, room_entity);
        enemy.is_boss = true;
        enemy.boss_id = Some(boss_id);
        let id = world.spawn((enemy, EnemyTracking::default())).id();
        if let Some(mut room) = world.get_mut::<Room>(room_entity) {
            room.enemies.push(id);
            room.cleared = false;
        }
        return;
    }

    let base_count = match theme {
        DungeonTheme::Inferno | DungeonTheme::Shadow => 3,
        _ => 2,
    };
    let count = (base_count + floor / 3).clamp(1, 8) as usize;
    let variant = world.get::<Room>(room_entity).map(|r| r.variant).unwrap_or(RoomVariant::Standard);
    let positions = formation_positions(rng, rect, variant, count);

    let pool = if room_type == RoomType::Rare {
        std::slice::from_ref(&EnemyId::rare_variant_for_theme(theme))
    } else {
        EnemyId::pool_for_theme(theme)
    };

    let mut spawned = Vec::with_capacity(count);
    for position in positions {
        let kind = *rng.pick(pool).unwrap_or(&pool[0]);
        let scaled = scale_enemy_stats(
            crate::catalog::enemies::EnemyStats {
                max_health: kind.template().stats.max_health,
                armor: kind.template().stats.armor,
                resist: kind.template().stats.resist,
                attack_power: kind.template().stats.attack_power,
                spell_power: kind.template().stats.spell_power,
            },
            floor,
            party_size,
            avg_item_power,
        );
        let stats = Stats {
            max_health: scaled.max_health,
            health: scaled.max_health,
            max_mana: 0,
            mana: 0,
            armor: scaled.armor,
            resist: scaled.resist,
            attack_power: scaled.attack_power,
            spell_power: scaled.spell_power,
            crit: 3,
            speed: 5.0,
        };
        let mut enemy = Enemy::new(kind, stats, position, room_entity);
        if room_type == RoomType::Rare {
            enemy.is_rare = true;
        }
        if floor >= 3 && rng.chance(ELITE_CHANCE_FLOOR_3) {
            enemy.is_elite = true;
        }
        if variant == RoomVariant::Ambush {
            enemy.is_hidden = true;
        }
        spawned.push(world.spawn((enemy, EnemyTracking::default())).id());
    }

    if let Some(mut room) = world.get_mut::<Room>(room_entity) {
        room.enemies.extend(spawned);
        room.cleared = room.enemies.is_empty();
    }
}

fn place_traps_and_chests(
    world: &mut World,
    rng: &mut SeededRng,
    room_entity: Entity,
    rect: Rect,
    room_type: RoomType,
    theme: DungeonTheme,
    floor: u32,
) {
    let modifiers = theme.modifiers();

    let mut traps = Vec::new();
    if floor >= 2 && rng.chance(0.5) {
        traps.push(world.spawn(Trap::new(TrapType::Spikes, rect.center(), 8, modifiers.trap_multiplier)).id());
    }
    let flame_eligible = floor >= 4 || (room_type == RoomType::Boss && floor >= 3);
    if flame_eligible && rng.chance(0.4) {
        traps.push(world.spawn(Trap::new(TrapType::Flamethrower, rect.center(), 12, modifiers.trap_multiplier)).id());
    }

    let mut chests = Vec::new();
    if room_type != RoomType::Start {
        let tier = Chest::tier_for_room(room_type);
        let is_mimic = theme == DungeonTheme::Treasure && room_type != RoomType::Boss && rng.chance(0.4);
        chests.push(world.spawn(Chest::new(rect.center() + Vec2::new(20.0, 20.0), tier, is_mimic)).id());
        if theme == DungeonTheme::Treasure && rng.chance(0.5) {
            let extra_mimic = rng.chance(0.5);
            chests.push(world.spawn(Chest::new(rect.center() - Vec2::new(20.0, 20.0), LootTier::Common, extra_mimic)).id());
        }
    }

    if let Some(mut room) = world.get_mut::<Room>(room_entity) {
        room.traps.extend(traps);
        room.chests.extend(chests);
    }
}

/// Walkable per-room floor loot (§3 Room.groundItems), distinct from the
/// boss/rare-kill drop queue in `Run.pendingLoot`: 0-2 items scattered
/// around the room, scaled to floor depth, collected one at a time via the
/// `PICKUP_GROUND_ITEM` intent rather than auto-picked-up.
fn place_ground_items(world: &mut World, rng: &mut SeededRng, room_entity: Entity, rect: Rect, room_type: RoomType, floor: u32) {
    if room_type == RoomType::Start {
        return;
    }

    let count = rng.next_int(0, 3) as usize;
    let mut spawned = Vec::with_capacity(count);
    for _ in 0..count {
        let slot = *rng.pick(&EQUIPMENT_SLOTS).unwrap();
        let rarity = roll_ground_item_rarity(rng);
        let stats = ground_item_stats_for_slot(slot, floor, rarity);
        let position = rect.center()
            + Vec2::new(
                rng.next_float(-(rect.w / 2.0 - ROOM_MARGIN), rect.w / 2.0 - ROOM_MARGIN),
                rng.next_float(-(rect.h / 2.0 - ROOM_MARGIN), rect.h / 2.0 - ROOM_MARGIN),
            );
        spawned.push(world.spawn(GroundItem::new(position, stats, rarity, slot, room_entity)).id());
    }

    if let Some(mut room) = world.get_mut::<Room>(room_entity) {
        room.ground_items.extend(spawned);
    }
}

fn roll_ground_item_rarity(rng: &mut SeededRng) -> Rarity {
    let mut rarity = Rarity::Common;
    if rng.chance(0.25) {
        rarity = rarity.upgrade();
        if rng.chance(0.15) {
            rarity = rarity.upgrade();
        }
    }
    rarity
}

fn ground_item_stats_for_slot(slot: EquipmentSlot, floor: u32, rarity: Rarity) -> ItemStats {
    let base = 4 + floor as i32 * 2;
    let scaled = (base as f32 * rarity.stat_multiplier()).round() as i32;
    let mut stats = ItemStats::default();
    match slot {
        EquipmentSlot::MainHand => stats.attack_power = scaled,
        EquipmentSlot::Trinket => stats.lifesteal = (scaled / 2).max(1),
        EquipmentSlot::Head | EquipmentSlot::Chest | EquipmentSlot::Legs => stats.max_health = scaled * 3,
        EquipmentSlot::Shoulders | EquipmentSlot::Hands | EquipmentSlot::Feet => stats.armor = scaled,
    }
    stats
}

/// §4.2 step 7: 1-5 patrollers, each routed through 2-4 connected normal
/// rooms.
fn generate_patrols(
    world: &mut World,
    rng: &mut SeededRng,
    entities: &[Entity],
    rects: &[Rect],
    adjacency: &[HashSet<usize>],
    floor: u32,
) {
    let normal_indices: Vec<usize> = (0..entities.len())
        .filter(|&i| world.get::<Room>(entities[i]).map(|r| r.room_type == RoomType::Normal).unwrap_or(false))
        .collect();
    if normal_indices.is_empty() {
        return;
    }

    let patroller_count = rng.next_int(1, 6).min(normal_indices.len() as i64) as usize;
    for _ in 0..patroller_count {
        let route_len = rng.next_int(2, 5) as usize;
        let start = *rng.pick(&normal_indices).unwrap();
        let mut route = vec![start];
        let mut current = start;
        for _ in 1..route_len {
            let neighbors: Vec<usize> = adjacency[current]
                .iter()
                .copied()
                .filter(|n| normal_indices.contains(n) && !route.contains(n))
                .collect();
            match rng.pick(&neighbors) {
                Some(&next) => {
                    route.push(next);
                    current = next;
                }
                None => break,
            }
        }
        if route.len() < 2 {
            continue;
        }
        let centers: Vec<Vec2> = route.iter().map(|&i| rects[i].center()).collect();
        let waypoints = build_waypoints(&centers);
        let home_room = entities[route[0]];
        let position = waypoints[0];

        let kind = *rng.pick(EnemyId::pool_for_theme(crate::catalog::themes::DungeonTheme::Crypt)).unwrap();
        let template = kind.template();
        let stats = Stats {
            max_health: template.stats.max_health,
            health: template.stats.max_health,
            max_mana: 0,
            mana: 0,
            armor: template.stats.armor,
            resist: template.stats.resist,
            attack_power: template.stats.attack_power,
            spell_power: template.stats.spell_power,
            crit: 3,
            speed: 5.0,
        };
        let mut enemy = Enemy::new(kind, stats, position, home_room);
        enemy.patrol = Some(Patrol {
            waypoints,
            current_waypoint_index: 0,
            direction: PatrolDirection::Forward,
        });
        let id = world.spawn((enemy, EnemyTracking::default())).id();
        if let Some(mut room) = world.get_mut::<Room>(home_room) {
            room.enemies.push(id);
            room.cleared = false;
        }
    }
    let _ = floor;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_floor_is_reachable_start_to_boss() {
        let mut world = World::new();
        let dungeon = generate(&mut world, "test-seed", 1, 1, 0);
        assert!(dungeon.rooms.len() >= 5);
        let boss_entity = dungeon
            .rooms
            .iter()
            .find(|&&e| world.get::<Room>(e).unwrap().room_type == RoomType::Boss)
            .copied()
            .unwrap();
        assert!(world.get::<Room>(boss_entity).is_some());
    }

    #[test]
    fn same_seed_produces_same_room_count() {
        let mut w1 = World::new();
        let mut w2 = World::new();
        let d1 = generate(&mut w1, "seed-a", 3, 2, 100);
        let d2 = generate(&mut w2, "seed-a", 3, 2, 100);
        assert_eq!(d1.rooms.len(), d2.rooms.len());
    }
}
