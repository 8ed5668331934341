//! The fixed-rate per-Run tick (§2 component 7, §4.7, §5 "Ordering
//! guarantees").
//!
//! One call to [`run_tick`] executes the 17 ordered phases against a Run's
//! `World` synchronously, mirroring the reference engine's headless match
//! loop (`headless/mod.rs`'s fixed-step `run_headless_match`) but scoped to
//! a single Run instead of one global arena. Phases are plain functions
//! rather than a `bevy_ecs::schedule::Schedule` — there is exactly one
//! writer and one consumer (this function), so the ordering guarantee is
//! just "call them in this order"; a `Schedule` would only pay for
//! parallelism this design never needs.

use bevy_ecs::prelude::*;
use glam::Vec2;

use crate::ai::boss_ai::{BossAbilityTrack, BossAoeTrack, ELITE_VOID_ZONE_COOLDOWN};
use crate::ai::enemy_ai::{
    acquire_target, can_attack, decide_charge, in_line_of_sight, post_attack_movement, should_leash, AggroResult,
    ChargeDecision,
};
use crate::ai::patrol::{advance_patrol, idle_return_to_spawn, should_reassign_into_room};
use crate::ai::pet_ai::{decide_attack, decide_taunt, should_follow_owner, PetAction};
use crate::catalog::abilities::IconId;
use crate::catalog::items::EquipmentSlot;
use crate::catalog::themes::{INFERNO_HAZARD_CHANCE, INFERNO_HAZARD_CHECK_INTERVAL};
use crate::combat::log::{CombatLog, CombatLogEvent};
use crate::combat::resolver::{
    apply_lifesteal_and_bloodlust, apply_shield_wall, apply_stat_modifiers, incoming_damage_rejected, reflect_damage,
    resolve_damage_hit, retribution_aura_reflect, CasterSnapshot, IncomingDamageGuards, ANCESTRAL_SPIRIT_HEAL,
};
use crate::dungeon::room::{Room, RoomModifier, RoomType};
use crate::dungeon::trap::Trap;
use crate::dungeon::Dungeon;
use crate::entities::enemy::{Enemy, EnemyTracking};
use crate::entities::ground_effect::{GroundEffect, GroundEffectType};
use crate::entities::pet::{Pet, PET_ATTACK_INTERVAL, PET_TAUNT_INTERVAL};
use crate::entities::player::{Player, PlayerCombatState};
use crate::entities::run::{Run, RunTracking};
use crate::loot::drops::kill_time_bonus;
use crate::loot::progression::{award_xp, xp_value_for_kill};
use crate::rng::SeededRng;

pub const LOOT_PICKUP_DISTANCE: f32 = 100.0;
pub const RESPAWN_DELAY: f32 = 3.0;
const MELEE_AUTO_ATTACK_RANGE: f32 = 60.0;
const RANGED_AUTO_ATTACK_RANGE: f32 = 300.0;
const AUTO_ATTACK_COOLDOWN: f32 = 1.5;
const ROOM_MODIFIER_TICK_INTERVAL: f32 = 2.0;
const FROZEN_ACCEL: f32 = 0.15;
const FROZEN_FRICTION: f32 = 0.02;
const RESPAWN_GROUND_EFFECT_PURGE_RADIUS: f32 = 150.0;
const GRAVITY_WELL_PER_TICK_FRACTION: f32 = 0.016_666_7; // ~1/60s reference tick

/// Runs one tick of phases 1-17 against `world`. `delta_time` is in
/// seconds. Events are pushed to `world`'s `CombatLog` resource as the
/// phases run; the caller (the Run task) drains it per tick for broadcast.
pub fn run_tick(world: &mut World, rng: &mut SeededRng, delta_time: f32) {
    world.resource_mut::<CombatLog>().tick_time += delta_time;

    phase_1_player_cooldowns_and_regen(world, delta_time);
    phase_2_apply_player_movement(world, delta_time);
    phase_3_room_transition(world);
    phase_4_ground_item_pickup(world);
    phase_5_trap_and_hazard_damage(world, rng, delta_time);
    phase_6_update_trap_states(world, delta_time);
    phase_7_patrol_reassignment(world);
    phase_8_ambush_trigger(world);
    phase_9_room_modifier_effects(world, delta_time);
    phase_10_player_auto_attacks(world, rng, delta_time);
    phase_11_enemy_and_boss_ai(world, rng, delta_time);
    phase_12_dot_ticking(world, delta_time);
    phase_13_pet_ai(world, delta_time);
    phase_14_room_clear_check(world, rng);
    phase_15_ground_effects(world, delta_time);
    phase_16_pet_follow(world, delta_time);
    phase_17_respawn_dead_players(world, delta_time);
}

/// Phase 1: cooldowns, mana regen, buff durations; recompute effective
/// stats when a buff expired this tick.
fn phase_1_player_cooldowns_and_regen(world: &mut World, delta_time: f32) {
    let mut query = world.query::<(&mut Player, &mut PlayerCombatState)>();
    for (mut player, mut combat) in query.iter_mut(world) {
        if !player.is_alive {
            continue;
        }
        for ability in &mut player.abilities {
            ability.cooldown_remaining = (ability.cooldown_remaining - delta_time).max(0.0);
        }
        combat.attack_cooldown = (combat.attack_cooldown - delta_time).max(0.0);

        let mana_regen = (player.effective_stats.max_mana as f32 * 0.02).round() as i32;
        player.effective_stats.mana = (player.effective_stats.mana + mana_regen).min(player.effective_stats.max_mana);

        let (expired, dot_ticks) = combat.buffs.advance(delta_time);
        for (icon, damage) in dot_ticks {
            player.effective_stats.health = (player.effective_stats.health - damage).max(0);
            if player.effective_stats.health == 0 {
                player.kill();
                combat.death_time = Some(0.0);
            }
            let _ = icon;
        }
        if !expired.is_empty() {
            for icon in &expired {
                if let Some(modifiers) = combat.buffs.remove(*icon) {
                    apply_stat_modifiers(&mut player.effective_stats, modifiers.negate());
                }
            }
        }
    }
}

/// Phase 2: movement-apply. Frozen theme uses momentum physics with wall
/// bounce; every other theme is flat `speed * deltaTime`.
fn phase_2_apply_player_movement(world: &mut World, delta_time: f32) {
    let theme_modifiers = world.resource::<Dungeon>().theme_modifiers;
    let rooms: Vec<Room> = world.query::<&Room>().iter(world).cloned().collect();

    world.resource_scope(|world, mut tracking: Mut<RunTracking>| {
        let mut query = world.query::<(Entity, &mut Player)>();
        for (entity, mut player) in query.iter_mut(world) {
            if !player.is_alive {
                continue;
            }
            let intent = tracking.movement_intent.get(&entity).copied().unwrap_or(Vec2::ZERO);
            if intent == Vec2::ZERO && tracking.momentum.get(&entity).map(|m| *m == Vec2::ZERO).unwrap_or(true) {
                continue;
            }

            let speed = player.effective_stats.speed * theme_modifiers.movement_modifier;
            let desired = if theme_modifiers.movement_modifier < 1.0 && is_frozen_theme(world) {
                let momentum = tracking.momentum.entry(entity).or_insert(Vec2::ZERO);
                *momentum += intent.normalize_or_zero() * speed * FROZEN_ACCEL;
                *momentum *= 1.0 - FROZEN_FRICTION;
                *momentum * delta_time
            } else {
                intent.normalize_or_zero() * speed * delta_time
            };

            let candidate = player.position + desired;
            let current_room = rooms.iter().find(|r| r.rect.contains(player.position));
            let blocked = current_room.map(|r| !r.rect.contains_inset(candidate, 4.0)).unwrap_or(false);
            if !blocked {
                player.position = candidate;
                continue;
            }
            // Reject the combined move; try x-only, then y-only (slide).
            let x_only = player.position + Vec2::new(desired.x, 0.0);
            let y_only = player.position + Vec2::new(0.0, desired.y);
            if current_room.map(|r| r.rect.contains_inset(x_only, 4.0)).unwrap_or(true) {
                player.position = x_only;
            } else if current_room.map(|r| r.rect.contains_inset(y_only, 4.0)).unwrap_or(true) {
                player.position = y_only;
            } else if let Some(momentum) = tracking.momentum.get_mut(&entity) {
                momentum.x *= -0.5;
                momentum.y *= -0.5;
            }
        }
    });
}

fn is_frozen_theme(world: &World) -> bool {
    matches!(world.resource::<Dungeon>().theme, crate::catalog::themes::DungeonTheme::Frozen)
}

/// Phase 3: room transition. A player whose position now lies strictly
/// inside a different (connected, or already-cleared) room transitions:
/// previous-room modifier buffs are stripped, the new room's aggro is
/// reset, boss cooldowns stagger, and out-of-room enemies clamp to center.
fn phase_3_room_transition(world: &mut World) {
    let dungeon_current = world.resource::<Dungeon>().current_room_id;
    let rooms: Vec<(Entity, Room)> = world.query::<(Entity, &Room)>().iter(world).map(|(e, r)| (e, r.clone())).collect();

    let mut players_entering: Vec<(Entity, Entity)> = Vec::new();
    {
        let mut query = world.query::<(Entity, &Player)>();
        for (entity, player) in query.iter_mut(world) {
            if !player.is_alive {
                continue;
            }
            for (room_entity, room) in &rooms {
                if *room_entity == dungeon_current {
                    continue;
                }
                let connected_or_cleared = rooms
                    .iter()
                    .find(|(e, _)| *e == dungeon_current)
                    .map(|(_, r)| r.connected_to.contains(room_entity) || r.cleared)
                    .unwrap_or(true);
                if room.rect.contains(player.position) && connected_or_cleared {
                    players_entering.push((entity, *room_entity));
                    break;
                }
            }
        }
    }

    if let Some((_, new_room)) = players_entering.first().copied() {
        if new_room != dungeon_current {
            world.resource_mut::<Dungeon>().current_room_id = new_room;

            let old_modifier = rooms.iter().find(|(e, _)| *e == dungeon_current).and_then(|(_, r)| r.modifier);
            if let Some(modifier) = old_modifier {
                let icon = modifier_icon(modifier);
                let mut query = world.query::<&mut PlayerCombatState>();
                for mut combat in query.iter_mut(world) {
                    if let Some(removed) = combat.buffs.remove(icon) {
                        let _ = removed;
                    }
                }
            }

            let enemy_ids: Vec<Entity> = rooms.iter().find(|(e, _)| *e == new_room).map(|(_, r)| r.enemies.clone()).unwrap_or_default();
            let room_rect = rooms.iter().find(|(e, _)| *e == new_room).map(|(_, r)| r.rect);
            for enemy_entity in enemy_ids {
                if let Some(mut enemy) = world.get_mut::<Enemy>(enemy_entity) {
                    enemy.target_id = None;
                    if let Some(rect) = room_rect {
                        if !rect.contains(enemy.position) {
                            enemy.position = rect.center();
                        }
                    }
                }
                if let Some(mut tracking) = world.get_mut::<EnemyTracking>(enemy_entity) {
                    tracking.aggro_start = None;
                }
            }
            world.resource_mut::<RunTracking>().boss_fight_start.clear();
        }
    }
}

fn modifier_icon(modifier: RoomModifier) -> IconId {
    match modifier {
        RoomModifier::Cursed => IconId::RoomCursed,
        RoomModifier::Blessed => IconId::RoomBlessed,
        _ => IconId::RoomCursed,
    }
}

/// Phase 4: ground item pickup within `LOOT_PICKUP_DISTANCE`, respecting
/// backpack cap (§3 invariant 7).
fn phase_4_ground_item_pickup(world: &mut World) {
    let pending_loot = world.resource::<Run>().pending_loot.clone();
    if pending_loot.is_empty() {
        return;
    }
    let room_centers: std::collections::HashMap<Entity, Vec2> =
        world.query::<(Entity, &Room)>().iter(world).map(|(e, r)| (e, r.rect.center())).collect();

    let mut collected_indices = Vec::new();
    {
        let mut query = world.query::<&mut Player>();
        'outer: for mut player in query.iter_mut(world) {
            if !player.is_alive {
                continue;
            }
            for (i, loot) in pending_loot.iter().enumerate() {
                if collected_indices.contains(&i) {
                    continue;
                }
                let Some(room_rect_center) = room_centers.get(&loot.room).copied() else {
                    continue;
                };
                if room_rect_center.distance(player.position) <= LOOT_PICKUP_DISTANCE {
                    if crate::loot::progression::auto_equip_or_stash(
                        &mut player,
                        crate::catalog::items::ItemDefinition {
                            name: "Dropped Item",
                            slot: EquipmentSlot::Trinket,
                            base_stats: loot.stats,
                            set: None,
                        },
                    ) {
                        collected_indices.push(i);
                        continue 'outer;
                    }
                }
            }
        }
    }
    if !collected_indices.is_empty() {
        let mut run = world.resource_mut::<Run>();
        let mut kept = Vec::new();
        for (i, loot) in run.pending_loot.drain(..).enumerate() {
            if !collected_indices.contains(&i) {
                kept.push(loot);
            }
        }
        run.pending_loot = kept;
    }
}

/// Phase 5: trap and theme-hazard damage, per-player cooldowns enforced via
/// `RunTracking::trap_damage_cooldowns` and `inferno_hazard_timer`.
fn phase_5_trap_and_hazard_damage(world: &mut World, rng: &mut SeededRng, delta_time: f32) {
    let theme = world.resource::<Dungeon>().theme;
    let theme_modifiers = world.resource::<Dungeon>().theme_modifiers;
    let traps: Vec<(Entity, Trap)> = world.query::<(Entity, &Trap)>().iter(world).map(|(e, t)| (e, t.clone())).collect();

    world.resource_scope(|world, mut tracking: Mut<RunTracking>| {
        let mut query = world.query::<(Entity, &mut Player)>();
        for (entity, mut player) in query.iter_mut(world) {
            if !player.is_alive {
                continue;
            }
            for (trap_entity, trap) in &traps {
                if !trap.is_active || player.position.distance(trap.position) > 40.0 {
                    continue;
                }
                let key = (entity, *trap_entity);
                let cooldown = tracking.trap_damage_cooldowns.entry(key).or_insert(0.0);
                *cooldown -= delta_time;
                if *cooldown <= 0.0 {
                    *cooldown = 1.0;
                    player.effective_stats.health = (player.effective_stats.health - trap.damage).max(0);
                    if player.effective_stats.health == 0 {
                        player.kill();
                    }
                }
            }

            if theme_modifiers.hazard_damage > 0 {
                let timer = tracking.inferno_hazard_timer.entry(entity).or_insert(0.0);
                *timer += delta_time;
                if *timer >= INFERNO_HAZARD_CHECK_INTERVAL {
                    *timer -= INFERNO_HAZARD_CHECK_INTERVAL;
                    if matches!(theme, crate::catalog::themes::DungeonTheme::Inferno) && rng.chance(INFERNO_HAZARD_CHANCE) {
                        player.effective_stats.health = (player.effective_stats.health - theme_modifiers.hazard_damage).max(0);
                        if player.effective_stats.health == 0 {
                            player.kill();
                        }
                    }
                }
            }
        }
    });
}

/// Phase 6: advance trap active/inactive phase timers.
fn phase_6_update_trap_states(world: &mut World, delta_time: f32) {
    let mut query = world.query::<&mut Trap>();
    for mut trap in query.iter_mut(world) {
        trap.advance(delta_time);
    }
}

/// Phase 7: a patrolling enemy whose current position lies inset inside a
/// room that is not its own current room gets reassigned into it (§4.6).
fn phase_7_patrol_reassignment(world: &mut World) {
    let rooms: Vec<(Entity, Room)> = world.query::<(Entity, &Room)>().iter(world).map(|(e, r)| (e, r.clone())).collect();
    let mut reassignments = Vec::new();
    {
        let mut query = world.query::<(Entity, &Enemy)>();
        for (entity, enemy) in query.iter_mut(world) {
            if !enemy.is_patrolling() {
                continue;
            }
            for (room_entity, room) in &rooms {
                if *room_entity != enemy.current_room_id && should_reassign_into_room(enemy.position, &room.rect) {
                    reassignments.push((entity, enemy.current_room_id, *room_entity));
                    break;
                }
            }
        }
    }
    for (entity, old_room, new_room) in reassignments {
        if let Some(mut enemy) = world.get_mut::<Enemy>(entity) {
            enemy.current_room_id = new_room;
            enemy.was_patrolling = true;
        }
        if let Some(mut room) = world.get_mut::<Room>(old_room) {
            room.enemies.retain(|&e| e != entity);
        }
        if let Some(mut room) = world.get_mut::<Room>(new_room) {
            if !room.enemies.contains(&entity) {
                room.enemies.push(entity);
            }
        }
    }
}

/// Phase 8: when a player enters an `ambush` room's center neighborhood,
/// reveal its hidden enemies once.
fn phase_8_ambush_trigger(world: &mut World) {
    let mut triggered_rooms = Vec::new();
    {
        let rooms: Vec<(Entity, Room)> = world.query::<(Entity, &Room)>().iter(world).map(|(e, r)| (e, r.clone())).collect();
        let tracking = world.resource::<RunTracking>();
        let mut players_query = world.query::<&Player>();
        let player_positions: Vec<Vec2> = players_query.iter(world).filter(|p| p.is_alive).map(|p| p.position).collect();
        for (room_entity, room) in &rooms {
            if room.variant != crate::dungeon::room::RoomVariant::Ambush || tracking.ambush_triggered.contains(room_entity) {
                continue;
            }
            let center = room.rect.center();
            if player_positions.iter().any(|p| p.distance(center) <= 80.0) {
                triggered_rooms.push((*room_entity, room.enemies.clone()));
            }
        }
    }
    for (room_entity, enemies) in triggered_rooms {
        for enemy_entity in enemies {
            if let Some(mut enemy) = world.get_mut::<Enemy>(enemy_entity) {
                enemy.is_hidden = false;
            }
        }
        world.resource_mut::<RunTracking>().ambush_triggered.insert(room_entity);
    }
}

/// Phase 9: room modifier effects — burning ticks every 2s, cursed/blessed
/// apply once on entry (delta-tracked buffs), dark is visual only.
fn phase_9_room_modifier_effects(world: &mut World, delta_time: f32) {
    let current_room = world.resource::<Dungeon>().current_room_id;
    let modifier = world.get::<Room>(current_room).and_then(|r| r.modifier);
    let Some(modifier) = modifier else { return };

    if modifier == RoomModifier::Burning {
        let tick_ready = {
            let mut tracking = world.resource_mut::<RunTracking>();
            let timer = tracking.modifier_tick_times.entry(current_room).or_insert(0.0);
            *timer += delta_time;
            if *timer >= ROOM_MODIFIER_TICK_INTERVAL {
                *timer -= ROOM_MODIFIER_TICK_INTERVAL;
                true
            } else {
                false
            }
        };
        if tick_ready {
            let mut query = world.query::<&mut Player>();
            for mut player in query.iter_mut(world) {
                if !player.is_alive {
                    continue;
                }
                player.effective_stats.health = (player.effective_stats.health - 4).max(0);
                if player.effective_stats.health == 0 {
                    player.kill();
                }
            }
        }
    }
    // Cursed/blessed apply-on-entry is driven from phase 3's transition
    // hook via RunTracking::modifier_tick_times as an entry marker; dark
    // has no mechanical effect.
}

/// Phase 10: player auto-attacks against `target_id`, melee=60/ranged=300
/// range, 1.5s base cooldown.
fn phase_10_player_auto_attacks(world: &mut World, rng: &mut SeededRng, _delta_time: f32) {
    let attacks: Vec<(Entity, Entity, CasterSnapshot, bool)> = {
        let mut query = world.query::<(Entity, &Player, &PlayerCombatState)>();
        query
            .iter(world)
            .filter_map(|(entity, player, combat)| {
                if !player.is_alive || combat.attack_cooldown > 0.0 || combat.buffs.is_stunned() {
                    return None;
                }
                let target = player.target_id?;
                let is_ranged = matches!(player.class, crate::catalog::classes::ClassId::Hunter | crate::catalog::classes::ClassId::Mage);
                let range = if is_ranged { RANGED_AUTO_ATTACK_RANGE } else { MELEE_AUTO_ATTACK_RANGE };
                Some((
                    entity,
                    target,
                    CasterSnapshot {
                        attack_power: player.effective_stats.attack_power,
                        spell_power: player.effective_stats.spell_power,
                        crit: player.effective_stats.crit,
                        lifesteal: 0,
                        bloodlust_rank: None,
                    },
                    range > 0.0,
                ))
            })
            .collect()
    };

    for (source, target, caster, _) in attacks {
        let source_pos = world.get::<Player>(source).map(|p| p.position);
        let (target_pos, target_armor, target_resist, target_alive) = match world.get::<Enemy>(target) {
            Some(enemy) => (Some(enemy.position), enemy.stats.armor, enemy.stats.resist, enemy.is_alive),
            None => continue,
        };
        let (Some(source_pos), Some(target_pos)) = (source_pos, target_pos) else { continue };
        let is_ranged = world
            .get::<Player>(source)
            .map(|p| matches!(p.class, crate::catalog::classes::ClassId::Hunter | crate::catalog::classes::ClassId::Mage))
            .unwrap_or(false);
        let range = if is_ranged { RANGED_AUTO_ATTACK_RANGE } else { MELEE_AUTO_ATTACK_RANGE };
        if !target_alive || source_pos.distance(target_pos) > range {
            continue;
        }

        let mut stats = world.get::<Enemy>(target).map(|e| e.stats).unwrap_or_default();
        let crit_roll = rng.next_float(0.0, 100.0);
        let event = resolve_damage_hit(10.0, 1, caster, target_armor, target_resist, &mut stats, crit_roll);
        let mut newly_killed = false;
        if let Some(mut enemy) = world.get_mut::<Enemy>(target) {
            enemy.stats = stats;
            if enemy.stats.health <= 0 && enemy.is_alive {
                newly_killed = true;
                enemy.kill();
            }
        }
        if let Some(mut combat) = world.get_mut::<PlayerCombatState>(source) {
            combat.attack_cooldown = AUTO_ATTACK_COOLDOWN;
        }
        if let Some(mut player) = world.get_mut::<Player>(source) {
            apply_lifesteal_and_bloodlust(&event, caster, &mut player.effective_stats);
        }
        world.resource_mut::<CombatLog>().log(CombatLogEvent::Damage {
            source,
            target,
            damage: event.damage,
            is_crit: event.is_crit,
            blocked: event.blocked,
            ability: None,
            killed: event.killed,
        });
        if newly_killed {
            let (is_boss, is_rare, is_elite) = world.get::<Enemy>(target).map(|e| (e.is_boss, e.is_rare, e.is_elite)).unwrap_or_default();
            let floor = world.resource::<Run>().floor;
            let xp = xp_value_for_kill(floor, is_boss, is_rare, is_elite);
            if let Some(mut player) = world.get_mut::<Player>(source) {
                award_xp(&mut player, xp);
            }
        }
    }
}

/// Phase 11: enemy target acquisition/attacks, boss ability and AoE
/// tracks, elite telegraphed void zones.
fn phase_11_enemy_and_boss_ai(world: &mut World, rng: &mut SeededRng, delta_time: f32) {
    let players: Vec<(Entity, Vec2, bool, bool)> = world
        .query::<(Entity, &Player, &PlayerCombatState)>()
        .iter(world)
        .map(|(e, p, combat)| (e, p.position, p.is_alive, combat.buffs.has(IconId::RogueStealth) || combat.buffs.has(IconId::RogueVanish)))
        .collect();
    let alive_player_count = players.iter().filter(|(_, _, alive, _)| *alive).count().max(1);

    let enemy_entities: Vec<Entity> = world.query::<Entity>().iter(world).collect();
    let enemies_with_component: Vec<Entity> = world.query_filtered::<Entity, With<Enemy>>().iter(world).collect();
    let _ = enemy_entities;

    for enemy_entity in enemies_with_component {
        let (role, is_boss, is_elite, position, target_id, is_alive, was_patrolling, spawn_position, boss_id) = {
            let enemy = world.get::<Enemy>(enemy_entity).unwrap();
            (
                enemy.role,
                enemy.is_boss,
                enemy.is_elite,
                enemy.position,
                enemy.target_id,
                enemy.is_alive,
                enemy.was_patrolling,
                enemy.spawn_position,
                enemy.boss_id,
            )
        };
        if !is_alive || world.get::<Enemy>(enemy_entity).map(|e| e.buffs.is_stunned()).unwrap_or(false) {
            continue;
        }

        let candidates: Vec<(Vec2, f32)> = players
            .iter()
            .filter(|(_, _, alive, stealthed)| *alive && !*stealthed)
            .map(|(_, pos, _, _)| (*pos, pos.distance(position)))
            .collect();
        let had_target = target_id.is_some();
        let stagger_roll = rng.next_float(0.0, 0.5);
        let aggro = acquire_target(had_target, &candidates, stagger_roll);

        let nearest_player = players
            .iter()
            .filter(|(_, _, alive, stealthed)| *alive && !*stealthed)
            .min_by(|(_, a, _, _), (_, b, _, _)| position.distance(*a).total_cmp(&position.distance(*b)))
            .copied();

        let (mut tracking, mut enemy_mut) = (world.get::<EnemyTracking>(enemy_entity).cloned().unwrap_or_default(), world.get::<Enemy>(enemy_entity).unwrap().clone());

        match aggro {
            AggroResult::NoTarget => {
                let distance_from_spawn = position.distance(spawn_position);
                tracking.leash_timer += delta_time;
                if should_leash(is_boss, false, distance_from_spawn, tracking.leash_timer) {
                    enemy_mut.position = spawn_position;
                    enemy_mut.stats.health = enemy_mut.stats.max_health;
                    enemy_mut.current_room_id = enemy_mut.original_room_id;
                    tracking.leash_timer = 0.0;
                } else if !enemy_mut.is_patrolling() {
                    enemy_mut.position = idle_return_to_spawn(position, spawn_position, delta_time);
                }
            }
            AggroResult::Acquired { staggered_delay } => {
                if let Some((target_entity, _, _, _)) = nearest_player {
                    enemy_mut.target_id = Some(target_entity);
                    tracking.aggro_start = Some(-staggered_delay);
                }
                tracking.leash_timer = 0.0;
            }
            AggroResult::Retained => {
                tracking.leash_timer = 0.0;
            }
        }

        if let Some(target_entity) = enemy_mut.target_id {
            if let Some((_, target_pos, target_alive, _)) = players.iter().find(|(e, _, _, _)| *e == target_entity) {
                if *target_alive {
                    let distance = position.distance(*target_pos);
                    let room_rect = enemy_mut
                        .current_room_id;
                    let room_rect = world.get::<Room>(room_rect).map(|r| r.rect);
                    let los = room_rect
                        .map(|rect| in_line_of_sight(position, *target_pos, 2.5, &rect, |_| true))
                        .unwrap_or(true);

                    if let Some(aggro_start) = tracking.aggro_start.as_mut() {
                        *aggro_start += delta_time;
                        if los && can_attack(*aggro_start, was_patrolling, tracking.attack_cooldown) && distance <= 2.5 * 60.0 {
                            let caster = CasterSnapshot {
                                attack_power: enemy_mut.stats.attack_power,
                                spell_power: enemy_mut.stats.spell_power,
                                crit: 3,
                                lifesteal: 0,
                                bloodlust_rank: None,
                            };
                            tracking.attack_cooldown = 1.8;
                            let crit_roll = rng.next_float(0.0, 100.0);

                            let guard_state = world.get::<PlayerCombatState>(target_entity).map(|combat| {
                                (
                                    combat.buffs.has(IconId::RogueStealth) || combat.buffs.has(IconId::RogueVanish),
                                    combat.buffs.has(IconId::PaladinDivineShield),
                                    combat.buffs.has(IconId::PaladinBlessingOfProtection),
                                    combat.buffs.has(IconId::WarriorShieldWall),
                                    combat.buffs.has(IconId::PaladinDevotionAura),
                                    combat.buffs.find(IconId::PaladinRetributionAura).map(|b| b.rank),
                                    combat.buffs.has(IconId::ShamanAncestralSpirit),
                                )
                            });

                            if let Some((
                                target_stealthed,
                                target_ice_blocked,
                                target_protected,
                                has_shield_wall,
                                has_devotion_aura,
                                retribution_rank,
                                has_ancestral_spirit,
                            )) = guard_state
                            {
                                let guards = IncomingDamageGuards {
                                    target_stealthed,
                                    target_ice_blocked,
                                    target_protected_vs_physical: target_protected,
                                    attack_is_physical: true,
                                };

                                if !incoming_damage_rejected(guards) {
                                    let target_alive_now = world.get::<Player>(target_entity).map(|p| p.is_alive).unwrap_or(false);
                                    if target_alive_now {
                                        let pre_mitigation_health = world.get::<Player>(target_entity).map(|p| p.effective_stats.health).unwrap_or(0);
                                        let mut stats = world.get::<Player>(target_entity).map(|p| p.effective_stats).unwrap_or_default();
                                        let mut event = resolve_damage_hit(8.0, 1, caster, stats.armor, stats.resist, &mut stats, crit_roll);
                                        if has_shield_wall {
                                            apply_shield_wall(&mut event, &mut stats, pre_mitigation_health);
                                        }
                                        if let Some(mut target_player) = world.get_mut::<Player>(target_entity) {
                                            target_player.effective_stats = stats;
                                            if target_player.effective_stats.health == 0 {
                                                target_player.kill();
                                            }
                                        }
                                        world.resource_mut::<CombatLog>().log(CombatLogEvent::Damage {
                                            source: enemy_entity,
                                            target: target_entity,
                                            damage: event.damage,
                                            is_crit: event.is_crit,
                                            blocked: event.blocked,
                                            ability: None,
                                            killed: event.killed,
                                        });

                                        if has_devotion_aura {
                                            let retaliation = reflect_damage(event.damage, 20);
                                            enemy_mut.stats.health = (enemy_mut.stats.health - retaliation).max(0);
                                            if enemy_mut.stats.health == 0 {
                                                enemy_mut.kill();
                                            }
                                        }
                                        if let Some(rank) = retribution_rank {
                                            let retaliation = retribution_aura_reflect(rank);
                                            enemy_mut.stats.health = (enemy_mut.stats.health - retaliation).max(0);
                                            if enemy_mut.stats.health == 0 {
                                                enemy_mut.kill();
                                            }
                                        }
                                        if has_ancestral_spirit {
                                            if let Some(mut combat) = world.get_mut::<PlayerCombatState>(target_entity) {
                                                combat.buffs.remove(IconId::ShamanAncestralSpirit);
                                            }
                                            if let Some(mut target_player) = world.get_mut::<Player>(target_entity) {
                                                if target_player.is_alive {
                                                    target_player.effective_stats.health =
                                                        (target_player.effective_stats.health + ANCESTRAL_SPIRIT_HEAL).min(target_player.effective_stats.max_health);
                                                }
                                            }
                                        }
                                    }
                                }
                            }
                        } else {
                            let decision = post_attack_movement(role, position, *target_pos, 5.0, delta_time);
                            enemy_mut.position = decision.position;
                        }
                    }

                    tracking.attack_cooldown = (tracking.attack_cooldown - delta_time).max(0.0);

                    let charge_decision = decide_charge(
                        role,
                        is_boss,
                        tracking.is_charging,
                        tracking.charge_elapsed,
                        *target_alive,
                        distance,
                        2.5,
                        rng.next_f32(),
                    );
                    match charge_decision {
                        ChargeDecision::Start => {
                            tracking.is_charging = true;
                            tracking.charge_elapsed = 0.0;
                            tracking.charge_target = Some(*target_pos);
                        }
                        ChargeDecision::Impact | ChargeDecision::Abort => {
                            tracking.is_charging = false;
                            tracking.charge_elapsed = 0.0;
                            tracking.charge_target = None;
                        }
                        ChargeDecision::None => {
                            if tracking.is_charging {
                                tracking.charge_elapsed += delta_time;
                                if let Some(charge_target) = tracking.charge_target {
                                    enemy_mut.position = crate::ai::pathing::step_toward(position, charge_target, 600.0, delta_time);
                                }
                            }
                        }
                    }
                }
            }
        }

        if is_boss {
            run_boss_abilities(world, enemy_entity, rng, delta_time);
        } else if is_elite {
            run_elite_void_zone(world, enemy_entity, delta_time);
        }

        let _ = alive_player_count;
        world.entity_mut(enemy_entity).insert((enemy_mut, tracking));
    }
}

/// Boss ability-track and AoE-track advance, implemented with a resource
/// keyed by the boss entity rather than storing the tracks on `Enemy`
/// itself — bosses are rare enough per Run that a small side-table is
/// simpler than widening every `Enemy` with two mostly-unused fields.
#[derive(Resource, Default)]
pub struct BossCooldownTracks {
    pub abilities: std::collections::HashMap<Entity, BossAbilityTrack>,
    pub aoe: std::collections::HashMap<Entity, BossAoeTrack>,
    pub elite_void: std::collections::HashMap<Entity, f32>,
}

fn run_boss_abilities(world: &mut World, boss_entity: Entity, rng: &mut SeededRng, delta_time: f32) {
    let (boss_id, floor, position) = {
        let enemy = world.get::<Enemy>(boss_entity).unwrap();
        (enemy.boss_id, world.resource::<Run>().floor, enemy.position)
    };
    let Some(boss_id) = boss_id else { return };

    let mut tracks = world.remove_resource::<BossCooldownTracks>().unwrap_or_default();
    let ability_track = tracks.abilities.entry(boss_entity).or_insert_with(|| BossAbilityTrack::new(boss_id, floor));
    if let Some(idx) = ability_track.advance_and_pick_ready(delta_time) {
        let ability = ability_track.abilities[idx];
        world.resource_mut::<CombatLog>().log(CombatLogEvent::AbilityUsed {
            source: boss_entity,
            ability,
        });
    }

    let aoe_track = tracks
        .aoe
        .entry(boss_entity)
        .or_insert_with(|| BossAoeTrack::new(rng.next_float(6.0, 8.0), floor));
    aoe_track.floor = floor;
    if aoe_track.advance(delta_time) {
        let kind = boss_id.aoe_kind();
        spawn_ground_effect(world, kind, position, boss_entity, floor);
    }
    world.insert_resource(tracks);
}

fn run_elite_void_zone(world: &mut World, enemy_entity: Entity, delta_time: f32) {
    let position = world.get::<Enemy>(enemy_entity).map(|e| e.position).unwrap_or(Vec2::ZERO);
    let mut tracks = world.remove_resource::<BossCooldownTracks>().unwrap_or_default();
    let cooldown = tracks.elite_void.entry(enemy_entity).or_insert(ELITE_VOID_ZONE_COOLDOWN);
    *cooldown -= delta_time;
    if *cooldown <= 0.0 {
        *cooldown = ELITE_VOID_ZONE_COOLDOWN;
        spawn_ground_effect(world, GroundEffectType::VoidZone, position, enemy_entity, 1);
    }
    world.insert_resource(tracks);
}

fn spawn_ground_effect(world: &mut World, kind: GroundEffectType, position: Vec2, source: Entity, floor: u32) {
    let damage = 10 + floor as i32 * 2;
    let duration = match kind {
        GroundEffectType::MovingWave => 6.0,
        _ => 8.0,
    };
    let mut effect = GroundEffect::new(kind, position, damage, duration, source);
    if kind == GroundEffectType::MovingWave {
        effect = effect.with_direction(Vec2::X, 120.0);
    }
    world.spawn(effect);
}

/// Phase 12: DoT ticking on enemies (players tick in phase 1 alongside
/// their own cooldowns, mirroring the reference's player-buff update).
fn phase_12_dot_ticking(world: &mut World, delta_time: f32) {
    let mut events = Vec::new();
    let mut query = world.query::<(Entity, &mut Enemy)>();
    for (entity, mut enemy) in query.iter_mut(world) {
        if !enemy.is_alive {
            continue;
        }
        let (expired, dot_ticks) = enemy.buffs.advance(delta_time);
        for (icon, damage) in dot_ticks {
            let mitigated = crate::entities::stats::mitigate(damage as f32, enemy.stats.resist);
            enemy.stats.health = (enemy.stats.health - mitigated).max(0);
            events.push(CombatLogEvent::Damage {
                source: entity,
                target: entity,
                damage: mitigated,
                is_crit: false,
                blocked: 0,
                ability: None,
                killed: enemy.stats.health <= 0,
            });
            let _ = icon;
        }
        if enemy.stats.health <= 0 {
            enemy.kill();
        }
        for icon in expired {
            world.resource_mut::<CombatLog>().log(CombatLogEvent::AuraRemoved { target: entity, icon });
        }
    }
    for event in events {
        world.resource_mut::<CombatLog>().log(event);
    }
}

/// Phase 13: taunt-all-in-range every 5s; attack nearest enemy within
/// range every 1.5s.
fn phase_13_pet_ai(world: &mut World, delta_time: f32) {
    let enemies: Vec<(Entity, Vec2, bool)> = world.query::<(Entity, &Enemy)>().iter(world).map(|(e, en)| (e, en.position, en.is_alive)).collect();

    let mut query = world.query::<&mut Pet>();
    for mut pet in query.iter_mut(world) {
        pet.taunt_cooldown = (pet.taunt_cooldown - delta_time).max(0.0);
        pet.attack_cooldown = (pet.attack_cooldown - delta_time).max(0.0);

        if decide_taunt(pet.kind, pet.taunt_cooldown) {
            pet.taunt_cooldown = PET_TAUNT_INTERVAL;
        }

        let nearest = enemies
            .iter()
            .filter(|(_, _, alive)| *alive)
            .map(|(_, pos, _)| pos.distance(pet.position))
            .fold(None, |acc: Option<f32>, d| Some(acc.map_or(d, |a| a.min(d))));

        if decide_attack(pet.kind, pet.attack_cooldown, nearest) == PetAction::Attack {
            pet.attack_cooldown = PET_ATTACK_INTERVAL;
        }
    }
}

/// Phase 14: if every enemy in a room is dead, mark it cleared; a boss
/// death additionally grants loot with a kill-time bonus and emits
/// "boss defeated".
fn phase_14_room_clear_check(world: &mut World, rng: &mut SeededRng) {
    let rooms: Vec<(Entity, Room)> = world.query::<(Entity, &Room)>().iter(world).map(|(e, r)| (e, r.clone())).collect();
    let floor = world.resource::<Run>().floor;
    for (room_entity, room) in rooms {
        let all_dead = room
            .enemies
            .iter()
            .all(|&e| world.get::<Enemy>(e).map(|en| !en.is_alive).unwrap_or(true));
        if all_dead && !room.cleared {
            if let Some(mut room_mut) = world.get_mut::<Room>(room_entity) {
                room_mut.cleared = true;
            }
            let boss_died = room
                .enemies
                .iter()
                .any(|&e| world.get::<Enemy>(e).map(|en| en.is_boss).unwrap_or(false));
            if boss_died {
                world.resource_mut::<Dungeon>().boss_defeated = true;
                let start_time = world.resource::<RunTracking>().boss_fight_start.get(&room_entity).copied().unwrap_or(0.0);
                let elapsed = world.resource::<CombatLog>().tick_time - start_time;
                let bonus = kill_time_bonus(elapsed.max(0.0));
                world.resource_mut::<CombatLog>().log(CombatLogEvent::BossPhaseChange { boss: room_entity });

                let seed = world.resource::<Run>().seed.clone();
                let mut loot_rng = crate::rng::create_loot_rng(&seed, floor, "boss");
                let entry = crate::loot::drops::DropTableEntry {
                    base_chance: 0.9,
                    base_stats: crate::catalog::items::ItemStats {
                        attack_power: 4,
                        ..Default::default()
                    },
                };
                if let Some((stats, rarity)) = crate::loot::drops::roll_drop(&mut loot_rng, entry, bonus) {
                    world.resource_mut::<Run>().pending_loot.push(crate::entities::run::PendingLoot {
                        room: room_entity,
                        stats,
                        rarity,
                    });
                    world.resource_mut::<CombatLog>().log(CombatLogEvent::LootDrop { room: room_entity });
                }
                let _ = rng;
            }
        }
    }
}

/// Phase 15: advance ground effects and apply their damage/pull.
fn phase_15_ground_effects(world: &mut World, delta_time: f32) {
    let mut expired = Vec::new();
    let effects: Vec<(Entity, GroundEffect)> = world.query::<(Entity, &mut GroundEffect)>().iter_mut(world).map(|(e, mut ge)| {
        ge.advance(delta_time);
        (e, ge.clone())
    }).collect();

    world.resource_scope(|world, mut tracking: Mut<RunTracking>| {
        let mut query = world.query::<(Entity, &mut Player)>();
        for (entity, mut player) in query.iter_mut(world) {
            if !player.is_alive {
                continue;
            }
            for (effect_entity, effect) in &effects {
                if effect.kind == GroundEffectType::GravityWell {
                    let pull = effect.pull_strength(player.position);
                    let toward = (effect.position - player.position).normalize_or_zero();
                    player.position += toward * pull * GRAVITY_WELL_PER_TICK_FRACTION;
                    continue;
                }
                if !effect.contains(player.position) {
                    continue;
                }
                let key = (entity, *effect_entity);
                let timer = tracking.ground_effect_tick_times.entry(key).or_insert(0.0);
                *timer += delta_time;
                if *timer >= effect.tick_interval {
                    *timer -= effect.tick_interval;
                    player.effective_stats.health = (player.effective_stats.health - effect.damage).max(0);
                    if player.effective_stats.health == 0 {
                        player.kill();
                    }
                }
            }
        }
    });

    for (entity, effect) in world.query::<(Entity, &GroundEffect)>().iter(world) {
        if effect.is_expired() {
            expired.push(entity);
        }
    }
    for entity in expired {
        world.despawn(entity);
    }
}

/// Phase 16: non-totem pets follow their owner when far away.
fn phase_16_pet_follow(world: &mut World, delta_time: f32) {
    let owner_positions: std::collections::HashMap<Entity, Vec2> = world.query::<(Entity, &Player)>().iter(world).map(|(e, p)| (e, p.position)).collect();
    let mut query = world.query::<&mut Pet>();
    for mut pet in query.iter_mut(world) {
        let Some(&owner_pos) = owner_positions.get(&pet.owner) else { continue };
        if should_follow_owner(pet.kind, pet.position, owner_pos) {
            pet.position = crate::ai::pathing::step_toward(pet.position, owner_pos, 260.0, delta_time);
        }
    }
}

/// Phase 17: respawn dead players after `RESPAWN_DELAY`, unless a
/// Soulstone buff makes them respawn in place at full resources.
fn phase_17_respawn_dead_players(world: &mut World, delta_time: f32) {
    let start_room_center = {
        let dungeon = world.resource::<Dungeon>();
        dungeon
            .rooms
            .iter()
            .find_map(|&r| world.get::<Room>(r).filter(|room| room.room_type == RoomType::Start).map(|room| room.rect.center()))
            .unwrap_or(Vec2::ZERO)
    };

    let mut respawned: Vec<(Entity, Vec2)> = Vec::new();
    {
        let mut query = world.query::<(Entity, &mut Player, &mut PlayerCombatState)>();
        for (entity, mut player, mut combat) in query.iter_mut(world) {
            if player.is_alive {
                continue;
            }
            let Some(death_time) = combat.death_time.as_mut() else { continue };
            *death_time += delta_time;

            let has_soulstone = combat.buffs.has(IconId::WarlockSoulstone);
            if has_soulstone {
                combat.buffs.remove(IconId::WarlockSoulstone);
                player.effective_stats.health = player.effective_stats.max_health;
                player.effective_stats.mana = player.effective_stats.max_mana / 2;
                player.is_alive = true;
                combat.death_time = None;
                respawned.push((entity, player.position));
                continue;
            }

            if *death_time >= RESPAWN_DELAY {
                player.is_alive = true;
                player.position = start_room_center;
                player.effective_stats.health = player.effective_stats.max_health;
                player.effective_stats.mana = player.effective_stats.max_mana;
                combat.death_time = None;
                respawned.push((entity, start_room_center));
            }
        }
    }

    for (_, respawn_position) in &respawned {
        let enemy_entities: Vec<Entity> = world.query::<Entity>().iter(world).collect();
        let _ = enemy_entities;
        let mut enemy_query = world.query::<&mut Enemy>();
        for mut enemy in enemy_query.iter_mut(world) {
            enemy.target_id = None;
            if enemy.current_room_id != enemy.original_room_id {
                enemy.current_room_id = enemy.original_room_id;
            }
        }
        let purge: Vec<Entity> = world
            .query::<(Entity, &GroundEffect)>()
            .iter(world)
            .filter(|(_, ge)| ge.position.distance(*respawn_position) <= RESPAWN_GROUND_EFFECT_PURGE_RADIUS)
            .map(|(e, _)| e)
            .collect();
        for entity in purge {
            world.despawn(entity);
        }
    }
    if !respawned.is_empty() {
        let mut tracking = world.resource_mut::<RunTracking>();
        tracking.boss_fight_start.clear();
    }
}
