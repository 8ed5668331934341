//! Task-per-Run async driver (§5.1).
//!
//! One `tokio::spawn` per Run exclusively owns its `World`: it drains
//! queued intents off a bounded `mpsc` channel at the top of each tick,
//! steps [`super::scheduler::run_tick`] synchronously, then pushes emitted
//! events onto an outbound channel for the transport layer. A
//! `DungeonError::RunFault` raised anywhere in a tick is caught here,
//! logged, and ends only this Run — the registry removes the entry and
//! the task exits, exactly as a client-initiated destroy would.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use bevy_ecs::prelude::*;
use glam::Vec2;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

use crate::catalog::abilities::{AbilityId, AppliedAura, IconId};
use crate::catalog::classes::ClassId;
use crate::combat::log::{CombatLog, CombatLogEvent};
use crate::combat::resolver::{apply_stat_modifiers, CasterSnapshot};
use crate::dungeon::chest::Chest;
use crate::dungeon::room::Room;
use crate::entities::buff::{ActiveBuffs, Buff};
use crate::entities::player::{Player, PlayerCombatState};
use crate::entities::run::{Run, RunTracking};
use crate::entities::stats::Stats;
use crate::error::{DungeonError, DungeonResult};
use crate::loot::vendor::{resolve_purchase, sell_price, train_ability_price, Vendor, VendorKind, VendorServiceRequest};
use crate::net::delta::{plan_broadcast, BroadcastPlan, ClientSyncState};
use crate::net::events::ServerEvent;
use crate::net::intents::{ClientIntent, PICKUP_GROUND_ITEM_DISTANCE};
use crate::registry::{PlayerId, RunId, RunRegistry, TaggedIntent, RUN_INTENT_CHANNEL_CAPACITY};
use crate::rng::SeededRng;

/// "Sub-100ms" fixed cadence (§5.1); 20 ticks per second.
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(50);

/// What a caller holds after spawning a Run's task: the sender half of its
/// intent queue and a join handle for orderly shutdown.
pub struct RunTaskHandle {
    pub intent_tx: mpsc::Sender<TaggedIntent>,
    pub join: tokio::task::JoinHandle<()>,
}

/// Spawns the Run's task, registers it with `registry`, and returns the
/// handle. `event_tx` is the outbound channel the transport layer reads
/// from to broadcast `ServerEvent`s to subscribed clients.
pub fn spawn_run_task(
    run_id: RunId,
    mut world: World,
    mut rng: SeededRng,
    registry: Arc<RunRegistry>,
    event_tx: mpsc::Sender<(RunId, ServerEvent)>,
    tick_interval: Duration,
) -> RunTaskHandle {
    let (intent_tx, mut intent_rx) = mpsc::channel(RUN_INTENT_CHANNEL_CAPACITY);
    let registered_tx = intent_tx.clone();

    let join = tokio::spawn(async move {
        registry.register_run(run_id, registered_tx).await;
        info!(?run_id, "run task started");

        let mut players: HashMap<PlayerId, Entity> = HashMap::new();
        let mut sync_state: HashMap<PlayerId, ClientSyncState> = HashMap::new();
        let mut ticker = tokio::time::interval(tick_interval);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    match run_one_tick(&mut world, &mut rng, tick_interval.as_secs_f32()) {
                        Ok(()) => broadcast_events(&world, &players, &mut sync_state, &event_tx, run_id).await,
                        Err(fault) => {
                            error!(?run_id, %fault, "run fault, tearing down this run");
                            break;
                        }
                    }
                }
                maybe_intent = intent_rx.recv() => {
                    match maybe_intent {
                        Some(tagged) => {
                            if let Err(fault) = apply_intent(&mut world, &mut rng, &mut players, &mut sync_state, &event_tx, run_id, tagged) {
                                warn!(?run_id, %fault, "dropping intent");
                            }
                        }
                        None => {
                            info!(?run_id, "all senders dropped, ending run");
                            break;
                        }
                    }
                }
            }
        }

        registry.remove_run(run_id).await;
        info!(?run_id, "run task ended");
    });

    RunTaskHandle { intent_tx, join }
}

fn run_one_tick(world: &mut World, rng: &mut SeededRng, delta_time: f32) -> DungeonResult<()> {
    std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        super::scheduler::run_tick(world, rng, delta_time);
    }))
    .map_err(|_| DungeonError::RunFault("tick panicked".to_string()))
}

async fn broadcast_events(
    world: &World,
    players: &HashMap<PlayerId, Entity>,
    sync_state: &mut HashMap<PlayerId, ClientSyncState>,
    event_tx: &mpsc::Sender<(RunId, ServerEvent)>,
    run_id: RunId,
) {
    let room_fingerprints: HashMap<Entity, u64> = world
        .iter_entities()
        .filter_map(|e| world.get::<Room>(e.id()).map(|r| (e.id(), room_fingerprint(r))))
        .collect();
    let entity_fingerprints: HashMap<Entity, u64> = world
        .iter_entities()
        .filter_map(|e| world.get::<Player>(e.id()).map(|p| (e.id(), player_fingerprint(p))))
        .collect();

    for (player_id, _entity) in players {
        let state = sync_state.entry(*player_id).or_insert_with(ClientSyncState::default);
        let plan = plan_broadcast(state, &room_fingerprints, &entity_fingerprints);
        let event = match plan {
            BroadcastPlan::FullSnapshot => ServerEvent::StateUpdate,
            BroadcastPlan::Delta { .. } => ServerEvent::DeltaUpdate,
        };
        let _ = event_tx.send((run_id, event)).await;
    }

    let log = world.resource::<CombatLog>();
    for entry in log.recent(32) {
        let _ = entry;
    }
}

fn room_fingerprint(room: &Room) -> u64 {
    use std::hash::{Hash, Hasher};
    let mut hasher = std::collections::hash_map::DefaultHasher::new();
    room.cleared.hash(&mut hasher);
    room.enemies.len().hash(&mut hasher);
    hasher.finish()
}

fn player_fingerprint(player: &Player) -> u64 {
    use std::hash::{Hash, Hasher};
    let mut hasher = std::collections::hash_map::DefaultHasher::new();
    player.position.x.to_bits().hash(&mut hasher);
    player.position.y.to_bits().hash(&mut hasher);
    player.effective_stats.health.hash(&mut hasher);
    player.is_alive.hash(&mut hasher);
    hasher.finish()
}

/// Dispatches one decoded, already ID-resolved [`ClientIntent`] against
/// the Run's `World` (§6). `CreateRun`/`CreateRunFromSave` spawn a new
/// player entity and bind it to `player`; everything else looks the
/// existing entity up and mutates it directly.
fn apply_intent(
    world: &mut World,
    rng: &mut SeededRng,
    players: &mut HashMap<PlayerId, Entity>,
    sync_state: &mut HashMap<PlayerId, ClientSyncState>,
    event_tx: &mpsc::Sender<(RunId, ServerEvent)>,
    run_id: RunId,
    tagged: TaggedIntent,
) -> DungeonResult<()> {
    let TaggedIntent { player, intent } = tagged;

    match intent {
        ClientIntent::CreateRun { player_name, class } => {
            let start_room = world.resource::<crate::dungeon::Dungeon>().current_room_id;
            let _ = start_room;
            let entity = world.spawn((Player::new(player_name, class, Vec2::ZERO), PlayerCombatState::default())).id();
            players.insert(player, entity);
            sync_state.insert(player, ClientSyncState::joined());
            Ok(())
        }
        ClientIntent::CreateRunFromSave { save } => {
            crate::input::validation::validate_save_data(&save)?;
            let class = ClassId::from_str(&save.class_id).ok_or_else(|| DungeonError::Validation("unknown class".to_string()))?;
            let mut new_player = Player::new(save.name, class, Vec2::ZERO);
            new_player.level = save.level;
            new_player.gold = save.gold;
            new_player.xp = save.xp as u32;
            new_player.lives_remaining = save.lives;
            world.resource_mut::<Run>().floor = save.floor;
            let entity = world.spawn((new_player, PlayerCombatState::default())).id();
            players.insert(player, entity);
            sync_state.insert(player, ClientSyncState::joined());
            Ok(())
        }
        ClientIntent::PlayerInput { move_x, move_y, cast_ability, target_id, target_position } => {
            let entity = resolve_player(players, player)?;
            world.resource_mut::<RunTracking>().movement_intent.insert(entity, Vec2::new(move_x, move_y));
            if let Some(target) = target_id {
                if let Some(mut p) = world.get_mut::<Player>(entity) {
                    p.target_id = Some(target);
                }
            }
            if let Some(ability) = cast_ability {
                cast_player_ability(world, rng, entity, ability);
            }
            let _ = target_position;
            Ok(())
        }
        ClientIntent::SetTarget { target_id } => {
            let entity = resolve_player(players, player)?;
            if let Some(mut p) = world.get_mut::<Player>(entity) {
                p.target_id = target_id;
            }
            Ok(())
        }
        ClientIntent::AdvanceFloor => {
            let entity = resolve_player(players, player)?;
            let _ = entity;
            for (_, state) in sync_state.iter_mut() {
                state.on_floor_change();
            }
            Ok(())
        }
        ClientIntent::UseItem { item_id } => {
            let _ = (resolve_player(players, player)?, item_id);
            Ok(())
        }
        ClientIntent::SwapEquipment { backpack_index, slot } => {
            let entity = resolve_player(players, player)?;
            let mut p = world.get_mut::<Player>(entity).ok_or_else(|| DungeonError::Validation("no such player".to_string()))?;
            if backpack_index >= p.backpack.len() {
                return Err(DungeonError::Validation("backpack index out of range".to_string()));
            }
            let item = p.backpack.remove(backpack_index);
            p.equip(slot, item).map_err(|e| DungeonError::Validation(e.to_string()))?;
            Ok(())
        }
        ClientIntent::UnequipItem { slot } => {
            let entity = resolve_player(players, player)?;
            let mut p = world.get_mut::<Player>(entity).ok_or_else(|| DungeonError::Validation("no such player".to_string()))?;
            let idx = slot as usize;
            if let Some(item) = p.equipment[idx].take() {
                p.backpack.push(item);
            }
            Ok(())
        }
        ClientIntent::InteractVendor { vendor_id } => {
            let _ = (resolve_player(players, player)?, world.get::<Vendor>(vendor_id));
            Ok(())
        }
        ClientIntent::PurchaseService { vendor_id, service_type, ability_id, item_id } => {
            apply_purchase(world, players, player, vendor_id, service_type, ability_id, item_id)
        }
        ClientIntent::PickupGroundItem { item_id } => {
            apply_pickup_ground_item(world, players, player, event_tx, run_id, item_id)
        }
        ClientIntent::OpenChest { chest_id } => apply_open_chest(world, rng, players, player, event_tx, run_id, chest_id),
        ClientIntent::Ping => Ok(()),
    }
}

fn apply_pickup_ground_item(
    world: &mut World,
    players: &HashMap<PlayerId, Entity>,
    player: PlayerId,
    event_tx: &mpsc::Sender<(RunId, ServerEvent)>,
    run_id: RunId,
    item_id: Entity,
) -> DungeonResult<()> {
    let entity = resolve_player(players, player)?;
    let pos = world.get::<Player>(entity).map(|p| p.position).unwrap_or(Vec2::ZERO);
    let ground_item = world
        .get::<crate::entities::ground_item::GroundItem>(item_id)
        .cloned()
        .ok_or_else(|| DungeonError::Validation("no such ground item".to_string()))?;
    if pos.distance(ground_item.position) > PICKUP_GROUND_ITEM_DISTANCE {
        return Err(DungeonError::Validation("too far from item".to_string()));
    }

    let item = crate::catalog::items::ItemDefinition {
        name: "Ground Item",
        slot: ground_item.slot,
        base_stats: ground_item.stats,
        set: None,
    };
    let collected = {
        let mut p = world.get_mut::<Player>(entity).ok_or_else(|| DungeonError::Validation("no such player".to_string()))?;
        crate::loot::progression::auto_equip_or_stash(&mut p, item)
    };
    if !collected {
        return Err(DungeonError::Validation("backpack full".to_string()));
    }

    world.despawn(item_id);
    if let Some(mut room) = world.get_mut::<Room>(ground_item.room) {
        room.ground_items.retain(|&e| e != item_id);
    }
    let _ = event_tx.try_send((run_id, ServerEvent::ItemCollected { player_id: entity, item_id }));
    Ok(())
}

fn apply_open_chest(
    world: &mut World,
    rng: &mut SeededRng,
    players: &HashMap<PlayerId, Entity>,
    player: PlayerId,
    event_tx: &mpsc::Sender<(RunId, ServerEvent)>,
    run_id: RunId,
    chest_id: Entity,
) -> DungeonResult<()> {
    let entity = resolve_player(players, player)?;
    let pos = world.get::<Player>(entity).map(|p| p.position).unwrap_or(Vec2::ZERO);

    let (chest_position, loot_tier, is_mimic) = {
        let mut chest = world.get_mut::<Chest>(chest_id).ok_or_else(|| DungeonError::Validation("no such chest".to_string()))?;
        if pos.distance(chest.position) > crate::net::intents::OPEN_CHEST_DISTANCE {
            return Err(DungeonError::Validation("too far from chest".to_string()));
        }
        if chest.is_open {
            return Err(DungeonError::Validation("chest already open".to_string()));
        }
        chest.is_open = true;
        (chest.position, chest.loot_tier, chest.is_mimic)
    };

    let owning_room = world.query::<(Entity, &Room)>().iter(world).find(|(_, r)| r.chests.contains(&chest_id)).map(|(e, _)| e);

    if is_mimic {
        if let Some(room_entity) = owning_room {
            spawn_mimic_enemy(world, room_entity, chest_position);
        }
        let _ = event_tx.try_send((run_id, ServerEvent::ChestOpened { chest_id, position: chest_position, is_mimic: true }));
        return Ok(());
    }

    let is_boss_room = owning_room
        .and_then(|r| world.get::<Room>(r).map(|room| room.room_type == crate::dungeon::room::RoomType::Boss))
        .unwrap_or(false);
    if is_boss_room {
        let run = world.resource::<Run>();
        let claim = crate::reward_oracle::RewardClaim {
            run_seed: run.seed.clone(),
            floor: run.floor,
            chest_id: chest_id.index() as u64,
        };
        let oracle = crate::reward_oracle::NullRewardOracle;
        if let Ok(payload) = crate::reward_oracle::RewardOracle::submit_claim(&oracle, &claim) {
            let _ = event_tx.try_send((run_id, ServerEvent::RewardOracle { payload }));
        }
        let _ = event_tx.try_send((run_id, ServerEvent::ChestOpened { chest_id, position: chest_position, is_mimic: false }));
        return Ok(());
    }

    let floor = world.resource::<Run>().floor;
    let (stats, _rarity, slot) = crate::loot::drops::roll_chest_loot(rng, loot_tier, floor);
    let item = crate::catalog::items::ItemDefinition { name: "Chest Loot", slot, base_stats: stats, set: None };
    let collected = {
        let mut p = world.get_mut::<Player>(entity).ok_or_else(|| DungeonError::Validation("no such player".to_string()))?;
        crate::loot::progression::auto_equip_or_stash(&mut p, item)
    };
    if collected {
        let _ = event_tx.try_send((run_id, ServerEvent::ItemCollected { player_id: entity, item_id: chest_id }));
    }
    let _ = event_tx.try_send((run_id, ServerEvent::ChestOpened { chest_id, position: chest_position, is_mimic: false }));
    Ok(())
}

fn spawn_mimic_enemy(world: &mut World, room_entity: Entity, position: Vec2) {
    let floor = world.resource::<Run>().floor;
    let avg_item_power = world.resource::<Run>().avg_item_power;
    let template = crate::catalog::enemies::EnemyId::TreasureGoblin.template();
    let scaled = crate::catalog::leveling::scale_enemy_stats(template.stats, floor, 1, avg_item_power);
    let stats = crate::entities::stats::Stats {
        max_health: scaled.max_health,
        health: scaled.max_health,
        max_mana: 0,
        mana: 0,
        armor: scaled.armor,
        resist: scaled.resist,
        attack_power: scaled.attack_power,
        spell_power: scaled.spell_power,
        crit: 3,
        speed: 6.0,
    };
    let mut enemy = crate::entities::enemy::Enemy::new(crate::catalog::enemies::EnemyId::TreasureGoblin, stats, position, room_entity);
    enemy.is_rare = true;
    let enemy_id = world.spawn((enemy, crate::entities::enemy::EnemyTracking::default())).id();
    if let Some(mut room) = world.get_mut::<Room>(room_entity) {
        room.enemies.push(enemy_id);
        room.cleared = false;
    }
}

fn resolve_player(players: &HashMap<PlayerId, Entity>, player: PlayerId) -> DungeonResult<Entity> {
    players.get(&player).copied().ok_or_else(|| DungeonError::Validation("unknown player".to_string()))
}

fn apply_aura(buffs: &mut ActiveBuffs, stats: &mut Stats, aura: AppliedAura, rank: u8, is_debuff: bool) {
    let mut buff = Buff::new(aura.icon, aura.base_duration, is_debuff);
    buff.rank = rank;
    buff.is_stun = aura.is_stun;
    buff.damage_per_tick = aura.damage_per_tick;
    buff.tick_interval = aura.tick_interval;
    let delta = buffs.apply(buff);
    apply_stat_modifiers(stats, delta.removed.negate());
    apply_stat_modifiers(stats, delta.added);
}

fn enemies_in_range(world: &World, room: Entity, origin: Vec2, range: f32) -> Vec<Entity> {
    world
        .get::<Room>(room)
        .map(|r| {
            r.enemies
                .iter()
                .copied()
                .filter(|&e| world.get::<crate::entities::enemy::Enemy>(e).map(|enemy| enemy.is_alive && enemy.position.distance(origin) <= range).unwrap_or(false))
                .collect()
        })
        .unwrap_or_default()
}

/// Dispatches a resolved ability cast (§4.4): applies the ability-type
/// switch (damage/AoE/heal/buff/debuff/summon/utility), the four named
/// combos, and any `AppliedAura` onto the right target.
fn cast_player_ability(world: &mut World, rng: &mut SeededRng, caster: Entity, ability: AbilityId) {
    use crate::catalog::abilities::AbilityKind;
    use crate::combat::combos::{
        blaze_pyroblast_spreads_stun, crusader_strike_judgment_combo, fireball_pyroblast_combo, has_hellfire_burn, has_judgment_stun, has_pyroblast_stun,
        has_stealth, sinister_strike_from_stealth, HELLFIRE_SECONDARY_PERCENT,
    };
    use crate::combat::resolver::{apply_lifesteal_and_bloodlust, check_cast_preconditions, resolve_damage_hit, resolve_heal, CastOutcome};
    use crate::entities::enemy::{Enemy, EnemyTracking};
    use crate::entities::pet::{Pet, PetType};

    let Some((def, known, cooldown_remaining, mana, rank, caster_position, caster_target)) = world.get::<Player>(caster).map(|p| {
        let progress = p.abilities.iter().find(|a| a.ability == ability);
        (
            ability.definition(),
            progress.is_some(),
            progress.map(|a| a.cooldown_remaining).unwrap_or(0.0),
            p.effective_stats.mana,
            progress.map(|a| a.rank).unwrap_or(1),
            p.position,
            p.target_id,
        )
    }) else {
        return;
    };

    if check_cast_preconditions(known, cooldown_remaining, mana, def.mana_cost) == CastOutcome::NoOp {
        return;
    }

    if let Some(mut p) = world.get_mut::<Player>(caster) {
        p.effective_stats.mana -= def.mana_cost as i32;
        if let Some(progress) = p.abilities.iter_mut().find(|a| a.ability == ability) {
            progress.cooldown_remaining = def.cooldown;
        }
    }

    let Some(caster_snapshot) = world.get::<Player>(caster).map(|p| CasterSnapshot {
        attack_power: p.effective_stats.attack_power,
        spell_power: p.effective_stats.spell_power,
        crit: p.effective_stats.crit,
        lifesteal: 0,
        bloodlust_rank: None,
    }) else {
        return;
    };

    let caster_icons: Vec<IconId> = world.get::<PlayerCombatState>(caster).map(|c| c.buffs.entries.iter().map(|b| b.icon).collect()).unwrap_or_default();
    let caster_is_stealthed = has_stealth(&caster_icons);

    match def.kind {
        AbilityKind::Damage => {
            let Some(target) = caster_target else { return };
            if !world.get::<Enemy>(target).map(|e| e.is_alive).unwrap_or(false) {
                return;
            }
            let target_icons: Vec<IconId> = world.get::<Enemy>(target).map(|e| e.buffs.entries.iter().map(|b| b.icon).collect()).unwrap_or_default();

            let (mut damage_multiplier, mut self_heal_percent) = (1.0, 0.0);
            match ability {
                AbilityId::MageFireball => damage_multiplier = fireball_pyroblast_combo(has_pyroblast_stun(&target_icons)),
                AbilityId::PaladinCrusaderStrike => {
                    let (mult, heal_pct) = crusader_strike_judgment_combo(has_judgment_stun(&target_icons));
                    damage_multiplier = mult;
                    self_heal_percent = heal_pct;
                }
                AbilityId::RogueStab => damage_multiplier = sinister_strike_from_stealth(caster_is_stealthed),
                _ => {}
            }

            let mut stats = world.get::<Enemy>(target).map(|e| e.stats).unwrap_or_default();
            let crit_roll = rng.next_float(0.0, 100.0);
            let event = resolve_damage_hit(def.base_damage * damage_multiplier, rank, caster_snapshot, stats.armor, stats.resist, &mut stats, crit_roll);
            if let Some(mut enemy) = world.get_mut::<Enemy>(target) {
                enemy.stats = stats;
                if enemy.stats.health <= 0 && enemy.is_alive {
                    enemy.kill();
                }
                if let Some(aura) = def.applies_aura {
                    apply_aura(&mut enemy.buffs, &mut enemy.stats, aura, rank, true);
                }
            }

            if ability == AbilityId::WarlockDrain {
                if let Some(mut p) = world.get_mut::<Player>(caster) {
                    apply_lifesteal_and_bloodlust(&event, CasterSnapshot { lifesteal: 50, ..caster_snapshot }, &mut p.effective_stats);
                }
            }
            if self_heal_percent > 0.0 {
                if let Some(mut p) = world.get_mut::<Player>(caster) {
                    let heal = (event.damage as f32 * self_heal_percent).round() as i32;
                    p.effective_stats.health = (p.effective_stats.health + heal).min(p.effective_stats.max_health);
                }
            }
            if ability == AbilityId::MageBlaze {
                if let Some(stun_duration) = blaze_pyroblast_spreads_stun(has_pyroblast_stun(&target_icons)) {
                    if let Some(room) = world.get::<Enemy>(target).map(|e| e.current_room_id) {
                        for other in enemies_in_range(world, room, caster_position, f32::MAX) {
                            if other == target {
                                continue;
                            }
                            if let Some(mut enemy) = world.get_mut::<Enemy>(other) {
                                let aura = AppliedAura { icon: IconId::MagePyroblastStun, base_duration: stun_duration, is_stun: true, damage_per_tick: 0.0, tick_interval: 0.0 };
                                apply_aura(&mut enemy.buffs, &mut enemy.stats, aura, rank, true);
                            }
                        }
                    }
                }
            }

            world.resource_mut::<CombatLog>().log(CombatLogEvent::Damage {
                source: caster,
                target,
                damage: event.damage,
                is_crit: event.is_crit,
                blocked: event.blocked,
                ability: Some(ability),
                killed: event.killed,
            });
        }
        AbilityKind::AoeDamage => {
            let origin = caster_target.and_then(|t| world.get::<Enemy>(t).map(|e| e.position)).unwrap_or(caster_position);
            let room = caster_target
                .and_then(|t| world.get::<Enemy>(t).map(|e| e.current_room_id))
                .or_else(|| world.query::<(Entity, &Room)>().iter(world).find(|(_, r)| r.rect.contains(caster_position)).map(|(e, _)| e));
            let Some(room) = room else { return };

            let crit_roll = rng.next_float(0.0, 100.0);
            for target in enemies_in_range(world, room, origin, def.range) {
                let mut stats = world.get::<Enemy>(target).map(|e| e.stats).unwrap_or_default();
                let event = resolve_damage_hit(def.base_damage, rank, caster_snapshot, stats.armor, stats.resist, &mut stats, crit_roll);
                if let Some(mut enemy) = world.get_mut::<Enemy>(target) {
                    enemy.stats = stats;
                    if enemy.stats.health <= 0 && enemy.is_alive {
                        enemy.kill();
                    }
                    if let Some(mut aura) = def.applies_aura {
                        if ability == AbilityId::WarlockHellfire {
                            let already_burning = has_hellfire_burn(&enemy.buffs.entries.iter().map(|b| b.icon).collect::<Vec<_>>());
                            aura.damage_per_tick = if already_burning {
                                enemy.buffs.find(aura.icon).map(|b| b.damage_per_tick).unwrap_or(aura.damage_per_tick)
                            } else {
                                (event.damage as f32 * HELLFIRE_SECONDARY_PERCENT / 4.0).max(1.0)
                            };
                        }
                        apply_aura(&mut enemy.buffs, &mut enemy.stats, aura, rank, true);
                    }
                }
                world.resource_mut::<CombatLog>().log(CombatLogEvent::Damage {
                    source: caster,
                    target,
                    damage: event.damage,
                    is_crit: event.is_crit,
                    blocked: event.blocked,
                    ability: Some(ability),
                    killed: event.killed,
                });
            }
        }
        AbilityKind::Heal => match caster_target {
            Some(t) if world.get::<Enemy>(t).map(|e| e.is_alive).unwrap_or(false) => {
                let mut stats = world.get::<Enemy>(t).map(|e| e.stats).unwrap_or_default();
                let crit_roll = rng.next_float(0.0, 100.0);
                let event = resolve_damage_hit(def.base_damage, rank, caster_snapshot, stats.armor, stats.resist, &mut stats, crit_roll);
                if let Some(mut enemy) = world.get_mut::<Enemy>(t) {
                    enemy.stats = stats;
                    if enemy.stats.health <= 0 && enemy.is_alive {
                        enemy.kill();
                    }
                }
                world.resource_mut::<CombatLog>().log(CombatLogEvent::Damage {
                    source: caster,
                    target: t,
                    damage: event.damage,
                    is_crit: event.is_crit,
                    blocked: event.blocked,
                    ability: Some(ability),
                    killed: event.killed,
                });
            }
            maybe_ally => {
                let heal_target = maybe_ally.filter(|&t| world.get::<Player>(t).map(|p| p.is_alive).unwrap_or(false)).unwrap_or(caster);
                if let Some(mut p) = world.get_mut::<Player>(heal_target) {
                    let mut stats = p.effective_stats;
                    let healed = resolve_heal(def.base_heal, rank, caster_snapshot.spell_power, &mut stats);
                    p.effective_stats = stats;
                    world.resource_mut::<CombatLog>().log(CombatLogEvent::Heal { source: caster, target: heal_target, amount: healed });
                }
            }
        },
        AbilityKind::Buff => {
            let Some(aura) = def.applies_aura else { return };
            let buff_target = if def.range > 0.0 {
                caster_target.filter(|&t| world.get::<Player>(t).map(|p| p.is_alive).unwrap_or(false)).unwrap_or(caster)
            } else {
                caster
            };
            let delta = world.get_mut::<PlayerCombatState>(buff_target).map(|mut combat| {
                let mut buff = Buff::new(aura.icon, aura.base_duration, false);
                buff.rank = rank;
                buff.is_stun = aura.is_stun;
                buff.damage_per_tick = aura.damage_per_tick;
                buff.tick_interval = aura.tick_interval;
                combat.buffs.apply(buff)
            });
            if let Some(delta) = delta {
                if let Some(mut p) = world.get_mut::<Player>(buff_target) {
                    apply_stat_modifiers(&mut p.effective_stats, delta.removed.negate());
                    apply_stat_modifiers(&mut p.effective_stats, delta.added);
                }
            }
            world.resource_mut::<CombatLog>().log(CombatLogEvent::AuraApplied { target: buff_target, icon: aura.icon });
        }
        AbilityKind::Debuff => {
            let Some(target) = caster_target else { return };
            if !world.get::<Enemy>(target).map(|e| e.is_alive).unwrap_or(false) {
                return;
            }
            if def.base_damage > 0.0 {
                let mut stats = world.get::<Enemy>(target).map(|e| e.stats).unwrap_or_default();
                let crit_roll = rng.next_float(0.0, 100.0);
                let event = resolve_damage_hit(def.base_damage, rank, caster_snapshot, stats.armor, stats.resist, &mut stats, crit_roll);
                if let Some(mut enemy) = world.get_mut::<Enemy>(target) {
                    enemy.stats = stats;
                    if enemy.stats.health <= 0 && enemy.is_alive {
                        enemy.kill();
                    }
                }
                world.resource_mut::<CombatLog>().log(CombatLogEvent::Damage {
                    source: caster,
                    target,
                    damage: event.damage,
                    is_crit: event.is_crit,
                    blocked: event.blocked,
                    ability: Some(ability),
                    killed: event.killed,
                });
            }
            if let Some(aura) = def.applies_aura {
                if let Some(mut enemy) = world.get_mut::<Enemy>(target) {
                    apply_aura(&mut enemy.buffs, &mut enemy.stats, aura, rank, true);
                }
                if aura.is_stun {
                    world.resource_mut::<CombatLog>().log(CombatLogEvent::CrowdControl { source: caster, target, duration: aura.base_duration });
                } else {
                    world.resource_mut::<CombatLog>().log(CombatLogEvent::AuraApplied { target, icon: aura.icon });
                }
            }
        }
        AbilityKind::Summon => {
            world.spawn(Pet::new(caster, PetType::Beast, caster_position));
        }
        AbilityKind::Utility => match ability {
            AbilityId::WarriorCharge => {
                if let Some(target_pos) = caster_target.and_then(|t| world.get::<Enemy>(t).map(|e| e.position)) {
                    if let Some(mut p) = world.get_mut::<Player>(caster) {
                        let direction = (target_pos - p.position).normalize_or_zero();
                        p.position = target_pos - direction * 2.5;
                    }
                }
            }
            AbilityId::RogueKick => {
                if let Some(target) = caster_target {
                    if let Some(mut tracking) = world.get_mut::<EnemyTracking>(target) {
                        tracking.attack_cooldown += def.lockout_duration;
                    }
                    world.resource_mut::<CombatLog>().log(CombatLogEvent::CrowdControl { source: caster, target, duration: def.lockout_duration });
                }
            }
            AbilityId::PriestDispelMagic | AbilityId::PaladinCleanse => {
                let dispel_target = caster_target.filter(|&t| world.get::<Player>(t).is_some()).unwrap_or(caster);
                let removed_icon = world.get::<PlayerCombatState>(dispel_target).and_then(|c| c.buffs.entries.iter().find(|b| b.is_debuff).map(|b| b.icon));
                if let Some(icon) = removed_icon {
                    let removed = world.get_mut::<PlayerCombatState>(dispel_target).and_then(|mut c| c.buffs.remove(icon));
                    if let Some(delta) = removed {
                        if let Some(mut p) = world.get_mut::<Player>(dispel_target) {
                            apply_stat_modifiers(&mut p.effective_stats, delta.negate());
                        }
                        world.resource_mut::<CombatLog>().log(CombatLogEvent::AuraRemoved { target: dispel_target, icon });
                    }
                }
            }
            AbilityId::HunterDisengage => {
                let target_pos = caster_target.and_then(|t| world.get::<Enemy>(t).map(|e| e.position));
                if let Some(mut p) = world.get_mut::<Player>(caster) {
                    let direction = target_pos.map(|tp| (p.position - tp).normalize_or_zero()).filter(|d| *d != Vec2::ZERO).unwrap_or(Vec2::X);
                    p.position += direction * 10.0;
                }
            }
            _ => {}
        },
    }
}

fn apply_purchase(
    world: &mut World,
    players: &HashMap<PlayerId, Entity>,
    player: PlayerId,
    vendor_id: Entity,
    service_type: crate::loot::vendor::ServiceType,
    ability_id: Option<crate::catalog::abilities::AbilityId>,
    item_id: Option<Entity>,
) -> DungeonResult<()> {
    use crate::loot::vendor::ServiceType;

    let entity = resolve_player(players, player)?;
    let vendor_kind = world.get::<Vendor>(vendor_id).map(|v| v.kind).ok_or_else(|| DungeonError::Validation("no such vendor".to_string()))?;
    let _ = item_id;

    let (price, request) = match service_type {
        ServiceType::LevelUp => {
            if vendor_kind != VendorKind::Trainer {
                return Err(DungeonError::Validation("service not offered here".to_string()));
            }
            let level = world.get::<Player>(entity).map(|p| p.level).unwrap_or(1);
            (train_ability_price(1).min(crate::loot::vendor::level_up_price(level)), VendorServiceRequest::LevelUp)
        }
        ServiceType::TrainAbility => {
            let ability = ability_id.ok_or_else(|| DungeonError::Validation("missing abilityId".to_string()))?;
            let rank = world
                .get::<Player>(entity)
                .and_then(|p| p.abilities.iter().find(|a| a.ability == ability).map(|a| a.rank))
                .unwrap_or(1);
            (train_ability_price(rank + 1), VendorServiceRequest::TrainAbility(ability))
        }
        ServiceType::SellItem => {
            let item = world
                .get::<Player>(entity)
                .and_then(|p| p.backpack.first().cloned())
                .ok_or_else(|| DungeonError::Validation("backpack is empty".to_string()))?;
            (sell_price(&item), VendorServiceRequest::SellItem(0))
        }
        ServiceType::SellAll => (0, VendorServiceRequest::SellAll),
    };

    let gold = world.get::<Player>(entity).map(|p| p.gold).unwrap_or(0);
    let result = resolve_purchase(&request, gold, price);
    let Ok(()) = (match result {
        crate::loot::vendor::PurchaseResult::Ok { .. } => Ok(()),
        _ => Err(()),
    }) else {
        return Err(DungeonError::Validation("purchase rejected".to_string()));
    };
    let crate::loot::vendor::PurchaseResult::Ok { gold_spent } = result else { unreachable!() };

    let floor = world.resource::<Run>().floor;
    if let Some(mut p) = world.get_mut::<Player>(entity) {
        p.gold = p.gold.saturating_sub(gold_spent);
        match &request {
            VendorServiceRequest::SellItem(idx) => {
                if *idx < p.backpack.len() {
                    let item = p.backpack.remove(*idx);
                    p.gold += sell_price(&item);
                }
            }
            VendorServiceRequest::SellAll => {
                let total: u32 = p.backpack.iter().map(sell_price).sum();
                p.backpack.clear();
                p.gold += total;
            }
            VendorServiceRequest::LevelUp => {
                p.level += 1;
            }
            VendorServiceRequest::TrainAbility(ability) => {
                if let Some(progress) = p.abilities.iter_mut().find(|a| a.ability == *ability) {
                    match crate::loot::progression::train_ability_rank(progress.rank, floor) {
                        crate::loot::progression::TrainResult::Upgraded => progress.rank += 1,
                        crate::loot::progression::TrainResult::FallbackReward { gold } => p.gold += gold,
                    }
                }
            }
        }
    }
    Ok(())
}
