//! Headless CLI driver: spins up one Run, feeds it `CreateRun` intents for
//! the requested number of simulated players, ticks it to completion (or a
//! tick ceiling), and prints a final report. Mirrors the reference engine's
//! `--headless` mode, generalized to this crate's task-per-Run model: there
//! is no graphical mode here, so this binary is the only entry point.

use std::time::Duration;

use bevy_ecs::prelude::*;
use tokio::sync::mpsc;
use tracing::info;

use dungeoncrawler_core::catalog::classes::ClassId;
use dungeoncrawler_core::cli;
use dungeoncrawler_core::combat::log::CombatLog;
use dungeoncrawler_core::config::{RunConfig, ServerConfig};
use dungeoncrawler_core::dungeon::generator;
use dungeoncrawler_core::entities::run::{Run, RunTracking};
use dungeoncrawler_core::net::events::ServerEvent;
use dungeoncrawler_core::net::intents::ClientIntent;
use dungeoncrawler_core::registry::{RunRegistry, TaggedIntent};
use dungeoncrawler_core::rng::SeededRng;
use dungeoncrawler_core::tick::spawn_run_task;

#[tokio::main]
async fn main() {
    let args = cli::parse_args();

    let log_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    tracing_subscriber::fmt().with_env_filter(log_filter).init();

    let run_config = match &args.run_config {
        Some(path) => RunConfig::load_from_file(path).unwrap_or_else(|e| {
            eprintln!("invalid run config: {e}");
            std::process::exit(1);
        }),
        None => RunConfig::default(),
    };
    let server_config = match &args.server_config {
        Some(path) => ServerConfig::load_from_file(path).unwrap_or_else(|e| {
            eprintln!("invalid server config: {e}");
            std::process::exit(1);
        }),
        None => ServerConfig::default(),
    };

    let seed = run_config.resolved_seed();
    info!(%seed, floor = run_config.floor, "starting headless run");

    let world = build_initial_world(&seed, &run_config);

    let registry = RunRegistry::new();
    let run_id = registry.mint_run_id();
    let (event_tx, mut event_rx) = mpsc::channel::<(dungeoncrawler_core::registry::RunId, ServerEvent)>(1024);
    let rng = SeededRng::from_seed_str(&seed);

    let handle = spawn_run_task(run_id, world, rng, registry.clone(), event_tx, server_config.tick_interval());

    for i in 0..args.players {
        let player_id = registry.mint_player_id();
        registry.bind_player(player_id, run_id).await;
        let intent = TaggedIntent {
            player: player_id,
            intent: ClientIntent::CreateRun {
                player_name: format!("player-{i}"),
                class: *ClassId::all().get(i as usize % ClassId::all().len()).unwrap(),
            },
        };
        if handle.intent_tx.send(intent).await.is_err() {
            eprintln!("run task ended before players could join");
            break;
        }
    }

    let drain = tokio::spawn(async move {
        let mut events_seen: u64 = 0;
        while let Some((_run_id, _event)) = event_rx.recv().await {
            events_seen += 1;
        }
        events_seen
    });

    let mut ticks_elapsed: u64 = 0;
    loop {
        if handle.join.is_finished() || ticks_elapsed >= args.max_ticks {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
        ticks_elapsed += 1;
    }

    registry.remove_run(run_id).await;
    drop(handle.intent_tx);
    let _ = handle.join.await;
    let events_seen = drain.await.unwrap_or(0);

    info!(runs_remaining = registry.run_count().await, events_seen, "run ended, shutting down");
}

/// Assembles the `World` a Run's task expects to already contain before its
/// first `CreateRun` intent is applied: the `Run`/`RunTracking`/`CombatLog`
/// resources, and a freshly generated starting floor.
fn build_initial_world(seed: &str, run_config: &RunConfig) -> World {
    let mut world = World::new();
    world.insert_resource(Run::new(seed.to_string()));
    world.resource_mut::<Run>().floor = run_config.floor;
    world.init_resource::<RunTracking>();
    world.init_resource::<CombatLog>();

    let dungeon = generator::generate(&mut world, seed, run_config.floor, run_config.party_size, 0);
    world.insert_resource(dungeon);

    world
}
