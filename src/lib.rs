//! Real-time, tick-based dungeon-crawler simulation core.
//!
//! One `tokio` task per Run owns a `bevy_ecs` `World` and steps it at a
//! fixed cadence ([`tick`]); everything above that — transport, matchmaking,
//! wallet settlement — is out of scope and talks to this crate only through
//! [`net::intents::ClientIntent`] in, [`net::events::ServerEvent`] out, and
//! the [`registry::RunRegistry`] that indexes live Runs.

pub mod ai;
pub mod catalog;
pub mod cli;
pub mod combat;
pub mod config;
pub mod dungeon;
pub mod entities;
pub mod error;
pub mod input;
pub mod loot;
pub mod net;
pub mod registry;
pub mod reward_oracle;
pub mod rng;
pub mod tick;
