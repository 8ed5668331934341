//! Server/run configuration (§1.1 "Configuration").
//!
//! Mirrors the reference engine's `HeadlessMatchConfig::load_from_file` /
//! `validate()` pattern, generalized: `RunConfig` seeds one Run, while
//! `ServerConfig` holds the tuning the transport layer and tick scheduler
//! share across every Run it hosts.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::input::rate_limit::DEFAULT_MESSAGES_PER_SECOND;
use crate::tick::run_task::DEFAULT_TICK_INTERVAL;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    /// Seed driving the floor/loot RNG streams (§4.1). Random if omitted.
    #[serde(default)]
    pub seed: Option<String>,
    /// Starting floor (1-indexed).
    #[serde(default = "default_floor")]
    pub floor: u32,
    /// Party size used for enemy stat scaling until players join (§4.3).
    #[serde(default = "default_party_size")]
    pub party_size: u32,
}

fn default_floor() -> u32 {
    1
}

fn default_party_size() -> u32 {
    1
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            seed: None,
            floor: default_floor(),
            party_size: default_party_size(),
        }
    }
}

impl RunConfig {
    pub fn load_from_file(path: &Path) -> Result<Self, String> {
        let contents = std::fs::read_to_string(path).map_err(|e| format!("failed to read config file: {e}"))?;
        let config: RunConfig = serde_json::from_str(&contents).map_err(|e| format!("failed to parse JSON: {e}"))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), String> {
        if !(crate::input::validation::MIN_FLOOR..=crate::input::validation::MAX_FLOOR).contains(&self.floor) {
            return Err(format!("floor must be 1..=30, got {}", self.floor));
        }
        if self.party_size == 0 || self.party_size > 6 {
            return Err(format!("party_size must be 1..=6, got {}", self.party_size));
        }
        Ok(())
    }

    pub fn resolved_seed(&self) -> String {
        self.seed.clone().unwrap_or_else(|| format!("run-{}", uuid_like_fallback()))
    }
}

/// No UUID dependency in the stack; a timestamp-free fallback id built
/// from the process's allocator address entropy is good enough for a
/// "you forgot to pass --seed" default and is never used for anything
/// security-sensitive.
fn uuid_like_fallback() -> u64 {
    let boxed = Box::new(0u8);
    Box::into_raw(boxed) as u64
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Milliseconds between ticks, every Run (§5.1 "sub-100ms").
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,
    /// Per-client sliding-window rate limit (§7).
    #[serde(default = "default_messages_per_second")]
    pub messages_per_second: usize,
    /// `tracing_subscriber::EnvFilter` directive, overridden by `RUST_LOG`.
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
}

fn default_tick_interval_ms() -> u64 {
    DEFAULT_TICK_INTERVAL.as_millis() as u64
}

fn default_messages_per_second() -> usize {
    DEFAULT_MESSAGES_PER_SECOND
}

fn default_log_filter() -> String {
    "info".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: default_tick_interval_ms(),
            messages_per_second: default_messages_per_second(),
            log_filter: default_log_filter(),
        }
    }
}

impl ServerConfig {
    pub fn load_from_file(path: &Path) -> Result<Self, String> {
        let contents = std::fs::read_to_string(path).map_err(|e| format!("failed to read config file: {e}"))?;
        let config: ServerConfig = serde_json::from_str(&contents).map_err(|e| format!("failed to parse JSON: {e}"))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.tick_interval_ms == 0 || self.tick_interval_ms > 1000 {
            return Err(format!("tick_interval_ms must be 1..=1000 (sub-100ms recommended), got {}", self.tick_interval_ms));
        }
        if self.messages_per_second == 0 {
            return Err("messages_per_second must be > 0".to_string());
        }
        Ok(())
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_config_defaults_are_valid() {
        assert!(RunConfig::default().validate().is_ok());
    }

    #[test]
    fn run_config_rejects_out_of_range_floor() {
        let mut config = RunConfig::default();
        config.floor = 99;
        assert!(config.validate().is_err());
    }

    #[test]
    fn server_config_defaults_are_valid() {
        assert!(ServerConfig::default().validate().is_ok());
    }

    #[test]
    fn server_config_rejects_zero_tick_interval() {
        let mut config = ServerConfig::default();
        config.tick_interval_ms = 0;
        assert!(config.validate().is_err());
    }
}
