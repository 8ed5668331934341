//! Input handling: rate limiting and save-data validation at the boundary
//! between the transport layer and a Run's intent queue (§2 component 11).

pub mod rate_limit;
pub mod validation;

use std::collections::HashMap;

use tracing::debug;

use crate::error::{DungeonError, DungeonResult};
use crate::net::intents::ClientIntent;
use crate::registry::ClientId;
use rate_limit::SlidingWindowLimiter;

/// Owns one sliding-window limiter per connected client and applies the
/// validation boundary before an intent is allowed onto a Run's queue.
#[derive(Debug, Default)]
pub struct IntentGate {
    limiters: HashMap<ClientId, SlidingWindowLimiter>,
}

impl IntentGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_client_connected(&mut self, client: ClientId) {
        self.limiters.insert(client, SlidingWindowLimiter::default_capacity());
    }

    pub fn on_client_disconnected(&mut self, client: ClientId) {
        self.limiters.remove(&client);
    }

    /// Rate-limits, then runs the §6 validation boundary for
    /// `CreateRunFromSave`. Anything else passes through for the tick
    /// scheduler to interpret against live Run state.
    pub fn admit(&mut self, client: ClientId, now: f32, intent: ClientIntent) -> DungeonResult<ClientIntent> {
        let limiter = self.limiters.entry(client).or_insert_with(SlidingWindowLimiter::default_capacity);
        if let Err(err) = limiter.admit(now) {
            debug!(?client, "dropping message: rate limit exceeded");
            return Err(err);
        }

        if let ClientIntent::CreateRunFromSave { save } = &intent {
            validation::validate_save_data(save)?;
        }

        Ok(intent)
    }
}

pub use self::rate_limit::DEFAULT_MESSAGES_PER_SECOND;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::classes::ClassId;

    #[test]
    fn unknown_client_gets_a_fresh_limiter_on_first_message() {
        let mut gate = IntentGate::new();
        let client = ClientId(1);
        assert!(gate.admit(client, 0.0, ClientIntent::Ping).is_ok());
    }

    #[test]
    fn rate_limit_exceeded_drops_and_reports() {
        let mut gate = IntentGate::new();
        let client = ClientId(2);
        gate.on_client_connected(client);
        for _ in 0..DEFAULT_MESSAGES_PER_SECOND {
            assert!(gate.admit(client, 0.0, ClientIntent::Ping).is_ok());
        }
        let result = gate.admit(client, 0.0, ClientIntent::Ping);
        assert_eq!(result, Err(DungeonError::RateLimited));
    }

    #[test]
    fn create_run_from_save_runs_the_validation_boundary() {
        let mut gate = IntentGate::new();
        let client = ClientId(3);
        let bad_intent = ClientIntent::CreateRunFromSave {
            save: crate::net::intents::SaveData {
                name: String::new(),
                class_id: ClassId::Warrior.name().to_string(),
                level: 1,
                gold: 0,
                floor: 1,
                abilities: vec![],
                backpack_len: 0,
                xp: 0,
                lives: 3,
            },
        };
        assert!(matches!(gate.admit(client, 0.0, bad_intent), Err(DungeonError::Validation(_))));
    }
}
