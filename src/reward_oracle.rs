//! Reward oracle bridge (§2 component 12).
//!
//! Wallet custody, on-chain settlement, and reward attestation live entirely
//! outside this crate. The simulation core only ever emits "boss chest
//! opened" events and accepts an opaque attestation string in return — it
//! never inspects or validates the payload's contents, the same way
//! `VendorKind::Crypto` is just another vendor kind to the tick scheduler
//! and carries no crypto-specific branching anywhere in it.

use tracing::info;

use crate::error::DungeonResult;

/// A claim raised when a boss-room chest is opened (§6 `OPEN_CHEST`).
#[derive(Debug, Clone)]
pub struct RewardClaim {
    pub run_seed: String,
    pub floor: u32,
    pub chest_id: u64,
}

/// The bridge contract. Anything satisfying this can sit behind
/// `OPEN_CHEST` handling for a boss-room chest; the core depends only on
/// the trait, never on a concrete settlement backend.
pub trait RewardOracle: Send + Sync {
    /// Submit a claim and receive an opaque attestation payload, forwarded
    /// to the client verbatim as `ServerEvent::RewardOracle`.
    fn submit_claim(&self, claim: &RewardClaim) -> DungeonResult<String>;
}

/// Default bridge: logs the claim and returns a deterministic opaque
/// placeholder, so a Run can be driven end-to-end (headless CLI, tests)
/// without a real settlement backend wired in.
#[derive(Debug, Default)]
pub struct NullRewardOracle;

impl RewardOracle for NullRewardOracle {
    fn submit_claim(&self, claim: &RewardClaim) -> DungeonResult<String> {
        info!(seed = %claim.run_seed, floor = claim.floor, chest = claim.chest_id, "reward claim submitted to null oracle");
        Ok(format!("unattested:{}:{}:{}", claim.run_seed, claim.floor, claim.chest_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_oracle_always_returns_an_attestation() {
        let oracle = NullRewardOracle;
        let claim = RewardClaim {
            run_seed: "seed".to_string(),
            floor: 3,
            chest_id: 7,
        };
        let attestation = oracle.submit_claim(&claim).unwrap();
        assert!(attestation.contains("seed"));
    }
}
