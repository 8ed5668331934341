//! Seeded RNG (§4.1).
//!
//! A deterministic pseudo-random source derived from a string seed, used to
//! build reproducible per-floor and per-loot streams. Reuses `StdRng` the
//! same way the reference engine's `GameRng` resource does, but exposes the
//! slice-oriented API (`pick`, `shuffle`) the dungeon generator needs.

use bevy_ecs::system::Resource;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::hash::{Hash, Hasher};

/// A named, deterministic RNG stream.
#[derive(Resource, Clone)]
pub struct SeededRng {
    rng: StdRng,
}

impl SeededRng {
    /// Build a stream from an arbitrary string seed (hashed to a u64).
    pub fn from_seed_str(seed: &str) -> Self {
        Self {
            rng: StdRng::seed_from_u64(hash_seed(seed)),
        }
    }

    pub fn from_u64(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// `next() → [0,1)`
    pub fn next_f32(&mut self) -> f32 {
        self.rng.gen::<f32>()
    }

    /// `nextInt(min,max) → int`, inclusive of `min`, exclusive of `max`.
    pub fn next_int(&mut self, min: i64, max: i64) -> i64 {
        if max <= min {
            return min;
        }
        self.rng.gen_range(min..max)
    }

    /// `nextFloat(min,max)`
    pub fn next_float(&mut self, min: f32, max: f32) -> f32 {
        if max <= min {
            return min;
        }
        self.rng.gen_range(min..max)
    }

    /// `chance(p) → bool`
    pub fn chance(&mut self, p: f32) -> bool {
        self.rng.gen::<f32>() < p
    }

    /// `pick(slice) → elt`
    pub fn pick<'a, T>(&mut self, slice: &'a [T]) -> Option<&'a T> {
        if slice.is_empty() {
            return None;
        }
        let idx = self.next_int(0, slice.len() as i64) as usize;
        slice.get(idx)
    }

    /// `shuffle(slice) → slice` (Fisher-Yates, in place).
    pub fn shuffle<T>(&mut self, slice: &mut [T]) {
        for i in (1..slice.len()).rev() {
            let j = self.next_int(0, (i + 1) as i64) as usize;
            slice.swap(i, j);
        }
    }
}

fn hash_seed(seed: &str) -> u64 {
    let mut hasher = std::collections::hash_map::DefaultHasher::new();
    seed.hash(&mut hasher);
    hasher.finish()
}

/// `createFloorRNG(runSeed, floor)` — a reproducible stream for one floor's
/// generation.
pub fn create_floor_rng(run_seed: &str, floor: u32) -> SeededRng {
    SeededRng::from_seed_str(&format!("{run_seed}:floor:{floor}"))
}

/// `createLootRNG(runSeed, floor, scope)` — a reproducible stream for a
/// specific loot roll scope (e.g. a boss kill, a chest id) within a floor.
pub fn create_loot_rng(run_seed: &str, floor: u32, scope: &str) -> SeededRng {
    SeededRng::from_seed_str(&format!("{run_seed}:loot:{floor}:{scope}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_sequence() {
        let mut a = SeededRng::from_seed_str("S1");
        let mut b = SeededRng::from_seed_str("S1");
        for _ in 0..16 {
            assert_eq!(a.next_int(0, 1000), b.next_int(0, 1000));
        }
    }

    #[test]
    fn floor_streams_are_distinct_but_reproducible() {
        let mut a = create_floor_rng("S1", 1);
        let mut b = create_floor_rng("S1", 2);
        let mut a2 = create_floor_rng("S1", 1);
        assert_eq!(a.next_int(0, 10_000), a2.next_int(0, 10_000));
        // Not asserting inequality with b; a hash collision is astronomically
        // unlikely but not something to assert against.
        let _ = b.next_f32();
    }

    #[test]
    fn chance_respects_bounds() {
        let mut rng = SeededRng::from_seed_str("bounds");
        assert!(!rng.chance(0.0));
        assert!(rng.chance(1.0));
    }

    #[test]
    fn shuffle_is_a_permutation() {
        let mut rng = SeededRng::from_seed_str("shuffle");
        let mut v: Vec<i32> = (0..20).collect();
        let original = v.clone();
        rng.shuffle(&mut v);
        let mut sorted = v.clone();
        sorted.sort();
        assert_eq!(sorted, original);
    }
}
