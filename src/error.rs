//! Error taxonomy for the simulation core.
//!
//! Mirrors the semantic categories the design calls for: malformed input,
//! silently-droppable no-ops, rate limiting, self-correcting generator
//! invariants, and fatal per-run faults. No-op preconditions are modeled as
//! `Ok(CastOutcome::NoOp)` at call sites, not as an `Err` variant here — they
//! are not failures.

use thiserror::Error;

/// Errors that can cross an API boundary (intent handling, save validation,
/// run-task supervision).
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DungeonError {
    /// Malformed or out-of-policy input. Never mutates state; the caller
    /// should reply with `ERROR{message}` and nothing else.
    #[error("validation failed: {0}")]
    Validation(String),

    /// A client exceeded its message rate limit. The message is dropped.
    #[error("rate limit exceeded")]
    RateLimited,

    /// A dungeon-generation invariant (reachability, boss overlap) could not
    /// be satisfied and had to be corrected in place. Logged, never
    /// surfaced to a client.
    #[error("generator invariant violated, corrected in place: {0}")]
    GeneratorUnreachable(String),

    /// A tick raised an unrecoverable fault. Isolated to the one Run; the
    /// registry destroys it without affecting any other Run.
    #[error("run fault: {0}")]
    RunFault(String),
}

pub type DungeonResult<T> = Result<T, DungeonError>;
