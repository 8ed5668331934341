//! Per-client sliding-window rate limiting (§5 "Cancellation/timeouts",
//! §7 `DungeonError::RateLimited`).

use std::collections::VecDeque;

pub const DEFAULT_MESSAGES_PER_SECOND: usize = 60;
const WINDOW_SECONDS: f32 = 1.0;

/// One sliding window per client. `now` is supplied by the caller (the
/// transport layer's clock), never read internally, so this stays
/// deterministic and unit-testable.
#[derive(Debug, Clone)]
pub struct SlidingWindowLimiter {
    capacity: usize,
    timestamps: VecDeque<f32>,
}

impl SlidingWindowLimiter {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            timestamps: VecDeque::with_capacity(capacity),
        }
    }

    pub fn default_capacity() -> Self {
        Self::new(DEFAULT_MESSAGES_PER_SECOND)
    }

    /// Returns `Ok(())` if the message is admitted, `Err(RateLimited)` if
    /// it should be dropped (§7: drop message, log at `debug!`).
    pub fn admit(&mut self, now: f32) -> Result<(), crate::error::DungeonError> {
        while let Some(&front) = self.timestamps.front() {
            if now - front > WINDOW_SECONDS {
                self.timestamps.pop_front();
            } else {
                break;
            }
        }
        if self.timestamps.len() >= self.capacity {
            return Err(crate::error::DungeonError::RateLimited);
        }
        self.timestamps.push_back(now);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admits_up_to_capacity_within_window() {
        let mut limiter = SlidingWindowLimiter::new(3);
        assert!(limiter.admit(0.0).is_ok());
        assert!(limiter.admit(0.1).is_ok());
        assert!(limiter.admit(0.2).is_ok());
        assert!(limiter.admit(0.3).is_err());
    }

    #[test]
    fn window_slides_forward_and_frees_capacity() {
        let mut limiter = SlidingWindowLimiter::new(2);
        assert!(limiter.admit(0.0).is_ok());
        assert!(limiter.admit(0.1).is_ok());
        assert!(limiter.admit(0.2).is_err());
        assert!(limiter.admit(1.2).is_ok());
    }
}
