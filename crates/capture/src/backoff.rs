//! Exponential retry backoff, bounded by a ceiling

use std::time::Duration;

/// Doubling backoff between delivery retries
///
/// Starts at the floor, doubles after every failed attempt up to the
/// ceiling, and resets to the floor on success.
#[derive(Debug, Clone)]
pub struct Backoff {
    floor: Duration,
    ceiling: Duration,
    current: Duration,
}

impl Backoff {
    /// Create a backoff with the given floor and ceiling
    pub fn new(floor: Duration, ceiling: Duration) -> Self {
        Self {
            floor,
            ceiling,
            current: floor,
        }
    }

    /// Delay to sleep for this failure; doubles the next delay
    pub fn next_delay(&mut self) -> Duration {
        let delay = self.current;
        self.current = (self.current * 2).min(self.ceiling);
        delay
    }

    /// Reset to the floor after a successful delivery
    pub fn reset(&mut self) {
        self.current = self.floor;
    }

    /// Current delay without advancing
    pub fn current(&self) -> Duration {
        self.current
    }
}
