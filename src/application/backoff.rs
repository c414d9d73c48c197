//! Exponential wait between polls.
//!
//! Quiet ticks double the wait up to a ceiling, any activity drops it back to the floor.

use std::time::Duration;

#[derive(Debug, Clone)]
pub struct ExponentialCounter {
    floor: u64,
    ceiling: u64,
    current: u64,
}

impl ExponentialCounter {
    /// Floor and ceiling in seconds. The floor is at least one second.
    pub fn new(floor: u64, ceiling: u64) -> Self {
        let floor = floor.max(1);
        let ceiling = ceiling.max(floor);
        Self {
            floor,
            ceiling,
            current: floor,
        }
    }

    /// Advances after a tick and returns how long to wait before the next one.
    pub fn advance(&mut self, found: bool) -> Duration {
        if found {
            self.reset();
        } else {
            self.current = self.current.saturating_mul(2).min(self.ceiling);
        }
        self.current()
    }

    pub fn reset(&mut self) {
        self.current = self.floor;
    }

    pub fn current(&self) -> Duration {
        Duration::from_secs(self.current)
    }
}

impl Default for ExponentialCounter {
    fn default() -> Self {
        Self::new(1, 16)
    }
}
