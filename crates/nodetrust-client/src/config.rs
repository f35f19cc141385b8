//! Client polling configuration.

use std::time::Duration;

/// How often and how much to ask the rendezvous peer for
#[derive(Debug, Clone)]
pub struct PollConfig {
    /// Number of peers requested per poll
    pub batch_size: u32,

    /// Delay between polls
    pub interval: Duration,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl PollConfig {
    /// Create the default polling configuration
    #[must_use]
    pub const fn new() -> Self {
        Self {
            batch_size: 20,
            interval: Duration::from_secs(1),
        }
    }

    /// Set the per-poll batch size
    #[must_use]
    pub const fn batch_size(mut self, batch_size: u32) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// Set the poll interval
    #[must_use]
    pub const fn interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }
}
