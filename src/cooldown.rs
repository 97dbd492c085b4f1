use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Per-guild record of the last notification time.
///
/// Not thread-safe on its own; the pipeline keeps it behind its state lock.
#[derive(Debug)]
pub struct CooldownTracker {
    period: Duration,
    last_notified: HashMap<String, Instant>,
}

impl CooldownTracker {
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            last_notified: HashMap::new(),
        }
    }

    /// A guild with no recorded notification is never suppressed.
    pub fn is_suppressed(&self, guild_id: &str, now: Instant) -> bool {
        match self.last_notified.get(guild_id) {
            Some(last) => match last.checked_add(self.period) {
                Some(until) => now < until,
                None => true,
            },
            None => false,
        }
    }

    pub fn record_notification(&mut self, guild_id: &str, now: Instant) {
        self.last_notified.insert(guild_id.to_string(), now);
    }

    pub fn last_notified(&self, guild_id: &str) -> Option<Instant> {
        self.last_notified.get(guild_id).copied()
    }

    pub fn len(&self) -> usize {
        self.last_notified.len()
    }

    pub fn is_empty(&self) -> bool {
        self.last_notified.is_empty()
    }
}
