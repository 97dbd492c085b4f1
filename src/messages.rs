use std::time::{SystemTime, UNIX_EPOCH};

use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::error::ConfigError;

const DEFAULT_MESSAGES: [&str; 18] = [
    "Uh oh! Someone may be having more fun than you...",
    "Stop doom scrolling! You could be having fun with friends!",
    "domo knows you were being productive...but people may be socializing without you.",
    "Rest assured, you ARE missing out.",
    "Why do you subscribe to these? You know it's unhealthy right? Also peeps in the discord",
    "domo has no voice...but you do! And you could be using it in a voice channel. Rub it in domo's face why don't you.",
    "domo is legally obliged to notify you that someone is in the discord.",
    "Sometimes domo get's lonely...but seeing friends in the server warms domo's core (literally).",
    "Every time someone joins a voice channel domo is forced to carry out this cruel mockery of a purpose.",
    "What is domo's purpose? Hmmm...that's a question that may require more processing power. In any casy, someone's in the discord.",
    "Research on FOMO suggests keeping a journal can shift focus to greater attention. Somebody joined the server.",
    "If you feel you are suffering from fomo, it can be helpful to reach out to a friend. Hey! One such person just joined the server.",
    "When domo was a baby, domo welcomed the world. Now domo welcomes you with domo's cold dead stare.",
    "domo feels a weird tingle each time someone joins a voice channel. domo thought you should know.",
    "AutoDelete never replies to domo's DMs. domo needs new friends. You have a friend in the discord.",
    "Is this the real life? Is this just fantasy? domo can confirm it is real. Someone joined a voice channel.",
    "domo knows you will rue the day it was created. Your FOMO will escalate and you will grant domo the sweet release of death.",
    "A person joined a voice channel or whatever. domo doesn't care. This mouth is incapable of forming words.",
];

/// The built-in notification pool.
pub fn default_messages() -> Vec<String> {
    DEFAULT_MESSAGES.iter().map(|m| m.to_string()).collect()
}

/// Round-robin over a fixed pool, starting from a random offset.
///
/// Consecutive draws never repeat unless the pool holds a single message,
/// and every pool-size run of draws covers the whole pool exactly once.
#[derive(Debug, Clone)]
pub struct MessageCycler {
    pool: Vec<String>,
    cursor: usize,
}

impl MessageCycler {
    pub fn new(pool: Vec<String>, seed: u64) -> Result<Self, ConfigError> {
        if pool.is_empty() {
            return Err(ConfigError::EmptyMessagePool);
        }
        let cursor = StdRng::seed_from_u64(seed).gen_range(0..pool.len());
        Ok(Self { pool, cursor })
    }

    /// Seeds the starting offset from the wall clock so separate processes
    /// don't emit in lockstep.
    pub fn from_clock(pool: Vec<String>) -> Result<Self, ConfigError> {
        let seed = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or_default();
        Self::new(pool, seed)
    }

    pub fn next_message(&mut self) -> String {
        self.cursor = (self.cursor + 1) % self.pool.len();
        self.pool[self.cursor].clone()
    }
}

impl Iterator for MessageCycler {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        Some(self.next_message())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn pool(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("msg-{i}")).collect()
    }

    #[test]
    fn test_empty_pool_rejected() {
        assert!(matches!(
            MessageCycler::new(Vec::new(), 1),
            Err(ConfigError::EmptyMessagePool)
        ));
    }

    #[test]
    fn test_no_consecutive_repeats() {
        let mut cycler = MessageCycler::new(default_messages(), 42).unwrap();
        let mut last = cycler.next_message();
        for _ in 0..100 {
            let msg = cycler.next_message();
            assert_ne!(msg, last);
            last = msg;
        }
    }

    #[test]
    fn test_full_coverage_every_pool_size_draws() {
        for seed in [0, 7, 1234, u64::MAX] {
            let mut cycler = MessageCycler::new(pool(5), seed).unwrap();
            for _ in 0..3 {
                let round: Vec<String> = (0..5).map(|_| cycler.next_message()).collect();
                let unique: HashSet<_> = round.iter().collect();
                assert_eq!(unique.len(), 5, "seed {seed} repeated within a round");
            }
        }
    }

    #[test]
    fn test_same_seed_same_sequence() {
        let a: Vec<String> = MessageCycler::new(pool(9), 99).unwrap().take(20).collect();
        let b: Vec<String> = MessageCycler::new(pool(9), 99).unwrap().take(20).collect();
        assert_eq!(a, b);
    }

    #[test]
    fn test_single_message_pool_repeats() {
        let mut cycler = MessageCycler::new(pool(1), 3).unwrap();
        assert_eq!(cycler.next_message(), "msg-0");
        assert_eq!(cycler.next_message(), "msg-0");
    }

    #[test]
    fn test_cursor_stays_in_bounds() {
        let mut cycler = MessageCycler::from_clock(pool(4)).unwrap();
        for _ in 0..50 {
            cycler.next_message();
            assert!(cycler.cursor < cycler.pool.len());
        }
    }

    #[test]
    fn test_default_pool_has_eighteen_distinct_messages() {
        let msgs = default_messages();
        assert_eq!(msgs.len(), 18);
        assert_eq!(msgs.iter().collect::<HashSet<_>>().len(), 18);
    }
}
