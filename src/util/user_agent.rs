use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Mutex;

/// Common desktop browser identities, rotated per request so source sites
/// are less likely to block the relay.
pub const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:133.0) Gecko/20100101 Firefox/133.0",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36 Edg/131.0.0.0",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36",
    "Mozilla/5.0 (X11; Linux x86_64; rv:133.0) Gecko/20100101 Firefox/133.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10.15; rv:133.0) Gecko/20100101 Firefox/133.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/18.1.1 Safari/605.1.15",
    "Mozilla/5.0 (X11; Linux x86_64; rv:128.0) Gecko/20100101 Firefox/128.0",
    "Mozilla/5.0 (X11; Ubuntu; Linux x86_64; rv:133.0) Gecko/20100101 Firefox/133.0",
];

/// Picks a User-Agent string uniformly at random from [`USER_AGENTS`].
///
/// The random source is owned by the pool rather than taken from a
/// thread-local, so tests can build a seeded pool and get a reproducible
/// sequence.
#[derive(Debug)]
pub struct UserAgentPool {
    rng: Mutex<StdRng>,
}

impl UserAgentPool {
    pub fn from_entropy() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    pub fn pick(&self) -> &'static str {
        // Poisoning leaves the RNG state usable
        let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());
        USER_AGENTS[rng.gen_range(0..USER_AGENTS.len())]
    }
}

impl Default for UserAgentPool {
    fn default() -> Self {
        Self::from_entropy()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_seeded_pools_agree() {
        let a = UserAgentPool::seeded(42);
        let b = UserAgentPool::seeded(42);
        let seq_a: Vec<_> = (0..20).map(|_| a.pick()).collect();
        let seq_b: Vec<_> = (0..20).map(|_| b.pick()).collect();
        assert_eq!(seq_a, seq_b);
    }

    #[test]
    fn test_pick_comes_from_pool() {
        let pool = UserAgentPool::from_entropy();
        for _ in 0..50 {
            assert!(USER_AGENTS.contains(&pool.pick()));
        }
    }

    #[test]
    fn test_pick_covers_pool() {
        let pool = UserAgentPool::seeded(7);
        let seen: HashSet<_> = (0..2_000).map(|_| pool.pick()).collect();
        assert_eq!(seen.len(), USER_AGENTS.len());
    }
}
