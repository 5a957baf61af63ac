use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use rand::SeedableRng;
use rand::rngs::SmallRng;

/// Hands out distinct seeds to workers.
///
/// Every call advances a shared counter, so two workers never derive their generators from the
/// same seed. Each worker takes its generator once at startup and owns it afterwards.
#[derive(Debug)]
pub struct SeedSource {
    next: AtomicU64,
}

impl SeedSource {
    pub fn new(base: u64) -> Self {
        Self {
            next: AtomicU64::new(base),
        }
    }

    /// Base seed taken from the wall clock.
    pub fn from_clock() -> Self {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or_default();
        Self::new(nanos)
    }

    pub fn next_seed(&self) -> u64 {
        self.next.fetch_add(1, Ordering::Relaxed).wrapping_add(1)
    }

    /// Independent generator seeded from the next counter value.
    pub fn rng(&self) -> SmallRng {
        SmallRng::seed_from_u64(self.next_seed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payload::random_string;

    #[test]
    fn seeds_are_unique_and_increasing() {
        let src = SeedSource::new(41);
        assert_eq!(src.next_seed(), 42);
        assert_eq!(src.next_seed(), 43);
    }

    #[test]
    fn same_base_is_reproducible() {
        let a = SeedSource::new(7);
        let b = SeedSource::new(7);
        let (mut ra, mut rb) = (a.rng(), b.rng());
        assert_eq!(random_string(&mut ra, 32), random_string(&mut rb, 32));
    }

    #[test]
    fn workers_get_different_streams() {
        let src = SeedSource::new(1);
        let mut first = src.rng();
        let mut second = src.rng();

        let keys_a: Vec<_> = (0..16).map(|_| random_string(&mut first, 8)).collect();
        let keys_b: Vec<_> = (0..16).map(|_| random_string(&mut second, 8)).collect();
        assert_ne!(keys_a, keys_b);
        assert!(keys_a.iter().all(|k| !keys_b.contains(k)));
    }
}
