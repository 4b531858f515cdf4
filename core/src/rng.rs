//! Random number source for operator selection.
//!
//! RULE: Nothing in the assignment path may touch thread-local or global RNG.
//! Callers own a RoutingRng and hand it to the engine explicitly, so tests
//! can pin the seed and replay the exact same sequence of choices.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64Mcg;

pub struct RoutingRng {
    inner: Pcg64Mcg,
}

impl RoutingRng {
    /// Deterministic stream for a fixed seed.
    pub fn from_seed(seed: u64) -> Self {
        Self {
            inner: Pcg64Mcg::seed_from_u64(seed),
        }
    }

    /// Stream seeded from the operating system.
    pub fn from_entropy() -> Self {
        Self {
            inner: Pcg64Mcg::from_entropy(),
        }
    }

    /// Seeded when a seed is configured, OS entropy otherwise.
    pub fn from_optional_seed(seed: Option<u64>) -> Self {
        match seed {
            Some(s) => Self::from_seed(s),
            None => Self::from_entropy(),
        }
    }

    /// Uniform draw in [0, n).
    pub fn next_u64_below(&mut self, n: u64) -> u64 {
        assert!(n > 0, "n must be > 0");
        self.inner.gen_range(0..n)
    }

    /// Uniform draw in [0, n), for ranges wider than u64.
    pub fn next_u128_below(&mut self, n: u128) -> u128 {
        assert!(n > 0, "n must be > 0");
        self.inner.gen_range(0..n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_replays_same_draws() {
        let mut a = RoutingRng::from_seed(0xC0FFEE);
        let mut b = RoutingRng::from_seed(0xC0FFEE);
        let draws_a: Vec<u64> = (0..64).map(|_| a.next_u64_below(1000)).collect();
        let draws_b: Vec<u64> = (0..64).map(|_| b.next_u64_below(1000)).collect();
        assert_eq!(draws_a, draws_b);
    }

    #[test]
    fn draws_stay_below_bound() {
        let mut rng = RoutingRng::from_seed(7);
        for _ in 0..1000 {
            assert!(rng.next_u64_below(3) < 3);
        }
    }
}
