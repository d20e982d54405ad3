//! Injectable randomness source
//!
//! The extractor's missing-percentage fallback and the synthetic tier draw
//! from bounded pseudo-random ranges. Tests pin the source instead of
//! relying on ambient nondeterminism.

use rand::Rng;

pub trait RandomSource: Send + Sync {
    /// Uniform value in [lo, hi]
    fn in_range(&self, lo: f32, hi: f32) -> f32;
}

/// Thread-local RNG backed source used in production
pub struct ThreadRandom;

impl RandomSource for ThreadRandom {
    fn in_range(&self, lo: f32, hi: f32) -> f32 {
        rand::thread_rng().gen_range(lo..=hi)
    }
}

/// Fixed source for deterministic tests
pub struct FixedRandom(pub f32);

impl RandomSource for FixedRandom {
    fn in_range(&self, lo: f32, hi: f32) -> f32 {
        self.0.clamp(lo, hi)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thread_random_stays_in_range() {
        let rng = ThreadRandom;
        for _ in 0..100 {
            let v = rng.in_range(30.0, 70.0);
            assert!((30.0..=70.0).contains(&v));
        }
    }

    #[test]
    fn test_fixed_random_clamps() {
        assert_eq!(FixedRandom(45.0).in_range(30.0, 70.0), 45.0);
        assert_eq!(FixedRandom(10.0).in_range(30.0, 70.0), 30.0);
    }
}
