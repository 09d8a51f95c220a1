//! Sources of randomness for card draws, robbery rolls and amounts.
//!
//! The ledger never calls a global RNG; it draws through [`Randomness`] so
//! outcomes can be reproduced in tests.

use std::collections::VecDeque;

use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Random draws consumed by the ledger.
pub trait Randomness: Send + Sync {
    /// Uniform integer in `[low, high]`, both inclusive.
    fn range(&self, low: u64, high: u64) -> u64;

    /// `true` with the given probability.
    fn chance(&self, probability: f64) -> bool;
}

/// Pseudo-random source backed by [`StdRng`].
pub struct StdRandomness {
    rng: Mutex<StdRng>,
}

impl StdRandomness {
    /// Seeded from the operating system
    pub fn from_entropy() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Reproducible sequence for a given seed
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl Randomness for StdRandomness {
    fn range(&self, low: u64, high: u64) -> u64 {
        let (low, high) = if low <= high { (low, high) } else { (high, low) };
        self.rng.lock().gen_range(low..=high)
    }

    fn chance(&self, probability: f64) -> bool {
        if probability.is_nan() || probability <= 0.0 {
            return false;
        }
        if probability >= 1.0 {
            return true;
        }
        self.rng.lock().gen_bool(probability)
    }
}

/// Replays pre-arranged draws, in order.
///
/// Range draws are clamped into the requested bounds. Once a queue runs dry
/// range draws return `low` and chance draws return `false`.
#[derive(Default)]
pub struct ScriptedRandomness {
    ranges: Mutex<VecDeque<u64>>,
    chances: Mutex<VecDeque<bool>>,
}

impl ScriptedRandomness {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue values for upcoming `range` draws
    pub fn with_ranges(self, values: impl IntoIterator<Item = u64>) -> Self {
        self.ranges.lock().extend(values);
        self
    }

    /// Queue values for upcoming `chance` draws
    pub fn with_chances(self, values: impl IntoIterator<Item = bool>) -> Self {
        self.chances.lock().extend(values);
        self
    }

    /// Draws still queued, as `(ranges, chances)`
    pub fn remaining(&self) -> (usize, usize) {
        (self.ranges.lock().len(), self.chances.lock().len())
    }
}

impl Randomness for ScriptedRandomness {
    fn range(&self, low: u64, high: u64) -> u64 {
        let (low, high) = if low <= high { (low, high) } else { (high, low) };
        self.ranges
            .lock()
            .pop_front()
            .map_or(low, |v| v.clamp(low, high))
    }

    fn chance(&self, _probability: f64) -> bool {
        self.chances.lock().pop_front().unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_std_range_stays_in_bounds() {
        let rng = StdRandomness::seeded(7);
        for _ in 0..1_000 {
            let card = rng.range(1, 11);
            assert!((1..=11).contains(&card));
        }
        assert_eq!(rng.range(5, 5), 5);
    }

    #[test]
    fn test_seeded_is_reproducible() {
        let a = StdRandomness::seeded(42);
        let b = StdRandomness::seeded(42);
        let draws_a: Vec<u64> = (0..16).map(|_| a.range(1, 11)).collect();
        let draws_b: Vec<u64> = (0..16).map(|_| b.range(1, 11)).collect();
        assert_eq!(draws_a, draws_b);
    }

    #[test]
    fn test_chance_edges() {
        let rng = StdRandomness::seeded(1);
        assert!(!rng.chance(0.0));
        assert!(!rng.chance(f64::NAN));
        assert!(rng.chance(1.0));
    }

    #[test]
    fn test_chance_frequency() {
        let rng = StdRandomness::seeded(99);
        let hits = (0..10_000).filter(|_| rng.chance(0.4)).count();
        assert!((3_600..4_400).contains(&hits), "hits = {}", hits);
    }

    #[test]
    fn test_scripted_replays_and_clamps() {
        let rng = ScriptedRandomness::new()
            .with_ranges([10, 999, 0])
            .with_chances([true]);

        assert_eq!(rng.range(1, 11), 10);
        assert_eq!(rng.range(1, 11), 11);
        assert_eq!(rng.range(50, 500), 50);
        assert_eq!(rng.range(3, 9), 3);
        assert!(rng.chance(0.4));
        assert!(!rng.chance(0.4));
        assert_eq!(rng.remaining(), (0, 0));
    }
}
