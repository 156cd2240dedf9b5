//! Injectable random sources for the projection calculators
//!
//! The liquidity budget and the cash-flow forecast jitter their averages with
//! uniform multipliers. Callers hand in a [`RandomSource`] so tests can pin the
//! sequence while production uses an entropy-seeded generator.

use std::collections::VecDeque;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// A source of uniform draws in `[0, 1)`
pub trait RandomSource {
    /// Next draw in `[0, 1)`
    fn next_unit(&mut self) -> f64;

    /// Uniform draw in `[low, high)`
    fn uniform(&mut self, low: f64, high: f64) -> f64 {
        low + self.next_unit() * (high - low)
    }
}

/// Deterministic generator seeded from a `u64`
pub struct SeededRandom {
    rng: StdRng,
}

impl SeededRandom {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl RandomSource for SeededRandom {
    fn next_unit(&mut self) -> f64 {
        self.rng.gen::<f64>()
    }
}

/// Entropy-seeded generator used for live requests
///
/// `Send`, so it can be created inside an async handler.
pub struct SystemRandom {
    rng: StdRng,
}

impl SystemRandom {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }
}

impl Default for SystemRandom {
    fn default() -> Self {
        Self::new()
    }
}

impl RandomSource for SystemRandom {
    fn next_unit(&mut self) -> f64 {
        self.rng.gen::<f64>()
    }
}

/// Clamp into `[0, 1)`, mapping NaN to 0.5
fn to_unit(value: f64) -> f64 {
    if value.is_nan() {
        0.5
    } else {
        value.clamp(0.0, 1.0 - f64::EPSILON)
    }
}

/// Returns the same draw forever
#[derive(Debug, Clone, Copy)]
pub struct FixedRandom(f64);

impl FixedRandom {
    /// Clamped into `[0, 1)`; NaN becomes the midpoint
    pub fn new(unit: f64) -> Self {
        Self(to_unit(unit))
    }

    /// Always 0.5, so every multiplier lands on the middle of its range
    pub fn midpoint() -> Self {
        Self(0.5)
    }
}

impl RandomSource for FixedRandom {
    fn next_unit(&mut self) -> f64 {
        self.0
    }
}

/// Replays a fixed list of draws, cycling when exhausted
#[derive(Debug, Clone)]
pub struct SequenceRandom {
    values: VecDeque<f64>,
}

impl SequenceRandom {
    pub fn new(values: impl IntoIterator<Item = f64>) -> Self {
        let values: VecDeque<f64> = values
            .into_iter()
            .map(to_unit)
            .collect();
        Self { values }
    }
}

impl RandomSource for SequenceRandom {
    fn next_unit(&mut self) -> f64 {
        match self.values.pop_front() {
            Some(v) => {
                self.values.push_back(v);
                v
            }
            // An empty sequence behaves like the midpoint
            None => 0.5,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeded_random_is_reproducible() {
        let mut a = SeededRandom::new(42);
        let mut b = SeededRandom::new(42);
        for _ in 0..16 {
            assert_eq!(a.next_unit(), b.next_unit());
        }
    }

    #[test]
    fn test_draws_stay_in_unit_interval() {
        let mut rng = SystemRandom::new();
        for _ in 0..1000 {
            let v = rng.next_unit();
            assert!((0.0..1.0).contains(&v));
        }
    }

    #[test]
    fn test_uniform_maps_range() {
        let mut rng = FixedRandom::new(0.0);
        assert!((rng.uniform(0.9, 1.1) - 0.9).abs() < 1e-12);

        let mut rng = FixedRandom::midpoint();
        assert!((rng.uniform(0.9, 1.1) - 1.0).abs() < 1e-12);
        assert!((rng.uniform(0.8, 1.2) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_sequence_cycles() {
        let mut rng = SequenceRandom::new([0.1, 0.2]);
        assert_eq!(rng.next_unit(), 0.1);
        assert_eq!(rng.next_unit(), 0.2);
        assert_eq!(rng.next_unit(), 0.1);
    }

    #[test]
    fn test_empty_sequence_is_midpoint() {
        let mut rng = SequenceRandom::new(Vec::new());
        assert_eq!(rng.next_unit(), 0.5);
    }

    #[test]
    fn test_fixed_random_clamps() {
        let mut rng = FixedRandom::new(3.0);
        assert!(rng.next_unit() < 1.0);
        let mut rng = FixedRandom::new(-1.0);
        assert_eq!(rng.next_unit(), 0.0);
    }

    #[test]
    fn test_nan_draws_become_midpoint() {
        let mut rng = FixedRandom::new(f64::NAN);
        assert_eq!(rng.next_unit(), 0.5);

        let mut rng = SequenceRandom::new([f64::NAN, 0.25, f64::INFINITY]);
        assert_eq!(rng.next_unit(), 0.5);
        assert_eq!(rng.next_unit(), 0.25);
        assert!(rng.next_unit() < 1.0);
    }
}
