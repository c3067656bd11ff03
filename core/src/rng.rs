//! Deterministic random number generation for the synthetic ledger.
//!
//! RULE: synthetic data never touches a platform RNG. Every stream is
//! derived from the master seed, so a seed fully reproduces a ledger.

use rand::{RngCore, SeedableRng};
use rand_pcg::Pcg64Mcg;

pub struct DetRng {
    inner: Pcg64Mcg,
}

impl DetRng {
    pub fn new(seed: u64) -> Self {
        Self {
            inner: Pcg64Mcg::seed_from_u64(seed),
        }
    }

    /// Derive an independent stream from the master seed. Stream indices
    /// are stable; adding a stream never disturbs existing ones.
    pub fn stream(master_seed: u64, stream_index: u64) -> Self {
        let derived = master_seed ^ stream_index.wrapping_mul(0x9e37_79b9_7f4a_7c15);
        Self::new(derived)
    }

    /// Roll a float in [0.0, 1.0).
    pub fn next_f64(&mut self) -> f64 {
        let bits = self.inner.next_u64();
        (bits >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
    }

    /// Roll a u64 in [0, n).
    pub fn next_u64_below(&mut self, n: u64) -> u64 {
        assert!(n > 0, "n must be > 0");
        self.inner.next_u64() % n
    }

    /// Bernoulli trial: returns true with probability p.
    pub fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }

    /// Sample from a simplified Pareto distribution.
    /// x_min: minimum value, alpha: shape parameter (higher = less skewed).
    pub fn pareto(&mut self, x_min: f64, alpha: f64) -> f64 {
        let u = self.next_f64().max(1e-10);
        x_min * u.powf(-1.0 / alpha)
    }
}
