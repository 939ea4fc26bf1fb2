//! Deterministic membrane noise
//!
//! Each sample averages three sinusoidal taps of the input's arrival time
//! (nanoseconds since the mode was created) and the current seed:
//!
//! ```text
//! n = level · (sin(t·1e-6 + s) + sin(t·1.7e-6 + s/2) + sin(t·3.1e-6 + s/4)) / 3
//! s ← (s · 1103515245 + 12345) mod 2³¹
//! ```
//!
//! The same seed and input sequence always yield the same samples.

use crate::constants::{LCG_INCREMENT, LCG_MODULUS, LCG_MULTIPLIER};
use parking_lot::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

/// Seeded noise source, `|sample| <= level`.
#[derive(Debug)]
pub struct MembraneNoise {
    level: f64,
    seed: Mutex<u64>,
}

impl MembraneNoise {
    /// Noise seeded from the wall clock
    pub fn new(level: f64) -> Self {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(0);
        Self::with_seed(level, nanos)
    }

    /// Noise with a fixed seed
    pub fn with_seed(level: f64, seed: u64) -> Self {
        Self {
            level: level.max(0.0),
            seed: Mutex::new(seed % LCG_MODULUS),
        }
    }

    /// Amplitude
    pub fn level(&self) -> f64 {
        self.level
    }

    /// True when the amplitude is zero
    pub fn is_silent(&self) -> bool {
        self.level == 0.0
    }

    /// Current seed
    pub fn seed(&self) -> u64 {
        *self.seed.lock()
    }

    /// Pin the seed
    pub fn reseed(&self, seed: u64) {
        *self.seed.lock() = seed % LCG_MODULUS;
    }

    /// Sample for an input arriving `arrival_nanos` after the mode was
    /// created, then advance the seed. A silent source returns 0.0 and
    /// leaves the seed untouched.
    pub fn sample(&self, arrival_nanos: f64) -> f64 {
        if self.is_silent() {
            return 0.0;
        }
        let mut seed = self.seed.lock();
        let s = *seed as f64;
        let t = arrival_nanos;
        let taps = (t * 1e-6 + s).sin()
            + (t * 1.7e-6 + 0.5 * s).sin()
            + (t * 3.1e-6 + 0.25 * s).sin();
        *seed = advance(*seed);
        taps / 3.0 * self.level
    }
}

/// One linear-congruential step
#[inline]
fn advance(seed: u64) -> u64 {
    (seed * LCG_MULTIPLIER + LCG_INCREMENT) % LCG_MODULUS
}
