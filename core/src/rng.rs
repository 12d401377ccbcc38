// Copyright (c) 2023 Mike Tsao. All rights reserved.

use std::time::{SystemTime, UNIX_EPOCH};

/// A small wrapper around [oorandom] so that rhythm generators can be seeded
/// for reproducible output.
#[derive(Debug)]
pub struct Rng(oorandom::Rand64);
impl Default for Rng {
    fn default() -> Self {
        // Seeded from the wall clock, so every run differs.
        Self::new_with_seed(
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_nanos())
                .unwrap_or_default(),
        )
    }
}
impl Rng {
    /// Same seed, same sequence.
    pub fn new_with_seed(seed: u128) -> Self {
        Self(oorandom::Rand64::new(seed))
    }

    #[allow(missing_docs)]
    pub fn rand_u64(&mut self) -> u64 {
        self.0.rand_u64()
    }

    /// A float in `0.0..1.0`.
    pub fn rand_float(&mut self) -> f64 {
        self.0.rand_float()
    }
}
