//! Index sources for the prize wheel.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Mutex;

/// Picks a slot in a table of `len` entries; `len` is always non-zero.
pub trait PrizePicker: Send + Sync {
    fn pick_index(&self, len: usize) -> usize;
}

/// Uniform draw from the thread-local generator.
#[derive(Clone, Copy, Debug, Default)]
pub struct ThreadRngPicker;

impl PrizePicker for ThreadRngPicker {
    fn pick_index(&self, len: usize) -> usize {
        rand::rng().random_range(0..len)
    }
}

/// Uniform draw from a seeded generator, reproducible across runs.
#[derive(Debug)]
pub struct SeededPicker {
    rng: Mutex<StdRng>,
}

impl SeededPicker {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl PrizePicker for SeededPicker {
    fn pick_index(&self, len: usize) -> usize {
        let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        rng.random_range(0..len)
    }
}

/// Always lands on the same slot (wrapped into range).
#[derive(Clone, Copy, Debug, Default)]
pub struct FixedPicker(pub usize);

impl PrizePicker for FixedPicker {
    fn pick_index(&self, len: usize) -> usize {
        self.0 % len
    }
}
