//! Shared deterministic heading perturbation.
//!
//! Agents whose sensors read almost nothing nudge their heading by a small
//! amount taken from a single counter shared by the whole population. The
//! counter is incremented before every use and mapped to one of eleven
//! offsets in `[-0.1, 0.1]` radians. It is not a random source: stepping the
//! same agents in the same order reproduces the same offsets. Under parallel
//! stepping the order of increments across agents is unspecified.

use std::sync::atomic::{AtomicU64, Ordering};

/// Largest absolute heading offset the accumulator can produce, radians.
pub const MAX_JITTER: f32 = 0.1;

#[derive(Debug, Default)]
pub struct Jitter {
    counter: AtomicU64,
}

impl Jitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts the accumulator at `value`; the next offset uses `value + 1`.
    pub fn starting_at(value: u64) -> Self {
        Self {
            counter: AtomicU64::new(value),
        }
    }

    /// Increments the accumulator and returns the heading offset for the new
    /// value: `((value mod 11) - 5) / 50`.
    pub fn next_offset(&self) -> f32 {
        let value = self.counter.fetch_add(1, Ordering::Relaxed).wrapping_add(1);
        offset_for(value)
    }

    /// Number of offsets handed out so far (plus the starting value).
    pub fn value(&self) -> u64 {
        self.counter.load(Ordering::Relaxed)
    }
}

fn offset_for(value: u64) -> f32 {
    ((value % 11) as f32 - 5.0) / 50.0
}
