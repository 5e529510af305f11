//! Candidate selection for a draw, independent of any spin animation.

use std::collections::VecDeque;

use rand::{rngs::StdRng, Rng, SeedableRng};

pub trait Selector: Send {
    /// Returns an index in `0..len`. Never called with fewer than two candidates.
    fn pick(&mut self, len: usize) -> usize;
}

/// Uniform pick backed by a fast, non-cryptographic RNG.
pub struct RandomSelector {
    rng: StdRng,
}

impl RandomSelector {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for RandomSelector {
    fn default() -> Self {
        Self::new()
    }
}

impl Selector for RandomSelector {
    fn pick(&mut self, len: usize) -> usize {
        self.rng.gen_range(0..len)
    }
}

/// Replays a fixed list of picks, wrapping each into range. Counts calls so
/// tests can assert whether the selector was consulted at all.
#[derive(Debug, Default)]
pub struct ScriptedSelector {
    picks: VecDeque<usize>,
    calls: usize,
}

impl ScriptedSelector {
    pub fn new(picks: impl IntoIterator<Item = usize>) -> Self {
        Self {
            picks: picks.into_iter().collect(),
            calls: 0,
        }
    }

    pub fn calls(&self) -> usize {
        self.calls
    }
}

impl Selector for ScriptedSelector {
    fn pick(&mut self, len: usize) -> usize {
        self.calls += 1;
        self.picks.pop_front().unwrap_or(0) % len
    }
}
