// Copyright (c) Sienna Satterwhite, CesiumDB Contributors
// SPDX-License-Identifier: GPL-3.0-only WITH Classpath-exception-2.0

use getset::CopyGetters;

use crate::errs::SkipListError;

/// The default chance that a node is promoted to the next level. This is the
/// same value redis uses for its sorted sets.
pub const DEFAULT_PROBABILITY: f64 = 0.25;

/// The hard upper bound on the number of levels any list can have. The head
/// sentinel is sized up to `max_level` ahead of time, so this also bounds
/// that allocation. With `p = 0.25` you'd need around 2^128 entries before a
/// node is likely to want more than this.
pub const MAX_LEVEL: usize = 64;

/// Construction time options for a [`crate::SkipList`].
#[derive(Debug, Clone, Copy, PartialEq, CopyGetters)]
#[getset(get_copy = "pub")]
pub struct SkipListConfig {
    /// Chance that a node is present on the next level up.
    probability: f64,
    /// The number of levels the list will ever use, in `1..=MAX_LEVEL`.
    max_level: usize,
    /// Seed for the level generator. `None` seeds from the OS.
    seed: Option<u64>,
}

impl Default for SkipListConfig {
    fn default() -> Self {
        SkipListConfig {
            probability: DEFAULT_PROBABILITY,
            max_level: MAX_LEVEL,
            seed: None,
        }
    }
}

impl SkipListConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_probability(mut self, probability: f64) -> Self {
        self.probability = probability;
        self
    }

    pub fn with_max_level(mut self, max_level: usize) -> Self {
        self.max_level = max_level;
        self
    }

    /// Fix the level generator's seed so level draws are reproducible.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Checks the options before anything gets allocated.
    pub fn validate(&self) -> Result<(), SkipListError> {
        // written so NaN fails too
        if !(self.probability > 0.0 && self.probability < 1.0) {
            return Err(SkipListError::InvalidProbability(self.probability));
        }
        if self.max_level == 0 || self.max_level > MAX_LEVEL {
            return Err(SkipListError::LevelOutOfBounds {
                requested: self.max_level,
                max: MAX_LEVEL,
            });
        }
        Ok(())
    }
}
