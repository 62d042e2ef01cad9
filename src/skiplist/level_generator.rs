use rand::prelude::*;

use crate::{
    config::{
        SkipListConfig,
        DEFAULT_PROBABILITY,
        MAX_LEVEL,
    },
    errs::SkipListError,
};

/// Upon the insertion of a new node in the list, the node is replicated to high
/// levels with a certain probability as determined by a `LevelGenerator`.
pub trait LevelGenerator {
    /// The total number of levels that are assumed to exist for this level
    /// generator.
    fn total(&self) -> usize;
    /// Generate a random height for a new node in the range `[1, total]`.
    ///
    /// This must never return a height that is `0` or `> self.total()`.
    fn random(&mut self) -> usize;
    /// The chance that a node reaches one level higher than the last.
    fn probability(&self) -> f64;
}

/// A level generator which will produce geometrically distributed heights.
///
/// Every node starts at height 1 and each further level is granted with
/// probability `p`, so `P(height >= k) = p^(k-1)`. Heights are clamped at
/// `total` rather than rejected.
#[derive(Debug, Clone)]
pub struct GeometricLevelGenerator {
    total: usize,
    p: f64,
    rng: SmallRng, // Fast generator
}

impl GeometricLevelGenerator {
    /// Create a new GeometricLevelGenerator with `total` number of levels,
    /// and `p` as the probability that a given node is present in the next
    /// level. `seed` pins the generator for reproducible layouts; without one
    /// the generator is seeded from the OS.
    pub fn new(total: usize, p: f64, seed: Option<u64>) -> Result<Self, SkipListError> {
        SkipListConfig::new()
            .with_max_level(total)
            .with_probability(p)
            .validate()?;

        let rng = match seed {
            | Some(seed) => SmallRng::seed_from_u64(seed),
            | None => SmallRng::from_entropy(),
        };

        Ok(GeometricLevelGenerator { total, p, rng })
    }

    pub fn from_config(config: &SkipListConfig) -> Result<Self, SkipListError> {
        Self::new(config.max_level(), config.probability(), config.seed())
    }
}

impl Default for GeometricLevelGenerator {
    fn default() -> Self {
        GeometricLevelGenerator {
            total: MAX_LEVEL,
            p: DEFAULT_PROBABILITY,
            rng: SmallRng::from_entropy(),
        }
    }
}

impl LevelGenerator for GeometricLevelGenerator {
    fn random(&mut self) -> usize {
        let mut h = 1;
        while h < self.total && self.rng.gen::<f64>() < self.p {
            h += 1;
        }
        h
    }

    fn total(&self) -> usize {
        self.total
    }

    fn probability(&self) -> f64 {
        self.p
    }
}

#[cfg(test)]
mod tests {
    use super::{
        GeometricLevelGenerator,
        LevelGenerator,
    };
    use crate::{
        config::MAX_LEVEL,
        errs::SkipListError,
    };

    #[test]
    fn invalid_total() {
        assert_eq!(
            GeometricLevelGenerator::new(0, 0.5, None).unwrap_err(),
            SkipListError::LevelOutOfBounds {
                requested: 0,
                max: MAX_LEVEL
            }
        );
        assert!(GeometricLevelGenerator::new(MAX_LEVEL + 1, 0.5, None).is_err());
    }

    #[test]
    fn invalid_p_0() {
        assert_eq!(
            GeometricLevelGenerator::new(1, 0.0, None).unwrap_err(),
            SkipListError::InvalidProbability(0.0)
        );
    }

    #[test]
    fn invalid_p_1() {
        assert_eq!(
            GeometricLevelGenerator::new(1, 1.0, None).unwrap_err(),
            SkipListError::InvalidProbability(1.0)
        );
    }

    #[test]
    fn new() {
        assert!(GeometricLevelGenerator::new(1, 0.5, None).is_ok());
    }

    #[test]
    fn single_level_never_promotes() {
        let mut generator = GeometricLevelGenerator::new(1, 0.99, Some(1)).unwrap();
        for _ in 0..1_000 {
            assert_eq!(generator.random(), 1);
        }
    }

    #[test]
    fn heights_are_clamped() {
        let mut generator = GeometricLevelGenerator::new(4, 0.9, Some(3)).unwrap();
        let mut saw_cap = false;
        for _ in 0..10_000 {
            let h = generator.random();
            assert!((1..=4).contains(&h), "height {h} out of range");
            saw_cap |= h == 4;
        }
        assert!(saw_cap, "p = 0.9 must reach the cap");
    }

    #[test]
    fn seeded_generators_agree() {
        let mut a = GeometricLevelGenerator::new(MAX_LEVEL, 0.5, Some(42)).unwrap();
        let mut b = GeometricLevelGenerator::new(MAX_LEVEL, 0.5, Some(42)).unwrap();
        let left: Vec<usize> = (0..256).map(|_| a.random()).collect();
        let right: Vec<usize> = (0..256).map(|_| b.random()).collect();
        assert_eq!(left, right);
    }

    #[test]
    fn distribution_is_geometric() {
        const DRAWS: usize = 100_000;
        let p = 0.25;
        let mut generator = GeometricLevelGenerator::new(MAX_LEVEL, p, Some(0xC351)).unwrap();

        let mut at_least = [0usize; 4];
        for _ in 0..DRAWS {
            let h = generator.random();
            for (k, count) in at_least.iter_mut().enumerate() {
                if h > k {
                    *count += 1;
                }
            }
        }

        assert_eq!(at_least[0], DRAWS);
        for k in 1..at_least.len() {
            let observed = at_least[k] as f64 / DRAWS as f64;
            let expected = p.powi(k as i32);
            assert!(
                (observed - expected).abs() < 0.01,
                "P(height > {k}) = {observed}, expected about {expected}"
            );
        }
    }
}
