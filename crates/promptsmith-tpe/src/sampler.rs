// Copyright © 2025 lituus-io <spicyzhug@gmail.com>
// All Rights Reserved.
// Licensed under PolyForm Noncommercial 1.0.0

//! TPE sampler
//!
//! Splits completed trials into a good and a bad group, fits a Parzen
//! estimator to each, draws candidates from the good density and keeps the
//! one maximizing `l(x) / g(x)`.

use crate::error::{Result, TpeError};
use crate::parzen::ParzenEstimator;
use crate::study::{Direction, Trial};
use crate::Assignment;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Configuration for the TPE sampler.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TpeConfig {
    /// Trials sampled uniformly before the model is used.
    pub n_startup_trials: usize,
    /// Candidates drawn from the good density per suggestion.
    pub n_ei_candidates: usize,
    /// Model dimensions jointly instead of independently.
    pub multivariate: bool,
    /// Weight of the uniform prior component.
    pub prior_weight: f64,
    /// Fraction of trials in the good group.
    pub gamma: f64,
    /// Upper bound on the good group size.
    pub max_good: usize,
    /// Random seed; `None` draws from entropy.
    pub seed: Option<u64>,
}

impl Default for TpeConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl TpeConfig {
    /// Create default configuration.
    pub const fn new() -> Self {
        Self {
            n_startup_trials: 10,
            n_ei_candidates: 24,
            multivariate: false,
            prior_weight: 1.0,
            gamma: 0.1,
            max_good: 25,
            seed: None,
        }
    }

    /// Set the number of random startup trials.
    pub const fn with_n_startup_trials(mut self, n: usize) -> Self {
        self.n_startup_trials = n;
        self
    }

    /// Set the number of candidates scored per suggestion.
    pub const fn with_n_ei_candidates(mut self, n: usize) -> Self {
        self.n_ei_candidates = n;
        self
    }

    /// Enable joint modeling of all dimensions.
    pub const fn with_multivariate(mut self, multivariate: bool) -> Self {
        self.multivariate = multivariate;
        self
    }

    /// Set the prior component weight.
    pub const fn with_prior_weight(mut self, weight: f64) -> Self {
        self.prior_weight = weight;
        self
    }

    /// Set the good-group fraction.
    pub const fn with_gamma(mut self, gamma: f64) -> Self {
        self.gamma = gamma;
        self
    }

    /// Set random seed.
    pub const fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Check the configuration is usable.
    pub fn validate(&self) -> Result<()> {
        if self.n_ei_candidates == 0 {
            return Err(TpeError::InvalidConfig(
                "n_ei_candidates must be at least 1".into(),
            ));
        }
        if !(self.prior_weight > 0.0 && self.prior_weight.is_finite()) {
            return Err(TpeError::InvalidConfig(format!(
                "prior_weight must be positive, got {}",
                self.prior_weight
            )));
        }
        if !(self.gamma > 0.0 && self.gamma <= 1.0) {
            return Err(TpeError::InvalidConfig(format!(
                "gamma must be in (0, 1], got {}",
                self.gamma
            )));
        }
        if self.max_good == 0 {
            return Err(TpeError::InvalidConfig("max_good must be at least 1".into()));
        }
        Ok(())
    }

    /// Size of the good group for `n` completed trials.
    #[inline]
    pub fn n_good(&self, n: usize) -> usize {
        ((n as f64 * self.gamma).ceil() as usize)
            .min(self.max_good)
            .max(1)
    }
}

/// TPE sampler over categorical dimensions.
pub struct TpeSampler {
    config: TpeConfig,
    rng: StdRng,
}

impl TpeSampler {
    /// Create a sampler, validating the configuration.
    pub fn new(config: TpeConfig) -> Result<Self> {
        config.validate()?;
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Ok(Self { config, rng })
    }

    /// Get the configuration.
    pub const fn config(&self) -> &TpeConfig {
        &self.config
    }

    /// Uniform random assignment.
    pub fn sample_uniform(&mut self, dims: &[usize]) -> Assignment {
        dims.iter().map(|&k| self.rng.gen_range(0..k)).collect()
    }

    /// Suggest the next assignment given the completed trials.
    pub fn sample(&mut self, dims: &[usize], trials: &[Trial], direction: Direction) -> Assignment {
        if trials.len() < self.config.n_startup_trials || trials.is_empty() {
            return self.sample_uniform(dims);
        }

        // Best first; stable so ties keep trial order.
        let mut sorted: Vec<&Trial> = trials.iter().collect();
        match direction {
            Direction::Maximize => sorted.sort_by(|a, b| b.value.total_cmp(&a.value)),
            Direction::Minimize => sorted.sort_by(|a, b| a.value.total_cmp(&b.value)),
        }

        let n_good = self.config.n_good(sorted.len());
        let (good, bad) = sorted.split_at(n_good);

        let l = ParzenEstimator::new(
            dims,
            good.iter().map(|t| &t.params).collect(),
            self.config.prior_weight,
            self.config.multivariate,
        );
        let g = ParzenEstimator::new(
            dims,
            bad.iter().map(|t| &t.params).collect(),
            self.config.prior_weight,
            self.config.multivariate,
        );

        let mut best: Option<(f64, Assignment)> = None;
        for _ in 0..self.config.n_ei_candidates {
            let candidate = l.sample(&mut self.rng);
            let score = l.log_pdf(&candidate) - g.log_pdf(&candidate);
            if best.as_ref().map_or(true, |(s, _)| score > *s) {
                best = Some((score, candidate));
            }
        }

        match best {
            Some((_, candidate)) => candidate,
            None => self.sample_uniform(dims),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use smallvec::smallvec;

    fn trial(number: usize, params: Assignment, value: f64) -> Trial {
        Trial {
            number,
            params,
            value,
        }
    }

    #[test]
    fn test_config_builder() {
        let config = TpeConfig::new()
            .with_n_startup_trials(3)
            .with_n_ei_candidates(8)
            .with_multivariate(true)
            .with_seed(42);
        assert_eq!(config.n_startup_trials, 3);
        assert_eq!(config.n_ei_candidates, 8);
        assert!(config.multivariate);
        assert_eq!(config.seed, Some(42));
    }

    #[test]
    fn test_invalid_config() {
        assert!(TpeSampler::new(TpeConfig::new().with_n_ei_candidates(0)).is_err());
        assert!(TpeSampler::new(TpeConfig::new().with_prior_weight(0.0)).is_err());
        assert!(TpeSampler::new(TpeConfig::new().with_gamma(1.5)).is_err());
    }

    #[test]
    fn test_n_good() {
        let config = TpeConfig::new();
        assert_eq!(config.n_good(1), 1);
        assert_eq!(config.n_good(10), 1);
        assert_eq!(config.n_good(11), 2);
        assert_eq!(config.n_good(1000), 25);
    }

    #[test]
    fn test_startup_is_uniform_and_in_range() {
        let mut sampler = TpeSampler::new(TpeConfig::new().with_seed(1)).unwrap();
        let dims = [5usize, 5, 3];
        for _ in 0..100 {
            let a = sampler.sample(&dims, &[], Direction::Maximize);
            assert!(a.iter().zip(dims.iter()).all(|(v, k)| v < k));
        }
    }

    #[test]
    fn test_model_prefers_good_region() {
        let dims = [5usize, 5, 3];
        let mut trials = Vec::new();
        let mut n = 0;
        for a in 0..5 {
            for b in 0..5 {
                let value = if a == 2 && b == 3 { 100.0 } else { 0.0 };
                trials.push(trial(n, smallvec![a, b, 0], value));
                n += 1;
            }
        }

        let config = TpeConfig::new()
            .with_seed(9)
            .with_n_startup_trials(5)
            .with_gamma(0.02)
            .with_multivariate(true);
        let mut sampler = TpeSampler::new(config).unwrap();

        let mut hits = 0;
        for _ in 0..50 {
            let a = sampler.sample(&dims, &trials, Direction::Maximize);
            if a[0] == 2 && a[1] == 3 {
                hits += 1;
            }
        }
        assert!(hits > 25, "hits = {hits}");
    }
}
