// Copyright © 2025 lituus-io <spicyzhug@gmail.com>
// All Rights Reserved.
// Licensed under PolyForm Noncommercial 1.0.0

//! Categorical Parzen estimator.
//!
//! A mixture with one component per observation plus a uniform prior
//! component of weight `prior_weight`. An observation's kernel on dimension
//! `d` with `k` categories puts `(1 + pw/k) / (1 + pw)` on the observed
//! category and `(pw/k) / (1 + pw)` on each other one.

use crate::Assignment;
use rand::Rng;

pub(crate) struct ParzenEstimator<'a> {
    dims: &'a [usize],
    /// Observation centers; the prior component is implicit.
    centers: Vec<&'a Assignment>,
    prior_weight: f64,
    multivariate: bool,
}

impl<'a> ParzenEstimator<'a> {
    pub(crate) fn new(
        dims: &'a [usize],
        centers: Vec<&'a Assignment>,
        prior_weight: f64,
        multivariate: bool,
    ) -> Self {
        Self {
            dims,
            centers,
            prior_weight,
            multivariate,
        }
    }

    #[inline]
    fn total_weight(&self) -> f64 {
        self.centers.len() as f64 + self.prior_weight
    }

    /// Kernel mass at category `c` of dimension `d`. `None` is the prior.
    #[inline]
    fn kernel(&self, center: Option<&Assignment>, d: usize, c: usize) -> f64 {
        let k = self.dims[d] as f64;
        match center {
            None => 1.0 / k,
            Some(x) if x[d] == c => (1.0 + self.prior_weight / k) / (1.0 + self.prior_weight),
            Some(_) => (self.prior_weight / k) / (1.0 + self.prior_weight),
        }
    }

    /// Log density of an assignment.
    pub(crate) fn log_pdf(&self, x: &Assignment) -> f64 {
        let total = self.total_weight();

        if self.multivariate {
            let joint = |center: Option<&Assignment>| -> f64 {
                (0..self.dims.len())
                    .map(|d| self.kernel(center, d, x[d]))
                    .product()
            };
            let mass = self.prior_weight * joint(None)
                + self.centers.iter().map(|&c| joint(Some(c))).sum::<f64>();
            (mass / total).ln()
        } else {
            (0..self.dims.len())
                .map(|d| {
                    let mass = self.prior_weight * self.kernel(None, d, x[d])
                        + self
                            .centers
                            .iter()
                            .map(|&c| self.kernel(Some(c), d, x[d]))
                            .sum::<f64>();
                    (mass / total).ln()
                })
                .sum()
        }
    }

    /// Pick a mixture component by weight.
    fn pick_component<R: Rng>(&self, rng: &mut R) -> Option<&'a Assignment> {
        let r = rng.gen::<f64>() * self.total_weight();
        if r < self.prior_weight || self.centers.is_empty() {
            return None;
        }
        let idx = ((r - self.prior_weight) as usize).min(self.centers.len() - 1);
        Some(self.centers[idx])
    }

    /// Draw category for dimension `d` from one component's kernel.
    fn sample_kernel<R: Rng>(&self, center: Option<&Assignment>, d: usize, rng: &mut R) -> usize {
        let k = self.dims[d];
        match center {
            Some(x) if rng.gen::<f64>() * (1.0 + self.prior_weight) < 1.0 => x[d],
            _ => rng.gen_range(0..k),
        }
    }

    /// Draw one assignment from the mixture.
    pub(crate) fn sample<R: Rng>(&self, rng: &mut R) -> Assignment {
        if self.multivariate {
            let center = self.pick_component(rng);
            (0..self.dims.len())
                .map(|d| self.sample_kernel(center, d, rng))
                .collect()
        } else {
            (0..self.dims.len())
                .map(|d| {
                    let center = self.pick_component(rng);
                    self.sample_kernel(center, d, rng)
                })
                .collect()
        }
    }
}
