// Copyright © 2025 lituus-io <spicyzhug@gmail.com>
// All Rights Reserved.
// Licensed under PolyForm Noncommercial 1.0.0

//! Search strategies
//!
//! - Random search: shuffled Cartesian product, no repeats
//! - Genetic algorithm: uniform crossover with a run-wide uniqueness pool
//! - Bayesian search: multivariate TPE over the three axes
//!
//! [`AnyStrategy`] wraps one of the three so a strategy chosen at runtime
//! (from a config file, say) runs through the same [`SearchStrategy`] call.

pub mod bayesian;
pub mod genetic;
pub mod random;

pub use bayesian::{BayesianConfig, BayesianSearch};
pub use genetic::{GeneticAlgorithm, GeneticConfig};
pub use random::{RandomSearch, RandomSearchConfig};

use crate::error::Result;
use crate::llm::Llm;
use crate::progress::ProgressObserver;
use crate::strategy::{SearchRequest, SearchStrategy};
use crate::types::SearchOutcome;

/// One of the built-in strategies.
#[derive(Debug, Clone, Copy)]
pub enum AnyStrategy {
    RandomSearch(RandomSearch),
    Genetic(GeneticAlgorithm),
    Bayesian(BayesianSearch),
}

impl From<RandomSearch> for AnyStrategy {
    fn from(s: RandomSearch) -> Self {
        Self::RandomSearch(s)
    }
}

impl From<GeneticAlgorithm> for AnyStrategy {
    fn from(s: GeneticAlgorithm) -> Self {
        Self::Genetic(s)
    }
}

impl From<BayesianSearch> for AnyStrategy {
    fn from(s: BayesianSearch) -> Self {
        Self::Bayesian(s)
    }
}

impl SearchStrategy for AnyStrategy {
    fn name(&self) -> &'static str {
        match self {
            Self::RandomSearch(s) => s.name(),
            Self::Genetic(s) => s.name(),
            Self::Bayesian(s) => s.name(),
        }
    }

    async fn run<G: Llm, O: ProgressObserver>(
        &self,
        request: &SearchRequest<'_>,
        generator: &G,
        observer: &mut O,
    ) -> Result<SearchOutcome> {
        match self {
            Self::RandomSearch(s) => s.run(request, generator, observer).await,
            Self::Genetic(s) => s.run(request, generator, observer).await,
            Self::Bayesian(s) => s.run(request, generator, observer).await,
        }
    }
}
