// Copyright © 2025 lituus-io <spicyzhug@gmail.com>
// All Rights Reserved.
// Licensed under PolyForm Noncommercial 1.0.0

//! Random search without replacement
//!
//! The Cartesian product is shuffled once and evaluated in shuffled order,
//! so a run never scores the same combination twice. Asking for more
//! iterations than there are combinations clamps the budget and records an
//! [`Adjustment`](crate::types::Adjustment).

use crate::error::{Error, Result};
use crate::evaluate::{EvalConfig, Objective};
use crate::llm::Llm;
use crate::progress::{Progress, ProgressObserver};
use crate::space::CandidateKey;
use crate::strategy::{clamp_budget, finish, rng_from, SearchRequest, SearchStrategy};
use crate::types::{History, SearchOutcome};
use rand::seq::SliceRandom;

/// Configuration for random search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RandomSearchConfig {
    /// Candidates to evaluate.
    pub iterations: usize,
    /// Seed for the shuffle; `None` draws from entropy.
    pub seed: Option<u64>,
}

impl Default for RandomSearchConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl RandomSearchConfig {
    /// Create default configuration.
    pub const fn new() -> Self {
        Self {
            iterations: 5,
            seed: None,
        }
    }

    /// Set iterations.
    pub const fn with_iterations(mut self, n: usize) -> Self {
        self.iterations = n;
        self
    }

    /// Set seed.
    pub const fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Check the configuration is usable.
    pub fn validate(&self) -> Result<()> {
        if self.iterations == 0 {
            return Err(Error::config("iterations must be at least 1"));
        }
        Ok(())
    }
}

/// Random search strategy.
#[derive(Debug, Clone, Copy)]
pub struct RandomSearch {
    config: RandomSearchConfig,
    eval: EvalConfig,
}

impl Default for RandomSearch {
    fn default() -> Self {
        Self::new(RandomSearchConfig::new())
    }
}

impl RandomSearch {
    /// Create with the given configuration and the random-search evaluation defaults.
    pub const fn new(config: RandomSearchConfig) -> Self {
        Self {
            config,
            eval: EvalConfig::random_search(),
        }
    }

    /// Set evaluation configuration.
    pub const fn with_eval(mut self, eval: EvalConfig) -> Self {
        self.eval = eval;
        self
    }

    /// Get the configuration.
    pub const fn config(&self) -> &RandomSearchConfig {
        &self.config
    }

    /// Get the evaluation configuration.
    pub const fn eval_config(&self) -> &EvalConfig {
        &self.eval
    }

    async fn search_inner<G: Llm, O: ProgressObserver>(
        &self,
        request: &SearchRequest<'_>,
        generator: &G,
        observer: &mut O,
    ) -> Result<SearchOutcome> {
        request.validate()?;
        self.config.validate()?;
        self.eval.validate()?;

        let mut adjustments = Vec::new();
        let iterations = clamp_budget(
            "iterations",
            self.config.iterations,
            request.space.len(),
            &mut adjustments,
        );

        let mut rng = rng_from(self.config.seed);
        let mut order: Vec<CandidateKey> = request.space.keys().collect();
        order.shuffle(&mut rng);
        order.truncate(iterations);

        let objective = Objective::new(
            generator,
            request.space,
            request.task_description,
            request.task_type,
            request.dataset,
            &self.eval,
        );

        let mut results = Vec::with_capacity(iterations);
        let mut best_score = f64::NEG_INFINITY;
        let mut cancelled = false;

        for (i, key) in order.into_iter().enumerate() {
            let scored = objective.score(key).await?;
            let score = scored.score();
            best_score = best_score.max(score);
            results.push(scored.into_result(i + 1, request.task_type));

            let flow = observer.on_progress(&Progress::Iteration {
                current: i + 1,
                total: iterations,
                score,
                best_score,
            });
            if flow.is_break() {
                cancelled = i + 1 < iterations;
                break;
            }
        }

        finish(self.name(), results, History::None, adjustments, cancelled)
    }
}

impl SearchStrategy for RandomSearch {
    fn name(&self) -> &'static str {
        "random_search"
    }

    async fn run<G: Llm, O: ProgressObserver>(
        &self,
        request: &SearchRequest<'_>,
        generator: &G,
        observer: &mut O,
    ) -> Result<SearchOutcome> {
        let fut = self.search_inner(request, generator, observer);
        #[cfg(feature = "tracing")]
        let fut = tracing::Instrument::instrument(
            fut,
            tracing::info_span!(
                "random_search",
                iterations = self.config.iterations,
                space = request.space.len()
            ),
        );
        fut.await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::MockLlm;
    use crate::space::SearchSpace;
    use crate::types::{TaskType, TestSample};
    use std::collections::HashSet;
    use std::ops::ControlFlow;
    use std::time::Duration;

    fn strategy(iterations: usize) -> RandomSearch {
        RandomSearch::new(RandomSearchConfig::new().with_iterations(iterations).with_seed(11))
            .with_eval(EvalConfig::random_search().with_call_delay(Duration::ZERO))
    }

    fn dataset() -> Vec<TestSample> {
        vec![TestSample::new("good", "pos"), TestSample::new("bad", "neg")]
    }

    #[tokio::test]
    async fn test_runs_requested_iterations_without_duplicates() {
        let space = SearchSpace::new(["r1", "r2", "r3"], ["s1", "s2"], ["t1", "t2"]);
        let data = dataset();
        let request = SearchRequest::new("classify", TaskType::Classification, &data, &space);
        let llm = MockLlm::new(|_| "pos".to_string());

        let outcome = strategy(6).search(&request, &llm).await.unwrap();
        assert_eq!(outcome.results.len(), 6);
        assert!(outcome.adjustments.is_empty());
        let unique: HashSet<_> = outcome.results.iter().map(|r| r.candidate()).collect();
        assert_eq!(unique.len(), 6);
        let ids: Vec<usize> = outcome.results.iter().map(|r| r.iteration_id).collect();
        assert_eq!(ids, (1..=6).collect::<Vec<_>>());
        assert_eq!(outcome.best.avg_score, 50.0);
        assert_eq!(outcome.best.iteration_id, 1);
    }

    #[tokio::test]
    async fn test_best_tracks_scoring_role() {
        let space = SearchSpace::new(["expert", "novice"], ["s1", "s2"], ["t1"]);
        let data = dataset();
        let request = SearchRequest::new("classify", TaskType::Classification, &data, &space);
        let llm = MockLlm::new(|p| {
            if p.contains("expert") && p.contains("good") {
                "pos".to_string()
            } else if p.contains("expert") {
                "neg".to_string()
            } else {
                "other".to_string()
            }
        });

        let outcome = strategy(4).search(&request, &llm).await.unwrap();
        assert_eq!(outcome.best.role, "expert");
        assert_eq!(outcome.best.avg_score, 100.0);
    }

    #[tokio::test]
    async fn test_cancel_on_first_checkpoint() {
        let space = SearchSpace::new(["r1", "r2"], ["s1"], ["t1"]);
        let data = dataset();
        let request = SearchRequest::new("classify", TaskType::Classification, &data, &space);
        let llm = MockLlm::new(|_| "pos".to_string());

        let mut observer = |_: &Progress| ControlFlow::Break(());
        let outcome = strategy(2).run(&request, &llm, &mut observer).await.unwrap();
        assert!(outcome.cancelled);
        assert_eq!(outcome.results.len(), 1);
    }

    #[tokio::test]
    async fn test_zero_iterations_is_config_error() {
        let space = SearchSpace::new(["r1"], ["s1"], ["t1"]);
        let data = dataset();
        let request = SearchRequest::new("classify", TaskType::Classification, &data, &space);
        let llm = MockLlm::new(|_| "pos".to_string());

        let err = strategy(0).search(&request, &llm).await.unwrap_err();
        assert!(err.is_config_error());
    }
}
