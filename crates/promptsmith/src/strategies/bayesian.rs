// Copyright © 2025 lituus-io <spicyzhug@gmail.com>
// All Rights Reserved.
// Licensed under PolyForm Noncommercial 1.0.0

//! Bayesian search with a Tree-structured Parzen Estimator.
//!
//! Role, style and technique are categorical dimensions of one multivariate
//! TPE study. The first `min(5, n_trials / 3)` trials sample uniformly; the
//! rest are proposed by the density model. Trials may revisit a combination.
//!
//! The sampler lives in `promptsmith-tpe` behind the `bayesian` cargo
//! feature. Without it, [`BayesianSearch::run`](crate::SearchStrategy::run)
//! fails with [`Error::MissingDependency`] before any call is made.

use crate::error::{Error, Result};
use crate::evaluate::EvalConfig;
use crate::llm::Llm;
use crate::progress::ProgressObserver;
use crate::strategy::{SearchRequest, SearchStrategy};
use crate::types::SearchOutcome;
use std::time::Duration;

/// Configuration for Bayesian search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BayesianConfig {
    /// Number of trials
    pub n_trials: usize,
    /// Pause between trials (not after the last)
    pub trial_cooldown: Duration,
    /// Candidates drawn from the good-region model per guided trial
    pub n_ei_candidates: usize,
    /// Sampler seed; `None` draws from entropy
    pub seed: Option<u64>,
}

impl Default for BayesianConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl BayesianConfig {
    /// Create default configuration.
    pub const fn new() -> Self {
        Self {
            n_trials: 20,
            trial_cooldown: Duration::from_secs(2),
            n_ei_candidates: 24,
            seed: None,
        }
    }

    /// Set number of trials.
    pub const fn with_n_trials(mut self, n: usize) -> Self {
        self.n_trials = n;
        self
    }

    /// Set cooldown between trials.
    pub const fn with_trial_cooldown(mut self, cooldown: Duration) -> Self {
        self.trial_cooldown = cooldown;
        self
    }

    /// Set EI candidates per guided trial.
    pub const fn with_n_ei_candidates(mut self, n: usize) -> Self {
        self.n_ei_candidates = n;
        self
    }

    /// Set seed.
    pub const fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Random startup trials: `min(5, n_trials / 3)`.
    pub const fn n_startup_trials(&self) -> usize {
        let third = self.n_trials / 3;
        if third < 5 {
            third
        } else {
            5
        }
    }

    /// Check the configuration is usable.
    pub fn validate(&self) -> Result<()> {
        if self.n_trials == 0 {
            return Err(Error::config("n_trials must be at least 1"));
        }
        if self.n_ei_candidates == 0 {
            return Err(Error::config("n_ei_candidates must be at least 1"));
        }
        Ok(())
    }
}

/// Bayesian (TPE) search strategy.
#[derive(Debug, Clone, Copy)]
pub struct BayesianSearch {
    config: BayesianConfig,
    eval: EvalConfig,
}

impl Default for BayesianSearch {
    fn default() -> Self {
        Self::new(BayesianConfig::new())
    }
}

impl BayesianSearch {
    /// Create with the given configuration and the Bayesian evaluation defaults.
    pub const fn new(config: BayesianConfig) -> Self {
        Self {
            config,
            eval: EvalConfig::bayesian(),
        }
    }

    /// Set evaluation configuration.
    pub const fn with_eval(mut self, eval: EvalConfig) -> Self {
        self.eval = eval;
        self
    }

    /// Get the configuration.
    pub const fn config(&self) -> &BayesianConfig {
        &self.config
    }

    /// Get the evaluation configuration.
    pub const fn eval_config(&self) -> &EvalConfig {
        &self.eval
    }

    /// Whether the TPE sampler was compiled in.
    pub const fn is_available() -> bool {
        cfg!(feature = "bayesian")
    }

    #[cfg(not(feature = "bayesian"))]
    async fn search_inner<G: Llm, O: ProgressObserver>(
        &self,
        _request: &SearchRequest<'_>,
        _generator: &G,
        _observer: &mut O,
    ) -> Result<SearchOutcome> {
        Err(Error::MissingDependency {
            strategy: "bayesian",
            feature: "bayesian",
        })
    }

    #[cfg(feature = "bayesian")]
    async fn search_inner<G: Llm, O: ProgressObserver>(
        &self,
        request: &SearchRequest<'_>,
        generator: &G,
        observer: &mut O,
    ) -> Result<SearchOutcome> {
        use crate::evaluate::Objective;
        use crate::progress::Progress;
        use crate::space::CandidateKey;
        use crate::strategy::finish;
        use crate::types::{History, TrialHistoryEntry};
        use promptsmith_tpe::{Direction, Study, TpeConfig, TpeError};

        fn sampler_error(e: TpeError) -> Error {
            Error::config(format!("TPE sampler: {e}"))
        }

        request.validate()?;
        self.config.validate()?;
        self.eval.validate()?;

        let n_trials = self.config.n_trials;
        let mut tpe = TpeConfig::new()
            .with_n_startup_trials(self.config.n_startup_trials())
            .with_n_ei_candidates(self.config.n_ei_candidates)
            .with_multivariate(true);
        if let Some(seed) = self.config.seed {
            tpe = tpe.with_seed(seed);
        }
        let mut study =
            Study::new(&request.space.dims(), Direction::Maximize, tpe).map_err(sampler_error)?;

        let objective = Objective::new(
            generator,
            request.space,
            request.task_description,
            request.task_type,
            request.dataset,
            &self.eval,
        );

        let mut results = Vec::with_capacity(n_trials);
        let mut history = Vec::with_capacity(n_trials);
        let mut running_best = 0.0_f64;
        let mut cancelled = false;

        for trial in 1..=n_trials {
            let params = study.ask();
            let key = match params.as_slice() {
                &[role, style, technique] => CandidateKey::new(role, style, technique),
                other => {
                    return Err(Error::other(format!(
                        "sampler proposed {} dimensions, expected 3",
                        other.len()
                    )))
                }
            };

            let scored = objective.score(key).await?;
            let score = scored.score();
            study.tell(params, score).map_err(sampler_error)?;
            running_best = running_best.max(score);

            history.push(TrialHistoryEntry {
                trial,
                score,
                best_score: running_best,
                role: scored.role.clone(),
                style: scored.style.clone(),
                technique: scored.technique.clone(),
            });
            results.push(scored.into_result(trial, request.task_type));

            let flow = observer.on_progress(&Progress::Trial {
                trial,
                total: n_trials,
                score,
                best_score: running_best,
            });
            if flow.is_break() {
                cancelled = trial < n_trials;
                break;
            }

            if trial < n_trials && !self.config.trial_cooldown.is_zero() {
                tokio::time::sleep(self.config.trial_cooldown).await;
            }
        }

        let best_number = study.best_trial().map_err(sampler_error)?.number;
        let mut outcome = finish(
            self.name(),
            results,
            History::Trials(history),
            Vec::new(),
            cancelled,
        )?;
        // Trial numbers index `results`; the first maximum agrees with the study.
        if let Some(best) = outcome.results.get(best_number) {
            outcome.best = best.clone();
        }
        Ok(outcome)
    }
}

impl SearchStrategy for BayesianSearch {
    fn name(&self) -> &'static str {
        "bayesian"
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
                "bayesian",
                n_trials = self.config.n_trials,
                n_startup_trials = self.config.n_startup_trials()
            ),
        );
        fut.await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_startup_trials() {
        assert_eq!(BayesianConfig::new().n_startup_trials(), 5);
        assert_eq!(BayesianConfig::new().with_n_trials(9).n_startup_trials(), 3);
        assert_eq!(BayesianConfig::new().with_n_trials(2).n_startup_trials(), 0);
    }

    #[test]
    fn test_validate() {
        assert!(BayesianConfig::new().validate().is_ok());
        assert!(BayesianConfig::new().with_n_trials(0).validate().is_err());
        assert!(BayesianConfig::new()
            .with_n_ei_candidates(0)
            .validate()
            .is_err());
    }

    #[cfg(feature = "bayesian")]
    mod with_sampler {
        use super::*;
        use crate::llm::{FailingLlm, MockLlm};
        use crate::progress::Progress;
        use crate::space::SearchSpace;
        use crate::types::{TaskType, TestSample};
        use std::ops::ControlFlow;

        fn search(n_trials: usize) -> BayesianSearch {
            BayesianSearch::new(
                BayesianConfig::new()
                    .with_n_trials(n_trials)
                    .with_trial_cooldown(Duration::ZERO)
                    .with_seed(21),
            )
            .with_eval(EvalConfig::bayesian().with_call_delay(Duration::ZERO))
        }

        #[tokio::test]
        async fn test_history_tracks_running_best() {
            let space = SearchSpace::new(["expert", "novice"], ["s1", "s2"], ["t1", "t2"]);
            let data = vec![TestSample::new("x", "y")];
            let request = SearchRequest::new("t", TaskType::Classification, &data, &space);
            let llm = MockLlm::new(|p| if p.contains("expert") { "y" } else { "n" }.to_string());

            let outcome = search(9).search(&request, &llm).await.unwrap();
            assert_eq!(outcome.results.len(), 9);
            let trials = outcome.history.trials().unwrap();
            assert_eq!(trials.len(), 9);

            let mut best = 0.0_f64;
            for (entry, result) in trials.iter().zip(&outcome.results) {
                best = best.max(entry.score);
                assert_eq!(entry.best_score, best);
                assert_eq!(entry.score, result.avg_score);
                assert_eq!(entry.role, result.role);
            }
            let max = outcome.scores().into_iter().fold(0.0_f64, f64::max);
            assert_eq!(outcome.best.avg_score, max);
        }

        #[tokio::test]
        async fn test_all_failures_score_zero() {
            let space = SearchSpace::new(["r"], ["s"], ["t"]);
            let data = vec![TestSample::new("x", "y")];
            let request = SearchRequest::new("t", TaskType::Classification, &data, &space);
            let llm = FailingLlm::new("invalid API key");

            let outcome = search(3).search(&request, &llm).await.unwrap();
            assert_eq!(outcome.results.len(), 3);
            assert!(outcome.scores().iter().all(|&s| s == 0.0));
            assert_eq!(outcome.best.iteration_id, 1);
        }

        #[tokio::test]
        async fn test_cancel_after_first_trial() {
            let space = SearchSpace::new(["r"], ["s"], ["t"]);
            let data = vec![TestSample::new("x", "y")];
            let request = SearchRequest::new("t", TaskType::Classification, &data, &space);
            let llm = MockLlm::new(|_| "y".to_string());

            let mut observer = |_: &Progress| ControlFlow::Break(());
            let outcome = search(5).run(&request, &llm, &mut observer).await.unwrap();
            assert!(outcome.cancelled);
            assert_eq!(outcome.results.len(), 1);
        }
    }
}
