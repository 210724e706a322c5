// Copyright © 2025 lituus-io <spicyzhug@gmail.com>
// All Rights Reserved.
// Licensed under PolyForm Noncommercial 1.0.0

//! The search strategy interface
//!
//! Every strategy takes the same [`SearchRequest`], calls the generation
//! capability strictly one request at a time, reports a [`Progress`] event at
//! each checkpoint and returns a self-contained [`SearchOutcome`].
//!
//! [`Progress`]: crate::progress::Progress

use crate::error::{Error, Result};
use crate::llm::Llm;
use crate::progress::{NoProgress, ProgressObserver};
use crate::space::SearchSpace;
use crate::types::{first_best, Adjustment, History, SearchOutcome, SearchResult, TaskType, TestSample};
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Inputs shared by every strategy.
#[derive(Clone, Copy, Debug)]
pub struct SearchRequest<'a> {
    /// What the prompt should make the model do.
    pub task_description: &'a str,
    pub task_type: TaskType,
    /// Labeled samples every candidate is scored against.
    pub dataset: &'a [TestSample],
    pub space: &'a SearchSpace,
}

impl<'a> SearchRequest<'a> {
    /// Create a request.
    pub const fn new(
        task_description: &'a str,
        task_type: TaskType,
        dataset: &'a [TestSample],
        space: &'a SearchSpace,
    ) -> Self {
        Self {
            task_description,
            task_type,
            dataset,
            space,
        }
    }

    /// Fail fast on inputs that cannot produce a single evaluation.
    pub fn validate(&self) -> Result<()> {
        self.space.validate()?;
        if self.dataset.is_empty() {
            return Err(Error::config("dataset is empty"));
        }
        Ok(())
    }
}

/// A prompt search strategy.
///
/// `run` validates its inputs before the first generation call, so
/// configuration errors never cost any budget.
#[allow(async_fn_in_trait)]
pub trait SearchStrategy {
    /// Strategy name used in outcomes and logs.
    fn name(&self) -> &'static str;

    /// Run the search, reporting to `observer` at every checkpoint.
    async fn run<G: Llm, O: ProgressObserver>(
        &self,
        request: &SearchRequest<'_>,
        generator: &G,
        observer: &mut O,
    ) -> Result<SearchOutcome>;

    /// Run the search without progress reporting.
    async fn search<G: Llm>(
        &self,
        request: &SearchRequest<'_>,
        generator: &G,
    ) -> Result<SearchOutcome> {
        self.run(request, generator, &mut NoProgress).await
    }
}

/// Seeded generator, or one drawn from entropy.
pub(crate) fn rng_from(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

/// Clamp a requested budget, recording the reduction.
pub(crate) fn clamp_budget(
    parameter: &str,
    requested: usize,
    max: usize,
    adjustments: &mut Vec<Adjustment>,
) -> usize {
    if requested <= max {
        return requested;
    }
    #[cfg(feature = "tracing")]
    tracing::warn!(parameter, requested, effective = max, "budget exceeds the search space, clamping");
    adjustments.push(Adjustment {
        parameter: parameter.to_string(),
        requested,
        effective: max,
    });
    max
}

/// Assemble the outcome of a finished or cancelled run.
pub(crate) fn finish(
    strategy: &'static str,
    results: Vec<SearchResult>,
    history: History,
    adjustments: Vec<Adjustment>,
    cancelled: bool,
) -> Result<SearchOutcome> {
    let best = first_best(&results)
        .map(|i| results[i].clone())
        .ok_or_else(|| Error::other(format!("{strategy} finished without evaluating a candidate")))?;

    #[cfg(feature = "tracing")]
    tracing::info!(
        strategy,
        evaluations = results.len(),
        best_score = best.avg_score,
        role = %best.role,
        style = %best.style,
        technique = %best.technique,
        cancelled,
        "search complete"
    );

    Ok(SearchOutcome {
        strategy: strategy.to_string(),
        evaluations: results.len(),
        results,
        best,
        history,
        adjustments,
        cancelled,
    })
}
