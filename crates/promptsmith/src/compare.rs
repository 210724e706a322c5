// Copyright © 2025 lituus-io <spicyzhug@gmail.com>
// All Rights Reserved.
// Licensed under PolyForm Noncommercial 1.0.0

//! Side-by-side strategy comparison.
//!
//! Runs each strategy on the same request, one after another, and
//! summarizes the score distribution of every run.

use crate::error::Result;
use crate::llm::Llm;
use crate::progress::NoProgress;
use crate::space::Candidate;
use crate::strategies::AnyStrategy;
use crate::strategy::{SearchRequest, SearchStrategy};
use crate::types::SearchOutcome;
use serde::{Deserialize, Serialize};

/// Summary of one strategy's run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ComparisonEntry {
    pub strategy: String,
    pub best_score: f64,
    pub mean_score: f64,
    pub worst_score: f64,
    /// Population standard deviation of the scores; lower is more stable.
    pub std_dev: f64,
    pub evaluations: usize,
    pub best: Candidate,
    pub cancelled: bool,
}

impl ComparisonEntry {
    /// Summarize an outcome.
    pub fn from_outcome(outcome: &SearchOutcome) -> Self {
        let scores = outcome.scores();
        let n = scores.len().max(1) as f64;
        let mean = scores.iter().sum::<f64>() / n;
        let variance = scores.iter().map(|s| (s - mean).powi(2)).sum::<f64>() / n;
        let worst = scores.iter().copied().fold(f64::INFINITY, f64::min);

        Self {
            strategy: outcome.strategy.clone(),
            best_score: outcome.best.avg_score,
            mean_score: mean,
            worst_score: if worst.is_finite() { worst } else { 0.0 },
            std_dev: variance.sqrt(),
            evaluations: outcome.evaluations,
            best: outcome.best.candidate(),
            cancelled: outcome.cancelled,
        }
    }
}

/// Result of comparing several strategies.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Comparison {
    /// One entry per strategy, in the order they ran.
    pub entries: Vec<ComparisonEntry>,
    /// Index of the entry with the highest best score; `None` on a tie
    /// for first place or when there are no entries.
    pub winner: Option<usize>,
}

impl Comparison {
    /// Build a comparison from entries.
    pub fn new(entries: Vec<ComparisonEntry>) -> Self {
        let mut winner: Option<usize> = None;
        let mut tied = false;
        for (i, e) in entries.iter().enumerate() {
            match winner {
                None => winner = Some(i),
                Some(w) if e.best_score > entries[w].best_score => {
                    winner = Some(i);
                    tied = false;
                }
                Some(w) if e.best_score == entries[w].best_score => tied = true,
                Some(_) => {}
            }
        }
        Self {
            winner: if tied { None } else { winner },
            entries,
        }
    }

    /// The winning entry, if there is a unique one.
    pub fn winner(&self) -> Option<&ComparisonEntry> {
        self.winner.and_then(|i| self.entries.get(i))
    }
}

/// Run every strategy on the same request and compare the outcomes.
///
/// Runs are sequential; the first failing strategy aborts the comparison.
pub async fn compare<G: Llm>(
    strategies: &[AnyStrategy],
    request: &SearchRequest<'_>,
    generator: &G,
) -> Result<Comparison> {
    let mut entries = Vec::with_capacity(strategies.len());
    for strategy in strategies {
        let outcome = strategy.run(request, generator, &mut NoProgress).await?;
        #[cfg(feature = "tracing")]
        tracing::info!(
            strategy = strategy.name(),
            best_score = outcome.best.avg_score,
            evaluations = outcome.evaluations,
            "comparison run finished"
        );
        entries.push(ComparisonEntry::from_outcome(&outcome));
    }
    Ok(Comparison::new(entries))
}
