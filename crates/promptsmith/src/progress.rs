// Copyright © 2025 lituus-io <spicyzhug@gmail.com>
// All Rights Reserved.
// Licensed under PolyForm Noncommercial 1.0.0

//! Progress reporting and cooperative cancellation.
//!
//! Strategies call the observer synchronously at the end of every iteration,
//! generation or trial. Returning [`ControlFlow::Break`] stops the run at that
//! checkpoint; the outcome keeps everything evaluated so far.

use serde::{Deserialize, Serialize};
use std::ops::ControlFlow;

/// A progress checkpoint.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Progress {
    /// Random search finished one candidate.
    Iteration {
        current: usize,
        total: usize,
        score: f64,
        best_score: f64,
    },
    /// Genetic algorithm finished one generation.
    Generation {
        generation: usize,
        total: usize,
        /// Best score over all generations so far.
        best_score: f64,
        /// Mean score of this generation.
        avg_score: f64,
    },
    /// Bayesian search finished one trial.
    Trial {
        trial: usize,
        total: usize,
        score: f64,
        best_score: f64,
    },
}

impl Progress {
    /// Completed steps and total steps.
    pub fn fraction(&self) -> (usize, usize) {
        match *self {
            Self::Iteration { current, total, .. } => (current, total),
            Self::Generation {
                generation, total, ..
            } => (generation, total),
            Self::Trial { trial, total, .. } => (trial, total),
        }
    }

    /// Best score seen so far.
    pub fn best_score(&self) -> f64 {
        match *self {
            Self::Iteration { best_score, .. }
            | Self::Generation { best_score, .. }
            | Self::Trial { best_score, .. } => best_score,
        }
    }
}

/// Receives progress checkpoints.
pub trait ProgressObserver {
    /// Called once per checkpoint. `Break` cancels the run.
    fn on_progress(&mut self, progress: &Progress) -> ControlFlow<()>;
}

impl<F> ProgressObserver for F
where
    F: FnMut(&Progress) -> ControlFlow<()>,
{
    fn on_progress(&mut self, progress: &Progress) -> ControlFlow<()> {
        self(progress)
    }
}

/// Observer that ignores progress and never cancels.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressObserver for NoProgress {
    #[inline]
    fn on_progress(&mut self, _progress: &Progress) -> ControlFlow<()> {
        ControlFlow::Continue(())
    }
}
