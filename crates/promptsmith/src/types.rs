// Copyright © 2025 lituus-io <spicyzhug@gmail.com>
// All Rights Reserved.
// Licensed under PolyForm Noncommercial 1.0.0

//! Plain data produced and consumed by the search strategies.
//!
//! Everything here is created once and never mutated, and everything
//! serializes so a reporting layer can plot or store it.

use crate::error::Error;
use crate::space::Candidate;
use promptsmith_eval::{Language, TaskMetric};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kind of task a prompt is being optimized for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskType {
    Classification,
    Summarization,
    Translation,
}

impl TaskType {
    /// Metric used to score this task type.
    pub fn metric(self, lang: Language) -> TaskMetric {
        match self {
            Self::Classification => TaskMetric::Accuracy,
            Self::Summarization => TaskMetric::RougeL(lang),
            Self::Translation => TaskMetric::Bleu(lang),
        }
    }

    /// Lowercase name.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Classification => "classification",
            Self::Summarization => "summarization",
            Self::Translation => "translation",
        }
    }
}

impl fmt::Display for TaskType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "classification" => Ok(Self::Classification),
            "summarization" => Ok(Self::Summarization),
            "translation" => Ok(Self::Translation),
            other => Err(Error::config(format!("unknown task type {other:?}"))),
        }
    }
}

/// One labeled example.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestSample {
    pub input: String,
    pub ground_truth: String,
}

impl TestSample {
    /// Create a sample.
    pub fn new(input: impl Into<String>, ground_truth: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            ground_truth: ground_truth.into(),
        }
    }
}

/// One evaluated candidate.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    /// Sequential within a run, starting at 1.
    pub iteration_id: usize,
    pub role: String,
    pub style: String,
    pub technique: String,
    /// Rendered template, placeholder included.
    pub full_prompt: String,
    /// Fitness on the 0-100 scale.
    pub avg_score: f64,
    pub task_type: TaskType,
    /// Samples that produced a usable prediction.
    pub succeeded: usize,
    /// Samples evaluated.
    pub total: usize,
}

impl SearchResult {
    /// The candidate this result scored.
    pub fn candidate(&self) -> Candidate {
        Candidate::new(&self.role, &self.style, &self.technique)
    }

    /// Fraction of samples that produced a prediction.
    pub fn success_ratio(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.succeeded as f64 / self.total as f64
        }
    }
}

/// Per-generation statistics of a genetic run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EvolutionHistoryEntry {
    /// 1-indexed.
    pub generation: usize,
    pub best_score: f64,
    pub avg_score: f64,
    pub worst_score: f64,
}

/// Per-trial record of a Bayesian run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrialHistoryEntry {
    /// 1-indexed.
    pub trial: usize,
    pub score: f64,
    /// Running maximum including this trial.
    pub best_score: f64,
    pub role: String,
    pub style: String,
    pub technique: String,
}

/// Strategy-specific history.
#[derive(Clone, Debug, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", content = "entries", rename_all = "snake_case")]
pub enum History {
    #[default]
    None,
    Evolution(Vec<EvolutionHistoryEntry>),
    Trials(Vec<TrialHistoryEntry>),
}

impl History {
    /// Number of entries.
    pub fn len(&self) -> usize {
        match self {
            Self::None => 0,
            Self::Evolution(entries) => entries.len(),
            Self::Trials(entries) => entries.len(),
        }
    }

    /// Whether there are no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Generation entries, if this is an evolution history.
    pub fn evolution(&self) -> Option<&[EvolutionHistoryEntry]> {
        match self {
            Self::Evolution(entries) => Some(entries),
            _ => None,
        }
    }

    /// Trial entries, if this is a trial history.
    pub fn trials(&self) -> Option<&[TrialHistoryEntry]> {
        match self {
            Self::Trials(entries) => Some(entries),
            _ => None,
        }
    }
}

/// A requested budget that was reduced to what the space allows.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Adjustment {
    pub parameter: String,
    pub requested: usize,
    pub effective: usize,
}

impl fmt::Display for Adjustment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} reduced from {} to {}",
            self.parameter, self.requested, self.effective
        )
    }
}

/// Everything a search run produced.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SearchOutcome {
    /// Strategy name.
    pub strategy: String,
    /// All evaluated candidates in evaluation order.
    pub results: Vec<SearchResult>,
    /// Highest-scoring result; the earliest wins ties.
    pub best: SearchResult,
    pub history: History,
    /// Budget reductions applied before the run.
    pub adjustments: Vec<Adjustment>,
    /// Whether the observer stopped the run early.
    pub cancelled: bool,
    /// Number of candidate evaluations performed.
    pub evaluations: usize,
}

impl SearchOutcome {
    /// Scores of all results in evaluation order.
    pub fn scores(&self) -> Vec<f64> {
        self.results.iter().map(|r| r.avg_score).collect()
    }
}

/// Index of the first maximum by score.
pub(crate) fn first_best(results: &[SearchResult]) -> Option<usize> {
    let mut best: Option<usize> = None;
    for (i, r) in results.iter().enumerate() {
        if best.map_or(true, |b| r.avg_score > results[b].avg_score) {
            best = Some(i);
        }
    }
    best
}
