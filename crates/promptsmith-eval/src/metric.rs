// Copyright © 2025 lituus-io <spicyzhug@gmail.com>
// All Rights Reserved.
// Licensed under PolyForm Noncommercial 1.0.0

//! Metric trait and implementations
//!
//! Accuracy for classification, ROUGE-L F1 for summarization and smoothed
//! sentence BLEU for translation. All scores are on a 0-100 scale, rounded to
//! two decimals per pair.

use crate::tokenize::{rouge_tokens, tokenize, Language};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::collections::HashMap;

/// Maximum n-gram order for BLEU.
const BLEU_MAX_ORDER: usize = 4;

/// Numerator used in place of a zero n-gram match count (Chen & Cherry method 1).
const BLEU_EPSILON: f64 = 0.1;

/// Metric trait for scoring one prediction against one reference.
pub trait Metric: Send + Sync {
    /// Score a single prediction, 0-100.
    fn score(&self, prediction: &str, reference: &str) -> f64;

    /// Reduce a batch of pairs to one score, 0-100.
    ///
    /// Defaults to the mean of per-pair scores.
    fn aggregate(&self, predictions: &[String], references: &[String]) -> anyhow::Result<f64> {
        if predictions.len() != references.len() {
            anyhow::bail!(
                "predictions ({}) and references ({}) length mismatch",
                predictions.len(),
                references.len()
            );
        }
        if predictions.is_empty() {
            return Ok(0.0);
        }

        let total: f64 = predictions
            .par_iter()
            .zip(references.par_iter())
            .map(|(p, r)| self.score(p, r))
            .sum();

        Ok((total / predictions.len() as f64).clamp(0.0, 100.0))
    }

    /// Get metric name
    fn name(&self) -> &str;
}

#[inline]
fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[inline]
fn normalize_label(s: &str) -> String {
    s.trim().to_lowercase()
}

/// Classification accuracy over pairs, 0-100.
///
/// Labels are compared after trimming and lowercasing; no other
/// normalization is applied, so `"Positive"` never matches `"积极"`.
pub fn accuracy<P, R>(predictions: &[P], references: &[R]) -> anyhow::Result<f64>
where
    P: AsRef<str> + Sync,
    R: AsRef<str> + Sync,
{
    if predictions.len() != references.len() {
        anyhow::bail!(
            "predictions ({}) and references ({}) length mismatch",
            predictions.len(),
            references.len()
        );
    }
    if predictions.is_empty() {
        return Ok(0.0);
    }

    let correct = predictions
        .par_iter()
        .zip(references.par_iter())
        .filter(|(p, r)| normalize_label(p.as_ref()) == normalize_label(r.as_ref()))
        .count();

    Ok(round2(correct as f64 / predictions.len() as f64 * 100.0))
}

/// ROUGE F1 scores, 0-100.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RougeScores {
    /// Unigram overlap F1.
    pub rouge1: f64,
    /// Bigram overlap F1.
    pub rouge2: f64,
    /// Longest-common-subsequence F1.
    pub rouge_l: f64,
}

/// Compute ROUGE-1, ROUGE-2 and ROUGE-L F1 of a prediction against a reference.
pub fn rouge(prediction: &str, reference: &str, lang: Language) -> RougeScores {
    let pred = rouge_tokens(prediction, lang);
    let gold = rouge_tokens(reference, lang);

    RougeScores {
        rouge1: round2(ngram_f1(&pred, &gold, 1) * 100.0),
        rouge2: round2(ngram_f1(&pred, &gold, 2) * 100.0),
        rouge_l: round2(lcs_f1(&pred, &gold) * 100.0),
    }
}

fn ngram_counts(tokens: &[String], n: usize) -> HashMap<&[String], u32> {
    let mut counts = HashMap::new();
    if n == 0 || tokens.len() < n {
        return counts;
    }
    for window in tokens.windows(n) {
        *counts.entry(window).or_insert(0) += 1;
    }
    counts
}

/// Clipped overlap between hypothesis and reference n-gram counts.
fn clipped_overlap(hyp: &HashMap<&[String], u32>, reference: &HashMap<&[String], u32>) -> u32 {
    hyp.iter()
        .map(|(gram, &count)| count.min(reference.get(gram).copied().unwrap_or(0)))
        .sum()
}

fn f1(overlap: f64, pred_total: f64, gold_total: f64) -> f64 {
    if overlap == 0.0 || pred_total == 0.0 || gold_total == 0.0 {
        return 0.0;
    }
    let precision = overlap / pred_total;
    let recall = overlap / gold_total;
    2.0 * precision * recall / (precision + recall)
}

fn ngram_f1(pred: &[String], gold: &[String], n: usize) -> f64 {
    let pred_counts = ngram_counts(pred, n);
    let gold_counts = ngram_counts(gold, n);
    let pred_total: u32 = pred_counts.values().sum();
    let gold_total: u32 = gold_counts.values().sum();
    let overlap = clipped_overlap(&pred_counts, &gold_counts);
    f1(overlap as f64, pred_total as f64, gold_total as f64)
}

fn lcs_len(a: &[String], b: &[String]) -> usize {
    if a.is_empty() || b.is_empty() {
        return 0;
    }
    let mut prev = vec![0usize; b.len() + 1];
    let mut curr = vec![0usize; b.len() + 1];
    for x in a {
        for (j, y) in b.iter().enumerate() {
            curr[j + 1] = if x == y {
                prev[j] + 1
            } else {
                curr[j].max(prev[j + 1])
            };
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b.len()]
}

fn lcs_f1(pred: &[String], gold: &[String]) -> f64 {
    f1(
        lcs_len(pred, gold) as f64,
        pred.len() as f64,
        gold.len() as f64,
    )
}

/// Sentence-level BLEU-4 with method-1 smoothing, 0-100.
///
/// Orders with no matching n-gram contribute `0.1 / total` instead of zero,
/// so short hypotheses that share unigrams never collapse to a hard zero.
pub fn bleu(prediction: &str, reference: &str, lang: Language) -> f64 {
    let hyp = tokenize(prediction, lang);
    let gold = tokenize(reference, lang);
    if hyp.is_empty() || gold.is_empty() {
        return 0.0;
    }

    // (matches, total) per order
    let mut precisions: SmallVec<[(u32, u32); BLEU_MAX_ORDER]> = SmallVec::new();
    for n in 1..=BLEU_MAX_ORDER {
        let hyp_counts = ngram_counts(&hyp, n);
        let gold_counts = ngram_counts(&gold, n);
        let total: u32 = hyp_counts.values().sum();
        precisions.push((clipped_overlap(&hyp_counts, &gold_counts), total.max(1)));
    }

    if precisions[0].0 == 0 {
        return 0.0;
    }

    let weight = 1.0 / BLEU_MAX_ORDER as f64;
    let log_sum: f64 = precisions
        .iter()
        .map(|&(matches, total)| {
            let p = if matches == 0 {
                BLEU_EPSILON / total as f64
            } else {
                matches as f64 / total as f64
            };
            weight * p.ln()
        })
        .sum();

    let (c, r) = (hyp.len() as f64, gold.len() as f64);
    let brevity_penalty = if c > r { 1.0 } else { (1.0 - r / c).exp() };

    round2((brevity_penalty * log_sum.exp() * 100.0).clamp(0.0, 100.0))
}

/// Exact match metric (classification accuracy).
#[derive(Debug, Clone, Copy, Default)]
pub struct ExactMatch;

impl Metric for ExactMatch {
    fn score(&self, prediction: &str, reference: &str) -> f64 {
        if normalize_label(prediction) == normalize_label(reference) {
            100.0
        } else {
            0.0
        }
    }

    fn aggregate(&self, predictions: &[String], references: &[String]) -> anyhow::Result<f64> {
        accuracy(predictions, references)
    }

    fn name(&self) -> &str {
        "accuracy"
    }
}

/// ROUGE-L F1 metric (summarization).
#[derive(Debug, Clone, Copy, Default)]
pub struct RougeL {
    /// Tokenization language.
    pub lang: Language,
}

impl Metric for RougeL {
    fn score(&self, prediction: &str, reference: &str) -> f64 {
        rouge(prediction, reference, self.lang).rouge_l
    }

    fn name(&self) -> &str {
        "rouge_l"
    }
}

/// Smoothed sentence BLEU metric (translation).
#[derive(Debug, Clone, Copy, Default)]
pub struct Bleu {
    /// Tokenization language.
    pub lang: Language,
}

impl Metric for Bleu {
    fn score(&self, prediction: &str, reference: &str) -> f64 {
        bleu(prediction, reference, self.lang)
    }

    fn name(&self) -> &str {
        "bleu"
    }
}

/// The metric a task type is scored with.
///
/// One signature for all three metrics so the evaluation function never
/// branches on task type itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskMetric {
    /// Exact-match accuracy.
    Accuracy,
    /// Mean ROUGE-L F1.
    RougeL(Language),
    /// Mean smoothed sentence BLEU.
    Bleu(Language),
}

impl Metric for TaskMetric {
    fn score(&self, prediction: &str, reference: &str) -> f64 {
        match *self {
            Self::Accuracy => ExactMatch.score(prediction, reference),
            Self::RougeL(lang) => RougeL { lang }.score(prediction, reference),
            Self::Bleu(lang) => Bleu { lang }.score(prediction, reference),
        }
    }

    fn aggregate(&self, predictions: &[String], references: &[String]) -> anyhow::Result<f64> {
        match *self {
            Self::Accuracy => ExactMatch.aggregate(predictions, references),
            Self::RougeL(lang) => RougeL { lang }.aggregate(predictions, references),
            Self::Bleu(lang) => Bleu { lang }.aggregate(predictions, references),
        }
    }

    fn name(&self) -> &str {
        match self {
            Self::Accuracy => "accuracy",
            Self::RougeL(_) => "rouge_l",
            Self::Bleu(_) => "bleu",
        }
    }
}
