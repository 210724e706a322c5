// Copyright © 2025 lituus-io <spicyzhug@gmail.com>
// All Rights Reserved.
// Licensed under PolyForm Noncommercial 1.0.0

//! Evaluation function
//!
//! Runs a rendered template over the dataset one sample at a time, retrying
//! rate-limited and transient failures, and reduces the predictions to one
//! 0-100 fitness score. Samples whose call ultimately fails are dropped from
//! scoring; if every sample fails the score is 0.

use crate::error::{Error, Result};
use crate::llm::{Llm, LmOutput};
use crate::retry::{classify_error, with_retry, RetryOutcome, RetryPolicy};
use crate::space::{CandidateKey, SearchSpace};
use crate::template::{fill_template, render_template, PromptLocale};
use crate::types::{SearchResult, TaskType, TestSample};
use promptsmith_eval::{Language, Metric};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::Duration;

/// Prefixes models put before a label.
const LABEL_PREFIXES: &[&str] = &[
    "输出：",
    "输出:",
    "结果：",
    "结果:",
    "分类：",
    "分类:",
    "标签：",
    "标签:",
    "Output:",
    "output:",
    "Result:",
    "result:",
    "Label:",
    "label:",
    "Answer:",
    "answer:",
];

/// Minimum normalized Levenshtein similarity for a fuzzy label match.
const FUZZY_THRESHOLD: f64 = 0.5;

/// How a cleaned classification output is matched to the known labels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LabelMatching {
    /// Keep the cleaned text as is.
    Exact,
    /// Snap to the longest known label contained in the text.
    #[default]
    Substring,
    /// Like `Substring` but case-insensitive, falling back to the most
    /// similar label by edit distance.
    Fuzzy,
}

/// Evaluation settings shared by every strategy.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EvalConfig {
    /// Pause after each successful call.
    pub call_delay: Duration,
    /// Retry policy for failed calls.
    pub retry: RetryPolicy,
    /// Limit on a single call; `None` waits indefinitely.
    pub timeout: Option<Duration>,
    /// Label snapping for classification.
    pub label_matching: LabelMatching,
    /// Language of the rendered template scaffolding.
    pub locale: PromptLocale,
    /// Tokenization language for ROUGE and BLEU.
    pub language: Language,
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl EvalConfig {
    /// Create default configuration.
    pub const fn new() -> Self {
        Self {
            call_delay: Duration::from_millis(500),
            retry: RetryPolicy::new(),
            timeout: Some(Duration::from_secs(60)),
            label_matching: LabelMatching::Substring,
            locale: PromptLocale::English,
            language: Language::Auto,
        }
    }

    /// Defaults for random search: 300ms between calls.
    pub const fn random_search() -> Self {
        Self::new().with_call_delay(Duration::from_millis(300))
    }

    /// Defaults for the genetic algorithm: 1s between calls, 5 attempts.
    pub const fn genetic() -> Self {
        Self::new()
            .with_call_delay(Duration::from_millis(1000))
            .with_retry(RetryPolicy::new().with_max_attempts(5))
    }

    /// Defaults for Bayesian search: 1.2s between calls, 3 attempts.
    pub const fn bayesian() -> Self {
        Self::new()
            .with_call_delay(Duration::from_millis(1200))
            .with_retry(RetryPolicy::new().with_max_attempts(3))
    }

    /// Set delay after each successful call.
    pub const fn with_call_delay(mut self, delay: Duration) -> Self {
        self.call_delay = delay;
        self
    }

    /// Set retry policy.
    pub const fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Set per-call timeout.
    pub const fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set label matching mode.
    pub const fn with_label_matching(mut self, matching: LabelMatching) -> Self {
        self.label_matching = matching;
        self
    }

    /// Set template locale.
    pub const fn with_locale(mut self, locale: PromptLocale) -> Self {
        self.locale = locale;
        self
    }

    /// Set tokenization language.
    pub const fn with_language(mut self, language: Language) -> Self {
        self.language = language;
        self
    }

    /// Check the configuration is usable.
    pub fn validate(&self) -> Result<()> {
        self.retry.validate()?;
        if self.timeout.is_some_and(|t| t.is_zero()) {
            return Err(Error::config("per-call timeout must be non-zero"));
        }
        Ok(())
    }
}

/// Distinct trimmed ground-truth labels in first-seen order.
pub fn collect_labels(dataset: &[TestSample]) -> Vec<String> {
    let mut seen = HashSet::new();
    dataset
        .iter()
        .map(|s| s.ground_truth.trim())
        .filter(|l| !l.is_empty() && seen.insert(*l))
        .map(str::to_string)
        .collect()
}

/// Longest label contained in `text`; the earliest label wins ties.
fn longest_contained<'l>(
    text: &str,
    labels: &'l [String],
    contains: impl Fn(&str, &str) -> bool,
) -> Option<&'l String> {
    let mut best: Option<&String> = None;
    for label in labels {
        if !label.is_empty()
            && contains(text, label)
            && best.map_or(true, |b| label.chars().count() > b.chars().count())
        {
            best = Some(label);
        }
    }
    best
}

/// Clean raw model output into a prediction.
///
/// Non-classification output is only trimmed. Classification output keeps
/// its first line, loses known label prefixes and is then matched against
/// `labels` according to `matching`.
pub fn clean_prediction(
    raw: &str,
    task_type: TaskType,
    labels: &[String],
    matching: LabelMatching,
) -> String {
    let text = raw.trim();
    if task_type != TaskType::Classification || text.is_empty() {
        return text.to_string();
    }

    let mut text = text.lines().next().unwrap_or_default().trim();
    for prefix in LABEL_PREFIXES {
        if let Some(rest) = text.strip_prefix(prefix) {
            text = rest.trim();
        }
    }

    if labels.is_empty() || labels.iter().any(|l| l == text) {
        return text.to_string();
    }

    match matching {
        LabelMatching::Exact => text.to_string(),
        LabelMatching::Substring => longest_contained(text, labels, |t, l| t.contains(l))
            .cloned()
            .unwrap_or_else(|| text.to_string()),
        LabelMatching::Fuzzy => {
            let lowered = text.to_lowercase();
            if let Some(label) = labels.iter().find(|l| l.to_lowercase() == lowered) {
                return label.clone();
            }
            if let Some(label) =
                longest_contained(&lowered, labels, |t, l| t.contains(&l.to_lowercase()))
            {
                return label.clone();
            }
            let mut best: Option<(f64, &String)> = None;
            for label in labels {
                let sim = strsim::normalized_levenshtein(&lowered, &label.to_lowercase());
                if sim >= FUZZY_THRESHOLD && best.map_or(true, |(s, _)| sim > s) {
                    best = Some((sim, label));
                }
            }
            best.map(|(_, l)| l.clone())
                .unwrap_or_else(|| text.to_string())
        }
    }
}

/// Fitness of one template plus its per-sample predictions.
#[derive(Clone, Debug, PartialEq)]
pub struct Evaluation {
    /// 0-100 fitness.
    pub score: f64,
    /// Cleaned prediction per sample; empty where the call failed.
    pub predictions: Vec<String>,
    /// Samples with a non-empty prediction.
    pub succeeded: usize,
    /// Samples evaluated.
    pub total: usize,
}

async fn call_once<G: Llm>(
    generator: &G,
    prompt: &str,
    timeout: Option<Duration>,
) -> Result<LmOutput> {
    match timeout {
        Some(limit) => match tokio::time::timeout(limit, generator.generate(prompt)).await {
            Ok(out) => out,
            Err(_) => Err(Error::Timeout(limit)),
        },
        None => generator.generate(prompt).await,
    }
}

/// Evaluate a rendered template against the dataset.
///
/// Per-sample generation failures never surface as errors; they leave an
/// empty prediction that is excluded from scoring.
pub async fn evaluate_template<G: Llm>(
    generator: &G,
    template: &str,
    task_type: TaskType,
    dataset: &[TestSample],
    labels: &[String],
    config: &EvalConfig,
) -> Result<Evaluation> {
    if dataset.is_empty() {
        return Err(Error::config("dataset is empty"));
    }

    let mut predictions = Vec::with_capacity(dataset.len());

    for (idx, sample) in dataset.iter().enumerate() {
        let prompt = fill_template(template, &sample.input);
        let outcome = with_retry(&config.retry, classify_error, |_| {
            call_once(generator, &prompt, config.timeout)
        })
        .await;

        let raw = match outcome {
            RetryOutcome::Success(out) => {
                if !config.call_delay.is_zero() {
                    tokio::time::sleep(config.call_delay).await;
                }
                out.text
            }
            RetryOutcome::ExhaustedRetries {
                attempts,
                last_error,
            } => {
                #[cfg(feature = "tracing")]
                tracing::warn!(sample = idx + 1, attempts, error = %last_error, "sample failed after retries");
                #[cfg(not(feature = "tracing"))]
                let _ = (idx, attempts, last_error);
                String::new()
            }
            RetryOutcome::PermanentFailure(error) => {
                #[cfg(feature = "tracing")]
                tracing::warn!(sample = idx + 1, error = %error, "sample failed");
                #[cfg(not(feature = "tracing"))]
                let _ = (idx, error);
                String::new()
            }
        };

        predictions.push(clean_prediction(
            &raw,
            task_type,
            labels,
            config.label_matching,
        ));
    }

    let (preds, refs): (Vec<String>, Vec<String>) = predictions
        .iter()
        .zip(dataset)
        .filter(|(p, _)| !p.is_empty())
        .map(|(p, s)| (p.clone(), s.ground_truth.clone()))
        .unzip();

    let score = if preds.is_empty() {
        0.0
    } else {
        task_type
            .metric(config.language)
            .aggregate(&preds, &refs)?
            .clamp(0.0, 100.0)
    };

    Ok(Evaluation {
        score,
        succeeded: preds.len(),
        total: dataset.len(),
        predictions,
    })
}

/// A candidate's rendered template and evaluation.
#[derive(Clone, Debug)]
pub(crate) struct Scored {
    pub key: CandidateKey,
    pub role: String,
    pub style: String,
    pub technique: String,
    pub template: String,
    pub evaluation: Evaluation,
}

impl Scored {
    #[inline]
    pub fn score(&self) -> f64 {
        self.evaluation.score
    }

    pub fn into_result(self, iteration_id: usize, task_type: TaskType) -> SearchResult {
        SearchResult {
            iteration_id,
            role: self.role,
            style: self.style,
            technique: self.technique,
            full_prompt: self.template,
            avg_score: self.evaluation.score,
            task_type,
            succeeded: self.evaluation.succeeded,
            total: self.evaluation.total,
        }
    }
}

/// Renders and evaluates candidates of one search request.
pub(crate) struct Objective<'a, G> {
    pub generator: &'a G,
    pub space: &'a SearchSpace,
    pub task_description: &'a str,
    pub task_type: TaskType,
    pub dataset: &'a [TestSample],
    pub config: &'a EvalConfig,
    labels: Vec<String>,
}

impl<'a, G: Llm> Objective<'a, G> {
    pub fn new(
        generator: &'a G,
        space: &'a SearchSpace,
        task_description: &'a str,
        task_type: TaskType,
        dataset: &'a [TestSample],
        config: &'a EvalConfig,
    ) -> Self {
        let labels = match task_type {
            TaskType::Classification => collect_labels(dataset),
            _ => Vec::new(),
        };
        Self {
            generator,
            space,
            task_description,
            task_type,
            dataset,
            config,
            labels,
        }
    }

    pub async fn score(&self, key: CandidateKey) -> Result<Scored> {
        let candidate = self
            .space
            .candidate(key)
            .ok_or_else(|| Error::other(format!("candidate {key:?} is outside the search space")))?;
        let template = render_template(
            self.task_type,
            self.task_description,
            &candidate,
            &self.labels,
            self.config.locale,
        );
        let evaluation = evaluate_template(
            self.generator,
            &template,
            self.task_type,
            self.dataset,
            &self.labels,
            self.config,
        )
        .await?;

        #[cfg(feature = "tracing")]
        tracing::debug!(
            candidate = %candidate,
            score = evaluation.score,
            succeeded = evaluation.succeeded,
            total = evaluation.total,
            "candidate scored"
        );

        Ok(Scored {
            key,
            role: candidate.role,
            style: candidate.style,
            technique: candidate.technique,
            template,
            evaluation,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{FailingLlm, MockLlm, ScriptedLlm};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn labels() -> Vec<String> {
        vec!["积极".into(), "消极".into(), "中立".into()]
    }

    fn fast() -> EvalConfig {
        EvalConfig::new()
            .with_call_delay(Duration::ZERO)
            .with_retry(RetryPolicy::new().with_base_delay(Duration::ZERO))
    }

    fn dataset() -> Vec<TestSample> {
        vec![
            TestSample::new("这个产品真的很好用", "积极"),
            TestSample::new("价格太贵了", "消极"),
        ]
    }

    #[test]
    fn test_collect_labels_first_seen() {
        let mut ds = dataset();
        ds.push(TestSample::new("x", " 积极 "));
        ds.push(TestSample::new("y", ""));
        assert_eq!(collect_labels(&ds), vec!["积极", "消极"]);
    }

    #[test]
    fn test_clean_first_line_and_prefix() {
        let p = clean_prediction(
            "输出：积极\n因为用户很满意",
            TaskType::Classification,
            &labels(),
            LabelMatching::Exact,
        );
        assert_eq!(p, "积极");
    }

    #[test]
    fn test_clean_substring_snaps() {
        let p = clean_prediction(
            "情感倾向为消极",
            TaskType::Classification,
            &labels(),
            LabelMatching::Substring,
        );
        assert_eq!(p, "消极");

        let p = clean_prediction(
            "情感倾向为消极",
            TaskType::Classification,
            &labels(),
            LabelMatching::Exact,
        );
        assert_eq!(p, "情感倾向为消极");
    }

    #[test]
    fn test_clean_substring_prefers_longest() {
        let labels = vec!["positive".to_string(), "very positive".to_string()];
        let p = clean_prediction(
            "this is very positive",
            TaskType::Classification,
            &labels,
            LabelMatching::Substring,
        );
        assert_eq!(p, "very positive");
    }

    #[test]
    fn test_clean_fuzzy() {
        let labels = vec!["Positive".to_string(), "Negative".to_string()];
        assert_eq!(
            clean_prediction(
                "POSITIVE",
                TaskType::Classification,
                &labels,
                LabelMatching::Fuzzy
            ),
            "Positive"
        );
        assert_eq!(
            clean_prediction(
                "Negatve",
                TaskType::Classification,
                &labels,
                LabelMatching::Fuzzy
            ),
            "Negative"
        );
        assert_eq!(
            clean_prediction(
                "unrelated",
                TaskType::Classification,
                &labels,
                LabelMatching::Fuzzy
            ),
            "unrelated"
        );
    }

    #[test]
    fn test_clean_non_classification_untouched() {
        let p = clean_prediction(
            "  line one\nline two  ",
            TaskType::Summarization,
            &[],
            LabelMatching::Substring,
        );
        assert_eq!(p, "line one\nline two");
    }

    #[tokio::test]
    async fn test_evaluate_all_correct() {
        let llm = MockLlm::new(|p| {
            if p.contains("好用") {
                "积极".to_string()
            } else {
                "消极".to_string()
            }
        });
        let eval = evaluate_template(
            &llm,
            "分类：{{text}}",
            TaskType::Classification,
            &dataset(),
            &labels(),
            &fast(),
        )
        .await
        .unwrap();
        assert_eq!(eval.score, 100.0);
        assert_eq!(eval.succeeded, 2);
    }

    #[tokio::test]
    async fn test_evaluate_all_fail_scores_zero() {
        let llm = FailingLlm::new("invalid API key");
        let eval = evaluate_template(
            &llm,
            "{{text}}",
            TaskType::Classification,
            &dataset(),
            &labels(),
            &fast(),
        )
        .await
        .unwrap();
        assert_eq!(eval.score, 0.0);
        assert_eq!(eval.succeeded, 0);
        assert_eq!(eval.total, 2);
        assert_eq!(llm.calls(), 2);
    }

    #[tokio::test]
    async fn test_evaluate_partial_failure_scores_valid_pairs() {
        let llm = ScriptedLlm::new([Err("model not found"), Ok("消极")]);
        let eval = evaluate_template(
            &llm,
            "{{text}}",
            TaskType::Classification,
            &dataset(),
            &labels(),
            &fast(),
        )
        .await
        .unwrap();
        assert_eq!(eval.score, 100.0);
        assert_eq!(eval.succeeded, 1);
        assert_eq!(eval.predictions[0], "");
    }

    /// Never answers.
    struct HungLlm {
        calls: AtomicUsize,
    }

    impl Llm for HungLlm {
        type GenerateFut<'a>
            = std::future::Pending<Result<LmOutput>>
        where
            Self: 'a;

        fn generate<'a>(&'a self, _prompt: &'a str) -> Self::GenerateFut<'a> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            std::future::pending()
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_evaluate_hung_call_times_out_and_retries() {
        let llm = HungLlm {
            calls: AtomicUsize::new(0),
        };
        let config = fast()
            .with_timeout(Some(Duration::from_secs(1)))
            .with_retry(
                RetryPolicy::new()
                    .with_max_attempts(3)
                    .with_base_delay(Duration::ZERO),
            );
        let start = tokio::time::Instant::now();
        let eval = evaluate_template(
            &llm,
            "{{text}}",
            TaskType::Classification,
            &dataset(),
            &labels(),
            &config,
        )
        .await
        .unwrap();

        assert_eq!(eval.score, 0.0);
        assert_eq!(eval.succeeded, 0);
        assert_eq!(eval.total, 2);
        assert_eq!(llm.calls.load(Ordering::SeqCst), 6);
        assert!(start.elapsed() >= Duration::from_secs(6));
    }

    #[tokio::test]
    async fn test_evaluate_empty_dataset_is_config_error() {
        let llm = MockLlm::new(|_| String::new());
        let err = evaluate_template(
            &llm,
            "{{text}}",
            TaskType::Translation,
            &[],
            &[],
            &fast(),
        )
        .await
        .unwrap_err();
        assert!(err.is_config_error());
    }

    #[test]
    fn test_presets() {
        assert_eq!(
            EvalConfig::random_search().call_delay,
            Duration::from_millis(300)
        );
        assert_eq!(EvalConfig::genetic().retry.max_attempts, 5);
        assert_eq!(EvalConfig::bayesian().retry.max_attempts, 3);
        assert!(EvalConfig::new()
            .with_timeout(Some(Duration::ZERO))
            .validate()
            .is_err());
    }
}
