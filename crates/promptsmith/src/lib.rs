// Copyright © 2025 lituus-io <spicyzhug@gmail.com>
// All Rights Reserved.
// Licensed under PolyForm Noncommercial 1.0.0

//! # Promptsmith - Prompt Template Search
//!
//! Finds the best-scoring prompt template for a task by searching over
//! combinations of a role, a writing style and a prompting technique.
//!
//! ## Architecture
//!
//! - **Candidates**: a [`SearchSpace`] of three string axes; each
//!   combination renders to one template with a `{{text}}` placeholder
//! - **Evaluation**: every template is run over a labeled dataset through an
//!   [`Llm`] and scored with accuracy, ROUGE-L or BLEU (0-100)
//! - **Strategies**: [`RandomSearch`], [`GeneticAlgorithm`] and
//!   [`BayesianSearch`] behind one [`SearchStrategy`] trait
//! - **GATs**: the generation capability returns a named future, no boxing
//!
//! Calls to the model are strictly sequential, retried with exponential
//! backoff on rate limits and network trouble, and never abort a run.
//!
//! ## Quick Start
//!
//! ```
//! use promptsmith::{
//!     EvalConfig, MockLlm, RandomSearch, RandomSearchConfig, SearchRequest, SearchSpace,
//!     SearchStrategy, TaskType, TestSample,
//! };
//! use std::time::Duration;
//!
//! let space = SearchSpace::new(["analyst", "critic"], ["concise"], ["step by step"]);
//! let dataset = vec![TestSample::new("great product", "positive")];
//! let request = SearchRequest::new(
//!     "Classify the sentiment",
//!     TaskType::Classification,
//!     &dataset,
//!     &space,
//! );
//! let llm = MockLlm::new(|_| "positive".to_string());
//!
//! let search = RandomSearch::new(RandomSearchConfig::new().with_iterations(2))
//!     .with_eval(EvalConfig::random_search().with_call_delay(Duration::ZERO));
//!
//! let runtime = tokio::runtime::Builder::new_current_thread()
//!     .enable_time()
//!     .build()
//!     .unwrap();
//! let outcome = runtime.block_on(search.search(&request, &llm)).unwrap();
//! assert_eq!(outcome.results.len(), 2);
//! assert_eq!(outcome.best.avg_score, 100.0);
//! ```

pub mod compare;
pub mod config;
pub mod error;
pub mod evaluate;
pub mod llm;
pub mod pool;
pub mod progress;
pub mod retry;
pub mod space;
pub mod strategies;
pub mod strategy;
pub mod template;
pub mod types;

pub use compare::{compare, Comparison, ComparisonEntry};
pub use config::{load_dataset, parse_dataset, EvalOverrides, SearchConfig, StrategySection};
pub use error::{Error, Result};
pub use evaluate::{
    clean_prediction, collect_labels, evaluate_template, EvalConfig, Evaluation, LabelMatching,
};
pub use llm::{FailingLlm, Llm, LmOutput, MockLlm, ScriptedLlm};
pub use pool::UniquenessPool;
pub use progress::{NoProgress, Progress, ProgressObserver};
pub use retry::{classify_error, with_retry, ErrorClass, RetryOutcome, RetryPolicy};
pub use space::{Candidate, CandidateKey, SearchSpace};
pub use strategies::{
    AnyStrategy, BayesianConfig, BayesianSearch, GeneticAlgorithm, GeneticConfig, RandomSearch,
    RandomSearchConfig,
};
pub use strategy::{SearchRequest, SearchStrategy};
pub use template::{fill_template, render_template, PromptLocale, PLACEHOLDER};
pub use types::{
    Adjustment, EvolutionHistoryEntry, History, SearchOutcome, SearchResult, TaskType,
    TestSample, TrialHistoryEntry,
};

pub use promptsmith_eval::{interpret, Interpretation, Language, Level};
