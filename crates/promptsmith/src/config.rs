// Copyright © 2025 lituus-io <spicyzhug@gmail.com>
// All Rights Reserved.
// Licensed under PolyForm Noncommercial 1.0.0

//! Run configuration documents
//!
//! A [`SearchConfig`] selects one strategy and its budget, plus optional
//! overrides of the evaluation settings. Every field is optional and falls
//! back to the strategy's defaults. Durations are in milliseconds.
//!
//! ```yaml
//! strategy:
//!   kind: genetic
//!   generations: 3
//!   population_size: 4
//!   seed: 7
//! eval:
//!   call_delay_ms: 500
//!   max_attempts: 4
//!   label_matching: fuzzy
//! ```

use crate::error::{Error, Result};
use crate::evaluate::{EvalConfig, LabelMatching};
use crate::strategies::{
    AnyStrategy, BayesianConfig, BayesianSearch, GeneticAlgorithm, GeneticConfig, RandomSearch,
    RandomSearchConfig,
};
use crate::template::PromptLocale;
use crate::types::TestSample;
use promptsmith_eval::Language;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Strategy selection and budget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case", deny_unknown_fields)]
pub enum StrategySection {
    RandomSearch {
        #[serde(default)]
        iterations: Option<usize>,
        #[serde(default)]
        seed: Option<u64>,
    },
    Genetic {
        #[serde(default)]
        generations: Option<usize>,
        #[serde(default)]
        population_size: Option<usize>,
        #[serde(default)]
        elite_ratio: Option<f64>,
        #[serde(default)]
        mutation_rate: Option<f64>,
        #[serde(default)]
        seed: Option<u64>,
    },
    Bayesian {
        #[serde(default)]
        n_trials: Option<usize>,
        #[serde(default)]
        trial_cooldown_ms: Option<u64>,
        #[serde(default)]
        n_ei_candidates: Option<usize>,
        #[serde(default)]
        seed: Option<u64>,
    },
}

/// Overrides applied on top of the strategy's evaluation defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EvalOverrides {
    pub call_delay_ms: Option<u64>,
    /// `0` disables the per-call timeout.
    pub timeout_ms: Option<u64>,
    pub max_attempts: Option<u32>,
    pub base_delay_ms: Option<u64>,
    pub backoff_factor: Option<f64>,
    pub max_delay_ms: Option<u64>,
    pub label_matching: Option<LabelMatching>,
    pub locale: Option<PromptLocale>,
    pub language: Option<Language>,
}

impl EvalOverrides {
    /// Apply the overrides to `base`.
    pub fn apply(&self, mut base: EvalConfig) -> EvalConfig {
        if let Some(ms) = self.call_delay_ms {
            base.call_delay = Duration::from_millis(ms);
        }
        if let Some(ms) = self.timeout_ms {
            base.timeout = (ms > 0).then(|| Duration::from_millis(ms));
        }
        if let Some(n) = self.max_attempts {
            base.retry.max_attempts = n;
        }
        if let Some(ms) = self.base_delay_ms {
            base.retry.base_delay = Duration::from_millis(ms);
        }
        if let Some(f) = self.backoff_factor {
            base.retry.backoff_factor = f;
        }
        if let Some(ms) = self.max_delay_ms {
            base.retry.max_delay = Duration::from_millis(ms);
        }
        if let Some(m) = self.label_matching {
            base.label_matching = m;
        }
        if let Some(l) = self.locale {
            base.locale = l;
        }
        if let Some(l) = self.language {
            base.language = l;
        }
        base
    }
}

/// A complete run configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SearchConfig {
    pub strategy: StrategySection,
    #[serde(default)]
    pub eval: EvalOverrides,
}

impl SearchConfig {
    /// Parse a YAML document.
    pub fn from_yaml_str(s: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(s)?)
    }

    /// Parse a JSON document.
    pub fn from_json_str(s: &str) -> Result<Self> {
        Ok(serde_json::from_str(s)?)
    }

    /// Load from a `.yaml`, `.yml` or `.json` file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Self::from_json_str(&content),
            Some(ext) if ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml") => {
                Self::from_yaml_str(&content)
            }
            _ => Err(Error::config(format!(
                "unsupported config file {}: expected .yaml, .yml or .json",
                path.display()
            ))),
        }
    }

    /// Build the configured strategy, validating every setting.
    pub fn build(&self) -> Result<AnyStrategy> {
        let strategy: AnyStrategy = match self.strategy {
            StrategySection::RandomSearch { iterations, seed } => {
                let mut config = RandomSearchConfig::new();
                if let Some(n) = iterations {
                    config = config.with_iterations(n);
                }
                if let Some(s) = seed {
                    config = config.with_seed(s);
                }
                config.validate()?;
                let eval = self.eval.apply(EvalConfig::random_search());
                eval.validate()?;
                RandomSearch::new(config).with_eval(eval).into()
            }
            StrategySection::Genetic {
                generations,
                population_size,
                elite_ratio,
                mutation_rate,
                seed,
            } => {
                let mut config = GeneticConfig::new();
                if let Some(n) = generations {
                    config = config.with_generations(n);
                }
                if let Some(n) = population_size {
                    config = config.with_population_size(n);
                }
                if let Some(r) = elite_ratio {
                    config = config.with_elite_ratio(r);
                }
                if let Some(r) = mutation_rate {
                    config = config.with_mutation_rate(r);
                }
                if let Some(s) = seed {
                    config = config.with_seed(s);
                }
                config.validate()?;
                let eval = self.eval.apply(EvalConfig::genetic());
                eval.validate()?;
                GeneticAlgorithm::new(config).with_eval(eval).into()
            }
            StrategySection::Bayesian {
                n_trials,
                trial_cooldown_ms,
                n_ei_candidates,
                seed,
            } => {
                let mut config = BayesianConfig::new();
                if let Some(n) = n_trials {
                    config = config.with_n_trials(n);
                }
                if let Some(ms) = trial_cooldown_ms {
                    config = config.with_trial_cooldown(Duration::from_millis(ms));
                }
                if let Some(n) = n_ei_candidates {
                    config = config.with_n_ei_candidates(n);
                }
                if let Some(s) = seed {
                    config = config.with_seed(s);
                }
                config.validate()?;
                let eval = self.eval.apply(EvalConfig::bayesian());
                eval.validate()?;
                BayesianSearch::new(config).with_eval(eval).into()
            }
        };
        Ok(strategy)
    }
}

/// Parse a dataset from a JSON array of `{input, ground_truth}` objects.
pub fn parse_dataset(json: &str) -> Result<Vec<TestSample>> {
    let samples: Vec<TestSample> = serde_json::from_str(json)?;
    if samples.is_empty() {
        return Err(Error::config("dataset is empty"));
    }
    Ok(samples)
}

/// Load a dataset from a JSON file.
pub fn load_dataset(path: impl AsRef<Path>) -> Result<Vec<TestSample>> {
    let content = std::fs::read_to_string(path.as_ref())?;
    parse_dataset(&content)
}
