// Copyright © 2025 lituus-io <spicyzhug@gmail.com>
// All Rights Reserved.
// Licensed under PolyForm Noncommercial 1.0.0

//! Genetic algorithm over role, style and technique genes.
//!
//! Every individual created during a run is reserved from a
//! [`UniquenessPool`], so no combination is evaluated twice across all
//! generations. There is no elitist carry-over: parents are drawn from the
//! top half of the ranked population, and each generation is bred fresh.
//!
//! The run needs `population_size * generations` distinct combinations.
//! A population larger than the space is a configuration error; too many
//! generations are clamped to `space.len() / population_size`.

use crate::error::{Error, Result};
use crate::evaluate::{EvalConfig, Objective};
use crate::llm::Llm;
use crate::pool::UniquenessPool;
use crate::progress::{Progress, ProgressObserver};
use crate::space::CandidateKey;
use crate::strategy::{clamp_budget, finish, rng_from, SearchRequest, SearchStrategy};
use crate::types::{EvolutionHistoryEntry, History, SearchOutcome};
use rand::seq::SliceRandom;
use rand::Rng;

/// Configuration for the genetic algorithm.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeneticConfig {
    /// Number of generations
    pub generations: usize,
    /// Individuals per generation
    pub population_size: usize,
    /// Share of the sorted population counted as elite (0.0 - 1.0)
    pub elite_ratio: f64,
    /// Per-gene mutation probability (0.0 - 1.0)
    pub mutation_rate: f64,
    /// Random seed; `None` draws from entropy
    pub seed: Option<u64>,
}

impl Default for GeneticConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl GeneticConfig {
    /// Create default configuration.
    pub const fn new() -> Self {
        Self {
            generations: 5,
            population_size: 8,
            elite_ratio: 0.2,
            mutation_rate: 0.2,
            seed: None,
        }
    }

    /// Set generations.
    pub const fn with_generations(mut self, n: usize) -> Self {
        self.generations = n;
        self
    }

    /// Set population size.
    pub const fn with_population_size(mut self, n: usize) -> Self {
        self.population_size = n;
        self
    }

    /// Set elite ratio.
    pub const fn with_elite_ratio(mut self, ratio: f64) -> Self {
        self.elite_ratio = ratio;
        self
    }

    /// Set mutation rate.
    pub const fn with_mutation_rate(mut self, rate: f64) -> Self {
        self.mutation_rate = rate;
        self
    }

    /// Set seed.
    pub const fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Number of elites: `max(1, round(population_size * elite_ratio))`.
    pub fn elite_count(&self) -> usize {
        ((self.population_size as f64 * self.elite_ratio).round() as usize).max(1)
    }

    /// Size of the parent pool: the top half of the sorted population,
    /// at least two individuals.
    pub fn parent_pool_size(&self) -> usize {
        (self.population_size / 2).max(2).min(self.population_size)
    }

    /// Check the configuration is usable.
    pub fn validate(&self) -> Result<()> {
        if self.population_size == 0 {
            return Err(Error::config("population size must be at least 1"));
        }
        if self.generations == 0 {
            return Err(Error::config("generations must be at least 1"));
        }
        if !(0.0..=1.0).contains(&self.elite_ratio) {
            return Err(Error::config(format!(
                "elite ratio must be in [0, 1], got {}",
                self.elite_ratio
            )));
        }
        if !(0.0..=1.0).contains(&self.mutation_rate) {
            return Err(Error::config(format!(
                "mutation rate must be in [0, 1], got {}",
                self.mutation_rate
            )));
        }
        Ok(())
    }
}

/// Genetic algorithm strategy.
#[derive(Debug, Clone, Copy)]
pub struct GeneticAlgorithm {
    config: GeneticConfig,
    eval: EvalConfig,
}

impl Default for GeneticAlgorithm {
    fn default() -> Self {
        Self::new(GeneticConfig::new())
    }
}

impl GeneticAlgorithm {
    /// Create with the given configuration and the genetic evaluation defaults.
    pub const fn new(config: GeneticConfig) -> Self {
        Self {
            config,
            eval: EvalConfig::genetic(),
        }
    }

    /// Set evaluation configuration.
    pub const fn with_eval(mut self, eval: EvalConfig) -> Self {
        self.eval = eval;
        self
    }

    /// Get the configuration.
    pub const fn config(&self) -> &GeneticConfig {
        &self.config
    }

    /// Get the evaluation configuration.
    pub const fn eval_config(&self) -> &EvalConfig {
        &self.eval
    }

    /// Breed the next generation from `ranked` (best first).
    ///
    /// Bred genes are only a preference: a child that was already used is
    /// replaced by another unused combination.
    fn breed<R: Rng>(
        &self,
        ranked: &[CandidateKey],
        dims: [usize; 3],
        pool: &mut UniquenessPool,
        rng: &mut R,
    ) -> Vec<CandidateKey> {
        let size = self.config.population_size;
        let parents = &ranked[..self.config.parent_pool_size().min(ranked.len())];
        let mut next = Vec::with_capacity(size);

        while next.len() < size {
            // Independent picks; both parents may be the same individual.
            let (Some(&a), Some(&b)) = (parents.choose(rng), parents.choose(rng)) else {
                break;
            };

            let mut child = CandidateKey::new(
                if rng.gen_bool(0.5) { a.role } else { b.role },
                if rng.gen_bool(0.5) { a.style } else { b.style },
                if rng.gen_bool(0.5) { a.technique } else { b.technique },
            );
            if rng.gen_bool(self.config.mutation_rate) {
                child.role = rng.gen_range(0..dims[0]);
            }
            if rng.gen_bool(self.config.mutation_rate) {
                child.style = rng.gen_range(0..dims[1]);
            }
            if rng.gen_bool(self.config.mutation_rate) {
                child.technique = rng.gen_range(0..dims[2]);
            }

            match pool.reserve(Some(child), rng) {
                Some(key) => {
                    #[cfg(feature = "tracing")]
                    if key != child {
                        tracing::warn!(bred = ?child, substitute = ?key, "offspring already used, substituting");
                    }
                    next.push(key);
                }
                None => break,
            }
        }
        next
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

        let space_len = request.space.len();
        let size = self.config.population_size;
        if size > space_len {
            return Err(Error::config(format!(
                "population size {size} exceeds the {space_len} available combinations"
            )));
        }

        let mut adjustments = Vec::new();
        let generations = clamp_budget(
            "generations",
            self.config.generations,
            space_len / size,
            &mut adjustments,
        );

        let mut rng = rng_from(self.config.seed);
        let mut pool = UniquenessPool::new(request.space);
        let dims = request.space.dims();
        let objective = Objective::new(
            generator,
            request.space,
            request.task_description,
            request.task_type,
            request.dataset,
            &self.eval,
        );

        let mut population: Vec<CandidateKey> = (0..size)
            .filter_map(|_| pool.reserve(None, &mut rng))
            .collect();
        let mut results = Vec::with_capacity(size * generations);
        let mut history = Vec::with_capacity(generations);
        let mut best_so_far = f64::NEG_INFINITY;
        let mut cancelled = false;

        for generation in 1..=generations {
            let mut scored = Vec::with_capacity(population.len());
            for &key in &population {
                scored.push(objective.score(key).await?);
            }
            // Stable: equal scores keep evaluation order.
            scored.sort_by(|a, b| b.score().total_cmp(&a.score()));

            let n = scored.len().max(1) as f64;
            let best = scored.first().map_or(0.0, |s| s.score());
            let worst = scored.last().map_or(0.0, |s| s.score());
            let avg = scored.iter().map(|s| s.score()).sum::<f64>() / n;
            best_so_far = best_so_far.max(best);

            history.push(EvolutionHistoryEntry {
                generation,
                best_score: best,
                avg_score: avg,
                worst_score: worst,
            });

            #[cfg(feature = "tracing")]
            tracing::debug!(generation, best, avg, worst, "generation evaluated");

            let ranked: Vec<CandidateKey> = scored.iter().map(|s| s.key).collect();
            let base = (generation - 1) * size;
            results.extend(
                scored
                    .into_iter()
                    .enumerate()
                    .map(|(i, s)| s.into_result(base + i + 1, request.task_type)),
            );

            let flow = observer.on_progress(&Progress::Generation {
                generation,
                total: generations,
                best_score: best_so_far,
                avg_score: avg,
            });
            if flow.is_break() {
                cancelled = generation < generations;
                break;
            }
            if generation == generations {
                break;
            }

            population = self.breed(&ranked, dims, &mut pool, &mut rng);
        }

        finish(
            self.name(),
            results,
            History::Evolution(history),
            adjustments,
            cancelled,
        )
    }
}

impl SearchStrategy for GeneticAlgorithm {
    fn name(&self) -> &'static str {
        "genetic"
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
                "genetic",
                generations = self.config.generations,
                population_size = self.config.population_size,
                elites = self.config.elite_count(),
                space = request.space.len()
            ),
        );
        fut.await
    }
}
