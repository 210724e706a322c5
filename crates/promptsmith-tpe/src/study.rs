// Copyright © 2025 lituus-io <spicyzhug@gmail.com>
// All Rights Reserved.
// Licensed under PolyForm Noncommercial 1.0.0

//! Ask/tell optimization study.

use crate::error::{Result, TpeError};
use crate::sampler::{TpeConfig, TpeSampler};
use crate::Assignment;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Optimization direction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[default]
    Maximize,
    Minimize,
}

/// A completed trial.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Trial {
    /// Zero-based trial number.
    pub number: usize,
    /// Category index per dimension.
    pub params: Assignment,
    /// Objective value.
    pub value: f64,
}

/// Trial history plus the sampler that proposes the next point.
pub struct Study {
    dims: SmallVec<[usize; 4]>,
    direction: Direction,
    sampler: TpeSampler,
    trials: Vec<Trial>,
}

impl Study {
    /// Create a study over categorical dimensions of the given sizes.
    pub fn new(dims: &[usize], direction: Direction, config: TpeConfig) -> Result<Self> {
        if dims.is_empty() {
            return Err(TpeError::EmptySpace);
        }
        if let Some(idx) = dims.iter().position(|&k| k == 0) {
            return Err(TpeError::EmptyDimension(idx));
        }
        Ok(Self {
            dims: SmallVec::from_slice(dims),
            direction,
            sampler: TpeSampler::new(config)?,
            trials: Vec::new(),
        })
    }

    /// Dimension sizes.
    pub fn dims(&self) -> &[usize] {
        &self.dims
    }

    /// Optimization direction.
    pub const fn direction(&self) -> Direction {
        self.direction
    }

    /// Completed trials in the order they were told.
    pub fn trials(&self) -> &[Trial] {
        &self.trials
    }

    /// Propose the next assignment.
    pub fn ask(&mut self) -> Assignment {
        self.sampler.sample(&self.dims, &self.trials, self.direction)
    }

    /// Record the objective value for an assignment.
    pub fn tell(&mut self, params: Assignment, value: f64) -> Result<&Trial> {
        if params.len() != self.dims.len() {
            return Err(TpeError::InvalidAssignment(format!(
                "expected {} dimensions, got {}",
                self.dims.len(),
                params.len()
            )));
        }
        for (d, (&v, &k)) in params.iter().zip(self.dims.iter()).enumerate() {
            if v >= k {
                return Err(TpeError::InvalidAssignment(format!(
                    "dimension {d} index {v} out of range 0..{k}"
                )));
            }
        }

        let number = self.trials.len();
        self.trials.push(Trial {
            number,
            params,
            value,
        });
        Ok(&self.trials[number])
    }

    /// The best trial; the earliest one wins ties.
    pub fn best_trial(&self) -> Result<&Trial> {
        let mut best: Option<&Trial> = None;
        for trial in &self.trials {
            let better = match best {
                None => true,
                Some(b) => match self.direction {
                    Direction::Maximize => trial.value > b.value,
                    Direction::Minimize => trial.value < b.value,
                },
            };
            if better {
                best = Some(trial);
            }
        }
        best.ok_or(TpeError::NoTrials)
    }
}
