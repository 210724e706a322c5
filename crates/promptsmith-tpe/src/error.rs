// Copyright © 2025 lituus-io <spicyzhug@gmail.com>
// All Rights Reserved.
// Licensed under PolyForm Noncommercial 1.0.0

//! Error types for the sampler.

use thiserror::Error;

/// Result type alias.
pub type Result<T> = std::result::Result<T, TpeError>;

/// Sampler and study errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TpeError {
    /// The space has no dimensions.
    #[error("search space has no dimensions")]
    EmptySpace,

    /// A dimension has no categories.
    #[error("dimension {0} has no categories")]
    EmptyDimension(usize),

    /// Sampler configuration is unusable.
    #[error("invalid sampler configuration: {0}")]
    InvalidConfig(String),

    /// A reported assignment does not fit the space.
    #[error("invalid assignment: {0}")]
    InvalidAssignment(String),

    /// The study has no completed trials.
    #[error("no trials have been completed")]
    NoTrials,
}
