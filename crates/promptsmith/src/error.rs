// Copyright © 2025 lituus-io <spicyzhug@gmail.com>
// All Rights Reserved.
// Licensed under PolyForm Noncommercial 1.0.0

//! Error types for promptsmith

use std::time::Duration;
use thiserror::Error;

/// Result type alias for promptsmith operations
pub type Result<T> = core::result::Result<T, Error>;

/// Main error type for promptsmith
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid search space, dataset or budget. Raised before any call is made.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A call to the generation capability failed.
    ///
    /// Never escapes a search run: failed samples degrade to empty predictions.
    #[error("Generation error: {0}")]
    Generation(String),

    /// A single generation call exceeded its time limit.
    #[error("Generation timed out after {0:?}")]
    Timeout(Duration),

    /// The strategy needs a cargo feature that was not compiled in.
    #[error("Strategy `{strategy}` requires the `{feature}` feature of promptsmith")]
    MissingDependency {
        /// Strategy that was requested
        strategy: &'static str,
        /// Cargo feature providing it
        feature: &'static str,
    },

    /// Scoring adapter failure
    #[error("Metric error: {0}")]
    Metric(#[from] anyhow::Error),

    /// JSON errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a generation error
    pub fn generation(msg: impl Into<String>) -> Self {
        Self::Generation(msg.into())
    }

    /// Create a generic error
    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }

    // =========================================================================
    // Error Classification Methods
    // =========================================================================

    /// Check if this is a configuration error.
    ///
    /// Configuration errors are raised before any evaluation budget is spent
    /// and are never retried.
    #[inline]
    pub fn is_config_error(&self) -> bool {
        matches!(self, Self::Config(_))
    }

    /// Check if the requested strategy is not compiled in.
    ///
    /// Callers can fall back to another strategy on this error.
    #[inline]
    pub fn is_missing_dependency(&self) -> bool {
        matches!(self, Self::MissingDependency { .. })
    }

    /// Check if this error came from a generation call.
    #[inline]
    pub fn is_generation_error(&self) -> bool {
        matches!(self, Self::Generation(_) | Self::Timeout(_))
    }

    /// Get the error category for logging.
    pub fn category(&self) -> &'static str {
        match self {
            Self::Config(_) => "config",
            Self::Generation(_) => "generation",
            Self::Timeout(_) => "timeout",
            Self::MissingDependency { .. } => "missing_dependency",
            Self::Metric(_) => "metric",
            Self::Json(_) => "json",
            Self::Yaml(_) => "yaml",
            Self::Io(_) => "io",
            Self::Other(_) => "other",
        }
    }
}
