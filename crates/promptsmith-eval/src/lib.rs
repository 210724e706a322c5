// Copyright © 2025 lituus-io <spicyzhug@gmail.com>
// All Rights Reserved.
// Licensed under PolyForm Noncommercial 1.0.0

//! Scoring adapter for promptsmith
//!
//! Every metric reports on a 0-100 scale so the search strategies can compare
//! classification, summarization and translation runs on the same axis.
//! Batch reduction over prediction/reference pairs runs on Rayon.

pub mod interpret;
pub mod metric;
pub mod tokenize;

pub use interpret::{interpret, Interpretation, Level};
pub use metric::{
    accuracy, bleu, rouge, Bleu, ExactMatch, Metric, RougeL, RougeScores, TaskMetric,
};
pub use tokenize::{tokenize, Language};
