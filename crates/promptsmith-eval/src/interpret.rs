// Copyright © 2025 lituus-io <spicyzhug@gmail.com>
// All Rights Reserved.
// Licensed under PolyForm Noncommercial 1.0.0

//! Human-readable bands for 0-100 scores.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Quality band of a score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Level {
    NeedsWork,
    Pass,
    Good,
    Excellent,
}

impl Level {
    /// Band for a 0-100 score.
    pub fn from_score(score: f64) -> Self {
        if score >= 80.0 {
            Self::Excellent
        } else if score >= 60.0 {
            Self::Good
        } else if score >= 40.0 {
            Self::Pass
        } else {
            Self::NeedsWork
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Excellent => "excellent",
            Self::Good => "good",
            Self::Pass => "pass",
            Self::NeedsWork => "needs work",
        };
        f.write_str(s)
    }
}

/// A score's band plus a suggestion for the next prompt iteration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interpretation {
    pub level: Level,
    pub advice: &'static str,
}

/// Interpret a score for the named metric.
///
/// `metric` is matched on its prefix: `accuracy`, `rouge*` or `bleu`. Unknown
/// metrics get generic advice for their band.
pub fn interpret(metric: &str, score: f64) -> Interpretation {
    let level = Level::from_score(score);
    let metric = metric.to_ascii_lowercase();

    let specific: Option<[&'static str; 3]> = if metric.starts_with("accuracy") {
        Some([
            "Classification is unreliable. Define each label in more detail, add examples, or strengthen step-by-step guidance.",
            "Classification is mostly right. Tighten the labelling criteria and cover borderline cases.",
            "Classification is accurate. The prompt design holds up.",
        ])
    } else if metric.starts_with("rouge") {
        Some([
            "Summary coverage is thin. State extraction rules, insist on keeping key terms, or adjust the target length.",
            "Summary quality is acceptable. Refine the output format or rank the points that matter most.",
            "Summaries cover the key information well.",
        ])
    } else if metric.starts_with("bleu") {
        Some([
            "Translations diverge from the references. Add a glossary, pin down the register, or translate in stages.",
            "Translations are broadly accurate. Add domain terminology and polish idiomatic phrasing.",
            "Translations closely match the references.",
        ])
    } else {
        None
    };

    let advice = match specific {
        Some([low, medium, high]) => match level {
            Level::Excellent | Level::Good => high,
            Level::Pass => medium,
            Level::NeedsWork => low,
        },
        None => match level {
            Level::Excellent => "Strong result. Keep the current prompt.",
            Level::Good => "Solid result. Small prompt tweaks may push it further.",
            Level::Pass => "Acceptable. Restructure the prompt or add constraints.",
            Level::NeedsWork => "Far from the references. Redesign the prompt or check the references.",
        },
    };

    Interpretation { level, advice }
}
