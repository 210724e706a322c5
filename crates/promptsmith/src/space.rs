// Copyright © 2025 lituus-io <spicyzhug@gmail.com>
// All Rights Reserved.
// Licensed under PolyForm Noncommercial 1.0.0

//! Search space and candidates
//!
//! A [`SearchSpace`] is three ordered axes of strings. A candidate is one
//! value per axis; [`CandidateKey`] addresses it by axis indices so the
//! strategies can hash, compare and reserve candidates without touching the
//! strings.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Index of a candidate within a [`SearchSpace`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CandidateKey {
    pub role: usize,
    pub style: usize,
    pub technique: usize,
}

impl CandidateKey {
    /// Create a key from axis indices.
    pub const fn new(role: usize, style: usize, technique: usize) -> Self {
        Self {
            role,
            style,
            technique,
        }
    }
}

/// One (role, style, technique) triple.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Candidate {
    pub role: String,
    pub style: String,
    pub technique: String,
}

impl Candidate {
    /// Create a candidate.
    pub fn new(
        role: impl Into<String>,
        style: impl Into<String>,
        technique: impl Into<String>,
    ) -> Self {
        Self {
            role: role.into(),
            style: style.into(),
            technique: technique.into(),
        }
    }
}

impl fmt::Display for Candidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} + {} + {}", self.role, self.style, self.technique)
    }
}

/// The roles, styles and techniques a search combines.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchSpace {
    roles: Vec<String>,
    styles: Vec<String>,
    techniques: Vec<String>,
}

fn dedup_axis<I, S>(items: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut seen = HashSet::new();
    items
        .into_iter()
        .map(|s| s.into().trim().to_string())
        .filter(|s| !s.is_empty() && seen.insert(s.clone()))
        .collect()
}

impl SearchSpace {
    /// Create a search space.
    ///
    /// Entries are trimmed; blank and repeated entries are dropped so every
    /// key maps to a distinct candidate. Call [`validate`](Self::validate)
    /// before searching.
    pub fn new<R, S, T>(
        roles: impl IntoIterator<Item = R>,
        styles: impl IntoIterator<Item = S>,
        techniques: impl IntoIterator<Item = T>,
    ) -> Self
    where
        R: Into<String>,
        S: Into<String>,
        T: Into<String>,
    {
        Self {
            roles: dedup_axis(roles),
            styles: dedup_axis(styles),
            techniques: dedup_axis(techniques),
        }
    }

    /// The space used when no generated space is available.
    pub fn fallback() -> Self {
        Self::new(
            ["资深专家", "数据分析师", "领域顾问", "实践者", "研究员"],
            ["严谨学术", "通俗易懂", "简洁明了", "详尽全面", "系统化"],
            [
                "Let's think step by step",
                "Provide direct answer without explanation",
                "Analyze features then decide",
            ],
        )
    }

    /// Parse a space from a language-model response.
    ///
    /// Markdown code fences are stripped and the text between the first `{`
    /// and the last `}` is parsed. Each axis may be an array of strings or of
    /// objects carrying a `name` field.
    pub fn from_llm_response(text: &str) -> Result<Self> {
        let mut content = text.trim();
        content = content.strip_prefix("```json").unwrap_or(content);
        content = content.strip_prefix("```").unwrap_or(content);
        content = content.strip_suffix("```").unwrap_or(content);
        content = content.trim();

        if let (Some(start), Some(end)) = (content.find('{'), content.rfind('}')) {
            if start < end {
                content = &content[start..=end];
            }
        }

        let value: serde_json::Value = serde_json::from_str(content)?;

        let axis = |name: &str| -> Vec<String> {
            value
                .get(name)
                .and_then(|v| v.as_array())
                .map(|items| {
                    items
                        .iter()
                        .filter_map(|item| match item {
                            serde_json::Value::String(s) => Some(s.clone()),
                            serde_json::Value::Object(obj) => {
                                obj.get("name").and_then(|n| n.as_str()).map(str::to_string)
                            }
                            _ => None,
                        })
                        .collect()
                })
                .unwrap_or_default()
        };

        let space = Self::new(axis("roles"), axis("styles"), axis("techniques"));
        space.validate()?;
        Ok(space)
    }

    /// Fail with a configuration error if any axis is empty or repeats a value.
    pub fn validate(&self) -> Result<()> {
        for (name, axis) in [
            ("roles", &self.roles),
            ("styles", &self.styles),
            ("techniques", &self.techniques),
        ] {
            if axis.is_empty() {
                return Err(Error::config(format!("search space has no {name}")));
            }
            let mut seen = HashSet::with_capacity(axis.len());
            if let Some(dup) = axis.iter().find(|s| !seen.insert(s.as_str())) {
                return Err(Error::config(format!(
                    "search space {name} contains {dup:?} more than once"
                )));
            }
        }
        Ok(())
    }

    /// Roles axis.
    pub fn roles(&self) -> &[String] {
        &self.roles
    }

    /// Styles axis.
    pub fn styles(&self) -> &[String] {
        &self.styles
    }

    /// Techniques axis.
    pub fn techniques(&self) -> &[String] {
        &self.techniques
    }

    /// Axis sizes in (role, style, technique) order.
    pub fn dims(&self) -> [usize; 3] {
        [self.roles.len(), self.styles.len(), self.techniques.len()]
    }

    /// Number of distinct candidates.
    pub fn len(&self) -> usize {
        self.roles.len() * self.styles.len() * self.techniques.len()
    }

    /// Whether the space has no candidates.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All keys of the Cartesian product, in axis order.
    pub fn keys(&self) -> impl Iterator<Item = CandidateKey> + '_ {
        let [_, styles, techniques] = self.dims();
        (0..self.len()).map(move |i| {
            CandidateKey::new(
                i / (styles * techniques),
                (i / techniques) % styles,
                i % techniques,
            )
        })
    }

    /// Whether a key addresses a candidate of this space.
    pub fn contains(&self, key: CandidateKey) -> bool {
        key.role < self.roles.len()
            && key.style < self.styles.len()
            && key.technique < self.techniques.len()
    }

    /// Resolve a key to its candidate.
    pub fn candidate(&self, key: CandidateKey) -> Option<Candidate> {
        Some(Candidate {
            role: self.roles.get(key.role)?.clone(),
            style: self.styles.get(key.style)?.clone(),
            technique: self.techniques.get(key.technique)?.clone(),
        })
    }

    /// Find the key of a candidate by value.
    pub fn key_of(&self, candidate: &Candidate) -> Option<CandidateKey> {
        Some(CandidateKey {
            role: self.roles.iter().position(|r| *r == candidate.role)?,
            style: self.styles.iter().position(|s| *s == candidate.style)?,
            technique: self
                .techniques
                .iter()
                .position(|t| *t == candidate.technique)?,
        })
    }

    /// Every candidate of the Cartesian product, in axis order.
    pub fn combinations(&self) -> Vec<Candidate> {
        self.keys().filter_map(|k| self.candidate(k)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small() -> SearchSpace {
        SearchSpace::new(["r1", "r2"], ["s1", "s2", "s3"], ["t1", "t2"])
    }

    #[test]
    fn test_len_and_keys() {
        let space = small();
        assert_eq!(space.len(), 12);
        let keys: Vec<_> = space.keys().collect();
        assert_eq!(keys.len(), 12);
        assert_eq!(keys[0], CandidateKey::new(0, 0, 0));
        assert_eq!(keys[1], CandidateKey::new(0, 0, 1));
        assert_eq!(keys[2], CandidateKey::new(0, 1, 0));
        assert_eq!(keys[11], CandidateKey::new(1, 2, 1));
        let unique: HashSet<_> = keys.iter().collect();
        assert_eq!(unique.len(), 12);
    }

    #[test]
    fn test_combinations_axis_order() {
        let combos = small().combinations();
        assert_eq!(combos[0], Candidate::new("r1", "s1", "t1"));
        assert_eq!(combos[11], Candidate::new("r2", "s3", "t2"));
    }

    #[test]
    fn test_candidate_roundtrip_key() {
        let space = small();
        for key in space.keys() {
            let c = space.candidate(key).unwrap();
            assert_eq!(space.key_of(&c), Some(key));
        }
        assert!(space.candidate(CandidateKey::new(2, 0, 0)).is_none());
    }

    #[test]
    fn test_new_drops_blank_and_repeated() {
        let space = SearchSpace::new(["a", " a ", "", "b"], ["s"], ["t"]);
        assert_eq!(space.roles(), &["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn test_validate_empty_axis() {
        let space = SearchSpace::new(["r"], Vec::<String>::new(), ["t"]);
        let err = space.validate().unwrap_err();
        assert!(err.is_config_error());
        assert!(space.is_empty());
    }

    #[test]
    fn test_fallback_shape() {
        let space = SearchSpace::fallback();
        assert_eq!(space.dims(), [5, 5, 3]);
        assert!(space.validate().is_ok());
    }

    #[test]
    fn test_from_llm_response_fenced_objects() {
        let text = r#"```json
{"roles": [{"name": "Critic", "description": "x"}, "Editor"],
 "styles": ["Formal"],
 "techniques": [{"name": "Step by step"}]}
```"#;
        let space = SearchSpace::from_llm_response(text).unwrap();
        assert_eq!(space.roles(), &["Critic".to_string(), "Editor".to_string()]);
        assert_eq!(space.styles(), &["Formal".to_string()]);
        assert_eq!(space.techniques(), &["Step by step".to_string()]);
    }

    #[test]
    fn test_from_llm_response_surrounding_prose() {
        let text = "Here is the space: {\"roles\":[\"a\"],\"styles\":[\"b\"],\"techniques\":[\"c\"]} hope it helps";
        assert_eq!(SearchSpace::from_llm_response(text).unwrap().len(), 1);
    }

    #[test]
    fn test_from_llm_response_missing_axis() {
        let text = r#"{"roles":["a"],"styles":["b"]}"#;
        assert!(SearchSpace::from_llm_response(text)
            .unwrap_err()
            .is_config_error());
    }

    #[test]
    fn test_from_llm_response_not_json() {
        let err = SearchSpace::from_llm_response("no json here").unwrap_err();
        assert_eq!(err.category(), "json");
    }
}
