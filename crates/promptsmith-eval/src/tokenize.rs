// Copyright © 2025 lituus-io <spicyzhug@gmail.com>
// All Rights Reserved.
// Licensed under PolyForm Noncommercial 1.0.0

//! Tokenization for n-gram metrics.
//!
//! CJK text has no word boundaries, so each ideograph (or kana/hangul
//! syllable) becomes its own token. Runs of other alphanumeric characters
//! form words, and any remaining non-space character is a single token.

use serde::{Deserialize, Serialize};

/// Language hint for tokenization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    /// Mixed text: CJK characters split individually, other scripts by word.
    #[default]
    Auto,
    /// Chinese text. Same segmentation as `Auto`.
    Chinese,
    /// Whitespace-delimited text, tokens kept verbatim.
    English,
}

/// Whether a character belongs to a script written without spaces.
#[inline]
pub(crate) fn is_cjk(c: char) -> bool {
    matches!(
        c as u32,
        0x3040..=0x30FF      // hiragana, katakana
            | 0x3400..=0x4DBF // CJK extension A
            | 0x4E00..=0x9FFF // CJK unified ideographs
            | 0xAC00..=0xD7AF // hangul syllables
            | 0xF900..=0xFAFF // CJK compatibility ideographs
            | 0x20000..=0x2A6DF
    )
}

/// Split text into tokens for the given language.
pub fn tokenize(text: &str, lang: Language) -> Vec<String> {
    match lang {
        Language::English => text.split_whitespace().map(str::to_string).collect(),
        Language::Auto | Language::Chinese => segment(text),
    }
}

fn segment(text: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut word = String::new();

    for c in text.chars() {
        if c.is_whitespace() {
            flush(&mut word, &mut tokens);
        } else if is_cjk(c) {
            flush(&mut word, &mut tokens);
            tokens.push(c.to_string());
        } else if c.is_alphanumeric() || c == '\'' || c == '-' {
            word.push(c);
        } else {
            flush(&mut word, &mut tokens);
            tokens.push(c.to_string());
        }
    }
    flush(&mut word, &mut tokens);
    tokens
}

#[inline]
fn flush(word: &mut String, tokens: &mut Vec<String>) {
    if !word.is_empty() {
        tokens.push(std::mem::take(word));
    }
}

/// Tokens normalized for ROUGE: lowercased, punctuation dropped.
pub(crate) fn rouge_tokens(text: &str, lang: Language) -> Vec<String> {
    tokenize(text, lang)
        .into_iter()
        .filter_map(|t| {
            let cleaned: String = t
                .chars()
                .filter(|c| c.is_alphanumeric() || is_cjk(*c))
                .flat_map(char::to_lowercase)
                .collect();
            (!cleaned.is_empty()).then_some(cleaned)
        })
        .collect()
}
