// Copyright © 2025 lituus-io <spicyzhug@gmail.com>
// All Rights Reserved.
// Licensed under PolyForm Noncommercial 1.0.0

//! Generation capability trait using Generic Associated Types (GATs).
//!
//! The search core never talks to a model provider directly. It calls an
//! [`Llm`] with a filled prompt and reads back the text; transport, auth and
//! provider selection live behind the trait.
//!
//! # Examples
//!
//! ```
//! use promptsmith::MockLlm;
//!
//! let llm = MockLlm::new(|prompt| format!("echo: {prompt}"));
//! ```

use crate::error::{Error, Result};
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Output from a generation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LmOutput {
    /// The generated text.
    pub text: String,
}

impl LmOutput {
    /// Create a new LmOutput.
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

/// Trait for language model providers.
///
/// Implementations signal failures with an [`Error`] whose message carries
/// enough of the transport error (`429`, `Too Many Requests`, `Read timed
/// out`, ...) for [`classify_error`](crate::retry::classify_error) to decide
/// whether the call is worth retrying.
pub trait Llm: Send + Sync {
    /// The future type returned by `generate()`.
    type GenerateFut<'a>: Future<Output = Result<LmOutput>> + Send + 'a
    where
        Self: 'a;

    /// Generate a response for a fully rendered prompt.
    fn generate<'a>(&'a self, prompt: &'a str) -> Self::GenerateFut<'a>;

    /// Get the model name for logging.
    fn model_name(&self) -> &str {
        "unknown"
    }
}

/// A mock LLM for testing and examples.
///
/// Responses come from a closure over the prompt.
pub struct MockLlm<F>
where
    F: Fn(&str) -> String + Send + Sync,
{
    generator: F,
    name: &'static str,
}

impl<F> MockLlm<F>
where
    F: Fn(&str) -> String + Send + Sync,
{
    /// Create a new mock LLM with the given generator function.
    pub fn new(generator: F) -> Self {
        Self {
            generator,
            name: "mock",
        }
    }

    /// Set a custom name for the mock LLM.
    pub fn with_name(mut self, name: &'static str) -> Self {
        self.name = name;
        self
    }
}

impl<F> Llm for MockLlm<F>
where
    F: Fn(&str) -> String + Send + Sync,
{
    type GenerateFut<'a>
        = std::future::Ready<Result<LmOutput>>
    where
        Self: 'a;

    fn generate<'a>(&'a self, prompt: &'a str) -> Self::GenerateFut<'a> {
        std::future::ready(Ok(LmOutput::new((self.generator)(prompt))))
    }

    fn model_name(&self) -> &str {
        self.name
    }
}

/// An LLM that always fails with the given message.
#[derive(Debug)]
pub struct FailingLlm {
    message: String,
    calls: AtomicUsize,
}

impl FailingLlm {
    /// Create a new failing LLM with the given error message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of calls received so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Llm for FailingLlm {
    type GenerateFut<'a>
        = std::future::Ready<Result<LmOutput>>
    where
        Self: 'a;

    fn generate<'a>(&'a self, _prompt: &'a str) -> Self::GenerateFut<'a> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        std::future::ready(Err(Error::generation(&self.message)))
    }

    fn model_name(&self) -> &str {
        "failing"
    }
}

/// An LLM that replays a fixed script of responses.
///
/// Each call consumes the next entry: `Ok(text)` succeeds, `Err(message)`
/// fails with a generation error carrying that message. Once the script is
/// used up every call returns the fallback text.
#[derive(Debug)]
pub struct ScriptedLlm {
    script: Vec<core::result::Result<String, String>>,
    fallback: String,
    cursor: AtomicUsize,
}

impl ScriptedLlm {
    /// Create a scripted LLM.
    pub fn new<I, S>(script: I) -> Self
    where
        I: IntoIterator<Item = core::result::Result<S, S>>,
        S: Into<String>,
    {
        Self {
            script: script
                .into_iter()
                .map(|r| r.map(Into::into).map_err(Into::into))
                .collect(),
            fallback: String::new(),
            cursor: AtomicUsize::new(0),
        }
    }

    /// Text returned once the script is exhausted.
    pub fn with_fallback(mut self, text: impl Into<String>) -> Self {
        self.fallback = text.into();
        self
    }

    /// Number of calls received so far.
    pub fn calls(&self) -> usize {
        self.cursor.load(Ordering::SeqCst)
    }
}

impl Llm for ScriptedLlm {
    type GenerateFut<'a>
        = std::future::Ready<Result<LmOutput>>
    where
        Self: 'a;

    fn generate<'a>(&'a self, _prompt: &'a str) -> Self::GenerateFut<'a> {
        let i = self.cursor.fetch_add(1, Ordering::SeqCst);
        let out = match self.script.get(i) {
            Some(Ok(text)) => Ok(LmOutput::new(text.clone())),
            Some(Err(message)) => Err(Error::generation(message.clone())),
            None => Ok(LmOutput::new(self.fallback.clone())),
        };
        std::future::ready(out)
    }

    fn model_name(&self) -> &str {
        "scripted"
    }
}
