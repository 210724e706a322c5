// Copyright © 2025 lituus-io <spicyzhug@gmail.com>
// All Rights Reserved.
// Licensed under PolyForm Noncommercial 1.0.0

//! Pool of candidates not yet used in a run.
//!
//! Reservation removes a key for good; nothing is ever returned to the pool,
//! so every reserved key is distinct for the lifetime of the run.

use crate::space::{CandidateKey, SearchSpace};
use rand::Rng;
use std::collections::HashMap;

/// Remaining unused candidates with O(1) reserve-and-remove.
#[derive(Debug, Clone)]
pub struct UniquenessPool {
    remaining: Vec<CandidateKey>,
    /// Position of each remaining key in `remaining`.
    index: HashMap<CandidateKey, usize>,
}

impl UniquenessPool {
    /// Pool holding every candidate of the space.
    pub fn new(space: &SearchSpace) -> Self {
        let remaining: Vec<CandidateKey> = space.keys().collect();
        let index = remaining.iter().enumerate().map(|(i, &k)| (k, i)).collect();
        Self { remaining, index }
    }

    /// Remaining candidates.
    pub fn len(&self) -> usize {
        self.remaining.len()
    }

    /// Whether every candidate has been reserved.
    pub fn is_empty(&self) -> bool {
        self.remaining.is_empty()
    }

    /// Whether a key is still unused.
    pub fn contains(&self, key: CandidateKey) -> bool {
        self.index.contains_key(&key)
    }

    fn take_at(&mut self, pos: usize) -> CandidateKey {
        let key = self.remaining.swap_remove(pos);
        self.index.remove(&key);
        if let Some(&moved) = self.remaining.get(pos) {
            self.index.insert(moved, pos);
        }
        key
    }

    /// Reserve `preferred` if it is unused, otherwise a random unused key.
    ///
    /// Returns `None` once the pool is exhausted.
    pub fn reserve<R: Rng>(
        &mut self,
        preferred: Option<CandidateKey>,
        rng: &mut R,
    ) -> Option<CandidateKey> {
        if let Some(pos) = preferred.and_then(|k| self.index.get(&k).copied()) {
            return Some(self.take_at(pos));
        }
        if self.remaining.is_empty() {
            return None;
        }
        let pos = rng.gen_range(0..self.remaining.len());
        Some(self.take_at(pos))
    }
}
