// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Subflow Contributors

//! Token counting for language-model prompt budgeting.
//!
//! Uses a real per-model tokenizer when one is available, falling back to
//! a coarse `len / 4` heuristic otherwise. Encoders are expensive to build
//! (they load a merge table) so one is cached per model name.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tiktoken_rs::CoreBPE;

/// Caches per-model tokenizer instances across calls.
#[derive(Default)]
pub struct TokenCounter {
    encoders: Mutex<HashMap<String, Arc<CoreBPE>>>,
}

impl TokenCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of tokens `text` would consume for `model`. Empty input is
    /// always zero regardless of encoder availability.
    pub fn count(&self, text: &str, model: &str) -> usize {
        if text.is_empty() {
            return 0;
        }
        match self.encoder_for(model) {
            Some(bpe) => bpe.encode_ordinary(text).len(),
            None => (text.len() / 4).max(1),
        }
    }

    fn encoder_for(&self, model: &str) -> Option<Arc<CoreBPE>> {
        let mut cache = self.encoders.lock();
        if let Some(bpe) = cache.get(model) {
            return Some(Arc::clone(bpe));
        }
        let bpe = tiktoken_rs::get_bpe_from_model(model).ok()?;
        let bpe = Arc::new(bpe);
        cache.insert(model.to_string(), Arc::clone(&bpe));
        Some(bpe)
    }
}

#[cfg(test)]
#[path = "token_counter_tests.rs"]
mod tests;
