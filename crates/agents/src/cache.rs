use dashmap::DashMap;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::sync::Arc;

use crate::config::SearchDepth;

/// Process-local cache of rendered search contexts.
#[derive(Clone)]
pub struct SearchCache {
    contexts: Arc<DashMap<String, String>>,
    max_entries: usize,
}

impl SearchCache {
    pub fn new(max_entries: usize) -> Self {
        Self {
            contexts: Arc::new(DashMap::new()),
            max_entries,
        }
    }

    pub fn get(&self, query: &str, max_results: usize, depth: SearchDepth) -> Option<String> {
        let key = Self::key(query, max_results, depth);
        self.contexts.get(&key).map(|r| r.value().clone())
    }

    pub fn set(&self, query: &str, max_results: usize, depth: SearchDepth, context: String) {
        if self.max_entries == 0 {
            return;
        }
        if self.contexts.len() >= self.max_entries {
            // Simple eviction: clear 25% when full
            let to_remove: Vec<_> = self
                .contexts
                .iter()
                .take((self.max_entries / 4).max(1))
                .map(|r| r.key().clone())
                .collect();
            for key in to_remove {
                self.contexts.remove(&key);
            }
        }
        self.contexts
            .insert(Self::key(query, max_results, depth), context);
    }

    fn key(query: &str, max_results: usize, depth: SearchDepth) -> String {
        let mut hasher = Sha256::new();
        hasher.update(query.as_bytes());
        hasher.update(max_results.to_le_bytes());
        hasher.update(depth.as_str().as_bytes());
        hex::encode(hasher.finalize())
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            contexts_cached: self.contexts.len(),
            max_entries: self.max_entries,
        }
    }

    pub fn clear(&self) {
        self.contexts.clear();
    }
}

#[derive(Debug, Serialize)]
pub struct CacheStats {
    pub contexts_cached: usize,
    pub max_entries: usize,
}
