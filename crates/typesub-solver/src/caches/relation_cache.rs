//! Shared memo of subtype verdicts.
//!
//! Keyed by the node pair plus everything that can change a raw verdict for
//! that pair: the forward-reference environment (by fingerprint), the
//! policy flags and the cache generation. Safe to share across threads.
//!
//! [`RelationCache::clear`] starts a new generation. A checker reads the
//! generation once when it is created, so a verdict it computed against the
//! old hierarchy is keyed under the old generation and never served again.

use crate::relation_queries::RelationFlags;
use crate::subtype::SubtypeResult;
use crate::types::TypeId;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RelationCacheKey {
    pub left: TypeId,
    pub right: TypeId,
    pub env_fingerprint: u64,
    pub flags: RelationFlags,
    pub generation: u64,
}

/// Hit and miss counters of a [`RelationCache`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RelationCacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
}

#[derive(Default)]
pub struct RelationCache {
    entries: DashMap<RelationCacheKey, SubtypeResult>,
    hits: AtomicU64,
    misses: AtomicU64,
    generation: AtomicU64,
}

impl RelationCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &RelationCacheKey) -> Option<SubtypeResult> {
        match self.entries.get(key) {
            Some(entry) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                Some(*entry)
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    /// Store a verdict. Verdicts from an earlier generation are dropped.
    pub fn insert(&self, key: RelationCacheKey, result: SubtypeResult) {
        if key.generation != self.generation() {
            return;
        }
        self.entries.insert(key, result);
    }

    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    /// Start a new generation and drop every entry. Needed whenever the
    /// nominal hierarchy or the origin table changes.
    pub fn clear(&self) {
        self.generation.fetch_add(1, Ordering::AcqRel);
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn stats(&self) -> RelationCacheStats {
        RelationCacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries: self.entries.len(),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/relation_cache_tests.rs"]
mod tests;
