//! Compiled tree cache keyed by expression text

use ahash::AHashMap;
use parking_lot::RwLock;
use std::sync::Arc;

use crate::error::Result;
use crate::event::CandidateEvent;
use crate::query::tree::ExpressionTree;

/// Shares compiled trees between callers that filter with the same expression.
///
/// Each cache is an ordinary value; there is no process-wide instance.
#[derive(Debug, Default)]
pub struct TreeCache {
    trees: RwLock<AHashMap<String, Arc<ExpressionTree>>>,
}

impl TreeCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            trees: RwLock::new(AHashMap::with_capacity(capacity)),
        }
    }

    /// Get or build the tree for `expression`. Invalid expressions are not cached.
    pub fn get_or_build(&self, expression: &str) -> Result<Arc<ExpressionTree>> {
        // Fast path: check read lock first
        if let Some(tree) = self.trees.read().get(expression) {
            tracing::trace!(expression, "filter cache hit");
            return Ok(tree.clone());
        }

        // Slow path: build outside the lock, first writer wins
        tracing::trace!(expression, "filter cache miss");
        let tree = Arc::new(ExpressionTree::new(expression)?);
        let mut trees = self.trees.write();
        Ok(trees
            .entry(expression.to_string())
            .or_insert(tree)
            .clone())
    }

    /// Match an event against the cached tree for `expression`
    #[inline]
    pub fn matches<E: CandidateEvent + ?Sized>(&self, expression: &str, event: &E) -> Result<bool> {
        Ok(self.get_or_build(expression)?.matches(event))
    }

    pub fn len(&self) -> usize {
        self.trees.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.trees.read().is_empty()
    }

    pub fn clear(&self) {
        self.trees.write().clear();
    }
}
