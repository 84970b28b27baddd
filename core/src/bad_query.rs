//! Bad-query cache.
//!
//! Remembers query roots whose latest successful response was empty. While
//! the feature is enabled, any query that starts with such a root is
//! suppressed without touching the network. The set only grows: a later
//! non-empty response for a longer query does not clear shorter roots.

use crate::trie::PrefixTrie;
use crate::utils::normalize;

/// Prefix set of known-empty query roots.
#[derive(Debug, Clone, Default)]
pub struct BadQueryCache {
    roots: PrefixTrie,
    len: usize,
    enabled: bool,
}

impl BadQueryCache {
    pub fn new(enabled: bool) -> Self {
        Self {
            roots: PrefixTrie::new(),
            len: 0,
            enabled,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Enable or disable suppression. Disabling drops every recorded root.
    pub fn set_enabled(&mut self, enabled: bool) {
        if self.enabled && !enabled {
            self.clear();
        }
        self.enabled = enabled;
    }

    /// True when the feature is on and `query` extends a recorded root.
    pub fn should_suppress(&self, query: &str) -> bool {
        self.enabled && self.roots.has_prefix_of(&normalize(query))
    }

    /// Record the outcome of a successful response.
    ///
    /// Only empty results are stored. Returns `true` if a new root was added.
    pub fn record(&mut self, query: &str, result_count: usize) -> bool {
        if !self.enabled || result_count > 0 {
            return false;
        }
        let root = normalize(query);
        if root.is_empty() {
            return false;
        }
        let added = self.roots.insert(&root);
        if added {
            self.len += 1;
            tracing::debug!(root = %root, "recorded bad query root");
        }
        added
    }

    /// Recorded roots that `query` extends, shortest first.
    pub fn matching_roots(&self, query: &str) -> Vec<String> {
        self.roots.walk_prefixes(&normalize(query))
    }

    pub fn clear(&mut self) {
        self.roots.clear();
        self.len = 0;
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_suppresses_extensions_of_empty_root() {
        let mut cache = BadQueryCache::new(true);
        assert!(cache.record("Jam", 0));

        assert!(cache.should_suppress("Jam"));
        assert!(cache.should_suppress("Jama"));
        assert!(cache.should_suppress("Jamai"));
        assert!(cache.should_suppress("Jamaica and more"));
        assert!(!cache.should_suppress("Ja"));
        assert!(!cache.should_suppress("Lon"));
    }

    #[test]
    fn test_non_empty_results_are_not_recorded() {
        let mut cache = BadQueryCache::new(true);
        assert!(!cache.record("Jam", 3));
        assert!(cache.is_empty());
        assert!(!cache.should_suppress("Jama"));
    }

    #[test]
    fn test_cache_only_grows() {
        let mut cache = BadQueryCache::new(true);
        cache.record("Jam", 0);
        // a longer query succeeding says nothing about the shorter root
        cache.record("Jamaica", 5);
        assert!(cache.should_suppress("Jam"));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_disabled_cache_neither_records_nor_suppresses() {
        let mut cache = BadQueryCache::new(false);
        assert!(!cache.record("Jam", 0));
        assert!(!cache.should_suppress("Jama"));
    }

    #[test]
    fn test_disabling_clears_roots() {
        let mut cache = BadQueryCache::new(true);
        cache.record("Jam", 0);
        cache.set_enabled(false);
        assert!(cache.is_empty());

        cache.set_enabled(true);
        assert!(!cache.should_suppress("Jama"));
    }

    #[test]
    fn test_roots_are_normalized() {
        let mut cache = BadQueryCache::new(true);
        cache.record("  Jam ", 0);
        assert!(cache.should_suppress("Jama"));
        assert_eq!(cache.matching_roots("Jamaica"), vec!["Jam".to_string()]);
        // whitespace-only queries never become roots
        assert!(!cache.record("   ", 0));
        assert_eq!(cache.len(), 1);
    }
}
