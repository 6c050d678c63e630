//! Tracking of already-notified responses.

use std::collections::HashSet;

/// Set of unique keys whose notifications have been attempted.
///
/// Keys are only ever added. Implementations may persist them; the relay
/// loop does not care.
pub trait ProcessedKeySet: Send + Sync {
    /// Check if a key has been processed.
    fn contains(&self, key: &str) -> bool;

    /// Mark a key as processed.
    fn add(&mut self, key: &str);

    /// Get the count of processed keys.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Process-lifetime key set. Reset only by restarting.
#[derive(Debug, Clone, Default)]
pub struct InMemoryKeySet {
    keys: HashSet<String>,
}

impl InMemoryKeySet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProcessedKeySet for InMemoryKeySet {
    fn contains(&self, key: &str) -> bool {
        self.keys.contains(key)
    }

    fn add(&mut self, key: &str) {
        self.keys.insert(key.to_string());
    }

    fn len(&self) -> usize {
        self.keys.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_and_contains() {
        let mut keys = InMemoryKeySet::new();
        assert!(keys.is_empty());
        assert!(!keys.contains("18/10/2026 10:00:00"));

        keys.add("18/10/2026 10:00:00");
        assert!(keys.contains("18/10/2026 10:00:00"));
        assert_eq!(keys.len(), 1);
    }

    #[test]
    fn test_add_is_idempotent() {
        let mut keys = InMemoryKeySet::new();
        keys.add("t1");
        keys.add("t1");
        assert_eq!(keys.len(), 1);
    }
}
