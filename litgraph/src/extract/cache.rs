//! Bounded LRU cache of extraction results.

use indexmap::IndexMap;
use sha2::{Digest, Sha256};

use super::RawBlock;

/// Computes the hex SHA-256 digest used as a cache key.
pub fn content_hash(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    hex::encode(hasher.finalize())
}

/// Extraction results keyed by document content hash.
///
/// Entries are kept in recency order: the front is evicted first. A capacity
/// of zero disables caching.
#[derive(Debug, Clone, Default)]
pub struct ExtractionCache {
    entries: IndexMap<String, Vec<RawBlock>>,
    capacity: usize,
}

impl ExtractionCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: IndexMap::with_capacity(capacity),
            capacity,
        }
    }

    /// Returns the cached blocks for `text`, marking them most recently used.
    pub fn get(&mut self, text: &str) -> Option<Vec<RawBlock>> {
        let key = content_hash(text);
        let index = self.entries.get_index_of(&key)?;
        let last = self.entries.len() - 1;
        self.entries.move_index(index, last);
        self.entries.get_index(last).map(|(_, blocks)| blocks.clone())
    }

    /// Stores the blocks extracted from `text`, evicting the least recently
    /// used entry when full.
    pub fn insert(&mut self, text: &str, blocks: Vec<RawBlock>) {
        if self.capacity == 0 {
            return;
        }
        let key = content_hash(text);
        self.entries.shift_remove(&key);
        while self.entries.len() >= self.capacity {
            if self.entries.shift_remove_index(0).is_none() {
                break;
            }
        }
        self.entries.insert(key, blocks);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blocks(id: &str) -> Vec<RawBlock> {
        vec![RawBlock {
            identifier: id.to_string(),
            language: None,
            content: String::new(),
            referenced_identifiers: None,
            occurrence: Some(0),
        }]
    }

    #[test]
    fn test_content_hash() {
        assert_eq!(
            content_hash("hello"),
            "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824"
        );
    }

    #[test]
    fn test_hit_and_miss() {
        let mut cache = ExtractionCache::new(2);
        cache.insert("doc one", blocks("a"));

        assert_eq!(cache.get("doc one"), Some(blocks("a")));
        assert_eq!(cache.get("doc two"), None);
    }

    #[test]
    fn test_evicts_least_recently_used() {
        let mut cache = ExtractionCache::new(2);
        cache.insert("one", blocks("a"));
        cache.insert("two", blocks("b"));
        // Touch "one" so "two" becomes the oldest.
        assert!(cache.get("one").is_some());
        cache.insert("three", blocks("c"));

        assert_eq!(cache.len(), 2);
        assert!(cache.get("two").is_none());
        assert!(cache.get("one").is_some());
        assert!(cache.get("three").is_some());
    }

    #[test]
    fn test_zero_capacity_disables() {
        let mut cache = ExtractionCache::new(0);
        cache.insert("one", blocks("a"));
        assert!(cache.is_empty());
        assert!(cache.get("one").is_none());
    }
}
