//! Bounded tag cache
//!
//! Least-recently-used memoization of tag lookups, keyed by what was looked
//! up (a row, table or value and its content hash), the stack size and the
//! context table it was ranked against. Results never depend on the cache;
//! it only avoids recomputing quantile lookups.

use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::sync::{Mutex, MutexGuard};
use tracing::debug;

/// Default number of cached entries
pub const DEFAULT_CAPACITY: usize = 2048;

/// Cache key of one tag lookup
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    /// `value`, `row` or `table`
    pub source: &'static str,
    pub content: u64,
    pub stack_size: u32,
    /// Context category and the content hash of its table
    pub context: Option<(String, u64)>,
}

/// Cache hit/miss statistics
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
}

struct Entries {
    map: HashMap<CacheKey, Vec<String>>,
    recency: VecDeque<CacheKey>,
    stats: CacheStats,
}

/// LRU cache of tag lists
pub struct TagCache {
    capacity: usize,
    entries: Mutex<Entries>,
}

impl TagCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            entries: Mutex::new(Entries {
                map: HashMap::new(),
                recency: VecDeque::new(),
                stats: CacheStats::default(),
            }),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.lock().map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> CacheStats {
        self.lock().stats
    }

    pub fn clear(&self) {
        let mut entries = self.lock();
        entries.map.clear();
        entries.recency.clear();
        debug!("tag cache cleared");
    }

    /// Cached tags for `key`, computing and storing them on a miss
    pub fn get_or_try_insert_with<E, F>(&self, key: CacheKey, compute: F) -> Result<Vec<String>, E>
    where
        F: FnOnce() -> Result<Vec<String>, E>,
    {
        {
            let mut entries = self.lock();
            if let Some(tags) = entries.map.get(&key).cloned() {
                entries.stats.hits += 1;
                touch(&mut entries.recency, &key);
                return Ok(tags);
            }
            entries.stats.misses += 1;
        }

        let tags = compute()?;

        let mut entries = self.lock();
        if entries.map.insert(key.clone(), tags.clone()).is_none() {
            entries.recency.push_back(key);
            while entries.map.len() > self.capacity {
                match entries.recency.pop_front() {
                    Some(oldest) => {
                        entries.map.remove(&oldest);
                    }
                    None => break,
                }
            }
        } else {
            touch(&mut entries.recency, &key);
        }
        Ok(tags)
    }

    fn lock(&self) -> MutexGuard<'_, Entries> {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn touch(recency: &mut VecDeque<CacheKey>, key: &CacheKey) {
    if let Some(position) = recency.iter().position(|k| k == key) {
        if let Some(k) = recency.remove(position) {
            recency.push_back(k);
        }
    }
}

impl Default for TagCache {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

/// Clones start empty
impl Clone for TagCache {
    fn clone(&self) -> Self {
        Self::new(self.capacity)
    }
}

impl fmt::Debug for TagCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TagCache")
            .field("capacity", &self.capacity)
            .field("len", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(n: u64) -> CacheKey {
        CacheKey {
            source: "value",
            content: n,
            stack_size: 1,
            context: None,
        }
    }

    fn compute(tag: &str) -> Result<Vec<String>, ()> {
        Ok(vec![tag.to_string()])
    }

    #[test]
    fn test_hit_after_miss() {
        let cache = TagCache::new(4);
        assert_eq!(cache.get_or_try_insert_with(key(1), || compute("a")).unwrap(), vec!["a"]);
        assert_eq!(cache.get_or_try_insert_with(key(1), || compute("b")).unwrap(), vec!["a"]);
        assert_eq!(cache.stats(), CacheStats { hits: 1, misses: 1 });
    }

    #[test]
    fn test_evicts_least_recently_used() {
        let cache = TagCache::new(2);
        cache.get_or_try_insert_with(key(1), || compute("one")).unwrap();
        cache.get_or_try_insert_with(key(2), || compute("two")).unwrap();
        // refresh 1, so 2 is the oldest
        cache.get_or_try_insert_with(key(1), || compute("x")).unwrap();
        cache.get_or_try_insert_with(key(3), || compute("three")).unwrap();

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get_or_try_insert_with(key(1), || compute("x")).unwrap(), vec!["one"]);
        assert_eq!(cache.get_or_try_insert_with(key(2), || compute("new")).unwrap(), vec!["new"]);
    }

    #[test]
    fn test_source_and_context_are_part_of_the_key() {
        let cache = TagCache::new(8);
        cache.get_or_try_insert_with(key(1), || compute("value")).unwrap();

        let row = CacheKey { source: "row", ..key(1) };
        assert_eq!(cache.get_or_try_insert_with(row, || compute("row")).unwrap(), vec!["row"]);

        let ranked = CacheKey {
            context: Some(("currencies".to_string(), 7)),
            ..key(1)
        };
        assert_eq!(
            cache.get_or_try_insert_with(ranked, || compute("ranked")).unwrap(),
            vec!["ranked"]
        );
        assert_eq!(cache.stats(), CacheStats { hits: 0, misses: 3 });
    }

    #[test]
    fn test_errors_are_not_cached() {
        let cache = TagCache::new(2);
        let failed: Result<Vec<String>, &str> = cache.get_or_try_insert_with(key(1), || Err("boom"));
        assert!(failed.is_err());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_clone_starts_empty() {
        let cache = TagCache::new(8);
        cache.get_or_try_insert_with(key(1), || compute("a")).unwrap();
        let cloned = cache.clone();
        assert_eq!(cloned.capacity(), 8);
        assert!(cloned.is_empty());
    }
}
