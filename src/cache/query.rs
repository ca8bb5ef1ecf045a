//! TTL cache for rendered lookup-query results
//!
//! Keys are the rendered SQL prefixed with a result-family namespace, so
//! identical statements from different call sites share entries while list,
//! distinct-value and count results never collide. Keeping the raw SQL in
//! the key is what lets [`QueryCache::purge_table`] find affected entries.

use crate::builder::foreign::ForeignEntry;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};

/// Default entry lifetime
pub const DEFAULT_TTL: Duration = Duration::from_secs(30 * 60);

/// One cached lookup result
#[derive(Clone)]
pub enum CachedResult {
    Entries(Arc<Vec<ForeignEntry>>),
    Count(u64),
}

struct Slot {
    value: CachedResult,
    expires_at: Instant,
}

/// Expiring store for lookup lists and record counts.
///
/// Expired entries are dropped lazily when read; [`QueryCache::purge_expired`]
/// sweeps them eagerly when a caller wants the memory back.
pub struct QueryCache {
    data: RwLock<HashMap<String, Slot>>,
    ttl: Duration,
}

impl QueryCache {
    pub fn new() -> Self {
        Self::with_ttl(DEFAULT_TTL)
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            data: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn list_key(sql: &str) -> String {
        format!("list:{}", sql)
    }

    pub fn distinct_key(sql: &str) -> String {
        format!("distinct:{}", sql)
    }

    pub fn count_key(sql: &str) -> String {
        format!("count:{}", sql)
    }

    /// Fresh entry for a key, dropping it instead when it has expired
    pub fn get(&self, key: &str) -> Option<CachedResult> {
        let expired = if let Ok(data) = self.data.read() {
            match data.get(key) {
                Some(slot) if Instant::now() < slot.expires_at => {
                    return Some(slot.value.clone());
                }
                Some(_) => true,
                None => false,
            }
        } else {
            false
        };

        if expired {
            if let Ok(mut data) = self.data.write() {
                // the entry may have been refreshed between the locks
                let still_expired = data
                    .get(key)
                    .is_some_and(|slot| Instant::now() >= slot.expires_at);
                if still_expired {
                    data.remove(key);
                }
            }
        }
        None
    }

    pub fn entries(&self, key: &str) -> Option<Arc<Vec<ForeignEntry>>> {
        match self.get(key) {
            Some(CachedResult::Entries(list)) => Some(list),
            _ => None,
        }
    }

    pub fn count(&self, key: &str) -> Option<u64> {
        match self.get(key) {
            Some(CachedResult::Count(n)) => Some(n),
            _ => None,
        }
    }

    pub fn put(&self, key: impl Into<String>, value: CachedResult) {
        if let Ok(mut data) = self.data.write() {
            data.insert(
                key.into(),
                Slot {
                    value,
                    expires_at: Instant::now() + self.ttl,
                },
            );
        }
    }

    pub fn put_entries(&self, key: impl Into<String>, list: Arc<Vec<ForeignEntry>>) {
        self.put(key, CachedResult::Entries(list));
    }

    pub fn put_count(&self, key: impl Into<String>, count: u64) {
        self.put(key, CachedResult::Count(count));
    }

    /// Drop entries whose statement reads from a table.
    ///
    /// Best effort by design: the key text is scanned for
    /// `" FROM <TABLE> "` upper-cased, which covers the statements this
    /// cache stores but not arbitrary SQL (subqueries, missing trailing
    /// space at end of text).
    pub fn purge_table(&self, table: &str) -> usize {
        let needle = format!(" FROM {} ", table.trim().to_uppercase());
        if let Ok(mut data) = self.data.write() {
            let before = data.len();
            data.retain(|key, _| !key.to_uppercase().contains(&needle));
            return before - data.len();
        }
        0
    }

    /// Eagerly drop every expired entry
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        if let Ok(mut data) = self.data.write() {
            let before = data.len();
            data.retain(|_, slot| now < slot.expires_at);
            return before - data.len();
        }
        0
    }

    pub fn flush(&self) {
        if let Ok(mut data) = self.data.write() {
            data.clear();
        }
    }

    pub fn len(&self) -> usize {
        if let Ok(data) = self.data.read() {
            data.len()
        } else {
            0
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for QueryCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_entries() -> Arc<Vec<ForeignEntry>> {
        Arc::new(vec![
            ForeignEntry::new("1", "First"),
            ForeignEntry::new("2", "Second"),
        ])
    }

    #[test]
    fn test_namespaces_do_not_collide() {
        let cache = QueryCache::new();
        let sql = "SELECT DISTINCT CODE,DESCR FROM ORDERS WHERE CODE IS NOT NULL";

        cache.put_entries(QueryCache::list_key(sql), sample_entries());
        cache.put_count(QueryCache::count_key(sql), 2);

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.entries(&QueryCache::list_key(sql)).unwrap().len(), 2);
        assert_eq!(cache.count(&QueryCache::count_key(sql)), Some(2));
        // a typed read of the wrong family misses
        assert!(cache.count(&QueryCache::list_key(sql)).is_none());
    }

    #[test]
    fn test_purge_table_matches_the_from_clause() {
        let cache = QueryCache::new();
        cache.put_entries(
            QueryCache::list_key("SELECT DISTINCT CODE,DESCR FROM ORDERS WHERE CODE IS NOT NULL"),
            sample_entries(),
        );
        cache.put_count(
            QueryCache::count_key("SELECT COUNT(*) FROM (SELECT * FROM CUSTOMERS ) AS FOO"),
            7,
        );

        assert_eq!(cache.purge_table("orders"), 1);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.purge_table("suppliers"), 0);
    }

    #[test]
    fn test_expired_entries_vanish_on_read() {
        let cache = QueryCache::with_ttl(Duration::ZERO);
        cache.put_count(QueryCache::count_key("SELECT COUNT(*) FROM T"), 9);

        assert!(cache
            .get(&QueryCache::count_key("SELECT COUNT(*) FROM T"))
            .is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_purge_expired_sweeps_everything_stale() {
        let cache = QueryCache::with_ttl(Duration::ZERO);
        cache.put_count("count:a", 1);
        cache.put_count("count:b", 2);

        assert_eq!(cache.purge_expired(), 2);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_flush_clears_all_entries() {
        let cache = QueryCache::new();
        cache.put_count("count:a", 1);
        cache.put_entries("list:b", sample_entries());

        cache.flush();
        assert!(cache.is_empty());
    }
}
