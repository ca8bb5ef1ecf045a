//! Lookup caches for catalog metadata and rendered-query results
//!
//! Four caches cover the hot metadata paths: result shapes
//! ([`SchemaCache`]), primary-key ordinals ([`PrimaryKeyCache`]), the
//! soft-delete column probe ([`SoftDeleteCache`]) and rendered lookup-query
//! results ([`QueryCache`]). All populate lazily on miss; only the query
//! cache expires entries. Each cache is guarded by one coarse lock that is
//! never held across an adapter call.

pub mod primary;
pub mod query;
pub mod schema;
pub mod soft_delete;

pub use primary::PrimaryKeyCache;
pub use query::{CachedResult, QueryCache};
pub use schema::SchemaCache;
pub use soft_delete::SoftDeleteCache;

use std::time::Duration;

/// Cache bundle handed to the lookup and scan operations.
///
/// One bundle per application (or per test); connection identity is part of
/// every key, so a single bundle serves any number of adapters.
pub struct Caches {
    pub schemas: SchemaCache,
    pub primary_keys: PrimaryKeyCache,
    pub soft_delete: SoftDeleteCache,
    pub queries: QueryCache,
}

impl Caches {
    pub fn new() -> Self {
        Self {
            schemas: SchemaCache::new(),
            primary_keys: PrimaryKeyCache::new(),
            soft_delete: SoftDeleteCache::new(),
            queries: QueryCache::new(),
        }
    }

    /// Bundle with a custom time-to-live for the query cache
    pub fn with_query_ttl(ttl: Duration) -> Self {
        Self {
            queries: QueryCache::with_ttl(ttl),
            ..Self::new()
        }
    }

    /// Drop every entry in every cache
    pub fn flush(&self) {
        self.schemas.flush();
        self.primary_keys.flush();
        self.soft_delete.flush();
        self.queries.flush();
    }
}

impl Default for Caches {
    fn default() -> Self {
        Self::new()
    }
}
