//! Primary-key ordinal cache

use crate::database::DatabaseAdapter;
use crate::error::Result;
use indexmap::IndexMap;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// Placeholder schema segment for unqualified tables
const NO_SCHEMA: &str = "NO_SCHEMA";

/// Column-to-ordinal maps of table primary keys, keyed by connection,
/// schema and table. Member order follows the key declaration, so iterating
/// an entry walks the key columns in position order.
pub struct PrimaryKeyCache {
    data: RwLock<HashMap<String, Arc<IndexMap<String, u32>>>>,
}

impl PrimaryKeyCache {
    pub fn new() -> Self {
        Self {
            data: RwLock::new(HashMap::new()),
        }
    }

    fn key(connection: &str, schema: Option<&str>, table: &str) -> String {
        let schema = schema.unwrap_or(NO_SCHEMA);
        format!(
            "{}|{}|{}",
            connection,
            schema.trim().to_lowercase(),
            table.trim().to_lowercase()
        )
    }

    /// Cached key map for a table, loading it through the adapter on miss
    pub async fn get_or_load(
        &self,
        db: &dyn DatabaseAdapter,
        schema: Option<&str>,
        table: &str,
    ) -> Result<Arc<IndexMap<String, u32>>> {
        let key = Self::key(db.name(), schema, table);

        if let Ok(data) = self.data.read() {
            if let Some(found) = data.get(&key) {
                return Ok(Arc::clone(found));
            }
        }

        let members = db.primary_key_columns(schema, table).await?;
        let mut ordinals = IndexMap::with_capacity(members.len());
        for member in members {
            ordinals.insert(member.column, member.ordinal);
        }
        let loaded = Arc::new(ordinals);

        if let Ok(mut data) = self.data.write() {
            return Ok(Arc::clone(data.entry(key).or_insert(loaded)));
        }
        Ok(loaded)
    }

    pub fn invalidate(&self, connection: &str, schema: Option<&str>, table: &str) {
        if let Ok(mut data) = self.data.write() {
            data.remove(&Self::key(connection, schema, table));
        }
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

impl Default for PrimaryKeyCache {
    fn default() -> Self {
        Self::new()
    }
}
