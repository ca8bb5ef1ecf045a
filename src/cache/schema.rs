//! Result-shape cache keyed by connection and table

use crate::database::types::Column;
use crate::database::DatabaseAdapter;
use crate::error::Result;
use crate::schema::Schema;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// Shared [`Schema`] instances, one per `(connection, table)` pair.
///
/// Entries never expire; a table whose shape changed is dropped explicitly
/// through [`SchemaCache::invalidate`].
pub struct SchemaCache {
    data: RwLock<HashMap<String, Arc<Schema>>>,
}

impl SchemaCache {
    pub fn new() -> Self {
        Self {
            data: RwLock::new(HashMap::new()),
        }
    }

    fn key(connection: &str, table: &str) -> String {
        format!("{}|{}", connection, table.trim().to_lowercase())
    }

    /// Cached shape for a table, loading it through the adapter on miss.
    ///
    /// Concurrent loaders race benignly: the first insert wins, so every
    /// caller ends up holding the same `Arc`.
    pub async fn get_or_load(
        &self,
        db: &dyn DatabaseAdapter,
        schema: Option<&str>,
        table: &str,
    ) -> Result<Arc<Schema>> {
        let key = Self::key(db.name(), table);

        if let Ok(data) = self.data.read() {
            if let Some(found) = data.get(&key) {
                return Ok(Arc::clone(found));
            }
        }

        let metas = db.table_columns(schema, table).await?;
        let columns: Vec<Column> = metas
            .into_iter()
            .map(|meta| Column::from_code(meta.name, meta.table, meta.type_code, meta.nullable))
            .collect();
        let loaded = Arc::new(Schema::from_columns(table, columns));

        if let Ok(mut data) = self.data.write() {
            return Ok(Arc::clone(data.entry(key).or_insert(loaded)));
        }
        Ok(loaded)
    }

    /// Cached shape without loading
    pub fn get(&self, connection: &str, table: &str) -> Option<Arc<Schema>> {
        if let Ok(data) = self.data.read() {
            return data.get(&Self::key(connection, table)).map(Arc::clone);
        }
        None
    }

    pub fn invalidate(&self, connection: &str, table: &str) {
        if let Ok(mut data) = self.data.write() {
            data.remove(&Self::key(connection, table));
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

impl Default for SchemaCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::testing::MockAdapter;
    use crate::database::types::ColumnKind;
    use crate::database::ColumnMeta;

    fn customer_columns() -> Vec<ColumnMeta> {
        vec![
            ColumnMeta {
                name: "ID".into(),
                table: "CUSTOMERS".into(),
                type_code: ColumnKind::Int.type_code(),
                nullable: false,
            },
            ColumnMeta {
                name: "NAME".into(),
                table: "CUSTOMERS".into(),
                type_code: ColumnKind::VarChar.type_code(),
                nullable: true,
            },
        ]
    }

    #[tokio::test]
    async fn test_loads_once_and_shares_the_arc() {
        let db = MockAdapter::new("main").with_columns(customer_columns());
        let cache = SchemaCache::new();

        let first = cache.get_or_load(&db, None, "CUSTOMERS").await.unwrap();
        let second = cache.get_or_load(&db, None, "customers").await.unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.number_of_columns(), 2);
        assert_eq!(first.index_of("name"), Some(2));
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn test_connections_do_not_share_entries() {
        let main = MockAdapter::new("main").with_columns(customer_columns());
        let replica = MockAdapter::new("replica").with_columns(customer_columns());
        let cache = SchemaCache::new();

        let a = cache.get_or_load(&main, None, "customers").await.unwrap();
        let b = cache.get_or_load(&replica, None, "customers").await.unwrap();

        assert!(!Arc::ptr_eq(&a, &b));
        assert_eq!(cache.len(), 2);
    }

    #[tokio::test]
    async fn test_invalidate_forces_a_reload() {
        let db = MockAdapter::new("main").with_columns(customer_columns());
        let cache = SchemaCache::new();

        let before = cache.get_or_load(&db, None, "customers").await.unwrap();
        cache.invalidate("main", "CUSTOMERS");
        assert!(cache.get("main", "customers").is_none());

        let after = cache.get_or_load(&db, None, "customers").await.unwrap();
        assert!(!Arc::ptr_eq(&before, &after));
    }
}
