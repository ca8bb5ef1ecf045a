//! Soft-delete column probe cache

use crate::database::DatabaseAdapter;
use crate::error::Result;
use std::collections::HashMap;
use std::sync::RwLock;

/// Column whose presence marks a table as soft-deleting
pub const SOFT_DELETE_COLUMN: &str = "stato_rec";

/// Remembers which tables carry the soft-delete marker column.
///
/// Keys are bare table names (any `schema.` prefix stripped) per
/// connection; both outcomes of the probe are cached.
pub struct SoftDeleteCache {
    data: RwLock<HashMap<String, bool>>,
}

impl SoftDeleteCache {
    pub fn new() -> Self {
        Self {
            data: RwLock::new(HashMap::new()),
        }
    }

    fn key(connection: &str, table: &str) -> String {
        let bare = table.rsplit('.').next().unwrap_or(table);
        format!("{}|{}", connection, bare.trim().to_lowercase())
    }

    /// Whether the table carries the marker column, probing the catalog on a
    /// cache miss
    pub async fn has_soft_delete(&self, db: &dyn DatabaseAdapter, table: &str) -> Result<bool> {
        let key = Self::key(db.name(), table);

        if let Ok(data) = self.data.read() {
            if let Some(found) = data.get(&key) {
                return Ok(*found);
            }
        }

        let bare = table.rsplit('.').next().unwrap_or(table);
        let columns = db.table_columns(None, bare).await?;
        let found = columns
            .iter()
            .any(|col| col.name.eq_ignore_ascii_case(SOFT_DELETE_COLUMN));

        if let Ok(mut data) = self.data.write() {
            data.insert(key, found);
        }
        Ok(found)
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

impl Default for SoftDeleteCache {
    fn default() -> Self {
        Self::new()
    }
}
