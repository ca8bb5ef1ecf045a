//! Database access seam
//!
//! [`DatabaseAdapter`] is the narrow async interface the builder-side code
//! runs statements through. Adapters materialize rows as [`Value`] cells
//! tagged with a column kind and 1-based position, and expose the catalog
//! lookups the schema and key caches feed on.

pub mod adapters;
#[cfg(test)]
pub(crate) mod testing;
pub mod types;

use crate::builder::dialects::DatabaseBackend;
use crate::builder::QueryBuilder;
use crate::error::Result;
use async_trait::async_trait;
use types::{ColumnKind, Value};

pub use adapters::{MySqlAdapter, PostgresAdapter};

/// Column description reported by a query result or the catalog
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnMeta {
    pub name: String,
    /// Owning table when known; result-set metadata may leave it empty
    pub table: String,
    pub type_code: i32,
    pub nullable: bool,
}

impl ColumnMeta {
    pub fn kind(&self) -> ColumnKind {
        ColumnKind::classify(self.type_code)
    }
}

/// One primary-key member and its position inside the key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrimaryKeyMeta {
    pub column: String,
    pub ordinal: u32,
}

/// Catalog object families listable through an adapter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableKind {
    Tables,
    Views,
}

/// One catalog table or view
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableMeta {
    pub schema: Option<String>,
    pub name: String,
}

/// Fully materialized query result
#[derive(Debug, Clone, Default)]
pub struct RowSet {
    pub columns: Vec<ColumnMeta>,
    pub rows: Vec<Vec<Value>>,
}

impl RowSet {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// First cell of the first row, the shape scalar probes come back in
    pub fn scalar(&self) -> Option<&Value> {
        self.rows.first().and_then(|row| row.first())
    }
}

/// Unified database adapter trait.
///
/// Statements arrive as finished SQL text with literal values, the form the
/// query builder renders and the query cache keys on.
#[async_trait]
pub trait DatabaseAdapter: Send + Sync {
    /// Connection name, also the identity key for per-connection caches
    fn name(&self) -> &str;

    fn backend(&self) -> DatabaseBackend;

    /// Run a SELECT and materialize every row
    async fn fetch_rows(&self, sql: &str) -> Result<RowSet>;

    /// Run a modifying statement and report the affected row count
    async fn execute(&self, sql: &str) -> Result<u64>;

    /// Catalog columns of one table in ordinal order
    async fn table_columns(&self, schema: Option<&str>, table: &str) -> Result<Vec<ColumnMeta>>;

    /// Primary-key members of one table in key order
    async fn primary_key_columns(
        &self,
        schema: Option<&str>,
        table: &str,
    ) -> Result<Vec<PrimaryKeyMeta>>;

    /// Tables or views visible to the connection
    async fn list_tables(&self, kind: TableKind) -> Result<Vec<TableMeta>>;

    /// Schemas present in the database
    async fn list_schemas(&self) -> Result<Vec<String>>;

    /// Test database connectivity
    async fn ping(&self) -> Result<bool>;

    /// A query builder for this connection's dialect
    fn query(&self) -> QueryBuilder {
        QueryBuilder::new(self.backend())
    }

    /// The underlying pool as Any for code that knows the concrete adapter
    fn as_any(&self) -> &dyn std::any::Any;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::types::codes;

    #[test]
    fn test_column_meta_classifies_type_code() {
        let meta = ColumnMeta {
            name: "ID".to_string(),
            table: "USERS".to_string(),
            type_code: codes::INTEGER,
            nullable: false,
        };
        assert_eq!(meta.kind(), ColumnKind::Int);
    }

    #[test]
    fn test_rowset_scalar() {
        let empty = RowSet::default();
        assert!(empty.is_empty());
        assert!(empty.scalar().is_none());

        let rs = RowSet {
            columns: vec![ColumnMeta {
                name: "N".to_string(),
                table: String::new(),
                type_code: codes::BIGINT,
                nullable: true,
            }],
            rows: vec![vec![Value::new(types::SqlValue::BigInt(42), ColumnKind::BigInt, 1)]],
        };
        assert_eq!(rs.len(), 1);
        assert_eq!(rs.scalar().unwrap().as_i64().unwrap(), 42);
    }
}
