//! Catalog scans and administrative statements
//!
//! Operations resolving table and column names against the live catalog,
//! listing the visible objects, and running the per-dialect administrative
//! probes: transaction identifiers, sequence advancement and foreign-key
//! toggling. Primary-key lookups go through the per-connection key cache.

use super::QueryBuilder;
use crate::cache::Caches;
use crate::database::{ColumnMeta, DatabaseAdapter, TableKind};
use crate::error::Result;
use indexmap::IndexMap;
use std::sync::Arc;

impl QueryBuilder {
    /// Resolve a table and column by name and hand the match to `visitor`.
    ///
    /// `table` may be qualified (`schema.name`) or bare; bare names match
    /// only tables in a public schema. Both parts compare case-insensitively.
    /// `None` when the table or the column does not exist.
    pub async fn scan_table_column<R, F>(
        &self,
        db: &dyn DatabaseAdapter,
        table: &str,
        column: &str,
        mut visitor: F,
    ) -> Result<Option<R>>
    where
        F: FnMut(Option<&str>, &str, &ColumnMeta) -> R,
    {
        let (wanted_schema, wanted_table) = match table.split_once('.') {
            Some((schema, name)) => (Some(schema.trim()), name.trim()),
            None => (None, table.trim()),
        };

        let tables = db.list_tables(TableKind::Tables).await?;
        let found = tables.iter().find(|meta| {
            if !meta.name.eq_ignore_ascii_case(wanted_table) {
                return false;
            }
            match wanted_schema {
                Some(wanted) => meta
                    .schema
                    .as_deref()
                    .is_some_and(|s| s.eq_ignore_ascii_case(wanted)),
                None => self.dialect.is_schema_public(meta.schema.as_deref()),
            }
        });
        let Some(found) = found else {
            return Ok(None);
        };

        let columns = db
            .table_columns(found.schema.as_deref(), &found.name)
            .await?;
        let matched = columns
            .iter()
            .find(|meta| meta.name.eq_ignore_ascii_case(column));
        Ok(matched.map(|meta| visitor(found.schema.as_deref(), &found.name, meta)))
    }

    /// Names of every visible table, qualified unless the schema is public
    pub async fn all_tables(&self, db: &dyn DatabaseAdapter) -> Result<Vec<String>> {
        self.list_qualified(db, TableKind::Tables).await
    }

    /// Names of every visible view, qualified unless the schema is public
    pub async fn all_views(&self, db: &dyn DatabaseAdapter) -> Result<Vec<String>> {
        self.list_qualified(db, TableKind::Views).await
    }

    async fn list_qualified(
        &self,
        db: &dyn DatabaseAdapter,
        kind: TableKind,
    ) -> Result<Vec<String>> {
        let tables = db.list_tables(kind).await?;
        Ok(tables
            .into_iter()
            .map(|meta| match meta.schema {
                Some(schema) if !self.dialect.is_schema_public(Some(&schema)) => {
                    format!("{}.{}", schema, meta.name)
                }
                _ => meta.name,
            })
            .collect())
    }

    /// Identifier of the current transaction, `None` where the database has
    /// no probe for it or reports no active transaction
    pub async fn transaction_id(&self, db: &dyn DatabaseAdapter) -> Result<Option<String>> {
        let Some(sql) = self.dialect.transaction_id_query() else {
            return Ok(None);
        };
        let rows = db.fetch_rows(sql).await?;
        match rows.scalar() {
            Some(cell) => cell.as_string(),
            None => Ok(None),
        }
    }

    /// Drop foreign-key enforcement on one table, reporting success.
    ///
    /// Failures are logged rather than raised; bulk loaders call this for
    /// every table and carry on regardless.
    pub async fn disable_foreign_keys(&self, db: &dyn DatabaseAdapter, table: &str) -> bool {
        self.toggle_foreign_keys(db, table, false).await
    }

    /// Restore foreign-key enforcement on one table, reporting success
    pub async fn enable_foreign_keys(&self, db: &dyn DatabaseAdapter, table: &str) -> bool {
        self.toggle_foreign_keys(db, table, true).await
    }

    async fn toggle_foreign_keys(
        &self,
        db: &dyn DatabaseAdapter,
        table: &str,
        enable: bool,
    ) -> bool {
        let Some(statement) = self.dialect.foreign_keys_statement(table, enable) else {
            log::debug!(
                "no foreign key toggle on {:?}, leaving {} untouched",
                self.dialect.backend(),
                table
            );
            return false;
        };
        match db.execute(&statement).await {
            Ok(_) => true,
            Err(err) => {
                log::error!("foreign key toggle failed on {}: {}", table, err);
                false
            }
        }
    }

    /// Advance a database sequence and return the new value; zero when the
    /// probe yields no row
    pub async fn next_sequence_value(
        &self,
        db: &dyn DatabaseAdapter,
        sequence: &str,
    ) -> Result<i64> {
        let sql = self.dialect.sequence_query(sequence)?;
        let rows = db.fetch_rows(&sql).await?;
        match rows.scalar() {
            Some(cell) => cell.as_i64(),
            None => Ok(0),
        }
    }

    /// Primary-key members of a table, in key order, through the key cache
    pub async fn primary_keys(
        &self,
        db: &dyn DatabaseAdapter,
        caches: &Caches,
        schema: Option<&str>,
        table: &str,
    ) -> Result<Arc<IndexMap<String, u32>>> {
        caches.primary_keys.get_or_load(db, schema, table).await
    }

    /// 1-based position of a column inside the table's primary key, zero when
    /// the column is not part of it
    pub async fn key_position(
        &self,
        db: &dyn DatabaseAdapter,
        caches: &Caches,
        schema: Option<&str>,
        table: &str,
        column: &str,
    ) -> Result<u32> {
        let keys = self.primary_keys(db, caches, schema, table).await?;
        let position = keys
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(column))
            .map(|(_, ordinal)| *ordinal)
            .unwrap_or(0);
        Ok(position)
    }
}
