//! In-memory adapter double for unit tests

use crate::builder::dialects::DatabaseBackend;
use crate::database::types::{ColumnKind, SqlValue, Value};
use crate::database::{
    ColumnMeta, DatabaseAdapter, PrimaryKeyMeta, RowSet, TableKind, TableMeta,
};
use crate::error::{Error, Result};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

/// Scripted [`DatabaseAdapter`]: catalog answers are fixed up front, fetch
/// responses are consumed from a queue, and every statement is recorded.
pub(crate) struct MockAdapter {
    name: String,
    backend: DatabaseBackend,
    columns: Vec<ColumnMeta>,
    primary_keys: Vec<PrimaryKeyMeta>,
    tables: Vec<TableMeta>,
    views: Vec<TableMeta>,
    schemas: Vec<String>,
    responses: Mutex<VecDeque<RowSet>>,
    fail_execute: bool,
    pub fetched: Mutex<Vec<String>>,
    pub executed: Mutex<Vec<String>>,
}

impl MockAdapter {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            backend: DatabaseBackend::Postgres,
            columns: Vec::new(),
            primary_keys: Vec::new(),
            tables: Vec::new(),
            views: Vec::new(),
            schemas: Vec::new(),
            responses: Mutex::new(VecDeque::new()),
            fail_execute: false,
            fetched: Mutex::new(Vec::new()),
            executed: Mutex::new(Vec::new()),
        }
    }

    pub fn with_backend(mut self, backend: DatabaseBackend) -> Self {
        self.backend = backend;
        self
    }

    pub fn with_columns(mut self, columns: Vec<ColumnMeta>) -> Self {
        self.columns = columns;
        self
    }

    pub fn with_primary_keys(mut self, keys: Vec<PrimaryKeyMeta>) -> Self {
        self.primary_keys = keys;
        self
    }

    pub fn with_tables(mut self, tables: Vec<TableMeta>) -> Self {
        self.tables = tables;
        self
    }

    pub fn with_views(mut self, views: Vec<TableMeta>) -> Self {
        self.views = views;
        self
    }

    pub fn with_schemas(mut self, schemas: Vec<String>) -> Self {
        self.schemas = schemas;
        self
    }

    pub fn failing_execute(mut self) -> Self {
        self.fail_execute = true;
        self
    }

    /// Queue the response for the next `fetch_rows` call
    pub fn push_rows(self, rows: RowSet) -> Self {
        if let Ok(mut responses) = self.responses.lock() {
            responses.push_back(rows);
        }
        self
    }

    /// Shorthand column description for scripted results
    pub fn column(name: &str, kind: ColumnKind) -> ColumnMeta {
        ColumnMeta {
            name: name.to_string(),
            table: String::new(),
            type_code: kind.type_code(),
            nullable: true,
        }
    }

    /// Assemble a scripted result set; cells gain kinds and 1-based positions
    /// from the column list
    pub fn rows(columns: &[(&str, ColumnKind)], data: Vec<Vec<SqlValue>>) -> RowSet {
        let metas: Vec<ColumnMeta> = columns
            .iter()
            .map(|(name, kind)| Self::column(name, *kind))
            .collect();
        let rows = data
            .into_iter()
            .map(|cells| {
                cells
                    .into_iter()
                    .enumerate()
                    .map(|(i, cell)| Value::new(cell, columns[i].1, i + 1))
                    .collect()
            })
            .collect();
        RowSet {
            columns: metas,
            rows,
        }
    }
}

#[async_trait]
impl DatabaseAdapter for MockAdapter {
    fn name(&self) -> &str {
        &self.name
    }

    fn backend(&self) -> DatabaseBackend {
        self.backend
    }

    async fn fetch_rows(&self, sql: &str) -> Result<RowSet> {
        if let Ok(mut fetched) = self.fetched.lock() {
            fetched.push(sql.to_string());
        }
        let next = self
            .responses
            .lock()
            .ok()
            .and_then(|mut responses| responses.pop_front());
        Ok(next.unwrap_or_default())
    }

    async fn execute(&self, sql: &str) -> Result<u64> {
        if let Ok(mut executed) = self.executed.lock() {
            executed.push(sql.to_string());
        }
        if self.fail_execute {
            return Err(Error::unsupported("mock execute failure"));
        }
        Ok(1)
    }

    async fn table_columns(&self, _schema: Option<&str>, _table: &str) -> Result<Vec<ColumnMeta>> {
        Ok(self.columns.clone())
    }

    async fn primary_key_columns(
        &self,
        _schema: Option<&str>,
        _table: &str,
    ) -> Result<Vec<PrimaryKeyMeta>> {
        Ok(self.primary_keys.clone())
    }

    async fn list_tables(&self, kind: TableKind) -> Result<Vec<TableMeta>> {
        Ok(match kind {
            TableKind::Tables => self.tables.clone(),
            TableKind::Views => self.views.clone(),
        })
    }

    async fn list_schemas(&self) -> Result<Vec<String>> {
        Ok(self.schemas.clone())
    }

    async fn ping(&self) -> Result<bool> {
        Ok(true)
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}
