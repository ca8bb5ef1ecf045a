//! Scripted adapter shared by the integration tests
//!
//! Statements run against a canned catalog and a queue of prepared row
//! sets instead of a live pool. Every statement is recorded verbatim so
//! tests can assert on the exact SQL text the builder produced.

#![allow(dead_code)]

use async_trait::async_trait;
use sqlmason::{
    ColumnKind, ColumnMeta, DatabaseAdapter, DatabaseBackend, Error, PrimaryKeyMeta, Result,
    RowSet, SqlValue, TableKind, TableMeta, Value,
};
use std::collections::VecDeque;
use std::sync::Mutex;

pub struct ScriptedDb {
    name: String,
    backend: DatabaseBackend,
    columns: Vec<ColumnMeta>,
    keys: Vec<PrimaryKeyMeta>,
    tables: Vec<TableMeta>,
    views: Vec<TableMeta>,
    schemas: Vec<String>,
    responses: Mutex<VecDeque<RowSet>>,
    fail_execute: bool,
    /// SELECT statements in arrival order
    pub fetched: Mutex<Vec<String>>,
    /// Modifying statements in arrival order
    pub executed: Mutex<Vec<String>>,
}

impl ScriptedDb {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            backend: DatabaseBackend::Postgres,
            columns: Vec::new(),
            keys: Vec::new(),
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

    /// Catalog columns reported for any table
    pub fn with_columns(mut self, columns: Vec<ColumnMeta>) -> Self {
        self.columns = columns;
        self
    }

    /// Primary-key members reported for any table
    pub fn with_keys(mut self, keys: Vec<PrimaryKeyMeta>) -> Self {
        self.keys = keys;
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

    /// Queue a row set returned by the next unanswered fetch
    pub fn respond(self, rows: RowSet) -> Self {
        if let Ok(mut queue) = self.responses.lock() {
            queue.push_back(rows);
        }
        self
    }

    /// Make every modifying statement fail
    pub fn failing_execute(mut self) -> Self {
        self.fail_execute = true;
        self
    }

    pub fn fetched_sql(&self) -> Vec<String> {
        self.fetched.lock().map(|v| v.clone()).unwrap_or_default()
    }

    pub fn executed_sql(&self) -> Vec<String> {
        self.executed.lock().map(|v| v.clone()).unwrap_or_default()
    }
}

/// Column metadata for a scripted catalog
pub fn column(name: &str, table: &str, kind: ColumnKind) -> ColumnMeta {
    ColumnMeta {
        name: name.to_string(),
        table: table.to_string(),
        type_code: kind.type_code(),
        nullable: true,
    }
}

/// One primary-key member
pub fn key(column: &str, ordinal: u32) -> PrimaryKeyMeta {
    PrimaryKeyMeta {
        column: column.to_string(),
        ordinal,
    }
}

/// A catalog table, qualified when a schema is given
pub fn table(schema: Option<&str>, name: &str) -> TableMeta {
    TableMeta {
        schema: schema.map(str::to_string),
        name: name.to_string(),
    }
}

/// Row set over named columns, one kind per column, cells in column order
pub fn rows(columns: &[(&str, ColumnKind)], data: Vec<Vec<SqlValue>>) -> RowSet {
    let metas: Vec<ColumnMeta> = columns
        .iter()
        .map(|(name, kind)| column(name, "", *kind))
        .collect();
    let rows = data
        .into_iter()
        .map(|cells| {
            cells
                .into_iter()
                .enumerate()
                .map(|(i, v)| Value::new(v, columns[i].1, i + 1))
                .collect()
        })
        .collect();
    RowSet {
        columns: metas,
        rows,
    }
}

#[async_trait]
impl DatabaseAdapter for ScriptedDb {
    fn name(&self) -> &str {
        &self.name
    }

    fn backend(&self) -> DatabaseBackend {
        self.backend
    }

    async fn fetch_rows(&self, sql: &str) -> Result<RowSet> {
        if let Ok(mut log) = self.fetched.lock() {
            log.push(sql.to_string());
        }
        let next = self.responses.lock().ok().and_then(|mut q| q.pop_front());
        Ok(next.unwrap_or_default())
    }

    async fn execute(&self, sql: &str) -> Result<u64> {
        if let Ok(mut log) = self.executed.lock() {
            log.push(sql.to_string());
        }
        if self.fail_execute {
            return Err(Error::unsupported("scripted execute failure"));
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
        Ok(self.keys.clone())
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
