//! PostgreSQL database adapter implementation

use crate::builder::dialects::DatabaseBackend;
use crate::database::types::{codes, ColumnKind, SqlValue, Value};
use crate::database::{
    ColumnMeta, DatabaseAdapter, PrimaryKeyMeta, RowSet, TableKind, TableMeta,
};
use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use rust_decimal::Decimal;
use sqlx::postgres::{PgPool, PgRow};
use sqlx::{Column, Row, TypeInfo};
use std::sync::Arc;

/// PostgreSQL database adapter
pub struct PostgresAdapter {
    name: String,
    pool: Arc<PgPool>,
}

impl PostgresAdapter {
    /// Create a new PostgreSQL adapter
    pub async fn new(name: impl Into<String>, connection_url: &str) -> Result<Self> {
        let pool = PgPool::connect(connection_url).await?;

        Ok(Self {
            name: name.into(),
            pool: Arc::new(pool),
        })
    }

    /// Create adapter from existing pool
    pub fn from_pool(name: impl Into<String>, pool: PgPool) -> Self {
        Self {
            name: name.into(),
            pool: Arc::new(pool),
        }
    }

    /// Get reference to the underlying pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Type code for a result-set column, keyed on the wire type name
    fn type_code_of(type_name: &str) -> i32 {
        match type_name {
            "BOOL" => codes::BOOLEAN,
            "INT2" => codes::SMALLINT,
            "INT4" => codes::INTEGER,
            "INT8" => codes::BIGINT,
            "FLOAT4" => codes::REAL,
            "FLOAT8" => codes::DOUBLE,
            "NUMERIC" => codes::NUMERIC,
            "CHAR" | "BPCHAR" => codes::CHAR,
            "VARCHAR" | "NAME" => codes::VARCHAR,
            "TEXT" => codes::LONGVARCHAR,
            "BYTEA" => codes::BINARY,
            "DATE" => codes::DATE,
            "TIME" => codes::TIME,
            "TIMESTAMP" | "TIMESTAMPTZ" => codes::TIMESTAMP,
            _ => codes::OTHER,
        }
    }

    /// Type code for a catalog column, keyed on `information_schema` names
    fn catalog_type_code(data_type: &str) -> i32 {
        match data_type {
            "boolean" => codes::BOOLEAN,
            "smallint" => codes::SMALLINT,
            "integer" => codes::INTEGER,
            "bigint" => codes::BIGINT,
            "real" => codes::REAL,
            "double precision" => codes::DOUBLE,
            "numeric" => codes::NUMERIC,
            "character" => codes::CHAR,
            "character varying" => codes::VARCHAR,
            "text" => codes::LONGVARCHAR,
            "bytea" => codes::BINARY,
            "date" => codes::DATE,
            "time without time zone" | "time with time zone" => codes::TIME,
            "timestamp without time zone" | "timestamp with time zone" => codes::TIMESTAMP,
            _ => codes::OTHER,
        }
    }

    /// Column descriptions for a materialized result row
    fn result_columns(row: &PgRow) -> Vec<ColumnMeta> {
        row.columns()
            .iter()
            .map(|col| ColumnMeta {
                name: col.name().to_string(),
                table: String::new(),
                type_code: Self::type_code_of(col.type_info().name()),
                nullable: true,
            })
            .collect()
    }

    /// Decode one cell into the typed value model.
    ///
    /// `TIMESTAMP` and `TIMESTAMPTZ` share a kind; the zoned variant is
    /// normalized to its UTC wall-clock reading.
    fn decode_cell(row: &PgRow, idx: usize, kind: ColumnKind) -> Result<SqlValue> {
        let value = match kind {
            ColumnKind::Boolean => row.try_get::<Option<bool>, _>(idx)?.map(SqlValue::Bool),
            ColumnKind::SmallInt => row.try_get::<Option<i16>, _>(idx)?.map(SqlValue::SmallInt),
            ColumnKind::Int => row.try_get::<Option<i32>, _>(idx)?.map(SqlValue::Int),
            ColumnKind::BigInt => row.try_get::<Option<i64>, _>(idx)?.map(SqlValue::BigInt),
            ColumnKind::Real => row.try_get::<Option<f32>, _>(idx)?.map(SqlValue::Real),
            ColumnKind::Float | ColumnKind::Double => {
                row.try_get::<Option<f64>, _>(idx)?.map(SqlValue::Double)
            }
            ColumnKind::Decimal => row.try_get::<Option<Decimal>, _>(idx)?.map(SqlValue::Decimal),
            ColumnKind::Char | ColumnKind::VarChar | ColumnKind::LongVarChar => {
                row.try_get::<Option<String>, _>(idx)?.map(SqlValue::String)
            }
            ColumnKind::Binary
            | ColumnKind::VarBinary
            | ColumnKind::LongVarBinary
            | ColumnKind::Blob => row.try_get::<Option<Vec<u8>>, _>(idx)?.map(SqlValue::Bytes),
            ColumnKind::Date => row.try_get::<Option<NaiveDate>, _>(idx)?.map(SqlValue::Date),
            ColumnKind::Time => row.try_get::<Option<NaiveTime>, _>(idx)?.map(SqlValue::Time),
            ColumnKind::Timestamp => match row.try_get::<Option<NaiveDateTime>, _>(idx) {
                Ok(ts) => ts.map(SqlValue::Timestamp),
                Err(_) => row
                    .try_get::<Option<DateTime<Utc>>, _>(idx)?
                    .map(|ts| SqlValue::Timestamp(ts.naive_utc())),
            },
            ColumnKind::Null => None,
            // UUID and the other exotic types surface as text when the driver
            // can render them, Null otherwise
            _ => match row.try_get::<Option<String>, _>(idx) {
                Ok(text) => text.map(SqlValue::String),
                Err(_) => row
                    .try_get::<Option<uuid::Uuid>, _>(idx)
                    .ok()
                    .flatten()
                    .map(|u| SqlValue::String(u.to_string())),
            },
        };

        Ok(value.unwrap_or(SqlValue::Null))
    }

    fn materialize_row(columns: &[ColumnMeta], row: &PgRow) -> Result<Vec<Value>> {
        columns
            .iter()
            .enumerate()
            .map(|(idx, meta)| {
                let kind = meta.kind();
                let cell = Self::decode_cell(row, idx, kind)?;
                Ok(Value::new(cell, kind, idx + 1))
            })
            .collect()
    }
}

#[async_trait]
impl DatabaseAdapter for PostgresAdapter {
    fn name(&self) -> &str {
        &self.name
    }

    fn backend(&self) -> DatabaseBackend {
        DatabaseBackend::Postgres
    }

    async fn fetch_rows(&self, sql: &str) -> Result<RowSet> {
        log::debug!("PostgreSQL fetch: {}", sql);

        let rows = sqlx::query(sql).fetch_all(&*self.pool).await?;

        let columns = match rows.first() {
            Some(row) => Self::result_columns(row),
            None => Vec::new(),
        };

        let mut materialized = Vec::with_capacity(rows.len());
        for row in &rows {
            materialized.push(Self::materialize_row(&columns, row)?);
        }

        Ok(RowSet {
            columns,
            rows: materialized,
        })
    }

    async fn execute(&self, sql: &str) -> Result<u64> {
        log::debug!("PostgreSQL execute: {}", sql);

        let result = sqlx::query(sql).execute(&*self.pool).await?;
        Ok(result.rows_affected())
    }

    async fn table_columns(&self, schema: Option<&str>, table: &str) -> Result<Vec<ColumnMeta>> {
        let sql = match schema {
            Some(_) => {
                "SELECT column_name, data_type, is_nullable \
                 FROM information_schema.columns \
                 WHERE lower(table_name) = lower($1) AND lower(table_schema) = lower($2) \
                 ORDER BY ordinal_position"
            }
            None => {
                "SELECT column_name, data_type, is_nullable \
                 FROM information_schema.columns \
                 WHERE lower(table_name) = lower($1) \
                 ORDER BY ordinal_position"
            }
        };

        let mut query = sqlx::query(sql).bind(table);
        if let Some(schema) = schema {
            query = query.bind(schema);
        }
        let rows = query.fetch_all(&*self.pool).await?;

        rows.iter()
            .map(|row| {
                let name: String = row.try_get(0)?;
                let data_type: String = row.try_get(1)?;
                let is_nullable: String = row.try_get(2)?;
                Ok(ColumnMeta {
                    name,
                    table: table.to_string(),
                    type_code: Self::catalog_type_code(&data_type),
                    nullable: is_nullable == "YES",
                })
            })
            .collect()
    }

    async fn primary_key_columns(
        &self,
        schema: Option<&str>,
        table: &str,
    ) -> Result<Vec<PrimaryKeyMeta>> {
        let sql = match schema {
            Some(_) => {
                "SELECT kcu.column_name, kcu.ordinal_position \
                 FROM information_schema.table_constraints tc \
                 JOIN information_schema.key_column_usage kcu \
                   ON tc.constraint_name = kcu.constraint_name \
                  AND tc.table_schema = kcu.table_schema \
                 WHERE tc.constraint_type = 'PRIMARY KEY' \
                   AND lower(tc.table_name) = lower($1) \
                   AND lower(tc.table_schema) = lower($2) \
                 ORDER BY kcu.ordinal_position"
            }
            None => {
                "SELECT kcu.column_name, kcu.ordinal_position \
                 FROM information_schema.table_constraints tc \
                 JOIN information_schema.key_column_usage kcu \
                   ON tc.constraint_name = kcu.constraint_name \
                  AND tc.table_schema = kcu.table_schema \
                 WHERE tc.constraint_type = 'PRIMARY KEY' \
                   AND lower(tc.table_name) = lower($1) \
                 ORDER BY kcu.ordinal_position"
            }
        };

        let mut query = sqlx::query(sql).bind(table);
        if let Some(schema) = schema {
            query = query.bind(schema);
        }
        let rows = query.fetch_all(&*self.pool).await?;

        rows.iter()
            .map(|row| {
                let column: String = row.try_get(0)?;
                let ordinal: i32 = row.try_get(1)?;
                Ok(PrimaryKeyMeta {
                    column,
                    ordinal: ordinal as u32,
                })
            })
            .collect()
    }

    async fn list_tables(&self, kind: TableKind) -> Result<Vec<TableMeta>> {
        let table_type = match kind {
            TableKind::Tables => "BASE TABLE",
            TableKind::Views => "VIEW",
        };

        let rows = sqlx::query(
            "SELECT table_schema, table_name \
             FROM information_schema.tables \
             WHERE table_type = $1 \
               AND table_schema NOT IN ('pg_catalog', 'information_schema') \
             ORDER BY table_schema, table_name",
        )
        .bind(table_type)
        .fetch_all(&*self.pool)
        .await?;

        rows.iter()
            .map(|row| {
                let schema: String = row.try_get(0)?;
                let name: String = row.try_get(1)?;
                Ok(TableMeta {
                    schema: Some(schema),
                    name,
                })
            })
            .collect()
    }

    async fn list_schemas(&self) -> Result<Vec<String>> {
        let rows = sqlx::query(
            "SELECT schema_name \
             FROM information_schema.schemata \
             WHERE schema_name NOT IN ('pg_catalog', 'information_schema') \
             ORDER BY schema_name",
        )
        .fetch_all(&*self.pool)
        .await?;

        rows.iter()
            .map(|row| Ok(row.try_get::<String, _>(0)?))
            .collect()
    }

    async fn ping(&self) -> Result<bool> {
        sqlx::query("SELECT 1").fetch_one(&*self.pool).await?;
        Ok(true)
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}
