//! MySQL database adapter implementation

use crate::builder::dialects::DatabaseBackend;
use crate::database::types::{codes, ColumnKind, SqlValue, Value};
use crate::database::{
    ColumnMeta, DatabaseAdapter, PrimaryKeyMeta, RowSet, TableKind, TableMeta,
};
use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use rust_decimal::Decimal;
use sqlx::mysql::{MySqlPool, MySqlRow};
use sqlx::{Column, Row, TypeInfo};
use std::sync::Arc;

/// MySQL database adapter
pub struct MySqlAdapter {
    name: String,
    pool: Arc<MySqlPool>,
}

impl MySqlAdapter {
    /// Create a new MySQL adapter
    pub async fn new(name: impl Into<String>, connection_url: &str) -> Result<Self> {
        let pool = MySqlPool::connect(connection_url).await?;

        Ok(Self {
            name: name.into(),
            pool: Arc::new(pool),
        })
    }

    /// Create adapter from existing pool
    pub fn from_pool(name: impl Into<String>, pool: MySqlPool) -> Self {
        Self {
            name: name.into(),
            pool: Arc::new(pool),
        }
    }

    /// Get reference to the underlying pool
    pub fn pool(&self) -> &MySqlPool {
        &self.pool
    }

    /// Type code for a result-set column, keyed on the wire type name.
    ///
    /// Unsigned integer columns promote to the next wider signed code so
    /// their full range survives the typed value model; `BIGINT UNSIGNED`
    /// lands on the decimal code.
    fn type_code_of(type_name: &str) -> i32 {
        match type_name {
            "BOOLEAN" => codes::BOOLEAN,
            "BIT" => codes::BIT,
            "TINYINT" => codes::TINYINT,
            "TINYINT UNSIGNED" | "SMALLINT" | "YEAR" => codes::SMALLINT,
            "SMALLINT UNSIGNED" | "MEDIUMINT" | "MEDIUMINT UNSIGNED" | "INT" => codes::INTEGER,
            "INT UNSIGNED" | "BIGINT" => codes::BIGINT,
            "BIGINT UNSIGNED" => codes::NUMERIC,
            "FLOAT" => codes::REAL,
            "DOUBLE" => codes::DOUBLE,
            "DECIMAL" => codes::DECIMAL,
            "CHAR" => codes::CHAR,
            "VARCHAR" | "ENUM" | "SET" => codes::VARCHAR,
            "TINYTEXT" | "TEXT" | "MEDIUMTEXT" | "LONGTEXT" => codes::LONGVARCHAR,
            "BINARY" => codes::BINARY,
            "VARBINARY" => codes::VARBINARY,
            "TINYBLOB" | "BLOB" | "MEDIUMBLOB" | "LONGBLOB" => codes::BLOB,
            "DATE" => codes::DATE,
            "TIME" => codes::TIME,
            "DATETIME" | "TIMESTAMP" => codes::TIMESTAMP,
            _ => codes::OTHER,
        }
    }

    /// Type code for a catalog column, keyed on `information_schema` names
    fn catalog_type_code(data_type: &str) -> i32 {
        match data_type {
            "bit" => codes::BIT,
            "tinyint" => codes::TINYINT,
            "smallint" | "year" => codes::SMALLINT,
            "mediumint" | "int" => codes::INTEGER,
            "bigint" => codes::BIGINT,
            "float" => codes::REAL,
            "double" => codes::DOUBLE,
            "decimal" => codes::DECIMAL,
            "char" => codes::CHAR,
            "varchar" | "enum" | "set" => codes::VARCHAR,
            "tinytext" | "text" | "mediumtext" | "longtext" => codes::LONGVARCHAR,
            "binary" => codes::BINARY,
            "varbinary" => codes::VARBINARY,
            "tinyblob" | "blob" | "mediumblob" | "longblob" => codes::BLOB,
            "date" => codes::DATE,
            "time" => codes::TIME,
            "datetime" | "timestamp" => codes::TIMESTAMP,
            _ => codes::OTHER,
        }
    }

    /// Column descriptions for a materialized result row
    fn result_columns(row: &MySqlRow) -> Vec<ColumnMeta> {
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
    /// Arms carry a second decode attempt where the unsigned promotion in
    /// [`Self::type_code_of`] can pair a signed kind with an unsigned wire
    /// type. `DATETIME` and `TIMESTAMP` share a kind; the zoned variant is
    /// normalized to its UTC wall-clock reading.
    fn decode_cell(row: &MySqlRow, idx: usize, kind: ColumnKind) -> Result<SqlValue> {
        let value = match kind {
            ColumnKind::Boolean => match row.try_get::<Option<bool>, _>(idx) {
                Ok(flag) => flag.map(SqlValue::Bool),
                Err(_) => row
                    .try_get::<Option<u64>, _>(idx)?
                    .map(|bits| SqlValue::Bool(bits != 0)),
            },
            ColumnKind::TinyInt => row.try_get::<Option<i8>, _>(idx)?.map(SqlValue::TinyInt),
            ColumnKind::SmallInt => match row.try_get::<Option<i16>, _>(idx) {
                Ok(n) => n.map(SqlValue::SmallInt),
                Err(_) => row
                    .try_get::<Option<u8>, _>(idx)?
                    .map(|n| SqlValue::SmallInt(i16::from(n))),
            },
            ColumnKind::Int => match row.try_get::<Option<i32>, _>(idx) {
                Ok(n) => n.map(SqlValue::Int),
                Err(_) => row
                    .try_get::<Option<u16>, _>(idx)?
                    .map(|n| SqlValue::Int(i32::from(n))),
            },
            ColumnKind::BigInt => match row.try_get::<Option<i64>, _>(idx) {
                Ok(n) => n.map(SqlValue::BigInt),
                Err(_) => row
                    .try_get::<Option<u32>, _>(idx)?
                    .map(|n| SqlValue::BigInt(i64::from(n))),
            },
            ColumnKind::Real => row.try_get::<Option<f32>, _>(idx)?.map(SqlValue::Real),
            ColumnKind::Float | ColumnKind::Double => {
                row.try_get::<Option<f64>, _>(idx)?.map(SqlValue::Double)
            }
            ColumnKind::Decimal => match row.try_get::<Option<Decimal>, _>(idx) {
                Ok(n) => n.map(SqlValue::Decimal),
                Err(_) => row
                    .try_get::<Option<u64>, _>(idx)?
                    .map(|n| SqlValue::Decimal(Decimal::from(n))),
            },
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
            // JSON and the other exotic types surface as text when the
            // driver can render them, Null otherwise
            _ => row
                .try_get::<Option<String>, _>(idx)
                .ok()
                .flatten()
                .map(SqlValue::String),
        };

        Ok(value.unwrap_or(SqlValue::Null))
    }

    fn materialize_row(columns: &[ColumnMeta], row: &MySqlRow) -> Result<Vec<Value>> {
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
impl DatabaseAdapter for MySqlAdapter {
    fn name(&self) -> &str {
        &self.name
    }

    fn backend(&self) -> DatabaseBackend {
        DatabaseBackend::MySQL
    }

    async fn fetch_rows(&self, sql: &str) -> Result<RowSet> {
        log::debug!("MySQL fetch: {}", sql);

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
        log::debug!("MySQL execute: {}", sql);

        let result = sqlx::query(sql).execute(&*self.pool).await?;
        Ok(result.rows_affected())
    }

    async fn table_columns(&self, schema: Option<&str>, table: &str) -> Result<Vec<ColumnMeta>> {
        let sql = match schema {
            Some(_) => {
                "SELECT column_name, data_type, is_nullable \
                 FROM information_schema.columns \
                 WHERE lower(table_name) = lower(?) AND lower(table_schema) = lower(?) \
                 ORDER BY ordinal_position"
            }
            None => {
                "SELECT column_name, data_type, is_nullable \
                 FROM information_schema.columns \
                 WHERE lower(table_name) = lower(?) AND table_schema = DATABASE() \
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
                "SELECT column_name, ordinal_position \
                 FROM information_schema.key_column_usage \
                 WHERE constraint_name = 'PRIMARY' \
                   AND lower(table_name) = lower(?) \
                   AND lower(table_schema) = lower(?) \
                 ORDER BY ordinal_position"
            }
            None => {
                "SELECT column_name, ordinal_position \
                 FROM information_schema.key_column_usage \
                 WHERE constraint_name = 'PRIMARY' \
                   AND lower(table_name) = lower(?) \
                   AND table_schema = DATABASE() \
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
                let column: String = row.try_get(0)?;
                let ordinal: u64 = row.try_get(1)?;
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
             WHERE table_type = ? AND table_schema = DATABASE() \
             ORDER BY table_name",
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
             WHERE schema_name NOT IN \
               ('mysql', 'information_schema', 'performance_schema', 'sys') \
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
