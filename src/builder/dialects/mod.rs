//! Database dialect implementations for the query builder
//!
//! One trait covers everything that varies between databases: field and value
//! adjustment, pagination, sub-select aliasing, and the handful of
//! administrative statements. The builder core stays dialect-free and holds a
//! boxed [`Dialect`].

use crate::database::types::{ColumnKind, SqlValue};
use crate::error::{Error, Result};
use crate::filter::Granularity;

/// Database backend types with a shipped dialect
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatabaseBackend {
    Postgres,
    MySQL,
    Oracle,
    Mssql,
    Derby,
}

/// Everything the query builder delegates to the target database
pub trait Dialect: Send + Sync {
    fn backend(&self) -> DatabaseBackend;

    /// Comparison-side rendering of a field: trimmed, upper-cased, case-folded
    /// for character kinds when requested, truncated for temporal kinds when a
    /// granularity applies
    fn adjust_field(
        &self,
        kind: ColumnKind,
        granularity: Granularity,
        field: &str,
        ignore_case: bool,
    ) -> String {
        let field = field.trim().to_uppercase();
        if kind.is_character() && ignore_case && self.folds_case() {
            self.case_fold(&field)
        } else {
            field
        }
    }

    /// Literal rendering of a comparison or assignment value
    fn adjust_value(
        &self,
        kind: ColumnKind,
        granularity: Granularity,
        value: &SqlValue,
        ignore_case: bool,
    ) -> Result<String> {
        render_literal(kind, granularity, value, ignore_case && self.folds_case())
    }

    /// Case-folding expression for character comparisons
    fn case_fold(&self, expr: &str) -> String;

    /// False when the database collation already compares case-insensitively
    fn folds_case(&self) -> bool {
        true
    }

    /// A LIKE comparison; the value gains `%` wildcards unless it already
    /// carries some
    fn like_clause(&self, field: &str, value: &str, negated: bool, ignore_case: bool) -> String {
        let op = if negated { "NOT LIKE" } else { "LIKE" };
        let pattern = wrap_like_pattern(value);
        let field = field.trim().to_uppercase();
        if ignore_case && self.folds_case() {
            format!(
                "({} {} '{}')",
                self.case_fold(&field),
                op,
                escape_str(&pattern.to_uppercase())
            )
        } else {
            format!("({} {} '{}')", field, op, escape_str(&pattern))
        }
    }

    /// Regular-expression comparison; an error on databases without one
    fn regex_clause(&self, _field: &str, _pattern: &str, _ignore_case: bool) -> Result<String> {
        Err(Error::unsupported(format!(
            "regular expression match on {:?}",
            self.backend()
        )))
    }

    /// Apply native pagination to a finished query
    fn paginate(&self, sql: &str, offset: u64, limit: u64) -> String;

    /// Reduce a query to a one-row existence probe
    fn one_row_probe(&self, sql: &str) -> String;

    /// COUNT(*) wrapper around a finished query
    fn count_query(&self, sql: &str) -> String;

    /// `SELECT * FROM (inner)` wrapper the run-time filter attaches to
    fn wrap_for_filter(&self, sql: &str) -> String;

    /// Embed a query as a named table expression
    fn as_view(&self, sql: &str, alias: &str) -> String;

    /// Query advancing a database sequence, where sequences exist
    fn sequence_query(&self, sequence: &str) -> Result<String> {
        let _ = sequence;
        Err(Error::unsupported(format!(
            "sequences on {:?}",
            self.backend()
        )))
    }

    /// Probe returning the identifier of the current transaction
    fn transaction_id_query(&self) -> Option<&'static str> {
        None
    }

    /// Statement toggling foreign-key enforcement for one table
    fn foreign_keys_statement(&self, table: &str, enable: bool) -> Option<String> {
        let _ = (table, enable);
        None
    }

    /// Whether a schema name needs no qualification
    fn is_schema_public(&self, schema: Option<&str>) -> bool {
        match schema {
            None => true,
            Some(s) => s.eq_ignore_ascii_case("public") || s.eq_ignore_ascii_case("dbo"),
        }
    }

    /// Readable message for constraint violations worth reporting to users;
    /// `None` means the error is fatal and should be re-raised
    fn nonfatal_message(&self, state: &str, message: &str) -> Option<String> {
        let _ = (state, message);
        None
    }

    fn as_any(&self) -> &dyn std::any::Any;
}

pub mod derby;
pub mod mssql;
pub mod mysql;
pub mod oracle;
pub mod postgres;

pub use derby::DerbyDialect;
pub use mssql::MssqlDialect;
pub use mysql::MySQLDialect;
pub use oracle::OracleDialect;
pub use postgres::PostgresDialect;

/// Factory function to create the dialect for a database backend
pub fn create_dialect(backend: DatabaseBackend) -> Box<dyn Dialect> {
    match backend {
        DatabaseBackend::Postgres => Box::new(PostgresDialect::new()),
        DatabaseBackend::MySQL => Box::new(MySQLDialect::new()),
        DatabaseBackend::Oracle => Box::new(OracleDialect::new()),
        DatabaseBackend::Mssql => Box::new(MssqlDialect::new()),
        DatabaseBackend::Derby => Box::new(DerbyDialect::new()),
    }
}

/// Double embedded single quotes
pub(crate) fn escape_str(s: &str) -> String {
    s.replace('\'', "''")
}

/// Contains-search unless the caller already placed wildcards
pub(crate) fn wrap_like_pattern(value: &str) -> String {
    if value.contains('%') {
        value.to_string()
    } else {
        format!("%{}%", value)
    }
}

/// ISO literal text for a temporal value under a truncation granularity
pub(crate) fn temporal_text(
    kind: ColumnKind,
    granularity: Granularity,
    value: &SqlValue,
) -> Result<String> {
    // Pre-formatted strings pass through untouched
    if let SqlValue::String(s) = value {
        return Ok(s.clone());
    }
    match kind {
        ColumnKind::Date => {
            let d = value
                .as_date()?
                .ok_or_else(|| Error::conversion("NULL", "Date"))?;
            Ok(d.format("%Y-%m-%d").to_string())
        }
        ColumnKind::Time => {
            let t = value
                .as_time()?
                .ok_or_else(|| Error::conversion("NULL", "Time"))?;
            match granularity {
                Granularity::HourOnly => Ok(t.format("%H:00:00").to_string()),
                _ => Ok(t.format("%H:%M:%S").to_string()),
            }
        }
        _ => {
            let ts = value
                .as_timestamp()?
                .ok_or_else(|| Error::conversion("NULL", "Timestamp"))?;
            match granularity {
                Granularity::DateOnly => Ok(ts.format("%Y-%m-%d").to_string()),
                Granularity::HourOnly => Ok(ts.format("%Y-%m-%d %H:00:00").to_string()),
                Granularity::MinuteOnly => Ok(ts.format("%Y-%m-%d %H:%M").to_string()),
                Granularity::Full => Ok(ts.format("%Y-%m-%d %H:%M:%S").to_string()),
            }
        }
    }
}

/// Literal rendering shared by every dialect except Oracle's temporal forms:
/// numerics plain, booleans as `'t'`/`'f'`, strings quoted with doubled
/// quotes, temporals as quoted ISO text
pub(crate) fn render_literal(
    kind: ColumnKind,
    granularity: Granularity,
    value: &SqlValue,
    fold_case: bool,
) -> Result<String> {
    if value.is_null() {
        return Ok("NULL".to_string());
    }
    if kind.is_boolean() {
        return Ok(if value.as_bool() { "'t'" } else { "'f'" }.to_string());
    }
    if kind.is_temporal() {
        return Ok(format!("'{}'", temporal_text(kind, granularity, value)?));
    }
    if kind.is_binary() {
        return Err(Error::unsupported("binary literal in generated sql"));
    }
    if kind.is_character() || matches!(value, SqlValue::String(_)) {
        let s = value
            .as_string()?
            .ok_or_else(|| Error::conversion("NULL", "String"))?;
        let s = if fold_case { s.to_uppercase() } else { s };
        return Ok(format!("'{}'", escape_str(&s)));
    }
    // Plain numeric rendering
    value
        .as_string()?
        .ok_or_else(|| Error::conversion("NULL", "String"))
}
