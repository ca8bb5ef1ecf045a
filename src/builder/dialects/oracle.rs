//! Oracle dialect
//!
//! Schema visibility is registered per dialect instance. Oracle reports every
//! schema in the instance, so only registered schemas take part in scans, and
//! only registered public schemas skip name qualification. Table aliases are
//! emitted without `AS` everywhere, which Oracle rejects.

use super::{escape_str, render_literal, DatabaseBackend, Dialect};
use crate::database::types::{ColumnKind, SqlValue};
use crate::error::{Error, Result};
use crate::filter::Granularity;
use std::sync::RwLock;

pub struct OracleDialect {
    used_schemas: RwLock<Vec<String>>,
    public_schemas: RwLock<Vec<String>>,
}

impl OracleDialect {
    pub fn new() -> Self {
        Self {
            used_schemas: RwLock::new(Vec::new()),
            public_schemas: RwLock::new(Vec::new()),
        }
    }

    /// Make a schema visible to table scans and listings
    pub fn register_schema(&self, schema: impl Into<String>) {
        let schema = schema.into();
        if let Ok(mut used) = self.used_schemas.write() {
            if !used.iter().any(|s| s.eq_ignore_ascii_case(&schema)) {
                used.push(schema);
            }
        }
    }

    /// Register a schema whose tables need no qualification. Public schemas
    /// are visible too.
    pub fn register_public_schema(&self, schema: impl Into<String>) {
        let schema = schema.into();
        self.register_schema(schema.clone());
        if let Ok(mut public) = self.public_schemas.write() {
            if !public.iter().any(|s| s.eq_ignore_ascii_case(&schema)) {
                public.push(schema);
            }
        }
    }

    pub fn registered_schemas(&self) -> Vec<String> {
        self.used_schemas
            .read()
            .map(|s| s.clone())
            .unwrap_or_default()
    }

    /// Replace registered names with the exact casing the database reports.
    /// Call with the schema list from the metadata seam.
    pub fn normalize_schemas(&self, reported: &[String]) {
        let fix = |list: &RwLock<Vec<String>>| {
            if let Ok(mut names) = list.write() {
                for name in names.iter_mut() {
                    if let Some(actual) = reported.iter().find(|r| r.eq_ignore_ascii_case(name)) {
                        *name = actual.clone();
                    }
                }
            }
        };
        fix(&self.used_schemas);
        fix(&self.public_schemas);
    }

    fn temporal_literal(
        &self,
        kind: ColumnKind,
        granularity: Granularity,
        value: &SqlValue,
    ) -> Result<String> {
        // Pre-formatted strings slot into the conversion chosen by kind
        let passthrough = match value {
            SqlValue::String(s) => Some(escape_str(s)),
            _ => None,
        };
        if kind == ColumnKind::Date || granularity == Granularity::DateOnly {
            let text = match passthrough {
                Some(s) => s,
                None => value
                    .as_date()?
                    .ok_or_else(|| Error::conversion("NULL", "Date"))?
                    .format("%Y-%m-%d")
                    .to_string(),
            };
            return Ok(format!("TO_DATE('{}', 'YYYY-MM-DD')", text));
        }
        if kind == ColumnKind::Time || granularity == Granularity::HourOnly {
            let text = match passthrough {
                Some(s) => s,
                None => value
                    .as_time()?
                    .ok_or_else(|| Error::conversion("NULL", "Time"))?
                    .format("%H:%M:%S")
                    .to_string(),
            };
            return Ok(format!("TRUNC(TO_DATE('{}', 'HH24:MI:SS'), 'HH')", text));
        }
        let ts = match passthrough {
            Some(s) => s,
            None => {
                let ts = value
                    .as_timestamp()?
                    .ok_or_else(|| Error::conversion("NULL", "Timestamp"))?;
                match granularity {
                    Granularity::MinuteOnly => ts.format("%Y-%m-%d %H:%M").to_string(),
                    _ => ts.format("%Y-%m-%d %H:%M:%S").to_string(),
                }
            }
        };
        match granularity {
            Granularity::MinuteOnly => Ok(format!("TO_DATE('{}', 'YYYY-MM-DD HH24:MI')", ts)),
            _ => Ok(format!("TO_DATE('{}', 'YYYY-MM-DD HH24:MI:SS')", ts)),
        }
    }
}

impl Default for OracleDialect {
    fn default() -> Self {
        Self::new()
    }
}

impl Dialect for OracleDialect {
    fn backend(&self) -> DatabaseBackend {
        DatabaseBackend::Oracle
    }

    fn case_fold(&self, expr: &str) -> String {
        format!("UPPER({})", expr)
    }

    fn adjust_field(
        &self,
        kind: ColumnKind,
        granularity: Granularity,
        field: &str,
        ignore_case: bool,
    ) -> String {
        let field = field.trim().to_uppercase();
        if kind.is_character() && ignore_case {
            return self.case_fold(&field);
        }
        if kind.is_temporal() {
            match granularity {
                Granularity::DateOnly => return format!("trunc({},'DD')", field),
                Granularity::HourOnly => return format!("trunc({},'HH')", field),
                Granularity::MinuteOnly => return format!("trunc({},'MI')", field),
                Granularity::Full => {}
            }
        }
        field
    }

    fn adjust_value(
        &self,
        kind: ColumnKind,
        granularity: Granularity,
        value: &SqlValue,
        ignore_case: bool,
    ) -> Result<String> {
        if value.is_null() {
            return Ok("NULL".to_string());
        }
        if kind.is_temporal() {
            return self.temporal_literal(kind, granularity, value);
        }
        render_literal(kind, granularity, value, ignore_case)
    }

    fn like_clause(&self, field: &str, value: &str, negated: bool, ignore_case: bool) -> String {
        // Value prefixes switch a LIKE into a regular-expression match
        if let Some(pattern) = value.strip_prefix("re:") {
            if let Ok(clause) = self.regex_clause(field, pattern, false) {
                return clause;
            }
        }
        if let Some(pattern) = value.strip_prefix("ri:") {
            if let Ok(clause) = self.regex_clause(field, pattern, true) {
                return clause;
            }
        }
        let pattern = escape_str(&super::wrap_like_pattern(value));
        let field = field.trim().to_uppercase();
        let op = if negated { "NOT LIKE" } else { "LIKE" };
        if ignore_case {
            format!(
                "({} {} '{}')",
                self.case_fold(&field),
                op,
                pattern.to_uppercase()
            )
        } else {
            format!("({} {} '{}')", field, op, pattern)
        }
    }

    fn regex_clause(&self, field: &str, pattern: &str, ignore_case: bool) -> Result<String> {
        let flag = if ignore_case { "i" } else { "c" };
        Ok(format!(
            "(regexp_like({}, '{}', '{}'))",
            field.trim().to_uppercase(),
            escape_str(pattern),
            flag
        ))
    }

    fn paginate(&self, sql: &str, offset: u64, limit: u64) -> String {
        let r1 = offset;
        let r2 = offset + limit;
        format!(
            "select * from\n (select paged_query.*, rownum rnum\n    from\n ( {} ) paged_query\n  where rownum <= {} )\n  where rnum >= {}",
            sql, r2, r1
        )
    }

    fn one_row_probe(&self, sql: &str) -> String {
        format!("SELECT * FROM ({}) WHERE ROWNUM <= 1", sql)
    }

    fn count_query(&self, sql: &str) -> String {
        format!("SELECT COUNT(*) FROM ({}) FOO", sql)
    }

    fn wrap_for_filter(&self, sql: &str) -> String {
        format!("SELECT * FROM ({}) FOO", sql)
    }

    fn as_view(&self, sql: &str, alias: &str) -> String {
        format!("({}) {}", sql, alias)
    }

    fn transaction_id_query(&self) -> Option<&'static str> {
        Some("SELECT RAWTOHEX(tx.xid)\nFROM v$transaction tx\nJOIN v$session s ON tx.ses_addr = s.saddr")
    }

    fn foreign_keys_statement(&self, table: &str, enable: bool) -> Option<String> {
        let verb = if enable { "ENABLE" } else { "DISABLE" };
        Some(format!("ALTER TABLE {} {} ALL TRIGGERS", table, verb))
    }

    fn is_schema_public(&self, schema: Option<&str>) -> bool {
        match schema {
            None => false,
            Some(s) => self
                .public_schemas
                .read()
                .map(|names| names.iter().any(|n| n.eq_ignore_ascii_case(s)))
                .unwrap_or(false),
        }
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}
