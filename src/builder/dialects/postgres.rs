//! PostgreSQL dialect, also the default for unrecognized databases
//!
//! Case-insensitive LIKE uses the native ILIKE operator instead of folding
//! both sides. Constraint-violation SQLSTATEs are classified into readable
//! messages so callers can show them instead of re-raising.

use super::{escape_str, wrap_like_pattern, DatabaseBackend, Dialect};
use once_cell::sync::Lazy;
use regex::Regex;

/// SQLSTATE for unique constraint violations
pub const ERROR_STATE_DUPLICATE_KEY: &str = "23505";
/// SQLSTATE for foreign key constraint violations
pub const ERROR_STATE_FOREIGN_KEY: &str = "23503";

/// Extracts the `(fields)=(values)` pair Postgres appends to constraint
/// violation messages
static SQL_ERR_PARAMS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r" \((.+)\)=\((.+)\)").expect("PostgresDialect: invalid constraint message regex")
});

pub struct PostgresDialect;

impl PostgresDialect {
    pub fn new() -> Self {
        Self
    }
}

impl Default for PostgresDialect {
    fn default() -> Self {
        Self::new()
    }
}

impl Dialect for PostgresDialect {
    fn backend(&self) -> DatabaseBackend {
        DatabaseBackend::Postgres
    }

    fn case_fold(&self, expr: &str) -> String {
        format!("UPPER({})", expr)
    }

    fn like_clause(&self, field: &str, value: &str, negated: bool, ignore_case: bool) -> String {
        let pattern = escape_str(&wrap_like_pattern(value));
        let field = field.trim().to_uppercase();
        let op = match (negated, ignore_case) {
            (false, true) => "ILIKE",
            (true, true) => "NOT ILIKE",
            (false, false) => "LIKE",
            (true, false) => "NOT LIKE",
        };
        format!("({} {} '{}')", field, op, pattern)
    }

    fn paginate(&self, sql: &str, offset: u64, limit: u64) -> String {
        format!("{} LIMIT {} OFFSET {}", sql, limit, offset)
    }

    fn one_row_probe(&self, sql: &str) -> String {
        format!("{} LIMIT 1", sql)
    }

    fn count_query(&self, sql: &str) -> String {
        format!("SELECT COUNT(*) FROM ({}) AS FOO", sql)
    }

    fn wrap_for_filter(&self, sql: &str) -> String {
        format!("SELECT * FROM ({}) AS FOO", sql)
    }

    fn as_view(&self, sql: &str, alias: &str) -> String {
        format!("({}) AS {}", sql, alias)
    }

    fn sequence_query(&self, sequence: &str) -> crate::error::Result<String> {
        Ok(format!("SELECT nextval('{}'::regclass)", sequence))
    }

    fn transaction_id_query(&self) -> Option<&'static str> {
        Some("SELECT txid_current()")
    }

    fn foreign_keys_statement(&self, table: &str, enable: bool) -> Option<String> {
        let verb = if enable { "ENABLE" } else { "DISABLE" };
        Some(format!("ALTER TABLE {} {} TRIGGER ALL", table, verb))
    }

    fn nonfatal_message(&self, state: &str, message: &str) -> Option<String> {
        match state {
            ERROR_STATE_DUPLICATE_KEY => Some(match SQL_ERR_PARAMS.captures(message) {
                Some(caps) => format!(
                    "a record with {} = {} already exists",
                    &caps[1], &caps[2]
                ),
                None => "duplicate key value".to_string(),
            }),
            ERROR_STATE_FOREIGN_KEY => Some(match SQL_ERR_PARAMS.captures(message) {
                Some(caps) => format!(
                    "operation blocked by a reference on {} = {}",
                    &caps[1], &caps[2]
                ),
                None => "foreign key violation".to_string(),
            }),
            _ => None,
        }
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}
