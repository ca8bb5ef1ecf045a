//! Apache Derby dialect
//!
//! Pagination wraps the query in a ROW_NUMBER() window because Derby has no
//! native OFFSET clause in the versions this targets. The one-row probe is
//! the same wrap limited to the first row.

use super::{DatabaseBackend, Dialect};
use crate::error::Result;

#[derive(Default)]
pub struct DerbyDialect;

impl DerbyDialect {
    pub fn new() -> Self {
        Self
    }
}

impl Dialect for DerbyDialect {
    fn backend(&self) -> DatabaseBackend {
        DatabaseBackend::Derby
    }

    fn case_fold(&self, expr: &str) -> String {
        format!("UCASE({})", expr)
    }

    fn paginate(&self, sql: &str, offset: u64, limit: u64) -> String {
        let r1 = offset;
        let r2 = offset + limit;
        format!(
            "SELECT * FROM ( \n    SELECT ROW_NUMBER() OVER() AS rownum, query.* \n    FROM ({}) AS query \n) as TMP\nWHERE (rownum >= {}) AND (rownum <= {})",
            sql, r1, r2
        )
    }

    fn one_row_probe(&self, sql: &str) -> String {
        self.paginate(sql, 0, 1)
    }

    fn count_query(&self, sql: &str) -> String {
        format!("SELECT COUNT(*) FROM ({}) FOO", sql)
    }

    fn wrap_for_filter(&self, sql: &str) -> String {
        format!("SELECT * FROM ({}) AS FOO", sql)
    }

    fn as_view(&self, sql: &str, alias: &str) -> String {
        format!("({}) AS {}", sql, alias)
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}
