//! MySQL and MariaDB dialect

use super::{DatabaseBackend, Dialect};

pub struct MySQLDialect;

impl MySQLDialect {
    pub fn new() -> Self {
        Self
    }
}

impl Default for MySQLDialect {
    fn default() -> Self {
        Self::new()
    }
}

impl Dialect for MySQLDialect {
    fn backend(&self) -> DatabaseBackend {
        DatabaseBackend::MySQL
    }

    fn case_fold(&self, expr: &str) -> String {
        format!("UCASE({})", expr)
    }

    fn paginate(&self, sql: &str, offset: u64, limit: u64) -> String {
        format!("{} LIMIT {} OFFSET {}", sql, limit, offset)
    }

    fn one_row_probe(&self, sql: &str) -> String {
        format!("{} LIMIT 1", sql)
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

    fn transaction_id_query(&self) -> Option<&'static str> {
        Some(
            "SELECT trx_id FROM information_schema.innodb_trx WHERE trx_mysql_thread_id = connection_id()",
        )
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}
