//! SQL Server dialect
//!
//! Comparisons run against case-insensitive collations, so no case folding is
//! applied to fields or literals. Table aliases are emitted without `AS`.

use super::{DatabaseBackend, Dialect};
use crate::error::Result;

#[derive(Default)]
pub struct MssqlDialect;

impl MssqlDialect {
    pub fn new() -> Self {
        Self
    }
}

impl Dialect for MssqlDialect {
    fn backend(&self) -> DatabaseBackend {
        DatabaseBackend::Mssql
    }

    fn case_fold(&self, expr: &str) -> String {
        expr.to_string()
    }

    fn folds_case(&self) -> bool {
        false
    }

    fn paginate(&self, sql: &str, offset: u64, limit: u64) -> String {
        format!(
            "{} OFFSET {} ROWS FETCH NEXT {} ROWS ONLY;",
            sql, offset, limit
        )
    }

    fn one_row_probe(&self, sql: &str) -> String {
        match sql.strip_prefix("SELECT ") {
            Some(rest) => format!("SELECT TOP 1 {}", rest),
            None => sql.to_string(),
        }
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

    fn sequence_query(&self, sequence: &str) -> Result<String> {
        Ok(format!("SELECT NEXT VALUE FOR {}", sequence))
    }

    fn transaction_id_query(&self) -> Option<&'static str> {
        Some("SELECT CONVERT(VARCHAR, CURRENT_TRANSACTION_ID())")
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::types::{ColumnKind, SqlValue};
    use crate::filter::Granularity;

    #[test]
    fn test_offset_fetch_pagination() {
        let d = MssqlDialect;
        assert_eq!(
            d.paginate("SELECT * FROM T ORDER BY ID", 20, 10),
            "SELECT * FROM T ORDER BY ID OFFSET 20 ROWS FETCH NEXT 10 ROWS ONLY;"
        );
    }

    #[test]
    fn test_top_probe() {
        let d = MssqlDialect;
        assert_eq!(
            d.one_row_probe("SELECT A, B FROM T"),
            "SELECT TOP 1 A, B FROM T"
        );
        // Anything not starting with SELECT passes through untouched
        assert_eq!(d.one_row_probe("WITH X AS (SELECT 1) SELECT * FROM X"),
            "WITH X AS (SELECT 1) SELECT * FROM X");
    }

    #[test]
    fn test_no_case_folding() {
        let d = MssqlDialect;
        assert_eq!(
            d.adjust_field(ColumnKind::VarChar, Granularity::Full, " name ", true),
            "NAME"
        );
        let value = SqlValue::String("Rossi".to_string());
        assert_eq!(
            d.adjust_value(ColumnKind::VarChar, Granularity::Full, &value, true)
                .unwrap(),
            "'Rossi'"
        );
        assert_eq!(
            d.like_clause("name", "Rossi", false, true),
            "(NAME LIKE '%Rossi%')"
        );
    }

    #[test]
    fn test_sequence_and_transaction_queries() {
        let d = MssqlDialect;
        assert_eq!(
            d.sequence_query("seq_orders").unwrap(),
            "SELECT NEXT VALUE FOR seq_orders"
        );
        assert_eq!(
            d.transaction_id_query().unwrap(),
            "SELECT CONVERT(VARCHAR, CURRENT_TRANSACTION_ID())"
        );
    }

    #[test]
    fn test_wrappers_have_no_as() {
        let d = MssqlDialect;
        assert_eq!(
            d.count_query("SELECT * FROM T"),
            "SELECT COUNT(*) FROM (SELECT * FROM T) FOO"
        );
        assert_eq!(d.as_view("SELECT 1", "v"), "(SELECT 1) v");
    }

    #[test]
    fn test_dbo_schema_is_public() {
        let d = MssqlDialect;
        assert!(d.is_schema_public(Some("dbo")));
        assert!(d.is_schema_public(Some("DBO")));
        assert!(d.is_schema_public(None));
        assert!(!d.is_schema_public(Some("sales")));
    }
}
