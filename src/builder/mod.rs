//! SQL statement assembly
//!
//! [`QueryBuilder`] holds the clause state of one logical query and renders
//! complete statements through a [`Dialect`]. Values are rendered as SQL
//! literals, so the same builder produces statements that can be logged,
//! cached by text, counted, paginated or probed without a bind step.
//!
//! The builder is split across this module (clause state and statement
//! assembly), [`foreign`] (linked-table lookup lists) and [`scan`] (catalog
//! metadata operations running against a live connection).

pub mod dialects;
pub mod foreign;
pub mod scan;

use crate::database::types::SqlValue;
use crate::error::{Error, Result};
use crate::filter::{Comparison, FilterData, FilterValue, Granularity};
use dialects::{create_dialect, DatabaseBackend, Dialect};

/// Row-count threshold separating scrollable lookup lists from combo lists
pub const MAX_RECORDS: u64 = 500;

/// Rewrites placeholder macros inside a finished statement.
///
/// Resolution runs after assembly and must be idempotent: statements that
/// pass through [`QueryBuilder::build_select`] are resolved once for the
/// inner query and once for the finished text.
pub trait MacroResolver: Send + Sync {
    fn resolve(&self, sql: &str) -> Result<String>;
}

/// Clause-level query builder rendering literal SQL for one backend
pub struct QueryBuilder {
    pub(crate) dialect: Box<dyn Dialect>,
    pub(crate) select: String,
    pub(crate) from: String,
    pub(crate) where_clause: String,
    pub(crate) orderby: String,
    pub(crate) groupby: String,
    pub(crate) having: String,
    pub(crate) offset: u64,
    pub(crate) limit: u64,
    pub(crate) filter: Option<FilterData>,
    pub(crate) params: Option<FilterData>,
    pub(crate) delete_from: String,
    pub(crate) ignore_case: bool,
    pub(crate) use_distinct: bool,
    pub(crate) native_pagination: bool,
    pub(crate) auto_zero: bool,
    pub(crate) none_label: String,
    pub(crate) macro_resolver: Option<Box<dyn MacroResolver>>,
}

impl QueryBuilder {
    /// Create a builder for the specified database backend
    pub fn new(backend: DatabaseBackend) -> Self {
        Self::with_dialect(create_dialect(backend))
    }

    /// Create a builder around an already configured dialect, for dialects
    /// carrying instance state such as registered Oracle schemas
    pub fn with_dialect(dialect: Box<dyn Dialect>) -> Self {
        QueryBuilder {
            dialect,
            select: "*".to_string(),
            from: String::new(),
            where_clause: String::new(),
            orderby: String::new(),
            groupby: String::new(),
            having: String::new(),
            offset: 0,
            limit: 0,
            filter: None,
            params: None,
            delete_from: String::new(),
            ignore_case: true,
            use_distinct: false,
            native_pagination: true,
            auto_zero: false,
            none_label: "None/undefined".to_string(),
            macro_resolver: None,
        }
    }

    /// Create a builder with the flags a [`BuilderConfig`] carries already
    /// applied
    ///
    /// [`BuilderConfig`]: crate::config::BuilderConfig
    pub fn configured(backend: DatabaseBackend, config: &crate::config::BuilderConfig) -> Self {
        Self::new(backend)
            .ignore_case(config.ignore_case)
            .use_distinct(config.use_distinct)
            .native_pagination(config.native_pagination)
            .auto_zero(config.auto_zero)
            .none_label(config.none_label.clone())
    }

    pub fn backend(&self) -> DatabaseBackend {
        self.dialect.backend()
    }

    pub fn dialect(&self) -> &dyn Dialect {
        self.dialect.as_ref()
    }

    /// Set the projection; defaults to `*`
    pub fn select<S: Into<String>>(mut self, select: S) -> Self {
        self.select = select.into();
        self
    }

    /// Set the FROM clause, which may carry joins and aliases verbatim
    pub fn from<S: Into<String>>(mut self, from: S) -> Self {
        self.from = from.into();
        self
    }

    /// Append to the FROM clause
    pub fn add_from<S: Into<String>>(mut self, fragment: S) -> Self {
        self.from.push_str(&fragment.into());
        self
    }

    /// Set the fixed WHERE clause, emitted verbatim
    pub fn where_raw<S: Into<String>>(mut self, clause: S) -> Self {
        self.where_clause = clause.into();
        self
    }

    /// Default sort, overridden by a run-time filter that carries its own
    pub fn orderby<S: Into<String>>(mut self, orderby: S) -> Self {
        self.orderby = orderby.into();
        self
    }

    pub fn groupby<S: Into<String>>(mut self, groupby: S) -> Self {
        self.groupby = groupby.into();
        self
    }

    pub fn having<S: Into<String>>(mut self, having: S) -> Self {
        self.having = having.into();
        self
    }

    pub fn offset(mut self, offset: u64) -> Self {
        self.offset = offset;
        self
    }

    /// Page size; zero disables pagination
    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = limit;
        self
    }

    /// Target table for INSERT/UPDATE/DELETE when the FROM clause is a join
    pub fn delete_from<S: Into<String>>(mut self, table: S) -> Self {
        self.delete_from = table.into();
        self
    }

    pub fn ignore_case(mut self, ignore_case: bool) -> Self {
        self.ignore_case = ignore_case;
        self
    }

    pub fn use_distinct(mut self, use_distinct: bool) -> Self {
        self.use_distinct = use_distinct;
        self
    }

    /// Prepend a synthetic zero entry to lookup lists that have none
    pub fn auto_zero(mut self, auto_zero: bool) -> Self {
        self.auto_zero = auto_zero;
        self
    }

    /// Display text of the synthetic zero entry
    pub fn none_label<S: Into<String>>(mut self, label: S) -> Self {
        self.none_label = label.into();
        self
    }

    /// When disabled the statement is built without OFFSET/LIMIT decoration
    /// and the caller windows the row set after fetching
    pub fn native_pagination(mut self, native: bool) -> Self {
        self.native_pagination = native;
        self
    }

    /// Attach the run-time filter compiled into a wrapping subselect
    pub fn filter(mut self, filter: FilterData) -> Self {
        self.filter = Some(filter);
        self
    }

    /// Attach fixed parameters merged into the base WHERE clause
    pub fn params(mut self, params: FilterData) -> Self {
        self.params = Some(params);
        self
    }

    pub fn macro_resolver(mut self, resolver: Box<dyn MacroResolver>) -> Self {
        self.macro_resolver = Some(resolver);
        self
    }

    pub fn has_where(&self) -> bool {
        !self.where_clause.trim().is_empty()
    }

    pub fn has_orderby(&self) -> bool {
        !self.orderby.trim().is_empty()
    }

    pub fn has_groupby(&self) -> bool {
        !self.groupby.trim().is_empty()
    }

    pub fn has_having(&self) -> bool {
        !self.having.trim().is_empty()
    }

    pub fn has_limit(&self) -> bool {
        self.limit != 0
    }

    /// True when a run-time filter with compilable content is attached
    pub fn has_filter(&self) -> bool {
        self.filter
            .as_ref()
            .map(|f| f.have_where() || f.have_orderby())
            .unwrap_or(false)
    }

    pub(crate) fn target_table(&self) -> &str {
        if self.delete_from.trim().is_empty() {
            &self.from
        } else {
            &self.delete_from
        }
    }

    fn check_from(&self) -> Result<()> {
        if self.from.trim().is_empty() {
            return Err(Error::missing_parameter("FROM clause not set"));
        }
        Ok(())
    }

    fn resolve_macros(&self, sql: String) -> Result<String> {
        match &self.macro_resolver {
            Some(resolver) => resolver.resolve(&sql),
            None => Ok(sql),
        }
    }

    /// Compile the projection fragments of a filter, `None` when it has none
    pub fn compile_select(&self, fd: &FilterData) -> Option<String> {
        let fragments: Vec<&str> = fd
            .select_clauses()
            .iter()
            .map(|s| s.as_str())
            .filter(|s| !s.trim().is_empty())
            .collect();
        if fragments.is_empty() {
            None
        } else {
            Some(fragments.join(","))
        }
    }

    /// Compile the non-null SET entries of a filter into `field=value` pairs
    pub fn compile_update(&self, fd: &FilterData) -> Result<Option<String>> {
        let mut pairs = Vec::new();
        for uc in fd.update_clauses() {
            if uc.value.is_null() {
                continue;
            }
            let field = self
                .dialect
                .adjust_field(uc.kind, Granularity::Full, &uc.field, false);
            let value = self
                .dialect
                .adjust_value(uc.kind, Granularity::Full, &uc.value, false)?;
            pairs.push(format!("{}={}", field, value));
        }
        if pairs.is_empty() {
            Ok(None)
        } else {
            Ok(Some(pairs.join(",")))
        }
    }

    /// Compile the comparison entries of a filter into one WHERE expression,
    /// `None` when nothing compiles
    pub fn compile_where(&self, fd: &FilterData) -> Result<Option<String>> {
        let mut fragments = Vec::new();

        for wc in fd.where_clauses() {
            match wc.comparison {
                // Null tests render the field untouched
                Comparison::IsNull | Comparison::IsNotNull => {
                    fragments.push(format!("{} {}", wc.field, wc.comparison.as_sql()));
                }
                Comparison::In => {
                    let mut rendered = Vec::new();
                    match &wc.value {
                        FilterValue::List(values) => {
                            for v in values {
                                if v.is_null() {
                                    continue;
                                }
                                rendered.push(self.dialect.adjust_value(
                                    wc.kind,
                                    wc.granularity,
                                    v,
                                    self.ignore_case,
                                )?);
                            }
                        }
                        // A lone string still forms a one-element list; any
                        // other scalar leaves the clause empty
                        FilterValue::Scalar(v @ SqlValue::String(_)) => {
                            rendered.push(self.dialect.adjust_value(
                                wc.kind,
                                wc.granularity,
                                v,
                                self.ignore_case,
                            )?);
                        }
                        FilterValue::Scalar(_) => {}
                    }
                    if !rendered.is_empty() {
                        let field = self.dialect.adjust_field(
                            wc.kind,
                            wc.granularity,
                            &wc.field,
                            self.ignore_case,
                        );
                        fragments.push(format!("({} IN ({}))", field, rendered.join(",")));
                    }
                }
                Comparison::Like | Comparison::NotLike => {
                    if let FilterValue::Scalar(v) = &wc.value {
                        fragments.push(self.dialect.like_clause(
                            &wc.field,
                            &v.to_string(),
                            wc.comparison == Comparison::NotLike,
                            self.ignore_case,
                        ));
                    }
                }
                Comparison::ILike => {
                    if let FilterValue::Scalar(v) = &wc.value {
                        fragments
                            .push(self.dialect.like_clause(&wc.field, &v.to_string(), false, true));
                    }
                }
                Comparison::Regex | Comparison::RegexIgnoreCase => {
                    if let FilterValue::Scalar(v) = &wc.value {
                        fragments.push(self.dialect.regex_clause(
                            &wc.field,
                            &v.to_string(),
                            wc.comparison == Comparison::RegexIgnoreCase,
                        )?);
                    }
                }
                _ => {
                    if let FilterValue::Scalar(v) = &wc.value {
                        if v.is_null() {
                            continue;
                        }
                        let field = self.dialect.adjust_field(
                            wc.kind,
                            wc.granularity,
                            &wc.field,
                            self.ignore_case,
                        );
                        let value =
                            self.dialect
                                .adjust_value(wc.kind, wc.granularity, v, self.ignore_case)?;
                        fragments.push(format!(
                            "({} {} {})",
                            field,
                            wc.comparison.as_sql(),
                            value
                        ));
                    }
                }
            }
        }

        for bc in fd.between_clauses() {
            let field =
                self.dialect
                    .adjust_field(bc.kind, Granularity::Full, &bc.field, self.ignore_case);
            let low =
                self.dialect
                    .adjust_value(bc.kind, Granularity::Full, &bc.low, self.ignore_case)?;
            let high =
                self.dialect
                    .adjust_value(bc.kind, Granularity::Full, &bc.high, self.ignore_case)?;
            fragments.push(format!(
                "(({} >= {}) AND ({} <= {}))",
                field, low, field, high
            ));
        }

        for stm in fd.free_where_clauses() {
            fragments.push(format!("({})", stm));
        }

        if fragments.is_empty() {
            Ok(None)
        } else {
            Ok(Some(fragments.join(" AND ")))
        }
    }

    /// Compile the sort entries of a filter, `None` when it has no sort
    pub fn compile_orderby(&self, fd: &FilterData) -> Option<String> {
        let clauses: Vec<String> = fd
            .orderby_clauses()
            .iter()
            .map(|oc| format!("{} {}", oc.field, oc.direction.as_sql()))
            .collect();
        if clauses.is_empty() {
            None
        } else {
            Some(clauses.join(","))
        }
    }

    /// Assemble the base SELECT from the fixed clauses and parameters,
    /// leaving the run-time filter and pagination out
    pub fn build_select_base(&self, use_orderby: bool) -> Result<String> {
        self.check_from()?;

        let mut sql = if self.use_distinct {
            format!("SELECT DISTINCT {} FROM {}", self.select, self.from)
        } else {
            format!("SELECT {} FROM {}", self.select, self.from)
        };

        if self.has_where() {
            sql.push_str(" WHERE ");
            sql.push_str(&self.where_clause);
        }

        if let Some(params) = &self.params {
            if params.have_where() {
                if let Some(condition) = self.compile_where(params)? {
                    sql = append_where(sql, &condition);
                }
            }
        }

        if self.has_groupby() {
            sql.push_str(" GROUP BY ");
            sql.push_str(&self.groupby);
        }

        if self.has_having() {
            sql.push_str(" HAVING ");
            sql.push_str(&self.having);
        }

        // The fixed sort is a default; a filter sort selected at run time
        // replaces it further up
        if use_orderby && self.has_orderby() {
            let filter_sorts = self
                .filter
                .as_ref()
                .map(|f| f.have_orderby())
                .unwrap_or(false);
            if !filter_sorts {
                sql.push_str(" ORDER BY ");
                sql.push_str(&self.orderby);
            }
        }

        self.resolve_macros(sql)
    }

    /// Assemble the complete SELECT: base query, filter subselect, native
    /// pagination and the one-row probe for existence checks
    pub fn build_select(&self, use_orderby: bool, use_limit: bool, fetch_rows: bool) -> Result<String> {
        let (use_orderby, use_limit) = if fetch_rows {
            (use_orderby, use_limit)
        } else {
            (false, false)
        };

        let mut sql = self.build_select_base(use_orderby)?;

        if self.has_filter() {
            sql = self.dialect.wrap_for_filter(&sql);

            if let Some(filter) = &self.filter {
                if let Some(condition) = self.compile_where(filter)? {
                    sql.push_str(" WHERE ");
                    sql.push_str(&condition);
                }
                if use_orderby {
                    if let Some(sort) = self.compile_orderby(filter) {
                        sql.push_str(" ORDER BY ");
                        sql.push_str(&sort);
                    }
                }
            }
        }

        if use_limit && self.has_limit() && self.native_pagination {
            sql = self.dialect.paginate(&sql, self.offset, self.limit);
        }

        if !fetch_rows {
            sql = self.dialect.one_row_probe(&sql);
        }

        self.resolve_macros(sql)
    }

    /// Complete SELECT with sort, pagination and filter applied
    pub fn query_for_select(&self) -> Result<String> {
        self.build_select(true, true, true)
    }

    /// Load projection, WHERE and sort from a filter, then assemble the
    /// complete SELECT
    pub fn query_for_select_filtered(&mut self, fd: &FilterData) -> Result<String> {
        if let Some(select) = self.compile_select(fd) {
            self.select = select;
        }
        self.where_clause = self.compile_where(fd)?.unwrap_or_default();
        self.orderby = self.compile_orderby(fd).unwrap_or_default();
        self.build_select(true, true, true)
    }

    /// Render an INSERT from the non-null SET entries of a filter.
    /// `None` when every entry is null and there is nothing to insert.
    pub fn build_insert(&self, fd: &FilterData) -> Result<Option<String>> {
        let mut names = Vec::new();
        let mut values = Vec::new();

        for uc in fd.update_clauses() {
            if uc.value.is_null() {
                continue;
            }
            names.push(
                self.dialect
                    .adjust_field(uc.kind, Granularity::Full, &uc.field, false),
            );
            values.push(
                self.dialect
                    .adjust_value(uc.kind, Granularity::Full, &uc.value, false)?,
            );
        }

        if names.is_empty() {
            return Ok(None);
        }

        Ok(Some(format!(
            "INSERT INTO {}({}) VALUES ({})",
            self.target_table(),
            names.join(","),
            values.join(",")
        )))
    }

    /// Render an UPDATE from the SET and WHERE entries of a filter
    pub fn build_update(&self, fd: &FilterData) -> Result<String> {
        let assignments = self
            .compile_update(fd)?
            .ok_or_else(|| Error::missing_parameter("no non-null update values"))?;

        let mut sql = format!("UPDATE {} SET {}", self.target_table(), assignments);
        if let Some(condition) = self.compile_where(fd)? {
            sql.push_str(" WHERE ");
            sql.push_str(&condition);
        }
        Ok(sql)
    }

    /// Render a DELETE constrained by the fixed WHERE clause
    pub fn build_delete(&self) -> Result<String> {
        self.check_from()?;
        let mut sql = format!("DELETE FROM {}", self.target_table());
        if self.has_where() {
            sql.push_str(" WHERE ");
            sql.push_str(&self.where_clause);
        }
        Ok(sql)
    }

    /// Render a DELETE constrained by a filter
    pub fn build_delete_filtered(&self, fd: &FilterData) -> Result<String> {
        self.check_from()?;
        let mut sql = format!("DELETE FROM {}", self.target_table());
        if let Some(condition) = self.compile_where(fd)? {
            sql.push_str(" WHERE ");
            sql.push_str(&condition);
        }
        Ok(sql)
    }

    /// Render the COUNT(*) query over the unfiltered base SELECT
    pub fn build_count(&self) -> Result<String> {
        Ok(self.dialect.count_query(&self.build_select_base(false)?))
    }

    /// COUNT(*) query with a filter applied outside the counted subselect
    pub fn build_count_filtered(&self, fd: Option<&FilterData>) -> Result<String> {
        let mut sql = self.build_count()?;
        if let Some(fd) = fd {
            if fd.have_where() {
                if let Some(condition) = self.compile_where(fd)? {
                    sql.push_str(" WHERE ");
                    sql.push_str(&condition);
                }
            }
        }
        Ok(sql)
    }
}

/// Attach a condition to a statement that may or may not carry a WHERE yet
pub(crate) fn append_where(sql: String, condition: &str) -> String {
    if sql.to_uppercase().contains("WHERE") {
        format!("{} AND {}", sql, condition)
    } else {
        format!("{} WHERE {}", sql, condition)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::types::{ColumnKind, SqlValue};
    use crate::filter::SortDirection;

    fn pg() -> QueryBuilder {
        QueryBuilder::new(DatabaseBackend::Postgres)
    }

    #[test]
    fn test_base_select_assembly() {
        let qb = pg()
            .select("ID, NAME")
            .from("USERS")
            .where_raw("ACTIVE = 1")
            .groupby("NAME")
            .having("COUNT(*) > 1")
            .orderby("NAME");
        assert_eq!(
            qb.build_select_base(true).unwrap(),
            "SELECT ID, NAME FROM USERS WHERE ACTIVE = 1 GROUP BY NAME HAVING COUNT(*) > 1 ORDER BY NAME"
        );
        assert_eq!(
            qb.build_select_base(false).unwrap(),
            "SELECT ID, NAME FROM USERS WHERE ACTIVE = 1 GROUP BY NAME HAVING COUNT(*) > 1"
        );
    }

    #[test]
    fn test_distinct_select() {
        let qb = pg().from("T").use_distinct(true);
        assert_eq!(qb.build_select_base(false).unwrap(), "SELECT DISTINCT * FROM T");
    }

    #[test]
    fn test_missing_from_is_rejected() {
        let err = pg().build_select_base(true).unwrap_err();
        assert!(err.to_string().contains("FROM"));
    }

    #[test]
    fn test_params_merge_into_existing_where() {
        let params = FilterData::new()
            .add_where(ColumnKind::Int, "KIND", Comparison::Equal, 3)
            .unwrap();
        let qb = pg().from("T").where_raw("A = 1").params(params);
        assert_eq!(
            qb.build_select_base(false).unwrap(),
            "SELECT * FROM T WHERE A = 1 AND (KIND = 3)"
        );
    }

    #[test]
    fn test_params_open_their_own_where() {
        let params = FilterData::new()
            .add_where(ColumnKind::Int, "KIND", Comparison::Equal, 3)
            .unwrap();
        let qb = pg().from("T").params(params);
        assert_eq!(
            qb.build_select_base(false).unwrap(),
            "SELECT * FROM T WHERE (KIND = 3)"
        );
    }

    #[test]
    fn test_filter_wraps_base_query() {
        let filter = FilterData::new()
            .add_where(ColumnKind::VarChar, "NAME", Comparison::Equal, "rossi")
            .unwrap()
            .add_orderby("NAME", SortDirection::Desc);
        let qb = pg().from("T").orderby("ID").filter(filter);
        assert_eq!(
            qb.build_select(true, true, true).unwrap(),
            "SELECT * FROM (SELECT * FROM T) AS FOO WHERE (UPPER(NAME) = 'ROSSI') ORDER BY NAME DESC"
        );
    }

    #[test]
    fn test_filter_orderby_replaces_default_sort() {
        let filter = FilterData::new().add_orderby("NAME", SortDirection::Asc);
        let qb = pg().from("T").orderby("ID").filter(filter);
        let sql = qb.build_select(true, true, true).unwrap();
        assert!(!sql.contains("ORDER BY ID"));
        assert!(sql.ends_with("ORDER BY NAME ASC"));
    }

    #[test]
    fn test_native_pagination_applied_after_filter() {
        let qb = QueryBuilder::new(DatabaseBackend::MySQL)
            .from("T")
            .offset(20)
            .limit(10);
        assert_eq!(
            qb.build_select(true, true, true).unwrap(),
            "SELECT * FROM T LIMIT 10 OFFSET 20"
        );
    }

    #[test]
    fn test_pagination_skipped_when_not_native() {
        let qb = QueryBuilder::new(DatabaseBackend::MySQL)
            .from("T")
            .offset(20)
            .limit(10)
            .native_pagination(false);
        assert_eq!(qb.build_select(true, true, true).unwrap(), "SELECT * FROM T");
    }

    #[test]
    fn test_probe_disables_sort_and_pagination() {
        let qb = pg().from("T").orderby("ID").offset(20).limit(10);
        assert_eq!(
            qb.build_select(true, true, false).unwrap(),
            "SELECT * FROM T LIMIT 1"
        );
    }

    #[test]
    fn test_null_tests_render_field_verbatim() {
        let fd = FilterData::new()
            .add_where_null(ColumnKind::VarChar, "b.NOTE", Comparison::IsNull)
            .unwrap()
            .add_where(ColumnKind::Int, "ID", Comparison::GreaterThan, 5)
            .unwrap();
        let qb = pg().from("T");
        assert_eq!(
            qb.compile_where(&fd).unwrap().unwrap(),
            "b.NOTE IS NULL AND (ID > 5)"
        );
    }

    #[test]
    fn test_in_clause_joins_rendered_values() {
        let fd = FilterData::new().add_where_in(
            ColumnKind::VarChar,
            "code",
            vec![
                SqlValue::from("a"),
                SqlValue::Null,
                SqlValue::from("b"),
            ],
        );
        let qb = pg().from("T");
        assert_eq!(
            qb.compile_where(&fd).unwrap().unwrap(),
            "(UPPER(CODE) IN ('A','B'))"
        );
    }

    #[test]
    fn test_empty_in_list_compiles_to_nothing() {
        let fd = FilterData::new().add_where_in(ColumnKind::VarChar, "code", Vec::new());
        let qb = pg().from("T");
        assert!(qb.compile_where(&fd).unwrap().is_none());
    }

    #[test]
    fn test_between_and_free_where_shapes() {
        let fd = FilterData::new()
            .add_between(ColumnKind::Int, "QTY", 5, 10)
            .unwrap()
            .add_free_where("AMOUNT > 100");
        let qb = pg().from("T");
        assert_eq!(
            qb.compile_where(&fd).unwrap().unwrap(),
            "((QTY >= 5) AND (QTY <= 10)) AND (AMOUNT > 100)"
        );
    }

    #[test]
    fn test_like_routes_through_dialect() {
        let fd = FilterData::new()
            .add_where(ColumnKind::VarChar, "NAME", Comparison::Like, "ros")
            .unwrap();
        let qb = pg().from("T");
        assert_eq!(
            qb.compile_where(&fd).unwrap().unwrap(),
            "(NAME ILIKE '%ros%')"
        );
    }

    #[test]
    fn test_temporal_truncation_in_where() {
        let fd = FilterData::new()
            .add_where_truncated(
                ColumnKind::Timestamp,
                Granularity::DateOnly,
                "CREATED",
                Comparison::Equal,
                "2024-03-05",
            )
            .unwrap();
        let qb = pg().from("T");
        assert_eq!(
            qb.compile_where(&fd).unwrap().unwrap(),
            "(CREATED = '2024-03-05')"
        );
    }

    #[test]
    fn test_insert_skips_null_values() {
        let fd = FilterData::new()
            .add_insert(ColumnKind::VarChar, "name", "rossi")
            .add_insert(ColumnKind::Int, "age", 42)
            .add_insert(ColumnKind::VarChar, "note", SqlValue::Null);
        let qb = pg().from("USERS");
        assert_eq!(
            qb.build_insert(&fd).unwrap().unwrap(),
            "INSERT INTO USERS(NAME,AGE) VALUES ('rossi',42)"
        );
    }

    #[test]
    fn test_insert_with_nothing_to_insert() {
        let fd = FilterData::new().add_insert(ColumnKind::VarChar, "note", SqlValue::Null);
        let qb = pg().from("USERS");
        assert!(qb.build_insert(&fd).unwrap().is_none());
    }

    #[test]
    fn test_update_statement() {
        let fd = FilterData::new()
            .add_update(ColumnKind::VarChar, "name", "Bianchi")
            .add_where(ColumnKind::Int, "id", Comparison::Equal, 7)
            .unwrap();
        let qb = pg().from("USERS");
        assert_eq!(
            qb.build_update(&fd).unwrap(),
            "UPDATE USERS SET NAME='Bianchi' WHERE (ID = 7)"
        );
    }

    #[test]
    fn test_update_without_values_is_rejected() {
        let fd = FilterData::new().add_update(ColumnKind::VarChar, "name", SqlValue::Null);
        let qb = pg().from("USERS");
        assert!(qb.build_update(&fd).is_err());
    }

    #[test]
    fn test_delete_targets_delete_from_table() {
        let qb = pg()
            .from("USERS u JOIN ROLES r ON u.ROLE = r.ID")
            .delete_from("USERS")
            .where_raw("ID = 3");
        assert_eq!(qb.build_delete().unwrap(), "DELETE FROM USERS WHERE ID = 3");
    }

    #[test]
    fn test_count_wraps_base_query() {
        let qb = pg().from("T").where_raw("A = 1").orderby("A");
        assert_eq!(
            qb.build_count().unwrap(),
            "SELECT COUNT(*) FROM (SELECT * FROM T WHERE A = 1) AS FOO"
        );
    }

    #[test]
    fn test_count_filter_lands_outside_subselect() {
        let fd = FilterData::new()
            .add_where(ColumnKind::Int, "KIND", Comparison::Equal, 3)
            .unwrap();
        let qb = pg().from("T").where_raw("A = 1");
        assert_eq!(
            qb.build_count_filtered(Some(&fd)).unwrap(),
            "SELECT COUNT(*) FROM (SELECT * FROM T WHERE A = 1) AS FOO WHERE (KIND = 3)"
        );
    }

    #[test]
    fn test_query_for_select_filtered_loads_clauses() {
        let fd = FilterData::new()
            .add_select("ID")
            .add_select("NAME")
            .add_where(ColumnKind::Int, "KIND", Comparison::Equal, 3)
            .unwrap()
            .add_orderby("NAME", SortDirection::Asc);
        let mut qb = pg().from("T");
        assert_eq!(
            qb.query_for_select_filtered(&fd).unwrap(),
            "SELECT ID,NAME FROM T WHERE (KIND = 3) ORDER BY NAME ASC"
        );
    }

    struct UpperMacro;

    impl MacroResolver for UpperMacro {
        fn resolve(&self, sql: &str) -> Result<String> {
            Ok(sql.replace("__NOW__", "CURRENT_TIMESTAMP"))
        }
    }

    #[test]
    fn test_macro_resolution_runs_last() {
        let qb = pg()
            .from("T")
            .where_raw("STAMP < __NOW__")
            .macro_resolver(Box::new(UpperMacro));
        assert_eq!(
            qb.build_select(true, true, true).unwrap(),
            "SELECT * FROM T WHERE STAMP < CURRENT_TIMESTAMP"
        );
    }

    #[test]
    fn test_append_where_helper() {
        assert_eq!(
            append_where("SELECT * FROM T".to_string(), "A = 1"),
            "SELECT * FROM T WHERE A = 1"
        );
        assert_eq!(
            append_where("SELECT * FROM T WHERE B = 2".to_string(), "A = 1"),
            "SELECT * FROM T WHERE B = 2 AND A = 1"
        );
    }
}
