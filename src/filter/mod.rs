//! Ordered filter, sort and update specification
//!
//! Clauses are emitted in insertion order; callers rely on the generated SQL
//! text being stable, so the order of these lists is part of the contract.

use crate::database::types::{ColumnKind, SqlValue};
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Comparison operators accepted in where clauses
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Comparison {
    Equal,
    NotEqual,
    GreaterThan,
    LessThan,
    GreaterEqual,
    LessEqual,
    Like,
    NotLike,
    ILike,
    In,
    IsNull,
    IsNotNull,
    /// Regular-expression match, Oracle only
    Regex,
    /// Case-insensitive regular-expression match, Oracle only
    RegexIgnoreCase,
    /// Verbatim operator text
    Custom(String),
}

impl Comparison {
    /// Operator text for the plain binary comparisons
    pub fn as_sql(&self) -> &str {
        match self {
            Comparison::Equal => "=",
            Comparison::NotEqual => "<>",
            Comparison::GreaterThan => ">",
            Comparison::LessThan => "<",
            Comparison::GreaterEqual => ">=",
            Comparison::LessEqual => "<=",
            Comparison::Like => "LIKE",
            Comparison::NotLike => "NOT LIKE",
            Comparison::ILike => "ILIKE",
            Comparison::In => "IN",
            Comparison::IsNull => "IS NULL",
            Comparison::IsNotNull => "IS NOT NULL",
            Comparison::Regex => "REGEX",
            Comparison::RegexIgnoreCase => "REGEXI",
            Comparison::Custom(op) => op,
        }
    }

    /// True for the null tests, which take no comparison value
    pub fn is_null_test(&self) -> bool {
        matches!(self, Comparison::IsNull | Comparison::IsNotNull)
    }
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_sql())
    }
}

/// Truncation applied to a temporal comparison
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Granularity {
    #[default]
    Full,
    DateOnly,
    HourOnly,
    MinuteOnly,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_sql(&self) -> &str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_sql())
    }
}

/// Scalar or list comparison value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FilterValue {
    Scalar(SqlValue),
    List(Vec<SqlValue>),
}

impl FilterValue {
    pub fn is_null(&self) -> bool {
        matches!(self, FilterValue::Scalar(SqlValue::Null))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WhereClause {
    pub kind: ColumnKind,
    pub granularity: Granularity,
    pub field: String,
    pub comparison: Comparison,
    pub value: FilterValue,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BetweenClause {
    pub kind: ColumnKind,
    pub field: String,
    pub low: SqlValue,
    pub high: SqlValue,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderByClause {
    pub field: String,
    pub direction: SortDirection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateClause {
    pub kind: ColumnKind,
    pub field: String,
    pub value: SqlValue,
}

/// Structured filter/sort/update specification consumed by the query builder.
///
/// All `add_*` methods are consuming so specifications chain:
///
/// ```
/// use sqlmason::filter::{Comparison, FilterData};
/// use sqlmason::ColumnKind;
///
/// let filter = FilterData::new()
///     .add_where(ColumnKind::VarChar, "STATE", Comparison::Equal, "open")?
///     .add_free_where("AMOUNT > 100");
/// assert!(filter.have_where());
/// # Ok::<(), sqlmason::Error>(())
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterData {
    select: Vec<String>,
    updates: Vec<UpdateClause>,
    wheres: Vec<WhereClause>,
    betweens: Vec<BetweenClause>,
    orderbys: Vec<OrderByClause>,
    free_wheres: Vec<String>,
}

impl FilterData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a projection fragment used by select-from-filter queries
    pub fn add_select(mut self, fragment: impl Into<String>) -> Self {
        self.select.push(fragment.into());
        self
    }

    /// Add a SET entry for insert/update statement generation
    pub fn add_update(
        mut self,
        kind: ColumnKind,
        field: impl Into<String>,
        value: impl Into<SqlValue>,
    ) -> Self {
        self.updates.push(UpdateClause {
            kind,
            field: field.into(),
            value: value.into(),
        });
        self
    }

    /// Insert is the same clause list as update
    pub fn add_insert(
        self,
        kind: ColumnKind,
        field: impl Into<String>,
        value: impl Into<SqlValue>,
    ) -> Self {
        self.add_update(kind, field, value)
    }

    /// Add a scalar comparison. A null value is rejected here: the null tests
    /// go through [`FilterData::add_where_null`].
    pub fn add_where(
        self,
        kind: ColumnKind,
        field: impl Into<String>,
        comparison: Comparison,
        value: impl Into<SqlValue>,
    ) -> Result<Self> {
        self.add_where_truncated(kind, Granularity::Full, field, comparison, value)
    }

    /// Scalar comparison with temporal truncation
    pub fn add_where_truncated(
        mut self,
        kind: ColumnKind,
        granularity: Granularity,
        field: impl Into<String>,
        comparison: Comparison,
        value: impl Into<SqlValue>,
    ) -> Result<Self> {
        let field = field.into();
        let value = value.into();
        if value.is_null() {
            return Err(Error::missing_parameter(format!(
                "null comparison value for {}",
                field
            )));
        }
        self.wheres.push(WhereClause {
            kind,
            granularity,
            field,
            comparison,
            value: FilterValue::Scalar(value),
        });
        Ok(self)
    }

    /// Add an IS NULL / IS NOT NULL test
    pub fn add_where_null(
        mut self,
        kind: ColumnKind,
        field: impl Into<String>,
        comparison: Comparison,
    ) -> Result<Self> {
        if !comparison.is_null_test() {
            return Err(Error::missing_parameter(format!(
                "comparison {} requires a value",
                comparison
            )));
        }
        self.wheres.push(WhereClause {
            kind,
            granularity: Granularity::Full,
            field: field.into(),
            comparison,
            value: FilterValue::Scalar(SqlValue::Null),
        });
        Ok(self)
    }

    /// Add an IN test over a value list. An empty list is legal and compiles
    /// to nothing.
    pub fn add_where_in(
        mut self,
        kind: ColumnKind,
        field: impl Into<String>,
        values: Vec<SqlValue>,
    ) -> Self {
        self.wheres.push(WhereClause {
            kind,
            granularity: Granularity::Full,
            field: field.into(),
            comparison: Comparison::In,
            value: FilterValue::List(values),
        });
        self
    }

    pub fn add_between(
        mut self,
        kind: ColumnKind,
        field: impl Into<String>,
        low: impl Into<SqlValue>,
        high: impl Into<SqlValue>,
    ) -> Result<Self> {
        let field = field.into();
        let (low, high) = (low.into(), high.into());
        if low.is_null() || high.is_null() {
            return Err(Error::missing_parameter(format!(
                "null bound in between for {}",
                field
            )));
        }
        self.betweens.push(BetweenClause {
            kind,
            field,
            low,
            high,
        });
        Ok(self)
    }

    /// Add a free-form WHERE fragment, emitted parenthesized and verbatim
    pub fn add_free_where(mut self, fragment: impl Into<String>) -> Self {
        self.free_wheres.push(fragment.into());
        self
    }

    pub fn add_orderby(mut self, field: impl Into<String>, direction: SortDirection) -> Self {
        self.orderbys.push(OrderByClause {
            field: field.into(),
            direction,
        });
        self
    }

    pub fn have_select(&self) -> bool {
        !self.select.is_empty()
    }

    pub fn have_update(&self) -> bool {
        !self.updates.is_empty()
    }

    /// True when any where-producing list holds at least one clause
    pub fn have_where(&self) -> bool {
        !self.wheres.is_empty() || !self.betweens.is_empty() || !self.free_wheres.is_empty()
    }

    pub fn have_orderby(&self) -> bool {
        !self.orderbys.is_empty()
    }

    pub fn is_empty(&self) -> bool {
        !self.have_select() && !self.have_update() && !self.have_where() && !self.have_orderby()
    }

    pub fn select_clauses(&self) -> &[String] {
        &self.select
    }

    pub fn update_clauses(&self) -> &[UpdateClause] {
        &self.updates
    }

    pub fn where_clauses(&self) -> &[WhereClause] {
        &self.wheres
    }

    pub fn between_clauses(&self) -> &[BetweenClause] {
        &self.betweens
    }

    pub fn orderby_clauses(&self) -> &[OrderByClause] {
        &self.orderbys
    }

    pub fn free_where_clauses(&self) -> &[String] {
        &self.free_wheres
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insertion_order_is_kept() {
        let f = FilterData::new()
            .add_where(ColumnKind::VarChar, "B", Comparison::Equal, "x")
            .unwrap()
            .add_where(ColumnKind::VarChar, "A", Comparison::Equal, "y")
            .unwrap()
            .add_where(ColumnKind::Int, "C", Comparison::GreaterThan, 3)
            .unwrap();
        let fields: Vec<&str> = f.where_clauses().iter().map(|w| w.field.as_str()).collect();
        assert_eq!(fields, ["B", "A", "C"]);
    }

    #[test]
    fn test_null_scalar_value_is_rejected() {
        let err = FilterData::new()
            .add_where(ColumnKind::Int, "ID", Comparison::Equal, SqlValue::Null)
            .unwrap_err();
        assert_eq!(err.to_string(), "missing parameter: null comparison value for ID");
    }

    #[test]
    fn test_null_test_constructor_only_accepts_null_tests() {
        let f = FilterData::new()
            .add_where_null(ColumnKind::Int, "ID", Comparison::IsNull)
            .unwrap();
        assert!(f.have_where());

        assert!(FilterData::new()
            .add_where_null(ColumnKind::Int, "ID", Comparison::Equal)
            .is_err());
    }

    #[test]
    fn test_between_rejects_null_bounds() {
        assert!(FilterData::new()
            .add_between(ColumnKind::Int, "N", SqlValue::Null, 5)
            .is_err());
        assert!(FilterData::new()
            .add_between(ColumnKind::Int, "N", 1, 5)
            .is_ok());
    }

    #[test]
    fn test_have_predicates() {
        let f = FilterData::new();
        assert!(f.is_empty());
        assert!(!f.have_where());

        let f = FilterData::new().add_free_where("A > 1");
        assert!(f.have_where());
        assert!(!f.have_orderby());

        let f = FilterData::new().add_orderby("A", SortDirection::Desc);
        assert!(!f.have_where());
        assert!(f.have_orderby());
        assert!(!f.is_empty());
    }

    #[test]
    fn test_insert_delegates_to_update() {
        let f = FilterData::new().add_insert(ColumnKind::Int, "ID", 1);
        assert_eq!(f.update_clauses().len(), 1);
        assert!(f.have_update());
    }
}
