//! Linked-table lookup lists
//!
//! Edit surfaces showing a code column usually display the matching row of a
//! linked table instead. The operations here build and run the distinct
//! lookup query for such a link, assemble `code | display` entries from the
//! result, and keep the zero entry ("nothing selected") at the top of every
//! list. Results and row counts go through the TTL query cache keyed by the
//! rendered SQL.

use super::QueryBuilder;
use crate::cache::{Caches, QueryCache};
use crate::database::types::Value;
use crate::database::{DatabaseAdapter, RowSet};
use crate::error::Result;
use std::sync::Arc;

/// Description of a lookup link to a foreign table.
///
/// `display_field` may name several comma-separated columns; a single-column
/// display additionally filters out null display rows and drives the sort.
#[derive(Debug, Clone)]
pub struct ForeignLink {
    pub table: String,
    pub link_field: String,
    pub alt_link_field: Option<String>,
    pub display_field: String,
    pub extra_where: Option<String>,
    pub enable_cache: bool,
    pub skip_blank_entries: bool,
}

impl ForeignLink {
    pub fn new(
        table: impl Into<String>,
        link_field: impl Into<String>,
        display_field: impl Into<String>,
    ) -> Self {
        Self {
            table: table.into(),
            link_field: link_field.into(),
            alt_link_field: None,
            display_field: display_field.into(),
            extra_where: None,
            enable_cache: true,
            skip_blank_entries: false,
        }
    }

    /// Second code column carried alongside the link field
    pub fn with_alt_link(mut self, field: impl Into<String>) -> Self {
        self.alt_link_field = Some(field.into());
        self
    }

    /// Extra condition appended to the lookup query
    pub fn with_extra_where(mut self, clause: impl Into<String>) -> Self {
        self.extra_where = Some(clause.into());
        self
    }

    /// Bypass the query cache for this link
    pub fn without_cache(mut self) -> Self {
        self.enable_cache = false;
        self
    }

    /// Drop rows whose code or display is blank, the combo-editor behavior
    pub fn skipping_blank_entries(mut self) -> Self {
        self.skip_blank_entries = true;
        self
    }
}

/// One row of a lookup list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignEntry {
    pub code: String,
    pub alt_code: String,
    pub display: String,
}

impl ForeignEntry {
    pub fn new(code: impl Into<String>, display: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            alt_code: String::new(),
            display: display.into(),
        }
    }

    pub fn with_alt_code(mut self, alt_code: impl Into<String>) -> Self {
        self.alt_code = alt_code.into();
        self
    }
}

/// Condition excluding soft-deleted rows of a table
pub fn soft_delete_filter(table: &str) -> String {
    format!(
        "(({0}.STATO_REC IS NULL) OR ({0}.STATO_REC<10))",
        table
    )
}

fn cell_text(cell: &Value) -> Result<String> {
    Ok(cell.as_string()?.unwrap_or_default())
}

impl QueryBuilder {
    /// Render the lookup query for a link.
    ///
    /// `soft_delete` appends the soft-delete condition; callers decide it
    /// through the probe cache so the text stays a pure function of its
    /// arguments.
    pub fn foreign_query(&self, link: &ForeignLink, soft_delete: bool) -> Result<String> {
        let mut sql = match &link.alt_link_field {
            Some(alt) => format!(
                "SELECT DISTINCT {},{},{} FROM {} WHERE ({} IS NOT NULL) AND ({} IS NOT NULL)",
                link.link_field,
                alt,
                link.display_field,
                link.table,
                link.link_field,
                alt
            ),
            None => format!(
                "SELECT DISTINCT {},{} FROM {} WHERE {} IS NOT NULL",
                link.link_field, link.display_field, link.table, link.link_field
            ),
        };

        let single_display = !link.display_field.contains(',');
        if single_display {
            sql.push_str(&format!(" AND {} IS NOT NULL", link.display_field));
        }

        if soft_delete {
            sql.push_str(&format!(" AND {}", soft_delete_filter(&link.table)));
        }

        if let Some(extra) = &link.extra_where {
            sql.push_str(&format!(" AND {}", extra));
        }

        if single_display {
            sql.push_str(&format!(" ORDER BY {}", link.display_field));
        } else {
            sql.push_str(&format!(" ORDER BY {}", link.link_field));
        }

        let sql = self.resolve_macros(sql)?;
        log::debug!("foreign lookup query: {}", sql);
        Ok(sql)
    }

    /// Lookup list for a link, excluding soft-deleted rows of the foreign
    /// table when it carries the marker column
    pub async fn foreign_data_list(
        &self,
        db: &dyn DatabaseAdapter,
        caches: &Caches,
        link: &ForeignLink,
    ) -> Result<Arc<Vec<ForeignEntry>>> {
        let soft_delete = caches.soft_delete.has_soft_delete(db, &link.table).await?;
        let sql = self.foreign_query(link, soft_delete)?;
        self.fetch_foreign_list(db, caches, link, sql).await
    }

    /// Lookup list for a link including soft-deleted rows
    pub async fn foreign_data_list_all(
        &self,
        db: &dyn DatabaseAdapter,
        caches: &Caches,
        link: &ForeignLink,
    ) -> Result<Arc<Vec<ForeignEntry>>> {
        let sql = self.foreign_query(link, false)?;
        self.fetch_foreign_list(db, caches, link, sql).await
    }

    async fn fetch_foreign_list(
        &self,
        db: &dyn DatabaseAdapter,
        caches: &Caches,
        link: &ForeignLink,
        sql: String,
    ) -> Result<Arc<Vec<ForeignEntry>>> {
        if link.enable_cache {
            if let Some(found) = caches.queries.entries(&QueryCache::list_key(&sql)) {
                return Ok(found);
            }
        }

        let rows = db.fetch_rows(&sql).await?;
        let list = Arc::new(self.collect_entries(
            &rows,
            link.alt_link_field.is_some(),
            link.skip_blank_entries,
        )?);

        if link.enable_cache {
            caches.queries.put_entries(QueryCache::list_key(&sql), Arc::clone(&list));
        }
        Ok(list)
    }

    /// Assemble entries from lookup rows: column 1 is the code, column 2 the
    /// alternate code when the link carries one, every remaining column joins
    /// the display text. The zero entry moves to the front; when absent and
    /// the builder has auto-zero enabled a synthetic one is prepended.
    fn collect_entries(
        &self,
        rows: &RowSet,
        alternate: bool,
        skip_blank: bool,
    ) -> Result<Vec<ForeignEntry>> {
        let display_from = if alternate { 2 } else { 1 };
        let mut list = Vec::with_capacity(rows.len());
        let mut zero: Option<ForeignEntry> = None;

        for cells in &rows.rows {
            let code = match cells.first() {
                Some(cell) => cell_text(cell)?,
                None => continue,
            };
            let alt_code = if alternate {
                match cells.get(1) {
                    Some(cell) => cell_text(cell)?,
                    None => String::new(),
                }
            } else {
                String::new()
            };

            let mut display = String::new();
            for cell in cells.iter().skip(display_from) {
                display.push_str(&cell_text(cell)?);
                display.push(' ');
            }

            if skip_blank && (code.trim().is_empty() || display.trim().is_empty()) {
                continue;
            }

            let entry = ForeignEntry {
                code,
                alt_code,
                display,
            };

            // the zero entry is held back and re-inserted at the top
            if zero.is_none() && entry.code == "0" {
                zero = Some(entry);
                continue;
            }
            list.push(entry);
        }

        if let Some(zero) = zero {
            list.insert(0, zero);
        } else if self.auto_zero {
            list.insert(
                0,
                ForeignEntry::new("0", self.none_label.clone()).with_alt_code("0"),
            );
        }
        Ok(list)
    }

    /// Row count of the lookup query for a link, cached under the rendered
    /// query text
    pub async fn estimate_foreign_data_list(
        &self,
        db: &dyn DatabaseAdapter,
        caches: &Caches,
        link: &ForeignLink,
    ) -> Result<u64> {
        let soft_delete = caches.soft_delete.has_soft_delete(db, &link.table).await?;
        let sql = self.foreign_query(link, soft_delete)?;

        let key = QueryCache::count_key(&sql);
        if let Some(found) = caches.queries.count(&key) {
            return Ok(found);
        }

        let count = self.record_count(db, caches, &sql).await?;
        caches.queries.put_count(key, count);
        Ok(count)
    }

    /// Cached row count of an arbitrary inner query, wrapped through the
    /// dialect's count shape
    pub async fn record_count(
        &self,
        db: &dyn DatabaseAdapter,
        caches: &Caches,
        inner: &str,
    ) -> Result<u64> {
        let count_sql = self.dialect.count_query(inner);

        let key = QueryCache::count_key(&count_sql);
        if let Some(found) = caches.queries.count(&key) {
            return Ok(found);
        }

        let rows = db.fetch_rows(&count_sql).await?;
        let count = match rows.scalar() {
            Some(cell) => cell.as_i64()?.max(0) as u64,
            None => 0,
        };

        caches.queries.put_count(key, count);
        Ok(count)
    }

    /// Every distinct value of one column, as entries whose code and display
    /// are both the value. Feeds search combos built from the column's own
    /// data.
    pub async fn distinct_value_list(
        &self,
        db: &dyn DatabaseAdapter,
        caches: &Caches,
        table: &str,
        column: &str,
        extra_where: Option<&str>,
        use_cache: bool,
    ) -> Result<Arc<Vec<ForeignEntry>>> {
        let mut sql = format!(
            "SELECT DISTINCT {} FROM {} WHERE {} IS NOT NULL",
            column, table, column
        );
        if let Some(extra) = extra_where {
            sql.push_str(&format!(" AND {}", extra));
        }
        sql.push_str(&format!(" ORDER BY {}", column));
        let sql = self.resolve_macros(sql)?;

        if use_cache {
            if let Some(found) = caches.queries.entries(&QueryCache::distinct_key(&sql)) {
                return Ok(found);
            }
        }

        let rows = db.fetch_rows(&sql).await?;
        let mut list = Vec::with_capacity(rows.len());
        for cells in &rows.rows {
            if let Some(cell) = cells.first() {
                let text = cell_text(cell)?;
                list.push(ForeignEntry::new(text.clone(), text));
            }
        }
        let list = Arc::new(list);

        if use_cache {
            caches.queries.put_entries(QueryCache::distinct_key(&sql), Arc::clone(&list));
        }
        Ok(list)
    }
}
