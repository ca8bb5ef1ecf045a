//! Result-shape description with 1-based column addressing
//!
//! Columns are addressed starting at 1, matching the positions adapters
//! report; slot 0 is reserved and never valid. Name lookup is
//! case-insensitive and accepts both `name` and `table.name`.

use crate::database::types::{Column, ColumnKind};
use crate::error::{Error, Result};
use std::collections::HashMap;

#[derive(Debug, Clone)]
pub struct Schema {
    /// Primary table this shape was loaded for, empty for ad-hoc queries
    table: String,
    /// Slot 0 holds a placeholder so positions line up with column numbers
    columns: Vec<Column>,
    /// Lower-cased name and table.name keys to 1-based positions
    by_name: HashMap<String, usize>,
    multi_table: bool,
}

impl Schema {
    /// Build a schema from an ordered column list. The list is 0-based on
    /// input; positions shift up by one.
    pub fn from_columns(table: impl Into<String>, list: Vec<Column>) -> Self {
        let table = table.into();
        let mut columns = Vec::with_capacity(list.len() + 1);
        columns.push(Column::new("", "", ColumnKind::Null));

        let mut by_name = HashMap::new();
        let mut tables_seen: Vec<String> = Vec::new();

        for (i, col) in list.into_iter().enumerate() {
            let index = i + 1;
            by_name.insert(col.name().to_lowercase(), index);
            if !col.table().is_empty() {
                by_name.insert(col.qualified_name().to_lowercase(), index);
                if !tables_seen.iter().any(|t| t.eq_ignore_ascii_case(col.table())) {
                    tables_seen.push(col.table().to_string());
                }
            }
            columns.push(col);
        }

        Self {
            table,
            columns,
            by_name,
            multi_table: tables_seen.len() > 1,
        }
    }

    pub fn table_name(&self) -> &str {
        &self.table
    }

    /// True when the attributed columns span more than one table
    pub fn is_multi_table(&self) -> bool {
        self.multi_table
    }

    pub fn number_of_columns(&self) -> usize {
        self.columns.len() - 1
    }

    /// Column at a 1-based position
    pub fn column(&self, index: usize) -> Result<&Column> {
        if index == 0 {
            return Err(Error::missing_parameter("columns are 1 based"));
        }
        self.columns.get(index).ok_or_else(|| {
            Error::missing_column(self.table.clone(), format!("column {}", index))
        })
    }

    /// 1-based position of a column by name or `table.name`, case-insensitive
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.by_name.get(&name.trim().to_lowercase()).copied()
    }

    pub fn column_by_name(&self, name: &str) -> Result<&Column> {
        self.index_of(name)
            .and_then(|i| self.columns.get(i))
            .ok_or_else(|| Error::missing_column(self.table.clone(), name))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index_of(name).is_some()
    }

    /// Columns in declaration order, without the reserved slot
    pub fn columns(&self) -> impl Iterator<Item = &Column> {
        self.columns.iter().skip(1)
    }
}
