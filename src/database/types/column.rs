//! Column descriptor attached to a result shape or a table

use crate::database::types::ColumnKind;
use serde::{Deserialize, Serialize};

/// Immutable description of one column: name, owning table, type family
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    name: String,
    table: String,
    kind: ColumnKind,
    type_code: i32,
    nullable: bool,
    read_only: bool,
}

impl Column {
    pub fn new(name: impl Into<String>, table: impl Into<String>, kind: ColumnKind) -> Self {
        Self {
            name: name.into(),
            table: table.into(),
            kind,
            type_code: kind.type_code(),
            nullable: true,
            read_only: false,
        }
    }

    /// Build from a raw metadata triple; the kind is classified from the code
    pub fn from_code(
        name: impl Into<String>,
        table: impl Into<String>,
        type_code: i32,
        nullable: bool,
    ) -> Self {
        Self {
            name: name.into(),
            table: table.into(),
            kind: ColumnKind::classify(type_code),
            type_code,
            nullable,
            read_only: false,
        }
    }

    pub fn with_nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }

    pub fn with_read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Owning table name, empty when the source did not report one
    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn kind(&self) -> ColumnKind {
        self.kind
    }

    /// The raw type code the metadata reported, which may be more specific
    /// than the classified kind
    pub fn type_code(&self) -> i32 {
        self.type_code
    }

    pub fn nullable(&self) -> bool {
        self.nullable
    }

    pub fn read_only(&self) -> bool {
        self.read_only
    }

    /// `table.name`, or the bare name when the table is unknown
    pub fn qualified_name(&self) -> String {
        if self.table.is_empty() {
            self.name.clone()
        } else {
            format!("{}.{}", self.table, self.name)
        }
    }

    pub fn is_character(&self) -> bool {
        self.kind.is_character()
    }

    pub fn is_numeric(&self) -> bool {
        self.kind.is_numeric()
    }

    pub fn is_boolean(&self) -> bool {
        self.kind.is_boolean()
    }

    pub fn is_temporal(&self) -> bool {
        self.kind.is_temporal()
    }

    pub fn is_binary(&self) -> bool {
        self.kind.is_binary()
    }
}
