//! Column type classification
//!
//! Metadata arrives as JDBC-style numeric type codes; every code maps to
//! exactly one [`ColumnKind`]. The numeric codes stay part of the public
//! surface because adapters and persisted metadata exchange them.

use serde::{Deserialize, Serialize};

/// JDBC-style type codes, the currency of the metadata seam.
pub mod codes {
    pub const BIT: i32 = -7;
    pub const TINYINT: i32 = -6;
    pub const SMALLINT: i32 = 5;
    pub const INTEGER: i32 = 4;
    pub const BIGINT: i32 = -5;
    pub const FLOAT: i32 = 6;
    pub const REAL: i32 = 7;
    pub const DOUBLE: i32 = 8;
    pub const NUMERIC: i32 = 2;
    pub const DECIMAL: i32 = 3;
    pub const CHAR: i32 = 1;
    pub const VARCHAR: i32 = 12;
    pub const LONGVARCHAR: i32 = -1;
    pub const DATE: i32 = 91;
    pub const TIME: i32 = 92;
    pub const TIMESTAMP: i32 = 93;
    pub const BINARY: i32 = -2;
    pub const VARBINARY: i32 = -3;
    pub const LONGVARBINARY: i32 = -4;
    pub const NULL: i32 = 0;
    pub const BLOB: i32 = 2004;
    pub const CLOB: i32 = 2005;
    pub const BOOLEAN: i32 = 16;
    pub const OTHER: i32 = 1111;
}

/// Dialect-independent column type family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColumnKind {
    Boolean,
    TinyInt,
    SmallInt,
    Int,
    BigInt,
    Real,
    Float,
    Double,
    Decimal,
    Binary,
    VarBinary,
    LongVarBinary,
    Blob,
    Char,
    VarChar,
    LongVarChar,
    Date,
    Time,
    Timestamp,
    Null,
    Other,
}

impl ColumnKind {
    /// Classify a JDBC-style type code. Total: unknown codes become `Other`.
    pub fn classify(type_code: i32) -> ColumnKind {
        match type_code {
            codes::BIT | codes::BOOLEAN => ColumnKind::Boolean,
            codes::TINYINT => ColumnKind::TinyInt,
            codes::SMALLINT => ColumnKind::SmallInt,
            codes::INTEGER => ColumnKind::Int,
            codes::BIGINT => ColumnKind::BigInt,
            codes::REAL => ColumnKind::Real,
            codes::FLOAT => ColumnKind::Float,
            codes::DOUBLE => ColumnKind::Double,
            codes::NUMERIC | codes::DECIMAL => ColumnKind::Decimal,
            codes::BINARY => ColumnKind::Binary,
            codes::VARBINARY => ColumnKind::VarBinary,
            codes::LONGVARBINARY => ColumnKind::LongVarBinary,
            codes::BLOB => ColumnKind::Blob,
            codes::CHAR => ColumnKind::Char,
            codes::VARCHAR => ColumnKind::VarChar,
            codes::LONGVARCHAR | codes::CLOB => ColumnKind::LongVarChar,
            codes::DATE => ColumnKind::Date,
            codes::TIME => ColumnKind::Time,
            codes::TIMESTAMP => ColumnKind::Timestamp,
            codes::NULL => ColumnKind::Null,
            _ => ColumnKind::Other,
        }
    }

    /// Representative type code for this kind
    pub fn type_code(&self) -> i32 {
        match self {
            ColumnKind::Boolean => codes::BOOLEAN,
            ColumnKind::TinyInt => codes::TINYINT,
            ColumnKind::SmallInt => codes::SMALLINT,
            ColumnKind::Int => codes::INTEGER,
            ColumnKind::BigInt => codes::BIGINT,
            ColumnKind::Real => codes::REAL,
            ColumnKind::Float => codes::FLOAT,
            ColumnKind::Double => codes::DOUBLE,
            ColumnKind::Decimal => codes::DECIMAL,
            ColumnKind::Binary => codes::BINARY,
            ColumnKind::VarBinary => codes::VARBINARY,
            ColumnKind::LongVarBinary => codes::LONGVARBINARY,
            ColumnKind::Blob => codes::BLOB,
            ColumnKind::Char => codes::CHAR,
            ColumnKind::VarChar => codes::VARCHAR,
            ColumnKind::LongVarChar => codes::LONGVARCHAR,
            ColumnKind::Date => codes::DATE,
            ColumnKind::Time => codes::TIME,
            ColumnKind::Timestamp => codes::TIMESTAMP,
            ColumnKind::Null => codes::NULL,
            ColumnKind::Other => codes::OTHER,
        }
    }

    /// Character data: CHAR, VARCHAR, LONGVARCHAR
    pub fn is_character(&self) -> bool {
        matches!(
            self,
            ColumnKind::Char | ColumnKind::VarChar | ColumnKind::LongVarChar
        )
    }

    /// Whole-number data: TINYINT through BIGINT
    pub fn is_integer(&self) -> bool {
        matches!(
            self,
            ColumnKind::TinyInt | ColumnKind::SmallInt | ColumnKind::Int | ColumnKind::BigInt
        )
    }

    /// Floating-point data: REAL, FLOAT, DOUBLE
    pub fn is_real(&self) -> bool {
        matches!(
            self,
            ColumnKind::Real | ColumnKind::Float | ColumnKind::Double
        )
    }

    pub fn is_decimal(&self) -> bool {
        matches!(self, ColumnKind::Decimal)
    }

    /// Any numeric family: integer, floating point or decimal
    pub fn is_numeric(&self) -> bool {
        self.is_integer() || self.is_real() || self.is_decimal()
    }

    pub fn is_boolean(&self) -> bool {
        matches!(self, ColumnKind::Boolean)
    }

    /// Date, time or timestamp
    pub fn is_temporal(&self) -> bool {
        matches!(
            self,
            ColumnKind::Date | ColumnKind::Time | ColumnKind::Timestamp
        )
    }

    /// Raw byte data: BINARY, VARBINARY, LONGVARBINARY, BLOB
    pub fn is_binary(&self) -> bool {
        matches!(
            self,
            ColumnKind::Binary
                | ColumnKind::VarBinary
                | ColumnKind::LongVarBinary
                | ColumnKind::Blob
        )
    }
}
