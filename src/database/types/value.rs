//! Typed cell values with bidirectional conversion
//!
//! [`SqlValue`] is the dialect-independent tagged union; [`Value`] attaches the
//! originating column kind and 1-based result-set position. Accessors follow
//! the primitive/object split: primitive accessors map null to the type's zero
//! value, `_opt` accessors map null to `None`. String, decimal and temporal
//! accessors are always optional. A conversion that cannot be performed is a
//! typed error carrying the offending representation, never a silent default.

use crate::database::types::ColumnKind;
use crate::error::{Error, Result};
use chrono::{Local, NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

const DATE_ISO: &str = "%Y-%m-%d";
const TIME_ISO: &str = "%H:%M:%S%.f";
const DATETIME_ISO: &str = "%Y-%m-%d %H:%M:%S%.f";
const DATETIME_ISO_T: &str = "%Y-%m-%dT%H:%M:%S%.f";
const DATETIME_MINUTES: &str = "%Y-%m-%d %H:%M";

/// Strings recognised as true, everything else is false
fn parse_truthy(s: &str) -> bool {
    matches!(
        s.trim().to_lowercase().as_str(),
        "true" | "t" | "yes" | "y" | "1"
    )
}

/// Dialect-independent SQL cell value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SqlValue {
    Null,
    Bool(bool),
    TinyInt(i8),
    SmallInt(i16),
    Int(i32),
    BigInt(i64),
    Real(f32),
    Double(f64),
    Decimal(Decimal),
    Bytes(Vec<u8>),
    String(String),
    Date(NaiveDate),
    Time(NaiveTime),
    Timestamp(NaiveDateTime),
}

impl SqlValue {
    pub fn is_null(&self) -> bool {
        matches!(self, SqlValue::Null)
    }

    /// Column kind implied by the tag alone
    pub fn kind(&self) -> ColumnKind {
        match self {
            SqlValue::Null => ColumnKind::Null,
            SqlValue::Bool(_) => ColumnKind::Boolean,
            SqlValue::TinyInt(_) => ColumnKind::TinyInt,
            SqlValue::SmallInt(_) => ColumnKind::SmallInt,
            SqlValue::Int(_) => ColumnKind::Int,
            SqlValue::BigInt(_) => ColumnKind::BigInt,
            SqlValue::Real(_) => ColumnKind::Real,
            SqlValue::Double(_) => ColumnKind::Double,
            SqlValue::Decimal(_) => ColumnKind::Decimal,
            SqlValue::Bytes(_) => ColumnKind::VarBinary,
            SqlValue::String(_) => ColumnKind::VarChar,
            SqlValue::Date(_) => ColumnKind::Date,
            SqlValue::Time(_) => ColumnKind::Time,
            SqlValue::Timestamp(_) => ColumnKind::Timestamp,
        }
    }

    /// Truthiness: null is false, numbers compare against zero, strings match
    /// the recognised set, anything else is false. Total by contract.
    pub fn as_bool(&self) -> bool {
        match self {
            SqlValue::Null => false,
            SqlValue::Bool(b) => *b,
            SqlValue::TinyInt(i) => *i != 0,
            SqlValue::SmallInt(i) => *i != 0,
            SqlValue::Int(i) => *i != 0,
            SqlValue::BigInt(i) => *i != 0,
            SqlValue::Real(f) => *f != 0.0,
            SqlValue::Double(f) => *f != 0.0,
            SqlValue::Decimal(d) => !d.is_zero(),
            SqlValue::String(s) => parse_truthy(s),
            _ => false,
        }
    }

    pub fn as_bool_opt(&self) -> Option<bool> {
        match self {
            SqlValue::Null => None,
            other => Some(other.as_bool()),
        }
    }

    pub fn as_i64(&self) -> Result<i64> {
        match self {
            SqlValue::Null => Ok(0),
            SqlValue::Bool(b) => Ok(*b as i64),
            SqlValue::TinyInt(i) => Ok(*i as i64),
            SqlValue::SmallInt(i) => Ok(*i as i64),
            SqlValue::Int(i) => Ok(*i as i64),
            SqlValue::BigInt(i) => Ok(*i),
            SqlValue::Real(f) => Ok(*f as i64),
            SqlValue::Double(f) => Ok(*f as i64),
            SqlValue::Decimal(d) => Ok(d.trunc().to_i64().unwrap_or(0)),
            SqlValue::String(s) => s
                .trim()
                .parse()
                .map_err(|_| Error::conversion(s.trim(), "i64")),
            other => Err(Error::conversion(other.to_string(), "i64")),
        }
    }

    pub fn as_i8(&self) -> Result<i8> {
        match self {
            SqlValue::String(s) => s
                .trim()
                .parse()
                .map_err(|_| Error::conversion(s.trim(), "i8")),
            other => other
                .as_i64()
                .map(|v| v as i8)
                .map_err(|_| Error::conversion(other.to_string(), "i8")),
        }
    }

    pub fn as_i16(&self) -> Result<i16> {
        match self {
            SqlValue::String(s) => s
                .trim()
                .parse()
                .map_err(|_| Error::conversion(s.trim(), "i16")),
            other => other
                .as_i64()
                .map(|v| v as i16)
                .map_err(|_| Error::conversion(other.to_string(), "i16")),
        }
    }

    pub fn as_i32(&self) -> Result<i32> {
        match self {
            SqlValue::String(s) => s
                .trim()
                .parse()
                .map_err(|_| Error::conversion(s.trim(), "i32")),
            other => other
                .as_i64()
                .map(|v| v as i32)
                .map_err(|_| Error::conversion(other.to_string(), "i32")),
        }
    }

    pub fn as_f64(&self) -> Result<f64> {
        match self {
            SqlValue::Null => Ok(0.0),
            SqlValue::Bool(b) => Ok(if *b { 1.0 } else { 0.0 }),
            SqlValue::TinyInt(i) => Ok(*i as f64),
            SqlValue::SmallInt(i) => Ok(*i as f64),
            SqlValue::Int(i) => Ok(*i as f64),
            SqlValue::BigInt(i) => Ok(*i as f64),
            SqlValue::Real(f) => Ok(*f as f64),
            SqlValue::Double(f) => Ok(*f),
            SqlValue::Decimal(d) => Ok(d.to_f64().unwrap_or(0.0)),
            SqlValue::String(s) => s
                .trim()
                .parse()
                .map_err(|_| Error::conversion(s.trim(), "f64")),
            other => Err(Error::conversion(other.to_string(), "f64")),
        }
    }

    pub fn as_f32(&self) -> Result<f32> {
        match self {
            SqlValue::String(s) => s
                .trim()
                .parse()
                .map_err(|_| Error::conversion(s.trim(), "f32")),
            other => other
                .as_f64()
                .map(|v| v as f32)
                .map_err(|_| Error::conversion(other.to_string(), "f32")),
        }
    }

    pub fn as_i8_opt(&self) -> Result<Option<i8>> {
        match self {
            SqlValue::Null => Ok(None),
            other => other.as_i8().map(Some),
        }
    }

    pub fn as_i16_opt(&self) -> Result<Option<i16>> {
        match self {
            SqlValue::Null => Ok(None),
            other => other.as_i16().map(Some),
        }
    }

    pub fn as_i32_opt(&self) -> Result<Option<i32>> {
        match self {
            SqlValue::Null => Ok(None),
            other => other.as_i32().map(Some),
        }
    }

    pub fn as_i64_opt(&self) -> Result<Option<i64>> {
        match self {
            SqlValue::Null => Ok(None),
            other => other.as_i64().map(Some),
        }
    }

    pub fn as_f32_opt(&self) -> Result<Option<f32>> {
        match self {
            SqlValue::Null => Ok(None),
            other => other.as_f32().map(Some),
        }
    }

    pub fn as_f64_opt(&self) -> Result<Option<f64>> {
        match self {
            SqlValue::Null => Ok(None),
            other => other.as_f64().map(Some),
        }
    }

    pub fn as_decimal(&self) -> Result<Option<Decimal>> {
        match self {
            SqlValue::Null => Ok(None),
            SqlValue::Decimal(d) => Ok(Some(*d)),
            SqlValue::Bool(b) => Ok(Some(Decimal::from(*b as i32))),
            SqlValue::TinyInt(i) => Ok(Some(Decimal::from(*i))),
            SqlValue::SmallInt(i) => Ok(Some(Decimal::from(*i))),
            SqlValue::Int(i) => Ok(Some(Decimal::from(*i))),
            SqlValue::BigInt(i) => Ok(Some(Decimal::from(*i))),
            SqlValue::Real(f) => Decimal::from_f32(*f)
                .map(Some)
                .ok_or_else(|| Error::conversion(f.to_string(), "Decimal")),
            SqlValue::Double(f) => Decimal::from_f64(*f)
                .map(Some)
                .ok_or_else(|| Error::conversion(f.to_string(), "Decimal")),
            SqlValue::String(s) => s
                .trim()
                .parse()
                .map(Some)
                .map_err(|_| Error::conversion(s.trim(), "Decimal")),
            other => Err(Error::conversion(other.to_string(), "Decimal")),
        }
    }

    pub fn as_string(&self) -> Result<Option<String>> {
        match self {
            SqlValue::Null => Ok(None),
            SqlValue::String(s) => Ok(Some(s.clone())),
            SqlValue::Bool(b) => Ok(Some(b.to_string())),
            SqlValue::TinyInt(i) => Ok(Some(i.to_string())),
            SqlValue::SmallInt(i) => Ok(Some(i.to_string())),
            SqlValue::Int(i) => Ok(Some(i.to_string())),
            SqlValue::BigInt(i) => Ok(Some(i.to_string())),
            SqlValue::Real(f) => Ok(Some(f.to_string())),
            SqlValue::Double(f) => Ok(Some(f.to_string())),
            SqlValue::Decimal(d) => Ok(Some(d.to_string())),
            SqlValue::Date(d) => Ok(Some(d.format(DATE_ISO).to_string())),
            SqlValue::Time(t) => Ok(Some(t.format("%H:%M:%S").to_string())),
            SqlValue::Timestamp(ts) => Ok(Some(ts.format("%Y-%m-%d %H:%M:%S").to_string())),
            SqlValue::Bytes(b) => String::from_utf8(b.clone())
                .map(Some)
                .map_err(|_| Error::conversion(format!("<binary:{} bytes>", b.len()), "String")),
        }
    }

    pub fn as_bytes(&self) -> Result<Vec<u8>> {
        match self {
            SqlValue::Null => Ok(Vec::new()),
            SqlValue::Bytes(b) => Ok(b.clone()),
            SqlValue::String(s) => Ok(s.clone().into_bytes()),
            other => Err(Error::conversion(other.to_string(), "bytes")),
        }
    }

    pub fn as_bytes_opt(&self) -> Result<Option<Vec<u8>>> {
        match self {
            SqlValue::Null => Ok(None),
            other => other.as_bytes().map(Some),
        }
    }

    /// A time-of-day value converts to a date on the current calendar day;
    /// long-standing behavior callers depend on, surprising as it reads.
    pub fn as_date(&self) -> Result<Option<NaiveDate>> {
        match self {
            SqlValue::Null => Ok(None),
            SqlValue::Date(d) => Ok(Some(*d)),
            SqlValue::Timestamp(ts) => Ok(Some(ts.date())),
            SqlValue::Time(_) => Ok(Some(Local::now().date_naive())),
            SqlValue::String(s) => NaiveDate::parse_from_str(s.trim(), DATE_ISO)
                .map(Some)
                .map_err(|_| Error::conversion(s.trim(), "Date")),
            other => Err(Error::conversion(other.to_string(), "Date")),
        }
    }

    pub fn as_time(&self) -> Result<Option<NaiveTime>> {
        match self {
            SqlValue::Null => Ok(None),
            SqlValue::Time(t) => Ok(Some(*t)),
            SqlValue::Timestamp(ts) => Ok(Some(ts.time())),
            SqlValue::Date(_) => Ok(Some(NaiveTime::MIN)),
            SqlValue::String(s) => NaiveTime::parse_from_str(s.trim(), TIME_ISO)
                .map(Some)
                .map_err(|_| Error::conversion(s.trim(), "Time")),
            other => Err(Error::conversion(other.to_string(), "Time")),
        }
    }

    pub fn as_timestamp(&self) -> Result<Option<NaiveDateTime>> {
        match self {
            SqlValue::Null => Ok(None),
            SqlValue::Timestamp(ts) => Ok(Some(*ts)),
            SqlValue::Date(d) => Ok(Some(d.and_time(NaiveTime::MIN))),
            SqlValue::Time(t) => Ok(Some(Local::now().date_naive().and_time(*t))),
            SqlValue::String(s) => parse_datetime(s.trim())
                .map(Some)
                .ok_or_else(|| Error::conversion(s.trim(), "Timestamp")),
            other => Err(Error::conversion(other.to_string(), "Timestamp")),
        }
    }
}

/// Accepts the ISO datetime forms in descending precision, then a bare date
fn parse_datetime(s: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s, DATETIME_ISO)
        .or_else(|_| NaiveDateTime::parse_from_str(s, DATETIME_ISO_T))
        .or_else(|_| NaiveDateTime::parse_from_str(s, DATETIME_MINUTES))
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(s, DATE_ISO)
                .map(|d| d.and_time(NaiveTime::MIN))
                .ok()
        })
}

impl fmt::Display for SqlValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SqlValue::Null => write!(f, "NULL"),
            SqlValue::Bool(b) => write!(f, "{}", b),
            SqlValue::TinyInt(i) => write!(f, "{}", i),
            SqlValue::SmallInt(i) => write!(f, "{}", i),
            SqlValue::Int(i) => write!(f, "{}", i),
            SqlValue::BigInt(i) => write!(f, "{}", i),
            SqlValue::Real(v) => write!(f, "{}", v),
            SqlValue::Double(v) => write!(f, "{}", v),
            SqlValue::Decimal(d) => write!(f, "{}", d),
            SqlValue::Bytes(b) => write!(f, "<binary:{} bytes>", b.len()),
            SqlValue::String(s) => write!(f, "{}", s),
            SqlValue::Date(d) => write!(f, "{}", d.format(DATE_ISO)),
            SqlValue::Time(t) => write!(f, "{}", t.format("%H:%M:%S")),
            SqlValue::Timestamp(ts) => write!(f, "{}", ts.format("%Y-%m-%d %H:%M:%S")),
        }
    }
}

impl From<bool> for SqlValue {
    fn from(v: bool) -> Self {
        SqlValue::Bool(v)
    }
}

impl From<i8> for SqlValue {
    fn from(v: i8) -> Self {
        SqlValue::TinyInt(v)
    }
}

impl From<i16> for SqlValue {
    fn from(v: i16) -> Self {
        SqlValue::SmallInt(v)
    }
}

impl From<i32> for SqlValue {
    fn from(v: i32) -> Self {
        SqlValue::Int(v)
    }
}

impl From<i64> for SqlValue {
    fn from(v: i64) -> Self {
        SqlValue::BigInt(v)
    }
}

impl From<f32> for SqlValue {
    fn from(v: f32) -> Self {
        SqlValue::Real(v)
    }
}

impl From<f64> for SqlValue {
    fn from(v: f64) -> Self {
        SqlValue::Double(v)
    }
}

impl From<Decimal> for SqlValue {
    fn from(v: Decimal) -> Self {
        SqlValue::Decimal(v)
    }
}

impl From<String> for SqlValue {
    fn from(s: String) -> Self {
        SqlValue::String(s)
    }
}

impl From<&str> for SqlValue {
    fn from(s: &str) -> Self {
        SqlValue::String(s.to_string())
    }
}

impl From<Vec<u8>> for SqlValue {
    fn from(v: Vec<u8>) -> Self {
        SqlValue::Bytes(v)
    }
}

impl From<NaiveDate> for SqlValue {
    fn from(v: NaiveDate) -> Self {
        SqlValue::Date(v)
    }
}

impl From<NaiveTime> for SqlValue {
    fn from(v: NaiveTime) -> Self {
        SqlValue::Time(v)
    }
}

impl From<NaiveDateTime> for SqlValue {
    fn from(v: NaiveDateTime) -> Self {
        SqlValue::Timestamp(v)
    }
}

impl<T> From<Option<T>> for SqlValue
where
    T: Into<SqlValue>,
{
    fn from(v: Option<T>) -> Self {
        match v {
            Some(val) => val.into(),
            None => SqlValue::Null,
        }
    }
}

/// A cell value bound to its originating column: the declared kind plus the
/// 1-based position in the result shape. Position 0 means unattached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Value {
    value: SqlValue,
    kind: ColumnKind,
    index: usize,
}

impl Value {
    pub fn new(value: SqlValue, kind: ColumnKind, index: usize) -> Self {
        Self { value, kind, index }
    }

    /// Wrap a bare value, deriving the kind from its tag
    pub fn from_sql(value: SqlValue) -> Self {
        let kind = value.kind();
        Self {
            value,
            kind,
            index: 0,
        }
    }

    pub fn value(&self) -> &SqlValue {
        &self.value
    }

    pub fn into_sql(self) -> SqlValue {
        self.value
    }

    /// Declared column kind, which may be wider than the tag (a CHAR column
    /// still decodes into `SqlValue::String`)
    pub fn kind(&self) -> ColumnKind {
        self.kind
    }

    /// 1-based column position in the originating result shape
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn is_null(&self) -> bool {
        self.value.is_null()
    }

    pub fn as_bool(&self) -> bool {
        self.value.as_bool()
    }

    pub fn as_bool_opt(&self) -> Option<bool> {
        self.value.as_bool_opt()
    }

    pub fn as_i8(&self) -> Result<i8> {
        self.value.as_i8()
    }

    pub fn as_i16(&self) -> Result<i16> {
        self.value.as_i16()
    }

    pub fn as_i32(&self) -> Result<i32> {
        self.value.as_i32()
    }

    pub fn as_i64(&self) -> Result<i64> {
        self.value.as_i64()
    }

    pub fn as_f32(&self) -> Result<f32> {
        self.value.as_f32()
    }

    pub fn as_f64(&self) -> Result<f64> {
        self.value.as_f64()
    }

    pub fn as_i8_opt(&self) -> Result<Option<i8>> {
        self.value.as_i8_opt()
    }

    pub fn as_i16_opt(&self) -> Result<Option<i16>> {
        self.value.as_i16_opt()
    }

    pub fn as_i32_opt(&self) -> Result<Option<i32>> {
        self.value.as_i32_opt()
    }

    pub fn as_i64_opt(&self) -> Result<Option<i64>> {
        self.value.as_i64_opt()
    }

    pub fn as_f32_opt(&self) -> Result<Option<f32>> {
        self.value.as_f32_opt()
    }

    pub fn as_f64_opt(&self) -> Result<Option<f64>> {
        self.value.as_f64_opt()
    }

    pub fn as_decimal(&self) -> Result<Option<Decimal>> {
        self.value.as_decimal()
    }

    pub fn as_string(&self) -> Result<Option<String>> {
        self.value.as_string()
    }

    pub fn as_bytes(&self) -> Result<Vec<u8>> {
        self.value.as_bytes()
    }

    pub fn as_bytes_opt(&self) -> Result<Option<Vec<u8>>> {
        self.value.as_bytes_opt()
    }

    pub fn as_date(&self) -> Result<Option<NaiveDate>> {
        self.value.as_date()
    }

    pub fn as_time(&self) -> Result<Option<NaiveTime>> {
        self.value.as_time()
    }

    pub fn as_timestamp(&self) -> Result<Option<NaiveDateTime>> {
        self.value.as_timestamp()
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}
