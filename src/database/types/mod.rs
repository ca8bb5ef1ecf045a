//! Typed column and value layer shared by the builder, the schema cache and
//! the adapters

pub mod column;
pub mod kind;
pub mod value;

pub use column::Column;
pub use kind::{codes, ColumnKind};
pub use value::{SqlValue, Value};
