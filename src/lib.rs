//! sqlmason - dialect-aware SQL construction and value marshalling
//!
//! sqlmason renders finished SQL text for five database dialects and moves
//! typed values between result sets and application code:
//! - `QueryBuilder` with per-dialect pagination, case folding and LIKE/regex
//! - An ordered filter model compiled into WHERE/ORDER BY clauses
//! - A typed schema/column/value layer with a lenient coercion matrix
//! - Per-connection caches for schemas, primary keys and lookup lists
//! - A narrow async adapter seam with Postgres and MySQL implementations

// Enforce error handling best practices
#![cfg_attr(
    not(test),
    warn(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::panic,
        clippy::unimplemented,
        clippy::todo,
    )
)]
// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used,))]

pub mod builder;
pub mod cache;
pub mod config;
pub mod database;
pub mod error;
pub mod filter;
pub mod schema;

// Re-export main types for public API
pub use builder::dialects::{create_dialect, DatabaseBackend, Dialect};
pub use builder::foreign::{ForeignEntry, ForeignLink};
pub use builder::{MacroResolver, QueryBuilder, MAX_RECORDS};
pub use cache::{Caches, PrimaryKeyCache, QueryCache, SchemaCache, SoftDeleteCache};
pub use config::BuilderConfig;
pub use database::types::{codes, Column, ColumnKind, SqlValue, Value};
pub use database::{
    ColumnMeta, DatabaseAdapter, MySqlAdapter, PostgresAdapter, PrimaryKeyMeta, RowSet, TableKind,
    TableMeta,
};
pub use error::{Error, Result};
pub use filter::{Comparison, FilterData, FilterValue, Granularity, SortDirection};
pub use schema::Schema;

/// Prelude module for common imports
pub mod prelude {
    pub use crate::builder::foreign::{ForeignEntry, ForeignLink};
    pub use crate::builder::{MacroResolver, QueryBuilder};
    pub use crate::cache::Caches;
    pub use crate::config::BuilderConfig;
    pub use crate::database::types::{Column, ColumnKind, SqlValue, Value};
    pub use crate::database::{DatabaseAdapter, RowSet};
    pub use crate::error::{Error, Result};
    pub use crate::filter::{Comparison, FilterData, Granularity, SortDirection};
    pub use crate::schema::Schema;
}
