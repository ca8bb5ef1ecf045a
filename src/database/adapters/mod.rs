//! Adapter implementations for the supported connection backends.
//!
//! Only PostgreSQL and MySQL ship with a live connector; the remaining
//! dialects are reachable through [`crate::builder::QueryBuilder`] for SQL
//! generation and through any custom [`crate::database::DatabaseAdapter`]
//! implementation supplied by the caller.

pub mod mysql;
pub mod postgres;

pub use mysql::MySqlAdapter;
pub use postgres::PostgresAdapter;
