//! # coredata-adapter-storage-sqlite-sqlx
//!
//! `SQLite` persistence adapter using [sqlx](https://docs.rs/sqlx).
//!
//! ## Responsibilities
//! - Implement the repository port traits defined in `coredata-app::ports::storage`
//! - Manage `SQLite` connection pool lifecycle
//! - Run database migrations (using sqlx embedded migrations)
//! - Map between domain types and database rows
//!
//! Each repository touches one table per statement; an event and its
//! readings are written by separate statements, never in one transaction.
//!
//! ## Dependency rule
//! Depends on `coredata-app` (for port traits) and `coredata-domain` (for domain types).
//! The `app` and `domain` crates must never reference this adapter.

pub mod error;
pub mod event_repo;
pub mod pool;
pub mod reading_repo;
pub mod value_descriptor_repo;

pub use event_repo::SqliteEventRepository;
pub use pool::{Config, Database};
pub use reading_repo::SqliteReadingRepository;
pub use value_descriptor_repo::SqliteValueDescriptorRepository;

/// Bind value for a `LIMIT` clause.
pub(crate) fn sql_limit(limit: usize) -> i64 {
    i64::try_from(limit).unwrap_or(i64::MAX)
}

/// Convert a `COUNT(*)` result.
pub(crate) fn sql_count(count: i64) -> u64 {
    u64::try_from(count).unwrap_or_default()
}
