//! Storage-specific error type wrapping sqlx errors.

use coredata_domain::error::CoreDataError;

/// Errors originating from the `SQLite` storage layer.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// A query or connection failed.
    #[error("database error")]
    Database(#[from] sqlx::Error),

    /// Failed to encode or decode a stored JSON column.
    #[error("JSON column error")]
    Json(#[from] serde_json::Error),

    /// Failed to run migrations.
    #[error("migration error")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

impl From<StorageError> for CoreDataError {
    fn from(err: StorageError) -> Self {
        Self::Unavailable(Box::new(err))
    }
}

/// Wrap a column decoding failure the way sqlx expects from `FromRow`.
pub(crate) fn decode_error<E>(err: E) -> sqlx::Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    sqlx::Error::Decode(Box::new(err))
}
