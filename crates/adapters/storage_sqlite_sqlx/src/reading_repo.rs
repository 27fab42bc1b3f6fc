//! `SQLite` implementation of [`ReadingRepository`].

use std::future::Future;
use std::str::FromStr;

use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row, SqlitePool};

use coredata_app::ports::ReadingRepository;
use coredata_domain::error::{CoreDataError, NotFoundError};
use coredata_domain::id::ReadingId;
use coredata_domain::reading::Reading;
use coredata_domain::time::{Millis, now_millis};

use crate::error::{StorageError, decode_error};
use crate::{sql_count, sql_limit};

/// Wrapper for converting database rows into domain [`Reading`].
pub(crate) struct Wrapper(pub(crate) Reading);

impl Wrapper {
    fn maybe(value: Option<Self>) -> Option<Reading> {
        value.map(|w| w.0)
    }

    pub(crate) fn unwrap_all(rows: Vec<Self>) -> Vec<Reading> {
        rows.into_iter().map(|w| w.0).collect()
    }
}

impl<'r> FromRow<'r, SqliteRow> for Wrapper {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let id: String = row.try_get("id")?;
        let id = ReadingId::from_str(&id).map_err(decode_error)?;

        Ok(Self(Reading {
            id,
            name: row.try_get("name")?,
            value: row.try_get("value")?,
            device: row.try_get("device")?,
            origin: row.try_get("origin")?,
            pushed: row.try_get("pushed")?,
            created: row.try_get("created")?,
            modified: row.try_get("modified")?,
        }))
    }
}

const INSERT: &str = "INSERT INTO readings (id, name, value, device, origin, pushed, created, modified) VALUES (?, ?, ?, ?, ?, ?, ?, ?)";
const SELECT_BY_ID: &str = "SELECT * FROM readings WHERE id = ?";
const SELECT_ALL: &str = "SELECT * FROM readings ORDER BY created DESC, rowid DESC";
const COUNT: &str = "SELECT COUNT(*) FROM readings";
const UPDATE: &str =
    "UPDATE readings SET name = ?, value = ?, origin = ?, pushed = ?, modified = ? WHERE id = ?";
const DELETE_BY_ID: &str = "DELETE FROM readings WHERE id = ?";
const DELETE_ALL: &str = "DELETE FROM readings";
const SELECT_BY_DEVICE: &str =
    "SELECT * FROM readings WHERE device = ? ORDER BY created DESC, rowid DESC LIMIT ?";
const SELECT_BY_NAME: &str =
    "SELECT * FROM readings WHERE name = ? ORDER BY created DESC, rowid DESC LIMIT ?";
const SELECT_BY_NAMES: &str = "SELECT * FROM readings WHERE name IN (SELECT value FROM json_each(?)) ORDER BY created DESC, rowid DESC LIMIT ?";
const SELECT_BY_DEVICE_AND_NAME: &str = "SELECT * FROM readings WHERE device = ? AND name = ? ORDER BY created DESC, rowid DESC LIMIT ?";
const SELECT_BY_CREATED: &str = "SELECT * FROM readings WHERE created >= ? AND created <= ? ORDER BY created DESC, rowid DESC LIMIT ?";

/// `SQLite`-backed reading repository.
#[derive(Clone)]
pub struct SqliteReadingRepository {
    pool: SqlitePool,
}

impl SqliteReadingRepository {
    /// Create a new repository using the given connection pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl ReadingRepository for SqliteReadingRepository {
    fn create(
        &self,
        mut reading: Reading,
    ) -> impl Future<Output = Result<Reading, CoreDataError>> + Send {
        let pool = self.pool.clone();
        async move {
            let ts = now_millis();
            reading.created = ts;
            reading.modified = ts;

            sqlx::query(INSERT)
                .bind(reading.id.to_string())
                .bind(&reading.name)
                .bind(&reading.value)
                .bind(&reading.device)
                .bind(reading.origin)
                .bind(reading.pushed)
                .bind(reading.created)
                .bind(reading.modified)
                .execute(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(reading)
        }
    }

    fn get_by_id(
        &self,
        id: ReadingId,
    ) -> impl Future<Output = Result<Option<Reading>, CoreDataError>> + Send {
        let pool = self.pool.clone();
        async move {
            let row: Option<Wrapper> = sqlx::query_as(SELECT_BY_ID)
                .bind(id.to_string())
                .fetch_optional(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(Wrapper::maybe(row))
        }
    }

    fn get_all(&self) -> impl Future<Output = Result<Vec<Reading>, CoreDataError>> + Send {
        let pool = self.pool.clone();
        async move {
            let rows: Vec<Wrapper> = sqlx::query_as(SELECT_ALL)
                .fetch_all(&pool)
                .await
                .map_err(StorageError::from)?;
            Ok(Wrapper::unwrap_all(rows))
        }
    }

    fn count(&self) -> impl Future<Output = Result<u64, CoreDataError>> + Send {
        let pool = self.pool.clone();
        async move {
            let count: i64 = sqlx::query_scalar(COUNT)
                .fetch_one(&pool)
                .await
                .map_err(StorageError::from)?;
            Ok(sql_count(count))
        }
    }

    fn update(
        &self,
        mut reading: Reading,
    ) -> impl Future<Output = Result<Reading, CoreDataError>> + Send {
        let pool = self.pool.clone();
        async move {
            reading.modified = now_millis();
            let result = sqlx::query(UPDATE)
                .bind(&reading.name)
                .bind(&reading.value)
                .bind(reading.origin)
                .bind(reading.pushed)
                .bind(reading.modified)
                .bind(reading.id.to_string())
                .execute(&pool)
                .await
                .map_err(StorageError::from)?;

            if result.rows_affected() == 0 {
                return Err(NotFoundError {
                    entity: "Reading",
                    id: reading.id.to_string(),
                }
                .into());
            }
            Ok(reading)
        }
    }

    fn delete(&self, id: ReadingId) -> impl Future<Output = Result<(), CoreDataError>> + Send {
        let pool = self.pool.clone();
        async move {
            sqlx::query(DELETE_BY_ID)
                .bind(id.to_string())
                .execute(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(())
        }
    }

    fn delete_all(&self) -> impl Future<Output = Result<u64, CoreDataError>> + Send {
        let pool = self.pool.clone();
        async move {
            let result = sqlx::query(DELETE_ALL)
                .execute(&pool)
                .await
                .map_err(StorageError::from)?;
            Ok(result.rows_affected())
        }
    }

    fn find_by_device(
        &self,
        device: &str,
        limit: usize,
    ) -> impl Future<Output = Result<Vec<Reading>, CoreDataError>> + Send {
        let pool = self.pool.clone();
        let device = device.to_string();
        async move {
            let rows: Vec<Wrapper> = sqlx::query_as(SELECT_BY_DEVICE)
                .bind(device)
                .bind(sql_limit(limit))
                .fetch_all(&pool)
                .await
                .map_err(StorageError::from)?;
            Ok(Wrapper::unwrap_all(rows))
        }
    }

    fn find_by_name(
        &self,
        name: &str,
        limit: usize,
    ) -> impl Future<Output = Result<Vec<Reading>, CoreDataError>> + Send {
        let pool = self.pool.clone();
        let name = name.to_string();
        async move {
            let rows: Vec<Wrapper> = sqlx::query_as(SELECT_BY_NAME)
                .bind(name)
                .bind(sql_limit(limit))
                .fetch_all(&pool)
                .await
                .map_err(StorageError::from)?;
            Ok(Wrapper::unwrap_all(rows))
        }
    }

    fn find_by_names(
        &self,
        names: &[String],
        limit: usize,
    ) -> impl Future<Output = Result<Vec<Reading>, CoreDataError>> + Send {
        let pool = self.pool.clone();
        let names = serde_json::to_string(names);
        async move {
            let names = names.map_err(StorageError::from)?;
            let rows: Vec<Wrapper> = sqlx::query_as(SELECT_BY_NAMES)
                .bind(names)
                .bind(sql_limit(limit))
                .fetch_all(&pool)
                .await
                .map_err(StorageError::from)?;
            Ok(Wrapper::unwrap_all(rows))
        }
    }

    fn find_by_device_and_name(
        &self,
        device: &str,
        name: &str,
        limit: usize,
    ) -> impl Future<Output = Result<Vec<Reading>, CoreDataError>> + Send {
        let pool = self.pool.clone();
        let device = device.to_string();
        let name = name.to_string();
        async move {
            let rows: Vec<Wrapper> = sqlx::query_as(SELECT_BY_DEVICE_AND_NAME)
                .bind(device)
                .bind(name)
                .bind(sql_limit(limit))
                .fetch_all(&pool)
                .await
                .map_err(StorageError::from)?;
            Ok(Wrapper::unwrap_all(rows))
        }
    }

    fn find_by_created(
        &self,
        start: Millis,
        end: Millis,
        limit: usize,
    ) -> impl Future<Output = Result<Vec<Reading>, CoreDataError>> + Send {
        let pool = self.pool.clone();
        async move {
            let rows: Vec<Wrapper> = sqlx::query_as(SELECT_BY_CREATED)
                .bind(start)
                .bind(end)
                .bind(sql_limit(limit))
                .fetch_all(&pool)
                .await
                .map_err(StorageError::from)?;
            Ok(Wrapper::unwrap_all(rows))
        }
    }
}
