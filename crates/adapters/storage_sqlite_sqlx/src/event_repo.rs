//! `SQLite` implementation of [`EventRepository`].
//!
//! An event row keeps its reading ids as an ordered JSON array; loading an
//! event joins them back against the `readings` table in array order.

use std::future::Future;
use std::str::FromStr;

use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row, SqlitePool};

use coredata_app::ports::EventRepository;
use coredata_domain::error::{CoreDataError, NotFoundError};
use coredata_domain::event::Event;
use coredata_domain::id::EventId;
use coredata_domain::time::{Millis, now_millis};

use crate::error::{StorageError, decode_error};
use crate::reading_repo::Wrapper as ReadingWrapper;
use crate::{sql_count, sql_limit};

/// Event row; `readings` is still the raw JSON id array.
struct Wrapper {
    event: Event,
    readings: String,
}

impl<'r> FromRow<'r, SqliteRow> for Wrapper {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let id: String = row.try_get("id")?;
        let id = EventId::from_str(&id).map_err(decode_error)?;

        Ok(Self {
            event: Event {
                id,
                device: row.try_get("device")?,
                origin: row.try_get("origin")?,
                pushed: row.try_get("pushed")?,
                created: row.try_get("created")?,
                modified: row.try_get("modified")?,
                readings: Vec::new(),
            },
            readings: row.try_get("readings")?,
        })
    }
}

impl Wrapper {
    async fn load(self, pool: &SqlitePool) -> Result<Event, StorageError> {
        let rows: Vec<ReadingWrapper> = sqlx::query_as(SELECT_READINGS)
            .bind(&self.readings)
            .fetch_all(pool)
            .await?;
        let mut event = self.event;
        event.readings = ReadingWrapper::unwrap_all(rows);
        Ok(event)
    }

    async fn load_all(rows: Vec<Self>, pool: &SqlitePool) -> Result<Vec<Event>, StorageError> {
        let mut events = Vec::with_capacity(rows.len());
        for row in rows {
            events.push(row.load(pool).await?);
        }
        Ok(events)
    }
}

const INSERT: &str = "INSERT INTO events (id, device, origin, pushed, created, modified, readings) VALUES (?, ?, ?, ?, ?, ?, ?)";
const SELECT_BY_ID: &str = "SELECT * FROM events WHERE id = ?";
const SELECT_ALL: &str = "SELECT * FROM events ORDER BY created DESC, rowid DESC";
const SELECT_READINGS: &str = "SELECT r.* FROM json_each(?) AS j JOIN readings AS r ON r.id = j.value ORDER BY j.key";
const COUNT: &str = "SELECT COUNT(*) FROM events";
const COUNT_BY_DEVICE: &str = "SELECT COUNT(*) FROM events WHERE device = ?";
const SELECT_BY_DEVICE: &str =
    "SELECT * FROM events WHERE device = ? ORDER BY created DESC, rowid DESC LIMIT ?";
const SELECT_BY_CREATED: &str = "SELECT * FROM events WHERE created >= ? AND created <= ? ORDER BY created DESC, rowid DESC LIMIT ?";
const SELECT_OLDER_THAN: &str =
    "SELECT * FROM events WHERE created < ? ORDER BY created DESC, rowid DESC";
const SELECT_PUSHED: &str =
    "SELECT * FROM events WHERE pushed != 0 ORDER BY created DESC, rowid DESC";
const UPDATE: &str =
    "UPDATE events SET device = ?, pushed = ?, origin = ?, modified = ? WHERE id = ?";
const DELETE_BY_ID: &str = "DELETE FROM events WHERE id = ?";
const DELETE_ALL: &str = "DELETE FROM events";

/// `SQLite`-backed event repository.
#[derive(Clone)]
pub struct SqliteEventRepository {
    pool: SqlitePool,
}

impl SqliteEventRepository {
    /// Create a new repository using the given connection pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl EventRepository for SqliteEventRepository {
    fn create(&self, mut event: Event) -> impl Future<Output = Result<Event, CoreDataError>> + Send {
        let pool = self.pool.clone();
        async move {
            let ts = now_millis();
            event.created = ts;
            event.modified = ts;
            let reading_ids: Vec<String> = event.readings.iter().map(|r| r.id.to_string()).collect();
            let reading_ids = serde_json::to_string(&reading_ids).map_err(StorageError::from)?;

            sqlx::query(INSERT)
                .bind(event.id.to_string())
                .bind(&event.device)
                .bind(event.origin)
                .bind(event.pushed)
                .bind(event.created)
                .bind(event.modified)
                .bind(reading_ids)
                .execute(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(event)
        }
    }

    fn get_by_id(
        &self,
        id: EventId,
    ) -> impl Future<Output = Result<Option<Event>, CoreDataError>> + Send {
        let pool = self.pool.clone();
        async move {
            let row: Option<Wrapper> = sqlx::query_as(SELECT_BY_ID)
                .bind(id.to_string())
                .fetch_optional(&pool)
                .await
                .map_err(StorageError::from)?;

            match row {
                Some(row) => Ok(Some(row.load(&pool).await?)),
                None => Ok(None),
            }
        }
    }

    fn get_all(&self) -> impl Future<Output = Result<Vec<Event>, CoreDataError>> + Send {
        let pool = self.pool.clone();
        async move {
            let rows: Vec<Wrapper> = sqlx::query_as(SELECT_ALL)
                .fetch_all(&pool)
                .await
                .map_err(StorageError::from)?;
            Ok(Wrapper::load_all(rows, &pool).await?)
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

    fn count_by_device(&self, device: &str) -> impl Future<Output = Result<u64, CoreDataError>> + Send {
        let pool = self.pool.clone();
        let device = device.to_string();
        async move {
            let count: i64 = sqlx::query_scalar(COUNT_BY_DEVICE)
                .bind(device)
                .fetch_one(&pool)
                .await
                .map_err(StorageError::from)?;
            Ok(sql_count(count))
        }
    }

    fn find_by_device(
        &self,
        device: &str,
        limit: usize,
    ) -> impl Future<Output = Result<Vec<Event>, CoreDataError>> + Send {
        let pool = self.pool.clone();
        let device = device.to_string();
        async move {
            let rows: Vec<Wrapper> = sqlx::query_as(SELECT_BY_DEVICE)
                .bind(device)
                .bind(sql_limit(limit))
                .fetch_all(&pool)
                .await
                .map_err(StorageError::from)?;
            Ok(Wrapper::load_all(rows, &pool).await?)
        }
    }

    fn find_by_created(
        &self,
        start: Millis,
        end: Millis,
        limit: usize,
    ) -> impl Future<Output = Result<Vec<Event>, CoreDataError>> + Send {
        let pool = self.pool.clone();
        async move {
            let rows: Vec<Wrapper> = sqlx::query_as(SELECT_BY_CREATED)
                .bind(start)
                .bind(end)
                .bind(sql_limit(limit))
                .fetch_all(&pool)
                .await
                .map_err(StorageError::from)?;
            Ok(Wrapper::load_all(rows, &pool).await?)
        }
    }

    fn find_older_than(
        &self,
        cutoff: Millis,
    ) -> impl Future<Output = Result<Vec<Event>, CoreDataError>> + Send {
        let pool = self.pool.clone();
        async move {
            let rows: Vec<Wrapper> = sqlx::query_as(SELECT_OLDER_THAN)
                .bind(cutoff)
                .fetch_all(&pool)
                .await
                .map_err(StorageError::from)?;
            Ok(Wrapper::load_all(rows, &pool).await?)
        }
    }

    fn find_pushed(&self) -> impl Future<Output = Result<Vec<Event>, CoreDataError>> + Send {
        let pool = self.pool.clone();
        async move {
            let rows: Vec<Wrapper> = sqlx::query_as(SELECT_PUSHED)
                .fetch_all(&pool)
                .await
                .map_err(StorageError::from)?;
            Ok(Wrapper::load_all(rows, &pool).await?)
        }
    }

    fn update(&self, event: Event) -> impl Future<Output = Result<Event, CoreDataError>> + Send {
        let pool = self.pool.clone();
        async move {
            let result = sqlx::query(UPDATE)
                .bind(&event.device)
                .bind(event.pushed)
                .bind(event.origin)
                .bind(now_millis())
                .bind(event.id.to_string())
                .execute(&pool)
                .await
                .map_err(StorageError::from)?;

            if result.rows_affected() == 0 {
                return Err(NotFoundError {
                    entity: "Event",
                    id: event.id.to_string(),
                }
                .into());
            }

            let row: Wrapper = sqlx::query_as(SELECT_BY_ID)
                .bind(event.id.to_string())
                .fetch_one(&pool)
                .await
                .map_err(StorageError::from)?;
            Ok(row.load(&pool).await?)
        }
    }

    fn delete(&self, id: EventId) -> impl Future<Output = Result<(), CoreDataError>> + Send {
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
}
