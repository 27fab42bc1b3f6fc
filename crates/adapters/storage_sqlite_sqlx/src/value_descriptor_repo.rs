//! `SQLite` implementation of [`ValueDescriptorRepository`].

use std::future::Future;
use std::str::FromStr;

use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row, SqlitePool};

use coredata_app::ports::ValueDescriptorRepository;
use coredata_domain::error::{CoreDataError, NotFoundError};
use coredata_domain::id::ValueDescriptorId;
use coredata_domain::time::now_millis;
use coredata_domain::value_descriptor::ValueDescriptor;

use crate::error::{StorageError, decode_error};

/// Wrapper for converting database rows into domain [`ValueDescriptor`].
struct Wrapper(ValueDescriptor);

impl Wrapper {
    fn maybe(value: Option<Self>) -> Option<ValueDescriptor> {
        value.map(|w| w.0)
    }

    fn unwrap_all(rows: Vec<Self>) -> Vec<ValueDescriptor> {
        rows.into_iter().map(|w| w.0).collect()
    }
}

impl<'r> FromRow<'r, SqliteRow> for Wrapper {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let id: String = row.try_get("id")?;
        let labels: String = row.try_get("labels")?;

        let id = ValueDescriptorId::from_str(&id).map_err(decode_error)?;
        let labels: Vec<String> = serde_json::from_str(&labels).map_err(decode_error)?;

        Ok(Self(ValueDescriptor {
            id,
            name: row.try_get("name")?,
            description: row.try_get("description")?,
            value_type: row.try_get("value_type")?,
            formatting: row.try_get("formatting")?,
            min: row.try_get("min")?,
            max: row.try_get("max")?,
            default_value: row.try_get("default_value")?,
            uom_label: row.try_get("uom_label")?,
            labels,
            origin: row.try_get("origin")?,
            created: row.try_get("created")?,
            modified: row.try_get("modified")?,
        }))
    }
}

const INSERT: &str = "INSERT INTO value_descriptors (id, name, description, value_type, formatting, min, max, default_value, uom_label, labels, origin, created, modified) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)";
const SELECT_BY_ID: &str = "SELECT * FROM value_descriptors WHERE id = ?";
const SELECT_BY_NAME: &str = "SELECT * FROM value_descriptors WHERE name = ?";
const SELECT_ALL: &str = "SELECT * FROM value_descriptors ORDER BY name";
const SELECT_BY_LABEL: &str = "SELECT * FROM value_descriptors WHERE EXISTS (SELECT 1 FROM json_each(value_descriptors.labels) WHERE json_each.value = ?) ORDER BY name";
const SELECT_BY_UOM_LABEL: &str = "SELECT * FROM value_descriptors WHERE uom_label = ? ORDER BY name";
const SELECT_BY_TYPE: &str = "SELECT * FROM value_descriptors WHERE value_type = ? ORDER BY name";
const UPDATE: &str = "UPDATE value_descriptors SET name = ?, description = ?, value_type = ?, formatting = ?, min = ?, max = ?, default_value = ?, uom_label = ?, labels = ?, origin = ?, modified = ? WHERE id = ?";
const DELETE_BY_ID: &str = "DELETE FROM value_descriptors WHERE id = ?";

/// `SQLite`-backed value descriptor repository.
#[derive(Clone)]
pub struct SqliteValueDescriptorRepository {
    pool: SqlitePool,
}

impl SqliteValueDescriptorRepository {
    /// Create a new repository using the given connection pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn fetch_where(
        &self,
        query: &'static str,
        value: String,
    ) -> Result<Vec<ValueDescriptor>, CoreDataError> {
        let rows: Vec<Wrapper> = sqlx::query_as(query)
            .bind(value)
            .fetch_all(&self.pool)
            .await
            .map_err(StorageError::from)?;
        Ok(Wrapper::unwrap_all(rows))
    }
}

impl ValueDescriptorRepository for SqliteValueDescriptorRepository {
    fn create(
        &self,
        mut descriptor: ValueDescriptor,
    ) -> impl Future<Output = Result<ValueDescriptor, CoreDataError>> + Send {
        let pool = self.pool.clone();
        async move {
            let ts = now_millis();
            descriptor.created = ts;
            descriptor.modified = ts;
            let labels = serde_json::to_string(&descriptor.labels).map_err(StorageError::from)?;

            sqlx::query(INSERT)
                .bind(descriptor.id.to_string())
                .bind(&descriptor.name)
                .bind(&descriptor.description)
                .bind(&descriptor.value_type)
                .bind(&descriptor.formatting)
                .bind(&descriptor.min)
                .bind(&descriptor.max)
                .bind(&descriptor.default_value)
                .bind(&descriptor.uom_label)
                .bind(labels)
                .bind(descriptor.origin)
                .bind(descriptor.created)
                .bind(descriptor.modified)
                .execute(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(descriptor)
        }
    }

    fn get_by_id(
        &self,
        id: ValueDescriptorId,
    ) -> impl Future<Output = Result<Option<ValueDescriptor>, CoreDataError>> + Send {
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

    fn get_by_name(
        &self,
        name: &str,
    ) -> impl Future<Output = Result<Option<ValueDescriptor>, CoreDataError>> + Send {
        let pool = self.pool.clone();
        let name = name.to_string();
        async move {
            let row: Option<Wrapper> = sqlx::query_as(SELECT_BY_NAME)
                .bind(name)
                .fetch_optional(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(Wrapper::maybe(row))
        }
    }

    fn get_all(&self) -> impl Future<Output = Result<Vec<ValueDescriptor>, CoreDataError>> + Send {
        let pool = self.pool.clone();
        async move {
            let rows: Vec<Wrapper> = sqlx::query_as(SELECT_ALL)
                .fetch_all(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(Wrapper::unwrap_all(rows))
        }
    }

    fn find_by_label(
        &self,
        label: &str,
    ) -> impl Future<Output = Result<Vec<ValueDescriptor>, CoreDataError>> + Send {
        self.fetch_where(SELECT_BY_LABEL, label.to_string())
    }

    fn find_by_uom_label(
        &self,
        uom_label: &str,
    ) -> impl Future<Output = Result<Vec<ValueDescriptor>, CoreDataError>> + Send {
        self.fetch_where(SELECT_BY_UOM_LABEL, uom_label.to_string())
    }

    fn find_by_type(
        &self,
        value_type: &str,
    ) -> impl Future<Output = Result<Vec<ValueDescriptor>, CoreDataError>> + Send {
        self.fetch_where(SELECT_BY_TYPE, value_type.to_string())
    }

    fn update(
        &self,
        mut descriptor: ValueDescriptor,
    ) -> impl Future<Output = Result<ValueDescriptor, CoreDataError>> + Send {
        let pool = self.pool.clone();
        async move {
            descriptor.modified = now_millis();
            let labels = serde_json::to_string(&descriptor.labels).map_err(StorageError::from)?;

            let result = sqlx::query(UPDATE)
                .bind(&descriptor.name)
                .bind(&descriptor.description)
                .bind(&descriptor.value_type)
                .bind(&descriptor.formatting)
                .bind(&descriptor.min)
                .bind(&descriptor.max)
                .bind(&descriptor.default_value)
                .bind(&descriptor.uom_label)
                .bind(labels)
                .bind(descriptor.origin)
                .bind(descriptor.modified)
                .bind(descriptor.id.to_string())
                .execute(&pool)
                .await
                .map_err(StorageError::from)?;

            if result.rows_affected() == 0 {
                return Err(NotFoundError {
                    entity: "ValueDescriptor",
                    id: descriptor.id.to_string(),
                }
                .into());
            }
            Ok(descriptor)
        }
    }

    fn delete(
        &self,
        id: ValueDescriptorId,
    ) -> impl Future<Output = Result<(), CoreDataError>> + Send {
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
}
