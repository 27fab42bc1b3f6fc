//! JSON REST API handler modules, mounted under `/api/v1`.

#[allow(clippy::missing_errors_doc)]
pub mod events;
#[allow(clippy::missing_errors_doc)]
pub mod readings;
#[allow(clippy::missing_errors_doc)]
pub mod value_descriptors;

use std::fmt::Display;

use axum::{Json, Router};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get};
use serde::Serialize;

use coredata_domain::id::{SaveOutcome, UNSAVED};

use crate::error::ApiError;
use crate::state::{AppState, Backend};

/// A JSON list response.
pub enum ListResponse<T> {
    Ok(Json<Vec<T>>),
}

impl<T: Serialize> IntoResponse for ListResponse<T> {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// A single JSON record.
pub enum GetResponse<T> {
    Ok(Json<T>),
}

impl<T: Serialize> IntoResponse for GetResponse<T> {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// A bare number as plain text, for counts.
pub enum CountResponse {
    Ok(u64),
}

impl IntoResponse for CountResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(count) => count.to_string().into_response(),
        }
    }
}

/// Outcome of an ingestion: the new id, or `unsaved` when persistence is off.
pub enum AddResponse {
    Created(String),
    Accepted,
}

impl<I: Display> From<SaveOutcome<I>> for AddResponse {
    fn from(outcome: SaveOutcome<I>) -> Self {
        match outcome {
            SaveOutcome::Saved(id) => Self::Created(id.to_string()),
            SaveOutcome::Unsaved => Self::Accepted,
        }
    }
}

impl IntoResponse for AddResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Created(id) => (StatusCode::CREATED, id).into_response(),
            Self::Accepted => (StatusCode::ACCEPTED, UNSAVED).into_response(),
        }
    }
}

/// Possible responses from delete endpoints.
pub enum DeleteResponse {
    NoContent,
}

impl IntoResponse for DeleteResponse {
    fn into_response(self) -> Response {
        match self {
            Self::NoContent => StatusCode::NO_CONTENT.into_response(),
        }
    }
}

/// Refuse to return an unbounded listing larger than `limit`.
pub(crate) fn bounded<T>(items: Vec<T>, limit: usize) -> Result<ListResponse<T>, ApiError> {
    if items.len() > limit {
        return Err(ApiError::LimitExceeded { limit });
    }
    Ok(ListResponse::Ok(Json(items)))
}

/// `GET /api/v1/ping`
pub async fn ping() -> &'static str {
    "pong"
}

/// Build the `/api/v1` sub-router.
pub fn routes<B: Backend>() -> Router<AppState<B>> {
    Router::new()
        .route("/ping", get(ping))
        // Events
        .route(
            "/event",
            get(events::list::<B>)
                .post(events::add::<B>)
                .put(events::update::<B>),
        )
        .route("/event/count", get(events::count::<B>))
        .route("/event/count/{device}", get(events::count_by_device::<B>))
        .route("/event/scrub", delete(events::scrub::<B>))
        .route("/event/scruball", delete(events::scrub_all::<B>))
        .route("/event/{id}", get(events::get::<B>))
        .route(
            "/event/id/{id}",
            delete(events::delete::<B>).put(events::touch::<B>),
        )
        .route("/event/device/{device}", delete(events::delete_by_device::<B>))
        .route(
            "/event/device/{device}/{limit}",
            get(events::by_device::<B>),
        )
        .route(
            "/event/device/{device}/valuedescriptor/{name}/{limit}",
            get(events::readings_by_device_and_value_descriptor::<B>),
        )
        .route("/event/removeold/age/{age}", delete(events::remove_old::<B>))
        .route(
            "/event/range/{start}/{end}/{limit}",
            get(events::by_range::<B>),
        )
        // Readings
        .route(
            "/reading",
            get(readings::list::<B>)
                .post(readings::add::<B>)
                .put(readings::update::<B>),
        )
        .route("/reading/count", get(readings::count::<B>))
        .route("/reading/{id}", get(readings::get::<B>))
        .route("/reading/id/{id}", delete(readings::delete::<B>))
        .route(
            "/reading/device/{device}/{limit}",
            get(readings::by_device::<B>),
        )
        .route("/reading/name/{name}/{limit}", get(readings::by_name::<B>))
        .route(
            "/reading/name/{name}/device/{device}/{limit}",
            get(readings::by_name_and_device::<B>),
        )
        .route(
            "/reading/uomlabel/{uom}/{limit}",
            get(readings::by_uom_label::<B>),
        )
        .route("/reading/label/{label}/{limit}", get(readings::by_label::<B>))
        .route(
            "/reading/type/{value_type}/{limit}",
            get(readings::by_type::<B>),
        )
        .route(
            "/reading/range/{start}/{end}/{limit}",
            get(readings::by_range::<B>),
        )
        // Value descriptors
        .route(
            "/valuedescriptor",
            get(value_descriptors::list::<B>)
                .post(value_descriptors::add::<B>)
                .put(value_descriptors::update::<B>),
        )
        .route("/valuedescriptor/{id}", get(value_descriptors::get::<B>))
        .route(
            "/valuedescriptor/id/{id}",
            delete(value_descriptors::delete::<B>),
        )
        .route(
            "/valuedescriptor/name/{name}",
            get(value_descriptors::get_by_name::<B>).delete(value_descriptors::delete_by_name::<B>),
        )
        .route(
            "/valuedescriptor/uomlabel/{uom}",
            get(value_descriptors::by_uom_label::<B>),
        )
        .route(
            "/valuedescriptor/label/{label}",
            get(value_descriptors::by_label::<B>),
        )
        .route(
            "/valuedescriptor/devicename/{device}",
            get(value_descriptors::by_device_name::<B>),
        )
        .route(
            "/valuedescriptor/deviceid/{id}",
            get(value_descriptors::by_device_id::<B>),
        )
}
