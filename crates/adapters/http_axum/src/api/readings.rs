//! JSON REST handlers for readings.

use axum::Json;
use axum::extract::{Path, State};
use serde::Deserialize;

use coredata_app::services::parse_id;
use coredata_domain::reading::{Reading, ReadingPatch};
use coredata_domain::time::Millis;

use crate::api::{AddResponse, CountResponse, DeleteResponse, GetResponse, ListResponse, bounded};
use crate::error::ApiError;
use crate::state::{AppState, Backend};

/// Request body for a reading, standalone or inside an event.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddReadingRequest {
    pub name: String,
    pub value: String,
    /// Ignored inside an event; the event's device wins.
    #[serde(default)]
    pub device: String,
    #[serde(default)]
    pub origin: Millis,
}

impl From<AddReadingRequest> for Reading {
    fn from(req: AddReadingRequest) -> Self {
        Reading::new(req.name, req.value)
            .with_device(req.device)
            .with_origin(req.origin)
    }
}

/// Request body for updating a reading.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateReadingRequest {
    pub id: String,
    pub value: Option<String>,
    pub name: Option<String>,
    pub origin: Option<Millis>,
}

/// `GET /api/v1/reading`
pub async fn list<B: Backend>(
    State(state): State<AppState<B>>,
) -> Result<ListResponse<Reading>, ApiError> {
    let readings = state.reading_service.list_readings().await?;
    bounded(readings, state.read_max_limit)
}

/// `POST /api/v1/reading`
pub async fn add<B: Backend>(
    State(state): State<AppState<B>>,
    Json(req): Json<AddReadingRequest>,
) -> Result<AddResponse, ApiError> {
    let outcome = state.reading_service.add_reading(req.into()).await?;
    Ok(outcome.into())
}

/// `PUT /api/v1/reading`
pub async fn update<B: Backend>(
    State(state): State<AppState<B>>,
    Json(req): Json<UpdateReadingRequest>,
) -> Result<GetResponse<Reading>, ApiError> {
    let patch = ReadingPatch {
        id: parse_id("Reading", &req.id)?,
        value: req.value,
        name: req.name,
        origin: req.origin,
    };
    let reading = state.reading_service.update_reading(patch).await?;
    Ok(GetResponse::Ok(Json(reading)))
}

/// `GET /api/v1/reading/count`
pub async fn count<B: Backend>(
    State(state): State<AppState<B>>,
) -> Result<CountResponse, ApiError> {
    let count = state.reading_service.count_readings().await?;
    Ok(CountResponse::Ok(count))
}

/// `GET /api/v1/reading/{id}`
pub async fn get<B: Backend>(
    State(state): State<AppState<B>>,
    Path(id): Path<String>,
) -> Result<GetResponse<Reading>, ApiError> {
    let reading = state
        .reading_service
        .get_reading(parse_id("Reading", &id)?)
        .await?;
    Ok(GetResponse::Ok(Json(reading)))
}

/// `DELETE /api/v1/reading/id/{id}`
pub async fn delete<B: Backend>(
    State(state): State<AppState<B>>,
    Path(id): Path<String>,
) -> Result<DeleteResponse, ApiError> {
    state
        .reading_service
        .delete_reading(parse_id("Reading", &id)?)
        .await?;
    Ok(DeleteResponse::NoContent)
}

/// `GET /api/v1/reading/device/{device}/{limit}`
pub async fn by_device<B: Backend>(
    State(state): State<AppState<B>>,
    Path((device, limit)): Path<(String, usize)>,
) -> Result<ListResponse<Reading>, ApiError> {
    let readings = state
        .reading_service
        .readings_by_device(&device, limit)
        .await?;
    Ok(ListResponse::Ok(Json(readings)))
}

/// `GET /api/v1/reading/name/{name}/{limit}`
pub async fn by_name<B: Backend>(
    State(state): State<AppState<B>>,
    Path((name, limit)): Path<(String, usize)>,
) -> Result<ListResponse<Reading>, ApiError> {
    let readings = state
        .reading_service
        .readings_by_value_descriptor(&name, limit)
        .await?;
    Ok(ListResponse::Ok(Json(readings)))
}

/// `GET /api/v1/reading/name/{name}/device/{device}/{limit}`
pub async fn by_name_and_device<B: Backend>(
    State(state): State<AppState<B>>,
    Path((name, device, limit)): Path<(String, String, usize)>,
) -> Result<ListResponse<Reading>, ApiError> {
    let readings = state
        .reading_service
        .readings_by_value_descriptor_and_device(&name, &device, limit)
        .await?;
    Ok(ListResponse::Ok(Json(readings)))
}

/// `GET /api/v1/reading/uomlabel/{uom}/{limit}`
pub async fn by_uom_label<B: Backend>(
    State(state): State<AppState<B>>,
    Path((uom, limit)): Path<(String, usize)>,
) -> Result<ListResponse<Reading>, ApiError> {
    let readings = state
        .reading_service
        .readings_by_uom_label(&uom, limit)
        .await?;
    Ok(ListResponse::Ok(Json(readings)))
}

/// `GET /api/v1/reading/label/{label}/{limit}`
pub async fn by_label<B: Backend>(
    State(state): State<AppState<B>>,
    Path((label, limit)): Path<(String, usize)>,
) -> Result<ListResponse<Reading>, ApiError> {
    let readings = state.reading_service.readings_by_label(&label, limit).await?;
    Ok(ListResponse::Ok(Json(readings)))
}

/// `GET /api/v1/reading/type/{value_type}/{limit}`
pub async fn by_type<B: Backend>(
    State(state): State<AppState<B>>,
    Path((value_type, limit)): Path<(String, usize)>,
) -> Result<ListResponse<Reading>, ApiError> {
    let readings = state
        .reading_service
        .readings_by_type(&value_type, limit)
        .await?;
    Ok(ListResponse::Ok(Json(readings)))
}

/// `GET /api/v1/reading/range/{start}/{end}/{limit}`
pub async fn by_range<B: Backend>(
    State(state): State<AppState<B>>,
    Path((start, end, limit)): Path<(Millis, Millis, usize)>,
) -> Result<ListResponse<Reading>, ApiError> {
    let readings = state
        .reading_service
        .readings_by_created(start, end, limit)
        .await?;
    Ok(ListResponse::Ok(Json(readings)))
}
