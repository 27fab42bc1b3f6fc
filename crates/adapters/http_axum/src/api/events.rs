//! JSON REST handlers for events.

use axum::Json;
use axum::extract::{Path, State};
use serde::Deserialize;

use coredata_app::services::parse_id;
use coredata_domain::event::{Event, EventPatch};
use coredata_domain::reading::Reading;
use coredata_domain::time::Millis;

use crate::api::readings::AddReadingRequest;
use crate::api::{AddResponse, CountResponse, DeleteResponse, GetResponse, ListResponse, bounded};
use crate::error::ApiError;
use crate::state::{AppState, Backend};

/// Request body for ingesting an event.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddEventRequest {
    /// Device id or name; resolved before anything is stored.
    pub device: String,
    #[serde(default)]
    pub origin: Millis,
    #[serde(default)]
    pub readings: Vec<AddReadingRequest>,
}

impl From<AddEventRequest> for Event {
    fn from(req: AddEventRequest) -> Self {
        let readings = req.readings.into_iter().map(Reading::from).collect();
        Event::new(req.device, readings).with_origin(req.origin)
    }
}

/// Request body for updating an event.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEventRequest {
    pub id: String,
    pub device: Option<String>,
    pub pushed: Option<Millis>,
    pub origin: Option<Millis>,
}

/// `GET /api/v1/event`
pub async fn list<B: Backend>(
    State(state): State<AppState<B>>,
) -> Result<ListResponse<Event>, ApiError> {
    let events = state.event_service.list_events().await?;
    bounded(events, state.read_max_limit)
}

/// `POST /api/v1/event`
pub async fn add<B: Backend>(
    State(state): State<AppState<B>>,
    Json(req): Json<AddEventRequest>,
) -> Result<AddResponse, ApiError> {
    let outcome = state.event_service.add_event(req.into()).await?;
    Ok(outcome.into())
}

/// `PUT /api/v1/event`
pub async fn update<B: Backend>(
    State(state): State<AppState<B>>,
    Json(req): Json<UpdateEventRequest>,
) -> Result<GetResponse<Event>, ApiError> {
    let patch = EventPatch {
        id: parse_id("Event", &req.id)?,
        device: req.device,
        pushed: req.pushed,
        origin: req.origin,
    };
    let event = state.event_service.update_event(patch).await?;
    Ok(GetResponse::Ok(Json(event)))
}

/// `GET /api/v1/event/count`
pub async fn count<B: Backend>(
    State(state): State<AppState<B>>,
) -> Result<CountResponse, ApiError> {
    let count = state.event_service.count_events().await?;
    Ok(CountResponse::Ok(count))
}

/// `GET /api/v1/event/count/{device}`
pub async fn count_by_device<B: Backend>(
    State(state): State<AppState<B>>,
    Path(device): Path<String>,
) -> Result<CountResponse, ApiError> {
    let count = state.event_service.count_events_by_device(&device).await?;
    Ok(CountResponse::Ok(count))
}

/// `GET /api/v1/event/{id}`
pub async fn get<B: Backend>(
    State(state): State<AppState<B>>,
    Path(id): Path<String>,
) -> Result<GetResponse<Event>, ApiError> {
    let event = state
        .event_service
        .get_event(parse_id("Event", &id)?)
        .await?;
    Ok(GetResponse::Ok(Json(event)))
}

/// `DELETE /api/v1/event/id/{id}`
pub async fn delete<B: Backend>(
    State(state): State<AppState<B>>,
    Path(id): Path<String>,
) -> Result<DeleteResponse, ApiError> {
    state
        .event_service
        .delete_event(parse_id("Event", &id)?)
        .await?;
    Ok(DeleteResponse::NoContent)
}

/// `PUT /api/v1/event/id/{id}` marks the event as pushed.
pub async fn touch<B: Backend>(
    State(state): State<AppState<B>>,
    Path(id): Path<String>,
) -> Result<GetResponse<Event>, ApiError> {
    let event = state.event_service.touch(parse_id("Event", &id)?).await?;
    Ok(GetResponse::Ok(Json(event)))
}

/// `GET /api/v1/event/device/{device}/{limit}`
pub async fn by_device<B: Backend>(
    State(state): State<AppState<B>>,
    Path((device, limit)): Path<(String, usize)>,
) -> Result<ListResponse<Event>, ApiError> {
    let events = state.event_service.events_by_device(&device, limit).await?;
    Ok(ListResponse::Ok(Json(events)))
}

/// `DELETE /api/v1/event/device/{device}`
pub async fn delete_by_device<B: Backend>(
    State(state): State<AppState<B>>,
    Path(device): Path<String>,
) -> Result<CountResponse, ApiError> {
    let deleted = state.event_service.delete_by_device(&device).await?;
    Ok(CountResponse::Ok(deleted))
}

/// `GET /api/v1/event/device/{device}/valuedescriptor/{name}/{limit}`
pub async fn readings_by_device_and_value_descriptor<B: Backend>(
    State(state): State<AppState<B>>,
    Path((device, name, limit)): Path<(String, String, usize)>,
) -> Result<ListResponse<Reading>, ApiError> {
    let readings = state
        .event_service
        .readings_by_device_and_value_descriptor(&device, &name, limit)
        .await?;
    Ok(ListResponse::Ok(Json(readings)))
}

/// `DELETE /api/v1/event/removeold/age/{age}`
pub async fn remove_old<B: Backend>(
    State(state): State<AppState<B>>,
    Path(age): Path<Millis>,
) -> Result<CountResponse, ApiError> {
    let deleted = state.event_service.delete_by_age(age).await?;
    Ok(CountResponse::Ok(deleted))
}

/// `GET /api/v1/event/range/{start}/{end}/{limit}`
pub async fn by_range<B: Backend>(
    State(state): State<AppState<B>>,
    Path((start, end, limit)): Path<(Millis, Millis, usize)>,
) -> Result<ListResponse<Event>, ApiError> {
    let events = state
        .event_service
        .events_by_created(start, end, limit)
        .await?;
    Ok(ListResponse::Ok(Json(events)))
}

/// `DELETE /api/v1/event/scrub` removes events already pushed downstream.
pub async fn scrub<B: Backend>(
    State(state): State<AppState<B>>,
) -> Result<CountResponse, ApiError> {
    let deleted = state.event_service.purge_if_published().await?;
    Ok(CountResponse::Ok(deleted))
}

/// `DELETE /api/v1/event/scruball`
pub async fn scrub_all<B: Backend>(
    State(state): State<AppState<B>>,
) -> Result<CountResponse, ApiError> {
    let deleted = state.event_service.purge().await?;
    Ok(CountResponse::Ok(deleted))
}
