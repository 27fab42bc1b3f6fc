//! JSON REST handlers for value descriptors.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;

use coredata_app::services::parse_id;
use coredata_domain::time::Millis;
use coredata_domain::value_descriptor::{ValueDescriptor, ValueDescriptorPatch};

use crate::api::{DeleteResponse, GetResponse, ListResponse, bounded};
use crate::error::ApiError;
use crate::state::{AppState, Backend};

/// Request body for registering a value descriptor.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateValueDescriptorRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, rename = "type")]
    pub value_type: String,
    #[serde(default)]
    pub formatting: String,
    #[serde(default)]
    pub min: String,
    #[serde(default)]
    pub max: String,
    #[serde(default)]
    pub default_value: String,
    #[serde(default)]
    pub uom_label: String,
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub origin: Millis,
}

/// Request body for updating a value descriptor, located by `id` or `name`.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateValueDescriptorRequest {
    pub id: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub value_type: Option<String>,
    pub formatting: Option<String>,
    pub min: Option<String>,
    pub max: Option<String>,
    pub default_value: Option<String>,
    pub uom_label: Option<String>,
    pub labels: Option<Vec<String>>,
    pub origin: Option<Millis>,
}

/// Possible responses from the create endpoint.
pub enum CreateResponse {
    Created(String),
}

impl IntoResponse for CreateResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Created(id) => (StatusCode::CREATED, id).into_response(),
        }
    }
}

/// `GET /api/v1/valuedescriptor`
pub async fn list<B: Backend>(
    State(state): State<AppState<B>>,
) -> Result<ListResponse<ValueDescriptor>, ApiError> {
    let descriptors = state
        .value_descriptor_service
        .list_value_descriptors()
        .await?;
    bounded(descriptors, state.read_max_limit)
}

/// `POST /api/v1/valuedescriptor`
pub async fn add<B: Backend>(
    State(state): State<AppState<B>>,
    Json(req): Json<CreateValueDescriptorRequest>,
) -> Result<CreateResponse, ApiError> {
    let mut builder = ValueDescriptor::builder()
        .name(req.name)
        .description(req.description)
        .value_type(req.value_type)
        .formatting(req.formatting)
        .min(req.min)
        .max(req.max)
        .default_value(req.default_value)
        .uom_label(req.uom_label)
        .origin(req.origin);
    for label in req.labels {
        builder = builder.label(label);
    }

    let descriptor = builder.build()?;
    let created = state
        .value_descriptor_service
        .add_value_descriptor(descriptor)
        .await?;
    Ok(CreateResponse::Created(created.id.to_string()))
}

/// `PUT /api/v1/valuedescriptor`
pub async fn update<B: Backend>(
    State(state): State<AppState<B>>,
    Json(req): Json<UpdateValueDescriptorRequest>,
) -> Result<GetResponse<ValueDescriptor>, ApiError> {
    let id = req
        .id
        .filter(|id| !id.is_empty())
        .map(|id| parse_id("ValueDescriptor", &id))
        .transpose()?;
    let patch = ValueDescriptorPatch {
        id,
        name: req.name,
        description: req.description,
        value_type: req.value_type,
        formatting: req.formatting,
        min: req.min,
        max: req.max,
        default_value: req.default_value,
        uom_label: req.uom_label,
        labels: req.labels,
        origin: req.origin,
    };
    let updated = state
        .value_descriptor_service
        .update_value_descriptor(patch)
        .await?;
    Ok(GetResponse::Ok(Json(updated)))
}

/// `GET /api/v1/valuedescriptor/{id}`
pub async fn get<B: Backend>(
    State(state): State<AppState<B>>,
    Path(id): Path<String>,
) -> Result<GetResponse<ValueDescriptor>, ApiError> {
    let descriptor = state
        .value_descriptor_service
        .get_value_descriptor(parse_id("ValueDescriptor", &id)?)
        .await?;
    Ok(GetResponse::Ok(Json(descriptor)))
}

/// `DELETE /api/v1/valuedescriptor/id/{id}`
pub async fn delete<B: Backend>(
    State(state): State<AppState<B>>,
    Path(id): Path<String>,
) -> Result<DeleteResponse, ApiError> {
    state
        .value_descriptor_service
        .delete_value_descriptor(parse_id("ValueDescriptor", &id)?)
        .await?;
    Ok(DeleteResponse::NoContent)
}

/// `GET /api/v1/valuedescriptor/name/{name}`
pub async fn get_by_name<B: Backend>(
    State(state): State<AppState<B>>,
    Path(name): Path<String>,
) -> Result<GetResponse<ValueDescriptor>, ApiError> {
    let descriptor = state
        .value_descriptor_service
        .get_value_descriptor_by_name(&name)
        .await?;
    Ok(GetResponse::Ok(Json(descriptor)))
}

/// `DELETE /api/v1/valuedescriptor/name/{name}`
pub async fn delete_by_name<B: Backend>(
    State(state): State<AppState<B>>,
    Path(name): Path<String>,
) -> Result<DeleteResponse, ApiError> {
    state
        .value_descriptor_service
        .delete_value_descriptor_by_name(&name)
        .await?;
    Ok(DeleteResponse::NoContent)
}

/// `GET /api/v1/valuedescriptor/uomlabel/{uom}`
pub async fn by_uom_label<B: Backend>(
    State(state): State<AppState<B>>,
    Path(uom): Path<String>,
) -> Result<ListResponse<ValueDescriptor>, ApiError> {
    let descriptors = state
        .value_descriptor_service
        .value_descriptors_by_uom_label(&uom)
        .await?;
    Ok(ListResponse::Ok(Json(descriptors)))
}

/// `GET /api/v1/valuedescriptor/label/{label}`
pub async fn by_label<B: Backend>(
    State(state): State<AppState<B>>,
    Path(label): Path<String>,
) -> Result<ListResponse<ValueDescriptor>, ApiError> {
    let descriptors = state
        .value_descriptor_service
        .value_descriptors_by_label(&label)
        .await?;
    Ok(ListResponse::Ok(Json(descriptors)))
}

/// `GET /api/v1/valuedescriptor/devicename/{device}`
pub async fn by_device_name<B: Backend>(
    State(state): State<AppState<B>>,
    Path(device): Path<String>,
) -> Result<ListResponse<ValueDescriptor>, ApiError> {
    let descriptors = state
        .value_descriptor_service
        .value_descriptors_for_device_name(&device)
        .await?;
    Ok(ListResponse::Ok(Json(descriptors)))
}

/// `GET /api/v1/valuedescriptor/deviceid/{id}`
pub async fn by_device_id<B: Backend>(
    State(state): State<AppState<B>>,
    Path(id): Path<String>,
) -> Result<ListResponse<ValueDescriptor>, ApiError> {
    let descriptors = state
        .value_descriptor_service
        .value_descriptors_for_device_id(&id)
        .await?;
    Ok(ListResponse::Ok(Json(descriptors)))
}
