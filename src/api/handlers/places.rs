use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};
use std::sync::Arc;

use crate::error::Result;
use crate::extractors::ApiJson;
use crate::models::{NewPlace, PlaceUpdate};
use crate::services::PlaceService;
use crate::validation::validate_id;

pub type SharedPlaceService = Arc<PlaceService>;

/// Read a place by id
pub async fn get_place(
    State(service): State<SharedPlaceService>,
    Path(pid): Path<String>,
) -> Result<Json<Value>> {
    validate_id("pid", &pid)?;
    let place = service.get_place(&pid).await?;
    Ok(Json(json!({ "place": place })))
}

/// List the places created by a user
pub async fn get_places_by_user(
    State(service): State<SharedPlaceService>,
    Path(uid): Path<String>,
) -> Result<Json<Value>> {
    validate_id("uid", &uid)?;
    let places = service.places_for_user(&uid).await?;
    Ok(Json(json!({ "places": places })))
}

/// Create a place, geocoding its address
pub async fn create_place(
    State(service): State<SharedPlaceService>,
    ApiJson(new_place): ApiJson<NewPlace>,
) -> Result<(StatusCode, Json<Value>)> {
    let place = service.create_place(new_place).await?;
    Ok((StatusCode::CREATED, Json(json!({ "place": place }))))
}

/// Update title and description of a place
pub async fn update_place(
    State(service): State<SharedPlaceService>,
    Path(pid): Path<String>,
    ApiJson(update): ApiJson<PlaceUpdate>,
) -> Result<Json<Value>> {
    validate_id("pid", &pid)?;
    let place = service.update_place(&pid, update).await?;
    Ok(Json(json!({ "place": place })))
}

/// Delete a place
pub async fn delete_place(
    State(service): State<SharedPlaceService>,
    Path(pid): Path<String>,
) -> Result<Json<Value>> {
    validate_id("pid", &pid)?;
    service.delete_place(&pid).await?;
    Ok(Json(json!({ "message": "Deleted place." })))
}
