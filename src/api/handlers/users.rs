use axum::{extract::State, http::StatusCode, Json};
use serde_json::{json, Value};
use std::sync::Arc;

use crate::error::Result;
use crate::extractors::ApiJson;
use crate::models::{LoginRequest, SignupRequest};
use crate::services::UserService;

pub type SharedUserService = Arc<UserService>;

pub async fn get_users(State(service): State<SharedUserService>) -> Result<Json<Value>> {
    let users = service.list_users().await?;
    Ok(Json(json!({ "users": users })))
}

pub async fn signup(
    State(service): State<SharedUserService>,
    ApiJson(request): ApiJson<SignupRequest>,
) -> Result<(StatusCode, Json<Value>)> {
    let user = service.signup(request).await?;
    Ok((StatusCode::CREATED, Json(json!({ "user": user }))))
}

pub async fn login(
    State(service): State<SharedUserService>,
    ApiJson(request): ApiJson<LoginRequest>,
) -> Result<Json<Value>> {
    let user = service.login(request).await?;
    Ok(Json(json!({ "message": "Logged in!", "user": user })))
}
