use axum::{
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde_json::Value;

use super::handlers::health::{health_check, liveness_check, readiness_check, SharedStore};
use super::handlers::places::{
    create_place, delete_place, get_place, get_places_by_user, update_place, SharedPlaceService,
};
use super::handlers::users::{get_users, login, signup, SharedUserService};
use crate::error::error_body;

pub fn place_routes(service: SharedPlaceService) -> Router {
    Router::new()
        .route("/api/places", post(create_place))
        .route("/api/places/user/:uid", get(get_places_by_user))
        .route(
            "/api/places/:pid",
            get(get_place).patch(update_place).delete(delete_place),
        )
        .with_state(service)
}

pub fn user_routes(service: SharedUserService) -> Router {
    Router::new()
        .route("/api/users", get(get_users))
        .route("/api/users/signup", post(signup))
        .route("/api/users/login", post(login))
        .with_state(service)
}

pub fn health_routes(store: SharedStore) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/health/ready", get(readiness_check))
        .route("/health/live", get(liveness_check))
        .with_state(store)
}

pub async fn route_not_found() -> (StatusCode, Json<Value>) {
    (
        StatusCode::NOT_FOUND,
        Json(error_body("Could not find this route.")),
    )
}
