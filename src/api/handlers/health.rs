use axum::{extract::State, http::StatusCode, Json};
use serde_json::{json, Value};
use std::sync::Arc;

use crate::store::DocumentStore;

pub type SharedStore = Arc<dyn DocumentStore>;

/// Health check endpoint - checks store connectivity
pub async fn health_check(State(store): State<SharedStore>) -> (StatusCode, Json<Value>) {
    match store.ping().await {
        Ok(()) => {
            tracing::debug!("Health check passed - store reachable");
            (
                StatusCode::OK,
                Json(json!({
                    "status": "healthy",
                    "store": "connected",
                    "version": env!("CARGO_PKG_VERSION")
                })),
            )
        }
        Err(e) => {
            tracing::error!(error = %e, "Health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "status": "unhealthy",
                    "store": "disconnected"
                })),
            )
        }
    }
}

/// Readiness check endpoint - ready once the store answers
pub async fn readiness_check(State(store): State<SharedStore>) -> (StatusCode, Json<Value>) {
    match store.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "status": "ready",
                "store": "connected"
            })),
        ),
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "status": "not ready",
                    "store": "disconnected"
                })),
            )
        }
    }
}

/// Liveness check endpoint - the process is up
pub async fn liveness_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "alive" })))
}
