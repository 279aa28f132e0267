//! places: REST backend for a places and users directory.
//!
//! Places and users live in a [`store::DocumentStore`]. Creating or deleting a
//! place also updates the owning user's `places` list inside one store
//! transaction, see [`services::PlaceService`].

pub mod api;
pub mod config;
pub mod error;
pub mod extractors;
pub mod geocoding;
pub mod middleware;
pub mod models;
pub mod services;
pub mod store;
pub mod validation;

use std::sync::Arc;

use axum::Router;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use api::{health_routes, place_routes, route_not_found, user_routes};
use geocoding::Geocoder;
use middleware::{LoggingLayer, RequestIdLayer};
use services::{PlaceService, UserService};
use store::DocumentStore;

pub use error::{PlacesError, Result};

/// Wire services onto a store and geocoder and build the full router
pub fn build_router(
    store: Arc<dyn DocumentStore>,
    geocoder: Arc<dyn Geocoder>,
    max_transaction_retries: u32,
) -> Router {
    let place_service = Arc::new(PlaceService::new(
        store.clone(),
        geocoder,
        max_transaction_retries,
    ));
    let user_service = Arc::new(UserService::new(store.clone()));

    Router::new()
        .merge(place_routes(place_service))
        .merge(user_routes(user_service))
        .merge(health_routes(store))
        .fallback(route_not_found)
        .layer(LoggingLayer)
        .layer(RequestIdLayer)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}
