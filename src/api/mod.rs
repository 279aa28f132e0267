pub mod handlers;
pub mod routes;

pub use routes::{health_routes, place_routes, route_not_found, user_routes};
