use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::geocoding::GeocodeError;
use crate::store::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum PlacesError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    #[error("User exists already, please login instead.")]
    EmailTaken,

    #[error("Could not identify user, credentials seem to be wrong.")]
    InvalidCredentials,

    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),

    #[error("Geocoding service unavailable: {0}")]
    Upstream(String),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl PlacesError {
    pub fn status(&self) -> StatusCode {
        match self {
            PlacesError::Validation(_) | PlacesError::EmailTaken => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            PlacesError::NotFound(_) => StatusCode::NOT_FOUND,
            PlacesError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            PlacesError::Storage(_) | PlacesError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            PlacesError::Upstream(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl From<GeocodeError> for PlacesError {
    fn from(err: GeocodeError) -> Self {
        match err {
            GeocodeError::NotFound => PlacesError::NotFound(
                "Could not find location for the specified address.".to_string(),
            ),
            GeocodeError::Upstream(msg) => PlacesError::Upstream(msg),
        }
    }
}

impl IntoResponse for PlacesError {
    fn into_response(self) -> Response {
        let status = self.status();

        let message = match &self {
            PlacesError::Storage(e) => {
                tracing::error!(error = %e, "Storage error");
                "Something went wrong, please try again later.".to_string()
            }
            PlacesError::Internal(e) => {
                tracing::error!(error = %e, "Internal error");
                "An unknown error occurred.".to_string()
            }
            PlacesError::Upstream(e) => {
                tracing::error!(error = %e, "Geocoding upstream error");
                "Could not resolve the address right now, please try again later.".to_string()
            }
            _ => self.to_string(),
        };

        (status, Json(error_body(&message))).into_response()
    }
}

/// Body shape shared by every error response
pub fn error_body(message: &str) -> serde_json::Value {
    json!({ "message": message })
}

pub type Result<T> = std::result::Result<T, PlacesError>;
