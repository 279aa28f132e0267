use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, Request},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::de::DeserializeOwned;

use crate::error::error_body;

/// JSON body extractor whose rejections use the API's `{"message"}` error body
pub struct ApiJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(ApiJson(value)),
            Err(rejection) => {
                let (status, message) = match rejection {
                    // Well-formed JSON with missing or mistyped fields
                    JsonRejection::JsonDataError(err) => (
                        StatusCode::UNPROCESSABLE_ENTITY,
                        format!("Invalid inputs passed, please check your data: {}", err.body_text()),
                    ),
                    JsonRejection::JsonSyntaxError(err) => (
                        StatusCode::BAD_REQUEST,
                        format!("Failed to parse the request body as JSON: {}", err.body_text()),
                    ),
                    JsonRejection::MissingJsonContentType(_) => (
                        StatusCode::UNSUPPORTED_MEDIA_TYPE,
                        "Expected request with `Content-Type: application/json`".to_string(),
                    ),
                    JsonRejection::BytesRejection(err) => {
                        tracing::warn!(error = %err, "Failed to read request body");
                        (
                            StatusCode::BAD_REQUEST,
                            "Failed to read request body".to_string(),
                        )
                    }
                    _ => (StatusCode::BAD_REQUEST, "Failed to parse JSON".to_string()),
                };

                Err((status, Json(error_body(&message))).into_response())
            }
        }
    }
}
