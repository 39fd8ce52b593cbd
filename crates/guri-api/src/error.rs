use axum::{
    extract::{
        multipart::{MultipartError, MultipartRejection},
        rejection::JsonRejection,
    },
    http::{StatusCode, Uri},
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use guri_persist::PersistError;
use guri_types::{ApiResponse, ValidationError};

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{entity} not found: {key}")]
    NotFound { entity: &'static str, key: String },

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Invalid {0}")]
    Validation(#[from] ValidationError),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    Conflict(String),

    #[error("Unsupported media type: {0}")]
    UnsupportedMedia(String),

    #[error("Upload too large: {0}")]
    PayloadTooLarge(String),

    #[error("Persistence error: {0}")]
    Persist(PersistError),

    #[error("Request timed out")]
    Timeout,

    #[error("Upload storage error: {0}")]
    Storage(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn not_found(entity: &'static str, key: impl ToString) -> Self {
        ApiError::NotFound {
            entity,
            key: key.to_string(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) | ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::UnsupportedMedia(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            ApiError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::Timeout => StatusCode::REQUEST_TIMEOUT,
            ApiError::Persist(_) | ApiError::Storage(_) | ApiError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

/// Duplicate keys and dangling references are the caller's fault; anything else
/// from the store is ours
impl From<PersistError> for ApiError {
    fn from(err: PersistError) -> Self {
        match err {
            PersistError::Conflict { .. } => ApiError::Conflict(err.to_string()),
            PersistError::MissingReference { .. } => ApiError::BadRequest(err.to_string()),
            other => ApiError::Persist(other),
        }
    }
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        let status = err.status();
        if status == StatusCode::PAYLOAD_TOO_LARGE {
            ApiError::PayloadTooLarge(err.body_text())
        } else {
            ApiError::BadRequest(err.body_text())
        }
    }
}

/// Body rejections keep their status class but always leave as an envelope
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        match rejection.status() {
            StatusCode::UNSUPPORTED_MEDIA_TYPE => ApiError::UnsupportedMedia(rejection.body_text()),
            StatusCode::PAYLOAD_TOO_LARGE => ApiError::PayloadTooLarge(rejection.body_text()),
            _ => ApiError::BadRequest(rejection.body_text()),
        }
    }
}

impl From<MultipartRejection> for ApiError {
    fn from(rejection: MultipartRejection) -> Self {
        match rejection.status() {
            StatusCode::PAYLOAD_TOO_LARGE => ApiError::PayloadTooLarge(rejection.body_text()),
            _ => ApiError::BadRequest(rejection.body_text()),
        }
    }
}

/// Router fallback for paths no route matches.
pub async fn route_not_found(uri: Uri) -> ApiError {
    ApiError::not_found("Route", uri.path())
}

/// Converts errors raised by fallible tower layers (the request timeout) into envelopes.
pub async fn handle_layer_error(err: tower::BoxError) -> ApiError {
    if err.is::<tower::timeout::error::Elapsed>() {
        ApiError::Timeout
    } else {
        ApiError::Internal(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            ApiError::Persist(ref e) => {
                tracing::error!("Persistence error: {}", e);
                "Storage error".to_string()
            }
            ApiError::Storage(ref e) => {
                tracing::error!("Upload storage error: {}", e);
                "Upload storage error".to_string()
            }
            ApiError::Internal(ref msg) => {
                tracing::error!("Internal error: {}", msg);
                "Internal server error".to_string()
            }
            ref other => other.to_string(),
        };

        (status, Json(ApiResponse::error(message))).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use serde_json::{json, Value};

    async fn body_of(err: ApiError) -> (StatusCode, Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_not_found_envelope() {
        let (status, body) = body_of(ApiError::not_found("Property", 9)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({ "success": false, "message": "Property not found: 9" }));
    }

    #[tokio::test]
    async fn test_persist_errors_are_classified() {
        let conflict: ApiError = PersistError::conflict("category", "slug 'land' is taken").into();
        assert_eq!(conflict.status(), StatusCode::CONFLICT);

        let dangling: ApiError = PersistError::missing_reference("story", "agent 4 does not exist").into();
        assert_eq!(dangling.status(), StatusCode::BAD_REQUEST);

        let internal: ApiError = PersistError::Internal("boom".to_string()).into();
        let (status, body) = body_of(internal).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["message"], "Storage error");
    }

    #[tokio::test]
    async fn test_timeout_is_enveloped() {
        let err = handle_layer_error(Box::new(tower::timeout::error::Elapsed::new())).await;
        let (status, body) = body_of(err).await;
        assert_eq!(status, StatusCode::REQUEST_TIMEOUT);
        assert_eq!(body, json!({ "success": false, "message": "Request timed out" }));
    }

    #[tokio::test]
    async fn test_unknown_route_is_enveloped() {
        let err = route_not_found(Uri::from_static("/api/nowhere")).await;
        let (status, body) = body_of(err).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "Route not found: /api/nowhere");
    }

    #[tokio::test]
    async fn test_validation_is_bad_request() {
        let err: ApiError = ValidationError::new("title", "must not be empty").into();
        let (status, body) = body_of(err).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Invalid title: must not be empty");
    }
}
