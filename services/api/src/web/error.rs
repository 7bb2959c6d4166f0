//! services/api/src/web/error.rs
//!
//! The HTTP-facing failure type. Every handler error is converted here into
//! a JSON `{"error": "..."}` body with the matching status code; nothing
//! propagates as an unhandled fault.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use nulis_core::ports::PortError;
use serde::Serialize;
use tracing::error;
use utoipa::ToSchema;

/// The JSON body attached to every error response.
#[derive(Serialize, ToSchema)]
pub struct ErrorBody {
    pub error: String,
}

/// A handler-level failure, carrying the user-visible message.
#[derive(Debug, thiserror::Error)]
pub enum ApiFailure {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    Internal(String),
}

impl ApiFailure {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        ApiFailure::BadRequest(msg.into())
    }

    pub fn unauthorized() -> Self {
        ApiFailure::Unauthorized("Unauthorized".to_string())
    }

    pub fn not_found() -> Self {
        ApiFailure::NotFound("Not found".to_string())
    }
}

impl From<PortError> for ApiFailure {
    fn from(e: PortError) -> Self {
        match e {
            // The public message never names the missing resource; 404 also
            // covers content intentionally hidden from the caller.
            PortError::NotFound(_) => ApiFailure::not_found(),
            PortError::Conflict(msg) => ApiFailure::Conflict(msg),
            PortError::Unauthorized => ApiFailure::unauthorized(),
            PortError::Unexpected(msg) => ApiFailure::Internal(msg),
        }
    }
}

impl IntoResponse for ApiFailure {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiFailure::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiFailure::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            ApiFailure::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiFailure::Conflict(msg) => (StatusCode::CONFLICT, msg),
            ApiFailure::Internal(msg) => {
                error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };
        (status, Json(ErrorBody { error: message })).into_response()
    }
}
