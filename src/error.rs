use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::{schema::SchemaError, store::StoreError};

const INTERNAL_FALLBACK: &str = "An internal server error occurred.";

/// ApiError
///
/// Every failure a handler can return. Payload validation failures answer `{error}`, all
/// the others (a malformed path id included) answer `{message}`.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("Forbidden. You must be signed in to use this resource.")]
    SignInRequired,

    #[error("Forbidden. You do not have access to this resource.")]
    Forbidden,

    #[error("{0}")]
    NotFound(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("{0}")]
    Internal(String),
}

impl From<SchemaError> for ApiError {
    fn from(err: SchemaError) -> Self {
        ApiError::Validation(err.0)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Validation(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::Validation(_) | ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::SignInRequired | ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Store(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = %self, "request failed");
        }

        let body = match &self {
            ApiError::Validation(message) => json!({ "error": message }),
            other => {
                let message = other.to_string();
                if message.is_empty() {
                    json!({ "message": INTERNAL_FALLBACK })
                } else {
                    json!({ "message": message })
                }
            }
        };

        (status, Json(body)).into_response()
    }
}
