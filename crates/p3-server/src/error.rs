//! Server-wide error type

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::api::response::ErrorResponse;
use crate::features::fasta::SerializeError;

/// Result type alias for handlers
pub type AppResult<T> = std::result::Result<T, AppError>;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Results handed to the serializer do not match the requested mode
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error(transparent)]
    Serialize(SerializeError),
}

impl From<SerializeError> for AppError {
    fn from(err: SerializeError) -> Self {
        match err {
            SerializeError::UnsupportedCollection(collection) => {
                AppError::BadRequest(format!("Unsupported collection: {}", collection))
            },
            SerializeError::InvalidInput(message) => AppError::InvalidInput(message),
            other => AppError::Serialize(other),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error) = match self {
            AppError::NotFound(message) => {
                (StatusCode::NOT_FOUND, ErrorResponse::new("NOT_FOUND", message))
            },
            AppError::BadRequest(message) => {
                (StatusCode::BAD_REQUEST, ErrorResponse::new("VALIDATION_ERROR", message))
            },
            AppError::InvalidInput(message) => {
                tracing::error!("Invalid serializer input: {}", message);
                (StatusCode::INTERNAL_SERVER_ERROR, ErrorResponse::new("INVALID_INPUT", message))
            },
            AppError::Serialize(SerializeError::Lookup { count, ref source }) => {
                tracing::error!("Sequence lookup failed for {} hash(es): {:?}", count, source);
                (
                    StatusCode::BAD_GATEWAY,
                    ErrorResponse::with_details(
                        "SEQUENCE_STORE_ERROR",
                        "Sequence lookup failed",
                        json!({ "hashes": count }),
                    ),
                )
            },
            AppError::Serialize(ref e) => {
                tracing::error!("Serialization error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse::new("INTERNAL_ERROR", "An internal error occurred"),
                )
            },
        };

        (status, Json(error)).into_response()
    }
}
