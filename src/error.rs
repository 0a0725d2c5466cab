use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use pixel_retouch::{RetouchError, Sequence};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Session not found")]
    SessionNotFound,

    #[error("Unknown preset: {0}")]
    PresetNotFound(String),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Invalid parameter: {0}")]
    Domain(#[from] RetouchError),

    #[error("Upload too large: {size} bytes (max {max})")]
    PayloadTooLarge { size: usize, max: usize },

    #[error("Image too large: {pixels} pixels (max {max})")]
    ImageTooLarge { pixels: u64, max: u64 },

    #[error("Codec error: {0}")]
    Codec(#[from] CodecError),

    #[error("Result {0} was superseded by a newer request")]
    Stale(Sequence),

    #[error("Could not interpret adjustment: {0}")]
    Unrecognized(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("Unsupported or corrupt image: {0}")]
    Decode(String),

    #[error("Unknown export format: {0}")]
    UnknownFormat(String),

    #[error("Encode error: {0}")]
    Encode(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::SessionNotFound => StatusCode::NOT_FOUND,
            ApiError::PresetNotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Domain(_) => StatusCode::BAD_REQUEST,
            ApiError::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::ImageTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::Codec(CodecError::Decode(_)) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            ApiError::Codec(CodecError::UnknownFormat(_)) => StatusCode::BAD_REQUEST,
            ApiError::Codec(CodecError::Encode(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Stale(_) => StatusCode::CONFLICT,
            ApiError::Unrecognized(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        }

        let body = Json(json!({
            "status": status.as_u16(),
            "error": self.to_string(),
        }));

        (status, body).into_response()
    }
}
