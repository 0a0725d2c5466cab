use axum::{extract::State, response::Json};
use pixel_retouch::ToneParams;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

use crate::error::ApiError;
use crate::services::ProcessingService;

#[derive(Debug, Deserialize, ToSchema)]
pub struct ParseBody {
    /// Free-text request, e.g. "augmenter légèrement la luminosité"
    pub text: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ParseResponse {
    /// Only the adjustments the text mentioned
    #[schema(value_type = Object)]
    pub params: ToneParams,
}

/// Interpret a free-text adjustment without applying it
#[utoipa::path(
    post,
    path = "/api/parse",
    request_body = ParseBody,
    responses(
        (status = 200, description = "Recognized adjustments", body = ParseResponse),
        (status = 422, description = "Nothing recognized"),
    ),
    tag = "Presets"
)]
pub async fn handle_parse(
    State(service): State<Arc<ProcessingService>>,
    Json(body): Json<ParseBody>,
) -> Result<Json<ParseResponse>, ApiError> {
    let params = service.parse_text(&body.text)?;
    Ok(Json(ParseResponse { params }))
}
