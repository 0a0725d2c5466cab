use axum::{extract::State, response::Json};
use std::sync::Arc;

use crate::models::Preset;
use crate::services::ProcessingService;

/// List the tone-grading presets
#[utoipa::path(
    get,
    path = "/api/presets",
    responses(
        (status = 200, description = "Preset catalog in display order", body = Vec<Preset>),
    ),
    tag = "Presets"
)]
pub async fn handle_list_presets(
    State(service): State<Arc<ProcessingService>>,
) -> Json<Vec<Preset>> {
    Json(service.config().presets.clone())
}
