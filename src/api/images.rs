use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Json, Response},
};
use chrono::{DateTime, Utc};
use pixel_retouch::{AdjustmentLog, RetouchSettings, ToneParams};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

use crate::error::ApiError;
use crate::services::codec::{download_filename, ExportFormat};
use crate::services::{GradeSources, PassBase, ProcessingService, Session, SessionId};

/// One line of the adjustment ledger
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AdjustmentEntry {
    /// Display label, e.g. "Skin smoothing"
    pub name: String,
    /// Magnitude
    pub value: f64,
    /// Unit suffix
    pub unit: String,
    /// Rendered line, e.g. "Skin smoothing: +40%"
    pub label: String,
}

fn adjustments(log: &AdjustmentLog) -> Vec<AdjustmentEntry> {
    log.entries()
        .iter()
        .map(|e| AdjustmentEntry {
            name: e.name.clone(),
            value: e.value,
            unit: e.unit.clone(),
            label: e.to_string(),
        })
        .collect()
}

/// Response from image upload
#[derive(Debug, Serialize, ToSchema)]
pub struct UploadResponse {
    /// Session identifier for follow-up requests
    pub id: String,
    pub width: usize,
    pub height: usize,
    /// Detected container format
    pub format: String,
}

/// Current state of an editing session
#[derive(Debug, Serialize, ToSchema)]
pub struct SessionSummary {
    pub id: String,
    pub width: usize,
    pub height: usize,
    pub format: String,
    /// False until a pass has been committed (or after reset)
    pub modified: bool,
    /// Preset behind the last committed grade
    pub preset: Option<String>,
    /// Parameters of the last committed grade
    #[schema(value_type = Option<Object>)]
    pub params: Option<ToneParams>,
    /// Ledger of the last committed retouch
    pub adjustments: Vec<AdjustmentEntry>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Session> for SessionSummary {
    fn from(session: &Session) -> Self {
        Self {
            id: session.id.to_string(),
            width: session.original.width(),
            height: session.original.height(),
            format: format_name(session),
            modified: !session.is_pristine(),
            preset: session.preset.clone(),
            params: session.params.clone(),
            adjustments: adjustments(&session.log),
            created_at: session.created_at,
            updated_at: session.updated_at,
        }
    }
}

fn format_name(session: &Session) -> String {
    session
        .source_format
        .extensions_str()
        .first()
        .copied()
        .unwrap_or("unknown")
        .to_string()
}

/// Retouch request; omitted fields take the configured defaults
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct RetouchBody {
    pub enabled: Option<bool>,
    /// Smoothing strength in percent
    pub smoothness: Option<f64>,
    /// Multiplicative brightness in percent (signed)
    pub brightness: Option<f64>,
    /// Red reduction in percent
    pub redness: Option<f64>,
    /// Reserved, recorded in the ledger only
    pub uniformity: Option<f64>,
    /// Mask blur radius in pixels
    pub blur: Option<usize>,
    /// Mask confidence threshold in [0, 1)
    pub threshold: Option<f64>,
    /// Buffer the pass reads (default: original)
    #[serde(default)]
    pub base: PassBase,
}

impl RetouchBody {
    pub fn apply_to(&self, defaults: &RetouchSettings) -> RetouchSettings {
        RetouchSettings {
            enabled: self.enabled.unwrap_or(defaults.enabled),
            smoothness: self.smoothness.unwrap_or(defaults.smoothness),
            brightness: self.brightness.unwrap_or(defaults.brightness),
            redness: self.redness.unwrap_or(defaults.redness),
            uniformity: self.uniformity.unwrap_or(defaults.uniformity),
            blur: self.blur.unwrap_or(defaults.blur),
            threshold: self.threshold.unwrap_or(defaults.threshold),
        }
    }
}

/// Response from a retouch pass
#[derive(Debug, Serialize, ToSchema)]
pub struct RetouchResponse {
    /// Sequence number of the committed pass
    pub sequence: u64,
    pub adjustments: Vec<AdjustmentEntry>,
}

/// Tone-grading request; sources combine preset < text < params
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct GradeBody {
    /// Preset name from the catalog
    pub preset: Option<String>,
    /// Free-text adjustment (French vocabulary)
    pub text: Option<String>,
    /// Explicit slider values
    #[schema(value_type = Option<Object>)]
    pub params: Option<ToneParams>,
    /// Buffer the pass reads (default: original)
    #[serde(default)]
    pub base: PassBase,
}

/// Response from a grade pass
#[derive(Debug, Serialize, ToSchema)]
pub struct GradeResponse {
    pub sequence: u64,
    /// Effective parameters after combining all sources
    #[schema(value_type = Object)]
    pub params: ToneParams,
    pub preset: Option<String>,
}

/// Query parameters for download
#[derive(Debug, Deserialize)]
pub struct DownloadQuery {
    /// png, webp, jpeg-high, jpeg-medium or original
    #[serde(default)]
    pub format: Option<String>,
}

/// Upload an image
///
/// Accepts raw PNG, JPEG or WebP bytes and opens an editing session.
#[utoipa::path(
    post,
    path = "/api/images",
    request_body(content = Vec<u8>, content_type = "application/octet-stream"),
    responses(
        (status = 201, description = "Session created", body = UploadResponse),
        (status = 413, description = "Upload or image too large"),
        (status = 415, description = "Unsupported or corrupt image"),
    ),
    tag = "Images"
)]
pub async fn handle_upload(
    State(service): State<Arc<ProcessingService>>,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let session = service.upload(body.to_vec()).await?;

    Ok((
        StatusCode::CREATED,
        Json(UploadResponse {
            id: session.id.to_string(),
            width: session.original.width(),
            height: session.original.height(),
            format: format_name(&session),
        }),
    ))
}

/// Get session state
#[utoipa::path(
    get,
    path = "/api/images/{id}",
    responses(
        (status = 200, description = "Session found", body = SessionSummary),
        (status = 404, description = "Session not found"),
    ),
    params(("id" = String, Path, description = "Session identifier")),
    tag = "Images"
)]
pub async fn handle_get_session(
    State(service): State<Arc<ProcessingService>>,
    Path(id): Path<String>,
) -> Result<Json<SessionSummary>, ApiError> {
    let session = service.session(&SessionId::new(id)).await?;
    Ok(Json(SessionSummary::from(&session)))
}

/// Close a session
///
/// Releases the session's buffers. Passes still running for it are dropped.
#[utoipa::path(
    delete,
    path = "/api/images/{id}",
    responses(
        (status = 204, description = "Session removed"),
        (status = 404, description = "Session not found"),
    ),
    params(("id" = String, Path, description = "Session identifier")),
    tag = "Images"
)]
pub async fn handle_delete(
    State(service): State<Arc<ProcessingService>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    service.remove(&SessionId::new(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Run a skin-aware retouch pass
///
/// Detects skin, blurs the mask and applies smoothing, brightness and
/// redness reduction to the detected region.
#[utoipa::path(
    post,
    path = "/api/images/{id}/retouch",
    request_body = RetouchBody,
    responses(
        (status = 200, description = "Pass committed", body = RetouchResponse),
        (status = 400, description = "Parameter out of range"),
        (status = 404, description = "Session not found"),
        (status = 409, description = "Superseded by a newer request"),
    ),
    params(("id" = String, Path, description = "Session identifier")),
    tag = "Images"
)]
pub async fn handle_retouch(
    State(service): State<Arc<ProcessingService>>,
    Path(id): Path<String>,
    Json(body): Json<RetouchBody>,
) -> Result<Json<RetouchResponse>, ApiError> {
    let settings = body.apply_to(&service.config().retouch_defaults);
    let result = service
        .retouch(&SessionId::new(id), settings, body.base)
        .await?;

    Ok(Json(RetouchResponse {
        sequence: result.sequence.0,
        adjustments: adjustments(&result.session.log),
    }))
}

/// Run a global tone-grading pass
#[utoipa::path(
    post,
    path = "/api/images/{id}/grade",
    request_body = GradeBody,
    responses(
        (status = 200, description = "Pass committed", body = GradeResponse),
        (status = 400, description = "Parameter out of range"),
        (status = 404, description = "Session or preset not found"),
        (status = 409, description = "Superseded by a newer request"),
        (status = 422, description = "Text not understood"),
    ),
    params(("id" = String, Path, description = "Session identifier")),
    tag = "Images"
)]
pub async fn handle_grade(
    State(service): State<Arc<ProcessingService>>,
    Path(id): Path<String>,
    Json(body): Json<GradeBody>,
) -> Result<Json<GradeResponse>, ApiError> {
    let sources = GradeSources {
        preset: body.preset,
        text: body.text,
        params: body.params,
    };
    let result = service.grade(&SessionId::new(id), sources, body.base).await?;

    Ok(Json(GradeResponse {
        sequence: result.sequence.0,
        params: result.session.params.clone().unwrap_or_default(),
        preset: result.session.preset.clone(),
    }))
}

/// Discard all edits
#[utoipa::path(
    post,
    path = "/api/images/{id}/reset",
    responses(
        (status = 200, description = "Session reset", body = SessionSummary),
        (status = 404, description = "Session not found"),
    ),
    params(("id" = String, Path, description = "Session identifier")),
    tag = "Images"
)]
pub async fn handle_reset(
    State(service): State<Arc<ProcessingService>>,
    Path(id): Path<String>,
) -> Result<Json<SessionSummary>, ApiError> {
    let session = service.reset(&SessionId::new(id)).await?;
    Ok(Json(SessionSummary::from(&session)))
}

/// Download the current result
#[utoipa::path(
    get,
    path = "/api/images/{id}/download",
    responses(
        (status = 200, description = "Encoded image", body = Vec<u8>, content_type = "application/octet-stream"),
        (status = 400, description = "Unknown format"),
        (status = 404, description = "Session not found"),
    ),
    params(
        ("id" = String, Path, description = "Session identifier"),
        ("format" = Option<String>, Query, description = "png (default), webp, jpeg-high, jpeg-medium or original"),
    ),
    tag = "Images"
)]
pub async fn handle_download(
    State(service): State<Arc<ProcessingService>>,
    Path(id): Path<String>,
    Query(query): Query<DownloadQuery>,
) -> Result<Response, ApiError> {
    let format = match query.format.as_deref() {
        Some(selector) => selector.parse::<ExportFormat>()?,
        None => ExportFormat::default(),
    };
    let encoded = service.export(&SessionId::new(id), format).await?;
    let filename = download_filename(encoded.extension);

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, encoded.mime.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
            (header::CACHE_CONTROL, "no-store".to_string()),
        ],
        encoded.bytes,
    )
        .into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retouch_body_fills_from_defaults() {
        let defaults = RetouchSettings::new().blur(7).smoothness(15.0);
        let body: RetouchBody =
            serde_json::from_str(r#"{"redness": 30, "threshold": 0.5}"#).unwrap();
        let settings = body.apply_to(&defaults);

        assert_eq!(settings.redness, 30.0);
        assert_eq!(settings.threshold, 0.5);
        assert_eq!(settings.blur, 7);
        assert_eq!(settings.smoothness, 15.0);
        assert_eq!(body.base, PassBase::Original);
    }

    #[test]
    fn test_retouch_body_rejects_unknown_fields() {
        assert!(serde_json::from_str::<RetouchBody>(r#"{"sharpness": 3}"#).is_err());
    }

    #[test]
    fn test_grade_body_base() {
        let body: GradeBody =
            serde_json::from_str(r#"{"preset": "Couleurs vives", "base": "current"}"#).unwrap();
        assert_eq!(body.base, PassBase::Current);
        assert_eq!(body.preset.as_deref(), Some("Couleurs vives"));
    }
}
