//! Runs retouch and grade passes for sessions.
//!
//! Pixel work is CPU-bound, so every pass runs on the blocking thread pool.
//! Each pass is stamped with a sequence from the session's generation before
//! it starts and committed only if no newer request was issued meanwhile.

use pixel_retouch::{
    GradeRequest, PixelBuffer, RetouchRequest, RetouchSettings, Retoucher, Sequence, ToneParams,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

use crate::error::ApiError;
use crate::models::AppConfig;
use crate::services::codec::{self, EncodedImage, ExportFormat};
use crate::services::session_store::{Commit, Session, SessionId, SessionStore};
use crate::services::text_parser::{AdjustmentParser, ParseOutcome};

/// Which buffer a pass reads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum PassBase {
    /// The untouched upload (passes replace each other)
    #[default]
    Original,
    /// The last committed result (passes stack)
    Current,
}

/// Sources of tone parameters, combined preset < text < params
#[derive(Debug, Clone, Default)]
pub struct GradeSources {
    pub preset: Option<String>,
    pub text: Option<String>,
    pub params: Option<ToneParams>,
}

/// Outcome of a committed pass
#[derive(Debug, Clone)]
pub struct PassResult {
    pub sequence: Sequence,
    pub session: Session,
}

pub struct ProcessingService {
    config: Arc<AppConfig>,
    store: Arc<dyn SessionStore>,
    parser: Arc<dyn AdjustmentParser>,
    retoucher: Retoucher,
}

impl ProcessingService {
    pub fn new(
        config: Arc<AppConfig>,
        store: Arc<dyn SessionStore>,
        parser: Arc<dyn AdjustmentParser>,
    ) -> Self {
        Self {
            config,
            store,
            parser,
            retoucher: Retoucher::new(),
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Decode an upload and open a session for it
    pub async fn upload(&self, bytes: Vec<u8>) -> Result<Session, ApiError> {
        let limits = &self.config.limits;
        if bytes.len() > limits.max_upload_bytes {
            return Err(ApiError::PayloadTooLarge {
                size: bytes.len(),
                max: limits.max_upload_bytes,
            });
        }

        let (width, height) = codec::probe_dimensions(&bytes)?;
        let pixels = width as u64 * height as u64;
        if pixels > limits.max_pixels {
            return Err(ApiError::ImageTooLarge {
                pixels,
                max: limits.max_pixels,
            });
        }

        let decoded = run_blocking(move || codec::decode(&bytes)).await??;
        if decoded.buffer.is_empty() {
            return Err(ApiError::BadRequest("image has no pixels".to_string()));
        }

        let session = Session::new(decoded.buffer, decoded.source_format);
        tracing::info!(
            session = %session.id,
            width,
            height,
            format = ?session.source_format,
            "Session created"
        );
        self.store.insert(session.clone()).await?;
        Ok(session)
    }

    pub async fn session(&self, id: &SessionId) -> Result<Session, ApiError> {
        self.store
            .get(id)
            .await?
            .ok_or(ApiError::SessionNotFound)
    }

    /// Run a skin-aware retouch pass and commit it if still current
    pub async fn retouch(
        &self,
        id: &SessionId,
        settings: RetouchSettings,
        base: PassBase,
    ) -> Result<PassResult, ApiError> {
        settings.validate()?;
        let max_radius = self.config.limits.max_blur_radius;
        if settings.blur > max_radius {
            return Err(ApiError::BadRequest(format!(
                "blur radius {} exceeds maximum {max_radius}",
                settings.blur
            )));
        }
        if settings.smooth_radius() > max_radius {
            return Err(ApiError::BadRequest(format!(
                "smoothness {} gives a radius above maximum {max_radius}",
                settings.smoothness
            )));
        }

        let session = self.session(id).await?;
        if !settings.enabled {
            // A disabled pass commits nothing, so the session stays pristine
            tracing::debug!(session = %id, "Retouch disabled, nothing committed");
            return Ok(PassResult {
                sequence: session.generation.latest(),
                session,
            });
        }

        let request = RetouchRequest {
            sequence: session.generation.next(),
            settings,
        };
        let sequence = request.sequence;
        let source = pick(&session, base);
        let retoucher = self.retoucher;

        tracing::debug!(session = %id, %sequence, ?base, "Retouch pass started");
        let output =
            run_blocking(move || retoucher.retouch_request(Some(source.as_ref()), &request)).await??;

        let Some(stamped) = output else {
            return Ok(PassResult { sequence, session });
        };
        let commit = Commit::Retouch {
            buffer: stamped.value.buffer,
            log: stamped.value.log,
            stacked: base == PassBase::Current,
        };
        let session = self.store.commit(id, stamped.sequence, commit).await?;
        tracing::info!(session = %id, %sequence, adjustments = session.log.len(), "Retouch committed");

        Ok(PassResult { sequence, session })
    }

    /// Combine preset, text and explicit parameters into one bundle
    pub fn resolve_params(&self, sources: &GradeSources) -> Result<ToneParams, ApiError> {
        let mut params = ToneParams::new();

        if let Some(name) = &sources.preset {
            let preset = self
                .config
                .find_preset(name)
                .ok_or_else(|| ApiError::PresetNotFound(name.clone()))?;
            params = params.overlay(&preset.params);
        }

        if let Some(text) = &sources.text {
            params = params.overlay(&self.parse_text(text)?);
        }

        if let Some(explicit) = &sources.params {
            params = params.overlay(explicit);
        }

        params.validate()?;
        Ok(params)
    }

    /// Interpret a free-text adjustment request
    pub fn parse_text(&self, text: &str) -> Result<ToneParams, ApiError> {
        match self.parser.parse(text) {
            ParseOutcome::Params(params) => Ok(params),
            ParseOutcome::Unrecognized => Err(ApiError::Unrecognized(text.to_string())),
        }
    }

    /// Run a tone-grading pass and commit it if still current
    pub async fn grade(
        &self,
        id: &SessionId,
        sources: GradeSources,
        base: PassBase,
    ) -> Result<PassResult, ApiError> {
        let params = self.resolve_params(&sources)?;
        let preset = sources
            .preset
            .as_deref()
            .and_then(|name| self.config.find_preset(name))
            .map(|p| p.name.clone());

        let session = self.session(id).await?;
        let request = GradeRequest {
            sequence: session.generation.next(),
            params,
        };
        let sequence = request.sequence;
        let params = request.params.clone();
        let source = pick(&session, base);
        let retoucher = self.retoucher;

        tracing::debug!(session = %id, %sequence, ?base, preset = ?preset, "Grade pass started");
        let output =
            run_blocking(move || retoucher.grade_request(Some(source.as_ref()), &request)).await??;

        let Some(stamped) = output else {
            return Ok(PassResult { sequence, session });
        };
        let commit = Commit::Grade {
            buffer: stamped.value,
            params,
            preset,
            stacked: base == PassBase::Current,
        };
        let session = self.store.commit(id, stamped.sequence, commit).await?;
        tracing::info!(session = %id, %sequence, "Grade committed");

        Ok(PassResult { sequence, session })
    }

    pub async fn reset(&self, id: &SessionId) -> Result<Session, ApiError> {
        let session = self.store.reset(id).await?;
        tracing::info!(session = %id, "Session reset");
        Ok(session)
    }

    /// Close a session and release its buffers
    pub async fn remove(&self, id: &SessionId) -> Result<(), ApiError> {
        if !self.store.remove(id).await? {
            return Err(ApiError::SessionNotFound);
        }
        tracing::info!(session = %id, "Session removed");
        Ok(())
    }

    /// Encode the current result for download
    pub async fn export(
        &self,
        id: &SessionId,
        format: ExportFormat,
    ) -> Result<EncodedImage, ApiError> {
        let session = self.session(id).await?;
        let export = self.config.export.clone();
        let current = session.current.clone();
        let source_format = session.source_format;

        let encoded =
            run_blocking(move || codec::encode(&current, format, source_format, &export)).await??;
        tracing::debug!(session = %id, %format, bytes = encoded.bytes.len(), "Exported image");
        Ok(encoded)
    }
}

fn pick(session: &Session, base: PassBase) -> Arc<PixelBuffer> {
    match base {
        PassBase::Original => session.original.clone(),
        PassBase::Current => session.current.clone(),
    }
}

async fn run_blocking<T, F>(f: F) -> Result<T, ApiError>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| ApiError::Internal(format!("worker task failed: {e}")))
}
