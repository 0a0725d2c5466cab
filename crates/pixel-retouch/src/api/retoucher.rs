use crate::buffer::PixelBuffer;
use crate::request::{GradeRequest, RetouchRequest, Stamped};
use crate::retouch::{Compositor, RetouchOutput, RetouchSettings};
use crate::tone::{grade, ToneParams};

use super::RetouchError;

/// Entry point for running passes.
///
/// Validates parameters at the boundary, treats absent or zero-area input as
/// a no-op (`Ok(None)`), and otherwise runs the pass on a private copy of
/// the source. The source buffer is never modified.
///
/// # Example
///
/// ```
/// use pixel_retouch::{PixelBuffer, RetouchSettings, Retoucher, ToneParams};
///
/// let image = PixelBuffer::from_pixel(8, 8, [210, 160, 140, 255]);
/// let retoucher = Retoucher::new();
///
/// let out = retoucher
///     .retouch(Some(&image), &RetouchSettings::new().brightness(10.0))
///     .unwrap()
///     .unwrap();
/// assert_eq!(out.log.to_string(), "Brightening: +10%");
///
/// let graded = retoucher
///     .grade(Some(&out.buffer), &ToneParams::new().contrast(10.0))
///     .unwrap();
/// assert!(graded.is_some());
///
/// assert!(retoucher.grade(None, &ToneParams::new()).unwrap().is_none());
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct Retoucher;

impl Retoucher {
    pub fn new() -> Self {
        Self
    }

    /// Run a skin-aware retouch pass.
    pub fn retouch(
        &self,
        source: Option<&PixelBuffer>,
        settings: &RetouchSettings,
    ) -> Result<Option<RetouchOutput>, RetouchError> {
        let compositor = Compositor::new(settings.clone())?;
        let Some(source) = non_empty(source) else {
            tracing::trace!("retouch skipped: no input");
            return Ok(None);
        };
        Ok(Some(compositor.process(source)))
    }

    /// Run a global tone-grading pass.
    pub fn grade(
        &self,
        source: Option<&PixelBuffer>,
        params: &ToneParams,
    ) -> Result<Option<PixelBuffer>, RetouchError> {
        params.validate()?;
        let Some(source) = non_empty(source) else {
            tracing::trace!("grade skipped: no input");
            return Ok(None);
        };
        grade(source, params).map(Some)
    }

    /// [`Retoucher::retouch`] with the result tagged by the request's sequence.
    pub fn retouch_request(
        &self,
        source: Option<&PixelBuffer>,
        request: &RetouchRequest,
    ) -> Result<Option<Stamped<RetouchOutput>>, RetouchError> {
        let output = self.retouch(source, &request.settings)?;
        Ok(output.map(|o| Stamped::new(request.sequence, o)))
    }

    /// [`Retoucher::grade`] with the result tagged by the request's sequence.
    pub fn grade_request(
        &self,
        source: Option<&PixelBuffer>,
        request: &GradeRequest,
    ) -> Result<Option<Stamped<PixelBuffer>>, RetouchError> {
        let output = self.grade(source, &request.params)?;
        Ok(output.map(|b| Stamped::new(request.sequence, b)))
    }
}

fn non_empty(source: Option<&PixelBuffer>) -> Option<&PixelBuffer> {
    source.filter(|b| !b.is_empty())
}
