//! Settings for the skin-aware retouch pass.

use serde::{Deserialize, Serialize};

use crate::api::error::ensure_finite;
use crate::api::RetouchError;

/// Parameters of one region-adaptive retouch pass.
///
/// Percentages are expressed on a 0–100 scale (brightness is signed).
/// The defaults match a freshly opened editor: everything neutral, a mask
/// blur of 10 pixels and a detection threshold of 0.3.
///
/// # Example
///
/// ```
/// use pixel_retouch::RetouchSettings;
///
/// let settings = RetouchSettings::new()
///     .smoothness(40.0)
///     .redness(25.0)
///     .threshold(0.4);
/// assert!(settings.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetouchSettings {
    /// Master switch. When off, a pass returns an untouched copy.
    pub enabled: bool,

    /// Local smoothing strength. `floor(smoothness / 20)` is the averaging
    /// radius and `0.3 * smoothness / 100` the blend toward the average.
    pub smoothness: f64,

    /// Multiplicative brightening (positive) or darkening (negative), in percent.
    pub brightness: f64,

    /// Red channel reduction in percent, weighted by mask confidence.
    pub redness: f64,

    /// Tone uniformity. Reserved: validated and reported in the adjustment
    /// log, but not applied to pixels.
    pub uniformity: f64,

    /// Box blur radius applied to the raw skin mask.
    pub blur: usize,

    /// Mask confidence (0..1) above which pixels are retouched.
    pub threshold: f64,
}

impl Default for RetouchSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            smoothness: 0.0,
            brightness: 0.0,
            redness: 0.0,
            uniformity: 0.0,
            blur: 10,
            threshold: 0.3,
        }
    }
}

impl RetouchSettings {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    #[inline]
    pub fn smoothness(mut self, percent: f64) -> Self {
        self.smoothness = percent;
        self
    }

    #[inline]
    pub fn brightness(mut self, percent: f64) -> Self {
        self.brightness = percent;
        self
    }

    #[inline]
    pub fn redness(mut self, percent: f64) -> Self {
        self.redness = percent;
        self
    }

    #[inline]
    pub fn uniformity(mut self, percent: f64) -> Self {
        self.uniformity = percent;
        self
    }

    #[inline]
    pub fn blur(mut self, radius: usize) -> Self {
        self.blur = radius;
        self
    }

    #[inline]
    pub fn threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    /// Radius of the local smoothing window (0 disables smoothing).
    #[inline]
    pub fn smooth_radius(&self) -> usize {
        if self.smoothness > 0.0 {
            (self.smoothness / 20.0).floor() as usize
        } else {
            0
        }
    }

    /// Check the domain constraints the compositor relies on.
    ///
    /// `threshold` must lie in `[0, 1)`: at 1 the blend ramp divides by zero.
    pub fn validate(&self) -> Result<(), RetouchError> {
        ensure_finite("smoothness", self.smoothness)?;
        ensure_finite("brightness", self.brightness)?;
        ensure_finite("redness", self.redness)?;
        ensure_finite("uniformity", self.uniformity)?;
        ensure_finite("threshold", self.threshold)?;

        if !(0.0..1.0).contains(&self.threshold) {
            return Err(RetouchError::invalid(
                "threshold",
                self.threshold,
                "must be in [0, 1)",
            ));
        }
        Ok(())
    }
}
