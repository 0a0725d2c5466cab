//! Region-adaptive compositing of local retouch effects.
//!
//! For every pixel whose blurred mask confidence exceeds the threshold, the
//! compositor computes a locally retouched colour (brightness, redness
//! reduction, smoothing, in that order) and blends it over the original with
//! a strength ramp:
//!
//! ```text
//! strength = (mask - threshold) / (1 - threshold)
//! out      = original * (1 - strength) + retouched * strength
//! ```
//!
//! The ramp is 0 at the threshold and 1 at full confidence, so retouched
//! regions fade into untouched ones without a visible edge.

use crate::api::RetouchError;
use crate::buffer::{store_channel, PixelBuffer};
use crate::skin::SkinMask;
use crate::window::SummedArea;

use super::ledger::AdjustmentLog;
use super::settings::RetouchSettings;

/// Result of one retouch pass.
#[derive(Debug, Clone, PartialEq)]
pub struct RetouchOutput {
    /// Retouched copy of the source
    pub buffer: PixelBuffer,
    /// Adjustments requested for this pass
    pub log: AdjustmentLog,
}

/// Applies [`RetouchSettings`] to pixel buffers.
///
/// Construction validates the settings, so a `Compositor` can always run
/// without numeric domain errors. It borrows nothing from the image and can
/// be reused across buffers.
#[derive(Debug, Clone)]
pub struct Compositor {
    settings: RetouchSettings,
}

impl Compositor {
    /// Validate `settings` and build a compositor.
    pub fn new(settings: RetouchSettings) -> Result<Self, RetouchError> {
        settings.validate()?;
        Ok(Self { settings })
    }

    #[inline]
    pub fn settings(&self) -> &RetouchSettings {
        &self.settings
    }

    /// Run the full pass: classify, blur the mask, composite.
    ///
    /// The log is computed before any pixel work. A disabled compositor
    /// returns an untouched copy with an empty log.
    pub fn process(&self, source: &PixelBuffer) -> RetouchOutput {
        if !self.settings.enabled {
            return RetouchOutput {
                buffer: source.clone(),
                log: AdjustmentLog::default(),
            };
        }

        let log = AdjustmentLog::from_settings(&self.settings);
        let _span = tracing::debug_span!(
            "retouch",
            width = source.width(),
            height = source.height(),
            blur = self.settings.blur,
        )
        .entered();

        let mask = SkinMask::classify(source).box_blur(self.settings.blur);
        let buffer = self.composite(source, &mask);

        RetouchOutput { buffer, log }
    }

    /// Blend retouched colours into a copy of `source` using `mask` as weight.
    ///
    /// Pixels at or below the threshold are copied byte for byte. Alpha is
    /// never modified.
    ///
    /// # Panics
    ///
    /// Panics if the mask dimensions differ from the buffer's.
    pub fn composite(&self, source: &PixelBuffer, mask: &SkinMask) -> PixelBuffer {
        assert_eq!(
            (mask.width(), mask.height()),
            (source.width(), source.height()),
            "mask and buffer dimensions differ"
        );

        let mut output = source.clone();
        if source.is_empty() {
            return output;
        }

        let threshold = self.settings.threshold;
        let smooth_radius = self.settings.smooth_radius();
        let neighbourhood = (smooth_radius > 0).then(|| ChannelSums::new(source));

        for y in 0..source.height() {
            for x in 0..source.width() {
                let weight = mask.weight(x, y);
                if weight <= threshold {
                    continue;
                }

                let [r, g, b, a] = source.pixel(x, y);
                let original = [r as f64, g as f64, b as f64];
                let local_mean = neighbourhood
                    .as_ref()
                    .map(|sums| sums.mean(x, y, smooth_radius));
                let retouched = self.retouch_pixel(original, weight, local_mean);

                let strength = (weight - threshold) / (1.0 - threshold);
                let blend = |c: usize| original[c] * (1.0 - strength) + retouched[c] * strength;

                output.set_pixel(
                    x,
                    y,
                    [
                        store_channel(blend(0)),
                        store_channel(blend(1)),
                        store_channel(blend(2)),
                        a,
                    ],
                );
            }
        }

        output
    }

    /// Locally retouched colour before the strength ramp is applied.
    fn retouch_pixel(&self, rgb: [f64; 3], weight: f64, local_mean: Option<[f64; 3]>) -> [f64; 3] {
        let settings = &self.settings;
        let [mut r, mut g, mut b] = rgb;

        // Multiplicative, unlike the additive brightness of tone grading
        if settings.brightness != 0.0 {
            let factor = (1.0 + settings.brightness / 100.0).max(0.0);
            r = (r * factor).min(255.0);
            g = (g * factor).min(255.0);
            b = (b * factor).min(255.0);
        }

        // Weighted by raw mask confidence, not by the thresholded strength
        if settings.redness > 0.0 {
            r *= 1.0 - settings.redness / 100.0 * weight;
        }

        if let Some(mean) = local_mean {
            let blend = 0.3 * (settings.smoothness / 100.0);
            r = r * (1.0 - blend) + mean[0] * blend;
            g = g * (1.0 - blend) + mean[1] * blend;
            b = b * (1.0 - blend) + mean[2] * blend;
        }

        [r, g, b]
    }
}

/// Per-channel summed-area tables over the source's RGB samples.
struct ChannelSums {
    planes: [SummedArea; 3],
}

impl ChannelSums {
    fn new(source: &PixelBuffer) -> Self {
        let plane = |c: usize| {
            SummedArea::new(
                source.width(),
                source.height(),
                source.as_bytes().chunks_exact(4).map(move |px| px[c] as u64),
            )
        };
        Self {
            planes: [plane(0), plane(1), plane(2)],
        }
    }

    /// Mean RGB of the clipped window of `radius` around `(x, y)`.
    fn mean(&self, x: usize, y: usize, radius: usize) -> [f64; 3] {
        let mut mean = [0.0; 3];
        for (c, plane) in self.planes.iter().enumerate() {
            let (sum, count) = plane.window(x, y, radius);
            mean[c] = sum as f64 / count as f64;
        }
        mean
    }
}
