//! Per-pixel global tone grading.

use crate::api::RetouchError;
use crate::buffer::{store_channel, PixelBuffer};

use super::params::ToneParams;

/// Rec. 601 luma weights, used for the saturation grey point.
const LUMA_601: [f64; 3] = [0.299, 0.587, 0.114];

/// Rec. 709 luminance weights, used for highlight/shadow classification.
const LUMA_709: [f64; 3] = [0.2126, 0.7152, 0.0722];

/// Luminance above which highlights are lifted.
const HIGHLIGHT_FLOOR: f64 = 180.0;

/// Luminance below which shadows are scaled.
const SHADOW_CEILING: f64 = 75.0;

const SEPIA: [[f64; 3]; 3] = [
    [0.393, 0.769, 0.189],
    [0.349, 0.686, 0.168],
    [0.272, 0.534, 0.131],
];

/// Resolved, neutral-filled view of a [`ToneParams`] bundle.
#[derive(Debug, Clone, Copy)]
struct Grade {
    contrast: Option<f64>,
    brightness: f64,
    saturation: Option<f64>,
    warmth: f64,
    tint: f64,
    inverse_gamma: Option<f64>,
    highlights: f64,
    shadows: f64,
    sepia: f64,
}

impl Grade {
    fn resolve(params: &ToneParams) -> Self {
        let contrast = params.contrast.unwrap_or(0.0);
        let saturation = if params.grayscale == Some(1.0) {
            0.0
        } else {
            (100.0 + params.saturation.unwrap_or(0.0)) / 100.0
        };
        let gamma = params.gamma.unwrap_or(1.0);

        Self {
            contrast: (contrast != 0.0).then_some((100.0 + contrast) / 100.0),
            brightness: params.brightness.unwrap_or(0.0),
            saturation: (saturation != 1.0).then_some(saturation),
            warmth: params.warmth.unwrap_or(0.0),
            tint: params.tint.unwrap_or(0.0),
            inverse_gamma: (gamma != 1.0).then_some(1.0 / gamma),
            highlights: params.highlights.unwrap_or(0.0),
            shadows: params.shadows.unwrap_or(0.0),
            sepia: params.sepia.unwrap_or(0.0),
        }
    }

    /// Run the full chain on one pixel. Intermediates are unclamped.
    fn apply(&self, rgb: [f64; 3]) -> [f64; 3] {
        let [mut r, mut g, mut b] = rgb;

        if let Some(factor) = self.contrast {
            r = factor * (r - 128.0) + 128.0;
            g = factor * (g - 128.0) + 128.0;
            b = factor * (b - 128.0) + 128.0;
        }

        r += self.brightness;
        g += self.brightness;
        b += self.brightness;

        if let Some(factor) = self.saturation {
            let gray = LUMA_601[0] * r + LUMA_601[1] * g + LUMA_601[2] * b;
            r = gray + factor * (r - gray);
            g = gray + factor * (g - gray);
            b = gray + factor * (b - gray);
        }

        if self.warmth != 0.0 {
            r += self.warmth * 2.0;
            b -= self.warmth * 1.5;
        }

        if self.tint != 0.0 {
            g += self.tint * 1.5;
            r -= self.tint * 0.5;
            b -= self.tint * 0.5;
        }

        // Negative intermediates yield NaN here; the byte store maps it to 0
        if let Some(exponent) = self.inverse_gamma {
            r = 255.0 * (r / 255.0).powf(exponent);
            g = 255.0 * (g / 255.0).powf(exponent);
            b = 255.0 * (b / 255.0).powf(exponent);
        }

        let luminance = LUMA_709[0] * r + LUMA_709[1] * g + LUMA_709[2] * b;

        if self.highlights != 0.0 && luminance > HIGHLIGHT_FLOOR {
            let factor = self.highlights / 100.0;
            r += (255.0 - r) * factor;
            g += (255.0 - g) * factor;
            b += (255.0 - b) * factor;
        }

        if self.shadows != 0.0 && luminance < SHADOW_CEILING {
            let factor = self.shadows / 100.0;
            r += r * factor;
            g += g * factor;
            b += b * factor;
        }

        if self.sepia > 0.0 {
            let tone = |row: [f64; 3]| row[0] * r + row[1] * g + row[2] * b;
            let (sr, sg, sb) = (tone(SEPIA[0]), tone(SEPIA[1]), tone(SEPIA[2]));
            r = (1.0 - self.sepia) * r + self.sepia * sr;
            g = (1.0 - self.sepia) * g + self.sepia * sg;
            b = (1.0 - self.sepia) * b + self.sepia * sb;
        }

        [r, g, b]
    }
}

/// Apply global tone adjustments to every pixel of `source`.
///
/// Adjustments run in a fixed order: contrast, brightness, saturation
/// (or grayscale), warmth, tint, gamma, highlights/shadows, sepia.
/// Each step sees the unclamped output of the previous one. Values are
/// clamped to `0..=255` once, when stored. Alpha is copied unchanged.
///
/// Returns [`RetouchError::InvalidDomain`] if `params` fails validation.
///
/// ```
/// use pixel_retouch::{grade, PixelBuffer, ToneParams};
///
/// let red = PixelBuffer::from_pixel(1, 1, [255, 0, 0, 255]);
/// let sepia = grade(&red, &ToneParams::new().sepia(1.0)).unwrap();
/// assert_eq!(sepia.pixel(0, 0), [100, 89, 69, 255]);
/// ```
pub fn grade(source: &PixelBuffer, params: &ToneParams) -> Result<PixelBuffer, RetouchError> {
    params.validate()?;

    let grade = Grade::resolve(params);
    let mut output = source.clone();

    let _span = tracing::debug_span!(
        "grade",
        width = source.width(),
        height = source.height(),
    )
    .entered();

    for px in output.data_mut().chunks_exact_mut(4) {
        let [r, g, b] = grade.apply([px[0] as f64, px[1] as f64, px[2] as f64]);
        px[0] = store_channel(r);
        px[1] = store_channel(g);
        px[2] = store_channel(b);
    }

    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn grade_one(rgba: [u8; 4], params: &ToneParams) -> [u8; 4] {
        grade(&PixelBuffer::from_pixel(1, 1, rgba), params)
            .unwrap()
            .pixel(0, 0)
    }

    #[test]
    fn test_empty_params_are_identity() {
        let mut source = PixelBuffer::from_pixel(4, 4, [12, 200, 99, 7]);
        source.set_pixel(3, 2, [255, 0, 128, 0]);
        assert_eq!(grade(&source, &ToneParams::new()).unwrap(), source);
    }

    #[test]
    fn test_neutral_values_are_identity() {
        let params = ToneParams::new()
            .brightness(0.0)
            .contrast(0.0)
            .saturation(0.0)
            .warmth(0.0)
            .tint(0.0)
            .gamma(1.0)
            .highlights(0.0)
            .shadows(0.0)
            .grayscale(0.0)
            .sepia(0.0);
        assert_eq!(grade_one([31, 141, 59, 255], &params), [31, 141, 59, 255]);
    }

    #[test]
    fn test_contrast_clamps_on_store() {
        // 2.0 * (200 - 128) + 128 = 272 -> 255
        assert_eq!(
            grade_one([200, 128, 56, 255], &ToneParams::new().contrast(100.0)),
            [255, 128, 0, 255]
        );
    }

    #[test]
    fn test_brightness_is_additive() {
        assert_eq!(
            grade_one([10, 100, 250, 255], &ToneParams::new().brightness(20.0)),
            [30, 120, 255, 255]
        );
    }

    #[test]
    fn test_grayscale_overrides_saturation() {
        let params = ToneParams::new().grayscale(1.0).saturation(80.0);
        let [r, g, b, a] = grade_one([200, 100, 50, 255], &params);
        assert_eq!((r, g, b, a), (124, 124, 124, 255));
    }

    #[test]
    fn test_grayscale_requires_exactly_one() {
        let params = ToneParams::new().grayscale(0.5);
        assert_eq!(grade_one([200, 100, 50, 255], &params), [200, 100, 50, 255]);
    }

    #[test]
    fn test_warmth_and_tint() {
        // r += 20, b -= 15
        assert_eq!(
            grade_one([100, 100, 100, 255], &ToneParams::new().warmth(10.0)),
            [120, 100, 85, 255]
        );
        // g += 15, r -= 5, b -= 5
        assert_eq!(
            grade_one([100, 100, 100, 255], &ToneParams::new().tint(10.0)),
            [95, 115, 95, 255]
        );
    }

    #[test]
    fn test_gamma_brightens_midtones() {
        let [r, ..] = grade_one([64, 64, 64, 255], &ToneParams::new().gamma(2.0));
        // 255 * (64/255)^0.5 = 127.75
        assert_eq!(r, 128);
    }

    #[test]
    fn test_gamma_on_negative_intermediate_stores_zero() {
        let params = ToneParams::new().brightness(-50.0).gamma(2.0);
        assert_eq!(grade_one([10, 10, 10, 255], &params), [0, 0, 0, 255]);
    }

    #[test]
    fn test_highlights_only_touch_bright_pixels() {
        let params = ToneParams::new().highlights(50.0);
        // lum 200 > 180: 200 + 55 * 0.5 = 227.5 -> 228
        assert_eq!(grade_one([200, 200, 200, 255], &params), [228, 228, 228, 255]);
        assert_eq!(grade_one([100, 100, 100, 255], &params), [100, 100, 100, 255]);
    }

    #[test]
    fn test_shadows_only_touch_dark_pixels() {
        let params = ToneParams::new().shadows(50.0);
        assert_eq!(grade_one([40, 40, 40, 255], &params), [60, 60, 60, 255]);
        assert_eq!(grade_one([100, 100, 100, 255], &params), [100, 100, 100, 255]);
    }

    #[test]
    fn test_sepia_on_pure_red() {
        assert_eq!(
            grade_one([255, 0, 0, 255], &ToneParams::new().sepia(1.0)),
            [100, 89, 69, 255]
        );
    }

    #[test]
    fn test_alpha_untouched() {
        let params = ToneParams::new().contrast(40.0).sepia(0.5).warmth(12.0);
        assert_eq!(grade_one([90, 80, 70, 33], &params)[3], 33);
    }

    #[test]
    fn test_invalid_gamma_rejected() {
        let source = PixelBuffer::from_pixel(1, 1, [0; 4]);
        assert!(grade(&source, &ToneParams::new().gamma(0.0)).is_err());
    }
}
