//! Tone-grading parameter bundle.

use serde::{Deserialize, Serialize};

use crate::api::error::ensure_finite;
use crate::api::RetouchError;

/// A sparse set of global tone adjustments.
///
/// Every field is optional; an absent field means "no change". Bundles come
/// from three places (a named preset, the text parser and explicit slider
/// values) and are combined with [`ToneParams::overlay`].
///
/// Units:
/// - `brightness`: additive offset in channel units
/// - `contrast`, `saturation`, `highlights`, `shadows`: percent
/// - `warmth`, `tint`: channel-unit multipliers (see [`grade`](crate::grade))
/// - `gamma`: exponent denominator, must be `> 0`
/// - `grayscale`: `1` forces saturation to zero
/// - `sepia`: blend amount in `0..=1`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToneParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brightness: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contrast: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub saturation: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warmth: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tint: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gamma: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub highlights: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shadows: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grayscale: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sepia: Option<f64>,
}

macro_rules! setter {
    ($($name:ident),* $(,)?) => {
        $(
            #[inline]
            pub fn $name(mut self, value: f64) -> Self {
                self.$name = Some(value);
                self
            }
        )*
    };
}

impl ToneParams {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    setter!(
        brightness, contrast, saturation, warmth, tint, gamma, highlights, shadows, grayscale,
        sepia,
    );

    /// Named values in grading order, skipping absent fields.
    pub fn fields(&self) -> impl Iterator<Item = (&'static str, f64)> + '_ {
        [
            ("contrast", self.contrast),
            ("brightness", self.brightness),
            ("saturation", self.saturation),
            ("grayscale", self.grayscale),
            ("warmth", self.warmth),
            ("tint", self.tint),
            ("gamma", self.gamma),
            ("highlights", self.highlights),
            ("shadows", self.shadows),
            ("sepia", self.sepia),
        ]
        .into_iter()
        .filter_map(|(name, value)| value.map(|v| (name, v)))
    }

    /// True if no field is present.
    pub fn is_empty(&self) -> bool {
        self.fields().next().is_none()
    }

    /// Combine two bundles; fields present in `other` win.
    ///
    /// ```
    /// use pixel_retouch::ToneParams;
    ///
    /// let preset = ToneParams::new().brightness(20.0).contrast(-10.0);
    /// let manual = ToneParams::new().contrast(15.0);
    /// let merged = preset.overlay(&manual);
    /// assert_eq!(merged.brightness, Some(20.0));
    /// assert_eq!(merged.contrast, Some(15.0));
    /// ```
    pub fn overlay(&self, other: &ToneParams) -> ToneParams {
        ToneParams {
            brightness: other.brightness.or(self.brightness),
            contrast: other.contrast.or(self.contrast),
            saturation: other.saturation.or(self.saturation),
            warmth: other.warmth.or(self.warmth),
            tint: other.tint.or(self.tint),
            gamma: other.gamma.or(self.gamma),
            highlights: other.highlights.or(self.highlights),
            shadows: other.shadows.or(self.shadows),
            grayscale: other.grayscale.or(self.grayscale),
            sepia: other.sepia.or(self.sepia),
        }
    }

    /// Every present value must be finite and `gamma` strictly positive.
    pub fn validate(&self) -> Result<(), RetouchError> {
        for (name, value) in self.fields() {
            ensure_finite(name, value)?;
        }
        if let Some(gamma) = self.gamma {
            if gamma <= 0.0 {
                return Err(RetouchError::invalid(
                    "gamma",
                    gamma,
                    "must be greater than 0",
                ));
            }
        }
        Ok(())
    }
}
