//! Human-readable record of the adjustments a pass was asked to make.
//!
//! The log is a projection of [`RetouchSettings`] taken before any pixel is
//! touched, so it reports requested settings rather than measured change.
//! Nothing in the pipeline reads it back.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::settings::RetouchSettings;

/// One labelled, unit-tagged adjustment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdjustmentLogEntry {
    /// Display label
    pub name: String,
    /// Magnitude (always reported as a non-negative number)
    pub value: f64,
    /// Unit suffix, e.g. `%`
    pub unit: String,
}

impl AdjustmentLogEntry {
    fn percent(name: &str, value: f64) -> Self {
        Self {
            name: name.to_string(),
            value,
            unit: "%".to_string(),
        }
    }
}

impl fmt::Display for AdjustmentLogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.value > 0.0 { "+" } else { "" };
        write!(f, "{}: {}{}{}", self.name, sign, self.value, self.unit)
    }
}

/// Ordered list of non-neutral adjustments for one pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AdjustmentLog {
    entries: Vec<AdjustmentLogEntry>,
}

impl AdjustmentLog {
    /// Project the settings into log entries.
    ///
    /// Order: smoothing, brightening/darkening, redness, uniformity. Blur
    /// radius and threshold are detection parameters and are not logged.
    pub fn from_settings(settings: &RetouchSettings) -> Self {
        let mut entries = Vec::new();

        if settings.smoothness > 0.0 {
            entries.push(AdjustmentLogEntry::percent(
                "Skin smoothing",
                settings.smoothness,
            ));
        }

        if settings.brightness != 0.0 {
            let name = if settings.brightness > 0.0 {
                "Brightening"
            } else {
                "Darkening"
            };
            entries.push(AdjustmentLogEntry::percent(
                name,
                settings.brightness.abs(),
            ));
        }

        if settings.redness > 0.0 {
            entries.push(AdjustmentLogEntry::percent(
                "Redness reduction",
                settings.redness,
            ));
        }

        if settings.uniformity > 0.0 {
            entries.push(AdjustmentLogEntry::percent(
                "Tone uniformity",
                settings.uniformity,
            ));
        }

        Self { entries }
    }

    #[inline]
    pub fn entries(&self) -> &[AdjustmentLogEntry] {
        &self.entries
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

impl fmt::Display for AdjustmentLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, entry) in self.entries.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{entry}")?;
        }
        Ok(())
    }
}
