//! Free-text adjustment requests.
//!
//! An [`AdjustmentParser`] turns a phrase such as "augmenter légèrement la
//! luminosité" into a sparse [`ToneParams`] bundle. The shipped
//! [`KeywordParser`] matches a fixed French vocabulary; other strategies can
//! be plugged in behind the same trait.

use pixel_retouch::ToneParams;

/// Result of parsing a phrase
#[derive(Debug, Clone, PartialEq)]
pub enum ParseOutcome {
    /// At least one adjustment was recognized
    Params(ToneParams),
    /// Empty input, or nothing in it matched
    Unrecognized,
}

/// Strategy for interpreting free-text adjustment requests
pub trait AdjustmentParser: Send + Sync {
    fn parse(&self, text: &str) -> ParseOutcome;
}

/// Keyword matcher over the French editing vocabulary
///
/// Intensity words apply to the whole phrase: "légèrement" = 10,
/// "très" = 40, "fortement" = 25, otherwise 20.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeywordParser;

impl KeywordParser {
    pub fn new() -> Self {
        Self
    }
}

fn contains_any(text: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| text.contains(n))
}

/// Magnitude implied by the phrase's intensity word
fn intensity(text: &str) -> f64 {
    if text.contains("légèrement") {
        10.0
    } else if text.contains("très") {
        40.0
    } else if text.contains("fortement") {
        25.0
    } else {
        20.0
    }
}

const INCREASE: &[&str] = &["augmenter"];
const DECREASE: &[&str] = &["réduire", "diminuer"];

/// Signed intensity for a keyword, or `None` when no direction is given
fn directed(text: &str, up: &[&str], down: &[&str]) -> Option<f64> {
    if contains_any(text, up) {
        Some(intensity(text))
    } else if contains_any(text, down) {
        Some(-intensity(text))
    } else {
        None
    }
}

impl AdjustmentParser for KeywordParser {
    fn parse(&self, text: &str) -> ParseOutcome {
        let text = text.trim().to_lowercase();
        if text.is_empty() {
            return ParseOutcome::Unrecognized;
        }
        let t = text.as_str();
        let mut params = ToneParams::new();

        if t.contains("luminosité") {
            params.brightness = directed(t, INCREASE, DECREASE);
        }

        if t.contains("contraste") {
            params.contrast = directed(
                t,
                &["augmenter", "plus fort"],
                &["réduire", "diminuer", "plus doux"],
            );
        }

        if contains_any(t, &["saturation", "couleurs"]) {
            params.saturation = directed(
                t,
                &["augmenter", "plus vives"],
                &["réduire", "diminuer", "moins vives"],
            );
        }

        if contains_any(t, &["température", "chaud", "froid", "bleu", "jaune"]) {
            params.warmth = directed(
                t,
                &[
                    "plus chaud",
                    "augmenter la température",
                    "jaune",
                    "réduire le bleu",
                ],
                &["plus froid", "augmenter le bleu", "réduire le jaune"],
            );
        }

        if contains_any(t, &["noir et blanc", "n&b", "désaturer totalement"]) {
            params.grayscale = Some(1.0);
        } else if t.contains("désaturer") {
            params.saturation = Some(-intensity(t));
        }

        if t.contains("sépia") {
            params.sepia = Some(if t.contains("léger") {
                0.2
            } else if t.contains("très") {
                0.8
            } else {
                0.5
            });
        }

        // Explicit channel phrases override the temperature guess above
        for (phrase, warmth, tint) in [
            ("réduire le bleu", Some(15.0), None),
            ("réduire le rouge", Some(-15.0), None),
            ("réduire le vert", None, Some(-10.0)),
            ("augmenter le bleu", Some(-15.0), None),
            ("augmenter le rouge", Some(15.0), None),
            ("augmenter le vert", None, Some(10.0)),
        ] {
            if t.contains(phrase) {
                params.warmth = warmth.or(params.warmth);
                params.tint = tint.or(params.tint);
            }
        }

        if t.contains("gamma") {
            if t.contains("augmenter") {
                params.gamma = Some(1.2);
            }
            if contains_any(t, DECREASE) {
                params.gamma = Some(0.8);
            }
        }

        if t.contains("hautes lumières") {
            if t.contains("augmenter") {
                params.highlights = Some(15.0);
            }
            if contains_any(t, DECREASE) {
                params.highlights = Some(-15.0);
            }
        }

        if t.contains("ombres") {
            if t.contains("augmenter") {
                params.shadows = Some(15.0);
            }
            if contains_any(t, DECREASE) {
                params.shadows = Some(-15.0);
            }
        }

        if params.is_empty() {
            tracing::debug!(text = %t, "No adjustment recognized");
            ParseOutcome::Unrecognized
        } else {
            ParseOutcome::Params(params)
        }
    }
}
