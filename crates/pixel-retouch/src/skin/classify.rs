//! Luma/chroma skin classifier.

/// Luma and chroma components with the broadcast (BT.601) weighting,
/// chroma offset by 128.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct YCbCr {
    pub y: f64,
    pub cb: f64,
    pub cr: f64,
}

impl YCbCr {
    #[inline]
    pub fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        let (r, g, b) = (r as f64, g as f64, b as f64);
        Self {
            y: 0.299 * r + 0.587 * g + 0.114 * b,
            cb: 128.0 + (-0.168736 * r - 0.331264 * g + 0.5 * b),
            cr: 128.0 + (0.5 * r - 0.418688 * g - 0.081312 * b),
        }
    }
}

/// Classify a pixel as skin.
///
/// All of the following must hold (bounds exclusive):
/// `80 < Y < 220`, `85 < Cb < 135`, `135 < Cr < 180`, red dominates green
/// and blue, and red exceeds green by more than 15.
///
/// ```
/// use pixel_retouch::is_skin;
///
/// assert!(is_skin(220, 170, 150));
/// assert!(!is_skin(0, 0, 255));
/// ```
#[inline]
pub fn is_skin(r: u8, g: u8, b: u8) -> bool {
    let YCbCr { y, cb, cr } = YCbCr::from_rgb(r, g, b);

    y > 80.0
        && y < 220.0
        && cb > 85.0
        && cb < 135.0
        && cr > 135.0
        && cr < 180.0
        && r > g
        && r > b
        && r.abs_diff(g) > 15
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_typical_skin_tone() {
        assert!(is_skin(220, 170, 150));
        assert!(is_skin(200, 140, 120));
    }

    #[test]
    fn test_primaries_are_not_skin() {
        assert!(!is_skin(0, 0, 255));
        assert!(!is_skin(0, 255, 0));
        assert!(!is_skin(255, 0, 0), "pure red fails the luma bound");
    }

    #[test]
    fn test_greys_are_not_skin() {
        for v in [0u8, 64, 128, 192, 255] {
            assert!(!is_skin(v, v, v), "grey {v} classified as skin");
        }
    }

    #[test]
    fn test_red_green_gap_must_exceed_15() {
        // Same hue family, but r - g == 15 sits on the exclusive bound
        let ycc = YCbCr::from_rgb(200, 185, 160);
        assert!(ycc.y > 80.0 && ycc.y < 220.0);
        assert!(!is_skin(200, 185, 160));
    }

    #[test]
    fn test_ycbcr_of_white() {
        let ycc = YCbCr::from_rgb(255, 255, 255);
        assert!((ycc.y - 255.0).abs() < 1e-9);
        assert!((ycc.cb - 128.0).abs() < 1e-3);
        assert!((ycc.cr - 128.0).abs() < 1e-3);
    }

    #[test]
    fn test_deterministic() {
        for r in (0..=255u8).step_by(17) {
            for g in (0..=255u8).step_by(17) {
                for b in (0..=255u8).step_by(17) {
                    assert_eq!(is_skin(r, g, b), is_skin(r, g, b));
                }
            }
        }
    }
}
