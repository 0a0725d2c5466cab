//! Domain-critical regression tests for pixel-retouch.
//!
//! Each test targets one class of bug and says what a failure means.

#[cfg(test)]
mod domain_tests {
    use crate::api::Retoucher;
    use crate::buffer::PixelBuffer;
    use crate::request::{Generation, GradeRequest, RetouchRequest};
    use crate::retouch::{Compositor, RetouchSettings};
    use crate::skin::SkinMask;
    use crate::tone::{grade, ToneParams};

    const SKIN: [u8; 4] = [220, 170, 150, 255];
    const SKY: [u8; 4] = [70, 130, 220, 255];

    fn portrait(width: usize, height: usize) -> PixelBuffer {
        let mut buffer = PixelBuffer::from_pixel(width, height, SKY);
        for y in height / 4..height * 3 / 4 {
            for x in width / 4..width * 3 / 4 {
                buffer.set_pixel(x, y, SKIN);
            }
        }
        buffer
    }

    // ========================================================================
    // Mask blur
    // ========================================================================

    /// If this breaks, it means: the blur pads out-of-bounds cells with zero
    /// (or divides by the full window size), darkening the mask along image
    /// borders so skin touching the frame edge is under-retouched.
    #[test]
    fn test_blur_does_not_fade_at_borders() {
        let all_skin = PixelBuffer::from_pixel(5, 5, SKIN);
        let mask = SkinMask::classify(&all_skin).box_blur(3);
        assert!(mask.values().iter().all(|&v| v == 255));
    }

    /// If this breaks, it means: the blurred mean is rounded instead of
    /// truncated. 255/2 must store as 127, not 128.
    #[test]
    fn test_blur_truncates_mean() {
        let raw = SkinMask::from_values(2, 1, vec![255, 0]);
        assert_eq!(raw.box_blur(1).values(), &[127, 127]);
    }

    /// If this breaks, it means: a huge blur radius overflows the window
    /// bounds instead of clipping to the image.
    #[test]
    fn test_blur_accepts_unbounded_radius() {
        let raw = SkinMask::from_values(3, 1, vec![255, 0, 0]);
        assert_eq!(raw.box_blur(usize::MAX).values(), &[85, 85, 85]);
    }

    /// If this breaks, it means: an extreme smoothness turns into a radius
    /// that overflows the smoothing window. The window must clip to the
    /// whole image instead.
    #[test]
    fn test_extreme_smoothness_does_not_overflow() {
        let source = portrait(8, 8);
        let settings = RetouchSettings::new().smoothness(1e300).blur(0);
        let out = Retoucher::new()
            .retouch(Some(&source), &settings)
            .unwrap()
            .unwrap();

        assert_eq!(out.buffer.pixel(0, 0), SKY);
        assert_eq!(out.buffer.width(), 8);
    }

    // ========================================================================
    // Compositing
    // ========================================================================

    /// If this breaks, it means: local smoothing reads pixels the compositor
    /// has already written, so results depend on scan order. Every window
    /// must average the untouched source.
    #[test]
    fn test_smoothing_reads_source_not_output() {
        let mut source = PixelBuffer::from_pixel(3, 1, [0, 0, 0, 255]);
        source.set_pixel(1, 0, [200, 200, 200, 255]);
        let mask = SkinMask::from_values(3, 1, vec![255; 3]);
        let compositor =
            Compositor::new(RetouchSettings::new().smoothness(100.0).threshold(0.0)).unwrap();

        let out = compositor.composite(&source, &mask);
        // Window mean is 200/3 everywhere, blend 0.3:
        //   edges  0   * 0.7 + 66.67 * 0.3 = 20
        //   centre 200 * 0.7 + 66.67 * 0.3 = 160
        // Reading written output instead would give 162 at the centre.
        assert_eq!(out.pixel(0, 0)[0], 20);
        assert_eq!(out.pixel(1, 0)[0], 160);
        assert_eq!(out.pixel(2, 0)[0], 20);
    }

    /// If this breaks, it means: the compositor leaks effects outside the
    /// detected region (for example by ignoring the threshold gate).
    #[test]
    fn test_background_untouched_by_strong_retouch() {
        let source = portrait(24, 24);
        let settings = RetouchSettings::new()
            .smoothness(100.0)
            .brightness(50.0)
            .redness(80.0)
            .blur(2);
        let out = Retoucher::new()
            .retouch(Some(&source), &settings)
            .unwrap()
            .unwrap();

        for (x, y) in [(0, 0), (23, 0), (0, 23), (23, 23), (2, 12)] {
            assert_eq!(out.buffer.pixel(x, y), SKY, "background at ({x}, {y})");
        }
        assert_ne!(out.buffer.pixel(12, 12), SKIN);
    }

    /// If this breaks, it means: a pass rewrote the alpha channel.
    #[test]
    fn test_alpha_survives_both_passes() {
        let mut source = portrait(12, 12);
        for y in 0..12 {
            for x in 0..12 {
                let mut px = source.pixel(x, y);
                px[3] = (x * 20 + y) as u8;
                source.set_pixel(x, y, px);
            }
        }
        let retoucher = Retoucher::new();
        let retouched = retoucher
            .retouch(
                Some(&source),
                &RetouchSettings::new().brightness(20.0).smoothness(60.0).blur(1),
            )
            .unwrap()
            .unwrap();
        let graded = retoucher
            .grade(
                Some(&retouched.buffer),
                &ToneParams::new().contrast(30.0).sepia(0.7).gamma(1.4),
            )
            .unwrap()
            .unwrap();

        for y in 0..12 {
            for x in 0..12 {
                assert_eq!(graded.pixel(x, y)[3], source.pixel(x, y)[3]);
            }
        }
    }

    // ========================================================================
    // Tone grading
    // ========================================================================

    /// If this breaks, it means: grading clamps between steps instead of once
    /// at the end. Brightness pushes red to 350; the grey point must be
    /// computed from 350, not 255.
    #[test]
    fn test_grade_clamps_only_on_store() {
        let source = PixelBuffer::from_pixel(1, 1, [250, 0, 0, 255]);
        let params = ToneParams::new().brightness(100.0).grayscale(1.0);
        // 0.299 * 350 + 0.587 * 100 + 0.114 * 100 = 174.75
        assert_eq!(
            grade(&source, &params).unwrap().pixel(0, 0),
            [175, 175, 175, 255]
        );
    }

    /// If this breaks, it means: the grading order changed. Contrast must run
    /// before brightness, so the brightness offset is not scaled.
    #[test]
    fn test_contrast_runs_before_brightness() {
        let source = PixelBuffer::from_pixel(1, 1, [128, 128, 128, 255]);
        let params = ToneParams::new().contrast(100.0).brightness(10.0);
        // (128 - 128) * 2 + 128 + 10 = 138; the reverse order would give 148
        assert_eq!(grade(&source, &params).unwrap().pixel(0, 0)[0], 138);
    }

    // ========================================================================
    // Ordering
    // ========================================================================

    /// If this breaks, it means: a slow pass for an older request could be
    /// committed over a newer one.
    #[test]
    fn test_stale_result_is_not_latest() {
        let source = portrait(8, 8);
        let generation = Generation::new();
        let retoucher = Retoucher::new();

        let slow = RetouchRequest {
            sequence: generation.next(),
            settings: RetouchSettings::new().smoothness(80.0),
        };
        let fast = GradeRequest {
            sequence: generation.next(),
            params: ToneParams::new().warmth(5.0),
        };

        let fast_result = retoucher.grade_request(Some(&source), &fast).unwrap().unwrap();
        let slow_result = retoucher
            .retouch_request(Some(&source), &slow)
            .unwrap()
            .unwrap();

        assert!(generation.is_latest(fast_result.sequence));
        assert!(!generation.is_latest(slow_result.sequence));
    }
}
