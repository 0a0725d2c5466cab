//! Per-pixel skin confidence map.

use crate::buffer::PixelBuffer;
use crate::window::SummedArea;

use super::classify::is_skin;

/// One unsigned confidence byte per pixel, indexed `y * width + x`.
///
/// Created from the classifier, replaced by its blurred version, then read by
/// the compositor. It lives for a single processing pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkinMask {
    width: usize,
    height: usize,
    values: Vec<u8>,
}

impl SkinMask {
    /// Raw classification: 255 for skin pixels, 0 otherwise.
    pub fn classify(buffer: &PixelBuffer) -> Self {
        let values = buffer
            .as_bytes()
            .chunks_exact(4)
            .map(|px| if is_skin(px[0], px[1], px[2]) { 255 } else { 0 })
            .collect();

        Self {
            width: buffer.width(),
            height: buffer.height(),
            values,
        }
    }

    /// Build a mask directly from values (mostly useful for tests).
    ///
    /// # Panics
    ///
    /// Panics if `values.len() != width * height`.
    pub fn from_values(width: usize, height: usize, values: Vec<u8>) -> Self {
        assert_eq!(
            values.len(),
            width * height,
            "mask length must equal width * height"
        );
        Self {
            width,
            height,
            values,
        }
    }

    /// Box blur of `radius`, clipped to the image bounds.
    ///
    /// Each output is the integer mean (truncated) of the in-bounds cells of
    /// the `(2R+1)x(2R+1)` window; out-of-bounds neighbours count neither
    /// toward the sum nor toward the divisor. Radius 0 returns the mask
    /// unchanged.
    ///
    /// ```
    /// use pixel_retouch::SkinMask;
    ///
    /// let raw = SkinMask::from_values(3, 1, vec![255, 0, 0]);
    /// let blurred = raw.box_blur(1);
    /// assert_eq!(blurred.values(), &[127, 85, 0]);
    /// ```
    pub fn box_blur(&self, radius: usize) -> Self {
        if radius == 0 || self.values.is_empty() {
            return self.clone();
        }

        let table = SummedArea::new(
            self.width,
            self.height,
            self.values.iter().map(|&v| v as u64),
        );

        let mut values = Vec::with_capacity(self.values.len());
        for y in 0..self.height {
            for x in 0..self.width {
                let (sum, count) = table.window(x, y, radius);
                values.push((sum / count) as u8);
            }
        }

        Self {
            width: self.width,
            height: self.height,
            values,
        }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn values(&self) -> &[u8] {
        &self.values
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> u8 {
        self.values[y * self.width + x]
    }

    /// Confidence normalised to `0.0..=1.0`.
    #[inline]
    pub fn weight(&self, x: usize, y: usize) -> f64 {
        self.get(x, y) as f64 / 255.0
    }
}
