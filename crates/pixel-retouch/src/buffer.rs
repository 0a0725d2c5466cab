//! RGBA pixel buffer shared by every stage of the pipeline.
//!
//! A [`PixelBuffer`] is a row-major sequence of 8-bit RGBA samples. Alpha is
//! carried through every transform verbatim. Processing never mutates its
//! input: each pass clones the source into a scratch buffer it owns.

use crate::api::RetouchError;

/// Number of samples per pixel (R, G, B, A).
pub const CHANNELS: usize = 4;

/// A decoded RGBA8 image.
///
/// Invariant: `data.len() == width * height * 4`.
///
/// # Example
///
/// ```
/// use pixel_retouch::PixelBuffer;
///
/// let buffer = PixelBuffer::from_pixel(2, 2, [128, 128, 128, 255]);
/// assert_eq!(buffer.pixel(1, 1), [128, 128, 128, 255]);
/// assert_eq!(buffer.as_bytes().len(), 16);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: usize,
    height: usize,
    data: Vec<u8>,
}

impl PixelBuffer {
    /// Wrap raw RGBA samples, validating the length invariant.
    pub fn new(width: usize, height: usize, data: Vec<u8>) -> Result<Self, RetouchError> {
        let expected = width * height * CHANNELS;
        if data.len() != expected {
            return Err(RetouchError::BufferSize {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Create a buffer filled with a single RGBA value.
    pub fn from_pixel(width: usize, height: usize, rgba: [u8; 4]) -> Self {
        let data = rgba
            .iter()
            .copied()
            .cycle()
            .take(width * height * CHANNELS)
            .collect();
        Self {
            width,
            height,
            data,
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

    /// Number of pixels (`width * height`).
    #[inline]
    pub fn pixel_count(&self) -> usize {
        self.width * self.height
    }

    /// True for zero-area buffers, which the pipeline treats as "nothing to process".
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pixel_count() == 0
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    #[inline]
    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }

    /// RGBA value at `(x, y)`.
    ///
    /// # Panics
    ///
    /// Panics if the coordinate is out of bounds.
    #[inline]
    pub fn pixel(&self, x: usize, y: usize) -> [u8; 4] {
        let i = self.offset(x, y);
        [
            self.data[i],
            self.data[i + 1],
            self.data[i + 2],
            self.data[i + 3],
        ]
    }

    /// Overwrite the RGBA value at `(x, y)`.
    #[inline]
    pub fn set_pixel(&mut self, x: usize, y: usize, rgba: [u8; 4]) {
        let i = self.offset(x, y);
        self.data[i..i + CHANNELS].copy_from_slice(&rgba);
    }

    /// Byte offset of the pixel at `(x, y)`; the mask index is `offset / 4`.
    #[inline]
    pub fn offset(&self, x: usize, y: usize) -> usize {
        assert!(
            x < self.width && y < self.height,
            "pixel ({x}, {y}) outside {}x{} buffer",
            self.width,
            self.height
        );
        (y * self.width + x) * CHANNELS
    }

    pub(crate) fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }
}

/// Convert an intermediate channel value to a stored byte.
///
/// Mirrors a clamped byte store: NaN becomes 0, values are clamped to
/// `0..=255` and rounded half-to-even.
#[inline]
pub fn store_channel(value: f64) -> u8 {
    if value.is_nan() {
        return 0;
    }
    value.clamp(0.0, 255.0).round_ties_even() as u8
}
