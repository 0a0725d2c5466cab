//! Clipped square-window sums in constant time per pixel.
//!
//! Both the mask blur and the compositor's local smoothing average a
//! `(2R+1)x(2R+1)` window whose out-of-bounds cells are dropped from the sum
//! *and* from the count. A summed-area table answers each window query with
//! four lookups, so the cost no longer grows with `R²`. Sums are exact
//! integers, so the result is identical to the direct nested loop.

/// Summed-area table over one integer plane.
#[derive(Debug, Clone)]
pub(crate) struct SummedArea {
    width: usize,
    height: usize,
    /// `(width + 1) * (height + 1)` prefix sums with a zero border row/column.
    table: Vec<u64>,
}

impl SummedArea {
    /// Build the table from `width * height` row-major samples.
    pub(crate) fn new(width: usize, height: usize, samples: impl IntoIterator<Item = u64>) -> Self {
        let stride = width + 1;
        let mut table = vec![0u64; stride * (height + 1)];
        let mut samples = samples.into_iter();

        for y in 0..height {
            let mut row_sum = 0u64;
            for x in 0..width {
                row_sum += samples.next().unwrap_or(0);
                table[(y + 1) * stride + x + 1] = table[y * stride + x + 1] + row_sum;
            }
        }

        Self {
            width,
            height,
            table,
        }
    }

    /// Sum and in-bounds cell count of the window of `radius` centred on `(x, y)`.
    #[inline]
    pub(crate) fn window(&self, x: usize, y: usize, radius: usize) -> (u64, u64) {
        let x0 = x.saturating_sub(radius);
        let y0 = y.saturating_sub(radius);
        let x1 = x.saturating_add(radius).min(self.width - 1) + 1;
        let y1 = y.saturating_add(radius).min(self.height - 1) + 1;
        let stride = self.width + 1;

        let sum = self.table[y1 * stride + x1] + self.table[y0 * stride + x0]
            - self.table[y0 * stride + x1]
            - self.table[y1 * stride + x0];
        let count = ((x1 - x0) * (y1 - y0)) as u64;
        (sum, count)
    }
}
