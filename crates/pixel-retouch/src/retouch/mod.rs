//! Skin-aware local retouching.
//!
//! A pass runs three stages over one RGBA buffer:
//!
//! 1. **Classify** every pixel with [`is_skin`](crate::is_skin) into a raw
//!    0/255 [`SkinMask`](crate::SkinMask).
//! 2. **Blur** the mask with a clipped box filter so confidence falls off
//!    smoothly at region edges.
//! 3. **Composite** brightness, redness reduction and smoothing over the
//!    pixels whose confidence exceeds the threshold.
//!
//! Alongside the pixels the pass yields an [`AdjustmentLog`] describing what
//! was requested.

mod compositor;
mod ledger;
mod settings;

pub use compositor::{Compositor, RetouchOutput};
pub use ledger::{AdjustmentLog, AdjustmentLogEntry};
pub use settings::RetouchSettings;
