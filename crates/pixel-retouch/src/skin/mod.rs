//! Skin detection: the per-pixel classifier and the soft mask built from it.
//!
//! The raw mask marks every classified pixel with 255 and everything else
//! with 0. A box blur then turns the hard classification into a soft
//! confidence map that the compositor uses as a blend weight.

mod classify;
mod mask;

pub use classify::{is_skin, YCbCr};
pub use mask::SkinMask;
