//! pixel-retouch: skin-aware retouching and tone grading for RGBA buffers
//!
//! The crate is the numeric core of a portrait editor. It performs no I/O:
//! callers decode images into a [`PixelBuffer`], run passes, and encode the
//! result themselves.
//!
//! # Quick Start
//!
//! The [`Retoucher`] facade validates parameters and runs either pass:
//!
//! ```
//! use pixel_retouch::{PixelBuffer, RetouchSettings, Retoucher, ToneParams};
//!
//! let portrait = PixelBuffer::from_pixel(16, 16, [205, 150, 130, 255]);
//! let retoucher = Retoucher::new();
//!
//! let settings = RetouchSettings::new().smoothness(40.0).redness(20.0);
//! let retouched = retoucher.retouch(Some(&portrait), &settings).unwrap().unwrap();
//! println!("{}", retouched.log);
//!
//! let warm = ToneParams::new().warmth(10.0).contrast(5.0);
//! let graded = retoucher.grade(Some(&retouched.buffer), &warm).unwrap().unwrap();
//! assert_eq!(graded.width(), 16);
//! ```
//!
//! # Passes
//!
//! ## Retouch (mask-driven, local)
//!
//! ```text
//! RGBA source
//!     |
//!     v
//! is_skin per pixel ------> raw mask (0 / 255)
//!                               |
//!                               v
//!                           box blur (radius R, clipped window)
//!                               |
//!                               v
//! source + mask ----------> compositor ---> retouched RGBA + AdjustmentLog
//! ```
//!
//! The classifier works in Y'CbCr (BT.601) with fixed bounds plus a
//! red-dominance test. The blurred mask is a confidence map in `0..=255`;
//! pixels above `threshold` receive brightness, redness reduction and
//! smoothing, blended in with a strength that ramps from 0 at the threshold
//! to 1 at full confidence.
//!
//! ## Grade (global)
//!
//! [`grade`] applies contrast, brightness, saturation, warmth, tint, gamma,
//! highlights/shadows and sepia to every pixel in that order, clamping
//! once when the result is stored.
//!
//! # Ordering
//!
//! Hosts that run passes concurrently stamp requests with a [`Sequence`]
//! from a [`Generation`] and commit a result only while
//! [`Generation::is_latest`] holds for it.
//!
//! # Numeric conventions
//!
//! - Intermediates are `f64` and unclamped.
//! - Stores clamp to `0..=255` and round half to even; NaN stores as 0.
//! - Alpha is never modified.

pub mod api;
pub mod buffer;
pub mod request;
pub mod retouch;
pub mod skin;
pub mod tone;

mod window;

#[cfg(test)]
mod domain_tests;

pub use api::{RetouchError, Retoucher};
pub use buffer::{store_channel, PixelBuffer};
pub use request::{GradeRequest, Generation, RetouchRequest, Sequence, Stamped};
pub use retouch::{AdjustmentLog, AdjustmentLogEntry, Compositor, RetouchOutput, RetouchSettings};
pub use skin::{is_skin, SkinMask, YCbCr};
pub use tone::{grade, ToneParams};
