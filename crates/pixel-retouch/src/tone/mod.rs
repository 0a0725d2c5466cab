//! Global tone grading.
//!
//! Unlike the retouch pass, grading is mask-free: the same chain of
//! adjustments runs on every pixel. Inputs are sparse [`ToneParams`]
//! bundles where an absent field means "leave unchanged".

mod grade;
mod params;

pub use grade::grade;
pub use params::ToneParams;
