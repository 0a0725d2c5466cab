//! Public entry points: the [`Retoucher`] facade and the error type.

pub(crate) mod error;
mod retoucher;

pub use error::RetouchError;
pub use retoucher::Retoucher;
