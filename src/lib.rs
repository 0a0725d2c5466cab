//! Teint - skin-aware photo retouching server
//!
//! HTTP host around the `pixel-retouch` pipeline: uploads, retouch and
//! tone-grading passes, presets and downloads.
//! This library exposes modules for integration testing.

pub mod api;
pub mod assets;
pub mod error;
pub mod models;
pub mod server;
pub mod services;
