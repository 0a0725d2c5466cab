pub mod config;
pub mod preset;

pub use config::{AppConfig, ExportConfig, Limits};
pub use preset::Preset;
