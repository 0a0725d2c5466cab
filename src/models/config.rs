use crate::assets::AssetLoader;
use pixel_retouch::RetouchSettings;
use serde::Deserialize;

use super::preset::Preset;

/// Application configuration loaded from config.yaml
#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    /// Request size limits
    #[serde(default)]
    pub limits: Limits,

    /// Encoder settings for downloads
    #[serde(default)]
    pub export: ExportConfig,

    /// Values used for retouch fields a request leaves out
    #[serde(default)]
    pub retouch_defaults: RetouchSettings,

    /// Named tone-grading bundles
    #[serde(default)]
    pub presets: Vec<Preset>,
}

/// Caller-side limits checked before any pixel work
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct Limits {
    /// Largest accepted upload body
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,

    /// Largest accepted decoded image (width * height)
    #[serde(default = "default_max_pixels")]
    pub max_pixels: u64,

    /// Largest accepted mask blur radius
    #[serde(default = "default_max_blur_radius")]
    pub max_blur_radius: usize,

    /// Most sessions kept in memory; the least recently updated is evicted
    #[serde(default = "default_max_sessions")]
    pub max_sessions: usize,

    /// Seconds without an update after which a session expires (0 = never)
    #[serde(default = "default_session_idle_secs")]
    pub session_idle_secs: u64,
}

fn default_max_upload_bytes() -> usize {
    25 * 1024 * 1024
}

fn default_max_pixels() -> u64 {
    40_000_000
}

fn default_max_blur_radius() -> usize {
    50
}

fn default_max_sessions() -> usize {
    32
}

fn default_session_idle_secs() -> u64 {
    3600
}

impl Limits {
    /// Idle timeout as a duration, `None` when disabled
    pub fn session_idle_ttl(&self) -> Option<chrono::Duration> {
        match self.session_idle_secs {
            0 => None,
            secs => chrono::Duration::try_seconds(secs.min(i64::MAX as u64) as i64),
        }
    }
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_upload_bytes: default_max_upload_bytes(),
            max_pixels: default_max_pixels(),
            max_blur_radius: default_max_blur_radius(),
            max_sessions: default_max_sessions(),
            session_idle_secs: default_session_idle_secs(),
        }
    }
}

/// Encoder qualities for the JPEG download tiers
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct ExportConfig {
    #[serde(default = "default_jpeg_high_quality")]
    pub jpeg_high_quality: u8,

    #[serde(default = "default_jpeg_medium_quality")]
    pub jpeg_medium_quality: u8,
}

fn default_jpeg_high_quality() -> u8 {
    92
}

fn default_jpeg_medium_quality() -> u8 {
    80
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            jpeg_high_quality: default_jpeg_high_quality(),
            jpeg_medium_quality: default_jpeg_medium_quality(),
        }
    }
}

impl AppConfig {
    /// Load configuration from AssetLoader (embedded or external)
    pub fn load_from_assets(loader: &AssetLoader) -> Self {
        match loader.read_config_string() {
            Ok(content) => match Self::from_yaml(&content) {
                Ok(config) => {
                    tracing::info!(
                        presets = config.presets.len(),
                        max_pixels = config.limits.max_pixels,
                        "Loaded configuration"
                    );
                    config
                }
                Err(e) => {
                    tracing::warn!(%e, "Failed to parse config, using defaults");
                    Self::default()
                }
            },
            Err(e) => {
                tracing::warn!(%e, "Failed to read config, using defaults");
                Self::default()
            }
        }
    }

    /// Parse and validate a YAML document.
    ///
    /// Rejects retouch defaults or preset parameters outside their numeric
    /// domain so a bad file falls back to defaults instead of failing later
    /// per request.
    pub fn from_yaml(content: &str) -> anyhow::Result<Self> {
        let config: Self = serde_yaml::from_str(content)?;
        config
            .retouch_defaults
            .validate()
            .map_err(|e| anyhow::anyhow!("retouch_defaults: {e}"))?;
        for preset in &config.presets {
            preset
                .params
                .validate()
                .map_err(|e| anyhow::anyhow!("preset '{}': {e}", preset.name))?;
        }
        Ok(config)
    }

    /// Find a preset by name (case-insensitive)
    pub fn find_preset(&self, name: &str) -> Option<&Preset> {
        let wanted = name.trim().to_lowercase();
        self.presets
            .iter()
            .find(|p| p.name.to_lowercase() == wanted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();

        assert_eq!(config.limits, Limits::default());
        assert_eq!(config.export.jpeg_high_quality, 92);
        assert_eq!(config.export.jpeg_medium_quality, 80);
        assert_eq!(config.retouch_defaults, RetouchSettings::default());
        assert!(config.presets.is_empty());
    }

    #[test]
    fn test_deserialize_config() {
        let yaml = r#"
limits:
  max_upload_bytes: 1024
  max_blur_radius: 5
export:
  jpeg_high_quality: 95
retouch_defaults:
  smoothness: 30
  blur: 4
presets:
  - name: Warm
    description: Warmer tones
    params: { warmth: 10, contrast: 5 }
"#;

        let config = AppConfig::from_yaml(yaml).unwrap();

        assert_eq!(config.limits.max_upload_bytes, 1024);
        assert_eq!(config.limits.max_pixels, 40_000_000);
        assert_eq!(config.limits.max_blur_radius, 5);
        assert_eq!(config.export.jpeg_high_quality, 95);
        assert_eq!(config.export.jpeg_medium_quality, 80);
        assert_eq!(config.retouch_defaults.smoothness, 30.0);
        assert_eq!(config.retouch_defaults.blur, 4);
        assert!((config.retouch_defaults.threshold - 0.3).abs() < f64::EPSILON);

        let warm = &config.presets[0];
        assert_eq!(warm.name, "Warm");
        assert_eq!(warm.params.warmth, Some(10.0));
        assert_eq!(warm.params.brightness, None);
    }

    #[test]
    fn test_session_limits() {
        let config = AppConfig::from_yaml("limits: { max_sessions: 4, session_idle_secs: 0 }\n").unwrap();
        assert_eq!(config.limits.max_sessions, 4);
        assert_eq!(config.limits.session_idle_ttl(), None);

        let defaults = Limits::default();
        assert_eq!(defaults.max_sessions, 32);
        assert_eq!(defaults.session_idle_ttl(), chrono::Duration::try_seconds(3600));
    }

    #[test]
    fn test_from_yaml_rejects_invalid_preset() {
        let yaml = r#"
presets:
  - name: Broken
    params: { gamma: 0 }
"#;
        let err = AppConfig::from_yaml(yaml).unwrap_err();
        assert!(err.to_string().contains("Broken"));
    }

    #[test]
    fn test_from_yaml_rejects_invalid_threshold() {
        let yaml = "retouch_defaults: { threshold: 1.0 }\n";
        assert!(AppConfig::from_yaml(yaml).is_err());
    }

    #[test]
    fn test_find_preset_case_insensitive() {
        let config = AppConfig::from_yaml(
            "presets:\n  - name: Couleurs vives\n    params: { saturation: 25 }\n",
        )
        .unwrap();

        assert!(config.find_preset("couleurs VIVES").is_some());
        assert!(config.find_preset("  Couleurs vives ").is_some());
        assert!(config.find_preset("unknown").is_none());
    }

    #[test]
    fn test_embedded_config_loads_full_catalog() {
        let loader = AssetLoader::new(None);
        let config = AppConfig::load_from_assets(&loader);

        assert_eq!(config.presets.len(), 20);
        assert_eq!(config.presets[0].name, "Lumineux & doux");
        assert!(config.find_preset("Sépia Classique").is_some());
        assert_eq!(config.retouch_defaults, RetouchSettings::default());
    }
}
