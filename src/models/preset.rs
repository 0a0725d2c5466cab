use pixel_retouch::ToneParams;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A named tone-grading bundle from the catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Preset {
    /// Display name, also the lookup key
    pub name: String,

    /// One-line description
    #[serde(default)]
    pub description: String,

    /// Adjustments applied when the preset is selected
    #[schema(value_type = Object)]
    pub params: ToneParams,
}
