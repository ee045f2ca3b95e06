use serde::{Deserialize, Serialize};

use super::FeatureId;

/// "Modification end" event from the map's vertex-drag interaction.
///
/// Coordinates are in the map's projected space (EPSG:3857), exactly as the
/// render surface reports them. Without a `feature_id` the event targets the
/// single editable polygon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModifyEvent {
    #[serde(default)]
    pub feature_id: Option<FeatureId>,
    pub coordinates: Vec<[f64; 2]>,
}

/// Something the user should be told about, shown as an alert by the front-end.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Notice {
    NothingToSave,
    Saved { count: usize },
    SaveFailed { message: String },
    FetchFailed { message: String },
}

impl Notice {
    pub fn message(&self) -> String {
        match self {
            Self::NothingToSave => "No modified features to save".to_string(),
            Self::Saved { count } => format!("Saved {} feature(s)", count),
            Self::SaveFailed { message } => format!("Failed to save features: {}", message),
            Self::FetchFailed { message } => format!("Failed to load features: {}", message),
        }
    }
}

/// Result of a save request that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SaveOutcome {
    NothingToSave,
    Saved { count: usize },
}
