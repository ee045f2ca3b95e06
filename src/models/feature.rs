use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use geo_types::LineString;
use serde::{Deserialize, Serialize};

/// Opaque identifier of a feature in the remote store (e.g. `parcels.12`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureId(pub String);

impl FeatureId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FeatureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for FeatureId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for FeatureId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// A scalar feature attribute.
///
/// The remote store may serve nested JSON in properties; only scalars survive
/// ingest since only scalars can be written back in a transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Null,
    Bool(bool),
    Number(serde_json::Number),
    Text(String),
}

impl AttributeValue {
    /// Convert a JSON value, returning `None` for arrays and objects.
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::Null => Some(Self::Null),
            serde_json::Value::Bool(b) => Some(Self::Bool(*b)),
            serde_json::Value::Number(n) => Some(Self::Number(n.clone())),
            serde_json::Value::String(s) => Some(Self::Text(s.clone())),
            serde_json::Value::Array(_) | serde_json::Value::Object(_) => None,
        }
    }

    /// Text written into a transaction, `None` for null.
    pub fn to_wire(&self) -> Option<String> {
        match self {
            Self::Null => None,
            Self::Bool(b) => Some(b.to_string()),
            Self::Number(n) => Some(n.to_string()),
            Self::Text(s) => Some(s.clone()),
        }
    }
}

/// A polygon feature: exterior ring in lon/lat plus scalar attributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    pub id: FeatureId,
    #[serde(with = "super::lon_lat_ring")]
    pub ring: LineString<f64>,
    #[serde(default)]
    pub attributes: BTreeMap<String, AttributeValue>,
}

impl Feature {
    pub fn new(id: impl Into<FeatureId>, ring: LineString<f64>) -> Self {
        Self {
            id: id.into(),
            ring,
            attributes: BTreeMap::new(),
        }
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: AttributeValue) -> Self {
        self.attributes.insert(name.into(), value);
        self
    }
}

/// An entry of the modified-feature set.
///
/// `revision` increases store-wide on every modification, so a finished save
/// can tell whether the entry it sent is still the latest one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModifiedFeature {
    pub feature: Feature,
    pub revision: u64,
    pub modified_at: DateTime<Utc>,
}

/// Feature row for list responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureSummary {
    pub id: FeatureId,
    pub vertex_count: usize,
    pub modified: bool,
}
