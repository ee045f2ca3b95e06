use geo_types::Coord;
use serde::{Deserialize, Serialize};

/// A named corner of the editable polygon.
///
/// Positions are WGS84 longitude/latitude. Nothing prevents two vertices from
/// sharing a position; a closed ring has its first and last vertex coincide.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vertex {
    #[serde(with = "super::lon_lat")]
    pub position: Coord<f64>,
    pub label: String,
}

impl Vertex {
    pub fn new(position: Coord<f64>, label: impl Into<String>) -> Self {
        Self {
            position,
            label: label.into(),
        }
    }

    /// Build the vertex list for a ring, labelled `Point 1..n`.
    pub fn labelled(ring: impl IntoIterator<Item = Coord<f64>>) -> Vec<Vertex> {
        ring.into_iter()
            .enumerate()
            .map(|(i, position)| Vertex::new(position, label_for(i)))
            .collect()
    }
}

/// Display label for the vertex at `index`.
pub fn label_for(index: usize) -> String {
    format!("Point {}", index + 1)
}
