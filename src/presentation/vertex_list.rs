//! Text rendering of the vertex and feature lists.

use crate::models::{FeatureSummary, Vertex};

const REMOVE: &str = "[Remove]";

/// Render the polygon's vertices, one row per vertex with a remove affordance.
///
/// Example output:
/// ```text
/// Polygon Coordinates:
///   Point 1: -1, -1 [Remove]
///   Point 2: 3, -1 [Remove]
/// ```
pub fn render_vertex_list(vertices: &[Vertex]) -> String {
    let mut output = String::from("Polygon Coordinates:\n");
    for vertex in vertices {
        output.push_str(&format!(
            "  {}: {}, {} {}\n",
            vertex.label, vertex.position.x, vertex.position.y, REMOVE
        ));
    }
    output
}

/// Render loaded features; `*` marks unsaved modifications.
///
/// ```text
/// * test.1 (5 vertices)
///   test.2 (12 vertices)
/// ```
pub fn render_feature_list(features: &[FeatureSummary]) -> String {
    let mut output = String::new();
    for f in features {
        let marker = if f.modified { '*' } else { ' ' };
        output.push_str(&format!("{} {} ({} vertices)\n", marker, f.id, f.vertex_count));
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FeatureId;
    use geo_types::Coord;

    #[test]
    fn renders_each_vertex_with_label_and_position() {
        let vertices = Vertex::labelled(vec![Coord { x: -1.0, y: -1.0 }, Coord { x: 3.0, y: 2.5 }]);
        assert_eq!(
            render_vertex_list(&vertices),
            "Polygon Coordinates:\n  Point 1: -1, -1 [Remove]\n  Point 2: 3, 2.5 [Remove]\n"
        );
    }

    #[test]
    fn empty_list_renders_header_only() {
        assert_eq!(render_vertex_list(&[]), "Polygon Coordinates:\n");
    }

    #[test]
    fn marks_modified_features() {
        let features = vec![
            FeatureSummary {
                id: FeatureId::new("test.1"),
                vertex_count: 5,
                modified: true,
            },
            FeatureSummary {
                id: FeatureId::new("test.2"),
                vertex_count: 12,
                modified: false,
            },
        ];
        assert_eq!(
            render_feature_list(&features),
            "* test.1 (5 vertices)\n  test.2 (12 vertices)\n"
        );
    }
}
