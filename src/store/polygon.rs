use geo_types::{Coord, LineString};

use crate::models::Vertex;

/// The single editable polygon as an ordered, labelled vertex list.
///
/// All mutations are plain functions on the list; nothing here knows about
/// rendering. Ring closure is not re-established after a deletion, so removing
/// the first or last vertex leaves an open ring.
#[derive(Debug, Clone, PartialEq)]
pub struct PolygonStore {
    vertices: Vec<Vertex>,
}

impl Default for PolygonStore {
    /// A 4x4 degree square around the origin, closed.
    fn default() -> Self {
        Self::from_ring(vec![
            Coord { x: -1.0, y: -1.0 },
            Coord { x: 3.0, y: -1.0 },
            Coord { x: 3.0, y: 3.0 },
            Coord { x: -1.0, y: 3.0 },
            Coord { x: -1.0, y: -1.0 },
        ])
    }
}

impl PolygonStore {
    pub fn from_ring(ring: impl IntoIterator<Item = Coord<f64>>) -> Self {
        Self {
            vertices: Vertex::labelled(ring),
        }
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    pub fn ring(&self) -> LineString<f64> {
        LineString(self.vertices.iter().map(|v| v.position).collect())
    }

    pub fn is_ring_closed(&self) -> bool {
        !self.vertices.is_empty() && self.ring().is_closed()
    }

    /// Replace every vertex, relabelling them `Point 1..n`.
    pub fn replace_all(&mut self, ring: impl IntoIterator<Item = Coord<f64>>) {
        self.vertices = Vertex::labelled(ring);
    }

    /// Remove the vertex at `index`. Out of range leaves the list untouched.
    pub fn remove_at(&mut self, index: usize) -> Option<Vertex> {
        if index >= self.vertices.len() {
            return None;
        }
        Some(self.vertices.remove(index))
    }

    /// Remove the first vertex positioned exactly at `position`.
    ///
    /// A closed ring holds its start twice; only the first occurrence goes.
    pub fn remove_position(&mut self, position: Coord<f64>) -> Option<Vertex> {
        let index = self.position_of(position)?;
        self.remove_at(index)
    }

    pub fn position_of(&self, position: Coord<f64>) -> Option<usize> {
        self.vertices.iter().position(|v| v.position == position)
    }

    /// Fold a finished drag into the store: the reported ring wins outright.
    pub fn apply_modification(&mut self, ring: LineString<f64>) {
        self.replace_all(ring.0);
    }
}
