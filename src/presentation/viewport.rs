use geo_types::Coord;
use serde::{Deserialize, Serialize};

use crate::models::Vertex;
use crate::projection::{to_web_mercator, HALF_WORLD};

/// Tile edge length the zoom levels are defined against.
pub const TILE_SIZE: f64 = 256.0;

/// Radius of the drawn vertex markers, used as the default hit tolerance.
pub const VERTEX_RADIUS_PX: f64 = 5.0;

/// A screen position relative to the map's top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pixel {
    pub x: f64,
    pub y: f64,
}

impl Pixel {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    fn distance(self, other: Pixel) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

/// What part of the world the map shows and at which size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MapView {
    /// Center in lon/lat.
    #[serde(with = "crate::models::lon_lat")]
    pub center: Coord<f64>,
    pub zoom: f64,
    pub max_zoom: f64,
    pub width: u32,
    pub height: u32,
}

impl MapView {
    pub fn new(center: Coord<f64>, zoom: f64, width: u32, height: u32) -> Self {
        Self {
            center,
            zoom,
            max_zoom: 19.0,
            width,
            height,
        }
        .clamped()
    }

    /// View used by the single-polygon editor.
    pub fn polygon_editor(width: u32, height: u32) -> Self {
        Self::new(Coord { x: 0.0, y: 0.0 }, 6.5, width, height)
    }

    /// View used by the feature editor.
    pub fn feature_editor(width: u32, height: u32) -> Self {
        Self::new(Coord { x: 99.0, y: 14.0 }, 12.0, width, height)
    }

    fn clamped(mut self) -> Self {
        self.zoom = self.zoom.clamp(0.0, self.max_zoom);
        self
    }

    /// Metres per pixel at the current zoom.
    pub fn resolution(&self) -> f64 {
        2.0 * HALF_WORLD / (TILE_SIZE * 2f64.powf(self.zoom))
    }

    /// Projected (EPSG:3857) coordinate under a pixel.
    pub fn pixel_to_projected(&self, pixel: Pixel) -> Coord<f64> {
        let center = to_web_mercator(self.center);
        let res = self.resolution();
        Coord {
            x: center.x + (pixel.x - self.width as f64 / 2.0) * res,
            y: center.y - (pixel.y - self.height as f64 / 2.0) * res,
        }
    }

    /// Pixel at which a lon/lat position is drawn.
    pub fn lon_lat_to_pixel(&self, position: Coord<f64>) -> Pixel {
        let center = to_web_mercator(self.center);
        let p = to_web_mercator(position);
        let res = self.resolution();
        Pixel {
            x: (p.x - center.x) / res + self.width as f64 / 2.0,
            y: (center.y - p.y) / res + self.height as f64 / 2.0,
        }
    }

    /// Index of the vertex drawn nearest to `pixel`, if within `tolerance_px`.
    pub fn hit_test(&self, pixel: Pixel, vertices: &[Vertex], tolerance_px: f64) -> Option<usize> {
        vertices
            .iter()
            .enumerate()
            .map(|(i, v)| (i, self.lon_lat_to_pixel(v.position).distance(pixel)))
            .filter(|&(_, d)| d <= tolerance_px)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(i, _)| i)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn center_maps_to_middle_pixel() {
        let view = MapView::polygon_editor(800, 600);
        let px = view.lon_lat_to_pixel(view.center);
        assert!((px.x - 400.0).abs() < 1e-6);
        assert!((px.y - 300.0).abs() < 1e-6);
    }

    #[test]
    fn zoom_zero_shows_world_in_one_tile() {
        let view = MapView::new(Coord { x: 0.0, y: 0.0 }, 0.0, 256, 256);
        let east = view.lon_lat_to_pixel(Coord { x: 180.0, y: 0.0 });
        assert!((east.x - 256.0).abs() < 1e-6);
    }

    #[test]
    fn north_is_up() {
        let view = MapView::polygon_editor(800, 600);
        let north = view.lon_lat_to_pixel(Coord { x: 0.0, y: 1.0 });
        assert!(north.y < 300.0);
    }

    #[test]
    fn pixel_round_trip() {
        let view = MapView::feature_editor(1024, 768);
        let pixel = Pixel::new(100.0, 700.0);
        let projected = view.pixel_to_projected(pixel);
        let back = view.lon_lat_to_pixel(crate::projection::to_lon_lat(projected));
        assert!((back.x - pixel.x).abs() < 1e-6);
        assert!((back.y - pixel.y).abs() < 1e-6);
    }

    #[test]
    fn zoom_is_clamped() {
        let view = MapView::new(Coord { x: 0.0, y: 0.0 }, 25.0, 10, 10);
        assert_eq!(view.zoom, 19.0);
    }

    #[test]
    fn hit_test_picks_nearest_vertex_within_tolerance() {
        let view = MapView::polygon_editor(800, 600);
        let vertices = Vertex::labelled(vec![Coord { x: 0.0, y: 0.0 }, Coord { x: 1.0, y: 0.0 }]);
        let second = view.lon_lat_to_pixel(vertices[1].position);

        let near = Pixel::new(second.x + 3.0, second.y);
        assert_eq!(view.hit_test(near, &vertices, VERTEX_RADIUS_PX), Some(1));

        let far = Pixel::new(second.x + 20.0, second.y);
        assert_eq!(view.hit_test(far, &vertices, VERTEX_RADIUS_PX), None);
    }
}
