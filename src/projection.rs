//! Spherical Web Mercator conversion between WGS84 lon/lat (EPSG:4326) and
//! the map's projected space (EPSG:3857).

use geo_types::{Coord, LineString};

/// WGS84 semi-major axis in metres, the sphere radius used by EPSG:3857.
pub const EARTH_RADIUS: f64 = 6_378_137.0;

/// Half the width of the projected world in metres.
pub const HALF_WORLD: f64 = std::f64::consts::PI * EARTH_RADIUS;

/// Latitude beyond which Web Mercator is undefined in practice.
pub const MAX_LATITUDE: f64 = 85.051_128_779_806_59;

/// Project a lon/lat position to EPSG:3857 metres.
pub fn to_web_mercator(lon_lat: Coord<f64>) -> Coord<f64> {
    let lat = lon_lat.y.clamp(-MAX_LATITUDE, MAX_LATITUDE);
    let x = EARTH_RADIUS * lon_lat.x.to_radians();
    let y = EARTH_RADIUS * (std::f64::consts::FRAC_PI_4 + lat.to_radians() / 2.0).tan().ln();
    Coord { x, y }
}

/// Inverse of [`to_web_mercator`].
pub fn to_lon_lat(projected: Coord<f64>) -> Coord<f64> {
    let lon = (projected.x / EARTH_RADIUS).to_degrees();
    let lat = (2.0 * (projected.y / EARTH_RADIUS).exp().atan() - std::f64::consts::FRAC_PI_2)
        .to_degrees();
    Coord { x: lon, y: lat }
}

/// Unproject a ring reported by the map back into lon/lat.
pub fn ring_to_lon_lat(projected: &[[f64; 2]]) -> LineString<f64> {
    projected
        .iter()
        .map(|&[x, y]| to_lon_lat(Coord { x, y }))
        .collect::<Vec<_>>()
        .into()
}

/// Project a lon/lat ring for display.
pub fn ring_to_web_mercator(ring: &LineString<f64>) -> Vec<[f64; 2]> {
    ring.0
        .iter()
        .map(|&c| {
            let p = to_web_mercator(c);
            [p.x, p.y]
        })
        .collect()
}
