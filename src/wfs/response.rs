//! Decoding of `GetFeature` responses (`outputFormat=application/json`).

use geo_types::{Coord, LineString};
use geojson::{feature::Id, GeoJson, Value};

use super::WfsError;
use crate::models::{AttributeValue, Feature, FeatureId};

/// Parse a GeoJSON FeatureCollection into polygon features.
///
/// Features without an id or without polygonal geometry cannot be edited and
/// are skipped. Only the exterior ring is kept; for multipolygons only the
/// first member is.
pub fn parse_feature_collection(body: &str) -> Result<Vec<Feature>, WfsError> {
    let geojson: GeoJson = body
        .parse()
        .map_err(|e: geojson::Error| WfsError::Decode(e.to_string()))?;

    let collection = match geojson {
        GeoJson::FeatureCollection(fc) => fc,
        other => {
            return Err(WfsError::Decode(format!(
                "expected FeatureCollection, got {}",
                kind(&other)
            )))
        }
    };

    let mut features = Vec::with_capacity(collection.features.len());
    for feature in collection.features {
        let id = match feature.id {
            Some(Id::String(s)) => FeatureId(s),
            Some(Id::Number(n)) => FeatureId(n.to_string()),
            None => {
                tracing::warn!("Skipping feature without id");
                continue;
            }
        };

        let Some(ring) = feature.geometry.as_ref().and_then(|g| exterior_ring(&id, &g.value)) else {
            tracing::warn!("Skipping feature {} without polygon geometry", id);
            continue;
        };

        let mut attributes = std::collections::BTreeMap::new();
        for (name, value) in feature.properties.unwrap_or_default() {
            match AttributeValue::from_json(&value) {
                Some(v) => {
                    attributes.insert(name, v);
                }
                None => tracing::debug!("Dropping non-scalar attribute {} of {}", name, id),
            }
        }

        features.push(Feature {
            id,
            ring,
            attributes,
        });
    }

    Ok(features)
}

fn exterior_ring(id: &FeatureId, value: &Value) -> Option<LineString<f64>> {
    let rings = match value {
        Value::Polygon(rings) => rings,
        Value::MultiPolygon(polygons) => {
            if polygons.len() > 1 {
                tracing::warn!(
                    "Feature {} has {} polygons, editing only the first",
                    id,
                    polygons.len()
                );
            }
            polygons.first()?
        }
        _ => return None,
    };
    let exterior = rings.first()?;
    let coords = exterior
        .iter()
        .filter(|p| p.len() >= 2)
        .map(|p| Coord { x: p[0], y: p[1] })
        .collect::<Vec<_>>();
    Some(LineString(coords))
}

fn kind(geojson: &GeoJson) -> &'static str {
    match geojson {
        GeoJson::Geometry(_) => "Geometry",
        GeoJson::Feature(_) => "Feature",
        GeoJson::FeatureCollection(_) => "FeatureCollection",
    }
}
