//! Domain models for the editor.
//!
//! # Core Concepts
//!
//! - [`Vertex`]: a labelled corner of the single editable polygon.
//! - [`Feature`]: a polygon served by the remote WFS store, addressed by [`FeatureId`].
//! - [`ModifiedFeature`]: a locally edited feature waiting to be saved.
//! - [`ModifyEvent`]: a finished vertex drag, reported in projected coordinates.
//! - [`Notice`]: a message surfaced to the user after a fetch or save.
//!
//! Positions serialize as `[lon, lat]` pairs, matching GeoJSON.

mod event;
mod feature;
mod vertex;

pub use event::*;
pub use feature::*;
pub use vertex::*;

pub(crate) mod lon_lat {
    use geo_types::Coord;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(coord: &Coord<f64>, s: S) -> Result<S::Ok, S::Error> {
        [coord.x, coord.y].serialize(s)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Coord<f64>, D::Error> {
        let [x, y] = <[f64; 2]>::deserialize(d)?;
        Ok(Coord { x, y })
    }
}

pub(crate) mod lon_lat_ring {
    use geo_types::{Coord, LineString};
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(ring: &LineString<f64>, s: S) -> Result<S::Ok, S::Error> {
        let pairs: Vec<[f64; 2]> = ring.0.iter().map(|c| [c.x, c.y]).collect();
        pairs.serialize(s)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<LineString<f64>, D::Error> {
        let pairs = Vec::<[f64; 2]>::deserialize(d)?;
        Ok(LineString(
            pairs.into_iter().map(|[x, y]| Coord { x, y }).collect(),
        ))
    }
}
