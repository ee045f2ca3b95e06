//! In-process state the map is drawn from.
//!
//! [`PolygonStore`] backs the single-polygon editor, [`FeatureStore`] the
//! multi-feature editor fed by WFS. Both are synchronous and free of I/O;
//! [`crate::sync::SyncController`] owns them behind locks.

mod features;
mod polygon;

pub use features::FeatureStore;
pub use polygon::PolygonStore;
