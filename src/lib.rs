//! Polygon vertex editing synchronized with a GeoServer WFS endpoint.
//!
//! The crate is split along the path an edit travels:
//!
//! - [`models`]: vertices, features and the interaction events the map emits.
//! - [`store`]: the polygon and feature stores, the single source of truth for
//!   what is drawn.
//! - [`sync`]: folds interaction events into the stores and writes modified
//!   features back through [`wfs`].
//! - [`presentation`]: vertex listing, context menu and viewport math.
//! - [`api`]: the HTTP surface a browser front-end drives.

pub mod api;
pub mod config;
pub mod models;
pub mod presentation;
pub mod projection;
pub mod store;
pub mod sync;
pub mod wfs;
