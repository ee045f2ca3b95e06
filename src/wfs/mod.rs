//! Talking to the remote feature store: `GetFeature` decoding, transaction
//! building and the HTTP client.

mod client;
pub mod response;
pub mod transaction;
pub mod xml;

use reqwest::StatusCode;
use thiserror::Error;

pub use client::WfsClient;
pub use transaction::{Transaction, Update};

/// WFS errors.
#[derive(Debug, Error)]
pub enum WfsError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Unauthorized: check the GeoServer credentials")]
    Unauthorized,

    #[error("GeoServer returned {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("Failed to decode response: {0}")]
    Decode(String),

    #[error("Failed to build transaction: {0}")]
    Xml(#[from] xml::XmlError),
}
