//! HTTP client for a GeoServer WFS endpoint.
//!
//! Configuration comes from [`EditorConfig`]: base URL, optional basic-auth
//! credentials, layer name, feature limit and request timeout.

use std::time::Duration;

use reqwest::{header, Client, StatusCode};

use super::response::parse_feature_collection;
use super::WfsError;
use crate::config::EditorConfig;
use crate::models::Feature;

/// GetFeature is issued against this protocol version.
const GET_FEATURE_VERSION: &str = "1.0.0";

/// HTTP client for one WFS feature type.
#[derive(Debug, Clone)]
pub struct WfsClient {
    base_url: String,
    credentials: Option<(String, String)>,
    type_name: String,
    max_features: u32,
    client: Client,
}

impl WfsClient {
    /// Create from the editor configuration.
    pub fn new(config: &EditorConfig) -> Result<Self, WfsError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        let credentials = config
            .username
            .clone()
            .map(|user| (user, config.password.clone().unwrap_or_default()));
        Ok(Self {
            base_url: config.geoserver_url.clone(),
            credentials,
            type_name: config.type_name.clone(),
            max_features: config.max_features,
            client,
        })
    }

    /// Build a request with the basic-auth header when credentials are set.
    fn request(&self, method: reqwest::Method) -> reqwest::RequestBuilder {
        let req = self.client.request(method, &self.base_url);
        match &self.credentials {
            Some((user, pass)) => req.basic_auth(user, Some(pass)),
            None => req,
        }
    }

    /// Fetch up to `max_features` features of the configured type.
    pub async fn get_features(&self) -> Result<Vec<Feature>, WfsError> {
        let max_features = self.max_features.to_string();
        let response = self
            .request(reqwest::Method::GET)
            .query(&[
                ("service", "WFS"),
                ("version", GET_FEATURE_VERSION),
                ("request", "GetFeature"),
                ("typeName", self.type_name.as_str()),
                ("maxFeatures", max_features.as_str()),
                ("outputFormat", "application/json"),
            ])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(status_error(status, body));
        }

        let features = parse_feature_collection(&body)?;
        tracing::debug!("Fetched {} features of {}", features.len(), self.type_name);
        Ok(features)
    }

    /// POST a transaction document. Only HTTP 200 counts as success.
    ///
    /// The response body is returned as-is; per-feature results are not read.
    pub async fn transaction(&self, body: String) -> Result<String, WfsError> {
        let response = self
            .request(reqwest::Method::POST)
            .header(header::CONTENT_TYPE, "text/xml")
            .body(body)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        if status != StatusCode::OK {
            return Err(status_error(status, body));
        }
        Ok(body)
    }
}

fn status_error(status: StatusCode, body: String) -> WfsError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => WfsError::Unauthorized,
        _ => WfsError::Status { status, body },
    }
}
