//! In-process stand-in for a GeoServer WFS endpoint.
//!
//! GET answers with a fixed FeatureCollection, POST records the transaction
//! and answers with the configured status. Delays can be queued per method to
//! hold a request open, and a one-off status can be queued for the next GET.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    extract::State,
    http::{header, HeaderMap, Method, StatusCode, Uri},
    response::IntoResponse,
    routing::any,
    Router,
};
use wfs_editor::config::EditorConfig;

pub const BASIC_AUTH: &str = "Basic YWRtaW46Z2Vvc2VydmVy";

#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: Method,
    pub query: Option<String>,
    pub authorization: Option<String>,
    pub content_type: Option<String>,
    pub body: String,
}

#[derive(Clone)]
pub struct MockGeoServer {
    pub requests: Arc<Mutex<Vec<Recorded>>>,
    pub get_status: Arc<Mutex<StatusCode>>,
    pub transaction_status: Arc<Mutex<StatusCode>>,
    pub get_delays: Arc<Mutex<VecDeque<Duration>>>,
    pub get_failures: Arc<Mutex<VecDeque<StatusCode>>>,
    pub post_delays: Arc<Mutex<VecDeque<Duration>>>,
    pub collection: Arc<Mutex<serde_json::Value>>,
}

impl Default for MockGeoServer {
    fn default() -> Self {
        Self {
            requests: Arc::default(),
            get_status: Arc::new(Mutex::new(StatusCode::OK)),
            transaction_status: Arc::new(Mutex::new(StatusCode::OK)),
            get_delays: Arc::default(),
            get_failures: Arc::default(),
            post_delays: Arc::default(),
            collection: Arc::new(Mutex::new(feature_collection())),
        }
    }
}

impl MockGeoServer {
    pub fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().unwrap().clone()
    }

    pub fn posts(&self) -> Vec<Recorded> {
        self.requests()
            .into_iter()
            .filter(|r| r.method == Method::POST)
            .collect()
    }

    pub fn set_transaction_status(&self, status: StatusCode) {
        *self.transaction_status.lock().unwrap() = status;
    }

    pub fn set_get_status(&self, status: StatusCode) {
        *self.get_status.lock().unwrap() = status;
    }

    pub fn delay_next_get(&self, delay: Duration) {
        self.get_delays.lock().unwrap().push_back(delay);
    }

    /// Answer the next GET to arrive with `status` instead of the default.
    pub fn fail_next_get(&self, status: StatusCode) {
        self.get_failures.lock().unwrap().push_back(status);
    }

    /// Wait until at least `count` requests have reached the server.
    pub async fn wait_for_requests(&self, count: usize) {
        while self.requests.lock().unwrap().len() < count {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    }

    pub fn delay_next_post(&self, delay: Duration) {
        self.post_delays.lock().unwrap().push_back(delay);
    }

    /// Serve on an ephemeral port; returns the WFS endpoint URL.
    pub async fn spawn(&self) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind mock GeoServer");
        let addr = listener.local_addr().expect("No local address");
        let app = Router::new()
            .route("/geoserver/wfs", any(handle))
            .with_state(self.clone());
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("Mock GeoServer failed");
        });
        format!("http://{}/geoserver/wfs", addr)
    }

    /// Spawn and build a matching editor configuration.
    pub async fn config(&self) -> EditorConfig {
        EditorConfig {
            geoserver_url: self.spawn().await,
            username: Some("admin".to_string()),
            password: Some("geoserver".to_string()),
            timeout_secs: 5,
            ..Default::default()
        }
    }
}

async fn handle(
    State(mock): State<MockGeoServer>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: String,
) -> impl IntoResponse {
    let header_value = |name: header::HeaderName| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };
    mock.requests.lock().unwrap().push(Recorded {
        method: method.clone(),
        query: uri.query().map(str::to_string),
        authorization: header_value(header::AUTHORIZATION),
        content_type: header_value(header::CONTENT_TYPE),
        body,
    });

    if method == Method::GET {
        let failure = mock.get_failures.lock().unwrap().pop_front();
        let delay = mock.get_delays.lock().unwrap().pop_front();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        let status = failure.unwrap_or(*mock.get_status.lock().unwrap());
        let body = mock.collection.lock().unwrap().to_string();
        (status, body)
    } else {
        let delay = mock.post_delays.lock().unwrap().pop_front();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        let status = *mock.transaction_status.lock().unwrap();
        (status, "<wfs:TransactionResponse/>".to_string())
    }
}

pub fn feature_collection() -> serde_json::Value {
    serde_json::json!({
        "type": "FeatureCollection",
        "features": [
            {
                "type": "Feature",
                "id": "test.1",
                "geometry": {
                    "type": "MultiPolygon",
                    "coordinates": [[[[99.0, 14.0], [99.01, 14.0], [99.01, 14.01], [99.0, 14.01], [99.0, 14.0]]]]
                },
                "properties": { "name": "north plot", "area": 1.5 }
            },
            {
                "type": "Feature",
                "id": "test.2",
                "geometry": {
                    "type": "Polygon",
                    "coordinates": [[[99.02, 14.0], [99.03, 14.0], [99.03, 14.01], [99.02, 14.0]]]
                },
                "properties": { "name": "south <plot> & co" }
            }
        ]
    })
}
