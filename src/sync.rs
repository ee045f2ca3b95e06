//! Sync controller: folds map interaction into the stores and writes modified
//! features back to the remote store.
//!
//! Two flows:
//!
//! - **Modification**: a finished vertex drag arrives as a [`ModifyEvent`] in
//!   projected coordinates. It is unprojected and either replaces the single
//!   polygon or is upserted into the feature store's modified set.
//! - **Save**: the modified set is snapshotted, turned into one WFS
//!   transaction with an `Update` per feature and posted once. HTTP 200 clears
//!   the saved entries; anything else leaves them for another attempt.
//!
//! Saves covering a feature that is already being saved are refused, and both
//! saves and fetches can be cancelled through a [`CancellationToken`].

use std::collections::{HashSet, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use geo_types::Coord;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::config::EditorConfig;
use crate::models::*;
use crate::projection;
use crate::store::{FeatureStore, PolygonStore};
use crate::wfs::transaction::{closed_len, MIN_RING_POSITIONS};
use crate::wfs::{Transaction, Update, WfsClient, WfsError};

const NOTICE_CAPACITY: usize = 32;

#[derive(Debug, Error)]
pub enum SyncError {
    #[error(transparent)]
    Wfs(#[from] WfsError),

    #[error("Feature not found: {0}")]
    UnknownFeature(FeatureId),

    #[error("Modification carried no coordinates")]
    EmptyGeometry,

    #[error("Vertex not found")]
    VertexNotFound,

    #[error("Ring would keep only {0} positions, a polygon needs at least 4")]
    RingTooSmall(usize),

    #[error("Save already in progress for: {0:?}")]
    SaveInFlight(Vec<FeatureId>),

    #[error("Request cancelled")]
    Cancelled,

    #[error("Superseded by a newer fetch")]
    Superseded,
}

/// Receives the messages a user should see after a fetch or save.
pub trait Notifier: Send + Sync {
    fn notify(&self, notice: Notice);
}

/// Notifier that only logs.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notice: Notice) {
        log_notice(&notice);
    }
}

/// Keeps the most recent notices for a front-end to poll, and logs them.
#[derive(Debug, Default, Clone)]
pub struct NoticeBoard {
    notices: Arc<Mutex<VecDeque<Notice>>>,
}

impl NoticeBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn recent(&self) -> Vec<Notice> {
        let notices = self.notices.lock().expect("notice lock poisoned");
        notices.iter().cloned().collect()
    }
}

impl Notifier for NoticeBoard {
    fn notify(&self, notice: Notice) {
        log_notice(&notice);
        let mut notices = self.notices.lock().expect("notice lock poisoned");
        if notices.len() == NOTICE_CAPACITY {
            notices.pop_front();
        }
        notices.push_back(notice);
    }
}

fn log_notice(notice: &Notice) {
    match notice {
        Notice::SaveFailed { .. } | Notice::FetchFailed { .. } => {
            tracing::warn!("{}", notice.message())
        }
        _ => tracing::info!("{}", notice.message()),
    }
}

/// Ids of features with a save in progress, released on drop.
struct InFlightGuard {
    set: Arc<Mutex<HashSet<FeatureId>>>,
    ids: Vec<FeatureId>,
}

impl InFlightGuard {
    fn acquire(set: &Arc<Mutex<HashSet<FeatureId>>>, ids: Vec<FeatureId>) -> Result<Self, SyncError> {
        let mut in_flight = set.lock().expect("in-flight lock poisoned");
        let busy: Vec<FeatureId> = ids.iter().filter(|id| in_flight.contains(*id)).cloned().collect();
        if !busy.is_empty() {
            return Err(SyncError::SaveInFlight(busy));
        }
        in_flight.extend(ids.iter().cloned());
        Ok(Self {
            set: Arc::clone(set),
            ids,
        })
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        if let Ok(mut in_flight) = self.set.lock() {
            for id in &self.ids {
                in_flight.remove(id);
            }
        }
    }
}

#[derive(Clone)]
pub struct SyncController {
    client: WfsClient,
    type_name: String,
    namespace_uri: Option<String>,
    geometry_property: String,
    polygon: Arc<Mutex<PolygonStore>>,
    features: Arc<Mutex<FeatureStore>>,
    in_flight: Arc<Mutex<HashSet<FeatureId>>>,
    fetch_generation: Arc<AtomicU64>,
    /// Generation of the fetch the feature store was last filled from.
    /// Only written with the feature lock held.
    applied_generation: Arc<AtomicU64>,
    notifier: Arc<dyn Notifier>,
}

impl SyncController {
    pub fn new(config: &EditorConfig, notifier: Arc<dyn Notifier>) -> Result<Self, WfsError> {
        Ok(Self {
            client: WfsClient::new(config)?,
            type_name: config.type_name.clone(),
            namespace_uri: config.namespace_uri.clone(),
            geometry_property: config.geometry_property.clone(),
            polygon: Arc::new(Mutex::new(PolygonStore::default())),
            features: Arc::new(Mutex::new(FeatureStore::new())),
            in_flight: Arc::new(Mutex::new(HashSet::new())),
            fetch_generation: Arc::new(AtomicU64::new(0)),
            applied_generation: Arc::new(AtomicU64::new(0)),
            notifier,
        })
    }

    // ============================================================
    // Single polygon
    // ============================================================

    pub fn polygon(&self) -> PolygonStore {
        self.polygon.lock().expect("polygon lock poisoned").clone()
    }

    pub fn replace_polygon(&self, ring: Vec<Coord<f64>>) {
        self.polygon
            .lock()
            .expect("polygon lock poisoned")
            .replace_all(ring);
    }

    pub fn remove_polygon_vertex(&self, index: usize) -> Result<Vertex, SyncError> {
        let mut polygon = self.polygon.lock().expect("polygon lock poisoned");
        let removed = polygon.remove_at(index).ok_or(SyncError::VertexNotFound)?;
        warn_if_open(&polygon);
        Ok(removed)
    }

    pub fn remove_polygon_position(&self, position: Coord<f64>) -> Result<Vertex, SyncError> {
        let mut polygon = self.polygon.lock().expect("polygon lock poisoned");
        let removed = polygon
            .remove_position(position)
            .ok_or(SyncError::VertexNotFound)?;
        warn_if_open(&polygon);
        Ok(removed)
    }

    // ============================================================
    // Features
    // ============================================================

    pub fn feature_summaries(&self) -> Vec<FeatureSummary> {
        self.features
            .lock()
            .expect("feature lock poisoned")
            .summaries()
    }

    pub fn feature(&self, id: &FeatureId) -> Option<Feature> {
        self.features
            .lock()
            .expect("feature lock poisoned")
            .get(id)
            .cloned()
    }

    pub fn modified(&self) -> Vec<ModifiedFeature> {
        self.features
            .lock()
            .expect("feature lock poisoned")
            .modified_snapshot()
    }

    pub fn remove_feature_vertex(&self, id: &FeatureId, index: usize) -> Result<(), SyncError> {
        let mut features = self.features.lock().expect("feature lock poisoned");
        let ring = &features
            .get(id)
            .ok_or_else(|| SyncError::UnknownFeature(id.clone()))?
            .ring;
        if index >= ring.0.len() {
            return Err(SyncError::VertexNotFound);
        }
        let mut remaining = ring.clone();
        remaining.0.remove(index);
        let positions = closed_len(&remaining);
        if positions < MIN_RING_POSITIONS {
            return Err(SyncError::RingTooSmall(positions));
        }
        features
            .remove_vertex(id, index)
            .ok_or(SyncError::VertexNotFound)?;
        Ok(())
    }

    /// Move one vertex of a feature. The closing vertex of a closed ring
    /// follows its twin so the ring stays closed.
    pub fn move_feature_vertex(
        &self,
        id: &FeatureId,
        index: usize,
        position: Coord<f64>,
    ) -> Result<(), SyncError> {
        let mut features = self.features.lock().expect("feature lock poisoned");
        let mut feature = features
            .get(id)
            .cloned()
            .ok_or_else(|| SyncError::UnknownFeature(id.clone()))?;
        let len = feature.ring.0.len();
        if index >= len {
            return Err(SyncError::VertexNotFound);
        }
        let closed = len > 1 && feature.ring.is_closed();
        feature.ring.0[index] = position;
        if closed && (index == 0 || index == len - 1) {
            feature.ring.0[0] = position;
            feature.ring.0[len - 1] = position;
        }
        features.apply_modification(feature);
        Ok(())
    }

    /// Apply a finished vertex drag.
    pub fn on_modify_end(&self, event: ModifyEvent) -> Result<(), SyncError> {
        if event.coordinates.is_empty() {
            return Err(SyncError::EmptyGeometry);
        }
        let ring = projection::ring_to_lon_lat(&event.coordinates);

        match event.feature_id {
            None => {
                tracing::debug!("Polygon modified ({} vertices)", ring.0.len());
                self.polygon
                    .lock()
                    .expect("polygon lock poisoned")
                    .apply_modification(ring);
            }
            Some(id) => {
                let mut features = self.features.lock().expect("feature lock poisoned");
                let mut feature = features
                    .get(&id)
                    .cloned()
                    .ok_or_else(|| SyncError::UnknownFeature(id.clone()))?;
                feature.ring = ring;
                let revision = features.apply_modification(feature);
                tracing::debug!("Feature {} modified (revision {})", id, revision);
            }
        }
        Ok(())
    }

    /// Fetch features from the remote store and replace the loaded set.
    ///
    /// Failures are reported to the notifier and leave the loaded set as it
    /// was. A response is discarded only if a newer fetch has already been
    /// applied; a newer fetch that fails or is cancelled does not count.
    pub async fn reload_features(&self, cancel: &CancellationToken) -> Result<usize, SyncError> {
        let generation = self.fetch_generation.fetch_add(1, Ordering::SeqCst) + 1;

        let result = tokio::select! {
            _ = cancel.cancelled() => Err(SyncError::Cancelled),
            r = self.client.get_features() => r.map_err(SyncError::from),
        };

        let features = match result {
            Ok(features) => features,
            Err(SyncError::Cancelled) => {
                tracing::debug!("Feature fetch {} cancelled", generation);
                return Err(SyncError::Cancelled);
            }
            Err(e) => {
                tracing::error!("Error loading features: {}", e);
                self.notifier.notify(Notice::FetchFailed {
                    message: e.to_string(),
                });
                return Err(e);
            }
        };

        let mut store = self.features.lock().expect("feature lock poisoned");
        if self.applied_generation.load(Ordering::SeqCst) > generation {
            tracing::debug!("Discarding stale feature fetch {}", generation);
            return Err(SyncError::Superseded);
        }
        let count = features.len();
        store.replace_all(features);
        self.applied_generation.store(generation, Ordering::SeqCst);
        tracing::info!("Loaded {} features", count);
        Ok(count)
    }

    /// Write every modified feature back in a single transaction.
    pub async fn save(&self, cancel: &CancellationToken) -> Result<SaveOutcome, SyncError> {
        let snapshot = self
            .features
            .lock()
            .expect("feature lock poisoned")
            .modified_snapshot();

        if snapshot.is_empty() {
            self.notifier.notify(Notice::NothingToSave);
            return Ok(SaveOutcome::NothingToSave);
        }

        let ids = snapshot.iter().map(|m| m.feature.id.clone()).collect();
        let _guard = InFlightGuard::acquire(&self.in_flight, ids)?;

        let save_id = Uuid::new_v4();
        let count = snapshot.len();
        tracing::info!("Save {}: writing {} feature(s)", save_id, count);

        let result = match self.build_transaction(&snapshot) {
            Ok(body) => tokio::select! {
                _ = cancel.cancelled() => Err(SyncError::Cancelled),
                r = self.client.transaction(body) => r.map_err(SyncError::from),
            },
            Err(e) => Err(e),
        };

        match result {
            Ok(_) => {
                let saved: Vec<(FeatureId, u64)> = snapshot
                    .iter()
                    .map(|m| (m.feature.id.clone(), m.revision))
                    .collect();
                let cleared = self
                    .features
                    .lock()
                    .expect("feature lock poisoned")
                    .clear_saved(&saved);
                if cleared < count {
                    tracing::debug!(
                        "Save {}: {} feature(s) changed during save and stay modified",
                        save_id,
                        count - cleared
                    );
                }
                self.notifier.notify(Notice::Saved { count });
                Ok(SaveOutcome::Saved { count })
            }
            Err(SyncError::Cancelled) => {
                tracing::warn!("Save {} cancelled", save_id);
                Err(SyncError::Cancelled)
            }
            Err(e) => {
                tracing::error!("Save {} failed: {}", save_id, e);
                self.notifier.notify(Notice::SaveFailed {
                    message: e.to_string(),
                });
                Err(e)
            }
        }
    }

    fn build_transaction(&self, snapshot: &[ModifiedFeature]) -> Result<String, SyncError> {
        let mut tx = Transaction::new(&self.type_name, &self.geometry_property)
            .with_namespace(self.namespace_uri.clone());
        for modified in snapshot {
            tx.push(Update::from_feature(&modified.feature, &self.geometry_property));
        }
        tx.to_xml().map_err(|e| SyncError::Wfs(e.into()))
    }
}

fn warn_if_open(polygon: &PolygonStore) {
    if !polygon.is_empty() && !polygon.is_ring_closed() {
        tracing::warn!("Polygon ring is no longer closed");
    }
}
