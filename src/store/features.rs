use std::collections::BTreeMap;

use chrono::Utc;

use crate::models::{Feature, FeatureId, FeatureSummary, ModifiedFeature};

/// Features loaded from the remote store plus the set of local edits.
///
/// Loaded features are what the map draws. Every modification also lands in
/// the modified set, keyed by id, until a save clears it. Later modifications
/// of the same feature overwrite earlier ones.
#[derive(Debug, Default, Clone)]
pub struct FeatureStore {
    loaded: BTreeMap<FeatureId, Feature>,
    modified: BTreeMap<FeatureId, ModifiedFeature>,
    revision: u64,
}

impl FeatureStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the loaded features after a fetch.
    ///
    /// Unsaved edits stay in the modified set and are re-applied on top of the
    /// fresh copies so the map keeps showing them.
    pub fn replace_all(&mut self, features: impl IntoIterator<Item = Feature>) {
        self.loaded = features.into_iter().map(|f| (f.id.clone(), f)).collect();
        for (id, entry) in &self.modified {
            self.loaded.insert(id.clone(), entry.feature.clone());
        }
    }

    pub fn get(&self, id: &FeatureId) -> Option<&Feature> {
        self.loaded.get(id)
    }

    pub fn features(&self) -> impl Iterator<Item = &Feature> {
        self.loaded.values()
    }

    pub fn len(&self) -> usize {
        self.loaded.len()
    }

    pub fn is_empty(&self) -> bool {
        self.loaded.is_empty()
    }

    pub fn summaries(&self) -> Vec<FeatureSummary> {
        self.loaded
            .values()
            .map(|f| FeatureSummary {
                id: f.id.clone(),
                vertex_count: f.ring.0.len(),
                modified: self.modified.contains_key(&f.id),
            })
            .collect()
    }

    /// Upsert an edited feature. Returns the revision assigned to the edit.
    pub fn apply_modification(&mut self, feature: Feature) -> u64 {
        self.revision += 1;
        let revision = self.revision;
        self.loaded.insert(feature.id.clone(), feature.clone());
        self.modified.insert(
            feature.id.clone(),
            ModifiedFeature {
                feature,
                revision,
                modified_at: Utc::now(),
            },
        );
        revision
    }

    /// Remove one vertex of a loaded feature and record it as a modification.
    ///
    /// Returns `None` if the feature is unknown or the index is out of range.
    pub fn remove_vertex(&mut self, id: &FeatureId, index: usize) -> Option<u64> {
        let mut feature = self.loaded.get(id)?.clone();
        if index >= feature.ring.0.len() {
            return None;
        }
        feature.ring.0.remove(index);
        Some(self.apply_modification(feature))
    }

    pub fn modified(&self) -> impl Iterator<Item = &ModifiedFeature> {
        self.modified.values()
    }

    pub fn modified_snapshot(&self) -> Vec<ModifiedFeature> {
        self.modified.values().cloned().collect()
    }

    pub fn is_dirty(&self) -> bool {
        !self.modified.is_empty()
    }

    /// Drop the entries a save wrote, unless they were modified again meanwhile.
    pub fn clear_saved(&mut self, saved: &[(FeatureId, u64)]) -> usize {
        let mut cleared = 0;
        for (id, revision) in saved {
            if self.modified.get(id).map(|m| m.revision) == Some(*revision) {
                self.modified.remove(id);
                cleared += 1;
            }
        }
        cleared
    }

    pub fn clear_modified(&mut self) {
        self.modified.clear();
    }
}
