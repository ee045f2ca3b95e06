use geo_types::{Coord, LineString};
use speculate2::speculate;
use wfs_editor::models::*;
use wfs_editor::store::{FeatureStore, PolygonStore};

fn c(x: f64, y: f64) -> Coord<f64> {
    Coord { x, y }
}

fn positions(store: &PolygonStore) -> Vec<Coord<f64>> {
    store.vertices().iter().map(|v| v.position).collect()
}

fn square() -> LineString<f64> {
    vec![(-1.0, -1.0), (3.0, -1.0), (3.0, 3.0), (-1.0, 3.0), (-1.0, -1.0)].into()
}

fn parcel(id: &str) -> Feature {
    Feature::new(id, square()).with_attribute("name", AttributeValue::Text(id.to_string()))
}

speculate! {
    describe "polygon store" {
        before {
            let mut store = PolygonStore::default();
        }

        describe "default" {
            it "holds the closed demo square labelled Point 1..5" {
                assert_eq!(store.len(), 5);
                assert!(store.is_ring_closed());
                let labels: Vec<&str> = store.vertices().iter().map(|v| v.label.as_str()).collect();
                assert_eq!(labels, vec!["Point 1", "Point 2", "Point 3", "Point 4", "Point 5"]);
            }
        }

        describe "remove_at" {
            it "removes exactly one vertex and keeps the others in order" {
                let removed = store.remove_at(2).expect("vertex 2 exists");
                assert_eq!(removed.position, c(3.0, 3.0));
                assert_eq!(
                    positions(&store),
                    vec![c(-1.0, -1.0), c(3.0, -1.0), c(-1.0, 3.0), c(-1.0, -1.0)]
                );
            }

            it "keeps the surviving labels" {
                store.remove_at(1);
                let labels: Vec<&str> = store.vertices().iter().map(|v| v.label.as_str()).collect();
                assert_eq!(labels, vec!["Point 1", "Point 3", "Point 4", "Point 5"]);
            }

            it "leaves the list unchanged for an out of range index" {
                let before = store.clone();
                assert!(store.remove_at(5).is_none());
                assert_eq!(store, before);
            }

            it "opens the ring when the first vertex goes" {
                store.remove_at(0);
                assert_eq!(store.len(), 4);
                assert!(!store.is_ring_closed());
            }
        }

        describe "remove_position" {
            it "removes the matching vertex" {
                let removed = store.remove_position(c(3.0, -1.0)).expect("vertex exists");
                assert_eq!(removed.label, "Point 2");
                assert_eq!(store.len(), 4);
            }

            it "removes only the first occurrence of a repeated position" {
                store.remove_position(c(-1.0, -1.0));
                assert_eq!(
                    positions(&store),
                    vec![c(3.0, -1.0), c(3.0, 3.0), c(-1.0, 3.0), c(-1.0, -1.0)]
                );
            }

            it "leaves the list unchanged when nothing matches" {
                let before = store.clone();
                assert!(store.remove_position(c(42.0, 42.0)).is_none());
                assert_eq!(store, before);
            }
        }

        describe "replace_all" {
            it "relabels from Point 1" {
                store.remove_at(0);
                store.replace_all(vec![c(0.0, 0.0), c(1.0, 0.0), c(0.0, 0.0)]);
                assert_eq!(store.len(), 3);
                assert_eq!(store.vertices()[2].label, "Point 3");
            }
        }

        describe "apply_modification" {
            it "replaces the whole ring" {
                store.apply_modification(vec![(0.0, 0.0), (2.0, 0.0), (2.0, 2.0), (0.0, 0.0)].into());
                assert_eq!(store.ring().0[1], c(2.0, 0.0));
                assert_eq!(store.len(), 4);
            }
        }
    }

    describe "feature store" {
        before {
            let mut store = FeatureStore::new();
            store.replace_all(vec![parcel("test.1"), parcel("test.2")]);
        }

        it "starts clean after a load" {
            assert_eq!(store.len(), 2);
            assert!(!store.is_dirty());
        }

        it "records a modification in both the loaded and modified sets" {
            let mut edited = parcel("test.1");
            edited.ring.0[1] = c(4.0, -1.0);
            store.apply_modification(edited.clone());

            assert!(store.is_dirty());
            assert_eq!(store.get(&FeatureId::new("test.1")), Some(&edited));
            let modified = store.modified_snapshot();
            assert_eq!(modified.len(), 1);
            assert_eq!(modified[0].feature, edited);
        }

        it "keeps only the last modification per feature" {
            let mut first = parcel("test.1");
            first.ring.0[1] = c(4.0, -1.0);
            let mut second = parcel("test.1");
            second.ring.0[1] = c(5.0, -1.0);

            let r1 = store.apply_modification(first);
            let r2 = store.apply_modification(second.clone());

            assert!(r2 > r1);
            let modified = store.modified_snapshot();
            assert_eq!(modified.len(), 1);
            assert_eq!(modified[0].feature, second);
            assert_eq!(modified[0].revision, r2);
        }

        it "removes a vertex of a loaded feature as a modification" {
            store.remove_vertex(&FeatureId::new("test.2"), 2).expect("vertex exists");
            let feature = store.get(&FeatureId::new("test.2")).unwrap();
            assert_eq!(feature.ring.0.len(), 4);
            assert!(store.is_dirty());
        }

        it "ignores vertex removal for unknown features or indexes" {
            assert!(store.remove_vertex(&FeatureId::new("nope"), 0).is_none());
            assert!(store.remove_vertex(&FeatureId::new("test.1"), 99).is_none());
            assert!(!store.is_dirty());
        }

        it "clears only entries whose revision was saved" {
            let r1 = store.apply_modification(parcel("test.1"));
            let r2 = store.apply_modification(parcel("test.2"));
            let _r3 = store.apply_modification(parcel("test.2"));

            let cleared = store.clear_saved(&[
                (FeatureId::new("test.1"), r1),
                (FeatureId::new("test.2"), r2),
            ]);

            assert_eq!(cleared, 1);
            let remaining: Vec<String> = store
                .modified()
                .map(|m| m.feature.id.to_string())
                .collect();
            assert_eq!(remaining, vec!["test.2".to_string()]);
        }

        it "keeps unsaved edits visible across a reload" {
            let mut edited = parcel("test.1");
            edited.ring.0[1] = c(9.0, -1.0);
            store.apply_modification(edited.clone());

            store.replace_all(vec![parcel("test.1"), parcel("test.2"), parcel("test.3")]);

            assert_eq!(store.len(), 3);
            assert_eq!(store.get(&FeatureId::new("test.1")), Some(&edited));
            assert!(store.is_dirty());
        }

        it "summarises features with their modified flag" {
            store.apply_modification(parcel("test.2"));
            let summaries = store.summaries();
            assert_eq!(summaries.len(), 2);
            assert!(!summaries[0].modified);
            assert!(summaries[1].modified);
            assert_eq!(summaries[1].vertex_count, 5);
        }

        it "clear_modified empties the set" {
            store.apply_modification(parcel("test.1"));
            store.clear_modified();
            assert!(!store.is_dirty());
        }
    }
}
