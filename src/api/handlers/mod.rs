use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use geo_types::Coord;
use serde::{Deserialize, Serialize};

use super::EditorState;
use crate::models::*;
use crate::presentation::{
    render_feature_list, render_vertex_list, ContextMenu, MapView, MenuTarget, Pixel,
    VERTEX_RADIUS_PX,
};
use crate::sync::SyncError;

type ApiResult<T> = Result<T, (StatusCode, String)>;

// ============================================================
// Error Handling
// ============================================================

/// Map a controller error to a status. Remote store failures are logged in
/// full; the client sees the error's message.
fn sync_error(e: SyncError) -> (StatusCode, String) {
    let status = match &e {
        SyncError::UnknownFeature(_) | SyncError::VertexNotFound => StatusCode::NOT_FOUND,
        SyncError::EmptyGeometry => StatusCode::BAD_REQUEST,
        SyncError::RingTooSmall(_) => StatusCode::UNPROCESSABLE_ENTITY,
        SyncError::SaveInFlight(_) | SyncError::Cancelled | SyncError::Superseded => {
            StatusCode::CONFLICT
        }
        SyncError::Wfs(inner) => {
            tracing::error!("Remote store error: {:?}", inner);
            StatusCode::BAD_GATEWAY
        }
    };
    (status, e.to_string())
}

// ============================================================
// Request / Response Types
// ============================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct MapSettings {
    pub tile_url: String,
    pub view: MapView,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PositionInput {
    pub position: [f64; 2],
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ModifyInput {
    /// Ring in projected (EPSG:3857) coordinates.
    pub coordinates: Vec<[f64; 2]>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ReloadResponse {
    pub count: usize,
}

fn to_coords(pairs: Vec<[f64; 2]>) -> Vec<Coord<f64>> {
    pairs.into_iter().map(|[x, y]| Coord { x, y }).collect()
}

// ============================================================
// Health & Map
// ============================================================

pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

pub async fn get_map(State(state): State<EditorState>) -> Json<MapSettings> {
    let view = *state.view.lock().expect("view lock poisoned");
    Json(MapSettings {
        tile_url: state.tile_url.clone(),
        view,
    })
}

/// Map settings for the feature editor, sized like the current view.
pub async fn get_feature_map(State(state): State<EditorState>) -> Json<MapSettings> {
    let current = *state.view.lock().expect("view lock poisoned");
    Json(MapSettings {
        tile_url: state.tile_url.clone(),
        view: MapView::feature_editor(current.width, current.height),
    })
}

pub async fn update_view(
    State(state): State<EditorState>,
    Json(input): Json<MapView>,
) -> Json<MapView> {
    let view = MapView::new(input.center, input.zoom, input.width, input.height);
    *state.view.lock().expect("view lock poisoned") = view;
    Json(view)
}

// ============================================================
// Single Polygon
// ============================================================

pub async fn get_polygon(State(state): State<EditorState>) -> Json<Vec<Vertex>> {
    Json(state.controller.polygon().vertices().to_vec())
}

pub async fn replace_polygon(
    State(state): State<EditorState>,
    Json(ring): Json<Vec<[f64; 2]>>,
) -> Json<Vec<Vertex>> {
    state.controller.replace_polygon(to_coords(ring));
    Json(state.controller.polygon().vertices().to_vec())
}

pub async fn polygon_listing(State(state): State<EditorState>) -> String {
    render_vertex_list(state.controller.polygon().vertices())
}

pub async fn remove_polygon_vertex(
    State(state): State<EditorState>,
    Path(index): Path<usize>,
) -> ApiResult<Json<Vertex>> {
    state
        .controller
        .remove_polygon_vertex(index)
        .map(Json)
        .map_err(sync_error)
}

pub async fn remove_polygon_position(
    State(state): State<EditorState>,
    Json(input): Json<PositionInput>,
) -> ApiResult<Json<Vertex>> {
    let [x, y] = input.position;
    state
        .controller
        .remove_polygon_position(Coord { x, y })
        .map(Json)
        .map_err(sync_error)
}

pub async fn modify_polygon(
    State(state): State<EditorState>,
    Json(input): Json<ModifyInput>,
) -> ApiResult<Json<Vec<Vertex>>> {
    state
        .controller
        .on_modify_end(ModifyEvent {
            feature_id: None,
            coordinates: input.coordinates,
        })
        .map_err(sync_error)?;
    Ok(Json(state.controller.polygon().vertices().to_vec()))
}

// ============================================================
// Context Menu
// ============================================================

pub async fn get_context_menu(State(state): State<EditorState>) -> Json<ContextMenu> {
    Json(*state.menu.lock().expect("menu lock poisoned"))
}

pub async fn right_click(
    State(state): State<EditorState>,
    Json(pixel): Json<Pixel>,
) -> Json<ContextMenu> {
    let polygon = state.controller.polygon();
    let view = *state.view.lock().expect("view lock poisoned");
    let hit = view
        .hit_test(pixel, polygon.vertices(), VERTEX_RADIUS_PX)
        .map(|index| MenuTarget {
            index,
            position: polygon.vertices()[index].position,
        });

    let mut menu = state.menu.lock().expect("menu lock poisoned");
    menu.right_click(pixel, hit);
    Json(*menu)
}

pub async fn context_menu_delete(
    State(state): State<EditorState>,
) -> ApiResult<Json<Vec<Vertex>>> {
    let target = state
        .menu
        .lock()
        .expect("menu lock poisoned")
        .take_target()
        .ok_or((StatusCode::NOT_FOUND, "No vertex selected".to_string()))?;

    state
        .controller
        .remove_polygon_position(target.position)
        .map_err(sync_error)?;
    Ok(Json(state.controller.polygon().vertices().to_vec()))
}

pub async fn click(State(state): State<EditorState>) -> Json<ContextMenu> {
    let mut menu = state.menu.lock().expect("menu lock poisoned");
    menu.click();
    Json(*menu)
}

// ============================================================
// Features
// ============================================================

pub async fn list_features(State(state): State<EditorState>) -> Json<Vec<FeatureSummary>> {
    Json(state.controller.feature_summaries())
}

pub async fn feature_listing(State(state): State<EditorState>) -> String {
    render_feature_list(&state.controller.feature_summaries())
}

pub async fn get_feature(
    State(state): State<EditorState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Feature>> {
    let id = FeatureId(id);
    state
        .controller
        .feature(&id)
        .map(Json)
        .ok_or_else(|| sync_error(SyncError::UnknownFeature(id)))
}

pub async fn reload_features(
    State(state): State<EditorState>,
) -> ApiResult<Json<ReloadResponse>> {
    let cancel = state.shutdown.child_token();
    state
        .controller
        .reload_features(&cancel)
        .await
        .map(|count| Json(ReloadResponse { count }))
        .map_err(sync_error)
}

pub async fn modify_feature(
    State(state): State<EditorState>,
    Path(id): Path<String>,
    Json(input): Json<ModifyInput>,
) -> ApiResult<Json<Feature>> {
    let id = FeatureId(id);
    state
        .controller
        .on_modify_end(ModifyEvent {
            feature_id: Some(id.clone()),
            coordinates: input.coordinates,
        })
        .map_err(sync_error)?;
    state
        .controller
        .feature(&id)
        .map(Json)
        .ok_or_else(|| sync_error(SyncError::UnknownFeature(id)))
}

pub async fn remove_feature_vertex(
    State(state): State<EditorState>,
    Path((id, index)): Path<(String, usize)>,
) -> ApiResult<Json<Feature>> {
    let id = FeatureId(id);
    state
        .controller
        .remove_feature_vertex(&id, index)
        .map_err(sync_error)?;
    state
        .controller
        .feature(&id)
        .map(Json)
        .ok_or_else(|| sync_error(SyncError::UnknownFeature(id)))
}

pub async fn list_modified(State(state): State<EditorState>) -> Json<Vec<ModifiedFeature>> {
    Json(state.controller.modified())
}

// ============================================================
// Save & Notices
// ============================================================

pub async fn save(State(state): State<EditorState>) -> ApiResult<Json<SaveOutcome>> {
    let cancel = state.shutdown.child_token();
    state
        .controller
        .save(&cancel)
        .await
        .map(Json)
        .map_err(sync_error)
}

pub async fn list_notices(State(state): State<EditorState>) -> Json<Vec<Notice>> {
    Json(state.notices.recent())
}
