mod handlers;

use std::sync::{Arc, Mutex};

use axum::{
    routing::{delete, get, post, put},
    Router,
};
use tokio_util::sync::CancellationToken;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::EditorConfig;
use crate::presentation::{ContextMenu, MapView};
use crate::sync::{NoticeBoard, SyncController};

/// Shared state of one editing session.
#[derive(Clone)]
pub struct EditorState {
    pub controller: SyncController,
    pub notices: NoticeBoard,
    pub menu: Arc<Mutex<ContextMenu>>,
    pub view: Arc<Mutex<MapView>>,
    pub tile_url: String,
    /// Parent of every outbound request's token; cancelled on shutdown.
    pub shutdown: CancellationToken,
}

impl EditorState {
    /// Build a session whose notices are collected for the front-end.
    pub fn new(config: &EditorConfig) -> anyhow::Result<Self> {
        let notices = NoticeBoard::new();
        let controller = SyncController::new(config, Arc::new(notices.clone()))?;
        Ok(Self::with_controller(config, controller, notices))
    }

    pub fn with_controller(
        config: &EditorConfig,
        controller: SyncController,
        notices: NoticeBoard,
    ) -> Self {
        Self {
            controller,
            notices,
            menu: Arc::new(Mutex::new(ContextMenu::default())),
            view: Arc::new(Mutex::new(MapView::polygon_editor(800, 600))),
            tile_url: config.tile_url(),
            shutdown: CancellationToken::new(),
        }
    }
}

pub fn create_router(state: EditorState) -> Router {
    let api = Router::new()
        // Map
        .route("/map", get(handlers::get_map))
        .route("/map/view", put(handlers::update_view))
        // Single polygon
        .route("/polygon", get(handlers::get_polygon))
        .route("/polygon", put(handlers::replace_polygon))
        .route("/polygon/listing", get(handlers::polygon_listing))
        .route("/polygon/modify", post(handlers::modify_polygon))
        .route("/polygon/vertices/remove", post(handlers::remove_polygon_position))
        .route("/polygon/vertices/{index}", delete(handlers::remove_polygon_vertex))
        // Context menu
        .route("/context-menu", get(handlers::get_context_menu))
        .route("/context-menu", post(handlers::right_click))
        .route("/context-menu/delete", post(handlers::context_menu_delete))
        .route("/click", post(handlers::click))
        // Features
        .route("/features", get(handlers::list_features))
        .route("/features/listing", get(handlers::feature_listing))
        .route("/features/map", get(handlers::get_feature_map))
        .route("/features/reload", post(handlers::reload_features))
        .route("/features/modified", get(handlers::list_modified))
        .route("/features/{id}", get(handlers::get_feature))
        .route("/features/{id}/modify", post(handlers::modify_feature))
        .route(
            "/features/{id}/vertices/{index}",
            delete(handlers::remove_feature_vertex),
        )
        // Save
        .route("/save", post(handlers::save))
        .route("/notices", get(handlers::list_notices))
        // Health
        .route("/health", get(handlers::health));

    Router::new()
        .nest("/api/v1", api)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
