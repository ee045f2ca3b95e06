use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use geo_types::Coord;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use wfs_editor::api::{self, EditorState};
use wfs_editor::config::EditorConfig;
use wfs_editor::models::{FeatureId, SaveOutcome, Vertex};
use wfs_editor::presentation::{render_feature_list, render_vertex_list};
use wfs_editor::sync::{SyncController, TracingNotifier};

#[derive(Parser)]
#[command(name = "wfsed")]
#[command(about = "Edit polygon features on a GeoServer WFS endpoint")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the editing API
    Serve {
        /// Port for HTTP API
        #[arg(short, long, default_value = "3000")]
        port: u16,
    },
    /// Fetch and list features
    Features,
    /// Print the vertices of a feature
    Show {
        /// Feature id, e.g. `test.1`
        id: String,
    },
    /// Delete one vertex of a feature and save
    RemoveVertex { id: String, index: usize },
    /// Move one vertex of a feature and save
    MoveVertex {
        id: String,
        index: usize,
        #[arg(allow_negative_numbers = true)]
        lon: f64,
        #[arg(allow_negative_numbers = true)]
        lat: f64,
    },
    /// Print the effective configuration
    Config,
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| "wfs_editor=debug,tower_http=debug".into()),
    );

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let config = EditorConfig::load();

    match cli.command.unwrap_or(Commands::Serve { port: 3000 }) {
        Commands::Serve { port } => serve(&config, port).await?,
        Commands::Features => {
            let controller = load(&config).await?;
            print!("{}", render_feature_list(&controller.feature_summaries()));
        }
        Commands::Show { id } => {
            let controller = load(&config).await?;
            let feature = controller
                .feature(&FeatureId(id.clone()))
                .with_context(|| format!("Feature {} not found", id))?;
            print!("{}", render_vertex_list(&Vertex::labelled(feature.ring.0)));
        }
        Commands::RemoveVertex { id, index } => {
            let controller = load(&config).await?;
            controller.remove_feature_vertex(&FeatureId(id), index)?;
            report(controller.save(&CancellationToken::new()).await?);
        }
        Commands::MoveVertex { id, index, lon, lat } => {
            let controller = load(&config).await?;
            controller.move_feature_vertex(&FeatureId(id), index, Coord { x: lon, y: lat })?;
            report(controller.save(&CancellationToken::new()).await?);
        }
        Commands::Config => {
            println!("{}", serde_json::to_string_pretty(&config.redacted())?);
        }
    }

    Ok(())
}

async fn serve(config: &EditorConfig, port: u16) -> anyhow::Result<()> {
    let state = EditorState::new(config)?;
    let shutdown = state.shutdown.clone();
    let app = api::create_router(state);

    let listener = tokio::net::TcpListener::bind(format!("127.0.0.1:{}", port)).await?;
    tracing::info!("Editor API listening on http://127.0.0.1:{}", port);

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Shutting down");
            shutdown.cancel();
        })
        .await?;
    Ok(())
}

/// Controller with features already fetched, for one-shot commands.
async fn load(config: &EditorConfig) -> anyhow::Result<SyncController> {
    let controller = SyncController::new(config, Arc::new(TracingNotifier))?;
    controller
        .reload_features(&CancellationToken::new())
        .await
        .context("Failed to load features")?;
    Ok(controller)
}

fn report(outcome: SaveOutcome) {
    match outcome {
        SaveOutcome::NothingToSave => println!("Nothing to save"),
        SaveOutcome::Saved { count } => println!("Saved {} feature(s)", count),
    }
}
