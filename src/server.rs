//! HTTP server initialization.
//!
//! Wires the database, narrative generator, and Entry Service into an axum
//! router, serves the static web UI at `/`, and runs until ctrl-c.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::Result;
use axum::routing::{get, post};
use tower_http::cors::CorsLayer;
use tower_http::services::{ServeDir, ServeFile};

use crate::api::{self, AppState};
use crate::config::ChronicleConfig;
use crate::db;
use crate::entry::service::EntryService;
use crate::generate::OllamaGenerator;

/// Open the database and assemble the Entry Service from config.
pub fn setup_service(config: &ChronicleConfig) -> Result<EntryService> {
    let db_path = config.resolved_db_path();
    let conn = db::open_database(&db_path)?;
    tracing::info!(db = %db_path.display(), "database ready");

    let generator = Arc::new(OllamaGenerator::new(&config.ollama));
    tracing::info!(
        base_url = %config.ollama.base_url,
        model = %config.ollama.model,
        "narrative generator ready"
    );

    Ok(EntryService::new(
        Arc::new(Mutex::new(conn)),
        generator,
        config.resolved_export_dir(),
    ))
}

/// Build the application router over shared state.
pub fn router(state: Arc<AppState>, static_dir: PathBuf) -> axum::Router {
    let ui = ServeDir::new(&static_dir)
        .not_found_service(ServeFile::new(static_dir.join("index.html")));

    axum::Router::new()
        .route("/entries", post(api::create_entry).get(api::list_entries))
        .route("/entries/guided", post(api::create_guided_entry))
        .route(
            "/entries/{id}",
            get(api::get_entry).delete(api::delete_entry),
        )
        .route("/entries/{id}/regenerate", post(api::regenerate_entry))
        .route("/export/weekly", post(api::export_weekly))
        .route("/export/{id}", post(api::export_entry))
        .route("/health", get(api::health))
        .fallback_service(ui)
        .with_state(state)
        .layer(CorsLayer::permissive())
}

/// Start the HTTP server and block until shutdown.
pub async fn serve(config: ChronicleConfig, static_dir: PathBuf) -> Result<()> {
    let bind_addr = format!("{}:{}", config.server.host, config.server.port);

    let service = setup_service(&config)?;
    let state = Arc::new(AppState { service });

    let app = router(state, static_dir);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!(addr = %bind_addr, "Chronicle listening at http://{bind_addr}/");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c()
                .await
                .expect("failed to listen for ctrl-c");
            tracing::info!("shutting down");
        })
        .await?;

    Ok(())
}
