use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use tower_http::cors::CorsLayer;
use tracing_subscriber::EnvFilter;

use attendex_core::DocumentStore;
use attendex_core::config_file::{self, ConfigFile};
use attendex_parsing::{AttendanceExtractor, ParsingConfigBuilder};
use attendex_pdf_mupdf::MupdfBackend;
use attendex_store::{MemoryStore, SqliteStore};

mod error;
mod handlers;
mod models;
mod state;
mod upload;

use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = config_file::load_config();

    let store = open_store(&config)?;
    let parsing = match &config.parsing {
        Some(section) => ParsingConfigBuilder::from_config_file(section),
        None => ParsingConfigBuilder::new(),
    }
    .build()
    .context("Invalid [parsing] section in configuration")?;

    let state = Arc::new(AppState {
        store,
        backend: Arc::new(MupdfBackend::new().skip_blank_pages(true)),
        extractor: AttendanceExtractor::with_config(parsing),
    });

    let body_limit = config.max_upload_mb() as usize * 1024 * 1024;
    let app = router(state, body_limit);

    let addr = std::env::var("ATTENDEX_BIND").unwrap_or_else(|_| config.bind());
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!(addr = %addr, "listening");
    axum::serve(listener, app).await?;

    Ok(())
}

/// Open the shared store: `ATTENDEX_STORE_PATH` > config file. Without
/// either, records only live for the lifetime of the process.
fn open_store(config: &ConfigFile) -> anyhow::Result<Arc<dyn DocumentStore>> {
    let path = std::env::var("ATTENDEX_STORE_PATH")
        .ok()
        .map(PathBuf::from)
        .or_else(|| config.store_path());

    match path {
        Some(path) => {
            let store = SqliteStore::open(&path)
                .with_context(|| format!("Failed to open store at {}", path.display()))?;
            tracing::info!(path = %path.display(), "attendance store opened");
            Ok(Arc::new(store))
        }
        None => {
            tracing::warn!(
                "no store configured (set ATTENDEX_STORE_PATH); attendance is kept in memory only"
            );
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}

fn router(state: Arc<AppState>, body_limit: usize) -> Router {
    Router::new()
        .route(
            "/extract-attendance",
            post(handlers::extract::extract_attendance),
        )
        .route(
            "/students/{registration_id}",
            get(handlers::students::get_student),
        )
        .route("/health", get(handlers::health::health))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
