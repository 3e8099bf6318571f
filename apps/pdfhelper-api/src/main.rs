//! PDF helper server
//!
//! REST endpoints over uploaded PDFs:
//!
//! - Merge, split (ZIP of parts) and rotate
//! - Compression through Ghostscript
//! - Text find, replace (white overlay) and redact (black overlay)
//!
//! Uploaded files never touch disk except for compression, whose temp files
//! are reclaimed by a background sweep.

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use clap::Parser;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

mod compress;
mod config;
mod error;
mod handlers;
mod state;
mod storage;
mod upload;

use config::Args;
use state::AppState;
use storage::TempStore;

/// Assemble the router with all API routes and middleware.
pub fn build_router(state: AppState, static_dir: Option<PathBuf>, max_upload_bytes: usize) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let router = Router::new()
        .route("/health", get(handlers::handle_health))
        .route("/api/merge", post(handlers::handle_merge))
        .route("/api/split", post(handlers::handle_split))
        .route("/api/rotate", post(handlers::handle_rotate))
        .route("/api/compress", post(handlers::handle_compress))
        .route("/api/text/replace", post(handlers::handle_text_replace))
        .route("/api/text/redact", post(handlers::handle_text_redact))
        .route("/api/text/find", post(handlers::handle_text_find));

    let router = match static_dir {
        Some(dir) => router.fallback_service(ServeDir::new(dir).append_index_html_on_directories(true)),
        None => router,
    };

    router
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    let app_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(format!("pdfhelper_api={}", app_level).parse()?)
                .add_directive(format!("pdfhelper_core={}", app_level).parse()?)
                .add_directive("tower_http=debug".parse()?),
        )
        .init();

    info!("Initializing PDF helper API...");

    let store = TempStore::new(args.storage_dir())
        .with_context(|| format!("Cannot create storage dir {}", args.storage_dir().display()))?;
    storage::spawn_cleanup(
        store.root().to_path_buf(),
        args.cleanup_interval(),
        args.cleanup_max_age(),
    );

    let ghostscript = compress::find_ghostscript(args.ghostscript.as_deref());
    match &ghostscript {
        Some(path) => info!("Ghostscript: {}", path.display()),
        None => warn!("Ghostscript not found; /api/compress will answer NO_COMPRESSOR"),
    }

    let state = AppState::new(store, ghostscript, args.compress_timeout());
    let app = build_router(state, args.static_dir.clone(), args.max_upload_bytes());

    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!("Server listening on http://{}", addr);
    info!("Upload limit: {} MB", args.max_upload_mb);

    axum::serve(listener, app).await?;

    Ok(())
}
