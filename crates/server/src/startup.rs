use std::{env, net::SocketAddr, path::PathBuf};

use axum::Router;
use common::utils::logging::init_logging_default;
use dotenvy::dotenv;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

use crate::routes::{self, AppState};
use service::{paths::StorePaths, runtime, store::DocumentStore};

/// Default locations, co-located with the service working directory.
const CONFIG_FILE: &str = "server-config.json";
const DEFAULT_STORE: &str = "db.json";
const ASSETS_DIR: &str = "dist";

/// Initialize logging via shared common utils
fn init_logging() {
    init_logging_default();
}

// The browser client may be served from another origin during development.
fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

/// Load host/port from configs or env vars, with sensible fallbacks
fn load_bind_addr() -> anyhow::Result<SocketAddr> {
    let (host, port) = match configs::load_default() {
        Ok(cfg) => {
            let s = cfg.server;
            (s.host, s.port)
        }
        Err(_) => {
            let host = env::var("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
            let port = env::var("SERVER_PORT")
                .ok()
                .and_then(|p| p.parse::<u16>().ok())
                .unwrap_or(3001);
            (host, port)
        }
    };
    Ok(format!("{}:{}", host, port).parse()?)
}

/// Public entry: build the app and run the HTTP server
pub async fn run() -> anyhow::Result<()> {
    dotenv().ok();
    init_logging();

    let store = DocumentStore::new(StorePaths::new(CONFIG_FILE, DEFAULT_STORE));
    let assets_dir = PathBuf::from(ASSETS_DIR);

    let store_file = store.current_path().await;
    runtime::ensure_env(&assets_dir, &store_file).await?;

    // Seed on first start. A failure here is logged rather than fatal; the
    // concrete error surfaces on the first read or write instead.
    if let Err(e) = store.ensure_store(&store_file).await {
        warn!(error = %e, "could not initialize document store at startup");
    }

    let state = AppState { store, assets_dir };
    let app: Router = routes::build_router(state, build_cors());

    let addr = load_bind_addr()?;
    info!(%addr, store_file = %store_file.display(), "starting workboard server");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
