use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod db;
mod gst;
mod handlers;
mod models;
mod redirect;
mod registry;
mod scores;
mod shortcode;
mod store;

use db::SqliteStore;
use registry::Registry;
use scores::{PollerHandle, ScoreClient, ScorePoller};
use store::{KeyValueStore, MemoryStore};

// ── Shared application state ───────────────────────────────────────────────

pub struct AppState {
    pub registry: Registry,
    pub config: config::AppConfig,
    /// Running score poller, present only when a feed is configured.
    /// Dropping the state stops it.
    pub scores: Option<PollerHandle>,
}

// ── Router ─────────────────────────────────────────────────────────────────

pub fn router(state: Arc<AppState>) -> Router {
    let page = state.config.shortener_path.clone();

    Router::new()
        .route("/", get(handlers::tools::index))
        .route("/health", get(|| async { axum::http::StatusCode::OK }))
        // Shortener page and its form targets
        .route(&page, get(handlers::shortener::page))
        .route(
            &format!("{page}/links"),
            post(handlers::shortener::create_link),
        )
        .route(
            &format!("{page}/links/:code/delete"),
            post(handlers::shortener::delete_link),
        )
        // Fragment resolution requested by the shortener page on load
        .route("/go", get(handlers::redirect::go))
        .route("/tools/gst", get(handlers::tools::gst_calculator))
        .route("/tools/cricket", get(handlers::tools::cricket))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

// ── Entry point ────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env (ignore error if file is absent — env vars may already be set)
    dotenvy::dotenv().ok();

    // Initialise structured logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "toolbox=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration from environment
    let config = config::AppConfig::from_env()?;
    tracing::info!("Starting toolbox on {}:{}", config.host, config.port);
    tracing::info!("Short links are served from {}", config.shortener_url());

    let store: Arc<dyn KeyValueStore> = if config.database_url == "memory" {
        tracing::warn!("DATABASE_URL=memory, short links will not survive a restart");
        Arc::new(MemoryStore::new())
    } else {
        Arc::new(SqliteStore::new(db::connect(&config.database_url).await?))
    };
    let registry = Registry::new(store, config.storage_key.clone());
    tracing::info!(
        "Registry holds {} short link(s)",
        registry.list().await?.len()
    );

    let scores = match &config.cricket_api_url {
        Some(endpoint) => {
            let client = ScoreClient::new(
                endpoint,
                config.cricket_api_key.as_deref(),
                std::time::Duration::from_secs(10),
            )?;
            tracing::info!(
                "Polling cricket scores every {}s",
                config.cricket_poll_interval.as_secs()
            );
            Some(ScorePoller::spawn(client, config.cricket_poll_interval))
        }
        None => {
            tracing::info!("CRICKET_API_URL not set, score feed disabled");
            None
        }
    };

    let bind_addr = format!("{}:{}", config.host, config.port);
    let state = Arc::new(AppState {
        registry,
        config,
        scores,
    });

    let app = router(state.clone());

    // ── Serve ──────────────────────────────────────────────────────────────
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!("Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Stop the poller before exit instead of abandoning it mid-request
    if let Some(state) = Arc::into_inner(state) {
        if let Some(poller) = state.scores {
            poller.shutdown().await;
        }
    }

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
