//! HTTP server assembly

pub mod response;

use crate::config::Config;
use crate::error::AppError;
use crate::features::{
    self,
    content::{content_routes, ContentRoot},
    fasta::{FastaSerializer, FastaState, SerializerOptions},
};
use crate::middleware;
use crate::sequences::{self, SequenceStore};
use axum::{extract::State, response::IntoResponse, routing::get, Json, Router};
use serde_json::json;
use std::future::IntoFuture;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tokio::sync::Notify;
use tower_http::compression::CompressionLayer;
use tracing::{info, warn};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn SequenceStore>,
    pub serializer: FastaSerializer,
    pub content: ContentRoot,
}

impl AppState {
    /// Build state around an existing sequence store
    pub fn new(store: Arc<dyn SequenceStore>, config: &Config) -> Self {
        let serializer =
            FastaSerializer::new(Arc::clone(&store), SerializerOptions::from(&config.sequences));

        Self {
            store,
            serializer,
            content: ContentRoot::new(&config.content.directory),
        }
    }

    /// Connect the configured sequence store and build state around it
    pub async fn from_config(config: &Config) -> anyhow::Result<Self> {
        let store = sequences::connect(&config.sequences).await?;
        Ok(Self::new(store, config))
    }
}

pub async fn serve(config: Config) -> anyhow::Result<()> {
    let state = AppState::from_config(&config).await?;
    let app = create_router(state, &config);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    let shutdown = Arc::new(Notify::new());
    let server = axum::serve(listener, app)
        .with_graceful_shutdown({
            let shutdown = Arc::clone(&shutdown);
            async move {
                shutdown_signal().await;
                shutdown.notify_one();
            }
        })
        .into_future();
    tokio::pin!(server);

    tokio::select! {
        result = &mut server => result?,
        _ = shutdown.notified() => {
            let timeout = Duration::from_secs(config.server.shutdown_timeout_secs);
            info!("Waiting up to {} seconds for connections to close", timeout.as_secs());
            match tokio::time::timeout(timeout, &mut server).await {
                Ok(result) => result?,
                Err(_) => warn!("Shutdown timeout elapsed, dropping open connections"),
            }
        },
    }

    info!("Server shut down gracefully");

    Ok(())
}

/// Create the application router with all routes and middleware
pub fn create_router(state: AppState, config: &Config) -> Router {
    let feature_state = features::FeatureState {
        fasta: FastaState {
            serializer: state.serializer.clone(),
            max_body_bytes: config.server.max_body_bytes,
        },
    };

    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .with_state(state.clone())
        .nest("/api/v1", features::router(feature_state))
        .nest("/content", content_routes(state.content))
        .fallback(not_found)
        // Apply layers from innermost to outermost
        .layer(CompressionLayer::new())
        .layer(middleware::tracing_layer())
        .layer(middleware::cors_layer(&config.cors))
}

async fn root() -> impl IntoResponse {
    Json(json!({
        "name": "P3 API Server",
        "version": env!("CARGO_PKG_VERSION"),
        "status": "running",
    }))
}

async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "sequence_store": state.store.backend_name(),
    }))
}

async fn not_found() -> AppError {
    AppError::NotFound("Route not found".to_string())
}

/// Resolves on Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            },
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            },
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, starting graceful shutdown");
        },
        _ = terminate => {
            info!("Received terminate signal, starting graceful shutdown");
        },
    }
}
