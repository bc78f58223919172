/// HTTP server setup using axum.
///
/// Provides `AppContext` (shared state), the router with its CORS and tracing
/// layers, and `AppServer` (startup and graceful shutdown).
pub mod handlers;

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::HeaderValue,
    routing::{get, post},
};
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::Config;
use crate::embedder::Embedder;
use crate::error::AppError;
use crate::indexer::chunker::Chunker;
use crate::indexer::core::DocumentIngestor;
use crate::llm::Generator;
use crate::qa::{AnswerComposer, Retriever};
use crate::store::IndexStore;

/// Shared application context available to all handlers.
#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<Config>,
    pub store: Arc<IndexStore>,
    pub ingestor: Arc<DocumentIngestor>,
    pub retriever: Arc<Retriever>,
    pub composer: Arc<AnswerComposer>,
}

impl AppContext {
    /// Wire the pipeline around a fresh, empty index store.
    pub fn new(
        config: Config,
        embedder: Arc<dyn Embedder>,
        generator: Arc<dyn Generator>,
    ) -> std::result::Result<Self, AppError> {
        let chunker = Chunker::new(config.chunk_size, config.chunk_overlap)
            .map_err(|e| AppError::Configuration(e.to_string()))?;
        let store = Arc::new(IndexStore::new());

        let ingestor = DocumentIngestor::new(
            chunker,
            Arc::clone(&embedder),
            Arc::clone(&store),
            config.embed_batch_size,
        );
        let retriever = Retriever::new(embedder, Arc::clone(&store), config.search_top_k);
        let composer = AnswerComposer::new(generator);

        Ok(Self {
            config: Arc::new(config),
            store,
            ingestor: Arc::new(ingestor),
            retriever: Arc::new(retriever),
            composer: Arc::new(composer),
        })
    }
}

/// CORS for the configured front-end origins: credentials allowed, request
/// method and headers mirrored back.
pub fn cors_layer(origins: &[String]) -> std::result::Result<CorsLayer, AppError> {
    let origins = origins
        .iter()
        .map(|o| {
            HeaderValue::from_str(o)
                .map_err(|e| AppError::Configuration(format!("invalid CORS origin {o:?}: {e}")))
        })
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_credentials(true)
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request()))
}

/// Build the application router.
pub fn router(ctx: AppContext) -> std::result::Result<Router, AppError> {
    let cors = cors_layer(&ctx.config.server.cors_origins)?;
    let body_limit = ctx.config.server.max_upload_bytes;

    Ok(Router::new()
        .route("/upload", post(handlers::upload_handler))
        .route("/chat", post(handlers::chat_handler))
        .route("/health", get(handlers::health_handler))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(ctx))
}

/// HTTP server wrapping the context.
#[derive(Clone)]
pub struct AppServer {
    pub ctx: AppContext,
}

impl AppServer {
    pub fn new(ctx: AppContext) -> Self {
        Self { ctx }
    }

    /// Bind and serve until Ctrl-C or SIGTERM.
    pub async fn start(self) -> Result<()> {
        let addr = self.ctx.config.bind_address();
        let app = router(self.ctx)?;

        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .with_context(|| format!("failed to bind {addr}"))?;
        info!("Listening on http://{addr}");

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .context("HTTP server encountered an error")?;

        info!("Server stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!("failed to listen for Ctrl-C: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::warn!("failed to listen for SIGTERM: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    info!("Shutdown signal received");
}
