use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use docqa::config::Config;
use docqa::embedder::openai::OpenAiEmbedder;
use docqa::llm::openai::OpenAiGenerator;
use docqa::server::{AppContext, AppServer};

/// Document question-answering service.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    /// Path to the JSON configuration file
    #[arg(short, long, default_value = "config.json")]
    config: String,

    /// Override the listen host
    #[arg(long)]
    host: Option<String>,

    /// Override the listen port
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Variables from .env must be visible before the API key lookup
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "docqa=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    tracing::info!("Starting docqa {}", env!("CARGO_PKG_VERSION"));

    // 1. Load config
    let mut config = Config::load(&cli.config)?;
    if let Some(host) = cli.host {
        config.server.host = host;
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }
    config.validate().context("invalid configuration")?;

    // 2. Resolve credentials (fatal if missing)
    let api_key = config.api_key()?;
    let timeout = Duration::from_secs(config.provider.request_timeout_secs);

    // 3. Init model clients
    let embedder = OpenAiEmbedder::new(api_key.clone(), timeout)?
        .with_base_url(config.provider.api_base.clone())
        .with_model(config.model.embedding.clone())
        .with_dimensions(config.model.dimensions);
    let generator = OpenAiGenerator::new(api_key, timeout)?
        .with_base_url(config.provider.api_base.clone())
        .with_model(config.model.chat.clone())
        .with_temperature(config.model.temperature);

    tracing::info!(
        embedding_model = %config.model.embedding,
        chat_model = %config.model.chat,
        chunk_size = config.chunk_size,
        chunk_overlap = config.chunk_overlap,
        top_k = config.search_top_k,
        "pipeline configured"
    );

    // 4. Start server
    let ctx = AppContext::new(config, Arc::new(embedder), Arc::new(generator))?;
    AppServer::new(ctx).start().await
}
