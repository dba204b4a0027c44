use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use scribe_api::{
    config::Config,
    ingest::Ingestor,
    routes::{health, webhook},
    state::AppState,
};
use scribe_line::LineClient;
use scribe_persist::MongoRecordStore;
use scribe_queue::{MongoWorkQueue, WorkQueue};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Load configuration
    let config = Config::load()
        .map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))?;

    // Initialize logging
    init_logging(&config);

    tracing::info!("Starting scribe webhook server");
    tracing::info!("Config loaded: {}:{}", config.server.host, config.server.port);

    // Initialize LINE client
    let line = Arc::new(LineClient::new(config.line_channel_access_token.clone())?);

    // Initialize record store
    tracing::info!("Connecting to MongoDB");
    let store = Arc::new(
        MongoRecordStore::connect(&config.mongodb_uri, &config.mongodb.database).await?,
    );
    tracing::info!("MongoDB connected");

    // Initialize work queue (optional: without it summarize commands answer
    // with a feature-unavailable message)
    let queue: Option<Arc<dyn WorkQueue>> = if config.queue.enabled {
        let queue = MongoWorkQueue::connect(&config.mongodb_uri, &config.mongodb.database)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to connect work queue: {}", e))?;
        Some(Arc::new(queue))
    } else {
        tracing::warn!("work queue disabled; summarize commands will be rejected");
        None
    };

    // Create application state
    let ingestor = Ingestor::new(store, queue, line);
    let state = AppState::new(ingestor, config.line_channel_secret.as_str());

    // Build router
    let app = build_router(state);

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Server listening on {}", addr);
    tracing::info!("Health check: http://{}/health", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/webhook", post(webhook::receive_webhook))
        .route("/health", get(health::health_check))
        .layer(TimeoutLayer::new(std::time::Duration::from_secs(10)))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn init_logging(config: &Config) {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.logging.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let registry = tracing_subscriber::registry().with(env_filter);

    match config.logging.format.as_str() {
        "json" => {
            registry
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            registry
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
    }
}
