use std::sync::Arc;

use tokio::sync::watch;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use scribe_line::LineClient;
use scribe_llm::{LlmSummarizer, OpenAIClient};
use scribe_persist::MongoRecordStore;
use scribe_queue::MongoWorkQueue;
use scribe_worker::config::Config;
use scribe_worker::Worker;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Load configuration
    let config = Config::load()
        .map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))?;

    // Initialize logging
    init_logging(&config);

    tracing::info!("Starting scribe worker");

    // Initialize collaborators
    let chat_client = Arc::new(OpenAIClient::new(config.openai_api_key.clone())?);
    let summarizer = Arc::new(
        LlmSummarizer::new(chat_client, config.llm.model.clone())
            .with_temperature(Some(config.llm.temperature)),
    );
    let line = Arc::new(LineClient::new(config.line_channel_access_token.clone())?);

    tracing::info!("Connecting to MongoDB");
    let store = Arc::new(
        MongoRecordStore::connect(&config.mongodb_uri, &config.mongodb.database).await?,
    );
    let queue = Arc::new(
        MongoWorkQueue::connect(&config.mongodb_uri, &config.mongodb.database)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to connect work queue: {}", e))?,
    );
    tracing::info!("MongoDB connected");

    let worker = Worker::new(store, queue, summarizer, line);

    // Stop polling on ctrl-c; an in-flight item finishes first.
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            let _ = shutdown_tx.send(true);
        }
    });

    worker.run(shutdown_rx).await;

    tracing::info!("Worker stopped");
    Ok(())
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
