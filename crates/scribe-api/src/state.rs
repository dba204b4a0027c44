use std::sync::Arc;

use crate::ingest::Ingestor;

/// Shared application state passed to all handlers
#[derive(Clone)]
pub struct AppState {
    pub ingestor: Arc<Ingestor>,
    pub channel_secret: Arc<str>,
}

impl AppState {
    pub fn new(ingestor: Ingestor, channel_secret: impl Into<Arc<str>>) -> Self {
        Self {
            ingestor: Arc::new(ingestor),
            channel_secret: channel_secret.into(),
        }
    }
}
