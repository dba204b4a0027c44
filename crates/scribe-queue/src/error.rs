use thiserror::Error;

#[derive(Error, Debug)]
pub enum QueueError {
    #[cfg(feature = "mongodb")]
    #[error("Queue database error: {0}")]
    Database(#[from] mongodb::error::Error),

    #[error("Work item serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Queue transport error: {0}")]
    Transport(String),
}

pub type Result<T> = std::result::Result<T, QueueError>;
