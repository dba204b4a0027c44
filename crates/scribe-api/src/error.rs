use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Invalid webhook signature")]
    InvalidSignature,

    #[error("Invalid webhook payload: {0}")]
    BadPayload(#[from] serde_json::Error),

    #[error("Persistence error: {0}")]
    Persist(#[from] scribe_persist::PersistError),

    #[error("Queue error: {0}")]
    Queue(#[from] scribe_queue::QueueError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::InvalidSignature => (StatusCode::BAD_REQUEST, self.to_string()),
            ApiError::BadPayload(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            ApiError::Persist(ref e) => {
                tracing::error!("Persistence error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Storage error".to_string())
            }
            ApiError::Queue(ref e) => {
                tracing::error!("Queue error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Queue error".to_string())
            }
        };

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
