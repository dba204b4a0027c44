use axum::{
    body::Bytes,
    extract::State,
    http::HeaderMap,
};
use scribe_line::{verify_signature, WebhookPayload};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

const SIGNATURE_HEADER: &str = "x-line-signature";

/// Webhook endpoint. Verifies the signature over the raw body, then hands
/// each group text message to the ingestor. Returns quickly; all heavy work
/// goes through the queue.
pub async fn receive_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<&'static str> {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or(ApiError::InvalidSignature)?;

    if !verify_signature(&state.channel_secret, &body, signature) {
        return Err(ApiError::InvalidSignature);
    }

    let payload: WebhookPayload = serde_json::from_slice(&body)?;

    for event in &payload.events {
        if let Some(inbound) = event.as_group_text() {
            state.ingestor.handle_event(inbound).await?;
        }
    }

    Ok("OK")
}
