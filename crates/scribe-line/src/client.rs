use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use std::time::Duration;

const LINE_API_BASE: &str = "https://api.line.me/v2/bot";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Sends a text reply into the conversation identified by a reply token.
#[async_trait]
pub trait ReplyClient: Send + Sync {
    async fn reply(&self, reply_token: &str, text: &str) -> Result<()>;
}

/// LINE Messaging API client (HTTP direct, no SDK)
pub struct LineClient {
    http_client: reqwest::Client,
    base_url: String,
}

impl LineClient {
    /// Create new client with a channel access token
    pub fn new(channel_access_token: impl Into<String>) -> Result<Self> {
        let token = channel_access_token.into();

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", token))
                .context("Invalid channel access token format")?,
        );

        let http_client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            http_client,
            base_url: LINE_API_BASE.to_string(),
        })
    }

    /// Point the client at a different API base (test servers, proxies).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[async_trait]
impl ReplyClient for LineClient {
    async fn reply(&self, reply_token: &str, text: &str) -> Result<()> {
        let payload = serde_json::json!({
            "replyToken": reply_token,
            "messages": [{ "type": "text", "text": text }],
        });

        let response = self
            .http_client
            .post(format!("{}/message/reply", self.base_url))
            .json(&payload)
            .send()
            .await
            .context("Failed to send reply")?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            anyhow::bail!("LINE API error ({}): {}", status, error_text);
        }

        Ok(())
    }
}
