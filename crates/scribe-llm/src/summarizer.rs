use std::sync::Arc;

use async_trait::async_trait;
use scribe_types::{StructuredSummary, Utterance};

use crate::error::SummarizeError;
use crate::traits::{ChatClient, ChatOptions, ChatRequest};
use crate::types::Message;

/// Instruction sent with every summarization request. Mandates the exact
/// JSON response shape parsed below.
const SUMMARY_SYSTEM_PROMPT: &str = r#"あなたは議事録作成AIです。以下の会話を要約し、以下のJSON形式で出力してください：
{
    "summary": "会話の要約",
    "decisions": ["重要な決定事項1", "決定事項2"...],
    "todos": [
        {
            "task": "タスク内容",
            "assignee": "担当者",
            "due_date": "期限（YYYY-MM-DD形式）"
        }
    ]
}"#;

/// Reduces an ordered conversation to structured minutes, or reports a typed
/// failure. The backing model is an implementation detail behind this trait.
#[async_trait]
pub trait Summarizer: Send + Sync {
    async fn summarize(
        &self,
        conversation: &[Utterance],
    ) -> Result<StructuredSummary, SummarizeError>;
}

/// Summarizer backed by a chat-completion client.
pub struct LlmSummarizer {
    client: Arc<dyn ChatClient>,
    model: String,
    temperature: Option<f32>,
}

impl LlmSummarizer {
    pub fn new(client: Arc<dyn ChatClient>, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
            temperature: Some(0.7),
        }
    }

    pub fn with_temperature(mut self, temperature: Option<f32>) -> Self {
        self.temperature = temperature;
        self
    }

    fn format_conversation(conversation: &[Utterance]) -> String {
        conversation
            .iter()
            .map(|u| format!("{}: {}", u.author, u.text))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[async_trait]
impl Summarizer for LlmSummarizer {
    async fn summarize(
        &self,
        conversation: &[Utterance],
    ) -> Result<StructuredSummary, SummarizeError> {
        let mut options = ChatOptions::new();
        if let Some(temp) = self.temperature {
            options = options.temperature(temp);
        }

        let request = ChatRequest::new(
            self.model.clone(),
            vec![
                Message::system(SUMMARY_SYSTEM_PROMPT),
                Message::human(Self::format_conversation(conversation)),
            ],
        )
        .with_options(options);

        let response = self
            .client
            .chat(request)
            .await
            .map_err(|e| SummarizeError::Unavailable(e.to_string()))?;

        let content = response
            .content
            .ok_or_else(|| SummarizeError::Unavailable("empty completion".to_string()))?;

        if let Some(usage) = &response.usage {
            tracing::debug!(
                input_tokens = usage.input_tokens,
                output_tokens = usage.output_tokens,
                "summarization completed"
            );
        }

        serde_json::from_str(strip_code_fence(&content))
            .map_err(|e| SummarizeError::Unavailable(format!("malformed summary payload: {}", e)))
    }
}

/// The capability sometimes wraps its JSON in a Markdown fence; the payload
/// inside is still parsed strictly.
fn strip_code_fence(content: &str) -> &str {
    let trimmed = content.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.trim_start_matches('\n')
        .strip_suffix("```")
        .unwrap_or(rest)
        .trim()
}
