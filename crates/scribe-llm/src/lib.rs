pub mod error;
pub mod openai;
pub mod summarizer;
pub mod traits;
pub mod types;

pub use error::SummarizeError;
pub use openai::OpenAIClient;
pub use summarizer::{LlmSummarizer, Summarizer};
pub use traits::{ChatClient, ChatOptions, ChatRequest, ChatResponse, TokenUsage};
pub use types::Message;
