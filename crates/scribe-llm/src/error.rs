use thiserror::Error;

/// Failure of the summarization capability.
///
/// Non-fatal by contract: callers treat it as "no summary produced this
/// round" and rely on redelivery for a retry.
#[derive(Error, Debug)]
pub enum SummarizeError {
    #[error("Summarization unavailable: {0}")]
    Unavailable(String),
}
