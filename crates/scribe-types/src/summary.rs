use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One `"<author>: <text>"` line of the conversation handed to the
/// summarization capability, oldest first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Utterance {
    pub author: String,
    pub text: String,
}

impl Utterance {
    pub fn new(author: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            author: author.into(),
            text: text.into(),
        }
    }
}

/// Structured minutes produced by the summarization capability.
///
/// This is the required response shape, parsed strictly: a free-text
/// summary, ordered decision statements, and action items. `due_date` is
/// date-only and absent dates stay absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructuredSummary {
    pub summary: String,
    #[serde(default)]
    pub decisions: Vec<String>,
    #[serde(default)]
    pub todos: Vec<TodoItem>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoItem {
    pub task: String,
    pub assignee: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
}
