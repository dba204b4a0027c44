use serde::{Deserialize, Serialize};

/// One unit of asynchronous work carried on the queue.
///
/// Wire form is a JSON object tagged by `type`:
/// `{"type": "analyze", "group_id": "..."}` or
/// `{"type": "summarize", "group_id": "...", "reply_token": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum WorkItem {
    Analyze {
        group_id: String,
    },
    Summarize {
        group_id: String,
        reply_token: String,
    },
}

impl WorkItem {
    pub fn group_id(&self) -> &str {
        match self {
            WorkItem::Analyze { group_id } => group_id,
            WorkItem::Summarize { group_id, .. } => group_id,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            WorkItem::Analyze { .. } => "analyze",
            WorkItem::Summarize { .. } => "summarize",
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn from_json(body: &str) -> serde_json::Result<Self> {
        serde_json::from_str(body)
    }
}
