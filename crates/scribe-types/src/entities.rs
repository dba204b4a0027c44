use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A chat conversation container.
///
/// Created on the first observed message from an unseen group; never deleted
/// by this service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Group {
    pub group_id: String,
    pub group_name: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Group {
    pub fn new(group_id: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            group_id: group_id.into(),
            group_name: None,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }
}

/// One chat utterance.
///
/// Immutable after insert except `topic_id` and `is_analyzed`, which are set
/// exactly once by segmentation. Invariant: `is_analyzed` implies `topic_id`
/// is set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub message_id: String,
    pub group_id: String,
    pub topic_id: Option<String>,
    pub user_id: String,
    pub text: String,
    pub reply_to_id: Option<String>,
    pub is_analyzed: bool,
    pub created_at: DateTime<Utc>,
}

impl ChatMessage {
    pub fn new(
        group_id: impl Into<String>,
        user_id: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            message_id: Uuid::new_v4().to_string(),
            group_id: group_id.into(),
            topic_id: None,
            user_id: user_id.into(),
            text: text.into(),
            reply_to_id: None,
            is_analyzed: false,
            created_at: Utc::now(),
        }
    }

    pub fn with_reply_to(mut self, reply_to_id: Option<String>) -> Self {
        self.reply_to_id = reply_to_id;
        self
    }
}

/// A contiguous, time-bounded run of messages treated as one conversational
/// thread.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Topic {
    pub topic_id: String,
    pub group_id: String,
    pub title: String,
    pub status: TopicStatus,
    pub summary: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Topic {
    pub fn new(group_id: impl Into<String>, title: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            topic_id: Uuid::new_v4().to_string(),
            group_id: group_id.into(),
            title: title.into(),
            status: TopicStatus::Open,
            summary: None,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TopicStatus {
    #[default]
    Open,
    Closed,
}

/// An action item extracted from a topic's summary.
///
/// Created in bulk when a summary is produced; never auto-updated afterward
/// by this service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Todo {
    pub todo_id: String,
    pub topic_id: String,
    pub detail: String,
    pub assignee: String,
    pub due_date: Option<chrono::NaiveDate>,
    pub status: TodoStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Todo {
    pub fn new(
        topic_id: impl Into<String>,
        detail: impl Into<String>,
        assignee: impl Into<String>,
        due_date: Option<chrono::NaiveDate>,
    ) -> Self {
        let now = Utc::now();
        Self {
            todo_id: Uuid::new_v4().to_string(),
            topic_id: topic_id.into(),
            detail: detail.into(),
            assignee: assignee.into(),
            due_date,
            status: TodoStatus::Pending,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TodoStatus {
    #[default]
    Pending,
    Done,
}
