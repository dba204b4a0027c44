use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use scribe_types::{ChatMessage, Group, Todo, TodoStatus, Topic, TopicStatus};

const DUE_DATE_FORMAT: &str = "%Y-%m-%d";

/// MongoDB-specific Group document (BSON datetimes, string `_id`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoGroup {
    #[serde(rename = "_id")]
    pub group_id: String,
    pub group_name: Option<String>,
    pub is_active: bool,
    pub created_at: bson::DateTime,
    pub updated_at: bson::DateTime,
}

/// MongoDB-specific Message document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoChatMessage {
    #[serde(rename = "_id")]
    pub message_id: String,
    pub group_id: String,
    pub topic_id: Option<String>,
    pub user_id: String,
    pub text: String,
    pub reply_to_id: Option<String>,
    pub is_analyzed: bool,
    pub created_at: bson::DateTime,
}

/// MongoDB-specific Topic document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoTopic {
    #[serde(rename = "_id")]
    pub topic_id: String,
    pub group_id: String,
    pub title: String,
    pub status: TopicStatus,
    pub summary: Option<String>,
    pub created_at: bson::DateTime,
    pub updated_at: bson::DateTime,
}

/// MongoDB-specific Todo document. `due_date` is stored as a date-only
/// string so an unset date stays unset rather than becoming a sentinel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoTodo {
    #[serde(rename = "_id")]
    pub todo_id: String,
    pub topic_id: String,
    pub detail: String,
    pub assignee: String,
    pub due_date: Option<String>,
    pub status: TodoStatus,
    pub created_at: bson::DateTime,
    pub updated_at: bson::DateTime,
}

// Conversions between database-agnostic and MongoDB-specific models

impl From<Group> for MongoGroup {
    fn from(g: Group) -> Self {
        Self {
            group_id: g.group_id,
            group_name: g.group_name,
            is_active: g.is_active,
            created_at: bson::DateTime::from_chrono(g.created_at),
            updated_at: bson::DateTime::from_chrono(g.updated_at),
        }
    }
}

impl From<MongoGroup> for Group {
    fn from(g: MongoGroup) -> Self {
        Self {
            group_id: g.group_id,
            group_name: g.group_name,
            is_active: g.is_active,
            created_at: g.created_at.to_chrono(),
            updated_at: g.updated_at.to_chrono(),
        }
    }
}

impl From<ChatMessage> for MongoChatMessage {
    fn from(m: ChatMessage) -> Self {
        Self {
            message_id: m.message_id,
            group_id: m.group_id,
            topic_id: m.topic_id,
            user_id: m.user_id,
            text: m.text,
            reply_to_id: m.reply_to_id,
            is_analyzed: m.is_analyzed,
            created_at: bson::DateTime::from_chrono(m.created_at),
        }
    }
}

impl From<MongoChatMessage> for ChatMessage {
    fn from(m: MongoChatMessage) -> Self {
        Self {
            message_id: m.message_id,
            group_id: m.group_id,
            topic_id: m.topic_id,
            user_id: m.user_id,
            text: m.text,
            reply_to_id: m.reply_to_id,
            is_analyzed: m.is_analyzed,
            created_at: m.created_at.to_chrono(),
        }
    }
}

impl From<Topic> for MongoTopic {
    fn from(t: Topic) -> Self {
        Self {
            topic_id: t.topic_id,
            group_id: t.group_id,
            title: t.title,
            status: t.status,
            summary: t.summary,
            created_at: bson::DateTime::from_chrono(t.created_at),
            updated_at: bson::DateTime::from_chrono(t.updated_at),
        }
    }
}

impl From<MongoTopic> for Topic {
    fn from(t: MongoTopic) -> Self {
        Self {
            topic_id: t.topic_id,
            group_id: t.group_id,
            title: t.title,
            status: t.status,
            summary: t.summary,
            created_at: t.created_at.to_chrono(),
            updated_at: t.updated_at.to_chrono(),
        }
    }
}

impl From<Todo> for MongoTodo {
    fn from(t: Todo) -> Self {
        Self {
            todo_id: t.todo_id,
            topic_id: t.topic_id,
            detail: t.detail,
            assignee: t.assignee,
            due_date: t.due_date.map(|d| d.format(DUE_DATE_FORMAT).to_string()),
            status: t.status,
            created_at: bson::DateTime::from_chrono(t.created_at),
            updated_at: bson::DateTime::from_chrono(t.updated_at),
        }
    }
}

impl From<MongoTodo> for Todo {
    fn from(t: MongoTodo) -> Self {
        Self {
            todo_id: t.todo_id,
            topic_id: t.topic_id,
            detail: t.detail,
            assignee: t.assignee,
            due_date: t
                .due_date
                .and_then(|d| NaiveDate::parse_from_str(&d, DUE_DATE_FORMAT).ok()),
            status: t.status,
            created_at: t.created_at.to_chrono(),
            updated_at: t.updated_at.to_chrono(),
        }
    }
}
