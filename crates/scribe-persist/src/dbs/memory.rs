use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use scribe_types::{ChatMessage, Group, Todo, Topic};

use crate::error::{PersistError, Result};
use crate::store::RecordStore;

/// In-memory record store.
///
/// Backs tests and local development without a MongoDB instance. A single
/// mutex over all tables makes every commit trivially atomic.
#[derive(Default)]
pub struct MemoryRecordStore {
    inner: Mutex<Tables>,
}

#[derive(Default)]
struct Tables {
    groups: HashMap<String, Group>,
    messages: Vec<ChatMessage>,
    topics: Vec<Topic>,
    todos: Vec<Todo>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all topics, in insertion order.
    pub async fn topics(&self) -> Vec<Topic> {
        self.inner.lock().await.topics.clone()
    }

    /// Snapshot of all messages, in insertion order.
    pub async fn messages(&self) -> Vec<ChatMessage> {
        self.inner.lock().await.messages.clone()
    }

    /// Snapshot of all todos, in insertion order.
    pub async fn todos(&self) -> Vec<Todo> {
        self.inner.lock().await.todos.clone()
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn ensure_group(&self, group_id: &str) -> Result<Group> {
        let mut tables = self.inner.lock().await;
        let group = tables
            .groups
            .entry(group_id.to_string())
            .or_insert_with(|| Group::new(group_id));
        Ok(group.clone())
    }

    async fn insert_message(&self, message: ChatMessage) -> Result<()> {
        self.inner.lock().await.messages.push(message);
        Ok(())
    }

    async fn unanalyzed_messages(&self, group_id: &str) -> Result<Vec<ChatMessage>> {
        let tables = self.inner.lock().await;
        let mut messages: Vec<ChatMessage> = tables
            .messages
            .iter()
            .filter(|m| m.group_id == group_id && !m.is_analyzed)
            .cloned()
            .collect();
        messages.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(messages)
    }

    async fn count_unanalyzed(&self, group_id: &str) -> Result<u64> {
        let tables = self.inner.lock().await;
        Ok(tables
            .messages
            .iter()
            .filter(|m| m.group_id == group_id && !m.is_analyzed)
            .count() as u64)
    }

    async fn recent_messages(&self, group_id: &str, limit: i64) -> Result<Vec<ChatMessage>> {
        let tables = self.inner.lock().await;
        let mut messages: Vec<ChatMessage> = tables
            .messages
            .iter()
            .filter(|m| m.group_id == group_id)
            .cloned()
            .collect();
        messages.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.message_id.cmp(&a.message_id))
        });
        messages.truncate(limit.max(0) as usize);
        messages.reverse(); // Return in chronological order
        Ok(messages)
    }

    async fn find_topic(&self, topic_id: &str) -> Result<Option<Topic>> {
        let tables = self.inner.lock().await;
        Ok(tables
            .topics
            .iter()
            .find(|t| t.topic_id == topic_id)
            .cloned())
    }

    async fn commit_segmentation(
        &self,
        topics: Vec<Topic>,
        messages: Vec<ChatMessage>,
    ) -> Result<()> {
        let mut tables = self.inner.lock().await;
        let mutations: HashMap<String, ChatMessage> = messages
            .into_iter()
            .map(|m| (m.message_id.clone(), m))
            .collect();
        for stored in tables.messages.iter_mut() {
            if let Some(mutated) = mutations.get(&stored.message_id) {
                stored.topic_id = mutated.topic_id.clone();
                stored.is_analyzed = mutated.is_analyzed;
            }
        }
        tables.topics.extend(topics);
        Ok(())
    }

    async fn commit_summary(
        &self,
        topic_id: &str,
        summary: &str,
        todos: Vec<Todo>,
    ) -> Result<()> {
        let mut tables = self.inner.lock().await;
        let topic = tables
            .topics
            .iter_mut()
            .find(|t| t.topic_id == topic_id)
            .ok_or_else(|| PersistError::TopicNotFound(topic_id.to_string()))?;
        topic.summary = Some(summary.to_string());
        topic.updated_at = chrono::Utc::now();
        tables.todos.extend(todos);
        Ok(())
    }
}
