use async_trait::async_trait;
use scribe_types::{ChatMessage, Group, Todo, Topic};

use crate::error::Result;

/// Persistence contract for the chat entities.
///
/// Entities relate by id only; there is no in-memory object graph. The two
/// `commit_*` operations span multiple entities and must apply atomically —
/// partial application is never observable.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Find a group, creating it on first sight.
    async fn ensure_group(&self, group_id: &str) -> Result<Group>;

    /// Append one message.
    async fn insert_message(&self, message: ChatMessage) -> Result<()>;

    /// All messages of a group not yet covered by segmentation.
    async fn unanalyzed_messages(&self, group_id: &str) -> Result<Vec<ChatMessage>>;

    /// Count of messages not yet covered by segmentation.
    async fn count_unanalyzed(&self, group_id: &str) -> Result<u64>;

    /// The newest `limit` messages of a group, returned in chronological
    /// order.
    async fn recent_messages(&self, group_id: &str, limit: i64) -> Result<Vec<ChatMessage>>;

    /// Look up a topic by id.
    async fn find_topic(&self, topic_id: &str) -> Result<Option<Topic>>;

    /// Persist a segmentation pass: insert the opened topics and apply each
    /// message's `topic_id`/`is_analyzed` mutation, all in one transaction.
    async fn commit_segmentation(
        &self,
        topics: Vec<Topic>,
        messages: Vec<ChatMessage>,
    ) -> Result<()>;

    /// Persist a produced summary: insert the extracted todos and set the
    /// topic's summary text, all in one transaction.
    async fn commit_summary(&self, topic_id: &str, summary: &str, todos: Vec<Todo>)
        -> Result<()>;
}
