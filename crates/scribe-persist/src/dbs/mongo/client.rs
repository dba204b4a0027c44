use async_trait::async_trait;
use mongodb::{Client, ClientSession};

use scribe_types::{ChatMessage, Group, Todo, Topic};

use crate::dbs::mongo::models::{MongoChatMessage, MongoTodo, MongoTopic};
use crate::dbs::mongo::repositories::{
    GroupRepository, MessageRepository, TodoRepository, TopicRepository,
};
use crate::error::{PersistError, Result};
use crate::store::RecordStore;

/// MongoDB-backed record store.
///
/// Multi-entity commits run inside a client-session transaction, which
/// requires a replica set (or Atlas).
pub struct MongoRecordStore {
    client: Client,
    groups: GroupRepository,
    messages: MessageRepository,
    topics: TopicRepository,
    todos: TodoRepository,
}

impl MongoRecordStore {
    /// Connect to MongoDB and create the store
    pub async fn connect(mongodb_uri: &str, db_name: &str) -> Result<Self> {
        let client = Client::with_uri_str(mongodb_uri)
            .await
            .map_err(|e| PersistError::Connection(e.to_string()))?;

        let groups = GroupRepository::new(&client, db_name);
        let messages = MessageRepository::new(&client, db_name);
        let topics = TopicRepository::new(&client, db_name);
        let todos = TodoRepository::new(&client, db_name);

        Ok(Self {
            client,
            groups,
            messages,
            topics,
            todos,
        })
    }

    async fn apply_segmentation(
        &self,
        session: &mut ClientSession,
        topics: Vec<MongoTopic>,
        messages: &[MongoChatMessage],
    ) -> Result<()> {
        self.topics.insert_many(session, topics).await?;
        self.messages.apply_segmentation(session, messages).await
    }

    async fn apply_summary(
        &self,
        session: &mut ClientSession,
        topic_id: &str,
        summary: &str,
        todos: Vec<MongoTodo>,
    ) -> Result<()> {
        self.todos.insert_many(session, todos).await?;
        let matched = self.topics.set_summary(session, topic_id, summary).await?;
        if matched == 0 {
            return Err(PersistError::TopicNotFound(topic_id.to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl RecordStore for MongoRecordStore {
    async fn ensure_group(&self, group_id: &str) -> Result<Group> {
        if let Some(existing) = self.groups.find(group_id).await? {
            return Ok(existing.into());
        }
        tracing::debug!(group_id, "creating group on first sight");
        let group = Group::new(group_id);
        self.groups.insert(group.clone().into()).await?;
        Ok(group)
    }

    async fn insert_message(&self, message: ChatMessage) -> Result<()> {
        self.messages.insert(message.into()).await
    }

    async fn unanalyzed_messages(&self, group_id: &str) -> Result<Vec<ChatMessage>> {
        let messages = self.messages.unanalyzed(group_id).await?;
        Ok(messages.into_iter().map(Into::into).collect())
    }

    async fn count_unanalyzed(&self, group_id: &str) -> Result<u64> {
        self.messages.count_unanalyzed(group_id).await
    }

    async fn recent_messages(&self, group_id: &str, limit: i64) -> Result<Vec<ChatMessage>> {
        let messages = self.messages.recent(group_id, limit).await?;
        Ok(messages.into_iter().map(Into::into).collect())
    }

    async fn find_topic(&self, topic_id: &str) -> Result<Option<Topic>> {
        Ok(self.topics.find(topic_id).await?.map(Into::into))
    }

    async fn commit_segmentation(
        &self,
        topics: Vec<Topic>,
        messages: Vec<ChatMessage>,
    ) -> Result<()> {
        if topics.is_empty() && messages.is_empty() {
            return Ok(());
        }

        let topics: Vec<MongoTopic> = topics.into_iter().map(Into::into).collect();
        let messages: Vec<MongoChatMessage> = messages.into_iter().map(Into::into).collect();

        let mut session = self.client.start_session().await?;
        session.start_transaction().await?;
        match self
            .apply_segmentation(&mut session, topics, &messages)
            .await
        {
            Ok(()) => {
                session.commit_transaction().await?;
                Ok(())
            }
            Err(e) => {
                let _ = session.abort_transaction().await;
                Err(e)
            }
        }
    }

    async fn commit_summary(
        &self,
        topic_id: &str,
        summary: &str,
        todos: Vec<Todo>,
    ) -> Result<()> {
        let todos: Vec<MongoTodo> = todos.into_iter().map(Into::into).collect();

        let mut session = self.client.start_session().await?;
        session.start_transaction().await?;
        match self
            .apply_summary(&mut session, topic_id, summary, todos)
            .await
        {
            Ok(()) => {
                session.commit_transaction().await?;
                Ok(())
            }
            Err(e) => {
                let _ = session.abort_transaction().await;
                Err(e)
            }
        }
    }
}
