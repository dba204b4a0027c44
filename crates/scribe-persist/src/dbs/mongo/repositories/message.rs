use futures::TryStreamExt;
use mongodb::{bson::doc, Client, ClientSession, Collection};

use crate::dbs::mongo::models::MongoChatMessage;
use crate::error::Result;

#[derive(Clone)]
pub struct MessageRepository {
    collection: Collection<MongoChatMessage>,
}

impl MessageRepository {
    pub fn new(client: &Client, db_name: &str) -> Self {
        let collection = client.database(db_name).collection("messages");
        Self { collection }
    }

    /// Save a single message
    pub async fn insert(&self, message: MongoChatMessage) -> Result<()> {
        self.collection.insert_one(&message).await?;
        Ok(())
    }

    /// Messages of a group not yet covered by segmentation, oldest first
    pub async fn unanalyzed(&self, group_id: &str) -> Result<Vec<MongoChatMessage>> {
        let filter = doc! { "group_id": group_id, "is_analyzed": false };
        let messages = self
            .collection
            .find(filter)
            .sort(doc! { "created_at": 1 })
            .await?
            .try_collect()
            .await?;
        Ok(messages)
    }

    pub async fn count_unanalyzed(&self, group_id: &str) -> Result<u64> {
        let filter = doc! { "group_id": group_id, "is_analyzed": false };
        Ok(self.collection.count_documents(filter).await?)
    }

    /// The newest `limit` messages of a group
    pub async fn recent(&self, group_id: &str, limit: i64) -> Result<Vec<MongoChatMessage>> {
        let filter = doc! { "group_id": group_id };
        let mut messages: Vec<MongoChatMessage> = self
            .collection
            .find(filter)
            .sort(doc! { "created_at": -1 })
            .limit(limit)
            .await?
            .try_collect()
            .await?;
        messages.reverse(); // Return in chronological order
        Ok(messages)
    }

    /// Apply segmentation mutations (`topic_id`, `is_analyzed`) inside the
    /// caller's transaction.
    pub async fn apply_segmentation(
        &self,
        session: &mut ClientSession,
        messages: &[MongoChatMessage],
    ) -> Result<()> {
        for message in messages {
            let filter = doc! { "_id": &message.message_id };
            let update = doc! {
                "$set": {
                    "topic_id": message.topic_id.clone(),
                    "is_analyzed": message.is_analyzed,
                }
            };
            self.collection
                .update_one(filter, update)
                .session(&mut *session)
                .await?;
        }
        Ok(())
    }
}
