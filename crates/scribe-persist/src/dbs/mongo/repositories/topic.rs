use mongodb::{bson::doc, Client, ClientSession, Collection};

use crate::dbs::mongo::models::MongoTopic;
use crate::error::Result;

#[derive(Clone)]
pub struct TopicRepository {
    collection: Collection<MongoTopic>,
}

impl TopicRepository {
    pub fn new(client: &Client, db_name: &str) -> Self {
        let collection = client.database(db_name).collection("topics");
        Self { collection }
    }

    pub async fn find(&self, topic_id: &str) -> Result<Option<MongoTopic>> {
        let filter = doc! { "_id": topic_id };
        Ok(self.collection.find_one(filter).await?)
    }

    /// Insert the topics opened by one segmentation pass inside the caller's
    /// transaction.
    pub async fn insert_many(
        &self,
        session: &mut ClientSession,
        topics: Vec<MongoTopic>,
    ) -> Result<()> {
        if topics.is_empty() {
            return Ok(());
        }
        self.collection
            .insert_many(topics)
            .session(&mut *session)
            .await?;
        Ok(())
    }

    /// Set a topic's summary inside the caller's transaction. Returns how
    /// many documents matched so the caller can detect a missing topic.
    pub async fn set_summary(
        &self,
        session: &mut ClientSession,
        topic_id: &str,
        summary: &str,
    ) -> Result<u64> {
        let filter = doc! { "_id": topic_id };
        let update = doc! {
            "$set": {
                "summary": summary,
                "updated_at": bson::DateTime::now(),
            }
        };
        let result = self
            .collection
            .update_one(filter, update)
            .session(&mut *session)
            .await?;
        Ok(result.matched_count)
    }
}
