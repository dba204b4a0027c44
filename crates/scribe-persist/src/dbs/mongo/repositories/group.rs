use mongodb::{bson::doc, Client, Collection};

use crate::dbs::mongo::models::MongoGroup;
use crate::error::Result;

#[derive(Clone)]
pub struct GroupRepository {
    collection: Collection<MongoGroup>,
}

impl GroupRepository {
    pub fn new(client: &Client, db_name: &str) -> Self {
        let collection = client.database(db_name).collection("groups");
        Self { collection }
    }

    pub async fn find(&self, group_id: &str) -> Result<Option<MongoGroup>> {
        let filter = doc! { "_id": group_id };
        Ok(self.collection.find_one(filter).await?)
    }

    pub async fn insert(&self, group: MongoGroup) -> Result<()> {
        self.collection.insert_one(&group).await?;
        Ok(())
    }
}
