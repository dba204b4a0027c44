use mongodb::{Client, ClientSession, Collection};

use crate::dbs::mongo::models::MongoTodo;
use crate::error::Result;

#[derive(Clone)]
pub struct TodoRepository {
    collection: Collection<MongoTodo>,
}

impl TodoRepository {
    pub fn new(client: &Client, db_name: &str) -> Self {
        let collection = client.database(db_name).collection("todos");
        Self { collection }
    }

    /// Insert the todos extracted from one summary inside the caller's
    /// transaction.
    pub async fn insert_many(
        &self,
        session: &mut ClientSession,
        todos: Vec<MongoTodo>,
    ) -> Result<()> {
        if todos.is_empty() {
            return Ok(());
        }
        self.collection
            .insert_many(todos)
            .session(&mut *session)
            .await?;
        Ok(())
    }
}
