use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use mongodb::{bson::doc, Client, Collection};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use scribe_types::WorkItem;

use crate::error::{QueueError, Result};
use crate::queue::{Delivery, WorkQueue};

const POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Queue document. An item is visible when `available_at` has passed;
/// leasing pushes `available_at` forward by the visibility window.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct QueuedItem {
    #[serde(rename = "_id")]
    id: String,
    body: String,
    available_at: bson::DateTime,
    enqueued_at: bson::DateTime,
    deliveries: u32,
}

/// Work queue on a MongoDB collection.
///
/// `receive` leases the oldest visible item with an atomic
/// `find_one_and_update`, so concurrent consumers never lease the same
/// delivery twice. An item that is not acknowledged before its lease
/// expires becomes visible again (at-least-once).
pub struct MongoWorkQueue {
    collection: Collection<QueuedItem>,
    visibility: chrono::Duration,
}

impl MongoWorkQueue {
    pub async fn connect(mongodb_uri: &str, db_name: &str) -> Result<Self> {
        let client = Client::with_uri_str(mongodb_uri)
            .await
            .map_err(|e| QueueError::Transport(e.to_string()))?;
        Ok(Self::new(&client, db_name))
    }

    pub fn new(client: &Client, db_name: &str) -> Self {
        let collection = client.database(db_name).collection("work_items");
        Self {
            collection,
            visibility: chrono::Duration::seconds(300),
        }
    }

    pub fn with_visibility(mut self, visibility: Duration) -> Self {
        self.visibility =
            chrono::Duration::from_std(visibility).unwrap_or(chrono::Duration::seconds(300));
        self
    }

    async fn try_lease(&self) -> Result<Option<Delivery>> {
        let now = Utc::now();
        let filter = doc! { "available_at": { "$lte": bson::DateTime::from_chrono(now) } };
        let update = doc! {
            "$set": { "available_at": bson::DateTime::from_chrono(now + self.visibility) },
            "$inc": { "deliveries": 1 },
        };
        let leased = self
            .collection
            .find_one_and_update(filter, update)
            .sort(doc! { "enqueued_at": 1 })
            .await?;
        Ok(leased.map(|item| {
            if item.deliveries > 0 {
                tracing::debug!(receipt = %item.id, deliveries = item.deliveries, "redelivering work item");
            }
            Delivery {
                body: item.body,
                receipt: item.id,
                redeliveries: item.deliveries,
            }
        }))
    }
}

#[async_trait]
impl WorkQueue for MongoWorkQueue {
    async fn send(&self, item: &WorkItem) -> Result<()> {
        let now = bson::DateTime::now();
        let queued = QueuedItem {
            id: Uuid::new_v4().to_string(),
            body: item.to_json()?,
            available_at: now,
            enqueued_at: now,
            deliveries: 0,
        };
        self.collection.insert_one(&queued).await?;
        Ok(())
    }

    async fn receive(&self, wait: Duration) -> Result<Option<Delivery>> {
        let deadline = std::time::Instant::now() + wait;
        loop {
            if let Some(delivery) = self.try_lease().await? {
                return Ok(Some(delivery));
            }
            let now = std::time::Instant::now();
            if now >= deadline {
                return Ok(None);
            }
            tokio::time::sleep(POLL_INTERVAL.min(deadline - now)).await;
        }
    }

    async fn acknowledge(&self, receipt: &str) -> Result<()> {
        self.collection.delete_one(doc! { "_id": receipt }).await?;
        Ok(())
    }
}
