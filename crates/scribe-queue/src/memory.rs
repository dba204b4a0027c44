use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::Mutex;
use uuid::Uuid;

use scribe_types::WorkItem;

use crate::error::Result;
use crate::queue::{Delivery, WorkQueue};

const POLL_INTERVAL: Duration = Duration::from_millis(25);

/// In-process work queue with the same lease semantics as the MongoDB
/// backend. Backs tests and local development.
pub struct MemoryWorkQueue {
    inner: Mutex<Vec<Entry>>,
    visibility: Duration,
}

struct Entry {
    receipt: String,
    body: String,
    available_at: Instant,
    deliveries: u32,
}

impl Default for MemoryWorkQueue {
    fn default() -> Self {
        Self::new(Duration::from_secs(300))
    }
}

impl MemoryWorkQueue {
    pub fn new(visibility: Duration) -> Self {
        Self {
            inner: Mutex::new(Vec::new()),
            visibility,
        }
    }

    /// Enqueue a raw body, bypassing work-item serialization. The queue
    /// contract delivers opaque bodies, so consumers must cope with bodies
    /// that do not parse.
    pub async fn send_raw(&self, body: impl Into<String>) {
        self.inner.lock().await.push(Entry {
            receipt: Uuid::new_v4().to_string(),
            body: body.into(),
            available_at: Instant::now(),
            deliveries: 0,
        });
    }

    /// Number of items currently on the queue, leased or not.
    pub async fn len(&self) -> usize {
        self.inner.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.lock().await.is_empty()
    }

    async fn try_lease(&self) -> Option<Delivery> {
        let now = Instant::now();
        let mut entries = self.inner.lock().await;
        let entry = entries.iter_mut().find(|e| e.available_at <= now)?;
        let redeliveries = entry.deliveries;
        entry.deliveries += 1;
        entry.available_at = now + self.visibility;
        Some(Delivery {
            body: entry.body.clone(),
            receipt: entry.receipt.clone(),
            redeliveries,
        })
    }
}

#[async_trait]
impl WorkQueue for MemoryWorkQueue {
    async fn send(&self, item: &WorkItem) -> Result<()> {
        let body = item.to_json()?;
        self.inner.lock().await.push(Entry {
            receipt: Uuid::new_v4().to_string(),
            body,
            available_at: Instant::now(),
            deliveries: 0,
        });
        Ok(())
    }

    async fn receive(&self, wait: Duration) -> Result<Option<Delivery>> {
        let deadline = Instant::now() + wait;
        loop {
            if let Some(delivery) = self.try_lease().await {
                return Ok(Some(delivery));
            }
            let now = Instant::now();
            if now >= deadline {
                return Ok(None);
            }
            tokio::time::sleep(POLL_INTERVAL.min(deadline - now)).await;
        }
    }

    async fn acknowledge(&self, receipt: &str) -> Result<()> {
        self.inner.lock().await.retain(|e| e.receipt != receipt);
        Ok(())
    }
}
