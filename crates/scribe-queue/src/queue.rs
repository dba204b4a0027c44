use std::time::Duration;

use async_trait::async_trait;
use scribe_types::WorkItem;

use crate::error::Result;

/// One leased delivery of a work item.
///
/// The body is delivered raw; parsing (and the malformed-item policy) is the
/// consumer's concern. The receipt identifies this delivery for
/// `acknowledge`. `redeliveries` is how many times the item was delivered
/// before this one.
#[derive(Debug, Clone)]
pub struct Delivery {
    pub body: String,
    pub receipt: String,
    pub redeliveries: u32,
}

/// At-least-once work queue.
///
/// `receive` leases at most one item for the visibility window; an item that
/// is not acknowledged before the lease expires becomes visible again and is
/// redelivered. Consumers acknowledge only after successful processing.
#[async_trait]
pub trait WorkQueue: Send + Sync {
    /// Enqueue one work item.
    async fn send(&self, item: &WorkItem) -> Result<()>;

    /// Long-poll for at most one item, waiting up to `wait` before
    /// returning `None`.
    async fn receive(&self, wait: Duration) -> Result<Option<Delivery>>;

    /// Remove a delivered item from the queue.
    async fn acknowledge(&self, receipt: &str) -> Result<()>;
}
