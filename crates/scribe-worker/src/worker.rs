use std::sync::Arc;
use std::time::Duration;

use scribe_line::ReplyClient;
use scribe_llm::Summarizer;
use scribe_persist::RecordStore;
use scribe_queue::{Delivery, QueueError, WorkQueue};
use scribe_segment::Segmenter;
use scribe_types::{Todo, Utterance, WorkItem};
use tokio::sync::watch;

use crate::reply::format_summary;

/// Newest-N window handed to the summarizer.
const SUMMARY_WINDOW: i64 = 100;

const RECEIVE_WAIT: Duration = Duration::from_secs(20);
const POLL_FAILURE_BACKOFF: Duration = Duration::from_secs(5);

/// Long-running queue consumer.
///
/// Processes one item at a time with no internal parallelism, which keeps
/// `analyze`/`summarize` operations on the same group mutually exclusive.
/// Running several worker instances against one queue would need per-group
/// ordering instead.
///
/// An item is acknowledged only after successful local processing; anything
/// left un-acknowledged is redelivered once its lease expires
/// (at-least-once).
pub struct Worker {
    store: Arc<dyn RecordStore>,
    queue: Arc<dyn WorkQueue>,
    summarizer: Arc<dyn Summarizer>,
    line: Arc<dyn ReplyClient>,
    segmenter: Segmenter,
    receive_wait: Duration,
}

impl Worker {
    pub fn new(
        store: Arc<dyn RecordStore>,
        queue: Arc<dyn WorkQueue>,
        summarizer: Arc<dyn Summarizer>,
        line: Arc<dyn ReplyClient>,
    ) -> Self {
        Self {
            store,
            queue,
            summarizer,
            line,
            segmenter: Segmenter::default(),
            receive_wait: RECEIVE_WAIT,
        }
    }

    /// Shorten the long-poll wait (tests).
    pub fn with_receive_wait(mut self, wait: Duration) -> Self {
        self.receive_wait = wait;
        self
    }

    /// Poll until `shutdown` fires. An item already received when the
    /// signal arrives is processed to completion before the loop exits.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        tracing::info!("worker started");
        loop {
            tokio::select! {
                _ = shutdown.changed() => {
                    tracing::info!("shutdown signal received, stopping worker");
                    break;
                }
                polled = self.queue.receive(self.receive_wait) => {
                    match polled {
                        Ok(Some(delivery)) => self.process_delivery(delivery).await,
                        Ok(None) => {}
                        Err(e) => {
                            tracing::warn!(error = %e, "queue poll failed, backing off");
                            tokio::time::sleep(POLL_FAILURE_BACKOFF).await;
                        }
                    }
                }
            }
        }
    }

    /// Receive and process at most one item. Returns whether an item was
    /// received. Poll failures propagate; item failures do not.
    pub async fn tick(&self) -> Result<bool, QueueError> {
        match self.queue.receive(self.receive_wait).await? {
            Some(delivery) => {
                self.process_delivery(delivery).await;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Dispatch one delivery and acknowledge it on success. Failures are
    /// logged and the item is left for redelivery — except a body that does
    /// not parse, which no redelivery can fix and is dropped.
    pub async fn process_delivery(&self, delivery: Delivery) {
        let item = match WorkItem::from_json(&delivery.body) {
            Ok(item) => item,
            Err(e) => {
                tracing::warn!(error = %e, "dropping malformed work item");
                self.acknowledge(&delivery.receipt).await;
                return;
            }
        };

        tracing::info!(
            kind = item.kind(),
            group_id = %item.group_id(),
            redeliveries = delivery.redeliveries,
            "processing work item"
        );

        match self.dispatch(&item).await {
            Ok(()) => self.acknowledge(&delivery.receipt).await,
            Err(e) => {
                tracing::warn!(
                    kind = item.kind(),
                    group_id = %item.group_id(),
                    error = %e,
                    "work item failed, leaving it for redelivery"
                );
            }
        }
    }

    async fn acknowledge(&self, receipt: &str) {
        if let Err(e) = self.queue.acknowledge(receipt).await {
            // The lease will expire and the item will be processed again;
            // at-least-once tolerates that.
            tracing::warn!(error = %e, "failed to acknowledge work item");
        }
    }

    async fn dispatch(&self, item: &WorkItem) -> anyhow::Result<()> {
        match item {
            WorkItem::Analyze { group_id } => self.analyze(group_id).await,
            WorkItem::Summarize {
                group_id,
                reply_token,
            } => self.summarize(group_id, reply_token).await,
        }
    }

    /// Segment the group's unanalyzed backlog into topics. Idempotent across
    /// redelivery: once the commit lands, those messages are analyzed and a
    /// re-run sees an empty batch.
    async fn analyze(&self, group_id: &str) -> anyhow::Result<()> {
        let unanalyzed = self.store.unanalyzed_messages(group_id).await?;
        let segmentation = self.segmenter.segment(unanalyzed);
        if segmentation.is_empty() {
            tracing::debug!(group_id, "no unanalyzed messages");
            return Ok(());
        }

        tracing::info!(
            group_id,
            topics = segmentation.topics.len(),
            messages = segmentation.messages.len(),
            "segmentation complete"
        );
        self.store
            .commit_segmentation(segmentation.topics, segmentation.messages)
            .await?;
        Ok(())
    }

    /// Summarize the group's recent window and deliver the minutes. On any
    /// failure before the reply nothing is persisted, no reply is sent and
    /// the caller leaves the item for redelivery.
    async fn summarize(&self, group_id: &str, reply_token: &str) -> anyhow::Result<()> {
        let window = self.store.recent_messages(group_id, SUMMARY_WINDOW).await?;
        if window.is_empty() {
            tracing::debug!(group_id, "nothing to summarize");
            return Ok(());
        }

        let conversation: Vec<Utterance> = window
            .iter()
            .map(|m| Utterance::new(format!("User {}", m.user_id), &m.text))
            .collect();
        let summary = self.summarizer.summarize(&conversation).await?;

        // Persist against the newest message's topic. When segmentation has
        // not caught up yet there is no topic to attach to; the minutes are
        // still delivered.
        match window.last().and_then(|m| m.topic_id.clone()) {
            Some(topic_id) => {
                let todos: Vec<Todo> = summary
                    .todos
                    .iter()
                    .map(|t| Todo::new(&topic_id, &t.task, &t.assignee, t.due_date))
                    .collect();
                self.store
                    .commit_summary(&topic_id, &summary.summary, todos)
                    .await?;
            }
            None => {
                tracing::warn!(group_id, "newest message has no topic, summary not persisted");
            }
        }

        if let Err(e) = self.line.reply(reply_token, &format_summary(&summary)).await {
            // The summary is already durable; redelivering the item here
            // would double-insert todos.
            tracing::warn!(group_id, error = %e, "failed to deliver summary reply");
        }
        Ok(())
    }
}
