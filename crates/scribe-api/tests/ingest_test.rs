use std::sync::Arc;
use std::sync::Mutex;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use scribe_api::ingest::{Ingestor, HELP_REPLY, UNAVAILABLE_REPLY, WORKING_REPLY};
use scribe_line::{InboundMessage, ReplyClient};
use scribe_persist::MemoryRecordStore;
use scribe_queue::{MemoryWorkQueue, WorkQueue};
use scribe_types::WorkItem;

/// Reply client that records every reply instead of calling LINE.
#[derive(Default)]
struct RecordingReplyClient {
    replies: Mutex<Vec<(String, String)>>,
}

impl RecordingReplyClient {
    fn replies(&self) -> Vec<(String, String)> {
        self.replies.lock().unwrap().clone()
    }
}

#[async_trait]
impl ReplyClient for RecordingReplyClient {
    async fn reply(&self, reply_token: &str, text: &str) -> Result<()> {
        self.replies
            .lock()
            .unwrap()
            .push((reply_token.to_string(), text.to_string()));
        Ok(())
    }
}

struct Harness {
    store: Arc<MemoryRecordStore>,
    queue: Arc<MemoryWorkQueue>,
    line: Arc<RecordingReplyClient>,
    ingestor: Ingestor,
}

fn harness(with_queue: bool) -> Harness {
    let store = Arc::new(MemoryRecordStore::new());
    let queue = Arc::new(MemoryWorkQueue::default());
    let line = Arc::new(RecordingReplyClient::default());
    let ingestor = Ingestor::new(
        store.clone(),
        with_queue.then(|| queue.clone() as Arc<dyn WorkQueue>),
        line.clone(),
    );
    Harness {
        store,
        queue,
        line,
        ingestor,
    }
}

fn inbound(text: &str) -> InboundMessage {
    InboundMessage {
        group_id: "G1".to_string(),
        user_id: "U1".to_string(),
        text: text.to_string(),
        reply_token: "rt-1".to_string(),
        reply_to_id: None,
    }
}

async fn drain(queue: &MemoryWorkQueue) -> Vec<WorkItem> {
    let mut items = Vec::new();
    while let Some(delivery) = queue.receive(Duration::from_millis(5)).await.unwrap() {
        items.push(WorkItem::from_json(&delivery.body).unwrap());
        queue.acknowledge(&delivery.receipt).await.unwrap();
    }
    items
}

#[tokio::test]
async fn summarize_command_enqueues_and_acknowledges() {
    let h = harness(true);

    h.ingestor.handle_event(inbound("@Bot まとめ")).await.unwrap();

    let items = drain(&h.queue).await;
    assert_eq!(
        items,
        vec![WorkItem::Summarize {
            group_id: "G1".to_string(),
            reply_token: "rt-1".to_string(),
        }]
    );
    assert_eq!(
        h.line.replies(),
        vec![("rt-1".to_string(), WORKING_REPLY.to_string())]
    );
    // The command message itself is persisted like any other.
    assert_eq!(h.store.messages().await.len(), 1);
}

#[tokio::test]
async fn summarize_without_queue_replies_unavailable() {
    let h = harness(false);

    h.ingestor.handle_event(inbound("@Bot summarize")).await.unwrap();

    assert!(h.queue.is_empty().await);
    assert_eq!(
        h.line.replies(),
        vec![("rt-1".to_string(), UNAVAILABLE_REPLY.to_string())]
    );
}

#[tokio::test]
async fn help_is_answered_synchronously() {
    let h = harness(true);

    h.ingestor.handle_event(inbound("@Bot help")).await.unwrap();

    assert!(h.queue.is_empty().await);
    assert_eq!(
        h.line.replies(),
        vec![("rt-1".to_string(), HELP_REPLY.to_string())]
    );
}

#[tokio::test]
async fn backlog_threshold_enqueues_analyze_exactly_once() {
    let h = harness(true);

    for i in 0..21 {
        h.ingestor
            .handle_event(inbound(&format!("message {}", i)))
            .await
            .unwrap();
    }

    // 21 plain messages crossed the threshold of 20 exactly once.
    let items = drain(&h.queue).await;
    assert_eq!(
        items,
        vec![WorkItem::Analyze {
            group_id: "G1".to_string(),
        }]
    );
    assert!(h.line.replies().is_empty());
}

#[tokio::test]
async fn below_threshold_enqueues_nothing() {
    let h = harness(true);

    for i in 0..19 {
        h.ingestor
            .handle_event(inbound(&format!("message {}", i)))
            .await
            .unwrap();
    }

    assert!(h.queue.is_empty().await);
}

#[tokio::test]
async fn command_takes_precedence_over_backlog_trigger() {
    let h = harness(true);

    for i in 0..19 {
        h.ingestor
            .handle_event(inbound(&format!("message {}", i)))
            .await
            .unwrap();
    }
    // The 20th message is a command: only the summarize item is enqueued
    // even though the unanalyzed count reaches the threshold.
    h.ingestor.handle_event(inbound("@Bot まとめ")).await.unwrap();

    let items = drain(&h.queue).await;
    assert_eq!(items.len(), 1);
    assert!(matches!(items[0], WorkItem::Summarize { .. }));
}
