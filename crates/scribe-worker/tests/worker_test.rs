use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use tokio::time::sleep;

use scribe_line::ReplyClient;
use scribe_llm::{SummarizeError, Summarizer};
use scribe_persist::{MemoryRecordStore, PersistError, RecordStore};
use scribe_queue::{MemoryWorkQueue, WorkQueue};
use scribe_types::{
    ChatMessage, Group, StructuredSummary, Todo, TodoItem, Topic, Utterance, WorkItem,
};
use scribe_worker::{format_summary, Worker};

// ---------------------------------------------------------------------------
// Fakes
// ---------------------------------------------------------------------------

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

struct ScriptedSummarizer {
    outcomes: Mutex<VecDeque<Result<StructuredSummary, SummarizeError>>>,
}

impl ScriptedSummarizer {
    fn new(outcomes: Vec<Result<StructuredSummary, SummarizeError>>) -> Arc<Self> {
        Arc::new(Self {
            outcomes: Mutex::new(outcomes.into_iter().collect()),
        })
    }
}

#[async_trait]
impl Summarizer for ScriptedSummarizer {
    async fn summarize(
        &self,
        _conversation: &[Utterance],
    ) -> Result<StructuredSummary, SummarizeError> {
        self.outcomes
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(SummarizeError::Unavailable("script exhausted".to_string())))
    }
}

/// Record store whose summary commit fails a configured number of times
/// before succeeding — the crash-before-acknowledge scenario.
struct FlakyStore {
    inner: Arc<MemoryRecordStore>,
    summary_failures: AtomicU32,
}

impl FlakyStore {
    fn new(inner: Arc<MemoryRecordStore>, summary_failures: u32) -> Arc<Self> {
        Arc::new(Self {
            inner,
            summary_failures: AtomicU32::new(summary_failures),
        })
    }
}

#[async_trait]
impl RecordStore for FlakyStore {
    async fn ensure_group(&self, group_id: &str) -> Result<Group, PersistError> {
        self.inner.ensure_group(group_id).await
    }

    async fn insert_message(&self, message: ChatMessage) -> Result<(), PersistError> {
        self.inner.insert_message(message).await
    }

    async fn unanalyzed_messages(&self, group_id: &str) -> Result<Vec<ChatMessage>, PersistError> {
        self.inner.unanalyzed_messages(group_id).await
    }

    async fn count_unanalyzed(&self, group_id: &str) -> Result<u64, PersistError> {
        self.inner.count_unanalyzed(group_id).await
    }

    async fn recent_messages(
        &self,
        group_id: &str,
        limit: i64,
    ) -> Result<Vec<ChatMessage>, PersistError> {
        self.inner.recent_messages(group_id, limit).await
    }

    async fn find_topic(&self, topic_id: &str) -> Result<Option<Topic>, PersistError> {
        self.inner.find_topic(topic_id).await
    }

    async fn commit_segmentation(
        &self,
        topics: Vec<Topic>,
        messages: Vec<ChatMessage>,
    ) -> Result<(), PersistError> {
        self.inner.commit_segmentation(topics, messages).await
    }

    async fn commit_summary(
        &self,
        topic_id: &str,
        summary: &str,
        todos: Vec<Todo>,
    ) -> Result<(), PersistError> {
        let remaining = self.summary_failures.load(Ordering::SeqCst);
        if remaining > 0 {
            self.summary_failures.store(remaining - 1, Ordering::SeqCst);
            return Err(PersistError::Connection("write timeout".to_string()));
        }
        self.inner.commit_summary(topic_id, summary, todos).await
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn message_at(id: &str, hour: u32, min: u32) -> ChatMessage {
    let mut m = ChatMessage::new("G1", "U1", format!("message {}", id));
    m.message_id = id.to_string();
    m.created_at = Utc.with_ymd_and_hms(2024, 6, 15, hour, min, 0).unwrap();
    m
}

fn minutes() -> StructuredSummary {
    StructuredSummary {
        summary: "金曜リリースを決定".to_string(),
        decisions: vec!["金曜にリリースする".to_string()],
        todos: vec![
            TodoItem {
                task: "告知を書く".to_string(),
                assignee: "U_bob".to_string(),
                due_date: None,
            },
            TodoItem {
                task: "検証する".to_string(),
                assignee: "U_carol".to_string(),
                due_date: chrono::NaiveDate::from_ymd_opt(2024, 6, 20),
            },
        ],
    }
}

/// Seed one segmented topic with two messages attached to it.
async fn seed_segmented_group(store: &dyn RecordStore) -> Topic {
    let topic = Topic::new("G1", "Topic 2024-06-15 09:00");
    for (id, min) in [("m1", 0), ("m2", 30)] {
        let mut m = message_at(id, 9, min);
        m.topic_id = Some(topic.topic_id.clone());
        m.is_analyzed = true;
        store.insert_message(m).await.unwrap();
    }
    store
        .commit_segmentation(vec![topic.clone()], vec![])
        .await
        .unwrap();
    topic
}

struct Harness {
    store: Arc<MemoryRecordStore>,
    queue: Arc<MemoryWorkQueue>,
    line: Arc<RecordingReplyClient>,
    worker: Worker,
}

fn harness(
    store: Arc<MemoryRecordStore>,
    record_store: Arc<dyn RecordStore>,
    queue: Arc<MemoryWorkQueue>,
    summarizer: Arc<dyn Summarizer>,
) -> Harness {
    let line = Arc::new(RecordingReplyClient::default());
    let worker = Worker::new(record_store, queue.clone(), summarizer, line.clone())
        .with_receive_wait(Duration::from_millis(10));
    Harness {
        store,
        queue,
        line,
        worker,
    }
}

fn plain_harness(summarizer: Arc<dyn Summarizer>) -> Harness {
    let store = Arc::new(MemoryRecordStore::new());
    let queue = Arc::new(MemoryWorkQueue::new(Duration::from_millis(60)));
    harness(store.clone(), store, queue, summarizer)
}

fn summarize_item() -> WorkItem {
    WorkItem::Summarize {
        group_id: "G1".to_string(),
        reply_token: "rt-1".to_string(),
    }
}

// ---------------------------------------------------------------------------
// analyze dispatch
// ---------------------------------------------------------------------------

#[tokio::test]
async fn analyze_splits_the_backlog_into_topics_and_acknowledges() {
    let h = plain_harness(ScriptedSummarizer::new(vec![]));
    for (id, hour, min) in [("m1", 9, 0), ("m2", 9, 30), ("m3", 11, 15)] {
        h.store.insert_message(message_at(id, hour, min)).await.unwrap();
    }
    h.queue
        .send(&WorkItem::Analyze {
            group_id: "G1".to_string(),
        })
        .await
        .unwrap();

    assert!(h.worker.tick().await.unwrap());

    // 11:15 is more than one hour past the 09:00 anchor.
    assert_eq!(h.store.topics().await.len(), 2);
    for m in h.store.messages().await {
        assert!(m.is_analyzed);
        assert!(m.topic_id.is_some());
    }
    assert!(h.queue.is_empty().await);
}

#[tokio::test]
async fn redelivered_analyze_is_idempotent() {
    let h = plain_harness(ScriptedSummarizer::new(vec![]));
    h.store.insert_message(message_at("m1", 9, 0)).await.unwrap();

    for _ in 0..2 {
        h.queue
            .send(&WorkItem::Analyze {
                group_id: "G1".to_string(),
            })
            .await
            .unwrap();
        assert!(h.worker.tick().await.unwrap());
    }

    assert_eq!(h.store.topics().await.len(), 1);
    assert!(h.queue.is_empty().await);
}

// ---------------------------------------------------------------------------
// summarize dispatch
// ---------------------------------------------------------------------------

#[tokio::test]
async fn summarize_persists_minutes_and_replies() {
    let h = plain_harness(ScriptedSummarizer::new(vec![Ok(minutes())]));
    let topic = seed_segmented_group(h.store.as_ref()).await;
    h.queue.send(&summarize_item()).await.unwrap();

    assert!(h.worker.tick().await.unwrap());

    let stored = h.store.find_topic(&topic.topic_id).await.unwrap().unwrap();
    assert_eq!(stored.summary.as_deref(), Some("金曜リリースを決定"));

    let todos = h.store.todos().await;
    assert_eq!(todos.len(), 2);
    assert!(todos.iter().all(|t| t.topic_id == topic.topic_id));
    assert_eq!(
        todos[1].due_date,
        chrono::NaiveDate::from_ymd_opt(2024, 6, 20)
    );

    assert_eq!(
        h.line.replies(),
        vec![("rt-1".to_string(), format_summary(&minutes()))]
    );
    assert!(h.queue.is_empty().await);
}

#[tokio::test]
async fn summarizer_failure_is_silent_and_leaves_the_item() {
    let h = plain_harness(ScriptedSummarizer::new(vec![
        Err(SummarizeError::Unavailable("upstream 503".to_string())),
        Ok(minutes()),
    ]));
    seed_segmented_group(h.store.as_ref()).await;
    h.queue.send(&summarize_item()).await.unwrap();

    // First attempt fails: no reply, nothing persisted, item not removed.
    assert!(h.worker.tick().await.unwrap());
    assert!(h.line.replies().is_empty());
    assert!(h.store.todos().await.is_empty());
    assert_eq!(h.queue.len().await, 1);

    // After the lease expires the item is redelivered and succeeds.
    sleep(Duration::from_millis(80)).await;
    assert!(h.worker.tick().await.unwrap());
    assert_eq!(h.store.todos().await.len(), 2);
    assert_eq!(h.line.replies().len(), 1);
    assert!(h.queue.is_empty().await);
}

#[tokio::test]
async fn persistence_failure_redelivers_and_todos_land_exactly_once() {
    let store = Arc::new(MemoryRecordStore::new());
    let flaky = FlakyStore::new(store.clone(), 1);
    let queue = Arc::new(MemoryWorkQueue::new(Duration::from_millis(60)));
    let h = harness(
        store,
        flaky,
        queue,
        ScriptedSummarizer::new(vec![Ok(minutes()), Ok(minutes())]),
    );
    seed_segmented_group(h.store.as_ref()).await;
    h.queue.send(&summarize_item()).await.unwrap();

    // The transactional write fails: not acknowledged, no reply sent.
    assert!(h.worker.tick().await.unwrap());
    assert!(h.store.todos().await.is_empty());
    assert!(h.line.replies().is_empty());
    assert_eq!(h.queue.len().await, 1);

    // Redelivery with the store healthy again: exactly one set of todos.
    sleep(Duration::from_millis(80)).await;
    assert!(h.worker.tick().await.unwrap());
    assert_eq!(h.store.todos().await.len(), 2);
    assert_eq!(h.line.replies().len(), 1);
    assert!(h.queue.is_empty().await);
}

#[tokio::test]
async fn summarize_before_segmentation_replies_without_persisting() {
    let h = plain_harness(ScriptedSummarizer::new(vec![Ok(minutes())]));
    h.store.insert_message(message_at("m1", 9, 0)).await.unwrap();
    h.queue.send(&summarize_item()).await.unwrap();

    assert!(h.worker.tick().await.unwrap());

    assert!(h.store.todos().await.is_empty());
    assert_eq!(h.line.replies().len(), 1);
    assert!(h.queue.is_empty().await);
}

#[tokio::test]
async fn summarize_with_no_messages_is_a_no_op() {
    let h = plain_harness(ScriptedSummarizer::new(vec![Ok(minutes())]));
    h.queue.send(&summarize_item()).await.unwrap();

    assert!(h.worker.tick().await.unwrap());

    assert!(h.line.replies().is_empty());
    assert!(h.queue.is_empty().await);
}

// ---------------------------------------------------------------------------
// poll-loop policy
// ---------------------------------------------------------------------------

#[tokio::test]
async fn malformed_item_is_dropped_not_retried_forever() {
    let h = plain_harness(ScriptedSummarizer::new(vec![]));
    h.queue.send_raw("{this is not a work item").await;

    assert!(h.worker.tick().await.unwrap());

    assert!(h.queue.is_empty().await);
    assert!(h.store.topics().await.is_empty());
    assert!(h.line.replies().is_empty());
}

#[tokio::test]
async fn empty_queue_tick_returns_after_the_bounded_wait() {
    let h = plain_harness(ScriptedSummarizer::new(vec![]));
    assert!(!h.worker.tick().await.unwrap());
}

#[tokio::test]
async fn run_stops_on_shutdown_signal() {
    let h = plain_harness(ScriptedSummarizer::new(vec![]));
    let (tx, rx) = tokio::sync::watch::channel(false);

    let worker = Arc::new(h.worker);
    let handle = {
        let worker = worker.clone();
        tokio::spawn(async move { worker.run(rx).await })
    };

    tx.send(true).unwrap();
    tokio::time::timeout(Duration::from_secs(1), handle)
        .await
        .expect("worker should stop promptly")
        .unwrap();
}
