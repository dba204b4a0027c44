use std::sync::Arc;

use scribe_line::{InboundMessage, ReplyClient};
use scribe_persist::RecordStore;
use scribe_queue::WorkQueue;
use scribe_types::{ChatMessage, WorkItem};

use crate::error::ApiResult;

const COMMAND_PREFIX: &str = "@Bot ";

/// Unanalyzed-message count at which an `analyze` item is enqueued. Compared
/// with equality so crossing the threshold fires exactly once.
const BACKLOG_THRESHOLD: u64 = 20;

pub const WORKING_REPLY: &str = "要約を作成中です。しばらくお待ちください。";
pub const UNAVAILABLE_REPLY: &str = "申し訳ありません。現在この機能は利用できません。";
pub const HELP_REPLY: &str = "🤖 使い方ガイド\n- @Bot まとめ : 直近の会話を要約します\n- @Bot help : このヘルプを表示します";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Summarize,
    Help,
}

fn parse_command(text: &str) -> Option<Command> {
    let command = text.strip_prefix(COMMAND_PREFIX)?.trim();
    match command {
        "まとめ" | "summarize" => Some(Command::Summarize),
        "help" => Some(Command::Help),
        _ => None,
    }
}

/// Ingestion handler: persists each inbound message and evaluates the
/// triggering conditions. Runs in the webhook request path, so it never
/// waits on segmentation or summarization — it only enqueues.
pub struct Ingestor {
    store: Arc<dyn RecordStore>,
    queue: Option<Arc<dyn WorkQueue>>,
    line: Arc<dyn ReplyClient>,
}

impl Ingestor {
    pub fn new(
        store: Arc<dyn RecordStore>,
        queue: Option<Arc<dyn WorkQueue>>,
        line: Arc<dyn ReplyClient>,
    ) -> Self {
        Self { store, queue, line }
    }

    pub async fn handle_event(&self, inbound: InboundMessage) -> ApiResult<()> {
        self.store.ensure_group(&inbound.group_id).await?;
        let message = ChatMessage::new(&inbound.group_id, &inbound.user_id, &inbound.text)
            .with_reply_to(inbound.reply_to_id.clone());
        self.store.insert_message(message).await?;

        // Command takes precedence over the backlog trigger.
        match parse_command(&inbound.text) {
            Some(Command::Summarize) => self.handle_summarize_command(&inbound).await,
            Some(Command::Help) => {
                self.reply_best_effort(&inbound.reply_token, HELP_REPLY).await;
                Ok(())
            }
            None => self.check_backlog(&inbound.group_id).await,
        }
    }

    async fn handle_summarize_command(&self, inbound: &InboundMessage) -> ApiResult<()> {
        let Some(queue) = &self.queue else {
            tracing::warn!(group_id = %inbound.group_id, "summarize requested but no queue is configured");
            self.reply_best_effort(&inbound.reply_token, UNAVAILABLE_REPLY).await;
            return Ok(());
        };

        queue
            .send(&WorkItem::Summarize {
                group_id: inbound.group_id.clone(),
                reply_token: inbound.reply_token.clone(),
            })
            .await?;
        tracing::info!(group_id = %inbound.group_id, "summarize work item enqueued");

        // Immediate UX acknowledgement, decoupled from the eventual summary.
        self.reply_best_effort(&inbound.reply_token, WORKING_REPLY).await;
        Ok(())
    }

    async fn check_backlog(&self, group_id: &str) -> ApiResult<()> {
        let Some(queue) = &self.queue else {
            return Ok(());
        };

        let unanalyzed = self.store.count_unanalyzed(group_id).await?;
        if unanalyzed == BACKLOG_THRESHOLD {
            queue
                .send(&WorkItem::Analyze {
                    group_id: group_id.to_string(),
                })
                .await?;
            tracing::info!(group_id = %group_id, unanalyzed, "analyze work item enqueued");
        }
        Ok(())
    }

    async fn reply_best_effort(&self, reply_token: &str, text: &str) {
        if let Err(e) = self.line.reply(reply_token, text).await {
            tracing::warn!("failed to send reply: {}", e);
        }
    }
}
