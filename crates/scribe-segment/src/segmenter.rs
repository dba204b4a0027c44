use chrono::Duration;
use scribe_types::{ChatMessage, Topic};

/// Result of one segmentation pass.
///
/// `topics` holds every topic opened during the pass and `messages` every
/// input message with its `topic_id` assigned and `is_analyzed` set.
/// `current` is the last topic opened — the one still accepting messages.
#[derive(Debug, Clone, Default)]
pub struct Segmentation {
    pub topics: Vec<Topic>,
    pub messages: Vec<ChatMessage>,
    pub current: Option<Topic>,
}

impl Segmentation {
    pub fn is_empty(&self) -> bool {
        self.topics.is_empty() && self.messages.is_empty()
    }
}

/// Partitions a batch of not-yet-analyzed messages into topics.
///
/// A topic is a run of messages whose timestamps all fall within `gap` of
/// the run's first message (the run anchor). The gap is measured from the
/// anchor, not from the previous message, so a topic's span is bounded to
/// `gap` from its opening message. Pure and deterministic: equal timestamps
/// are ordered by message id.
#[derive(Debug, Clone)]
pub struct Segmenter {
    gap: Duration,
}

impl Default for Segmenter {
    fn default() -> Self {
        Self::new(Duration::hours(1))
    }
}

impl Segmenter {
    pub fn new(gap: Duration) -> Self {
        Self { gap }
    }

    pub fn segment(&self, mut messages: Vec<ChatMessage>) -> Segmentation {
        if messages.is_empty() {
            return Segmentation::default();
        }

        messages.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.message_id.cmp(&b.message_id))
        });

        let mut topics: Vec<Topic> = Vec::new();
        let mut anchor = messages[0].created_at;

        for msg in &mut messages {
            let open_new = match topics.last() {
                None => true,
                Some(_) => msg.created_at - anchor > self.gap,
            };
            if open_new {
                anchor = msg.created_at;
                topics.push(Topic::new(
                    msg.group_id.clone(),
                    format!("Topic {}", anchor.format("%Y-%m-%d %H:%M")),
                ));
            }
            let topic = topics.last().expect("a topic is open");
            msg.topic_id = Some(topic.topic_id.clone());
            msg.is_analyzed = true;
        }

        let current = topics.last().cloned();
        Segmentation {
            topics,
            messages,
            current,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};

    fn at(hour: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 15, hour, min, 0).unwrap()
    }

    fn msg(id: &str, created_at: DateTime<Utc>) -> ChatMessage {
        let mut m = ChatMessage::new("G1", "U1", "hello");
        m.message_id = id.to_string();
        m.created_at = created_at;
        m
    }

    #[test]
    fn empty_input_is_a_no_op() {
        let out = Segmenter::default().segment(vec![]);
        assert!(out.is_empty());
        assert!(out.current.is_none());
    }

    #[test]
    fn single_message_opens_one_topic() {
        let out = Segmenter::default().segment(vec![msg("m1", at(9, 0))]);
        assert_eq!(out.topics.len(), 1);
        assert_eq!(out.messages[0].topic_id, Some(out.topics[0].topic_id.clone()));
        assert!(out.messages[0].is_analyzed);
        assert_eq!(out.topics[0].title, "Topic 2024-06-15 09:00");
    }

    #[test]
    fn every_message_is_assigned_and_analyzed() {
        let out = Segmenter::default().segment(vec![
            msg("m1", at(9, 0)),
            msg("m2", at(9, 30)),
            msg("m3", at(11, 15)),
            msg("m4", at(11, 45)),
        ]);
        for m in &out.messages {
            assert!(m.is_analyzed);
            assert!(m.topic_id.is_some());
        }
    }

    #[test]
    fn messages_within_gap_of_anchor_share_a_topic() {
        let out = Segmenter::default().segment(vec![
            msg("m1", at(9, 0)),
            msg("m2", at(9, 59)),
            // Exactly one hour from the anchor is still inside the run.
            msg("m3", at(10, 0)),
        ]);
        assert_eq!(out.topics.len(), 1);
    }

    #[test]
    fn gap_beyond_threshold_opens_new_topic_and_resets_anchor() {
        let out = Segmenter::default().segment(vec![
            msg("m1", at(9, 0)),
            msg("m2", at(9, 59)),
            msg("m3", at(10, 30)), // 1h30m from the 09:00 anchor
            msg("m4", at(11, 0)),  // 30m from the new 10:30 anchor
        ]);
        assert_eq!(out.topics.len(), 2);
        let second = &out.topics[1].topic_id;
        assert_eq!(out.messages[2].topic_id.as_ref(), Some(second));
        assert_eq!(out.messages[3].topic_id.as_ref(), Some(second));
        assert_eq!(out.topics[1].title, "Topic 2024-06-15 10:30");
    }

    #[test]
    fn gap_is_measured_from_anchor_not_previous_message() {
        // Small gaps between consecutive messages do not extend a topic past
        // the threshold from its first message.
        let out = Segmenter::default().segment(vec![
            msg("m1", at(9, 0)),
            msg("m2", at(9, 40)),
            msg("m3", at(10, 20)), // only 40m after m2, but 1h20m after anchor
        ]);
        assert_eq!(out.topics.len(), 2);
    }

    #[test]
    fn three_messages_split_per_scenario() {
        // 09:00, 09:30, 11:15 -> [09:00, 09:30] and [11:15].
        let out = Segmenter::default().segment(vec![
            msg("m1", at(9, 0)),
            msg("m2", at(9, 30)),
            msg("m3", at(11, 15)),
        ]);
        assert_eq!(out.topics.len(), 2);
        assert_eq!(out.messages[0].topic_id, out.messages[1].topic_id);
        assert_ne!(out.messages[1].topic_id, out.messages[2].topic_id);
    }

    #[test]
    fn current_is_the_last_opened_topic() {
        let out = Segmenter::default().segment(vec![
            msg("m1", at(9, 0)),
            msg("m2", at(11, 15)),
        ]);
        let current = out.current.as_ref().unwrap();
        assert_eq!(current.topic_id, out.topics[1].topic_id);
    }

    #[test]
    fn unordered_input_is_sorted_before_partitioning() {
        let out = Segmenter::default().segment(vec![
            msg("m3", at(11, 15)),
            msg("m1", at(9, 0)),
            msg("m2", at(9, 30)),
        ]);
        assert_eq!(out.topics.len(), 2);
        assert_eq!(out.messages[0].message_id, "m1");
        assert_eq!(out.messages[2].message_id, "m3");
    }

    #[test]
    fn equal_timestamps_break_ties_by_message_id() {
        let first = Segmenter::default().segment(vec![
            msg("b", at(9, 0)),
            msg("a", at(9, 0)),
        ]);
        let second = Segmenter::default().segment(vec![
            msg("a", at(9, 0)),
            msg("b", at(9, 0)),
        ]);
        let order: Vec<_> = first.messages.iter().map(|m| m.message_id.clone()).collect();
        let order2: Vec<_> = second.messages.iter().map(|m| m.message_id.clone()).collect();
        assert_eq!(order, vec!["a", "b"]);
        assert_eq!(order, order2);
    }

    #[test]
    fn rerun_with_no_new_messages_produces_nothing() {
        // Callers feed only unanalyzed messages, so a second pass after a
        // committed segmentation sees an empty batch.
        let seg = Segmenter::default();
        let first = seg.segment(vec![msg("m1", at(9, 0))]);
        assert_eq!(first.topics.len(), 1);
        let second = seg.segment(vec![]);
        assert!(second.is_empty());
    }
}
