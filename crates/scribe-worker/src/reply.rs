use scribe_types::StructuredSummary;

/// Render the user-visible minutes message.
pub fn format_summary(summary: &StructuredSummary) -> String {
    let decisions: String = summary
        .decisions
        .iter()
        .map(|d| format!("・{}\n", d))
        .collect();
    let todos: String = summary
        .todos
        .iter()
        .map(|t| format!("・{} (@{})\n", t.task, t.assignee))
        .collect();
    format!(
        "📝 会話の要約:\n{}\n\n🎯 重要な決定事項:\n{}📋 ToDo:\n{}",
        summary.summary, decisions, todos
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use scribe_types::TodoItem;

    #[test]
    fn renders_the_exact_reply_layout() {
        let summary = StructuredSummary {
            summary: "金曜リリースを決定".to_string(),
            decisions: vec!["金曜にリリースする".to_string(), "告知は木曜".to_string()],
            todos: vec![TodoItem {
                task: "告知を書く".to_string(),
                assignee: "田中".to_string(),
                due_date: None,
            }],
        };

        assert_eq!(
            format_summary(&summary),
            "📝 会話の要約:\n金曜リリースを決定\n\n🎯 重要な決定事項:\n・金曜にリリースする\n・告知は木曜\n📋 ToDo:\n・告知を書く (@田中)\n"
        );
    }

    #[test]
    fn empty_sections_keep_their_headers() {
        let summary = StructuredSummary {
            summary: "雑談のみ".to_string(),
            decisions: vec![],
            todos: vec![],
        };

        assert_eq!(
            format_summary(&summary),
            "📝 会話の要約:\n雑談のみ\n\n🎯 重要な決定事項:\n📋 ToDo:\n"
        );
    }
}
