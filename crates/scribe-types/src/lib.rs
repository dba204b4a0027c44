pub mod entities;
pub mod summary;
pub mod work;

pub use entities::{ChatMessage, Group, Todo, TodoStatus, Topic, TopicStatus};
pub use summary::{StructuredSummary, TodoItem, Utterance};
pub use work::WorkItem;
