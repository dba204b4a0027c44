mod group;
mod message;
mod todo;
mod topic;

pub use group::GroupRepository;
pub use message::MessageRepository;
pub use todo::TodoRepository;
pub use topic::TopicRepository;
