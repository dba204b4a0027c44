pub mod error;
pub mod memory;
#[cfg(feature = "mongodb")]
pub mod mongo;
pub mod queue;

pub use error::QueueError;
pub use memory::MemoryWorkQueue;
#[cfg(feature = "mongodb")]
pub use mongo::MongoWorkQueue;
pub use queue::{Delivery, WorkQueue};
