pub mod backend;
pub mod error;
pub mod memory;
pub mod sqs;

pub use backend::{QueueBackend, QueueHealth, QueueMessage, SendReceipt, MAX_RECEIVE_BATCH};
pub use error::QueueError;
pub use memory::MemoryQueue;
pub use sqs::SqsBackend;
