//! Queue error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum QueueError {
    #[error("connection error: {0}")]
    Connection(String),

    #[error("send error: {0}")]
    Send(String),

    #[error("receive error: {0}")]
    Receive(String),

    #[error("malformed provider response: {0}")]
    Parse(String),

    #[error("provider error: {0}")]
    Provider(String),
}
