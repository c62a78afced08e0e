//! Queue backend trait and types.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::QueueError;

/// Largest batch a single receive call may return (SQS hard limit).
pub const MAX_RECEIVE_BATCH: u32 = 10;

/// Acknowledgment returned by the provider once a message is accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendReceipt {
    /// Provider-assigned message identifier.
    pub message_id: String,
    /// Hex MD5 digest of the message body, as computed by the provider.
    pub md5_of_body: String,
}

/// A message received from a queue.
///
/// Serialized with the provider's field names so receive results can be
/// handed to clients as-is.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueMessage {
    /// Unique message identifier from the queue provider.
    #[serde(rename = "MessageId")]
    pub id: String,
    /// Provider-specific handle for later visibility/delete calls.
    #[serde(rename = "ReceiptHandle")]
    pub receipt_handle: String,
    #[serde(rename = "MD5OfBody")]
    pub md5_of_body: String,
    /// Raw message body.
    #[serde(rename = "Body")]
    pub body: String,
    /// System attributes such as `SentTimestamp` and `ApproximateReceiveCount`.
    #[serde(rename = "Attributes", default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, String>,
}

/// Health status of a queue connection.
#[derive(Debug, Clone, Serialize)]
pub struct QueueHealth {
    /// Whether the queue is reachable.
    pub connected: bool,
    /// Approximate number of messages waiting in the queue.
    pub approximate_message_count: Option<u64>,
    /// Queue provider name (e.g., "sqs", "memory").
    pub provider: String,
}

/// Trait for queue backends.
///
/// Implementations own the message lifecycle (visibility, retention,
/// deletion). Callers only send and receive; nothing is retried here.
#[async_trait]
pub trait QueueBackend: Send + Sync {
    /// Send `body` as a single message with no delivery delay.
    async fn send(&self, body: &str) -> Result<SendReceipt, QueueError>;

    /// Receive up to `max_messages` visible messages (capped at [`MAX_RECEIVE_BATCH`]).
    ///
    /// Returns an empty vec if no messages are available. No ordering is
    /// guaranteed beyond what the provider offers.
    async fn receive(&self, max_messages: u32) -> Result<Vec<QueueMessage>, QueueError>;

    /// Check queue connectivity and return health status.
    async fn health_check(&self) -> Result<QueueHealth, QueueError>;

    /// Provider name for logs and health output.
    fn provider(&self) -> &'static str;
}
