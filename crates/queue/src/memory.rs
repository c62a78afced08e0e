//! In-process queue backend for local development and tests.
//!
//! Mimics standard-queue semantics closely enough for the gateway: received
//! messages become invisible for a visibility window and reappear afterwards
//! unless the window is zero. Sends and receives are counted, and either can
//! be made to fail on demand.

use std::collections::{BTreeMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::Utc;
use md5::{Digest, Md5};
use uuid::Uuid;

use crate::backend::{QueueBackend, QueueHealth, QueueMessage, SendReceipt, MAX_RECEIVE_BATCH};
use crate::error::QueueError;

const DEFAULT_VISIBILITY: Duration = Duration::from_secs(30);

struct StoredMessage {
    id: String,
    body: String,
    md5_of_body: String,
    sent_at_ms: i64,
    receive_count: u32,
    invisible_until: Option<Instant>,
}

/// Queue held entirely in memory.
pub struct MemoryQueue {
    messages: Mutex<VecDeque<StoredMessage>>,
    visibility: Duration,
    fail_sends: AtomicBool,
    fail_receives: AtomicBool,
    send_calls: AtomicUsize,
    receive_calls: AtomicUsize,
}

impl Default for MemoryQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryQueue {
    pub fn new() -> Self {
        Self::with_visibility(DEFAULT_VISIBILITY)
    }

    /// Create a queue whose received messages stay hidden for `visibility`.
    pub fn with_visibility(visibility: Duration) -> Self {
        Self {
            messages: Mutex::new(VecDeque::new()),
            visibility,
            fail_sends: AtomicBool::new(false),
            fail_receives: AtomicBool::new(false),
            send_calls: AtomicUsize::new(0),
            receive_calls: AtomicUsize::new(0),
        }
    }

    /// Make every subsequent send fail (or succeed again).
    pub fn fail_sends(&self, fail: bool) {
        self.fail_sends.store(fail, Ordering::SeqCst);
    }

    /// Make every subsequent receive fail (or succeed again).
    pub fn fail_receives(&self, fail: bool) {
        self.fail_receives.store(fail, Ordering::SeqCst);
    }

    /// Number of send attempts, including failed ones.
    pub fn send_calls(&self) -> usize {
        self.send_calls.load(Ordering::SeqCst)
    }

    /// Number of receive attempts, including failed ones.
    pub fn receive_calls(&self) -> usize {
        self.receive_calls.load(Ordering::SeqCst)
    }

    /// Total messages held, visible or not.
    pub fn len(&self) -> usize {
        self.messages.lock().map(|m| m.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn md5_hex(body: &str) -> String {
    hex::encode(Md5::digest(body.as_bytes()))
}

fn poisoned<T>(_: T) -> QueueError {
    QueueError::Provider("memory queue lock poisoned".into())
}

#[async_trait]
impl QueueBackend for MemoryQueue {
    async fn send(&self, body: &str) -> Result<SendReceipt, QueueError> {
        self.send_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_sends.load(Ordering::SeqCst) {
            return Err(QueueError::Send("memory queue send failure injected".into()));
        }

        let stored = StoredMessage {
            id: Uuid::new_v4().to_string(),
            body: body.to_string(),
            md5_of_body: md5_hex(body),
            sent_at_ms: Utc::now().timestamp_millis(),
            receive_count: 0,
            invisible_until: None,
        };
        let receipt = SendReceipt {
            message_id: stored.id.clone(),
            md5_of_body: stored.md5_of_body.clone(),
        };

        self.messages.lock().map_err(poisoned)?.push_back(stored);
        Ok(receipt)
    }

    async fn receive(&self, max_messages: u32) -> Result<Vec<QueueMessage>, QueueError> {
        self.receive_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_receives.load(Ordering::SeqCst) {
            return Err(QueueError::Receive("memory queue receive failure injected".into()));
        }

        let capped = max_messages.clamp(1, MAX_RECEIVE_BATCH) as usize;
        let now = Instant::now();
        let mut messages = self.messages.lock().map_err(poisoned)?;

        let mut received = Vec::with_capacity(capped);
        for stored in messages.iter_mut() {
            if received.len() == capped {
                break;
            }
            if stored.invisible_until.is_some_and(|until| until > now) {
                continue;
            }

            stored.receive_count += 1;
            stored.invisible_until = Some(now + self.visibility);

            let mut attributes = BTreeMap::new();
            attributes.insert("SentTimestamp".to_string(), stored.sent_at_ms.to_string());
            attributes.insert(
                "ApproximateReceiveCount".to_string(),
                stored.receive_count.to_string(),
            );

            received.push(QueueMessage {
                id: stored.id.clone(),
                receipt_handle: format!("{}#{}", stored.id, stored.receive_count),
                md5_of_body: stored.md5_of_body.clone(),
                body: stored.body.clone(),
                attributes,
            });
        }

        Ok(received)
    }

    async fn health_check(&self) -> Result<QueueHealth, QueueError> {
        let now = Instant::now();
        let visible = self
            .messages
            .lock()
            .map_err(poisoned)?
            .iter()
            .filter(|m| m.invisible_until.map_or(true, |until| until <= now))
            .count();

        Ok(QueueHealth {
            connected: true,
            approximate_message_count: Some(visible as u64),
            provider: self.provider().to_string(),
        })
    }

    fn provider(&self) -> &'static str {
        "memory"
    }
}
