//! AWS SQS queue backend.

use std::collections::BTreeMap;

use async_trait::async_trait;
use aws_credential_types::Credentials;
use aws_sdk_sqs::config::BehaviorVersion;
use aws_sdk_sqs::types::{MessageSystemAttributeName, QueueAttributeName};
use aws_sdk_sqs::Client;
use tracing::{debug, info};

use notebox_core::config::{AwsConfig, QueueConfig};

use crate::backend::{QueueBackend, QueueHealth, QueueMessage, SendReceipt, MAX_RECEIVE_BATCH};
use crate::error::QueueError;

/// SQS-backed note queue.
pub struct SqsBackend {
    client: Client,
    queue_url: String,
    wait_time_secs: i32,
}

impl SqsBackend {
    /// Create a new SQS backend from project config.
    pub async fn new(aws: &AwsConfig, queue: &QueueConfig) -> Result<Self, QueueError> {
        let queue_url = queue
            .queue_url
            .clone()
            .ok_or_else(|| QueueError::Connection("QUEUE_URL is not set".into()))?;

        let region = aws_sdk_sqs::config::Region::new(aws.region.clone());

        // Build the client config directly so a generic AWS_ENDPOINT_URL meant
        // for another service is only applied through our own override below.
        let mut sqs_config = aws_sdk_sqs::Config::builder()
            .region(region)
            .behavior_version(BehaviorVersion::latest());

        if let (Some(key_id), Some(secret)) = (&aws.access_key_id, &aws.secret_access_key) {
            let creds = Credentials::new(
                key_id,
                secret,
                aws.session_token.clone(),
                None,
                "notebox-queue-static",
            );
            sqs_config = sqs_config.credentials_provider(creds);
        } else {
            let chain = aws_config::default_provider::credentials::default_provider().await;
            sqs_config = sqs_config.credentials_provider(chain);
        }

        if let Some(url) = aws.endpoint() {
            sqs_config = sqs_config.endpoint_url(url);
        }

        let client = Client::from_conf(sqs_config.build());

        info!(
            queue_url = %queue_url,
            region = %aws.region,
            "SQS backend initialized"
        );

        Ok(Self {
            client,
            queue_url,
            wait_time_secs: queue.wait_time_secs as i32,
        })
    }
}

#[async_trait]
impl QueueBackend for SqsBackend {
    async fn send(&self, body: &str) -> Result<SendReceipt, QueueError> {
        debug!(bytes = body.len(), "Sending SQS message");

        let resp = self
            .client
            .send_message()
            .queue_url(&self.queue_url)
            .message_body(body)
            .delay_seconds(0)
            .send()
            .await
            .map_err(|e| QueueError::Send(format!("SQS send failed: {e:?}")))?;

        let message_id = resp
            .message_id()
            .filter(|id| !id.is_empty())
            .ok_or_else(|| QueueError::Parse("send response has no MessageId".into()))?
            .to_string();

        let md5_of_body = resp
            .md5_of_message_body()
            .filter(|md5| !md5.is_empty())
            .ok_or_else(|| QueueError::Parse("send response has no MD5OfMessageBody".into()))?
            .to_string();

        debug!(message_id = %message_id, "SQS message sent");

        Ok(SendReceipt {
            message_id,
            md5_of_body,
        })
    }

    async fn receive(&self, max_messages: u32) -> Result<Vec<QueueMessage>, QueueError> {
        let capped = max_messages.clamp(1, MAX_RECEIVE_BATCH) as i32;

        debug!(max_messages = capped, "Receiving from SQS");

        let resp = self
            .client
            .receive_message()
            .queue_url(&self.queue_url)
            .max_number_of_messages(capped)
            .wait_time_seconds(self.wait_time_secs)
            .message_system_attribute_names(MessageSystemAttributeName::All)
            .send()
            .await
            .map_err(|e| QueueError::Receive(format!("SQS receive failed: {e:?}")))?;

        let sqs_messages = resp.messages.unwrap_or_default();
        debug!(count = sqs_messages.len(), "Received SQS messages");

        let mut messages = Vec::with_capacity(sqs_messages.len());
        for msg in sqs_messages {
            let id = msg
                .message_id()
                .ok_or_else(|| QueueError::Parse("received message has no MessageId".into()))?
                .to_string();

            let receipt_handle = msg
                .receipt_handle()
                .ok_or_else(|| QueueError::Parse("missing receipt handle".into()))?
                .to_string();

            let attributes: BTreeMap<String, String> = msg
                .attributes()
                .map(|attrs| {
                    attrs
                        .iter()
                        .map(|(name, value)| (name.as_str().to_string(), value.clone()))
                        .collect()
                })
                .unwrap_or_default();

            messages.push(QueueMessage {
                id,
                receipt_handle,
                md5_of_body: msg.md5_of_body().unwrap_or_default().to_string(),
                body: msg.body().unwrap_or_default().to_string(),
                attributes,
            });
        }

        Ok(messages)
    }

    async fn health_check(&self) -> Result<QueueHealth, QueueError> {
        let resp = self
            .client
            .get_queue_attributes()
            .queue_url(&self.queue_url)
            .attribute_names(QueueAttributeName::ApproximateNumberOfMessages)
            .send()
            .await
            .map_err(|e| QueueError::Connection(format!("SQS health check failed: {e:?}")))?;

        let count = resp
            .attributes()
            .and_then(|attrs| attrs.get(&QueueAttributeName::ApproximateNumberOfMessages))
            .and_then(|v| v.parse::<u64>().ok());

        Ok(QueueHealth {
            connected: true,
            approximate_message_count: count,
            provider: self.provider().to_string(),
        })
    }

    fn provider(&self) -> &'static str {
        "sqs"
    }
}
