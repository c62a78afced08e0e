use std::sync::Arc;

use tracing::info;

use notebox_core::Config;
use notebox_queue::{MemoryQueue, QueueBackend, SqsBackend};
use notebox_secrets::{CredentialRecord, MemorySecretProvider, SecretProvider, SecretsManagerProvider};

use crate::credentials::CredentialService;

/// Secret id used by the `env` provider when `SECRET_MANAGER` is unset.
const LOCAL_SECRET_ID: &str = "local";

/// Process-wide handles, built once at startup and never mutated.
pub struct AppState {
    pub credentials: CredentialService,
    pub queue: Arc<dyn QueueBackend>,
}

impl AppState {
    pub fn new(
        secrets: Arc<dyn SecretProvider>,
        secret_id: impl Into<String>,
        queue: Arc<dyn QueueBackend>,
    ) -> Self {
        Self {
            credentials: CredentialService::new(secrets, secret_id),
            queue,
        }
    }

    /// Construct the configured collaborators. Call `config.validate()` first.
    pub async fn from_config(config: &Config) -> anyhow::Result<Self> {
        let secret_id = config
            .secret
            .secret_id
            .clone()
            .unwrap_or_else(|| LOCAL_SECRET_ID.to_string());

        let secrets: Arc<dyn SecretProvider> = match config.secret.provider.as_str() {
            "env" => {
                let record = CredentialRecord::new(
                    config.secret.local_username.clone().unwrap_or_default(),
                    config.secret.local_authtoken.clone().unwrap_or_default(),
                );
                info!("Using local credential record from environment");
                Arc::new(MemorySecretProvider::with_record(&secret_id, &record))
            }
            _ => Arc::new(SecretsManagerProvider::new(&config.aws).await),
        };

        let queue: Arc<dyn QueueBackend> = match config.queue.provider.as_str() {
            "memory" => {
                info!("Using in-memory note queue");
                Arc::new(MemoryQueue::new())
            }
            _ => Arc::new(SqsBackend::new(&config.aws, &config.queue).await?),
        };

        Ok(Self::new(secrets, secret_id, queue))
    }
}
