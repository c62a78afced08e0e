//! AWS Secrets Manager provider.

use async_trait::async_trait;
use aws_credential_types::Credentials;
use aws_sdk_secretsmanager::config::BehaviorVersion;
use aws_sdk_secretsmanager::operation::get_secret_value::GetSecretValueError;
use aws_sdk_secretsmanager::Client;
use tracing::{debug, info};

use notebox_core::config::AwsConfig;

use crate::error::SecretError;
use crate::provider::SecretProvider;

/// Secrets Manager-backed provider. One client is built at startup and
/// shared by all requests.
pub struct SecretsManagerProvider {
    client: Client,
}

impl SecretsManagerProvider {
    /// Create a new provider from project config.
    pub async fn new(aws: &AwsConfig) -> Self {
        let region = aws_sdk_secretsmanager::config::Region::new(aws.region.clone());

        let mut sm_config = aws_sdk_secretsmanager::Config::builder()
            .region(region)
            .behavior_version(BehaviorVersion::latest());

        if let (Some(key_id), Some(secret)) = (&aws.access_key_id, &aws.secret_access_key) {
            let creds = Credentials::new(
                key_id,
                secret,
                aws.session_token.clone(),
                None,
                "notebox-secrets-static",
            );
            sm_config = sm_config.credentials_provider(creds);
        } else {
            let chain = aws_config::default_provider::credentials::default_provider().await;
            sm_config = sm_config.credentials_provider(chain);
        }

        if let Some(url) = aws.endpoint() {
            sm_config = sm_config.endpoint_url(url);
        }

        info!(region = %aws.region, "Secrets Manager provider initialized");

        Self {
            client: Client::from_conf(sm_config.build()),
        }
    }
}

#[async_trait]
impl SecretProvider for SecretsManagerProvider {
    async fn get_secret_string(&self, secret_id: &str) -> Result<String, SecretError> {
        debug!(secret_id, "Fetching secret");

        let resp = self
            .client
            .get_secret_value()
            .secret_id(secret_id)
            .send()
            .await
            .map_err(|e| match e.into_service_error() {
                GetSecretValueError::ResourceNotFoundException(_) => {
                    SecretError::NotFound(secret_id.to_string())
                }
                other => SecretError::Provider(format!("GetSecretValue failed: {other:?}")),
            })?;

        resp.secret_string()
            .map(str::to_string)
            .ok_or_else(|| SecretError::NoStringValue(secret_id.to_string()))
    }

    fn provider(&self) -> &'static str {
        "aws"
    }
}
