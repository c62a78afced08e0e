//! Credential service: issues and validates Basic-style tokens against the
//! credential record held by the secret provider.
//!
//! The record is fetched on every call. A rotated secret takes effect on the
//! next request.

use std::sync::Arc;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use tracing::{debug, error, warn};

use notebox_secrets::{CredentialRecord, SecretProvider};

use crate::error::ApiError;

type HmacSha256 = Hmac<Sha256>;

const COMPARE_KEY: &[u8] = b"notebox-credential-compare";

/// Build the token handed to clients: `Basic base64(username:token)`.
pub fn basic_token(record: &CredentialRecord) -> String {
    let pair = format!("{}:{}", record.username, record.token);
    format!("Basic {}", STANDARD.encode(pair))
}

fn tag(value: &str) -> Option<Vec<u8>> {
    let mut mac = HmacSha256::new_from_slice(COMPARE_KEY).ok()?;
    mac.update(value.as_bytes());
    Some(mac.finalize().into_bytes().to_vec())
}

/// Constant-time string equality via fixed-length HMAC tags.
pub fn constant_time_eq(expected: &str, provided: &str) -> bool {
    let Some(expected_tag) = tag(expected) else {
        return false;
    };
    let Ok(mut mac) = HmacSha256::new_from_slice(COMPARE_KEY) else {
        return false;
    };
    mac.update(provided.as_bytes());
    mac.verify_slice(&expected_tag).is_ok()
}

/// Split a Basic-style header into its `(user, pass)` pair.
fn decode_header(header: &str) -> Result<(String, String), ApiError> {
    let (_scheme, encoded) = header
        .split_once(' ')
        .ok_or(ApiError::MalformedAuth("expected '<scheme> <credentials>'"))?;

    let decoded = STANDARD
        .decode(encoded.trim())
        .map_err(|_| ApiError::MalformedAuth("credentials are not valid base64"))?;
    let decoded = String::from_utf8(decoded)
        .map_err(|_| ApiError::MalformedAuth("credentials are not valid UTF-8"))?;

    let (user, pass) = decoded
        .split_once(':')
        .ok_or(ApiError::MalformedAuth("expected 'username:token'"))?;

    Ok((user.to_string(), pass.to_string()))
}

pub struct CredentialService {
    provider: Arc<dyn SecretProvider>,
    secret_id: String,
}

impl CredentialService {
    pub fn new(provider: Arc<dyn SecretProvider>, secret_id: impl Into<String>) -> Self {
        Self {
            provider,
            secret_id: secret_id.into(),
        }
    }

    /// Fetch the current credential record. Not retried.
    pub async fn fetch_credential(&self) -> Result<CredentialRecord, ApiError> {
        let raw = self
            .provider
            .get_secret_string(&self.secret_id)
            .await
            .map_err(|e| {
                error!(
                    secret_id = %self.secret_id,
                    provider = self.provider.provider(),
                    error = %e,
                    "Secret lookup failed"
                );
                ApiError::SecretUnavailable
            })?;

        CredentialRecord::from_secret_string(&raw).map_err(|e| {
            error!(secret_id = %self.secret_id, error = %e, "Secret is not a credential record");
            ApiError::SecretUnavailable
        })
    }

    pub async fn issue_token(&self) -> Result<String, ApiError> {
        let record = self.fetch_credential().await?;
        Ok(basic_token(&record))
    }

    /// Validate an `Authorization` header value against the current record.
    ///
    /// The header is parsed before the secret is fetched, so a missing or
    /// malformed header never reaches the provider.
    pub async fn authorize(&self, header: Option<&str>) -> Result<(), ApiError> {
        let header = header
            .map(str::trim)
            .filter(|h| !h.is_empty())
            .ok_or(ApiError::MissingAuth)?;

        let (user, pass) = decode_header(header)?;
        let record = self.fetch_credential().await?;

        // Both comparisons always run.
        let user_ok = constant_time_eq(&record.username, &user);
        let pass_ok = constant_time_eq(&record.token, &pass);
        if !(user_ok & pass_ok) {
            warn!("Authorization credentials rejected");
            return Err(ApiError::InvalidCredentials);
        }

        debug!("Request authorized");
        Ok(())
    }
}
