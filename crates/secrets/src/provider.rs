//! Secret provider trait and the credential record it stores.

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::SecretError;

/// The shared username/token pair, as stored in the secret.
///
/// The stored JSON names the token field `authtoken`.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialRecord {
    pub username: String,
    #[serde(rename = "authtoken")]
    pub token: String,
}

impl CredentialRecord {
    pub fn new(username: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            token: token.into(),
        }
    }

    /// Parse the JSON payload of a secret into a record.
    ///
    /// Both `username` and `authtoken` must be present and be strings.
    pub fn from_secret_string(raw: &str) -> Result<Self, SecretError> {
        serde_json::from_str(raw).map_err(|e| SecretError::Malformed(e.to_string()))
    }

    /// Render the record in its stored JSON shape.
    pub fn to_secret_string(&self) -> String {
        serde_json::json!({ "username": self.username, "authtoken": self.token }).to_string()
    }
}

impl fmt::Debug for CredentialRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialRecord")
            .field("username", &self.username)
            .field("token", &"********")
            .finish()
    }
}

/// Trait for secret store backends.
///
/// Returns the raw string payload of a secret; parsing it is the caller's
/// concern. Implementations must not cache values.
#[async_trait]
pub trait SecretProvider: Send + Sync {
    /// Fetch the current string value of `secret_id`.
    async fn get_secret_string(&self, secret_id: &str) -> Result<String, SecretError>;

    /// Provider name for logs.
    fn provider(&self) -> &'static str;
}
