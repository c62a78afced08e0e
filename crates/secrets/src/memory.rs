//! In-process secret provider.
//!
//! Serves the `env` provider mode for local development and doubles as the
//! test fake: values can be rotated at runtime, lookups counted, and failures
//! injected.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::RwLock;

use async_trait::async_trait;

use crate::error::SecretError;
use crate::provider::{CredentialRecord, SecretProvider};

#[derive(Default)]
pub struct MemorySecretProvider {
    secrets: RwLock<HashMap<String, String>>,
    fail: AtomicBool,
    calls: AtomicUsize,
}

impl MemorySecretProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Provider holding a single credential record under `secret_id`.
    pub fn with_record(secret_id: &str, record: &CredentialRecord) -> Self {
        let provider = Self::new();
        provider.put(secret_id, record.to_secret_string());
        provider
    }

    /// Insert or replace the raw value of a secret.
    pub fn put(&self, secret_id: &str, value: impl Into<String>) {
        if let Ok(mut secrets) = self.secrets.write() {
            secrets.insert(secret_id.to_string(), value.into());
        }
    }

    /// Replace the credential record stored under `secret_id`.
    pub fn rotate(&self, secret_id: &str, record: &CredentialRecord) {
        self.put(secret_id, record.to_secret_string());
    }

    /// Make every subsequent lookup fail (or succeed again).
    pub fn fail_lookups(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    /// Number of lookups attempted so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SecretProvider for MemorySecretProvider {
    async fn get_secret_string(&self, secret_id: &str) -> Result<String, SecretError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            return Err(SecretError::Provider("secret lookup failure injected".into()));
        }

        let secrets = self
            .secrets
            .read()
            .map_err(|_| SecretError::Provider("secret map lock poisoned".into()))?;
        secrets
            .get(secret_id)
            .cloned()
            .ok_or_else(|| SecretError::NotFound(secret_id.to_string()))
    }

    fn provider(&self) -> &'static str {
        "memory"
    }
}
