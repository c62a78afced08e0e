use std::env;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Load .env file (silently ignores if missing).
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.is_empty())
}

/// Read a profiled env var: tries {PROFILE}_{KEY} first, falls back to {KEY}.
fn profiled_env_opt(profile: &str, key: &str) -> Option<String> {
    if !profile.is_empty() {
        let prefixed = format!("{}_{}", profile, key);
        if let Some(v) = env_opt(&prefixed) {
            return Some(v);
        }
    }
    env_opt(key)
}

fn profiled_env_or(profile: &str, key: &str, default: &str) -> String {
    profiled_env_opt(profile, key).unwrap_or_else(|| default.to_string())
}

fn profiled_env_u16(profile: &str, key: &str, default: u16) -> u16 {
    profiled_env_opt(profile, key)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn profiled_env_u32(profile: &str, key: &str, default: u32) -> u32 {
    profiled_env_opt(profile, key)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

// ── Top-level config ──────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Active profile name (empty = default).
    pub profile: String,
    pub server: ServerConfig,
    pub aws: AwsConfig,
    pub secret: SecretConfig,
    pub queue: QueueConfig,
}

impl Config {
    /// Build config from environment variables (call `load_dotenv()` first).
    /// Profile is read from `NOTEBOX_PROFILE` env var. When set (e.g. `PROD`),
    /// every key is first looked up as `{PROFILE}_{KEY}`, falling back to `{KEY}`.
    pub fn from_env() -> Self {
        let profile = env_or("NOTEBOX_PROFILE", "").to_uppercase();
        Self::for_profile(&profile)
    }

    /// Build config for a specific named profile (empty string = default).
    pub fn for_profile(profile: &str) -> Self {
        let p = profile.to_uppercase();
        let p = p.as_str();
        Self {
            profile: p.to_string(),
            server: ServerConfig::from_env_profiled(p),
            aws: AwsConfig::from_env_profiled(p),
            secret: SecretConfig::from_env_profiled(p),
            queue: QueueConfig::from_env_profiled(p),
        }
    }

    pub fn profile_label(&self) -> &str {
        if self.profile.is_empty() { "default" } else { &self.profile }
    }

    /// Check that every value the selected providers need is present.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.secret.validate()?;
        self.queue.validate()?;
        Ok(())
    }

    /// Print a redacted summary for startup logs.
    pub fn log_summary(&self) {
        tracing::info!("Config loaded (profile: {}):", self.profile_label());
        tracing::info!("  server:  {}:{}", self.server.host, self.server.port);
        tracing::info!("  aws:     region={}, endpoint={}", self.aws.region, self.aws.endpoint_url.as_deref().unwrap_or("(default)"));
        tracing::info!("  secret:  provider={}, id={}", self.secret.provider, self.secret.secret_id.as_deref().unwrap_or("(none)"));
        tracing::info!("  queue:   provider={}, url={}", self.queue.provider, self.queue.queue_url.as_deref().unwrap_or("(none)"));
    }

    /// Return a redacted view safe for printing (no secrets).
    pub fn redacted_summary(&self) -> serde_json::Value {
        serde_json::json!({
            "profile": self.profile_label(),
            "server": {
                "host": self.server.host,
                "port": self.server.port,
                "cors_origin": self.server.cors_origin,
            },
            "aws": {
                "region": self.aws.region,
                "endpoint_url": self.aws.endpoint_url,
                "static_credentials": self.aws.has_static_credentials(),
            },
            "secret": {
                "provider": self.secret.provider,
                "secret_id": self.secret.secret_id,
            },
            "queue": {
                "provider": self.queue.provider,
                "queue_url": self.queue.queue_url,
                "wait_time_secs": self.queue.wait_time_secs,
            },
        })
    }
}

// ── Server ────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub cors_origin: String,
}

impl ServerConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            host: profiled_env_or(p, "HOST", "0.0.0.0"),
            port: profiled_env_u16(p, "PORT", 3000),
            cors_origin: profiled_env_or(p, "CORS_ORIGIN", "*"),
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

// ── AWS ───────────────────────────────────────────────────────

/// Settings shared by the Secrets Manager and SQS clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AwsConfig {
    pub region: String,
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
    pub session_token: Option<String>,
    pub endpoint_url: Option<String>,
}

impl AwsConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            region: profiled_env_or(p, "AWS_REGION", "us-east-1"),
            access_key_id: profiled_env_opt(p, "AWS_ACCESS_KEY_ID"),
            secret_access_key: profiled_env_opt(p, "AWS_SECRET_ACCESS_KEY"),
            session_token: profiled_env_opt(p, "AWS_SESSION_TOKEN"),
            endpoint_url: profiled_env_opt(p, "AWS_ENDPOINT_URL"),
        }
    }

    pub fn has_static_credentials(&self) -> bool {
        self.access_key_id.is_some() && self.secret_access_key.is_some()
    }

    /// Endpoint override normalized to a full URL, if one is configured.
    pub fn endpoint(&self) -> Option<String> {
        let endpoint = self.endpoint_url.as_deref()?;
        if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
            Some(endpoint.to_string())
        } else {
            Some(format!("https://{endpoint}"))
        }
    }
}

// ── Secret provider ───────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecretConfig {
    /// "aws" or "env"
    pub provider: String,
    /// Identifier of the secret holding `{username, authtoken}`.
    pub secret_id: Option<String>,
    /// Local-dev credential pair for the "env" provider.
    #[serde(skip_serializing)]
    pub local_username: Option<String>,
    #[serde(skip_serializing)]
    pub local_authtoken: Option<String>,
}

impl SecretConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            provider: profiled_env_or(p, "SECRET_PROVIDER", "aws"),
            secret_id: profiled_env_opt(p, "SECRET_MANAGER"),
            local_username: profiled_env_opt(p, "NOTEBOX_USERNAME"),
            local_authtoken: profiled_env_opt(p, "NOTEBOX_AUTHTOKEN"),
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        match self.provider.as_str() {
            "aws" if self.secret_id.is_none() => Err(ConfigError::Missing("SECRET_MANAGER")),
            "aws" => Ok(()),
            "env" if self.local_username.is_none() => Err(ConfigError::Missing("NOTEBOX_USERNAME")),
            "env" if self.local_authtoken.is_none() => Err(ConfigError::Missing("NOTEBOX_AUTHTOKEN")),
            "env" => Ok(()),
            other => Err(ConfigError::UnknownProvider {
                key: "SECRET_PROVIDER",
                value: other.to_string(),
            }),
        }
    }
}

// ── Queue backend ─────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueConfig {
    /// "sqs" or "memory"
    pub provider: String,
    pub queue_url: Option<String>,
    /// Receive long-poll duration; 0 means short polling.
    pub wait_time_secs: u32,
}

impl QueueConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            provider: profiled_env_or(p, "QUEUE_PROVIDER", "sqs"),
            queue_url: profiled_env_opt(p, "QUEUE_URL"),
            wait_time_secs: profiled_env_u32(p, "QUEUE_WAIT_TIME_SECS", 0).min(20),
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        match self.provider.as_str() {
            "sqs" if self.queue_url.is_none() => Err(ConfigError::Missing("QUEUE_URL")),
            "sqs" | "memory" => Ok(()),
            other => Err(ConfigError::UnknownProvider {
                key: "QUEUE_PROVIDER",
                value: other.to_string(),
            }),
        }
    }
}
