//! Secret provider error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SecretError {
    #[error("secret not found: {0}")]
    NotFound(String),

    #[error("secret {0} has no string value")]
    NoStringValue(String),

    #[error("malformed credential record: {0}")]
    Malformed(String),

    #[error("provider error: {0}")]
    Provider(String),
}
