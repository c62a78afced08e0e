pub mod aws;
pub mod error;
pub mod memory;
pub mod provider;

pub use aws::SecretsManagerProvider;
pub use error::SecretError;
pub use memory::MemorySecretProvider;
pub use provider::{CredentialRecord, SecretProvider};
