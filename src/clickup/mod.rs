//! ClickUp REST API v2 integration.
//!
//! - client: authenticated HTTP calls and pagination
//! - model: wire records and their mapping to the host task type

pub mod client;
pub mod model;

pub use client::ClickUpClient;
pub use model::{ClickUpTask, ClickUpTaskStatus, ClickUpUser};

/// Production API endpoint.
pub const DEFAULT_BASE_URL: &str = "https://app.clickup.com/api/v2";

#[derive(Debug, thiserror::Error)]
pub enum ClickUpError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    #[error("HTTP: {0}")]
    Http(#[from] reqwest::Error),
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },
    #[error("JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Task {0} not found")]
    TaskNotFound(String),
    #[error("Credential error: {0}")]
    Credential(String),
    #[error("IO: {0}")]
    Io(#[from] std::io::Error),
}

/// Decrypts the personal API token the host stores.
///
/// The client keeps only the encrypted form at rest and decrypts
/// immediately before each request; the plaintext never outlives the
/// request being built.
pub trait TokenDecryptor: Send + Sync {
    fn decrypt(&self, encrypted: &str) -> Result<String, ClickUpError>;
}

/// Pass-through for hosts that store the token unencrypted.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlaintextToken;

impl TokenDecryptor for PlaintextToken {
    fn decrypt(&self, encrypted: &str) -> Result<String, ClickUpError> {
        Ok(encrypted.to_string())
    }
}
