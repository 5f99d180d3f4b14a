//! The text-generation seam.

use async_trait::async_trait;
use thiserror::Error;

/// Failure talking to the remote model.
#[derive(Debug, Error)]
pub enum GenerationError {
    /// The service answered with a non-success status.
    #[error("generation service returned {status}: {message}")]
    Status { status: u16, message: String },

    /// The request never completed (DNS, TLS, timeout, reset...).
    #[error("transport error: {0}")]
    Transport(String),

    /// The response arrived but could not be decoded.
    #[error("malformed response: {0}")]
    Decode(String),
}

impl GenerationError {
    /// True when the failure points at the credential or the model
    /// (unknown model, revoked key, missing permission) rather than at the
    /// connection.
    pub fn is_permission(&self) -> bool {
        match self {
            GenerationError::Status { status, message } => {
                matches!(status, 401 | 403 | 404) || mentions_permission(message)
            }
            GenerationError::Transport(message) => mentions_permission(message),
            GenerationError::Decode(_) => false,
        }
    }
}

fn mentions_permission(message: &str) -> bool {
    let m = message.to_ascii_lowercase();
    m.contains("not found")
        || m.contains("permission")
        || m.contains("api key not valid")
        || m.contains("unauthenticated")
}

/// A one-shot prompt → text service.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generate text for `prompt`.  An empty string means the model
    /// answered with nothing.
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError>;
}
