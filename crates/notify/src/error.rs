//! Error types for chat delivery.

use thiserror::Error;

/// Errors that can occur when resolving channels or sending messages.
#[derive(Debug, Error)]
pub enum ChannelError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Channel does not exist or the bot cannot see it
    #[error("Channel not found: {0}")]
    NotFound(u64),

    /// Bot token was rejected
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Rate limited by the service
    #[error("Rate limited, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    /// Other error
    #[error("{0}")]
    Other(String),
}
