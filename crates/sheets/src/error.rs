//! Error types for the Sheets client.

use thiserror::Error;

/// Errors returned by spreadsheet operations.
#[derive(Debug, Error)]
pub enum SheetsError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned a non-success status
    #[error("Sheets API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Token exchange was rejected
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// Service account credentials are missing or malformed
    #[error("Invalid service account credentials: {0}")]
    Credentials(String),

    /// JWT signing failed
    #[error("JWT error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    /// Response body could not be parsed
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Spreadsheet has no tabs
    #[error("Spreadsheet has no sheets")]
    NoSheets,

    /// Client was never configured
    #[error("Sheets API client is not initialized")]
    Disabled,
}
