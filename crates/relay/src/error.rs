//! Error types for the relay loop.

use form_notify::ChannelError;
use form_sheets::SheetsError;
use thiserror::Error;

/// Errors from reading new responses.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Spreadsheet could not be read
    #[error("Failed to read form responses: {0}")]
    Sheets(#[from] SheetsError),

    /// Header row lacks the unique key column
    #[error("No '{0}' column found in header row")]
    MissingKeyColumn(String),
}

/// Errors that abort a whole cycle.
#[derive(Debug, Error)]
pub enum CycleError {
    /// Channel id was never configured
    #[error("{role} channel id is not configured")]
    ChannelNotConfigured { role: &'static str },

    /// Channel lookup failed
    #[error("{role} channel {channel_id} could not be resolved: {source}")]
    ChannelUnavailable {
        role: &'static str,
        channel_id: u64,
        #[source]
        source: ChannelError,
    },
}
