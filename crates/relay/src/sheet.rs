//! Spreadsheet access seam used by the fetcher and clearer.

use async_trait::async_trait;
use form_sheets::{SheetsClient, SheetsError};

/// Operations the relay needs from the backing spreadsheet.
#[async_trait]
pub trait SheetApi: Send + Sync {
    /// Title of the first tab, looked up fresh on every call.
    async fn first_sheet_title(&self) -> Result<String, SheetsError>;

    /// All rows in `range`.
    async fn values(&self, range: &str) -> Result<Vec<Vec<String>>, SheetsError>;

    /// Clear every cell in `range`.
    async fn clear(&self, range: &str) -> Result<(), SheetsError>;
}

#[async_trait]
impl SheetApi for SheetsClient {
    async fn first_sheet_title(&self) -> Result<String, SheetsError> {
        SheetsClient::first_sheet_title(self).await
    }

    async fn values(&self, range: &str) -> Result<Vec<Vec<String>>, SheetsError> {
        SheetsClient::values(self, range).await
    }

    async fn clear(&self, range: &str) -> Result<(), SheetsError> {
        SheetsClient::clear(self, range).await
    }
}

/// Stand-in used when credential setup failed. Every call fails fast.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledSheet;

#[async_trait]
impl SheetApi for DisabledSheet {
    async fn first_sheet_title(&self) -> Result<String, SheetsError> {
        Err(SheetsError::Disabled)
    }

    async fn values(&self, _range: &str) -> Result<Vec<Vec<String>>, SheetsError> {
        Err(SheetsError::Disabled)
    }

    async fn clear(&self, _range: &str) -> Result<(), SheetsError> {
        Err(SheetsError::Disabled)
    }
}
