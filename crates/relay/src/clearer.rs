//! Clears processed rows from the sheet, keeping the header row.

use std::sync::Arc;

use form_sheets::{sheet_range, SheetsError};
use tracing::info;

use crate::config::CLEAR_CELLS;
use crate::sheet::SheetApi;

/// Empties the data rows of the form sheet.
pub struct SheetClearer {
    sheet: Arc<dyn SheetApi>,
}

impl SheetClearer {
    #[must_use]
    pub fn new(sheet: Arc<dyn SheetApi>) -> Self {
        Self { sheet }
    }

    /// Clear every data row of the first tab. Returns the cleared range.
    pub async fn clear(&self) -> Result<String, SheetsError> {
        let title = self.sheet.first_sheet_title().await?;
        let range = sheet_range(&title, CLEAR_CELLS);

        self.sheet.clear(&range).await?;
        info!(range = %range, "Form responses cleared");
        Ok(range)
    }
}
