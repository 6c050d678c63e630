//! Reads new form responses from the first tab of the sheet.

use std::sync::Arc;

use form_sheets::quote_sheet_title;
use tracing::{debug, warn};

use crate::error::FetchError;
use crate::response::FormResponse;
use crate::sheet::SheetApi;
use crate::store::ProcessedKeySet;

/// Fetches rows that have not been notified yet.
pub struct ResponseFetcher {
    sheet: Arc<dyn SheetApi>,
    key_column: String,
}

impl ResponseFetcher {
    #[must_use]
    pub fn new(sheet: Arc<dyn SheetApi>, key_column: impl Into<String>) -> Self {
        Self {
            sheet,
            key_column: key_column.into(),
        }
    }

    /// Read the first tab and return unprocessed responses in row order.
    pub async fn fetch(
        &self,
        processed: &dyn ProcessedKeySet,
    ) -> Result<Vec<FormResponse>, FetchError> {
        let title = self.sheet.first_sheet_title().await?;
        let rows = self.sheet.values(&quote_sheet_title(&title)).await?;

        debug!(sheet = %title, rows = rows.len(), "Read sheet values");
        self.select_new(&rows, processed)
    }

    /// Turn raw rows (header first) into responses, skipping rows without a
    /// key cell and rows whose key was already processed.
    pub fn select_new(
        &self,
        rows: &[Vec<String>],
        processed: &dyn ProcessedKeySet,
    ) -> Result<Vec<FormResponse>, FetchError> {
        let Some((headers, data)) = rows.split_first() else {
            warn!("No responses found in the sheet");
            return Ok(Vec::new());
        };

        let key_index = headers
            .iter()
            .position(|h| *h == self.key_column)
            .ok_or_else(|| FetchError::MissingKeyColumn(self.key_column.clone()))?;

        let responses = data
            .iter()
            .filter(|row| {
                row.get(key_index)
                    .is_some_and(|key| !processed.contains(key))
            })
            .map(|row| FormResponse::from_row(headers, row))
            .collect();

        Ok(responses)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sheet::DisabledSheet;
    use crate::store::InMemoryKeySet;

    const KEY: &str = "Carimbo de data/hora";

    fn fetcher() -> ResponseFetcher {
        ResponseFetcher::new(Arc::new(DisabledSheet), KEY)
    }

    fn row(values: &[&str]) -> Vec<String> {
        values.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_empty_sheet() {
        let responses = fetcher().select_new(&[], &InMemoryKeySet::new()).unwrap();
        assert!(responses.is_empty());
    }

    #[test]
    fn test_header_only() {
        let rows = vec![row(&[KEY, "Nome no IC"])];
        let responses = fetcher().select_new(&rows, &InMemoryKeySet::new()).unwrap();
        assert!(responses.is_empty());
    }

    #[test]
    fn test_missing_key_column() {
        let rows = vec![row(&["Timestamp", "Nome no IC"]), row(&["t1", "Ana"])];
        let err = fetcher()
            .select_new(&rows, &InMemoryKeySet::new())
            .unwrap_err();
        assert!(matches!(err, FetchError::MissingKeyColumn(ref c) if c == KEY));
    }

    #[test]
    fn test_processed_rows_skipped() {
        let rows = vec![
            row(&[KEY, "Nome no IC"]),
            row(&["t1", "Ana"]),
            row(&["t2", "Bia"]),
        ];
        let mut processed = InMemoryKeySet::new();
        processed.add("t1");

        let responses = fetcher().select_new(&rows, &processed).unwrap();
        assert_eq!(responses.len(), 1);
        assert_eq!(responses[0].get(KEY), Some("t2"));
    }

    #[test]
    fn test_rows_without_key_cell_skipped() {
        let rows = vec![
            row(&["Nome no IC", KEY]),
            row(&["Ana"]),
            row(&["Bia", "t2"]),
        ];
        let responses = fetcher().select_new(&rows, &InMemoryKeySet::new()).unwrap();
        assert_eq!(responses.len(), 1);
        assert_eq!(responses[0].get("Nome no IC"), Some("Bia"));
    }

    #[tokio::test]
    async fn test_disabled_sheet_is_an_error() {
        let err = fetcher().fetch(&InMemoryKeySet::new()).await.unwrap_err();
        assert!(matches!(err, FetchError::Sheets(form_sheets::SheetsError::Disabled)));
    }
}
