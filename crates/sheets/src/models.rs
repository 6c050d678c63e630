//! Sheets v4 API response types.

use serde::Deserialize;
use serde_json::Value;

/// Subset of `spreadsheets.get` used to find tab titles.
#[derive(Debug, Deserialize)]
pub struct SpreadsheetMetadata {
    #[serde(default)]
    pub sheets: Vec<Sheet>,
}

#[derive(Debug, Deserialize)]
pub struct Sheet {
    pub properties: SheetProperties,
}

#[derive(Debug, Deserialize)]
pub struct SheetProperties {
    pub title: String,
}

/// Body of `spreadsheets.values.get`.
#[derive(Debug, Deserialize)]
pub struct ValueRange {
    /// Absent entirely when the range holds no data.
    #[serde(default)]
    pub values: Vec<Vec<Value>>,
}

impl ValueRange {
    /// Flatten cells to strings. Formatted values are already strings;
    /// anything else is rendered as JSON text.
    #[must_use]
    pub fn into_rows(self) -> Vec<Vec<String>> {
        self.values
            .into_iter()
            .map(|row| row.into_iter().map(cell_to_string).collect())
            .collect()
    }
}

fn cell_to_string(cell: Value) -> String {
    match cell {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
