//! One form submission as read from the sheet.

/// An ordered header-to-cell record for a single row.
///
/// Built by zipping the header row with a data row. Cells past the end of a
/// short row are absent rather than empty, so [`FormResponse::get`] returns
/// `None` for them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormResponse {
    fields: Vec<(String, String)>,
}

impl FormResponse {
    /// Zip `headers` with `row` positionally.
    ///
    /// A repeated header keeps its first position and takes the later value.
    #[must_use]
    pub fn from_row(headers: &[String], row: &[String]) -> Self {
        let mut response = Self::default();
        for (header, value) in headers.iter().zip(row) {
            response.insert(header, value);
        }
        response
    }

    fn insert(&mut self, header: &str, value: &str) {
        if let Some(slot) = self.fields.iter_mut().find(|(name, _)| name == header) {
            slot.1 = value.to_string();
        } else {
            self.fields.push((header.to_string(), value.to_string()));
        }
    }

    /// Look up a cell by exact header name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(header, _)| header == name)
            .map(|(_, value)| value.as_str())
    }

    /// Fields in sheet column order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields
            .iter()
            .map(|(header, value)| (header.as_str(), value.as_str()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_zip_full_row() {
        let headers = strings(&["Carimbo de data/hora", "ID do Discord", "Nome no IC"]);
        let response = FormResponse::from_row(&headers, &strings(&["t1", "999", "Ana"]));

        assert_eq!(response.len(), 3);
        assert_eq!(response.get("Carimbo de data/hora"), Some("t1"));
        assert_eq!(response.get("ID do Discord"), Some("999"));
        assert_eq!(response.get("Nome no IC"), Some("Ana"));
    }

    #[test]
    fn test_short_row_leaves_fields_absent() {
        let headers = strings(&["Carimbo de data/hora", "ID do Discord", "Nome no IC"]);
        let response = FormResponse::from_row(&headers, &strings(&["t1"]));

        assert_eq!(response.len(), 1);
        assert_eq!(response.get("ID do Discord"), None);
        assert_eq!(response.get("Nome no IC"), None);
    }

    #[test]
    fn test_field_order_preserved() {
        let headers = strings(&["b", "a", "c"]);
        let response = FormResponse::from_row(&headers, &strings(&["2", "1", "3"]));
        let names: Vec<&str> = response.fields().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["b", "a", "c"]);
    }

    #[test]
    fn test_duplicate_header_last_value_wins() {
        let headers = strings(&["x", "y", "x"]);
        let response = FormResponse::from_row(&headers, &strings(&["1", "2", "3"]));

        assert_eq!(response.len(), 2);
        assert_eq!(response.get("x"), Some("3"));
        let names: Vec<&str> = response.fields().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["x", "y"]);
    }
}
