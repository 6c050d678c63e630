//! Google Sheets v4 REST client.

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, StatusCode};
use tracing::{debug, warn};

use crate::auth::TokenSource;
use crate::error::SheetsError;
use crate::models::{SpreadsheetMetadata, ValueRange};

/// Sheets API base URL.
pub const DEFAULT_API_BASE: &str = "https://sheets.googleapis.com";

/// Default timeout for API requests.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Quote a tab title for use in A1 notation, doubling embedded quotes.
#[must_use]
pub fn quote_sheet_title(title: &str) -> String {
    format!("'{}'", title.replace('\'', "''"))
}

/// Build an A1 range on a tab, e.g. `'Form Responses'!A2:Z`.
#[must_use]
pub fn sheet_range(title: &str, cells: &str) -> String {
    format!("{}!{cells}", quote_sheet_title(title))
}

/// Client bound to one spreadsheet.
#[derive(Clone)]
pub struct SheetsClient {
    client: Client,
    api_base: String,
    spreadsheet_id: String,
    tokens: Arc<dyn TokenSource>,
}

impl SheetsClient {
    /// Create a client against the public Sheets API.
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be created.
    pub fn new(
        spreadsheet_id: impl Into<String>,
        tokens: Arc<dyn TokenSource>,
    ) -> Result<Self, SheetsError> {
        Self::with_api_base(spreadsheet_id, tokens, DEFAULT_API_BASE)
    }

    /// Create a client against a specific API base URL.
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be created.
    pub fn with_api_base(
        spreadsheet_id: impl Into<String>,
        tokens: Arc<dyn TokenSource>,
        api_base: impl Into<String>,
    ) -> Result<Self, SheetsError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            api_base: api_base.into().trim_end_matches('/').to_string(),
            spreadsheet_id: spreadsheet_id.into(),
            tokens,
        })
    }

    #[must_use]
    pub fn spreadsheet_id(&self) -> &str {
        &self.spreadsheet_id
    }

    fn spreadsheet_url(&self) -> String {
        format!("{}/v4/spreadsheets/{}", self.api_base, self.spreadsheet_id)
    }

    fn values_url(&self, range: &str) -> String {
        format!(
            "{}/values/{}",
            self.spreadsheet_url(),
            urlencoding::encode(range)
        )
    }

    /// Make an authenticated GET request.
    async fn get<T: serde::de::DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, &str)],
    ) -> Result<T, SheetsError> {
        debug!(url = %url, "GET request");

        let token = self.tokens.access_token().await?;
        let response = self
            .client
            .get(url)
            .bearer_auth(token)
            .query(query)
            .send()
            .await?;

        Self::handle_response(response).await
    }

    /// Make an authenticated POST request with a JSON body.
    async fn post<T, B>(&self, url: &str, body: &B) -> Result<T, SheetsError>
    where
        T: serde::de::DeserializeOwned,
        B: serde::Serialize,
    {
        debug!(url = %url, "POST request");

        let token = self.tokens.access_token().await?;
        let response = self
            .client
            .post(url)
            .bearer_auth(token)
            .json(body)
            .send()
            .await?;

        Self::handle_response(response).await
    }

    /// Handle API response.
    async fn handle_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, SheetsError> {
        let status = response.status();
        let text = response.text().await?;

        if status.is_success() {
            serde_json::from_str(&text).map_err(|e| {
                warn!(error = %e, body = %text, "Failed to parse response");
                SheetsError::Serialization(e)
            })
        } else if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            Err(SheetsError::Auth(text))
        } else {
            Err(SheetsError::Api {
                status: status.as_u16(),
                message: text,
            })
        }
    }

    /// Title of the first tab. Looked up on every call since tabs can be
    /// renamed at any time.
    ///
    /// # Errors
    /// Returns error if the request fails or the spreadsheet has no tabs.
    pub async fn first_sheet_title(&self) -> Result<String, SheetsError> {
        let metadata: SpreadsheetMetadata = self
            .get(&self.spreadsheet_url(), &[("fields", "sheets.properties.title")])
            .await?;

        metadata
            .sheets
            .into_iter()
            .next()
            .map(|sheet| sheet.properties.title)
            .ok_or(SheetsError::NoSheets)
    }

    /// Read every value in `range` as rows of formatted strings.
    ///
    /// # Errors
    /// Returns error if the request fails.
    pub async fn values(&self, range: &str) -> Result<Vec<Vec<String>>, SheetsError> {
        let value_range: ValueRange = self.get(&self.values_url(range), &[]).await?;
        Ok(value_range.into_rows())
    }

    /// Clear every value in `range`, leaving formatting intact.
    ///
    /// # Errors
    /// Returns error if the request fails.
    pub async fn clear(&self, range: &str) -> Result<(), SheetsError> {
        let url = format!("{}:clear", self.values_url(range));
        let _: serde_json::Value = self.post(&url, &serde_json::json!({})).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::StaticToken;
    use serde_json::json;
    use wiremock::matchers::{header, method, path, path_regex, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> SheetsClient {
        SheetsClient::with_api_base("sheet-123", Arc::new(StaticToken::new("tok")), server.uri())
            .unwrap()
    }

    #[test]
    fn test_quote_sheet_title() {
        assert_eq!(quote_sheet_title("Respostas"), "'Respostas'");
        assert_eq!(quote_sheet_title("Bob's Form"), "'Bob''s Form'");
        assert_eq!(sheet_range("Form Responses 1", "A2:Z"), "'Form Responses 1'!A2:Z");
    }

    #[tokio::test]
    async fn test_first_sheet_title() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v4/spreadsheets/sheet-123"))
            .and(query_param("fields", "sheets.properties.title"))
            .and(header("Authorization", "Bearer tok"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "sheets": [
                    {"properties": {"title": "Respostas"}},
                    {"properties": {"title": "Arquivo"}}
                ]
            })))
            .mount(&server)
            .await;

        assert_eq!(client(&server).first_sheet_title().await.unwrap(), "Respostas");
    }

    #[tokio::test]
    async fn test_no_sheets() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v4/spreadsheets/sheet-123"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .mount(&server)
            .await;

        let err = client(&server).first_sheet_title().await.unwrap_err();
        assert!(matches!(err, SheetsError::NoSheets));
    }

    #[tokio::test]
    async fn test_values() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v4/spreadsheets/sheet-123/values/Respostas"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "range": "Respostas!A1:C2",
                "majorDimension": "ROWS",
                "values": [["Carimbo de data/hora", "Nome no IC"], ["t1", "Ana"]]
            })))
            .mount(&server)
            .await;

        let rows = client(&server).values("Respostas").await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1], vec!["t1".to_string(), "Ana".to_string()]);
    }

    #[tokio::test]
    async fn test_clear() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path_regex(r"^/v4/spreadsheets/sheet-123/values/.+:clear$"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "spreadsheetId": "sheet-123",
                "clearedRange": "Respostas!A2:Z1000"
            })))
            .expect(1)
            .mount(&server)
            .await;

        client(&server)
            .clear(&sheet_range("Respostas", "A2:Z"))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_api_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v4/spreadsheets/sheet-123/values/Respostas"))
            .respond_with(ResponseTemplate::new(500).set_body_string("backend error"))
            .mount(&server)
            .await;

        let err = client(&server).values("Respostas").await.unwrap_err();
        assert!(matches!(err, SheetsError::Api { status: 500, .. }));
    }

    #[tokio::test]
    async fn test_forbidden_maps_to_auth() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v4/spreadsheets/sheet-123"))
            .respond_with(ResponseTemplate::new(403).set_body_string("caller does not have permission"))
            .mount(&server)
            .await;

        let err = client(&server).first_sheet_title().await.unwrap_err();
        assert!(matches!(err, SheetsError::Auth(_)));
    }
}
