//! Service account authentication for Google APIs.
//!
//! Access tokens are obtained with the JWT bearer grant: a short-lived
//! assertion signed with the service account's RSA key is exchanged at the
//! token endpoint, and the resulting token is cached until shortly before
//! it expires.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::error::SheetsError;

/// Google OAuth2 token endpoint.
pub const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// Read/write access to spreadsheets.
pub const SPREADSHEETS_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets";

/// Lifetime requested for each signed assertion.
const ASSERTION_LIFETIME_SECS: i64 = 3600;

/// Refresh tokens this long before they expire.
const EXPIRY_MARGIN_SECS: i64 = 60;

const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

/// Default timeout for token requests.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Something that can hand out bearer tokens.
#[async_trait]
pub trait TokenSource: Send + Sync {
    /// Get a valid access token.
    async fn access_token(&self) -> Result<String, SheetsError>;
}

/// A fixed bearer token.
pub struct StaticToken(String);

impl StaticToken {
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}

#[async_trait]
impl TokenSource for StaticToken {
    async fn access_token(&self) -> Result<String, SheetsError> {
        Ok(self.0.clone())
    }
}

/// Service account credential fields.
#[derive(Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub private_key: String,
    pub client_email: String,
    #[serde(default)]
    pub client_id: Option<String>,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

impl ServiceAccountKey {
    /// Build a key from individual fields.
    ///
    /// Literal `\n` sequences in the private key are turned into newlines,
    /// since PEM keys passed through environment variables usually arrive
    /// escaped.
    #[must_use]
    pub fn new(private_key: &str, client_email: impl Into<String>, client_id: Option<String>) -> Self {
        Self {
            private_key: private_key.replace("\\n", "\n"),
            client_email: client_email.into(),
            client_id,
            token_uri: default_token_uri(),
        }
    }

    #[must_use]
    pub fn with_token_uri(mut self, token_uri: impl Into<String>) -> Self {
        self.token_uri = token_uri.into();
        self
    }
}

impl fmt::Debug for ServiceAccountKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceAccountKey")
            .field("private_key", &"<redacted>")
            .field("client_email", &self.client_email)
            .field("client_id", &self.client_id)
            .field("token_uri", &self.token_uri)
            .finish()
    }
}

#[derive(Debug, Serialize)]
struct Claims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: i64,
}

const fn default_expires_in() -> i64 {
    ASSERTION_LIFETIME_SECS
}

#[derive(Debug, Clone)]
struct CachedToken {
    token: String,
    expires_at: DateTime<Utc>,
}

impl CachedToken {
    fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        now + chrono::Duration::seconds(EXPIRY_MARGIN_SECS) < self.expires_at
    }
}

/// Token source backed by a service account key.
pub struct ServiceAccountAuth {
    key: ServiceAccountKey,
    encoding_key: EncodingKey,
    scope: String,
    client: reqwest::Client,
    cached: Mutex<Option<CachedToken>>,
}

impl ServiceAccountAuth {
    /// Validate the key and prepare for token exchange.
    ///
    /// # Errors
    /// Returns `SheetsError::Credentials` if the email is empty or the
    /// private key is not a valid RSA PEM.
    pub fn new(key: ServiceAccountKey) -> Result<Self, SheetsError> {
        if key.client_email.trim().is_empty() {
            return Err(SheetsError::Credentials("client email is empty".to_string()));
        }

        let encoding_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes())
            .map_err(|e| SheetsError::Credentials(format!("private key: {e}")))?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()?;

        info!(
            client_email = %key.client_email,
            client_id = ?key.client_id,
            "Service account credentials loaded"
        );

        Ok(Self {
            key,
            encoding_key,
            scope: SPREADSHEETS_SCOPE.to_string(),
            client,
            cached: Mutex::new(None),
        })
    }

    /// Sign a bearer assertion valid from `now`.
    fn sign_assertion(&self, now: DateTime<Utc>) -> Result<String, SheetsError> {
        let iat = now.timestamp();
        let claims = Claims {
            iss: &self.key.client_email,
            scope: &self.scope,
            aud: &self.key.token_uri,
            iat,
            exp: iat + ASSERTION_LIFETIME_SECS,
        };

        Ok(jsonwebtoken::encode(
            &Header::new(Algorithm::RS256),
            &claims,
            &self.encoding_key,
        )?)
    }

    async fn exchange(&self) -> Result<CachedToken, SheetsError> {
        let now = Utc::now();
        let assertion = self.sign_assertion(now)?;

        debug!(token_uri = %self.key.token_uri, "Exchanging service account assertion");

        let response = self
            .client
            .post(&self.key.token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(SheetsError::Auth(format!("token endpoint returned {status}: {text}")));
        }

        let token: TokenResponse = serde_json::from_str(&text)?;
        Ok(CachedToken {
            token: token.access_token,
            expires_at: now + chrono::Duration::seconds(token.expires_in),
        })
    }
}

#[async_trait]
impl TokenSource for ServiceAccountAuth {
    async fn access_token(&self) -> Result<String, SheetsError> {
        let mut cached = self.cached.lock().await;

        if let Some(token) = cached.as_ref().filter(|t| t.is_fresh(Utc::now())) {
            return Ok(token.token.clone());
        }

        let fresh = self.exchange().await?;
        let token = fresh.token.clone();
        *cached = Some(fresh);
        Ok(token)
    }
}
