//! Discord bot channel using the REST API.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::{ChannelHandle, ChatChannel};
use crate::error::ChannelError;
use crate::message::{Embed, Message};

/// Discord REST API base URL.
pub const DEFAULT_API_BASE: &str = "https://discord.com/api/v10";

/// Default timeout for API requests.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Accent color for every embed (blue).
const EMBED_COLOR: u32 = 0x0034_98db;

/// Fallback when a 429 carries no usable `retry-after` header.
const DEFAULT_RETRY_AFTER_SECS: u64 = 5;

/// The user the bot token belongs to.
#[derive(Debug, Clone, Deserialize)]
pub struct BotUser {
    pub id: String,
    pub username: String,
}

/// Discord channel backed by a bot token.
pub struct DiscordBot {
    token: String,
    api_base: String,
    client: reqwest::Client,
}

impl DiscordBot {
    /// Create a bot client against the public Discord API.
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be built.
    pub fn new(token: impl Into<String>) -> Result<Self, ChannelError> {
        Self::with_api_base(token, DEFAULT_API_BASE)
    }

    /// Create a bot client against a specific API base URL.
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be built.
    pub fn with_api_base(
        token: impl Into<String>,
        api_base: impl Into<String>,
    ) -> Result<Self, ChannelError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            token: token.into(),
            api_base: api_base.into().trim_end_matches('/').to_string(),
            client,
        })
    }

    fn auth_header(&self) -> String {
        format!("Bot {}", self.token)
    }

    /// Fetch the user this token authenticates as.
    ///
    /// # Errors
    /// Returns error if the token is rejected or the request fails.
    pub async fn current_user(&self) -> Result<BotUser, ChannelError> {
        let url = format!("{}/users/@me", self.api_base);
        debug!(channel = "discord", "Fetching bot identity");

        let response = self
            .client
            .get(&url)
            .header("Authorization", self.auth_header())
            .send()
            .await?;

        let response = check_status(response, None).await?;
        Ok(response.json().await?)
    }

    fn format_payload(message: &Message) -> DiscordPayload {
        DiscordPayload {
            content: message.content.clone(),
            embeds: message.embeds.iter().map(DiscordEmbed::from).collect(),
        }
    }
}

#[async_trait]
impl ChatChannel for DiscordBot {
    fn name(&self) -> &'static str {
        "discord"
    }

    async fn resolve(&self, channel_id: u64) -> Result<ChannelHandle, ChannelError> {
        let url = format!("{}/channels/{channel_id}", self.api_base);

        let response = self
            .client
            .get(&url)
            .header("Authorization", self.auth_header())
            .send()
            .await?;

        let response = check_status(response, Some(channel_id)).await?;
        let channel: DiscordChannelObject = response.json().await?;

        debug!(channel = "discord", channel_id, name = ?channel.name, "Resolved channel");

        Ok(ChannelHandle {
            id: channel_id,
            name: channel.name,
        })
    }

    async fn send(&self, channel: &ChannelHandle, message: &Message) -> Result<(), ChannelError> {
        let url = format!("{}/channels/{}/messages", self.api_base, channel.id);
        let payload = Self::format_payload(message);

        debug!(channel = "discord", channel_id = channel.id, "Sending message");

        let response = self
            .client
            .post(&url)
            .header("Authorization", self.auth_header())
            .json(&payload)
            .send()
            .await?;

        check_status(response, Some(channel.id)).await?;
        debug!(channel = "discord", channel_id = channel.id, "Message sent");
        Ok(())
    }
}

/// Map non-success responses onto `ChannelError`.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
async fn check_status(
    response: reqwest::Response,
    channel_id: Option<u64>,
) -> Result<reqwest::Response, ChannelError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    if status == StatusCode::TOO_MANY_REQUESTS {
        let retry_after = response
            .headers()
            .get("retry-after")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<f64>().ok())
            .map_or(DEFAULT_RETRY_AFTER_SECS, |secs| secs.ceil() as u64);

        warn!(
            channel = "discord",
            retry_after_secs = retry_after,
            "Rate limited by Discord"
        );

        return Err(ChannelError::RateLimited {
            retry_after_secs: retry_after,
        });
    }

    let body = response.text().await.unwrap_or_default();

    match (status, channel_id) {
        (StatusCode::NOT_FOUND, Some(id)) => Err(ChannelError::NotFound(id)),
        (StatusCode::UNAUTHORIZED, _) => Err(ChannelError::Unauthorized(body)),
        _ => {
            warn!(
                channel = "discord",
                status = %status,
                body = %body,
                "Discord request failed"
            );
            Err(ChannelError::Other(format!(
                "Discord returned {status}: {body}"
            )))
        }
    }
}

// =============================================================================
// Discord API types
// =============================================================================

#[derive(Debug, Deserialize)]
struct DiscordChannelObject {
    #[serde(default)]
    name: Option<String>,
}

#[derive(Debug, Serialize)]
struct DiscordPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    content: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    embeds: Vec<DiscordEmbed>,
}

#[derive(Debug, Serialize)]
struct DiscordEmbed {
    title: String,
    description: String,
    color: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    timestamp: Option<String>,
}

impl From<&Embed> for DiscordEmbed {
    fn from(embed: &Embed) -> Self {
        Self {
            title: embed.title.clone(),
            description: embed.description.clone(),
            color: EMBED_COLOR,
            timestamp: embed.timestamp.map(|ts| ts.to_rfc3339()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn bot(server: &MockServer) -> DiscordBot {
        DiscordBot::with_api_base("test-token", server.uri()).unwrap()
    }

    #[tokio::test]
    async fn test_resolve_channel() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/channels/42"))
            .and(header("Authorization", "Bot test-token"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"id": "42", "type": 0, "name": "respostas"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let bot = bot(&server).await;
        assert_eq!(bot.name(), "discord");

        let handle = bot.resolve(42).await.unwrap();
        assert_eq!(handle.id, 42);
        assert_eq!(handle.name.as_deref(), Some("respostas"));
    }

    #[tokio::test]
    async fn test_resolve_missing_channel() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/channels/7"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({"message": "Unknown Channel", "code": 10003})))
            .mount(&server)
            .await;

        let err = bot(&server).await.resolve(7).await.unwrap_err();
        assert!(matches!(err, ChannelError::NotFound(7)));
    }

    #[tokio::test]
    async fn test_send_embed_payload() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/channels/42/messages"))
            .and(body_partial_json(json!({
                "embeds": [{"title": "Hello", "description": "a: 1", "color": 0x0034_98db}]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "1"})))
            .expect(1)
            .mount(&server)
            .await;

        let handle = ChannelHandle { id: 42, name: None };
        let message = Message::embed(Embed::new("Hello", "a: 1"));
        bot(&server).await.send(&handle, &message).await.unwrap();
    }

    #[tokio::test]
    async fn test_send_text_payload() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/channels/9/messages"))
            .and(body_partial_json(json!({"content": "<@123> hi"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "2"})))
            .expect(1)
            .mount(&server)
            .await;

        let handle = ChannelHandle { id: 9, name: None };
        bot(&server)
            .await
            .send(&handle, &Message::text("<@123> hi"))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_rate_limited() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/channels/42/messages"))
            .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "2.5"))
            .mount(&server)
            .await;

        let handle = ChannelHandle { id: 42, name: None };
        let err = bot(&server)
            .await
            .send(&handle, &Message::text("x"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ChannelError::RateLimited {
                retry_after_secs: 3
            }
        ));
    }

    #[tokio::test]
    async fn test_current_user_unauthorized() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/users/@me"))
            .respond_with(ResponseTemplate::new(401).set_body_string("401: Unauthorized"))
            .mount(&server)
            .await;

        let err = bot(&server).await.current_user().await.unwrap_err();
        assert!(matches!(err, ChannelError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn test_current_user() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/users/@me"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"id": "555", "username": "relay-bot"})),
            )
            .mount(&server)
            .await;

        let user = bot(&server).await.current_user().await.unwrap();
        assert_eq!(user.username, "relay-bot");
        assert_eq!(user.id, "555");
    }
}
