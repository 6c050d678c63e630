//! Outgoing chat message types.

use chrono::{DateTime, Utc};

/// A decorated message block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Embed {
    pub title: String,
    pub description: String,
    pub timestamp: Option<DateTime<Utc>>,
}

impl Embed {
    #[must_use]
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            timestamp: None,
        }
    }

    #[must_use]
    pub const fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }
}

/// A message to post into a channel: plain content, embeds, or both.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Message {
    pub content: Option<String>,
    pub embeds: Vec<Embed>,
}

impl Message {
    /// Plain text message.
    #[must_use]
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            embeds: Vec::new(),
        }
    }

    /// Message carrying a single embed.
    #[must_use]
    pub fn embed(embed: Embed) -> Self {
        Self {
            content: None,
            embeds: vec![embed],
        }
    }

    /// All visible text in the message, for logging and assertions.
    #[must_use]
    pub fn rendered_text(&self) -> String {
        let mut parts: Vec<&str> = Vec::new();
        if let Some(content) = &self.content {
            parts.push(content);
        }
        for embed in &self.embeds {
            parts.push(&embed.title);
            parts.push(&embed.description);
        }
        parts.join("\n")
    }
}
