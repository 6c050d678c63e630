//! Turns form responses into Discord messages and sends them.

use std::sync::Arc;

use chrono::Utc;
use form_notify::{ChannelHandle, ChatChannel, Embed, Message};
use tracing::{debug, error, info};

use crate::config::{FormFields, MentionTemplate};
use crate::response::FormResponse;

/// Title of the embed posted for every new response.
pub const NEW_RESPONSE_TITLE: &str = "📩 Nova Resposta Recebida!";

/// Both destination channels, resolved for the current cycle.
#[derive(Debug, Clone)]
pub struct ChannelHandles {
    pub primary: ChannelHandle,
    pub mention: ChannelHandle,
}

/// What happened to the optional mention message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MentionOutcome {
    Sent,
    /// No valid numeric user id in the response.
    Skipped,
    Failed,
}

/// Result of notifying one response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NotifyReport {
    pub primary_sent: bool,
    pub mention: MentionOutcome,
}

/// Render every field as `key: value`, one per line.
#[must_use]
pub fn format_summary(response: &FormResponse) -> String {
    response
        .fields()
        .map(|(key, value)| format!("{key}: {value}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// True for non-empty strings made only of ASCII digits.
#[must_use]
pub fn is_user_id(value: &str) -> bool {
    !value.is_empty() && value.bytes().all(|b| b.is_ascii_digit())
}

/// Render the pre-approval mention text.
#[must_use]
pub fn format_mention(template: &MentionTemplate, display_name: &str, user_id: &str) -> String {
    format!(
        "# <:{emoji}:{emoji_id}>  Paracomandos\n\n\
         || {display_name} // <@{user_id}> || \n\n\
         *Você está pré-aprovado para a Paracomandos!* \n\
         *Envie uma mensagem para <@{contact}> informando sua disponibilidade de data e horário para* \
         *agendarmos na melhor opção para você*.\n\n",
        emoji = template.emoji_name,
        emoji_id = template.emoji_id,
        contact = template.contact_id,
    )
}

/// Sends the summary and mention messages for each response.
pub struct Notifier {
    chat: Arc<dyn ChatChannel>,
    fields: FormFields,
    template: MentionTemplate,
}

impl Notifier {
    #[must_use]
    pub fn new(chat: Arc<dyn ChatChannel>, fields: FormFields, template: MentionTemplate) -> Self {
        Self {
            chat,
            fields,
            template,
        }
    }

    /// Embed listing every field of the response.
    #[must_use]
    pub fn primary_message(&self, response: &FormResponse) -> Message {
        Message::embed(
            Embed::new(NEW_RESPONSE_TITLE, format_summary(response)).with_timestamp(Utc::now()),
        )
    }

    /// Mention message, if the response carries a numeric user id.
    #[must_use]
    pub fn mention_message(&self, response: &FormResponse) -> Option<Message> {
        let user_id = response.get(&self.fields.discord_id).unwrap_or("").trim();
        if !is_user_id(user_id) {
            return None;
        }

        let display_name = response
            .get(&self.fields.display_name)
            .unwrap_or("")
            .trim();

        Some(Message::text(format_mention(
            &self.template,
            display_name,
            user_id,
        )))
    }

    /// Send both messages for one response. Failures are logged and
    /// reported, never returned.
    pub async fn notify(&self, response: &FormResponse, channels: &ChannelHandles) -> NotifyReport {
        let key = response.get(&self.fields.key_column).unwrap_or_default();

        let primary_sent = match self
            .chat
            .send(&channels.primary, &self.primary_message(response))
            .await
        {
            Ok(()) => {
                debug!(key = %key, channel_id = channels.primary.id, "Response forwarded");
                true
            }
            Err(e) => {
                error!(key = %key, error = %e, "Failed to forward response");
                false
            }
        };

        let mention = match self.mention_message(response) {
            None => MentionOutcome::Skipped,
            Some(message) => match self.chat.send(&channels.mention, &message).await {
                Ok(()) => {
                    let user_id = response.get(&self.fields.discord_id).unwrap_or("").trim();
                    info!(key = %key, user_id = %user_id, "Mention sent");
                    MentionOutcome::Sent
                }
                Err(e) => {
                    error!(key = %key, error = %e, "Failed to send mention");
                    MentionOutcome::Failed
                }
            },
        };

        NotifyReport {
            primary_sent,
            mention,
        }
    }
}
