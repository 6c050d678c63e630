//! Configuration for the form relay.
//!
//! Everything is read from the environment (with matching command-line
//! flags) through clap. Only the Discord token is mandatory; missing Google
//! credentials leave the relay running with spreadsheet access disabled, and
//! missing channel ids make every cycle stop at the channel check.

use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use form_sheets::{ServiceAccountAuth, ServiceAccountKey, SheetsClient, SheetsError};

/// Default poll period.
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 5;

/// Header of the column that uniquely identifies a submission.
pub const DEFAULT_KEY_COLUMN: &str = "Carimbo de data/hora";

/// Header of the column holding the submitter's Discord user id.
pub const DEFAULT_DISCORD_ID_FIELD: &str = "ID do Discord";

/// Header of the column holding the submitter's in-character name.
pub const DEFAULT_NAME_FIELD: &str = "Nome no IC";

/// User the mention message points applicants to for scheduling.
pub const DEFAULT_CONTACT_ID: u64 = 963_524_916_987_183_134;

/// Custom emoji shown at the top of the mention message.
pub const DEFAULT_EMOJI_ID: u64 = 1_132_713_845_559_922_728;

/// Name of that custom emoji.
pub const DEFAULT_EMOJI_NAME: &str = "PARASAR";

/// Data cells cleared after each pass; row 1 holds the headers.
pub const CLEAR_CELLS: &str = "A2:Z";

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Form relay - forwards new form responses from Google Sheets to Discord.
#[derive(Debug, Parser)]
#[command(name = "form-relay")]
#[command(about = "Forward new Google Forms responses to Discord")]
#[command(version)]
pub struct RelayArgs {
    /// Discord bot token
    #[arg(long, env = "DISCORD_BOT_TOKEN", hide_env_values = true)]
    pub discord_token: String,

    /// Service account private key (PEM, `\n` escapes allowed)
    #[arg(long, env = "GOOGLE_PRIVATE_KEY", hide_env_values = true)]
    pub google_private_key: Option<String>,

    /// Service account client email
    #[arg(long, env = "GOOGLE_CLIENT_EMAIL")]
    pub google_client_email: Option<String>,

    /// Service account client id
    #[arg(long, env = "GOOGLE_CLIENT_ID")]
    pub google_client_id: Option<String>,

    /// Channel that receives every new response
    #[arg(long, env = "CHANNEL_ID")]
    pub channel_id: Option<u64>,

    /// Channel that receives pre-approval mentions
    #[arg(long, env = "MENTION_CHANNEL_ID")]
    pub mention_channel_id: Option<u64>,

    /// Spreadsheet backing the form
    #[arg(long, env = "SPREADSHEET_ID")]
    pub spreadsheet_id: Option<String>,

    /// Seconds between checks
    #[arg(
        long,
        env = "POLL_INTERVAL_SECS",
        default_value_t = DEFAULT_POLL_INTERVAL_SECS,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub poll_interval_secs: u64,

    /// Header of the unique key column
    #[arg(long, env = "FORM_KEY_COLUMN", default_value = DEFAULT_KEY_COLUMN)]
    pub key_column: String,

    /// Header of the Discord user id column
    #[arg(long, env = "FORM_DISCORD_ID_FIELD", default_value = DEFAULT_DISCORD_ID_FIELD)]
    pub discord_id_field: String,

    /// Header of the display name column
    #[arg(long, env = "FORM_NAME_FIELD", default_value = DEFAULT_NAME_FIELD)]
    pub name_field: String,

    /// User to contact for scheduling
    #[arg(long, env = "MENTION_CONTACT_ID", default_value_t = DEFAULT_CONTACT_ID)]
    pub contact_id: u64,

    /// Custom emoji id for the mention heading
    #[arg(long, env = "MENTION_EMOJI_ID", default_value_t = DEFAULT_EMOJI_ID)]
    pub emoji_id: u64,

    /// Log output format
    #[arg(long, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,

    /// Run a single check and exit
    #[arg(long)]
    pub once: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

/// Column names looked up in each response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormFields {
    pub key_column: String,
    pub discord_id: String,
    pub display_name: String,
}

impl Default for FormFields {
    fn default() -> Self {
        Self {
            key_column: DEFAULT_KEY_COLUMN.to_string(),
            discord_id: DEFAULT_DISCORD_ID_FIELD.to_string(),
            display_name: DEFAULT_NAME_FIELD.to_string(),
        }
    }
}

/// Fixed parts of the pre-approval mention.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MentionTemplate {
    pub emoji_name: String,
    pub emoji_id: u64,
    pub contact_id: u64,
}

impl Default for MentionTemplate {
    fn default() -> Self {
        Self {
            emoji_name: DEFAULT_EMOJI_NAME.to_string(),
            emoji_id: DEFAULT_EMOJI_ID,
            contact_id: DEFAULT_CONTACT_ID,
        }
    }
}

/// Runtime settings for the relay loop.
#[derive(Debug, Clone)]
pub struct RelaySettings {
    pub poll_interval: Duration,
    pub channel_id: Option<u64>,
    pub mention_channel_id: Option<u64>,
    pub fields: FormFields,
    pub mention: MentionTemplate,
}

impl Default for RelaySettings {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(DEFAULT_POLL_INTERVAL_SECS),
            channel_id: None,
            mention_channel_id: None,
            fields: FormFields::default(),
            mention: MentionTemplate::default(),
        }
    }
}

impl RelayArgs {
    /// Loop settings derived from the arguments. A channel id of 0 counts as
    /// unset.
    #[must_use]
    pub fn settings(&self) -> RelaySettings {
        RelaySettings {
            poll_interval: Duration::from_secs(self.poll_interval_secs),
            channel_id: self.channel_id.filter(|id| *id != 0),
            mention_channel_id: self.mention_channel_id.filter(|id| *id != 0),
            fields: FormFields {
                key_column: self.key_column.clone(),
                discord_id: self.discord_id_field.clone(),
                display_name: self.name_field.clone(),
            },
            mention: MentionTemplate {
                emoji_name: DEFAULT_EMOJI_NAME.to_string(),
                emoji_id: self.emoji_id,
                contact_id: self.contact_id,
            },
        }
    }

    /// Service account key from the credential arguments.
    pub fn service_account_key(&self) -> Result<ServiceAccountKey, SheetsError> {
        let private_key = non_empty(self.google_private_key.as_deref())
            .ok_or_else(|| SheetsError::Credentials("GOOGLE_PRIVATE_KEY not set".to_string()))?;
        let client_email = non_empty(self.google_client_email.as_deref())
            .ok_or_else(|| SheetsError::Credentials("GOOGLE_CLIENT_EMAIL not set".to_string()))?;

        Ok(ServiceAccountKey::new(
            private_key,
            client_email,
            self.google_client_id.clone(),
        ))
    }

    /// Build an authenticated Sheets client for the configured spreadsheet.
    pub fn connect_sheets(&self) -> Result<SheetsClient, SheetsError> {
        let spreadsheet_id = non_empty(self.spreadsheet_id.as_deref())
            .ok_or_else(|| SheetsError::Credentials("SPREADSHEET_ID not set".to_string()))?;
        let auth = ServiceAccountAuth::new(self.service_account_key()?)?;
        SheetsClient::new(spreadsheet_id, Arc::new(auth))
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
