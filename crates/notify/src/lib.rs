//! Chat delivery for form relay notifications.
//!
//! This crate wraps the Discord REST API behind the [`ChatChannel`] trait so
//! the relay loop can resolve channels and post messages without knowing
//! which backend it talks to.
//!
//! # Usage
//!
//! ```no_run
//! use form_notify::{ChatChannel, DiscordBot, Embed, Message};
//!
//! # async fn run() -> Result<(), form_notify::ChannelError> {
//! let bot = DiscordBot::new("bot-token")?;
//! let channel = bot.resolve(1_234_567_890).await?;
//! bot.send(&channel, &Message::embed(Embed::new("Title", "key: value")))
//!     .await?;
//! # Ok(())
//! # }
//! ```

#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod channels;
pub mod error;
pub mod message;

pub use channels::discord::{BotUser, DiscordBot};
pub use channels::{ChannelHandle, ChatChannel};
pub use error::ChannelError;
pub use message::{Embed, Message};
