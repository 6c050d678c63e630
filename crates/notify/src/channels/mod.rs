//! Chat channel implementations.

pub mod discord;

use async_trait::async_trait;

use crate::error::ChannelError;
use crate::message::Message;

/// A channel that has been looked up and is known to exist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelHandle {
    pub id: u64,
    pub name: Option<String>,
}

/// Trait for chat backends (Discord, etc.).
#[async_trait]
pub trait ChatChannel: Send + Sync {
    /// Get the name of this backend.
    fn name(&self) -> &'static str;

    /// Look up a channel by id.
    async fn resolve(&self, channel_id: u64) -> Result<ChannelHandle, ChannelError>;

    /// Post a message into a resolved channel.
    async fn send(&self, channel: &ChannelHandle, message: &Message) -> Result<(), ChannelError>;
}
