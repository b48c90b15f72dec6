//! Bot abstraction for sending replies.
//!
//! [`Bot`] is transport-agnostic; tutor-bot implements it over teloxide and tests substitute a mock.

use crate::error::Result;
use crate::types::{Chat, Message};
use async_trait::async_trait;

/// Abstraction for sending messages. Implementations map to a transport (e.g. Telegram).
#[async_trait]
pub trait Bot: Send + Sync {
    /// Sends a text message to the given chat.
    async fn send_message(&self, chat: &Chat, text: &str) -> Result<()>;

    /// Sends a reply to the given message (same chat).
    async fn reply_to(&self, message: &Message, text: &str) -> Result<()> {
        self.send_message(&message.chat, text).await
    }

    /// Sends an encoded audio clip (Ogg/Opus) as a voice message.
    async fn send_voice(&self, chat: &Chat, audio: Vec<u8>) -> Result<()>;
}
