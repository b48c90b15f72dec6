//! Conversions from teloxide types to the transport-agnostic core types.

use tutor_core::{Chat, Message, MessageDirection, ToCoreMessage, ToCoreUser, User};

/// Telegram user to core [`User`].
pub struct TelegramUserWrapper<'a>(pub &'a teloxide::types::User);

impl<'a> ToCoreUser for TelegramUserWrapper<'a> {
    fn to_core(&self) -> User {
        User {
            id: self.0.id.0 as i64,
            username: self.0.username.clone(),
            first_name: Some(self.0.first_name.clone()),
            last_name: self.0.last_name.clone(),
        }
    }
}

/// Telegram message to core [`Message`]. Non-text messages get empty content.
pub struct TelegramMessageWrapper<'a>(pub &'a teloxide::types::Message);

impl<'a> ToCoreMessage for TelegramMessageWrapper<'a> {
    fn to_core(&self) -> Message {
        let user = self
            .0
            .from
            .as_ref()
            .map(|u| TelegramUserWrapper(u).to_core())
            .unwrap_or(User {
                id: self.0.chat.id.0,
                username: None,
                first_name: None,
                last_name: None,
            });
        let message_type = if self.0.text().is_some() { "text" } else { "other" };

        Message {
            id: self.0.id.to_string(),
            user,
            chat: Chat {
                id: self.0.chat.id.0,
                chat_type: if self.0.chat.is_private() {
                    "private".to_string()
                } else {
                    "group".to_string()
                },
            },
            content: self.0.text().unwrap_or("").to_string(),
            message_type: message_type.to_string(),
            direction: MessageDirection::Incoming,
            created_at: self.0.date,
        }
    }
}
