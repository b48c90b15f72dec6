//! Wraps teloxide::Bot and implements [`tutor_core::Bot`]. Tests substitute a recording mock.

use async_trait::async_trait;
use teloxide::{prelude::*, types::ChatId, types::InputFile};
use tutor_core::{Bot as CoreBot, Chat, Result, TutorError};

/// File name attached to synthesized voice clips.
const VOICE_FILE_NAME: &str = "speech.ogg";

/// Thin wrapper around teloxide::Bot that implements core's Bot trait.
#[derive(Clone)]
pub struct TelegramBotAdapter {
    bot: teloxide::Bot,
}

impl TelegramBotAdapter {
    pub fn new(bot: teloxide::Bot) -> Self {
        Self { bot }
    }
}

#[async_trait]
impl CoreBot for TelegramBotAdapter {
    async fn send_message(&self, chat: &Chat, text: &str) -> Result<()> {
        self.bot
            .send_message(ChatId(chat.id), text.to_string())
            .await
            .map_err(|e| TutorError::Bot(e.to_string()))?;
        Ok(())
    }

    async fn send_voice(&self, chat: &Chat, audio: Vec<u8>) -> Result<()> {
        let voice = InputFile::memory(audio).file_name(VOICE_FILE_NAME);
        self.bot
            .send_voice(ChatId(chat.id), voice)
            .await
            .map_err(|e| TutorError::Bot(e.to_string()))?;
        Ok(())
    }
}
