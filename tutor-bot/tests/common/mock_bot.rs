//! Mock implementation of [`tutor_core::Bot`] that records everything sent.

use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use tutor_core::{Bot, Chat, Result};

/// One recorded outbound message.
#[derive(Debug, Clone, PartialEq)]
pub enum Sent {
    Text { chat_id: i64, text: String },
    Voice { chat_id: i64, audio: Vec<u8> },
}

#[derive(Default)]
pub struct MockBot {
    sent: Mutex<Vec<Sent>>,
}

impl MockBot {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn sent(&self) -> Vec<Sent> {
        self.sent.lock().unwrap().clone()
    }

    /// Text messages in send order.
    pub fn texts(&self) -> Vec<String> {
        self.sent()
            .into_iter()
            .filter_map(|s| match s {
                Sent::Text { text, .. } => Some(text),
                Sent::Voice { .. } => None,
            })
            .collect()
    }

    pub fn voices(&self) -> Vec<Vec<u8>> {
        self.sent()
            .into_iter()
            .filter_map(|s| match s {
                Sent::Voice { audio, .. } => Some(audio),
                Sent::Text { .. } => None,
            })
            .collect()
    }
}

#[async_trait]
impl Bot for MockBot {
    async fn send_message(&self, chat: &Chat, text: &str) -> Result<()> {
        self.sent.lock().unwrap().push(Sent::Text {
            chat_id: chat.id,
            text: text.to_string(),
        });
        Ok(())
    }

    async fn send_voice(&self, chat: &Chat, audio: Vec<u8>) -> Result<()> {
        self.sent.lock().unwrap().push(Sent::Voice {
            chat_id: chat.id,
            audio,
        });
        Ok(())
    }
}
