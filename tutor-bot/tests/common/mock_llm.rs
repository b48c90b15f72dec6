//! Scripted [`llm_client::LlmClient`] and [`llm_client::SpeechSynthesizer`] mocks.

use async_trait::async_trait;
use llm_client::{LlmClient, SpeechSynthesizer};
use prompt::{ChatMessage, MessageRole};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

enum Mode {
    /// Replies "Reply to: {last user message}".
    Echo,
    /// Pops scripted replies; echoes once they run out.
    Scripted(Mutex<VecDeque<String>>),
    Failing,
}

/// Records every message list it receives.
pub struct MockLlmClient {
    mode: Mode,
    calls: Mutex<Vec<Vec<ChatMessage>>>,
}

impl MockLlmClient {
    fn with_mode(mode: Mode) -> Arc<Self> {
        Arc::new(Self {
            mode,
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn echo() -> Arc<Self> {
        Self::with_mode(Mode::Echo)
    }

    pub fn replying(replies: &[&str]) -> Arc<Self> {
        Self::with_mode(Mode::Scripted(Mutex::new(
            replies.iter().map(|r| r.to_string()).collect(),
        )))
    }

    pub fn failing() -> Arc<Self> {
        Self::with_mode(Mode::Failing)
    }

    pub fn calls(&self) -> Vec<Vec<ChatMessage>> {
        self.calls.lock().unwrap().clone()
    }
}

fn echo_reply(messages: &[ChatMessage]) -> String {
    let last = messages
        .iter()
        .rev()
        .find(|m| m.role == MessageRole::User)
        .map(|m| m.content.as_str())
        .unwrap_or_default();
    format!("Reply to: {}", last)
}

#[async_trait]
impl LlmClient for MockLlmClient {
    async fn get_llm_response_with_messages(
        &self,
        messages: Vec<ChatMessage>,
    ) -> anyhow::Result<String> {
        self.calls.lock().unwrap().push(messages.clone());
        match &self.mode {
            Mode::Echo => Ok(echo_reply(&messages)),
            Mode::Scripted(replies) => Ok(replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| echo_reply(&messages))),
            Mode::Failing => anyhow::bail!("OpenAI API error: 401 Unauthorized"),
        }
    }
}

/// Returns the UTF-8 bytes of the text as "audio".
#[derive(Default)]
pub struct MockSpeech {
    inputs: Mutex<Vec<String>>,
}

impl MockSpeech {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn inputs(&self) -> Vec<String> {
        self.inputs.lock().unwrap().clone()
    }
}

#[async_trait]
impl SpeechSynthesizer for MockSpeech {
    async fn synthesize(&self, text: &str) -> anyhow::Result<Vec<u8>> {
        self.inputs.lock().unwrap().push(text.to_string());
        Ok(text.as_bytes().to_vec())
    }
}
