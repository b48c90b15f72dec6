//! # LLM client abstraction
//!
//! Defines the [`LlmClient`] and [`SpeechSynthesizer`] traits and their OpenAI implementations.
//! Transport-agnostic; handlers hold `Arc<dyn LlmClient>` / `Arc<dyn SpeechSynthesizer>` so tests
//! can substitute mocks.

use anyhow::Result;
use async_trait::async_trait;
use openai_client::{
    ChatCompletionRequestAssistantMessageArgs, ChatCompletionRequestMessage,
    ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
};
use prompt::{ChatMessage, MessageRole};

mod openai_llm;
mod openai_speech;

pub use openai_llm::{OpenAILlmClient, DEFAULT_MAX_TOKENS, DEFAULT_MODEL};
pub use openai_speech::{OpenAISpeechSynthesizer, DEFAULT_TTS_MODEL, DEFAULT_TTS_VOICE};

/// Completion service: one generated reply for an ordered list of messages.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Returns the model reply text for the given messages, sent as-is and in order.
    async fn get_llm_response_with_messages(&self, messages: Vec<ChatMessage>) -> Result<String>;
}

/// Text-to-speech service producing a voice clip.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Returns encoded audio (Ogg/Opus) for `text`.
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>>;
}

/// Converts a single [`ChatMessage`] into OpenAI API message format.
fn chat_message_to_openai(msg: &ChatMessage) -> Result<ChatCompletionRequestMessage> {
    let content = msg.content.clone();
    let openai_msg: ChatCompletionRequestMessage = match msg.role {
        MessageRole::System => ChatCompletionRequestSystemMessageArgs::default()
            .content(content)
            .build()?
            .into(),
        MessageRole::User => ChatCompletionRequestUserMessageArgs::default()
            .content(content)
            .build()?
            .into(),
        MessageRole::Assistant => ChatCompletionRequestAssistantMessageArgs::default()
            .content(content)
            .build()?
            .into(),
    };
    Ok(openai_msg)
}
