//! # OpenAI API client
//!
//! Thin wrapper around [async-openai] for chat completion and text-to-speech.
//! Provides token masking for safe logging and a simple request/response API.

use async_openai::types::{
    CreateChatCompletionRequestArgs, CreateSpeechRequestArgs, SpeechModel, SpeechResponseFormat,
    Voice,
};
use async_openai::Client;
use std::sync::Arc;

pub use async_openai::types::{
    ChatCompletionRequestAssistantMessageArgs, ChatCompletionRequestMessage,
    ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
};

/// Masks an API key/token for safe logging: shows first 7 chars + "***" + last 4 chars.
/// If length <= 11, returns "***" to avoid leaking any part of the key.
pub fn mask_token(token: &str) -> String {
    let len = token.len();
    if len <= 11 || !token.is_char_boundary(7) || !token.is_char_boundary(len - 4) {
        return "***".to_string();
    }
    format!("{}***{}", &token[..7], &token[len - 4..])
}

/// Maps a voice name (`alloy`, `echo`, `fable`, `onyx`, `nova`, `shimmer`) to the API enum.
pub fn parse_voice(name: &str) -> anyhow::Result<Voice> {
    match name.trim().to_ascii_lowercase().as_str() {
        "alloy" => Ok(Voice::Alloy),
        "echo" => Ok(Voice::Echo),
        "fable" => Ok(Voice::Fable),
        "onyx" => Ok(Voice::Onyx),
        "nova" => Ok(Voice::Nova),
        "shimmer" => Ok(Voice::Shimmer),
        other => anyhow::bail!("Unknown TTS voice: {}", other),
    }
}

/// Maps a TTS model name to the API enum; unknown names are passed through.
pub fn parse_speech_model(name: &str) -> SpeechModel {
    match name.trim() {
        "tts-1" => SpeechModel::Tts1,
        "tts-1-hd" => SpeechModel::Tts1Hd,
        other => SpeechModel::Other(other.to_string()),
    }
}

/// OpenAI client. Wraps async-openai client and keeps the API key for masked logging.
#[derive(Clone)]
pub struct OpenAIClient {
    /// Shared async-openai client used for all API calls.
    client: Arc<Client<async_openai::config::OpenAIConfig>>,
    /// API key stored only for logging (masked).
    api_key_for_logging: String,
}

impl OpenAIClient {
    /// Builds a client for the given API base URL (OpenAI, a compatible proxy, or a test server).
    pub fn with_base_url(api_key: String, base_url: String) -> Self {
        let api_key_for_logging = api_key.clone();
        let config = async_openai::config::OpenAIConfig::new()
            .with_api_key(api_key)
            .with_api_base(base_url);
        Self {
            client: Arc::new(Client::with_config(config)),
            api_key_for_logging,
        }
    }

    fn masked_key(&self) -> String {
        mask_token(&self.api_key_for_logging)
    }

    /// Sends a chat completion request and returns the assistant reply.
    ///
    /// `max_tokens` caps the reply length when set. Non-2xx responses, undecodable bodies, and
    /// responses without choices are errors.
    #[allow(deprecated)]
    pub async fn chat_completion(
        &self,
        model: &str,
        messages: Vec<ChatCompletionRequestMessage>,
        max_tokens: Option<u32>,
    ) -> anyhow::Result<String> {
        tracing::info!(
            model = %model,
            message_count = messages.len(),
            max_tokens = ?max_tokens,
            api_key = %self.masked_key(),
            "OpenAI chat_completion request"
        );

        let mut args = CreateChatCompletionRequestArgs::default();
        args.model(model).messages(messages);
        if let Some(max) = max_tokens {
            args.max_tokens(max);
        }
        let request = args.build()?;

        if let Ok(json) = serde_json::to_string(&request) {
            tracing::debug!(request_json = %json, "OpenAI chat_completion request JSON");
        }

        let response = self.client.chat().create(request).await?;

        if let Some(ref u) = response.usage {
            tracing::info!(
                prompt_tokens = u.prompt_tokens,
                completion_tokens = u.completion_tokens,
                total_tokens = u.total_tokens,
                "OpenAI chat_completion usage"
            );
        }

        match response.choices.first() {
            Some(choice) => Ok(choice.message.content.clone().unwrap_or_default()),
            None => anyhow::bail!("No response from OpenAI"),
        }
    }

    /// Synthesizes `input` as Ogg/Opus audio (suitable for a Telegram voice message).
    pub async fn speech(
        &self,
        model: SpeechModel,
        voice: Voice,
        input: &str,
    ) -> anyhow::Result<Vec<u8>> {
        tracing::info!(
            input_len = input.len(),
            api_key = %self.masked_key(),
            "OpenAI speech request"
        );

        let request = CreateSpeechRequestArgs::default()
            .model(model)
            .voice(voice)
            .input(input)
            .response_format(SpeechResponseFormat::Opus)
            .build()?;

        let response = self.client.audio().speech(request).await?;
        let audio = response.bytes.to_vec();
        if audio.is_empty() {
            anyhow::bail!("Empty audio from OpenAI speech");
        }

        tracing::info!(audio_bytes = audio.len(), "OpenAI speech response");
        Ok(audio)
    }
}
