//! OpenAI text-to-speech implementation of [`SpeechSynthesizer`].

use anyhow::Result;
use async_trait::async_trait;
use tracing::instrument;

use super::SpeechSynthesizer;

pub const DEFAULT_TTS_MODEL: &str = "tts-1";
pub const DEFAULT_TTS_VOICE: &str = "alloy";

#[derive(Clone)]
pub struct OpenAISpeechSynthesizer {
    client: openai_client::OpenAIClient,
    model: String,
    voice: String,
}

impl OpenAISpeechSynthesizer {
    /// Builds a synthesizer; fails if `voice` is not a known OpenAI voice.
    pub fn with_base_url(
        api_key: String,
        base_url: String,
        model: String,
        voice: String,
    ) -> Result<Self> {
        openai_client::parse_voice(&voice)?;
        Ok(Self {
            client: openai_client::OpenAIClient::with_base_url(api_key, base_url),
            model,
            voice,
        })
    }
}

#[async_trait]
impl SpeechSynthesizer for OpenAISpeechSynthesizer {
    #[instrument(skip(self, text), fields(model = %self.model, voice = %self.voice))]
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>> {
        let voice = openai_client::parse_voice(&self.voice)?;
        let model = openai_client::parse_speech_model(&self.model);
        self.client.speech(model, voice, text).await
    }
}
