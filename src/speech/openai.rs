//! OpenAI text-to-speech implementation.

use super::SpeechSynthesizer;
use crate::error::{AutocastError, Result};
use crate::openai::{create_client, OpenAIClient};
use async_openai::types::{CreateSpeechRequestArgs, SpeechModel, SpeechResponseFormat, Voice};
use async_trait::async_trait;
use tracing::{debug, instrument};

/// OpenAI speech endpoint client.
pub struct OpenAISpeech {
    client: OpenAIClient,
    model: SpeechModel,
    voice: Voice,
}

impl OpenAISpeech {
    /// Create a synthesizer with the default model and voice.
    pub fn new() -> Result<Self> {
        Self::with_config("tts-1-hd", "onyx")
    }

    /// Create a synthesizer for a specific model and voice.
    pub fn with_config(model: &str, voice: &str) -> Result<Self> {
        let voice = parse_voice(voice)?;
        Ok(Self {
            client: create_client()?,
            model: parse_model(model),
            voice,
        })
    }
}

#[async_trait]
impl SpeechSynthesizer for OpenAISpeech {
    #[instrument(skip(self, text), fields(chars = text.chars().count()))]
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>> {
        let request = CreateSpeechRequestArgs::default()
            .input(text)
            .model(self.model.clone())
            .voice(self.voice.clone())
            .response_format(SpeechResponseFormat::Wav)
            .build()
            .map_err(|e| AutocastError::RemoteService(format!("Failed to build speech request: {}", e)))?;

        let response = self.client.audio().speech(request).await.map_err(|e| {
            AutocastError::RemoteService(format!("Speech API error: {}", e))
        })?;

        debug!("Received {} bytes of audio", response.bytes.len());
        Ok(response.bytes.to_vec())
    }
}

fn parse_model(model: &str) -> SpeechModel {
    match model {
        "tts-1" => SpeechModel::Tts1,
        "tts-1-hd" => SpeechModel::Tts1Hd,
        other => SpeechModel::Other(other.to_string()),
    }
}

fn parse_voice(voice: &str) -> Result<Voice> {
    match voice.to_lowercase().as_str() {
        "alloy" => Ok(Voice::Alloy),
        "echo" => Ok(Voice::Echo),
        "fable" => Ok(Voice::Fable),
        "onyx" => Ok(Voice::Onyx),
        "nova" => Ok(Voice::Nova),
        "shimmer" => Ok(Voice::Shimmer),
        other => Err(AutocastError::Config(format!(
            "Unknown speech.voice '{}'; expected one of alloy, echo, fable, onyx, nova, shimmer",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_voice_case_insensitive() {
        assert!(matches!(parse_voice("Nova"), Ok(Voice::Nova)));
        assert!(matches!(parse_voice("shimmer"), Ok(Voice::Shimmer)));
    }

    #[test]
    fn test_unknown_voice_is_config_error() {
        assert!(matches!(parse_voice("onxy"), Err(AutocastError::Config(_))));
        assert!(matches!(
            OpenAISpeech::with_config("tts-1", "unheard-of"),
            Err(AutocastError::Config(_))
        ));
    }

    #[test]
    fn test_parse_model() {
        assert!(matches!(parse_model("tts-1"), SpeechModel::Tts1));
        assert!(matches!(parse_model("gpt-4o-mini-tts"), SpeechModel::Other(ref m) if m == "gpt-4o-mini-tts"));
    }
}
