//! Text-to-speech synthesis.

mod openai;

pub use openai::OpenAISpeech;

use crate::error::Result;
use async_trait::async_trait;

/// Trait for speech synthesis services.
///
/// Implementations return a complete WAV byte stream for the given text.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Synthesize `text` into WAV audio.
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>>;
}
