//! Research and script generation.

mod openai;
mod writer;

pub use openai::OpenAIChat;
pub use writer::{EpisodeScript, ScriptWriter};

use crate::error::Result;
use async_trait::async_trait;

/// Trait for language-model text generation.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generate a completion for a system prompt and a user prompt.
    async fn generate(&self, system: &str, user: &str) -> Result<String>;
}
