//! OpenAI chat completion implementation.

use super::TextGenerator;
use crate::error::{AutocastError, Result};
use crate::openai::{create_client, OpenAIClient};
use async_openai::types::{
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
    ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
};
use async_trait::async_trait;
use tracing::{debug, instrument};

/// Chat-completion based text generator.
pub struct OpenAIChat {
    client: OpenAIClient,
    model: String,
    temperature: f32,
}

impl OpenAIChat {
    pub fn new(model: &str) -> Result<Self> {
        Self::with_config(model, 0.8)
    }

    pub fn with_config(model: &str, temperature: f32) -> Result<Self> {
        Ok(Self {
            client: create_client()?,
            model: model.to_string(),
            temperature,
        })
    }
}

#[async_trait]
impl TextGenerator for OpenAIChat {
    #[instrument(skip(self, system, user), fields(model = %self.model))]
    async fn generate(&self, system: &str, user: &str) -> Result<String> {
        let messages: Vec<ChatCompletionRequestMessage> = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(system)
                .build()
                .map_err(|e| AutocastError::RemoteService(e.to_string()))?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(user)
                .build()
                .map_err(|e| AutocastError::RemoteService(e.to_string()))?
                .into(),
        ];

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .temperature(self.temperature)
            .build()
            .map_err(|e| AutocastError::RemoteService(e.to_string()))?;

        let response = self.client.chat().create(request).await.map_err(|e| {
            AutocastError::RemoteService(format!("Chat completion failed: {}", e))
        })?;

        let text = response
            .choices
            .first()
            .and_then(|c| c.message.content.as_ref())
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| AutocastError::RemoteService("Empty response from LLM".to_string()))?
            .clone();

        debug!("Generated {} characters", text.len());
        Ok(text)
    }
}
