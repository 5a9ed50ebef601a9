//! Two-step script writing: research notes, then narration.

use super::TextGenerator;
use crate::config::Prompts;
use crate::error::{AutocastError, Result};
use chrono::NaiveDate;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, instrument};

/// Output of the writing step.
#[derive(Debug, Clone)]
pub struct EpisodeScript {
    /// Background notes. Never published.
    pub research: String,
    /// Narration text, paragraphs separated by blank lines.
    pub script: String,
}

/// Produces an episode script for a topic.
pub struct ScriptWriter {
    generator: Arc<dyn TextGenerator>,
    prompts: Prompts,
}

impl ScriptWriter {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self {
            generator,
            prompts: Prompts::default(),
        }
    }

    /// Set custom prompts (with user-defined variables).
    pub fn with_prompts(mut self, prompts: Prompts) -> Self {
        self.prompts = prompts;
        self
    }

    /// Research `topic` and write the narration for `date`.
    #[instrument(skip(self), fields(topic = %topic))]
    pub async fn write(&self, topic: &str, date: NaiveDate) -> Result<EpisodeScript> {
        let mut vars = HashMap::new();
        vars.insert("topic".to_string(), topic.to_string());
        vars.insert("date".to_string(), date.format("%B %-d, %Y").to_string());

        info!("Researching topic");
        let research_prompt = self.prompts.render_with_custom(&self.prompts.research.user, &vars);
        let research = self
            .generator
            .generate(&self.prompts.research.system, &research_prompt)
            .await?;

        vars.insert("research".to_string(), research.clone());

        info!("Writing script");
        let script_prompt = self.prompts.render_with_custom(&self.prompts.script.user, &vars);
        let script = self
            .generator
            .generate(&self.prompts.script.system, &script_prompt)
            .await?;

        let script = script.trim().to_string();
        if script.is_empty() {
            return Err(AutocastError::RemoteService("Script generation returned no text".to_string()));
        }

        info!("Script written ({} characters)", script.chars().count());
        Ok(EpisodeScript { research, script })
    }
}
