//! Prompt templates for Autocast.
//!
//! Prompts can be customized by placing TOML files in the custom prompts directory.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Collection of all prompt templates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Prompts {
    pub research: ResearchPrompts,
    pub script: ScriptPrompts,
    /// Custom variables from config, available in all prompts.
    #[serde(skip)]
    pub variables: std::collections::HashMap<String, String>,
}

/// Prompts for gathering research notes on a topic.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ResearchPrompts {
    pub system: String,
    pub user: String,
}

impl Default for ResearchPrompts {
    fn default() -> Self {
        Self {
            system: r#"You are a meticulous research assistant preparing background material for a documentary-style audio program.

Gather accurate, well-organized notes:
- Key facts, dates, people, and places
- Competing interpretations where historians or scientists disagree
- Surprising details and concrete anecdotes that work well when spoken aloud
- Clear distinctions between established fact and speculation

Write plain notes, not a script."#.to_string(),

            user: r#"Prepare detailed research notes on the following topic:

{{topic}}

Organize the notes by theme and include enough detail to support a narration of roughly thirty minutes."#.to_string(),
        }
    }
}

/// Prompts for writing the narration script.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScriptPrompts {
    pub system: String,
    pub user: String,
}

impl Default for ScriptPrompts {
    fn default() -> Self {
        Self {
            system: r#"You are the writer and sole narrator of a long-form educational podcast.

Write for the ear:
- Use natural, conversational sentences that read well aloud
- No headings, bullet points, stage directions, or markdown
- Separate paragraphs with a single blank line
- Open with a hook, close with a reflective ending
- Never mention that you are an AI or that the script was generated"#.to_string(),

            user: r#"Write the complete narration for today's episode ({{date}}).

Topic: {{topic}}

Research notes:
{{research}}

Produce only the narration text."#.to_string(),
        }
    }
}

impl Prompts {
    /// Load prompts from the default location, with optional custom directory and variables.
    pub fn load(
        custom_dir: Option<&str>,
        custom_variables: Option<&std::collections::HashMap<String, String>>,
    ) -> crate::error::Result<Self> {
        let mut prompts = Prompts::default();

        if let Some(vars) = custom_variables {
            prompts.variables = vars.clone();
        }

        if let Some(dir) = custom_dir {
            let custom_path = PathBuf::from(shellexpand::tilde(dir).to_string());

            let research_path = custom_path.join("research.toml");
            if research_path.exists() {
                let content = std::fs::read_to_string(&research_path)?;
                prompts.research = toml::from_str(&content)?;
            }

            let script_path = custom_path.join("script.toml");
            if script_path.exists() {
                let content = std::fs::read_to_string(&script_path)?;
                prompts.script = toml::from_str(&content)?;
            }
        }

        Ok(prompts)
    }

    /// Render a prompt template with the given variables.
    pub fn render(template: &str, vars: &std::collections::HashMap<String, String>) -> String {
        let mut result = template.to_string();
        for (key, value) in vars {
            result = result.replace(&format!("{{{{{}}}}}", key), value);
        }
        result
    }

    /// Render a prompt template with both provided variables and custom config variables.
    /// Provided variables take precedence over custom config variables.
    pub fn render_with_custom(
        &self,
        template: &str,
        vars: &std::collections::HashMap<String, String>,
    ) -> String {
        let mut merged = self.variables.clone();
        for (key, value) in vars {
            merged.insert(key.clone(), value.clone());
        }
        Self::render(template, &merged)
    }
}
