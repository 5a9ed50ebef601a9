//! Configuration module for Autocast.
//!
//! Handles loading and managing application settings and prompt templates.

mod prompts;
mod settings;

pub use prompts::{Prompts, ResearchPrompts, ScriptPrompts};
pub use settings::{
    AudioSettings, ChannelSettings, ChunkingSettings, GeneralSettings, GenerationSettings,
    PromptSettings, PublishSettings, Settings, SpeechSettings, TopicSettings,
};
