//! Configuration settings for Autocast.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub publish: PublishSettings,
    pub channel: ChannelSettings,
    pub generation: GenerationSettings,
    pub speech: SpeechSettings,
    pub chunking: ChunkingSettings,
    pub audio: AudioSettings,
    pub topics: TopicSettings,
    pub prompts: PromptSettings,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Directory for storing application state (used topics, etc.).
    pub data_dir: String,
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            data_dir: "~/.autocast".to_string(),
            log_level: "info".to_string(),
        }
    }
}

/// Where episodes and the feed are published.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PublishSettings {
    /// Public base URL of the site hosting the feed and audio files.
    pub base_url: String,
    /// Local directory mirrored to `base_url`.
    pub site_dir: String,
    /// Feed file name inside `site_dir`.
    pub feed_file: String,
    /// Episode audio directory inside `site_dir`.
    pub episodes_subdir: String,
}

impl Default for PublishSettings {
    fn default() -> Self {
        Self {
            base_url: "https://example.com".to_string(),
            site_dir: "~/.autocast/site".to_string(),
            feed_file: "feed.xml".to_string(),
            episodes_subdir: "episodes".to_string(),
        }
    }
}

/// Channel-level metadata, used only when creating a new feed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChannelSettings {
    pub title: String,
    pub description: String,
    pub link: String,
    pub language: String,
    pub author: String,
    /// Cover art URL (itunes:image).
    pub image_url: Option<String>,
    pub category: String,
    pub explicit: bool,
}

impl Default for ChannelSettings {
    fn default() -> Self {
        Self {
            title: "Autocast".to_string(),
            description: "A daily deep dive into a new subject, researched and narrated automatically.".to_string(),
            link: "https://example.com".to_string(),
            language: "en-us".to_string(),
            author: "Autocast".to_string(),
            image_url: None,
            category: "Education".to_string(),
            explicit: false,
        }
    }
}

/// Text generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationSettings {
    /// Chat model used for research notes and script writing.
    pub chat_model: String,
    /// Sampling temperature for the script.
    pub temperature: f32,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            chat_model: "gpt-4o".to_string(),
            temperature: 0.8,
        }
    }
}

/// Speech synthesis settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeechSettings {
    /// Text-to-speech model.
    pub tts_model: String,
    /// Synthesis voice id.
    pub voice: String,
    /// Maximum concurrent synthesis calls (1 = sequential).
    pub max_concurrent: usize,
}

impl Default for SpeechSettings {
    fn default() -> Self {
        Self {
            tts_model: "tts-1-hd".to_string(),
            voice: "onyx".to_string(),
            max_concurrent: 1,
        }
    }
}

/// Script chunking settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingSettings {
    /// Maximum chunk length in characters. Kept below the 4096-character
    /// limit of the speech endpoint.
    pub max_chunk_len: usize,
}

impl Default for ChunkingSettings {
    fn default() -> Self {
        Self { max_chunk_len: 4000 }
    }
}

/// Audio assembly and encoding settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioSettings {
    /// Silence appended after every synthesized chunk, in milliseconds.
    pub silence_gap_ms: u64,
    /// LAME VBR quality (0 = best, 9 = smallest).
    pub mp3_quality: u8,
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            silence_gap_ms: 200,
            mp3_quality: 2,
        }
    }
}

/// Topic pool settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TopicSettings {
    /// Optional pool file (one topic per line). Uses the built-in pool if unset.
    pub pool_file: Option<String>,
    /// Used-topic index file.
    pub used_file: String,
}

impl Default for TopicSettings {
    fn default() -> Self {
        Self {
            pool_file: None,
            used_file: "~/.autocast/used_topics.json".to_string(),
        }
    }
}

/// Prompt customization settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct PromptSettings {
    /// Directory for custom prompts (overrides defaults).
    pub custom_dir: Option<String>,
    /// Custom variables available in all prompts as {{variable_name}}.
    pub variables: std::collections::HashMap<String, String>,
}

impl Settings {
    /// Load settings from the default configuration file.
    pub fn load() -> crate::error::Result<Self> {
        Self::load_from(None)
    }

    /// Load settings from a specific path, or default location if None.
    pub fn load_from(path: Option<&PathBuf>) -> crate::error::Result<Self> {
        let config_path = match path {
            Some(p) => p.clone(),
            None => Self::default_config_path(),
        };

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let settings: Settings = toml::from_str(&content)?;
            Ok(settings)
        } else {
            Ok(Settings::default())
        }
    }

    /// Save settings to the default configuration file.
    pub fn save(&self) -> crate::error::Result<()> {
        self.save_to(&Self::default_config_path())
    }

    /// Save settings to a specific path.
    pub fn save_to(&self, path: &PathBuf) -> crate::error::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| crate::error::AutocastError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("autocast")
            .join("config.toml")
    }

    /// Expand shell variables in paths (e.g., ~).
    pub fn expand_path(path: &str) -> PathBuf {
        PathBuf::from(shellexpand::tilde(path).to_string())
    }

    /// Get the expanded data directory path.
    pub fn data_dir(&self) -> PathBuf {
        Self::expand_path(&self.general.data_dir)
    }

    /// Get the expanded site directory path.
    pub fn site_dir(&self) -> PathBuf {
        Self::expand_path(&self.publish.site_dir)
    }

    /// Path of the published feed document.
    pub fn feed_path(&self) -> PathBuf {
        self.site_dir().join(&self.publish.feed_file)
    }

    /// Directory episode audio files are written to.
    pub fn episodes_dir(&self) -> PathBuf {
        self.site_dir().join(&self.publish.episodes_subdir)
    }

    /// Get the expanded used-topics file path.
    pub fn used_topics_path(&self) -> PathBuf {
        Self::expand_path(&self.topics.used_file)
    }

    /// Get the expanded topic pool file path, if one is configured.
    pub fn topic_pool_path(&self) -> Option<PathBuf> {
        self.topics.pool_file.as_deref().map(Self::expand_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.audio.silence_gap_ms, 200);
        assert!(settings.chunking.max_chunk_len < 4096);
        assert!(settings.feed_path().ends_with("feed.xml"));
        assert!(settings.episodes_dir().ends_with("episodes"));
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let settings: Settings = toml::from_str(
            r#"
            [publish]
            base_url = "https://pod.example.org"

            [speech]
            voice = "nova"
            "#,
        )
        .unwrap();

        assert_eq!(settings.publish.base_url, "https://pod.example.org");
        assert_eq!(settings.publish.feed_file, "feed.xml");
        assert_eq!(settings.speech.voice, "nova");
        assert_eq!(settings.speech.tts_model, "tts-1-hd");
        assert_eq!(settings.chunking.max_chunk_len, 4000);
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut settings = Settings::default();
        settings.audio.silence_gap_ms = 350;
        settings.save_to(&path).unwrap();

        let loaded = Settings::load_from(Some(&path)).unwrap();
        assert_eq!(loaded.audio.silence_gap_ms, 350);
    }
}
