//! Run-once pipeline for Autocast.
//!
//! Coordinates one episode from topic selection to feed publication. The
//! feed is written last, so a run that fails anywhere earlier leaves it
//! untouched; at worst a topic is spent or an orphan audio file remains.

use crate::audio::{AudioAssembler, AudioEncoder, Mp3Encoder};
use crate::chunking::ScriptChunker;
use crate::config::{Prompts, Settings};
use crate::error::{AutocastError, Result};
use crate::feed::{self, episode_filename, episode_url, Enclosure, Episode};
use crate::generation::{OpenAIChat, ScriptWriter, TextGenerator};
use crate::persist::write_atomic;
use crate::speech::{OpenAISpeech, SpeechSynthesizer};
use crate::topics::{self, SelectedTopic, TopicPool, UsedTopics};
use chrono::{NaiveDate, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, instrument, warn};

/// The episode production pipeline.
pub struct Pipeline {
    settings: Settings,
    pool: TopicPool,
    writer: ScriptWriter,
    assembler: AudioAssembler,
    encoder: Arc<dyn AudioEncoder>,
}

impl Pipeline {
    /// Create a pipeline backed by OpenAI and ffmpeg.
    pub fn new(settings: Settings) -> Result<Self> {
        let generator: Arc<dyn TextGenerator> = Arc::new(OpenAIChat::with_config(
            &settings.generation.chat_model,
            settings.generation.temperature,
        )?);
        let synthesizer: Arc<dyn SpeechSynthesizer> = Arc::new(OpenAISpeech::with_config(
            &settings.speech.tts_model,
            &settings.speech.voice,
        )?);
        let encoder: Arc<dyn AudioEncoder> =
            Arc::new(Mp3Encoder::with_quality(settings.audio.mp3_quality));

        let mut pipeline = Self::with_components(settings, generator, synthesizer, encoder)?;
        pipeline.assembler = pipeline.assembler.with_progress(true);
        Ok(pipeline)
    }

    /// Create a pipeline with custom components.
    pub fn with_components(
        settings: Settings,
        generator: Arc<dyn TextGenerator>,
        synthesizer: Arc<dyn SpeechSynthesizer>,
        encoder: Arc<dyn AudioEncoder>,
    ) -> Result<Self> {
        let prompts = Prompts::load(
            settings.prompts.custom_dir.as_deref(),
            Some(&settings.prompts.variables),
        )?;
        let pool = TopicPool::load_or_builtin(settings.topic_pool_path().as_deref())?;

        let writer = ScriptWriter::new(generator).with_prompts(prompts);
        let assembler = AudioAssembler::new(synthesizer)
            .with_silence_gap(Duration::from_millis(settings.audio.silence_gap_ms))
            .with_max_concurrent(settings.speech.max_concurrent);

        Ok(Self {
            settings,
            pool,
            writer,
            assembler,
            encoder,
        })
    }

    /// Get the settings.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Get the topic pool.
    pub fn pool(&self) -> &TopicPool {
        &self.pool
    }

    /// Produce and publish the episode for `date`.
    pub async fn run_once(&self, date: NaiveDate, force: bool) -> Result<RunResult> {
        let mut rng = StdRng::from_entropy();
        self.run_once_with_rng(date, force, &mut rng).await
    }

    /// Like [`Pipeline::run_once`], drawing the topic from `rng`.
    #[instrument(skip(self, rng), fields(date = %date))]
    pub async fn run_once_with_rng<R: Rng + ?Sized>(
        &self,
        date: NaiveDate,
        force: bool,
        rng: &mut R,
    ) -> Result<RunResult> {
        let filename = episode_filename(date, self.encoder.extension());
        let url = episode_url(
            &self.settings.publish.base_url,
            &self.settings.publish.episodes_subdir,
            &filename,
        );
        let feed_path = self.settings.feed_path();

        // Fails early on a missing or malformed feed, before any topic is spent.
        let existing = feed::read_items(&feed_path)?;
        if existing.iter().any(|item| item.enclosure_url == url) {
            if force {
                warn!("Feed already has an episode at {}, publishing again", url);
            } else {
                return Err(AutocastError::EpisodeExists(format!(
                    "{} (use --force to publish another)",
                    url
                )));
            }
        }

        let selected = self.select_topic(rng)?;
        info!("Selected topic #{}: {}", selected.index, selected.topic);
        eprintln!("  Topic: {}", selected.topic);

        eprintln!("  Writing script...");
        let written = self.writer.write(&selected.topic, date).await?;

        let chunks = ScriptChunker::new(self.settings.chunking.max_chunk_len).split(&written.script);
        eprintln!("  Split script into {} chunks", chunks.len());
        if chunks.is_empty() {
            return Err(AutocastError::RemoteService("Generated script is empty".to_string()));
        }

        eprintln!("  Synthesizing speech...");
        let audio = self.assembler.assemble(&chunks).await?;
        let bytes = self.encoder.encode(&audio).await?;

        let audio_path = self.settings.episodes_dir().join(&filename);
        write_atomic(&audio_path, &bytes)?;
        info!("Wrote {} ({} bytes)", audio_path.display(), bytes.len());

        let episode = Episode::new(
            date,
            &selected.topic,
            &written.script,
            Utc::now(),
            Enclosure {
                url,
                length: bytes.len() as u64,
                mime_type: self.encoder.mime_type().to_string(),
            },
        );

        eprintln!("  Updating feed...");
        feed::prepend(&feed_path, &episode)?;

        Ok(RunResult {
            topic: selected,
            episode,
            audio_path,
            duration: audio.duration(),
            chunk_count: chunks.len(),
        })
    }

    /// Pick a topic and record it as used before returning it.
    fn select_topic<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<SelectedTopic> {
        let used_path = self.settings.used_topics_path();
        let mut used = UsedTopics::load(&used_path, self.pool.len());

        let selected = topics::select(&self.pool, &used, rng)?;
        used.insert(selected.index);
        used.save(&used_path)?;

        Ok(selected)
    }
}

/// Result of a pipeline run.
#[derive(Debug)]
pub struct RunResult {
    pub topic: SelectedTopic,
    pub episode: Episode,
    /// Where the audio file was written.
    pub audio_path: PathBuf,
    pub duration: Duration,
    pub chunk_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::{AudioBuffer, AudioSpec, WavEncoder};
    use crate::config::ChannelSettings;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::TempDir;

    struct FakeGenerator;

    #[async_trait]
    impl TextGenerator for FakeGenerator {
        async fn generate(&self, system: &str, _user: &str) -> Result<String> {
            if system.contains("research assistant") {
                Ok("notes".to_string())
            } else {
                Ok("First paragraph of the story.\n\nSecond paragraph.\n\nThe end.".to_string())
            }
        }
    }

    struct FakeSpeech {
        calls: AtomicUsize,
        fail: bool,
    }

    impl FakeSpeech {
        fn new(fail: bool) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                fail,
            })
        }
    }

    #[async_trait]
    impl SpeechSynthesizer for FakeSpeech {
        async fn synthesize(&self, _text: &str) -> Result<Vec<u8>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(AutocastError::RemoteService("speech service down".to_string()));
            }
            let spec = AudioSpec { sample_rate: 8_000, channels: 1 };
            AudioBuffer::silence(spec, Duration::from_millis(500)).to_wav_bytes()
        }
    }

    fn setup(pool: &[&str]) -> (TempDir, Settings) {
        let dir = tempfile::tempdir().unwrap();
        let mut settings = Settings::default();
        settings.publish.base_url = "https://pod.example.org".to_string();
        settings.publish.site_dir = dir.path().join("site").to_string_lossy().into_owned();
        settings.general.data_dir = dir.path().join("data").to_string_lossy().into_owned();
        settings.topics.used_file = dir.path().join("data/used.json").to_string_lossy().into_owned();

        let pool_path = dir.path().join("pool.txt");
        std::fs::write(&pool_path, pool.join("\n")).unwrap();
        settings.topics.pool_file = Some(pool_path.to_string_lossy().into_owned());
        settings.chunking.max_chunk_len = 20;

        feed::document::create(&settings.feed_path(), &ChannelSettings::default()).unwrap();
        (dir, settings)
    }

    fn pipeline(settings: &Settings, speech: Arc<FakeSpeech>) -> Pipeline {
        Pipeline::with_components(
            settings.clone(),
            Arc::new(FakeGenerator),
            speech,
            Arc::new(WavEncoder),
        )
        .unwrap()
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
    }

    #[tokio::test]
    async fn test_run_publishes_episode() {
        let (_dir, settings) = setup(&["Tides", "Comets"]);
        let speech = FakeSpeech::new(false);
        let pipeline = pipeline(&settings, speech.clone());

        let result = pipeline
            .run_once_with_rng(date(), false, &mut StdRng::seed_from_u64(1))
            .await
            .unwrap();

        assert_eq!(result.chunk_count, 3);
        assert_eq!(speech.calls.load(Ordering::SeqCst), 3);
        assert_eq!(result.duration, Duration::from_millis(700 * 3));
        assert!(result.audio_path.ends_with("episodes/2026-10-19.wav"));

        let written = std::fs::read(&result.audio_path).unwrap();
        assert_eq!(result.episode.enclosure.length, written.len() as u64);

        let items = feed::read_items(&settings.feed_path()).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].guid, result.episode.guid);
        assert_eq!(items[0].enclosure_url, "https://pod.example.org/episodes/2026-10-19.wav");
        assert_eq!(items[0].title, format!("2026-10-19 — {}", result.topic.topic));
        assert!(items[0].description.starts_with("First paragraph"));

        let used = UsedTopics::load(&settings.used_topics_path(), 2);
        assert!(used.contains(result.topic.index));
    }

    #[tokio::test]
    async fn test_consecutive_runs_use_distinct_topics_then_exhaust() {
        let (_dir, settings) = setup(&["Tides", "Comets"]);
        let pipeline = pipeline(&settings, FakeSpeech::new(false));
        let mut rng = StdRng::seed_from_u64(5);

        let first = pipeline
            .run_once_with_rng(date(), false, &mut rng)
            .await
            .unwrap();
        let next_day = date().succ_opt().unwrap();
        let second = pipeline
            .run_once_with_rng(next_day, false, &mut rng)
            .await
            .unwrap();
        assert_ne!(first.topic.index, second.topic.index);

        let feed_before = std::fs::read_to_string(settings.feed_path()).unwrap();
        let third_day = next_day.succ_opt().unwrap();
        let err = pipeline
            .run_once_with_rng(third_day, false, &mut rng)
            .await
            .unwrap_err();
        assert!(matches!(err, AutocastError::ExhaustedPool { pool_size: 2 }));

        assert_eq!(std::fs::read_to_string(settings.feed_path()).unwrap(), feed_before);
        assert!(!settings.episodes_dir().join("2026-10-21.wav").exists());

        let guids: Vec<String> = feed::read_items(&settings.feed_path())
            .unwrap()
            .into_iter()
            .map(|i| i.guid)
            .collect();
        assert_eq!(guids, vec![second.episode.guid, first.episode.guid]);
    }

    #[tokio::test]
    async fn test_synthesis_failure_commits_nothing_downstream() {
        let (_dir, settings) = setup(&["Tides"]);
        let speech = FakeSpeech::new(true);
        let pipeline = pipeline(&settings, speech.clone());
        let feed_before = std::fs::read_to_string(settings.feed_path()).unwrap();

        let err = pipeline
            .run_once_with_rng(date(), false, &mut StdRng::seed_from_u64(0))
            .await
            .unwrap_err();

        assert!(matches!(err, AutocastError::Synthesis { chunk: 0, .. }));
        assert_eq!(speech.calls.load(Ordering::SeqCst), 1);
        assert_eq!(std::fs::read_to_string(settings.feed_path()).unwrap(), feed_before);
        assert!(!settings.episodes_dir().join("2026-10-19.wav").exists());

        // The topic was recorded before synthesis started.
        let used = UsedTopics::load(&settings.used_topics_path(), 1);
        assert!(used.contains(0));
    }

    #[tokio::test]
    async fn test_same_date_is_rejected_unless_forced() {
        let (_dir, settings) = setup(&["Tides", "Comets", "Rome"]);
        let pipeline = pipeline(&settings, FakeSpeech::new(false));
        let mut rng = StdRng::seed_from_u64(2);

        pipeline.run_once_with_rng(date(), false, &mut rng).await.unwrap();

        let err = pipeline
            .run_once_with_rng(date(), false, &mut rng)
            .await
            .unwrap_err();
        assert!(matches!(err, AutocastError::EpisodeExists(_)));
        assert_eq!(UsedTopics::load(&settings.used_topics_path(), 3).len(), 1);

        pipeline.run_once_with_rng(date(), true, &mut rng).await.unwrap();
        assert_eq!(feed::read_items(&settings.feed_path()).unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_run_keeps_history_beyond_a_shortened_pool() {
        let (_dir, settings) = setup(&["Tides", "Comets"]);
        let used_path = settings.used_topics_path();
        std::fs::create_dir_all(used_path.parent().unwrap()).unwrap();
        std::fs::write(&used_path, "[0, 9]").unwrap();
        let pipeline = pipeline(&settings, FakeSpeech::new(false));

        let result = pipeline
            .run_once_with_rng(date(), false, &mut StdRng::seed_from_u64(0))
            .await
            .unwrap();

        assert_eq!(result.topic.index, 1);
        assert_eq!(
            std::fs::read_to_string(&used_path).unwrap(),
            "[0,1,9]"
        );
    }

    #[tokio::test]
    async fn test_missing_feed_aborts_before_selection() {
        let (_dir, settings) = setup(&["Tides"]);
        std::fs::remove_file(settings.feed_path()).unwrap();
        let pipeline = pipeline(&settings, FakeSpeech::new(false));

        let err = pipeline
            .run_once_with_rng(date(), false, &mut StdRng::seed_from_u64(0))
            .await
            .unwrap_err();
        assert!(matches!(err, AutocastError::FeedParse(_)));
        assert!(!settings.used_topics_path().exists());
    }
}
