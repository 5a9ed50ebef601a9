//! Joins per-chunk speech into one continuous recording.

use super::AudioBuffer;
use crate::chunking::ScriptChunk;
use crate::error::{AutocastError, Result};
use crate::speech::SpeechSynthesizer;
use futures::stream::{self, StreamExt, TryStreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument};

/// Default gap inserted after every chunk.
pub const DEFAULT_SILENCE_GAP: Duration = Duration::from_millis(200);

/// Synthesizes script chunks and concatenates the results in order.
///
/// A fixed silence follows every chunk, including the last one.
pub struct AudioAssembler {
    synthesizer: Arc<dyn SpeechSynthesizer>,
    silence_gap: Duration,
    max_concurrent: usize,
    show_progress: bool,
}

impl AudioAssembler {
    pub fn new(synthesizer: Arc<dyn SpeechSynthesizer>) -> Self {
        Self {
            synthesizer,
            silence_gap: DEFAULT_SILENCE_GAP,
            max_concurrent: 1,
            show_progress: false,
        }
    }

    pub fn with_silence_gap(mut self, gap: Duration) -> Self {
        self.silence_gap = gap;
        self
    }

    /// Allow up to `n` synthesis calls in flight. Output order is unaffected.
    pub fn with_max_concurrent(mut self, n: usize) -> Self {
        self.max_concurrent = n.max(1);
        self
    }

    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    /// Synthesize every chunk and join them.
    ///
    /// Fails on the first chunk whose synthesis or decoding fails; nothing
    /// is retried.
    #[instrument(skip_all, fields(chunks = chunks.len()))]
    pub async fn assemble(&self, chunks: &[ScriptChunk]) -> Result<AudioBuffer> {
        let pb = if self.show_progress {
            let pb = ProgressBar::new(chunks.len() as u64);
            if let Ok(style) = ProgressStyle::default_bar()
                .template("  {spinner:.green} Speech    [{bar:30.cyan/blue}] {pos}/{len}")
            {
                pb.set_style(style.progress_chars("█▓░"));
            }
            pb
        } else {
            ProgressBar::hidden()
        };

        info!(
            "Synthesizing {} chunks ({} concurrent)",
            chunks.len(),
            self.max_concurrent
        );

        // `buffered` yields results in input order regardless of completion order.
        let segments: Vec<AudioBuffer> = stream::iter(chunks.iter().enumerate())
            .map(|(idx, chunk)| {
                let pb = pb.clone();
                async move {
                    let bytes = self.synthesizer.synthesize(&chunk.text).await.map_err(|e| {
                        AutocastError::Synthesis {
                            chunk: idx,
                            message: e.to_string(),
                        }
                    })?;
                    let segment = AudioBuffer::from_wav_bytes(&bytes).map_err(|e| {
                        AutocastError::Synthesis {
                            chunk: idx,
                            message: e.to_string(),
                        }
                    })?;
                    debug!("Chunk {} synthesized ({:?})", idx, segment.duration());
                    pb.inc(1);
                    Ok::<_, AutocastError>(segment)
                }
            })
            .buffered(self.max_concurrent)
            .try_collect()
            .await?;

        pb.finish_and_clear();

        let mut audio = AudioBuffer::empty();
        for segment in segments {
            audio.append(segment)?;
            audio.append_silence(self.silence_gap);
        }

        info!("Assembled {:?} of audio", audio.duration());
        Ok(audio)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::AudioSpec;
    use crate::chunking::ScriptChunker;
    use async_trait::async_trait;
    use std::sync::Mutex;

    const SPEC: AudioSpec = AudioSpec {
        sample_rate: 24_000,
        channels: 1,
    };

    /// Returns a fixed-length silent clip for any input.
    struct SilentSynth {
        length: Duration,
    }

    #[async_trait]
    impl SpeechSynthesizer for SilentSynth {
        async fn synthesize(&self, _text: &str) -> Result<Vec<u8>> {
            AudioBuffer::silence(SPEC, self.length).to_wav_bytes()
        }
    }

    /// Encodes the chunk's length into a one-sample clip and records calls.
    struct MarkerSynth {
        calls: Mutex<Vec<String>>,
        fail_on: Option<String>,
        delay_first: bool,
    }

    #[async_trait]
    impl SpeechSynthesizer for MarkerSynth {
        async fn synthesize(&self, text: &str) -> Result<Vec<u8>> {
            let first = {
                let mut calls = self.calls.lock().unwrap();
                calls.push(text.to_string());
                calls.len() == 1
            };
            if self.delay_first && first {
                tokio::time::sleep(Duration::from_millis(50)).await;
            }
            if self.fail_on.as_deref() == Some(text) {
                return Err(AutocastError::RemoteService("quota exceeded".to_string()));
            }
            AudioBuffer::from_samples(SPEC, vec![text.len() as i16])?.to_wav_bytes()
        }
    }

    fn chunks(texts: &[&str]) -> Vec<ScriptChunk> {
        texts
            .iter()
            .enumerate()
            .map(|(order, t)| ScriptChunk {
                order,
                text: t.to_string(),
            })
            .collect()
    }

    #[tokio::test]
    async fn test_single_chunk_gets_trailing_gap() {
        let length = Duration::from_millis(1_500);
        let assembler = AudioAssembler::new(Arc::new(SilentSynth { length }));

        let audio = assembler.assemble(&chunks(&["hello"])).await.unwrap();
        assert_eq!(audio.duration(), length + DEFAULT_SILENCE_GAP);
    }

    #[tokio::test]
    async fn test_every_chunk_followed_by_gap() {
        let length = Duration::from_millis(250);
        let gap = Duration::from_millis(100);
        let assembler = AudioAssembler::new(Arc::new(SilentSynth { length })).with_silence_gap(gap);

        let audio = assembler.assemble(&chunks(&["a", "b", "c"])).await.unwrap();
        assert_eq!(audio.duration(), (length + gap) * 3);
    }

    #[tokio::test]
    async fn test_no_chunks_is_empty() {
        let assembler = AudioAssembler::new(Arc::new(SilentSynth {
            length: Duration::from_millis(10),
        }));
        let audio = assembler.assemble(&[]).await.unwrap();
        assert_eq!(audio.duration(), Duration::ZERO);
    }

    #[tokio::test]
    async fn test_concurrent_synthesis_preserves_order() {
        let synth = Arc::new(MarkerSynth {
            calls: Mutex::new(Vec::new()),
            fail_on: None,
            delay_first: true,
        });
        let assembler = AudioAssembler::new(synth)
            .with_silence_gap(Duration::from_millis(1))
            .with_max_concurrent(4);

        let audio = assembler
            .assemble(&chunks(&["x", "yy", "zzz", "wwww"]))
            .await
            .unwrap();

        // 24 frames of silence per 1 ms gap.
        let markers: Vec<i16> = audio.samples().iter().step_by(25).copied().collect();
        assert_eq!(markers, vec![1, 2, 3, 4]);
    }

    #[tokio::test]
    async fn test_failure_aborts_assembly() {
        let synth = Arc::new(MarkerSynth {
            calls: Mutex::new(Vec::new()),
            fail_on: Some("second".to_string()),
            delay_first: false,
        });
        let assembler = AudioAssembler::new(synth.clone());

        let result = assembler.assemble(&chunks(&["first", "second", "third"])).await;
        match result {
            Err(AutocastError::Synthesis { chunk, message }) => {
                assert_eq!(chunk, 1);
                assert!(message.contains("quota exceeded"));
            }
            other => panic!("expected synthesis error, got {:?}", other.map(|a| a.duration())),
        }

        // Sequential mode stops at the failing chunk.
        assert_eq!(*synth.calls.lock().unwrap(), vec!["first", "second"]);
    }

    #[tokio::test]
    async fn test_undecodable_audio_is_synthesis_error() {
        struct GarbageSynth;

        #[async_trait]
        impl SpeechSynthesizer for GarbageSynth {
            async fn synthesize(&self, _text: &str) -> Result<Vec<u8>> {
                Ok(b"not audio".to_vec())
            }
        }

        let assembler = AudioAssembler::new(Arc::new(GarbageSynth));
        let result = assembler.assemble(&chunks(&["a"])).await;
        assert!(matches!(result, Err(AutocastError::Synthesis { chunk: 0, .. })));
    }

    #[tokio::test]
    async fn test_assembles_chunker_output() {
        let script = "One.\n\nTwo.\n\nThree.";
        let chunks = ScriptChunker::new(8).split(script);
        assert_eq!(chunks.len(), 3);

        let length = Duration::from_millis(40);
        let assembler = AudioAssembler::new(Arc::new(SilentSynth { length }));
        let audio = assembler.assemble(&chunks).await.unwrap();
        assert_eq!(audio.duration(), (length + DEFAULT_SILENCE_GAP) * 3);
    }
}
