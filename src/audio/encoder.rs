//! Encoding the assembled recording into its published file format.

use super::AudioBuffer;
use crate::error::{AutocastError, Result};
use async_trait::async_trait;
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, instrument};

/// Trait for final audio encoders.
#[async_trait]
pub trait AudioEncoder: Send + Sync {
    /// File extension of the encoded output, without the dot.
    fn extension(&self) -> &'static str;

    /// MIME type advertised in the feed enclosure.
    fn mime_type(&self) -> &'static str;

    /// Encode the buffer into file bytes.
    async fn encode(&self, audio: &AudioBuffer) -> Result<Vec<u8>>;
}

/// MP3 encoder backed by ffmpeg and libmp3lame.
pub struct Mp3Encoder {
    quality: u8,
}

impl Mp3Encoder {
    pub fn new() -> Self {
        Self::with_quality(2)
    }

    /// LAME VBR quality, 0 (best) to 9.
    pub fn with_quality(quality: u8) -> Self {
        Self {
            quality: quality.min(9),
        }
    }
}

impl Default for Mp3Encoder {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AudioEncoder for Mp3Encoder {
    fn extension(&self) -> &'static str {
        "mp3"
    }

    fn mime_type(&self) -> &'static str {
        "audio/mpeg"
    }

    #[instrument(skip_all, fields(duration = ?audio.duration()))]
    async fn encode(&self, audio: &AudioBuffer) -> Result<Vec<u8>> {
        let temp_dir = tempfile::tempdir()?;
        let wav_path = temp_dir.path().join("episode.wav");
        let mp3_path = temp_dir.path().join("episode.mp3");

        tokio::fs::write(&wav_path, audio.to_wav_bytes()?).await?;
        debug!("Encoding {:?} to MP3", wav_path);

        let result = Command::new("ffmpeg")
            .arg("-i").arg(&wav_path)
            .arg("-codec:a").arg("libmp3lame")
            .arg("-qscale:a").arg(self.quality.to_string())
            .arg("-y")
            .arg("-loglevel").arg("error")
            .arg(&mp3_path)
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .await;

        match result {
            Ok(out) if out.status.success() => Ok(tokio::fs::read(&mp3_path).await?),
            Ok(out) => {
                let err = String::from_utf8_lossy(&out.stderr);
                Err(AutocastError::ToolFailed(format!("ffmpeg encoding failed: {err}")))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(AutocastError::ToolNotFound("ffmpeg".into()))
            }
            Err(e) => Err(AutocastError::ToolFailed(format!("ffmpeg error: {e}"))),
        }
    }
}

/// Writes the recording as uncompressed 16-bit WAV.
#[derive(Debug, Default, Clone, Copy)]
pub struct WavEncoder;

#[async_trait]
impl AudioEncoder for WavEncoder {
    fn extension(&self) -> &'static str {
        "wav"
    }

    fn mime_type(&self) -> &'static str {
        "audio/wav"
    }

    async fn encode(&self, audio: &AudioBuffer) -> Result<Vec<u8>> {
        audio.to_wav_bytes()
    }
}
