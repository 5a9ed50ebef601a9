//! In-memory PCM audio.

use crate::error::{AutocastError, Result};
use std::borrow::Cow;
use std::io::Cursor;
use std::time::Duration;

/// Sample layout of a PCM stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AudioSpec {
    pub sample_rate: u32,
    pub channels: u16,
}

/// Interleaved 16-bit PCM audio.
///
/// A new buffer is empty and has no spec; it adopts the spec of the first
/// segment appended to it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AudioBuffer {
    spec: Option<AudioSpec>,
    samples: Vec<i16>,
}

impl AudioBuffer {
    /// An empty, zero-duration buffer.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_samples(spec: AudioSpec, samples: Vec<i16>) -> Result<Self> {
        if spec.sample_rate == 0 || spec.channels == 0 {
            return Err(AutocastError::AudioFormat(format!(
                "Invalid audio spec: {} Hz, {} channels",
                spec.sample_rate, spec.channels
            )));
        }
        if samples.len() % spec.channels as usize != 0 {
            return Err(AutocastError::AudioFormat(format!(
                "{} samples do not divide into {} channels",
                samples.len(),
                spec.channels
            )));
        }
        Ok(Self {
            spec: Some(spec),
            samples,
        })
    }

    /// Silence of the given duration, rounded down to whole frames.
    pub fn silence(spec: AudioSpec, duration: Duration) -> Self {
        let frames = frames_for(spec.sample_rate, duration);
        Self {
            spec: Some(spec),
            samples: vec![0; frames * spec.channels as usize],
        }
    }

    /// Decode a WAV byte stream.
    ///
    /// Integer samples of any width and 32-bit float samples are converted to
    /// 16-bit. A data chunk that ends before its declared length (streaming
    /// encoders write `0xFFFFFFFF` size fields) is read up to the last whole
    /// frame in the stream.
    pub fn from_wav_bytes(bytes: &[u8]) -> Result<Self> {
        let bytes = fix_stream_sizes(bytes);
        let mut reader = hound::WavReader::new(Cursor::new(bytes.as_ref()))
            .map_err(|e| AutocastError::AudioFormat(format!("Invalid WAV data: {}", e)))?;
        let wav_spec = reader.spec();

        let samples = match (wav_spec.sample_format, wav_spec.bits_per_sample) {
            (hound::SampleFormat::Int, 16) => read_samples::<i16, _>(&mut reader, |s| s)?,
            (hound::SampleFormat::Int, bits) if bits <= 32 => {
                let shift = i32::from(bits) - 16;
                read_samples::<i32, _>(&mut reader, |s| {
                    if shift >= 0 {
                        (s >> shift) as i16
                    } else {
                        (s << -shift) as i16
                    }
                })?
            }
            (hound::SampleFormat::Float, 32) => read_samples::<f32, _>(&mut reader, |s| {
                (s.clamp(-1.0, 1.0) * f32::from(i16::MAX)) as i16
            })?,
            (format, bits) => {
                return Err(AutocastError::AudioFormat(format!(
                    "Unsupported WAV sample format: {:?} {}-bit",
                    format, bits
                )))
            }
        };

        let spec = AudioSpec {
            sample_rate: wav_spec.sample_rate,
            channels: wav_spec.channels,
        };
        let mut samples = samples;
        let usable = samples.len() - samples.len() % spec.channels.max(1) as usize;
        samples.truncate(usable);

        Self::from_samples(spec, samples)
    }

    /// Encode as a 16-bit PCM WAV file.
    pub fn to_wav_bytes(&self) -> Result<Vec<u8>> {
        let spec = self.spec.ok_or_else(|| {
            AutocastError::AudioFormat("Cannot encode an empty audio buffer".to_string())
        })?;

        let wav_spec = hound::WavSpec {
            channels: spec.channels,
            sample_rate: spec.sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };

        let mut cursor = Cursor::new(Vec::new());
        {
            let mut writer = hound::WavWriter::new(&mut cursor, wav_spec).map_err(wav_error)?;
            let mut sample_writer = writer.get_i16_writer(self.samples.len() as u32);
            for sample in &self.samples {
                sample_writer.write_sample(*sample);
            }
            sample_writer.flush().map_err(wav_error)?;
            writer.finalize().map_err(wav_error)?;
        }

        Ok(cursor.into_inner())
    }

    /// Append another buffer. Both must share the same spec unless one is empty.
    pub fn append(&mut self, other: AudioBuffer) -> Result<()> {
        let Some(other_spec) = other.spec else {
            return Ok(());
        };

        match self.spec {
            None => {
                self.spec = Some(other_spec);
                self.samples = other.samples;
            }
            Some(spec) if spec == other_spec => {
                self.samples.extend_from_slice(&other.samples);
            }
            Some(spec) => {
                return Err(AutocastError::AudioFormat(format!(
                    "Cannot join {} Hz/{} ch audio onto {} Hz/{} ch audio",
                    other_spec.sample_rate, other_spec.channels, spec.sample_rate, spec.channels
                )));
            }
        }
        Ok(())
    }

    /// Append silence in this buffer's spec. No-op on an empty buffer.
    pub fn append_silence(&mut self, duration: Duration) {
        if let Some(spec) = self.spec {
            let frames = frames_for(spec.sample_rate, duration);
            self.samples
                .resize(self.samples.len() + frames * spec.channels as usize, 0);
        }
    }

    pub fn spec(&self) -> Option<AudioSpec> {
        self.spec
    }

    pub fn samples(&self) -> &[i16] {
        &self.samples
    }

    /// Number of frames (samples per channel).
    pub fn frames(&self) -> usize {
        match self.spec {
            Some(spec) => self.samples.len() / spec.channels as usize,
            None => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Playback duration.
    pub fn duration(&self) -> Duration {
        match self.spec {
            Some(spec) => {
                let nanos = self.frames() as u128 * 1_000_000_000 / u128::from(spec.sample_rate);
                Duration::from_nanos(nanos as u64)
            }
            None => Duration::ZERO,
        }
    }
}

fn frames_for(sample_rate: u32, duration: Duration) -> usize {
    (duration.as_nanos() * u128::from(sample_rate) / 1_000_000_000) as usize
}

/// Rewrite the RIFF and `data` sizes of a stream whose `data` chunk claims
/// more bytes than are present. Other input is returned untouched.
fn fix_stream_sizes(bytes: &[u8]) -> Cow<'_, [u8]> {
    if bytes.len() < 12 || &bytes[0..4] != b"RIFF" || &bytes[8..12] != b"WAVE" {
        return Cow::Borrowed(bytes);
    }

    let mut pos = 12usize;
    let mut block_align = 0usize;
    while pos + 8 <= bytes.len() {
        let id = &bytes[pos..pos + 4];
        let size = u32::from_le_bytes([bytes[pos + 4], bytes[pos + 5], bytes[pos + 6], bytes[pos + 7]]) as usize;
        let body = pos + 8;

        if id == b"fmt " && body + 14 <= bytes.len() {
            block_align = usize::from(u16::from_le_bytes([bytes[body + 12], bytes[body + 13]]));
        }

        if id == b"data" {
            let available = bytes.len() - body;
            if size <= available {
                return Cow::Borrowed(bytes);
            }

            let mut data_len = available;
            if block_align > 0 {
                data_len -= data_len % block_align;
            }

            let mut fixed = bytes[..body + data_len].to_vec();
            let riff_len = (fixed.len() - 8) as u32;
            fixed[4..8].copy_from_slice(&riff_len.to_le_bytes());
            fixed[pos + 4..pos + 8].copy_from_slice(&(data_len as u32).to_le_bytes());
            return Cow::Owned(fixed);
        }

        // Chunks are padded to an even length.
        match body.checked_add(size).and_then(|end| end.checked_add(size & 1)) {
            Some(next) => pos = next,
            None => break,
        }
    }

    Cow::Borrowed(bytes)
}

fn read_samples<S, F>(reader: &mut hound::WavReader<Cursor<&[u8]>>, convert: F) -> Result<Vec<i16>>
where
    S: hound::Sample,
    F: Fn(S) -> i16,
{
    let mut out = Vec::with_capacity((reader.len() as usize).min(1 << 24));
    for sample in reader.samples::<S>() {
        match sample {
            Ok(s) => out.push(convert(s)),
            Err(hound::Error::IoError(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => break,
            Err(e) => return Err(wav_error(e)),
        }
    }
    Ok(out)
}

fn wav_error(e: hound::Error) -> AutocastError {
    AutocastError::AudioFormat(format!("WAV error: {}", e))
}
