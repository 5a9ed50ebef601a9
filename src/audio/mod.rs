//! Audio assembly and encoding.
//!
//! Speech for each script chunk is decoded into an [`AudioBuffer`], joined by
//! the [`AudioAssembler`], and encoded into the published file by an
//! [`AudioEncoder`].

mod assembler;
mod buffer;
mod encoder;

pub use assembler::{AudioAssembler, DEFAULT_SILENCE_GAP};
pub use buffer::{AudioBuffer, AudioSpec};
pub use encoder::{AudioEncoder, Mp3Encoder, WavEncoder};
