//! Autocast - a self-producing daily podcast
//!
//! Every run picks a topic nobody has heard yet, researches it, writes a
//! narration script, turns the script into speech and publishes the result
//! as the newest item of an RSS feed.
//!
//! # Architecture
//!
//! - `topics` - Topic pool and the persisted set of used topics
//! - `generation` - Research notes and script writing with an LLM
//! - `chunking` - Splitting scripts into speech-sized chunks
//! - `speech` - Text-to-speech synthesis
//! - `audio` - Joining synthesized chunks and encoding the episode
//! - `feed` - Creating, reading and prepending to the RSS feed
//! - `pipeline` - One run, end to end
//!
//! # Example
//!
//! ```rust,no_run
//! use autocast::config::Settings;
//! use autocast::pipeline::Pipeline;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let pipeline = Pipeline::new(settings)?;
//!
//!     let today = chrono::Utc::now().date_naive();
//!     let result = pipeline.run_once(today, false).await?;
//!     println!("Published {}", result.episode.title);
//!
//!     Ok(())
//! }
//! ```

pub mod audio;
pub mod chunking;
pub mod cli;
pub mod config;
pub mod error;
pub mod feed;
pub mod generation;
pub mod openai;
pub mod persist;
pub mod pipeline;
pub mod speech;
pub mod topics;

pub use error::{AutocastError, Result};
